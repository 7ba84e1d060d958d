//! Structural comparison of expected templates against actual JSON.
//!
//! The comparator is pure and deterministic. Matchers embedded in the
//! expected template take over comparison at their position.

use std::collections::{BTreeMap, BTreeSet};

use dratt_domain::{Mismatch, MismatchNode, Template, VariableStore};
use serde_json::{Number, Value};

use crate::matchers::EvaluateMatcher;

/// Compares `expected` with `actual` and returns the tree of differences.
///
/// `actual` is `None` when the value is absent. Primitives and nullish
/// values compare by strict equality; objects and arrays compare over the
/// union of their keys (array positions keyed by decimal index).
#[must_use]
pub fn evaluate_mismatch(
    expected: &Template,
    actual: Option<&Value>,
    variables: &VariableStore,
) -> MismatchNode {
    if let Template::Matcher(matcher) = expected {
        return matcher.evaluate_mismatch(actual, variables);
    }

    match (entries_of_template(expected), actual.and_then(entries_of_value)) {
        (Some(expected_entries), Some(actual_entries)) => {
            compare_entries(&expected_entries, &actual_entries, variables)
        }
        _ if primitive_equals(expected, actual) => MismatchNode::empty(),
        _ => Mismatch::NotEqualValue {
            expected_value: expected.clone(),
            actual_value: actual.cloned(),
        }
        .into(),
    }
}

/// Returns true when `expected` and `actual` have no differences.
#[must_use]
pub fn matches(expected: &Template, actual: Option<&Value>, variables: &VariableStore) -> bool {
    evaluate_mismatch(expected, actual, variables).is_empty()
}

/// Keeps only the mismatches accepted by `keep`, pruning emptied branches.
#[must_use]
pub fn filter_mismatches<F>(node: &MismatchNode, keep: &F) -> MismatchNode
where
    F: Fn(&Mismatch) -> bool,
{
    match node {
        MismatchNode::Leaf(mismatch) if keep(mismatch) => node.clone(),
        MismatchNode::Leaf(_) => MismatchNode::empty(),
        MismatchNode::Leaves(leaves) => {
            MismatchNode::Leaves(leaves.iter().filter(|&m| keep(m)).cloned().collect())
        }
        MismatchNode::Tree(children) => MismatchNode::Tree(
            children
                .iter()
                .map(|(key, child)| (key.clone(), filter_mismatches(child, keep)))
                .filter(|(_, child)| !child.is_empty())
                .collect(),
        ),
    }
}

fn compare_entries(
    expected: &BTreeMap<String, &Template>,
    actual: &BTreeMap<String, &Value>,
    variables: &VariableStore,
) -> MismatchNode {
    let keys: BTreeSet<&String> = expected.keys().chain(actual.keys()).collect();

    let children = keys
        .into_iter()
        .filter_map(|key| {
            let node = match (expected.get(key), actual.get(key)) {
                (None, Some(value)) => Mismatch::Extra {
                    value: (*value).clone(),
                }
                .into(),
                (Some(template), None) => Mismatch::Missing {
                    value: (*template).clone(),
                }
                .into(),
                (Some(template), Some(value)) => evaluate_mismatch(template, Some(*value), variables),
                (None, None) => return None,
            };
            (!node.is_empty()).then(|| (key.clone(), node))
        })
        .collect();

    MismatchNode::Tree(children)
}

fn entries_of_template(template: &Template) -> Option<BTreeMap<String, &Template>> {
    match template {
        Template::Object(fields) => Some(fields.iter().map(|(k, v)| (k.clone(), v)).collect()),
        Template::Array(items) => Some(
            items
                .iter()
                .enumerate()
                .map(|(i, v)| (i.to_string(), v))
                .collect(),
        ),
        _ => None,
    }
}

fn entries_of_value(value: &Value) -> Option<BTreeMap<String, &Value>> {
    match value {
        Value::Object(map) => Some(map.iter().map(|(k, v)| (k.clone(), v)).collect()),
        Value::Array(items) => Some(
            items
                .iter()
                .enumerate()
                .map(|(i, v)| (i.to_string(), v))
                .collect(),
        ),
        _ => None,
    }
}

fn primitive_equals(expected: &Template, actual: Option<&Value>) -> bool {
    match (expected, actual) {
        (Template::Null, Some(Value::Null)) => true,
        (Template::Bool(a), Some(Value::Bool(b))) => a == b,
        (Template::String(a), Some(Value::String(b))) => a == b,
        (Template::Number(a), Some(Value::Number(b))) => numbers_equal(a, b),
        _ => false,
    }
}

#[allow(clippy::float_cmp)]
fn numbers_equal(a: &Number, b: &Number) -> bool {
    if let (Some(a), Some(b)) = (a.as_i64(), b.as_i64()) {
        return a == b;
    }
    if let (Some(a), Some(b)) = (a.as_u64(), b.as_u64()) {
        return a == b;
    }
    match (a.as_f64(), b.as_f64()) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}
