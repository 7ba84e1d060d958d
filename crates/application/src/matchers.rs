//! Matcher evaluation.
//!
//! Each matcher variant implements [`EvaluateMatcher`]; [`Matcher`] dispatches
//! exhaustively, so adding a variant forces an implementation here.

use dratt_domain::{
    ArrayIncludesMatcher, JsonType, Matcher, Mismatch, MismatchNode, Template, TypeMatcher,
    VariableStore,
};
use serde_json::Value;

use crate::comparator;
use crate::variable_resolver::substitute_variables_on_template;

/// Capability of a matcher: describe how an actual value differs from it.
pub trait EvaluateMatcher {
    /// Returns the mismatch between this matcher and `actual` (`None` when absent).
    fn evaluate_mismatch(&self, actual: Option<&Value>, variables: &VariableStore)
    -> MismatchNode;
}

impl EvaluateMatcher for Matcher {
    fn evaluate_mismatch(
        &self,
        actual: Option<&Value>,
        variables: &VariableStore,
    ) -> MismatchNode {
        match self {
            Self::Type(matcher) => matcher.evaluate_mismatch(actual, variables),
            Self::ArrayIncludes(matcher) => matcher.evaluate_mismatch(actual, variables),
        }
    }
}

impl EvaluateMatcher for TypeMatcher {
    fn evaluate_mismatch(&self, actual: Option<&Value>, _: &VariableStore) -> MismatchNode {
        let actual_type = JsonType::of(actual);
        if actual_type == Some(self.expected) {
            MismatchNode::Leaves(Vec::new())
        } else {
            Mismatch::NotEqualType {
                expected_type: self.expected,
                actual_type,
            }
            .into()
        }
    }
}

impl EvaluateMatcher for ArrayIncludesMatcher {
    fn evaluate_mismatch(
        &self,
        actual: Option<&Value>,
        variables: &VariableStore,
    ) -> MismatchNode {
        // Step-level substitution already reports failures; fall back to the raw items here.
        let items: Vec<Template> = self
            .items
            .iter()
            .map(|item| {
                substitute_variables_on_template(item, variables).unwrap_or_else(|_| item.clone())
            })
            .collect();

        match actual {
            None | Some(Value::Null) => Mismatch::NotEqualValue {
                expected_value: Template::Array(items),
                actual_value: actual.cloned(),
            }
            .into(),
            Some(Value::Array(actual_items)) => MismatchNode::Leaves(
                items
                    .into_iter()
                    .filter(|expected| {
                        !actual_items
                            .iter()
                            .any(|actual| comparator::matches(expected, Some(actual), variables))
                    })
                    .map(|value| Mismatch::Missing { value })
                    .collect(),
            ),
            Some(other) => Mismatch::NotEqualType {
                expected_type: JsonType::Array,
                actual_type: JsonType::of(Some(other)),
            }
            .into(),
        }
    }
}
