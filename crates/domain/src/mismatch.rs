//! Mismatch trees produced by comparing an expected template with an actual value.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Serialize, Serializer};
use serde_json::Value;

use crate::matcher::JsonType;
use crate::template::Template;

/// Kind of a single mismatch, without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum MismatchKind {
    /// Expected key or item absent from the actual value.
    Missing,
    /// Actual key that the expected value does not mention.
    Extra,
    /// Primitive values differ.
    NotEqualValue,
    /// JSON type classes differ.
    NotEqualType,
}

/// A single difference between expected and actual.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "mismatchType", rename_all = "camelCase")]
pub enum Mismatch {
    /// Expected key or item absent from the actual value.
    Missing {
        /// The expected value that was not found.
        value: Template,
    },
    /// Actual key that the expected value does not mention.
    Extra {
        /// The surplus actual value.
        value: Value,
    },
    /// Primitive (or nullish) values differ.
    #[serde(rename_all = "camelCase")]
    NotEqualValue {
        /// The expected value.
        expected_value: Template,
        /// The actual value, `None` when absent.
        actual_value: Option<Value>,
    },
    /// JSON type classes differ.
    #[serde(rename_all = "camelCase")]
    NotEqualType {
        /// The expected type class.
        expected_type: JsonType,
        /// The actual type class, `None` when the actual value is absent.
        #[serde(serialize_with = "serialize_actual_type")]
        actual_type: Option<JsonType>,
    },
}

fn serialize_actual_type<S>(actual: &Option<JsonType>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(actual.map_or("invalidJsonType", JsonType::as_str))
}

impl Mismatch {
    /// Returns the mismatch kind.
    #[must_use]
    pub const fn kind(&self) -> MismatchKind {
        match self {
            Self::Missing { .. } => MismatchKind::Missing,
            Self::Extra { .. } => MismatchKind::Extra,
            Self::NotEqualValue { .. } => MismatchKind::NotEqualValue,
            Self::NotEqualType { .. } => MismatchKind::NotEqualType,
        }
    }

    /// Returns true for [`Mismatch::Extra`].
    #[must_use]
    pub const fn is_extra(&self) -> bool {
        matches!(self, Self::Extra { .. })
    }
}

impl fmt::Display for Mismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing { value } => write!(f, "missing {}", value.to_notation()),
            Self::Extra { value } => write!(f, "unexpected {value}"),
            Self::NotEqualValue {
                expected_value,
                actual_value,
            } => {
                write!(f, "expected {}, got ", expected_value.to_notation())?;
                match actual_value {
                    Some(actual) => write!(f, "{actual}"),
                    None => f.write_str("nothing"),
                }
            }
            Self::NotEqualType {
                expected_type,
                actual_type,
            } => write!(
                f,
                "expected type {expected_type}, got {}",
                actual_type.map_or("invalidJsonType", JsonType::as_str)
            ),
        }
    }
}

/// Result of a structural comparison.
///
/// The shape mirrors the compared values: objects and arrays become
/// [`MismatchNode::Tree`] keyed by property name or decimal index. An empty
/// tree means the values match.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MismatchNode {
    /// A single difference at this position.
    Leaf(Mismatch),
    /// Several differences at this position (array-includes misses).
    Leaves(Vec<Mismatch>),
    /// Differences below this position.
    Tree(BTreeMap<String, MismatchNode>),
}

impl Default for MismatchNode {
    fn default() -> Self {
        Self::empty()
    }
}

impl From<Mismatch> for MismatchNode {
    fn from(mismatch: Mismatch) -> Self {
        Self::Leaf(mismatch)
    }
}

impl MismatchNode {
    /// The node meaning "no differences".
    #[must_use]
    pub const fn empty() -> Self {
        Self::Tree(BTreeMap::new())
    }

    /// Returns true when the node holds no differences at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Leaf(_) => false,
            Self::Leaves(leaves) => leaves.is_empty(),
            Self::Tree(children) => children.values().all(Self::is_empty),
        }
    }

    /// Flattens the tree into `(path, mismatch)` pairs in key order.
    ///
    /// Paths are dot-joined keys; the root is the empty path.
    #[must_use]
    pub fn paths(&self) -> Vec<(String, &Mismatch)> {
        let mut out = Vec::new();
        self.collect_paths(String::new(), &mut out);
        out
    }

    fn collect_paths<'a>(&'a self, prefix: String, out: &mut Vec<(String, &'a Mismatch)>) {
        match self {
            Self::Leaf(mismatch) => out.push((prefix, mismatch)),
            Self::Leaves(leaves) => out.extend(leaves.iter().map(|m| (prefix.clone(), m))),
            Self::Tree(children) => {
                for (key, child) in children {
                    let path = if prefix.is_empty() {
                        key.clone()
                    } else {
                        format!("{prefix}.{key}")
                    };
                    child.collect_paths(path, out);
                }
            }
        }
    }
}
