//! Matchers that can stand in for literal values inside an expected body.
//!
//! A matcher is not data: it is a predicate over the actual value found at
//! its position. Matchers are a closed set of variants so comparison code
//! dispatches on them exhaustively.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{DomainError, DomainResult};
use crate::template::Template;

/// JSON type classes understood by the type matcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JsonType {
    /// A JSON string.
    String,
    /// A JSON number (integer or float).
    Number,
    /// `true` or `false`.
    Boolean,
    /// A JSON object.
    Object,
    /// A JSON array.
    Array,
    /// The JSON `null` literal.
    Null,
}

impl JsonType {
    /// Returns the type class of a value, or `None` when the value is absent.
    #[must_use]
    pub const fn of(value: Option<&Value>) -> Option<Self> {
        match value {
            None => None,
            Some(Value::Null) => Some(Self::Null),
            Some(Value::Bool(_)) => Some(Self::Boolean),
            Some(Value::Number(_)) => Some(Self::Number),
            Some(Value::String(_)) => Some(Self::String),
            Some(Value::Array(_)) => Some(Self::Array),
            Some(Value::Object(_)) => Some(Self::Object),
        }
    }

    /// Returns the type name as a static string.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Object => "object",
            Self::Array => "array",
            Self::Null => "null",
        }
    }
}

impl fmt::Display for JsonType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JsonType {
    type Err = DomainError;

    fn from_str(s: &str) -> DomainResult<Self> {
        match s {
            "string" => Ok(Self::String),
            "number" => Ok(Self::Number),
            "boolean" => Ok(Self::Boolean),
            "object" => Ok(Self::Object),
            "array" => Ok(Self::Array),
            "null" => Ok(Self::Null),
            other => Err(DomainError::UnknownJsonType(other.to_string())),
        }
    }
}

/// Matches any value whose JSON type class equals `expected`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeMatcher {
    /// The required type class.
    pub expected: JsonType,
}

/// Matches any array that contains every one of `items`.
///
/// Each expected item must equal at least one actual item; surplus actual
/// items are allowed.
#[derive(Debug, Clone, PartialEq)]
pub struct ArrayIncludesMatcher {
    /// Items that must all be present in the actual array.
    pub items: Vec<Template>,
}

/// A non-literal expected value.
#[derive(Debug, Clone, PartialEq)]
pub enum Matcher {
    /// See [`TypeMatcher`].
    Type(TypeMatcher),
    /// See [`ArrayIncludesMatcher`].
    ArrayIncludes(ArrayIncludesMatcher),
}

impl Matcher {
    /// Creates a type matcher.
    #[must_use]
    pub const fn of_type(expected: JsonType) -> Self {
        Self::Type(TypeMatcher { expected })
    }

    /// Creates an array-includes matcher.
    pub fn array_includes<I, T>(items: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Template>,
    {
        Self::ArrayIncludes(ArrayIncludesMatcher {
            items: items.into_iter().map(Into::into).collect(),
        })
    }

    /// Returns the matcher tag used in diagnostics.
    #[must_use]
    pub const fn tag(&self) -> &'static str {
        match self {
            Self::Type(_) => "typeMatcher",
            Self::ArrayIncludes(_) => "arrayIncludesMatcher",
        }
    }
}
