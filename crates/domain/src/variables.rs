//! Variable values and the two-tier variable scope.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};
use thiserror::Error;

use crate::matcher::JsonType;

/// A variable value: a string or a number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum VariableValue {
    /// A numeric value.
    Number(f64),
    /// A string value.
    String(String),
}

impl VariableValue {
    /// Interprets the value as a float.
    ///
    /// Strings are parsed after trimming surrounding whitespace. Returns
    /// `None` if the result is not a finite number.
    #[must_use]
    pub fn as_number(&self) -> Option<f64> {
        let number = match self {
            Self::Number(n) => *n,
            Self::String(s) => s.trim().parse::<f64>().ok()?,
        };
        number.is_finite().then_some(number)
    }

    /// Interprets the value as a JSON number, using an integer representation
    /// for integral values.
    #[must_use]
    pub fn as_json_number(&self) -> Option<Number> {
        let number = self.as_number()?;
        if let Some(integral) = integral(number) {
            return Some(Number::from(integral));
        }
        Number::from_f64(number)
    }
}

#[allow(clippy::cast_possible_truncation, clippy::float_cmp)]
fn integral(number: f64) -> Option<i64> {
    const LIMIT: f64 = 9_007_199_254_740_992.0;
    (number.fract() == 0.0 && number.abs() <= LIMIT).then_some(number as i64)
}

impl fmt::Display for VariableValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(s) => f.write_str(s),
            Self::Number(n) => match integral(*n) {
                Some(i) => write!(f, "{i}"),
                None => write!(f, "{n}"),
            },
        }
    }
}

impl From<&str> for VariableValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for VariableValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<f64> for VariableValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<i32> for VariableValue {
    fn from(value: i32) -> Self {
        Self::Number(f64::from(value))
    }
}

impl From<i64> for VariableValue {
    #[allow(clippy::cast_precision_loss)]
    fn from(value: i64) -> Self {
        Self::Number(value as f64)
    }
}

impl From<u64> for VariableValue {
    #[allow(clippy::cast_precision_loss)]
    fn from(value: u64) -> Self {
        Self::Number(value as f64)
    }
}

/// Ordered map from variable name to value.
pub type VariableStore = BTreeMap<String, VariableValue>;

/// Variables visible to a running test.
///
/// The suite scope is shared and read-only; the test scope starts empty for
/// every test and shadows the suite scope.
#[derive(Debug, Clone)]
pub struct Variables<'s> {
    /// Variables declared on the suite.
    pub suite: &'s VariableStore,
    /// Variables set by steps of the current test.
    pub test: VariableStore,
}

impl<'s> Variables<'s> {
    /// Creates a scope with an empty test tier.
    #[must_use]
    pub const fn new(suite: &'s VariableStore) -> Self {
        Self {
            suite,
            test: VariableStore::new(),
        }
    }

    /// Returns the merged view where test variables override suite variables.
    #[must_use]
    pub fn combined(&self) -> VariableStore {
        let mut combined = self.suite.clone();
        combined.extend(self.test.iter().map(|(k, v)| (k.clone(), v.clone())));
        combined
    }

    /// Looks up a variable, test scope first.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&VariableValue> {
        self.test.get(name).or_else(|| self.suite.get(name))
    }

    /// Returns a setter that records assignments into the test scope.
    pub fn setter(&mut self) -> VariableSetter<'_> {
        VariableSetter {
            target: &mut self.test,
            assigned: BTreeMap::new(),
            error: None,
        }
    }
}

/// Failure while setting a variable from a step hook.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum VariableSetError {
    /// The hook produced no value for the variable.
    #[error("cannot set variable '{name}' to an undefined value")]
    Undefined {
        /// Variable name.
        name: String,
    },

    /// The value has a JSON type that cannot be stored.
    #[error("cannot set variable '{name}' to a value of type {found}")]
    UnsupportedType {
        /// Variable name.
        name: String,
        /// Type of the rejected value.
        found: JsonType,
    },

    /// The hook itself reported a failure.
    #[error("{0}")]
    Hook(String),
}

/// Write handle over the test scope, handed to `after_step` hooks.
///
/// The first failed assignment is latched; later assignments are ignored and
/// [`VariableSetter::finish`] reports the failure.
#[derive(Debug)]
pub struct VariableSetter<'a> {
    target: &'a mut VariableStore,
    assigned: BTreeMap<String, VariableValue>,
    error: Option<VariableSetError>,
}

impl VariableSetter<'_> {
    /// Sets a variable.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<VariableValue>) {
        if self.error.is_some() {
            return;
        }
        let name = name.into();
        let value = value.into();
        self.target.insert(name.clone(), value.clone());
        self.assigned.insert(name, value);
    }

    /// Sets a variable to a value that may be absent.
    ///
    /// # Errors
    ///
    /// Returns [`VariableSetError::Undefined`] when `value` is `None`.
    pub fn try_set(
        &mut self,
        name: impl Into<String>,
        value: Option<VariableValue>,
    ) -> Result<(), VariableSetError> {
        let name = name.into();
        match value {
            Some(value) => {
                self.set(name, value);
                Ok(())
            }
            None => Err(self.fail(VariableSetError::Undefined { name })),
        }
    }

    /// Sets a variable from a JSON value; only strings and numbers are accepted.
    ///
    /// # Errors
    ///
    /// Returns [`VariableSetError::Undefined`] for a missing value and
    /// [`VariableSetError::UnsupportedType`] for other JSON types.
    pub fn set_from_json(
        &mut self,
        name: impl Into<String>,
        value: Option<&Value>,
    ) -> Result<(), VariableSetError> {
        let name = name.into();
        match value {
            Some(Value::String(s)) => {
                self.set(name, s.as_str());
                Ok(())
            }
            Some(Value::Number(n)) => match n.as_f64() {
                Some(n) => {
                    self.set(name, n);
                    Ok(())
                }
                None => Err(self.fail(VariableSetError::UnsupportedType {
                    name,
                    found: JsonType::Number,
                })),
            },
            None => Err(self.fail(VariableSetError::Undefined { name })),
            Some(other) => {
                let found = JsonType::of(Some(other)).unwrap_or(JsonType::Null);
                Err(self.fail(VariableSetError::UnsupportedType { name, found }))
            }
        }
    }

    /// Records a failure raised by the hook itself.
    pub fn fail(&mut self, error: VariableSetError) -> VariableSetError {
        if self.error.is_none() {
            self.error = Some(error.clone());
        }
        error
    }

    /// Returns the variables assigned through this setter.
    #[must_use]
    pub const fn assigned(&self) -> &BTreeMap<String, VariableValue> {
        &self.assigned
    }

    /// Consumes the setter, returning the assignments or the first failure.
    ///
    /// # Errors
    ///
    /// Returns the first failure recorded by any assignment.
    pub fn finish(self) -> Result<BTreeMap<String, VariableValue>, VariableSetError> {
        match self.error {
            Some(error) => Err(error),
            None => Ok(self.assigned),
        }
    }
}
