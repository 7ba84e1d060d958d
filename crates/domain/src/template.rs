//! JSON-like value templates.
//!
//! A [`Template`] is what authors write for request bodies and expected
//! response bodies: plain JSON plus two extra node kinds, matchers and typed
//! variable placeholders. Templates are read-only definitions; substitution
//! produces new templates.
//!
//! In files and serialized reports, the extra node kinds use a reserved
//! single-object notation:
//!
//! | node                         | notation                                  |
//! |------------------------------|-------------------------------------------|
//! | type matcher                 | `{"$type": "number"}`                     |
//! | array-includes matcher       | `{"$arrayIncludes": [1, 2]}`              |
//! | variable placeholder         | `{"$var": "todoId", "$as": "number"}`     |

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Number, Value};

use crate::error::{DomainError, DomainResult};
use crate::matcher::{ArrayIncludesMatcher, JsonType, Matcher, TypeMatcher};

const TYPE_KEY: &str = "$type";
const ARRAY_INCLUDES_KEY: &str = "$arrayIncludes";
const VARIABLE_KEY: &str = "$var";
const VARIABLE_TYPE_KEY: &str = "$as";

/// Declared type of a variable placeholder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VariableType {
    /// Substitute the value as a JSON string.
    #[default]
    String,
    /// Parse the value as a float and substitute a JSON number.
    Number,
}

impl VariableType {
    /// Returns the type name as a static string.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
        }
    }
}

impl fmt::Display for VariableType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VariableType {
    type Err = DomainError;

    fn from_str(s: &str) -> DomainResult<Self> {
        match s {
            "string" => Ok(Self::String),
            "number" => Ok(Self::Number),
            other => Err(DomainError::InvalidTemplate(format!(
                "variable type must be 'string' or 'number', got '{other}'"
            ))),
        }
    }
}

/// A typed placeholder replaced by a variable's value at run time.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VariablePlaceholder {
    /// Name of the variable to look up.
    pub name: String,
    /// Type the value is coerced to.
    pub variable_type: VariableType,
}

/// A JSON-like tree that may contain matchers and variable placeholders.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Template {
    /// JSON `null`.
    #[default]
    Null,
    /// JSON boolean.
    Bool(bool),
    /// JSON number.
    Number(Number),
    /// JSON string.
    String(String),
    /// JSON array.
    Array(Vec<Template>),
    /// JSON object.
    Object(BTreeMap<String, Template>),
    /// A matcher evaluated against the actual value at this position.
    Matcher(Matcher),
    /// A placeholder substituted before the template is used.
    Variable(VariablePlaceholder),
}

impl Template {
    /// Creates an empty object template.
    #[must_use]
    pub const fn object() -> Self {
        Self::Object(BTreeMap::new())
    }

    /// Creates an array template.
    pub fn array_of<I, T>(items: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Self>,
    {
        Self::Array(items.into_iter().map(Into::into).collect())
    }

    /// Creates a variable placeholder node.
    pub fn variable(name: impl Into<String>, variable_type: VariableType) -> Self {
        Self::Variable(VariablePlaceholder {
            name: name.into(),
            variable_type,
        })
    }

    /// Sets `key` to `value` and returns the template (builder pattern).
    ///
    /// A non-object template is replaced by an object holding only the new field.
    #[must_use]
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Self>) -> Self {
        if let Self::Object(fields) = &mut self {
            fields.insert(key.into(), value.into());
            self
        } else {
            Self::Object(BTreeMap::from([(key.into(), value.into())]))
        }
    }

    /// Returns true for strings, numbers and booleans.
    #[must_use]
    pub const fn is_primitive(&self) -> bool {
        matches!(self, Self::Bool(_) | Self::Number(_) | Self::String(_))
    }

    /// Returns true for arrays and objects.
    #[must_use]
    pub const fn is_composite(&self) -> bool {
        matches!(self, Self::Array(_) | Self::Object(_))
    }

    /// Returns true if the tree contains no matchers and no placeholders.
    #[must_use]
    pub fn is_literal(&self) -> bool {
        match self {
            Self::Matcher(_) | Self::Variable(_) => false,
            Self::Array(items) => items.iter().all(Self::is_literal),
            Self::Object(fields) => fields.values().all(Self::is_literal),
            Self::Null | Self::Bool(_) | Self::Number(_) | Self::String(_) => true,
        }
    }

    /// Converts a literal template into a JSON value.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::InvalidBody`] if the tree still contains a
    /// matcher or an unsubstituted placeholder.
    pub fn to_json(&self) -> DomainResult<Value> {
        match self {
            Self::Null => Ok(Value::Null),
            Self::Bool(b) => Ok(Value::Bool(*b)),
            Self::Number(n) => Ok(Value::Number(n.clone())),
            Self::String(s) => Ok(Value::String(s.clone())),
            Self::Array(items) => items
                .iter()
                .map(Self::to_json)
                .collect::<DomainResult<Vec<_>>>()
                .map(Value::Array),
            Self::Object(fields) => fields
                .iter()
                .map(|(key, value)| Ok((key.clone(), value.to_json()?)))
                .collect::<DomainResult<Map<_, _>>>()
                .map(Value::Object),
            Self::Matcher(matcher) => Err(DomainError::InvalidBody(format!(
                "a {} cannot be sent as data",
                matcher.tag()
            ))),
            Self::Variable(placeholder) => Err(DomainError::InvalidBody(format!(
                "variable '{}' was not substituted",
                placeholder.name
            ))),
        }
    }

    /// Parses a JSON value written in template notation.
    ///
    /// Objects carrying one of the reserved keys (`$type`, `$arrayIncludes`,
    /// `$var`) become matchers or placeholders; everything else is literal.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::InvalidTemplate`] when a reserved key is used
    /// with extra keys or a value of the wrong shape.
    pub fn from_notation(value: Value) -> DomainResult<Self> {
        match value {
            Value::Object(map) if is_marker(&map) => parse_marker(map),
            Value::Object(map) => map
                .into_iter()
                .map(|(key, value)| Ok((key, Self::from_notation(value)?)))
                .collect::<DomainResult<BTreeMap<_, _>>>()
                .map(Self::Object),
            Value::Array(items) => items
                .into_iter()
                .map(Self::from_notation)
                .collect::<DomainResult<Vec<_>>>()
                .map(Self::Array),
            other => Ok(Self::from(other)),
        }
    }

    /// Renders the template as JSON, writing matchers and placeholders in
    /// template notation.
    #[must_use]
    pub fn to_notation(&self) -> Value {
        match self {
            Self::Null => Value::Null,
            Self::Bool(b) => Value::Bool(*b),
            Self::Number(n) => Value::Number(n.clone()),
            Self::String(s) => Value::String(s.clone()),
            Self::Array(items) => Value::Array(items.iter().map(Self::to_notation).collect()),
            Self::Object(fields) => Value::Object(
                fields
                    .iter()
                    .map(|(key, value)| (key.clone(), value.to_notation()))
                    .collect(),
            ),
            Self::Matcher(Matcher::Type(TypeMatcher { expected })) => {
                single_entry(TYPE_KEY, Value::String(expected.as_str().to_string()))
            }
            Self::Matcher(Matcher::ArrayIncludes(ArrayIncludesMatcher { items })) => single_entry(
                ARRAY_INCLUDES_KEY,
                Value::Array(items.iter().map(Self::to_notation).collect()),
            ),
            Self::Variable(placeholder) => {
                let mut map = Map::new();
                map.insert(
                    VARIABLE_KEY.to_string(),
                    Value::String(placeholder.name.clone()),
                );
                map.insert(
                    VARIABLE_TYPE_KEY.to_string(),
                    Value::String(placeholder.variable_type.as_str().to_string()),
                );
                Value::Object(map)
            }
        }
    }
}

fn is_marker(map: &Map<String, Value>) -> bool {
    map.contains_key(TYPE_KEY)
        || map.contains_key(ARRAY_INCLUDES_KEY)
        || map.contains_key(VARIABLE_KEY)
}

fn single_entry(key: &str, value: Value) -> Value {
    let mut map = Map::new();
    map.insert(key.to_string(), value);
    Value::Object(map)
}

fn parse_marker(mut map: Map<String, Value>) -> DomainResult<Template> {
    if let Some(type_name) = map.remove(TYPE_KEY) {
        reject_extra_keys(TYPE_KEY, &map)?;
        let Value::String(type_name) = type_name else {
            return Err(DomainError::InvalidTemplate(format!(
                "'{TYPE_KEY}' expects a type name, got {type_name}"
            )));
        };
        let expected = type_name.parse::<JsonType>()?;
        return Ok(Template::Matcher(Matcher::of_type(expected)));
    }

    if let Some(items) = map.remove(ARRAY_INCLUDES_KEY) {
        reject_extra_keys(ARRAY_INCLUDES_KEY, &map)?;
        let Value::Array(items) = items else {
            return Err(DomainError::InvalidTemplate(format!(
                "'{ARRAY_INCLUDES_KEY}' expects an array, got {items}"
            )));
        };
        let items = items
            .into_iter()
            .map(Template::from_notation)
            .collect::<DomainResult<Vec<_>>>()?;
        return Ok(Template::Matcher(Matcher::ArrayIncludes(
            ArrayIncludesMatcher { items },
        )));
    }

    let name = match map.remove(VARIABLE_KEY) {
        Some(Value::String(name)) => name,
        Some(other) => {
            return Err(DomainError::InvalidTemplate(format!(
                "'{VARIABLE_KEY}' expects a variable name, got {other}"
            )));
        }
        None => {
            return Err(DomainError::InvalidTemplate(
                "object is not a template marker".to_string(),
            ));
        }
    };
    let variable_type = match map.remove(VARIABLE_TYPE_KEY) {
        None => VariableType::default(),
        Some(Value::String(type_name)) => type_name.parse()?,
        Some(other) => {
            return Err(DomainError::InvalidTemplate(format!(
                "'{VARIABLE_TYPE_KEY}' expects 'string' or 'number', got {other}"
            )));
        }
    };
    reject_extra_keys(VARIABLE_KEY, &map)?;
    Ok(Template::variable(name, variable_type))
}

fn reject_extra_keys(marker: &str, rest: &Map<String, Value>) -> DomainResult<()> {
    if rest.is_empty() {
        return Ok(());
    }
    let extra: Vec<&str> = rest.keys().map(String::as_str).collect();
    Err(DomainError::InvalidTemplate(format!(
        "'{marker}' cannot be combined with other keys ({})",
        extra.join(", ")
    )))
}

impl From<Value> for Template {
    /// Converts plain JSON without interpreting the reserved notation.
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(b) => Self::Bool(b),
            Value::Number(n) => Self::Number(n),
            Value::String(s) => Self::String(s),
            Value::Array(items) => Self::Array(items.into_iter().map(Self::from).collect()),
            Value::Object(map) => Self::Object(
                map.into_iter()
                    .map(|(key, value)| (key, Self::from(value)))
                    .collect(),
            ),
        }
    }
}

impl From<Matcher> for Template {
    fn from(matcher: Matcher) -> Self {
        Self::Matcher(matcher)
    }
}

impl From<VariablePlaceholder> for Template {
    fn from(placeholder: VariablePlaceholder) -> Self {
        Self::Variable(placeholder)
    }
}

impl From<&str> for Template {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for Template {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<bool> for Template {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for Template {
    fn from(value: i64) -> Self {
        Self::Number(value.into())
    }
}

impl From<f64> for Template {
    /// Non-finite floats have no JSON representation and become `null`.
    fn from(value: f64) -> Self {
        Number::from_f64(value).map_or(Self::Null, Self::Number)
    }
}

impl Serialize for Template {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.to_notation().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Template {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Self::from_notation(value).map_err(D::Error::custom)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_from_plain_json_ignores_notation() {
        let template = Template::from(json!({"$type": "number"}));
        assert!(matches!(template, Template::Object(ref fields) if fields.contains_key("$type")));
        assert!(template.is_literal());
    }

    #[test]
    fn test_from_notation_type_matcher() {
        let template = Template::from_notation(json!({"id": {"$type": "number"}})).unwrap();
        let expected = Template::object().with_field("id", Matcher::of_type(JsonType::Number));
        assert_eq!(template, expected);
    }

    #[test]
    fn test_from_notation_array_includes_nested() {
        let template = Template::from_notation(json!({
            "$arrayIncludes": [{"name": {"$var": "name"}}]
        }))
        .unwrap();

        let Template::Matcher(Matcher::ArrayIncludes(matcher)) = template else {
            panic!("expected array includes matcher");
        };
        assert_eq!(
            matcher.items,
            vec![Template::object().with_field("name", Template::variable("name", VariableType::String))]
        );
    }

    #[test]
    fn test_from_notation_variable_with_type() {
        let template = Template::from_notation(json!({"$var": "id", "$as": "number"})).unwrap();
        assert_eq!(template, Template::variable("id", VariableType::Number));
    }

    #[test]
    fn test_from_notation_rejects_extra_keys() {
        let result = Template::from_notation(json!({"$type": "number", "other": 1}));
        assert!(matches!(result, Err(DomainError::InvalidTemplate(_))));
    }

    #[test]
    fn test_from_notation_rejects_unknown_type() {
        let result = Template::from_notation(json!({"$type": "integer"}));
        assert!(matches!(result, Err(DomainError::UnknownJsonType(_))));
    }

    #[test]
    fn test_to_notation_is_inverse_of_from_notation() {
        let source = json!({
            "id": {"$type": "number"},
            "tags": {"$arrayIncludes": ["a", {"$var": "tag", "$as": "string"}]},
            "title": "x"
        });
        let template = Template::from_notation(source.clone()).unwrap();
        assert_eq!(template.to_notation(), source);
    }

    #[test]
    fn test_to_json_rejects_matchers() {
        let template = Template::object().with_field("id", Matcher::of_type(JsonType::Number));
        assert!(matches!(template.to_json(), Err(DomainError::InvalidBody(_))));

        let literal = Template::from(json!({"a": [1, true, null]}));
        assert_eq!(literal.to_json().unwrap(), json!({"a": [1, true, null]}));
    }

    #[test]
    fn test_deserialize_uses_notation() {
        let template: Template = serde_json::from_str(r#"{"n": {"$var": "n", "$as": "number"}}"#).unwrap();
        assert!(!template.is_literal());
    }
}
