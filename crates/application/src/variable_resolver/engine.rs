//! Variable substitution engine
//!
//! Every function here is a pure transform: inputs are borrowed and new
//! values are returned, so step definitions are never altered by a run.

use std::collections::BTreeMap;

use dratt_domain::{
    ArrayIncludesMatcher, Expectation, Matcher, RequestSpec, Template, VariablePlaceholder,
    VariableStore, VariableType,
};
use thiserror::Error;

use super::parser::parse_variables;

/// Failure to resolve a single variable.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum VariableError {
    /// No variable with this name exists in scope.
    #[error("Variable named '{name}' was not defined")]
    UndefinedVariable {
        /// Variable name.
        name: String,
    },

    /// A number placeholder refers to a value that is not a finite number.
    #[error("Variable named '{name}' with value '{value}' could not be used as a number")]
    InvalidNumericVariable {
        /// Variable name.
        name: String,
        /// The stored value.
        value: String,
    },
}

/// A [`VariableError`] annotated with what was being substituted.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Variable substitution error - substitution on {target}: {source}")]
pub struct SubstitutionError {
    /// What was being substituted, e.g. `url 'http://${host}'`.
    pub target: String,
    /// The underlying failure.
    #[source]
    pub source: VariableError,
}

impl SubstitutionError {
    fn new(target: impl Into<String>, source: VariableError) -> Self {
        Self {
            target: target.into(),
            source,
        }
    }
}

/// Replaces every `${name}` in `input` with the display form of its value.
///
/// # Errors
///
/// Returns [`VariableError::UndefinedVariable`] for the first unknown name.
pub fn substitute_variables_in_string(
    store: &VariableStore,
    input: &str,
) -> Result<String, VariableError> {
    let references = parse_variables(input);
    if references.is_empty() {
        return Ok(input.to_string());
    }

    let mut result = String::with_capacity(input.len());
    let mut last_end = 0;

    for reference in &references {
        result.push_str(&input[last_end..reference.span.start]);
        let value = store
            .get(&reference.name)
            .ok_or_else(|| VariableError::UndefinedVariable {
                name: reference.name.clone(),
            })?;
        result.push_str(&value.to_string());
        last_end = reference.span.end;
    }

    result.push_str(&input[last_end..]);
    Ok(result)
}

/// Returns a copy of `template` with every placeholder node replaced by its
/// value, coerced to the placeholder's declared type.
///
/// The walk descends into objects, arrays and array-includes matcher items.
///
/// # Errors
///
/// Returns [`VariableError::UndefinedVariable`] for unknown names and
/// [`VariableError::InvalidNumericVariable`] when a number placeholder's value
/// does not parse as a finite number.
pub fn substitute_variables_on_template(
    template: &Template,
    store: &VariableStore,
) -> Result<Template, VariableError> {
    match template {
        Template::Variable(placeholder) => resolve_placeholder(placeholder, store),
        Template::Array(items) => items
            .iter()
            .map(|item| substitute_variables_on_template(item, store))
            .collect::<Result<Vec<_>, _>>()
            .map(Template::Array),
        Template::Object(fields) => fields
            .iter()
            .map(|(key, value)| Ok((key.clone(), substitute_variables_on_template(value, store)?)))
            .collect::<Result<BTreeMap<_, _>, VariableError>>()
            .map(Template::Object),
        Template::Matcher(Matcher::ArrayIncludes(matcher)) => matcher
            .items
            .iter()
            .map(|item| substitute_variables_on_template(item, store))
            .collect::<Result<Vec<_>, _>>()
            .map(|items| Template::Matcher(Matcher::ArrayIncludes(ArrayIncludesMatcher { items }))),
        Template::Matcher(Matcher::Type(_))
        | Template::Null
        | Template::Bool(_)
        | Template::Number(_)
        | Template::String(_) => Ok(template.clone()),
    }
}

fn resolve_placeholder(
    placeholder: &VariablePlaceholder,
    store: &VariableStore,
) -> Result<Template, VariableError> {
    let value = store
        .get(&placeholder.name)
        .ok_or_else(|| VariableError::UndefinedVariable {
            name: placeholder.name.clone(),
        })?;

    match placeholder.variable_type {
        VariableType::String => Ok(Template::String(value.to_string())),
        VariableType::Number => value
            .as_json_number()
            .map(Template::Number)
            .ok_or_else(|| VariableError::InvalidNumericVariable {
                name: placeholder.name.clone(),
                value: value.to_string(),
            }),
    }
}

/// Substitutes the request URL and, for methods that carry one, its body.
///
/// `variables` is the combined suite and test scope.
///
/// # Errors
///
/// Returns a [`SubstitutionError`] naming the URL or the request body.
pub fn substitute_variables_in_request(
    variables: &VariableStore,
    request: &RequestSpec,
) -> Result<RequestSpec, SubstitutionError> {
    let url = substitute_variables_in_string(variables, &request.url)
        .map_err(|e| SubstitutionError::new(format!("url '{}'", request.url), e))?;

    let body = match &request.body {
        Some(body) if request.method.has_body() => Some(
            substitute_variables_on_template(body, variables)
                .map_err(|e| SubstitutionError::new("request body", e))?,
        ),
        other => other.clone(),
    };

    Ok(RequestSpec {
        method: request.method,
        url,
        body,
    })
}

/// Substitutes placeholders in the expected body of every body expectation.
///
/// # Errors
///
/// Returns a [`SubstitutionError`] naming the first failing expectation.
pub fn substitute_variables_in_expectations(
    variables: &VariableStore,
    expectations: &[Expectation],
) -> Result<Vec<Expectation>, SubstitutionError> {
    expectations
        .iter()
        .map(|expectation| match expectation.expected_body() {
            Some(body) => substitute_variables_on_template(body, variables)
                .map(|body| expectation.with_expected_body(body))
                .map_err(|e| {
                    SubstitutionError::new(format!("expectation '{}'", expectation.description()), e)
                }),
            None => Ok(expectation.clone()),
        })
        .collect()
}
