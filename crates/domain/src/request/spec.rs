//! Request specification type

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::HttpMethod;
use crate::error::DomainResult;
use crate::template::Template;

/// The HTTP request a step sends.
///
/// Before substitution the URL may contain `${name}` placeholders and the
/// body may contain variable placeholder nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestSpec {
    /// HTTP method
    pub method: HttpMethod,
    /// Target URL
    pub url: String,
    /// Request body, meaningful for methods that carry one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Template>,
}

impl RequestSpec {
    /// Creates a request without a body.
    #[must_use]
    pub fn new(method: HttpMethod, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            body: None,
        }
    }

    /// Creates a GET request.
    #[must_use]
    pub fn get(url: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, url)
    }

    /// Creates a POST request with a body.
    #[must_use]
    pub fn post(url: impl Into<String>, body: impl Into<Template>) -> Self {
        Self::new(HttpMethod::Post, url).with_body(body)
    }

    /// Creates a PUT request with a body.
    #[must_use]
    pub fn put(url: impl Into<String>, body: impl Into<Template>) -> Self {
        Self::new(HttpMethod::Put, url).with_body(body)
    }

    /// Creates a DELETE request.
    #[must_use]
    pub fn delete(url: impl Into<String>) -> Self {
        Self::new(HttpMethod::Delete, url)
    }

    /// Sets the body (builder pattern).
    #[must_use]
    pub fn with_body(mut self, body: impl Into<Template>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Returns true if a body is set and the method sends it.
    #[must_use]
    pub const fn sends_body(&self) -> bool {
        self.method.has_body() && self.body.is_some()
    }

    /// Returns the JSON payload to send, if any.
    ///
    /// Bodies set on GET or DELETE requests are ignored.
    ///
    /// # Errors
    ///
    /// Returns an error if the body still contains matchers or placeholders.
    pub fn body_json(&self) -> DomainResult<Option<Value>> {
        if !self.method.has_body() {
            return Ok(None);
        }
        self.body.as_ref().map(Template::to_json).transpose()
    }
}
