//! Execute Request Use Case
//!
//! Validates a substituted request and sends it through the `HttpClient`
//! port.

use std::sync::Arc;

use dratt_domain::{ErrorKind, RequestSpec, ResponseSpec};
use thiserror::Error;
use tracing::debug;

use crate::ports::{HttpClient, HttpClientError};

/// Result type for request execution.
pub type ExecuteResult = Result<ResponseSpec, ExecuteRequestError>;

/// Error type for the execute request use case.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ExecuteRequestError {
    /// URL is empty.
    #[error("URL is required")]
    EmptyUrl,

    /// URL is invalid.
    #[error("Invalid URL '{url}': {reason}")]
    InvalidUrl {
        /// The rejected URL.
        url: String,
        /// Why it was rejected.
        reason: String,
    },

    /// The body cannot be sent as JSON.
    #[error("Invalid request body: {0}")]
    InvalidBody(String),

    /// HTTP request failed.
    #[error("{0}")]
    HttpError(#[from] HttpClientError),
}

impl ExecuteRequestError {
    /// Maps this error to the step-level error category.
    #[must_use]
    pub const fn to_error_kind(&self) -> ErrorKind {
        match self {
            Self::EmptyUrl | Self::InvalidUrl { .. } => ErrorKind::InvalidUrl,
            Self::InvalidBody(_) => ErrorKind::InvalidBody,
            Self::HttpError(e) => e.to_error_kind(),
        }
    }
}

/// Use case for executing HTTP requests.
///
/// # Example
///
/// ```ignore
/// let http_client = ReqwestHttpClient::new(HttpClientConfig::default())?;
/// let use_case = ExecuteRequest::new(Arc::new(http_client));
///
/// let request = RequestSpec::get("https://api.example.com/users");
/// let response = use_case.execute(&request).await?;
/// ```
pub struct ExecuteRequest<C: HttpClient> {
    client: Arc<C>,
}

impl<C: HttpClient> ExecuteRequest<C> {
    /// Creates a new `ExecuteRequest` use case with the given HTTP client.
    pub const fn new(client: Arc<C>) -> Self {
        Self { client }
    }

    /// Executes the request and returns the result.
    ///
    /// # Validation
    ///
    /// - URL must not be empty
    /// - URL must start with http:// or https://
    /// - The body must be plain JSON (no matchers or placeholders)
    ///
    /// # Errors
    ///
    /// Returns `ExecuteRequestError` on validation or HTTP failures.
    pub async fn execute(&self, request: &RequestSpec) -> ExecuteResult {
        Self::validate(request)?;

        debug!(method = %request.method, url = %request.url, "sending request");
        let response = self.client.execute(request).await?;
        debug!(
            status = response.status,
            duration_ms = u64::try_from(response.duration.as_millis()).unwrap_or(u64::MAX),
            "received response"
        );

        Ok(response)
    }

    /// Validates the request before execution.
    fn validate(request: &RequestSpec) -> Result<(), ExecuteRequestError> {
        if request.url.trim().is_empty() {
            return Err(ExecuteRequestError::EmptyUrl);
        }

        if !request.url.starts_with("http://") && !request.url.starts_with("https://") {
            return Err(ExecuteRequestError::InvalidUrl {
                url: request.url.clone(),
                reason: "URL must start with http:// or https://".to_string(),
            });
        }

        request
            .body_json()
            .map_err(|e| ExecuteRequestError::InvalidBody(e.to_string()))?;

        Ok(())
    }
}
