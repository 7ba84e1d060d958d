//! HTTP client port

use std::future::Future;
use std::pin::Pin;

use dratt_domain::{ErrorKind, RequestSpec, ResponseSpec};
use thiserror::Error;

/// Boxed future returned by [`HttpClient::execute`].
pub type HttpFuture<'a> =
    Pin<Box<dyn Future<Output = Result<ResponseSpec, HttpClientError>> + Send + 'a>>;

/// Errors reported by an HTTP transport.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum HttpClientError {
    /// The URL could not be parsed.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// The body could not be encoded.
    #[error("Invalid body: {0}")]
    InvalidBody(String),

    /// The host name did not resolve.
    #[error("DNS resolution failed for {host}: {message}")]
    DnsError {
        /// Host that failed to resolve.
        host: String,
        /// Underlying message.
        message: String,
    },

    /// The server refused the connection.
    #[error("Connection refused by {host}:{port}")]
    ConnectionRefused {
        /// Target host.
        host: String,
        /// Target port.
        port: u16,
    },

    /// The connection failed for another reason.
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// The request did not complete in time.
    #[error("Request timed out after {timeout_ms} ms")]
    Timeout {
        /// Applied timeout.
        timeout_ms: u64,
    },

    /// The redirect limit was exceeded.
    #[error("Too many redirects (max {max})")]
    TooManyRedirects {
        /// Redirect limit.
        max: usize,
    },

    /// The response arrived but its body could not be read or decoded.
    #[error("Failed to read response: {0}")]
    ResponseRead(String),

    /// Any other transport failure.
    #[error("{0}")]
    Other(String),
}

impl HttpClientError {
    /// Maps the transport error to the step-level error category.
    #[must_use]
    pub const fn to_error_kind(&self) -> ErrorKind {
        match self {
            Self::InvalidUrl(_) => ErrorKind::InvalidUrl,
            Self::InvalidBody(_) => ErrorKind::InvalidBody,
            Self::ResponseRead(_) => ErrorKind::ResponseRead,
            Self::DnsError { .. }
            | Self::ConnectionRefused { .. }
            | Self::ConnectionFailed(_)
            | Self::Timeout { .. }
            | Self::TooManyRedirects { .. }
            | Self::Other(_) => ErrorKind::ApiCall,
        }
    }
}

/// Port for executing HTTP requests.
///
/// This trait abstracts the HTTP client implementation, allowing
/// the application layer to be independent of specific HTTP libraries.
pub trait HttpClient: Send + Sync {
    /// Executes an HTTP request and returns the decoded response.
    ///
    /// The request is already substituted and validated.
    ///
    /// # Errors
    ///
    /// Returns an error if the request cannot be built, the call fails
    /// (DNS, connection, timeout) or the response cannot be read.
    fn execute<'a>(&'a self, request: &'a RequestSpec) -> HttpFuture<'a>;
}
