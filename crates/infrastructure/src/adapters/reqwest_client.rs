//! HTTP Client implementation using reqwest.
//!
//! This adapter implements the `HttpClient` port using the reqwest library.
//! Request bodies are sent as JSON; response bodies are decoded according to
//! their `Content-Type`.

use std::time::{Duration, Instant};

use dratt_application::ports::{HttpClient, HttpClientError, HttpFuture};
use dratt_domain::{HttpMethod, RequestSpec, ResponseSpec};
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Method, Response, Url};
use serde_json::Value;
use tracing::trace;

/// Settings for [`ReqwestHttpClient`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpClientConfig {
    /// Per-request timeout in milliseconds.
    pub timeout_ms: u64,
    /// Value of the `User-Agent` header.
    pub user_agent: String,
    /// Maximum number of redirects to follow.
    pub max_redirects: usize,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 30_000,
            user_agent: format!("dratt/{}", env!("CARGO_PKG_VERSION")),
            max_redirects: 10,
        }
    }
}

impl HttpClientConfig {
    /// Sets the timeout (builder pattern).
    #[must_use]
    pub const fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Sets the user agent (builder pattern).
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

/// HTTP client implementation using reqwest.
///
/// Wraps `reqwest::Client` and implements the `HttpClient` port from the
/// application layer.
pub struct ReqwestHttpClient {
    client: Client,
    config: HttpClientConfig,
}

impl ReqwestHttpClient {
    /// Creates a new HTTP client.
    ///
    /// # Errors
    ///
    /// Returns an error if the client cannot be created.
    pub fn new(config: HttpClientConfig) -> Result<Self, HttpClientError> {
        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(Duration::from_millis(config.timeout_ms))
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .build()
            .map_err(|e| HttpClientError::Other(e.to_string()))?;

        Ok(Self { client, config })
    }

    /// Returns the active configuration.
    #[must_use]
    pub const fn config(&self) -> &HttpClientConfig {
        &self.config
    }

    /// Converts domain `HttpMethod` to reqwest `Method`.
    const fn to_reqwest_method(method: HttpMethod) -> Method {
        match method {
            HttpMethod::Get => Method::GET,
            HttpMethod::Post => Method::POST,
            HttpMethod::Put => Method::PUT,
            HttpMethod::Delete => Method::DELETE,
        }
    }

    /// Returns true for `application/json` and `application/problem+json`.
    fn is_json_content_type(content_type: &str) -> bool {
        content_type
            .parse::<mime::Mime>()
            .is_ok_and(|mime| {
                mime.type_() == mime::APPLICATION
                    && (mime.subtype() == mime::JSON
                        || (mime.subtype() == "problem" && mime.suffix() == Some(mime::JSON)))
            })
    }

    /// Reads and decodes the response body.
    ///
    /// JSON content types are parsed, anything else is kept as text. An empty
    /// body yields `None`.
    async fn read_body(response: Response) -> Result<Option<Value>, HttpClientError> {
        let is_json = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .is_some_and(Self::is_json_content_type);

        let text = response
            .text()
            .await
            .map_err(|e| HttpClientError::ResponseRead(e.to_string()))?;

        if text.is_empty() {
            return Ok(None);
        }
        if is_json {
            return serde_json::from_str(&text)
                .map(Some)
                .map_err(|e| HttpClientError::ResponseRead(format!("invalid JSON body: {e}")));
        }
        Ok(Some(Value::String(text)))
    }

    /// Maps reqwest errors to domain `HttpClientError`.
    fn map_error(error: &reqwest::Error, config: &HttpClientConfig) -> HttpClientError {
        if error.is_timeout() {
            return HttpClientError::Timeout {
                timeout_ms: config.timeout_ms,
            };
        }

        let host = || {
            error
                .url()
                .and_then(|u| u.host_str().map(str::to_string))
                .unwrap_or_else(|| "unknown".to_string())
        };

        if error.is_connect() {
            let message = error.to_string();
            let lowered = message.to_lowercase();
            if lowered.contains("dns") || lowered.contains("resolve") {
                return HttpClientError::DnsError {
                    host: host(),
                    message,
                };
            }
            if lowered.contains("refused") {
                return HttpClientError::ConnectionRefused {
                    host: host(),
                    port: error
                        .url()
                        .and_then(Url::port_or_known_default)
                        .unwrap_or(80),
                };
            }
            return HttpClientError::ConnectionFailed(message);
        }

        if error.is_redirect() {
            return HttpClientError::TooManyRedirects {
                max: config.max_redirects,
            };
        }

        if error.is_builder() {
            return HttpClientError::InvalidUrl(error.to_string());
        }

        HttpClientError::Other(error.to_string())
    }
}

impl HttpClient for ReqwestHttpClient {
    fn execute<'a>(&'a self, request: &'a RequestSpec) -> HttpFuture<'a> {
        Box::pin(async move {
            let url = Url::parse(&request.url)
                .map_err(|e| HttpClientError::InvalidUrl(format!("{e}: {}", request.url)))?;
            let body = request
                .body_json()
                .map_err(|e| HttpClientError::InvalidBody(e.to_string()))?;

            let start = Instant::now();

            let mut builder = self
                .client
                .request(Self::to_reqwest_method(request.method), url);
            if let Some(body) = &body {
                builder = builder.json(body);
            }

            trace!(method = %request.method, url = %request.url, "dispatching request");
            let response = builder
                .send()
                .await
                .map_err(|e| Self::map_error(&e, &self.config))?;

            let status = response.status();
            let final_url = response.url().to_string();
            let body = Self::read_body(response).await?;

            Ok(ResponseSpec::new(status.as_u16(), body)
                .with_url(final_url)
                .with_status_text(status.canonical_reason().unwrap_or_default())
                .with_duration(start.elapsed()))
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use axum::http::{StatusCode, header};
    use axum::routing::{get, post};
    use axum::{Json, Router};
    use dratt_domain::{ErrorKind, Template, VariableType};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    async fn spawn_server(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, router).await.unwrap() });
        format!("http://{addr}")
    }

    fn router() -> Router {
        Router::new()
            .route(
                "/todos",
                post(|Json(body): Json<Value>| async move { (StatusCode::CREATED, Json(body)) }),
            )
            .route(
                "/todos/1",
                get(|| async { Json(json!({"id": 1, "title": "write docs"})) })
                    .delete(|| async { StatusCode::NO_CONTENT }),
            )
            .route("/text", get(|| async { "hello" }))
            .route(
                "/problem",
                get(|| async {
                    (
                        StatusCode::BAD_REQUEST,
                        [(header::CONTENT_TYPE, "application/problem+json")],
                        r#"{"title":"bad"}"#,
                    )
                }),
            )
            .route(
                "/broken",
                get(|| async { ([(header::CONTENT_TYPE, "application/json")], "{broken") }),
            )
    }

    fn client() -> ReqwestHttpClient {
        ReqwestHttpClient::new(HttpClientConfig::default().with_timeout_ms(5_000)).unwrap()
    }

    #[test]
    fn test_to_reqwest_method() {
        assert_eq!(
            ReqwestHttpClient::to_reqwest_method(HttpMethod::Get),
            Method::GET
        );
        assert_eq!(
            ReqwestHttpClient::to_reqwest_method(HttpMethod::Post),
            Method::POST
        );
        assert_eq!(
            ReqwestHttpClient::to_reqwest_method(HttpMethod::Put),
            Method::PUT
        );
        assert_eq!(
            ReqwestHttpClient::to_reqwest_method(HttpMethod::Delete),
            Method::DELETE
        );
    }

    #[test]
    fn test_json_content_types() {
        assert!(ReqwestHttpClient::is_json_content_type("application/json"));
        assert!(ReqwestHttpClient::is_json_content_type(
            "application/json; charset=utf-8"
        ));
        assert!(ReqwestHttpClient::is_json_content_type(
            "application/problem+json"
        ));
        assert!(!ReqwestHttpClient::is_json_content_type("text/plain"));
        assert!(!ReqwestHttpClient::is_json_content_type("application/xml"));
        assert!(!ReqwestHttpClient::is_json_content_type("not a mime"));
    }

    #[test]
    fn test_client_creation() {
        let client = ReqwestHttpClient::new(HttpClientConfig::default());
        assert!(client.is_ok());
        assert!(client.unwrap().config().user_agent.starts_with("dratt/"));
    }

    #[tokio::test]
    async fn test_json_round_trip() {
        let base = spawn_server(router()).await;
        let request = RequestSpec::post(
            format!("{base}/todos"),
            Template::from(json!({"title": "write docs"})),
        );

        let response = client().execute(&request).await.unwrap();

        assert_eq!(response.status, 201);
        assert_eq!(response.status_text, "Created");
        assert_eq!(response.body, Some(json!({"title": "write docs"})));
        assert_eq!(response.url, format!("{base}/todos"));
    }

    #[tokio::test]
    async fn test_body_decoding() {
        let base = spawn_server(router()).await;
        let client = client();

        let text = client
            .execute(&RequestSpec::get(format!("{base}/text")))
            .await
            .unwrap();
        assert_eq!(text.body, Some(Value::String("hello".to_string())));

        let problem = client
            .execute(&RequestSpec::get(format!("{base}/problem")))
            .await
            .unwrap();
        assert_eq!(problem.status, 400);
        assert_eq!(problem.body, Some(json!({"title": "bad"})));

        let empty = client
            .execute(&RequestSpec::delete(format!("{base}/todos/1")))
            .await
            .unwrap();
        assert_eq!(empty.status, 204);
        assert_eq!(empty.body, None);
    }

    #[tokio::test]
    async fn test_delete_ignores_body() {
        let base = spawn_server(router()).await;
        let request = RequestSpec::delete(format!("{base}/todos/1")).with_body(
            Template::object().with_field("id", Template::variable("id", VariableType::Number)),
        );

        let response = client().execute(&request).await.unwrap();

        assert_eq!(response.status, 204);
    }

    #[tokio::test]
    async fn test_invalid_json_is_a_read_error() {
        let base = spawn_server(router()).await;

        let error = client()
            .execute(&RequestSpec::get(format!("{base}/broken")))
            .await
            .unwrap_err();

        assert!(matches!(error, HttpClientError::ResponseRead(_)));
        assert_eq!(error.to_error_kind(), ErrorKind::ResponseRead);
    }

    #[tokio::test]
    async fn test_connection_failure_is_an_api_call_error() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let error = client()
            .execute(&RequestSpec::get(format!("http://{addr}/todos")))
            .await
            .unwrap_err();

        assert_eq!(error.to_error_kind(), ErrorKind::ApiCall);
    }

    #[tokio::test]
    async fn test_invalid_url() {
        let error = client()
            .execute(&RequestSpec::get("http://"))
            .await
            .unwrap_err();
        assert!(matches!(error, HttpClientError::InvalidUrl(_)));
    }
}
