//! Typed client for the Wheelhouse backend REST API.
//!
//! # Architecture
//!
//! - The backend owns pricing, stock, orders and users; this client only
//!   forwards requests and decodes responses
//! - One [`ApiClient`] per process, cheaply cloneable (`Arc` inside)
//! - Endpoint groups live in their own modules as `impl ApiClient` blocks
//! - The car catalogue cascade is cached via `moka` (5 minute TTL); search,
//!   orders and admin data always hit the backend
//!
//! # Example
//!
//! ```rust,ignore
//! use wheelhouse_storefront::api::{ApiClient, TireQuery};
//!
//! let client = ApiClient::new(&config)?;
//! let results = client
//!     .search_tires(&TireQuery { width: Some(205), page_size: 20, ..Default::default() })
//!     .await?;
//! ```

mod admin;
mod auth;
mod cache;
mod cars;
mod cart;
mod conversions;
mod orders;
mod products;
pub mod types;

pub use conversions::{product_from_raw, product_from_remote, remote_item_from_line};
pub use products::SearchResults;
pub use types::*;

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::instrument;

use crate::config::StorefrontConfig;

/// Maximum characters of a response body kept in logs and errors.
const BODY_PREVIEW_CHARS: usize = 300;

/// Empty query string.
const NO_QUERY: &[(&str, &str)] = &[];

/// Errors that can occur when talking to the backend.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP request failed (connect, timeout, body read).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Backend answered with a non-success status.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Backend answered 2xx but flagged the call as unsuccessful.
    #[error("Request rejected: {0}")]
    Rejected(String),

    /// Response body did not match the expected shape.
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

impl ApiError {
    /// HTTP status returned by the backend, if any.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// The backend refused the user (blocked or not an admin).
    #[must_use]
    pub const fn is_forbidden(&self) -> bool {
        matches!(self.status(), Some(403))
    }

    /// The requested resource does not exist.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self.status(), Some(404))
    }

    /// The backend's own explanation, when it sent one.
    #[must_use]
    pub fn detail(&self) -> Option<&str> {
        match self {
            Self::Api { message, .. } | Self::Rejected(message) if !message.is_empty() => {
                Some(message)
            }
            _ => None,
        }
    }
}

// =============================================================================
// ApiClient
// =============================================================================

/// Client for the backend REST API.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    client: reqwest::Client,
    base_url: String,
    catalogue: Cache<cache::CatalogueKey, Vec<String>>,
}

impl ApiClient {
    /// Create a new backend client.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &StorefrontConfig) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(config.api_timeout)
            .user_agent(concat!("wheelhouse-storefront/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let catalogue = Cache::builder()
            .max_capacity(2_000)
            .time_to_live(Duration::from_secs(300)) // 5 minutes
            .build();

        Ok(Self {
            inner: Arc::new(ApiClientInner {
                client,
                base_url: config.api_url.as_str().trim_end_matches('/').to_string(),
                catalogue,
            }),
        })
    }

    /// Absolute URL for an API path (`/orders/my`).
    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.inner.base_url)
    }

    /// Start a request to an API path.
    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.inner.client.request(method, self.url(path))
    }

    /// Send a request and decode a JSON body.
    #[instrument(skip(self, request), fields(path = %path))]
    async fn execute<T: DeserializeOwned>(
        &self,
        path: &str,
        request: RequestBuilder,
    ) -> Result<T, ApiError> {
        let response = request.send().await?;
        let status = response.status();

        // Get response body as text first for better error diagnostics
        let body = response.text().await?;

        if !status.is_success() {
            tracing::warn!(
                status = %status,
                body = %preview(&body),
                "Backend returned non-success status"
            );
            return Err(ApiError::Api {
                status: status.as_u16(),
                message: error_detail(status, &body),
            });
        }

        serde_json::from_str(&body).map_err(|e| {
            tracing::error!(
                error = %e,
                body = %preview(&body),
                "Failed to parse backend response"
            );
            ApiError::Parse(e)
        })
    }

    async fn get<T: DeserializeOwned, Q: Serialize + ?Sized>(
        &self,
        path: &str,
        query: &Q,
    ) -> Result<T, ApiError> {
        self.execute(path, self.request(Method::GET, path).query(query))
            .await
    }

    async fn send_json<T: DeserializeOwned, Q: Serialize + ?Sized, B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        query: &Q,
        body: &B,
    ) -> Result<T, ApiError> {
        self.execute(path, self.request(method, path).query(query).json(body))
            .await
    }

    async fn send_empty<T: DeserializeOwned, Q: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        query: &Q,
    ) -> Result<T, ApiError> {
        self.execute(path, self.request(method, path).query(query))
            .await
    }
}

/// Most endpoints identify the caller by a `telegram_id` query parameter.
#[derive(Serialize)]
struct AsUser<'a> {
    telegram_id: &'a str,
}

/// Pull FastAPI's `{"detail": "..."}` out of an error body.
fn error_detail(status: StatusCode, body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| match v.get("detail") {
            Some(serde_json::Value::String(s)) => Some(s.clone()),
            Some(other) => Some(other.to_string()),
            None => None,
        })
        .unwrap_or_else(|| {
            let text = preview(body);
            if text.is_empty() {
                status.canonical_reason().unwrap_or("error").to_string()
            } else {
                text
            }
        })
}

fn preview(body: &str) -> String {
    body.chars().take(BODY_PREVIEW_CHARS).collect()
}

/// Turn a `success: false` flag into an error.
fn ensure_success(success: bool, what: &str) -> Result<(), ApiError> {
    if success {
        Ok(())
    } else {
        Err(ApiError::Rejected(format!("{what} failed")))
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use test_support::client_for;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_error_detail_prefers_fastapi_detail() {
        let detail = error_detail(StatusCode::FORBIDDEN, r#"{"detail":"Пользователь заблокирован"}"#);
        assert_eq!(detail, "Пользователь заблокирован");

        let detail = error_detail(StatusCode::BAD_GATEWAY, "");
        assert_eq!(detail, "Bad Gateway");
    }

    #[test]
    fn test_api_error_classification() {
        let err = ApiError::Api {
            status: 403,
            message: "blocked".to_string(),
        };
        assert!(err.is_forbidden());
        assert!(!err.is_not_found());
        assert_eq!(err.detail(), Some("blocked"));
    }

    #[tokio::test]
    async fn test_execute_maps_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/orders/my"))
            .respond_with(
                ResponseTemplate::new(403).set_body_json(serde_json::json!({"detail": "blocked"})),
            )
            .mount(&server)
            .await;

        let client = client_for(&server.uri());
        let result: Result<serde_json::Value, _> = client.get("/orders/my", NO_QUERY).await;

        let err = result.expect_err("403 must fail");
        assert!(err.is_forbidden());
        assert_eq!(err.detail(), Some("blocked"));
    }

    #[tokio::test]
    async fn test_execute_reports_parse_errors() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/cars/brands"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .mount(&server)
            .await;

        let client = client_for(&server.uri());
        let result: Result<serde_json::Value, _> = client.get("/cars/brands", NO_QUERY).await;

        assert!(matches!(result, Err(ApiError::Parse(_))));
    }
}
