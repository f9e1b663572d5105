//! Unified error handling with Sentry integration.
//!
//! Most backend failures never reach this type: pages catch them at the call
//! site and turn them into a notice. `AppError` is what is left, the request
//! problems a handler cannot recover from. Server-class errors are captured
//! to Sentry before the response is written.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::api::ApiError;
use crate::services::CartStoreError;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Backend call failed where no fallback page exists.
    #[error("Backend error: {0}")]
    Api(#[from] ApiError),

    /// Cart could not be read from or written to the session.
    #[error("Cart error: {0}")]
    CartStore(#[from] CartStoreError),

    /// Session store failed.
    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),
}

impl AppError {
    const fn status(&self) -> StatusCode {
        match self {
            Self::CartStore(_) | Self::Session(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Api(err) if err.is_not_found() => StatusCode::NOT_FOUND,
            Self::Api(err) if err.is_forbidden() => StatusCode::FORBIDDEN,
            Self::Api(_) => StatusCode::BAD_GATEWAY,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Capture server errors to Sentry
        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        // Don't expose internal error details to clients
        let message = match &self {
            Self::CartStore(_) | Self::Session(_) => "Внутренняя ошибка сервера".to_string(),
            Self::Api(_) if status == StatusCode::BAD_GATEWAY => {
                "Сервер магазина недоступен, попробуйте позже".to_string()
            }
            Self::Api(err) => err.detail().unwrap_or("Ошибка запроса").to_string(),
            Self::NotFound(_) => self.to_string(),
        };

        (status, message).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context from a Telegram id.
///
/// Call this after successful authentication to associate errors with users.
pub fn set_sentry_user(telegram_id: &impl ToString, username: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(telegram_id.to_string()),
            username: username.map(String::from),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

/// Add a breadcrumb for user actions.
///
/// ```rust,ignore
/// add_breadcrumb("cart", "Added to cart", Some(&[("code", "T1")]));
/// ```
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}
