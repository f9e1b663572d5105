//! Telegram user registration.

use reqwest::Method;
use tracing::instrument;

use super::types::{TelegramAuthRequest, User};
use super::{ApiClient, ApiError, NO_QUERY};

impl ApiClient {
    /// Register or look up a Telegram user.
    ///
    /// The backend creates the user on first contact and reports admin and
    /// blocked flags.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails; a blocked user gets a 403
    /// ([`ApiError::is_forbidden`]).
    #[instrument(skip(self, request), fields(telegram_id = %request.telegram_id))]
    pub async fn authenticate(&self, request: &TelegramAuthRequest) -> Result<User, ApiError> {
        let user: User = self
            .send_json(Method::POST, "/auth/telegram", NO_QUERY, request)
            .await?;
        tracing::info!(is_admin = user.is_admin, "Telegram user authenticated");
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::test_support::client_for;
    use serde_json::json;
    use wheelhouse_core::TelegramId;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn request() -> TelegramAuthRequest {
        TelegramAuthRequest {
            telegram_id: TelegramId::from("42"),
            username: Some("rider".to_string()),
            first_name: Some("Анна".to_string()),
            last_name: None,
        }
    }

    #[tokio::test]
    async fn test_authenticate_returns_user() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/auth/telegram"))
            .and(body_json(json!({
                "telegram_id": "42",
                "username": "rider",
                "first_name": "Анна",
                "last_name": null
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "telegram_id": "42",
                "username": "rider",
                "first_name": "Анна",
                "is_admin": true,
                "created_at": "2025-01-01T00:00:00"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server.uri());
        let user = client.authenticate(&request()).await.expect("user");

        assert!(user.is_admin);
        assert!(!user.is_blocked);
        assert_eq!(user.display_name(), "Анна");
    }

    #[tokio::test]
    async fn test_blocked_user_is_forbidden() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/auth/telegram"))
            .respond_with(
                ResponseTemplate::new(403)
                    .set_body_json(json!({ "detail": "Пользователь заблокирован" })),
            )
            .mount(&server)
            .await;

        let client = client_for(&server.uri());
        let err = client.authenticate(&request()).await.expect_err("blocked");

        assert!(err.is_forbidden());
        assert_eq!(err.detail(), Some("Пользователь заблокирован"));
    }
}
