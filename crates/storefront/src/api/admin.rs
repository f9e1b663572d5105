//! Admin console endpoints: markup, statistics, users and activity logs.

use reqwest::Method;
use serde::Serialize;
use tracing::instrument;
use wheelhouse_core::TelegramId;

use super::types::{
    ActionResult, ActivityFilter, ActivityPage, AdminStats, MarkupSettings, ResetResult,
    StatsEnvelope, User, UserMessage, UsersPage,
};
use super::{ApiClient, ApiError, AsUser, ensure_success};

#[derive(Serialize)]
struct ActivityQuery<'a> {
    telegram_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    user_telegram_id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    activity_type: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    limit: Option<u32>,
}

fn user_path(user: &TelegramId, action: &str) -> String {
    format!("/admin/users/{}/{action}", urlencoding::encode(user.as_str()))
}

impl ApiClient {
    /// Current store markup.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the user is not an admin.
    #[instrument(skip(self))]
    pub async fn markup(&self, admin: &TelegramId) -> Result<MarkupSettings, ApiError> {
        let query = AsUser {
            telegram_id: admin.as_str(),
        };
        self.get("/admin/markup", &query).await
    }

    /// Change the store markup.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the value is refused.
    #[instrument(skip(self))]
    pub async fn set_markup(
        &self,
        admin: &TelegramId,
        markup_percentage: f64,
    ) -> Result<MarkupSettings, ApiError> {
        let query = AsUser {
            telegram_id: admin.as_str(),
        };
        let body = MarkupSettings { markup_percentage };
        let updated: MarkupSettings = self
            .send_json(Method::PUT, "/admin/markup", &query, &body)
            .await?;
        tracing::info!(markup = updated.markup_percentage, "Markup updated");
        Ok(updated)
    }

    /// Aggregate order and user counters.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the user is not an admin.
    #[instrument(skip(self))]
    pub async fn stats(&self, admin: &TelegramId) -> Result<AdminStats, ApiError> {
        let query = AsUser {
            telegram_id: admin.as_str(),
        };
        let envelope: StatsEnvelope = self.get("/admin/stats", &query).await?;
        ensure_success(envelope.success, "Statistics")?;
        Ok(envelope.stats)
    }

    /// Reset statistics; returns the number of removed records.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the backend refuses.
    #[instrument(skip(self))]
    pub async fn reset_stats(&self, admin: &TelegramId) -> Result<u64, ApiError> {
        let query = AsUser {
            telegram_id: admin.as_str(),
        };
        let result: ResetResult = self
            .send_empty(Method::DELETE, "/admin/stats/reset", &query)
            .await?;
        ensure_success(result.success, "Statistics reset")?;
        tracing::info!(deleted = result.deleted_count, "Statistics reset");
        Ok(result.deleted_count)
    }

    /// All registered users.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the user is not an admin.
    #[instrument(skip(self))]
    pub async fn users(&self, admin: &TelegramId) -> Result<Vec<User>, ApiError> {
        let query = AsUser {
            telegram_id: admin.as_str(),
        };
        let page: UsersPage = self.get("/admin/users", &query).await?;
        ensure_success(page.success, "User list")?;
        Ok(page.users)
    }

    /// Block a user from using the store.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the backend refuses.
    #[instrument(skip(self))]
    pub async fn block_user(&self, admin: &TelegramId, user: &TelegramId) -> Result<(), ApiError> {
        self.user_action(admin, user, "block").await
    }

    /// Lift a block.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the backend refuses.
    #[instrument(skip(self))]
    pub async fn unblock_user(
        &self,
        admin: &TelegramId,
        user: &TelegramId,
    ) -> Result<(), ApiError> {
        self.user_action(admin, user, "unblock").await
    }

    /// Send a Telegram message to a user through the bot.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the backend refuses.
    #[instrument(skip(self, message))]
    pub async fn message_user(
        &self,
        admin: &TelegramId,
        user: &TelegramId,
        message: &str,
    ) -> Result<(), ApiError> {
        let query = AsUser {
            telegram_id: admin.as_str(),
        };
        let body = UserMessage {
            message: message.to_string(),
        };
        let result: ActionResult = self
            .send_json(Method::POST, &user_path(user, "message"), &query, &body)
            .await?;
        ensure_success(result.success, "Sending message")
    }

    /// Recorded user activity, newest first.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the user is not an admin.
    #[instrument(skip(self))]
    pub async fn activity(
        &self,
        admin: &TelegramId,
        filter: &ActivityFilter,
    ) -> Result<ActivityPage, ApiError> {
        let query = ActivityQuery {
            telegram_id: admin.as_str(),
            user_telegram_id: filter.user_telegram_id.as_deref().filter(|s| !s.is_empty()),
            activity_type: filter.activity_type.as_deref().filter(|s| !s.is_empty()),
            limit: filter.limit,
        };
        let page: ActivityPage = self.get("/admin/activity", &query).await?;
        ensure_success(page.success, "Activity log")?;
        Ok(page)
    }

    /// Delete all activity logs; returns the number of removed records.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the backend refuses.
    #[instrument(skip(self))]
    pub async fn reset_activity(&self, admin: &TelegramId) -> Result<u64, ApiError> {
        let query = AsUser {
            telegram_id: admin.as_str(),
        };
        let result: ResetResult = self
            .send_empty(Method::DELETE, "/admin/activity/reset", &query)
            .await?;
        ensure_success(result.success, "Activity reset")?;
        tracing::info!(deleted = result.deleted_count, "Activity logs reset");
        Ok(result.deleted_count)
    }

    async fn user_action(
        &self,
        admin: &TelegramId,
        user: &TelegramId,
        action: &str,
    ) -> Result<(), ApiError> {
        let query = AsUser {
            telegram_id: admin.as_str(),
        };
        let result: ActionResult = self
            .send_empty(Method::POST, &user_path(user, action), &query)
            .await?;
        ensure_success(result.success, action)?;
        tracing::info!(user = %user, action, "User updated");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::test_support::client_for;
    use serde_json::json;
    use wheelhouse_core::ActivityType;
    use wiremock::matchers::{body_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_set_markup() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/api/admin/markup"))
            .and(query_param("telegram_id", "1"))
            .and(body_json(json!({ "markup_percentage": 20.0 })))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "markup_percentage": 20.0 })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server.uri());
        let settings = client
            .set_markup(&TelegramId::from("1"), 20.0)
            .await
            .expect("markup set");

        assert!((settings.markup_percentage - 20.0).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn test_stats_unwraps_envelope() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/admin/stats"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "stats": { "total_orders": 12, "pending_orders": 3, "total_users": 40, "total_revenue": 125000.5 }
            })))
            .mount(&server)
            .await;

        let client = client_for(&server.uri());
        let stats = client.stats(&TelegramId::from("1")).await.expect("stats");

        assert_eq!(stats.total_orders, 12);
        assert_eq!(stats.pending_orders, 3);
        assert_eq!(stats.total_users, 40);
        assert_eq!(stats.total_revenue.display_rounded(), "125\u{a0}001 ₽");
        assert!(!stats.total_revenue.is_zero());
    }

    #[tokio::test]
    async fn test_block_user_path() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/admin/users/77/block"))
            .and(query_param("telegram_id", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server.uri());
        client
            .block_user(&TelegramId::from("1"), &TelegramId::from("77"))
            .await
            .expect("blocked");
    }

    #[tokio::test]
    async fn test_unsuccessful_action_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/admin/users/77/message"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": false })))
            .mount(&server)
            .await;

        let client = client_for(&server.uri());
        let result = client
            .message_user(&TelegramId::from("1"), &TelegramId::from("77"), "Привет")
            .await;

        assert!(matches!(result, Err(ApiError::Rejected(_))));
    }

    #[tokio::test]
    async fn test_activity_sends_filters() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/admin/activity"))
            .and(query_param("telegram_id", "1"))
            .and(query_param("activity_type", "tire_search"))
            .and(query_param("limit", "50"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "logs": [{ "telegram_id": "42", "activity_type": "tire_search", "result_count": 7 }],
                "total": 1
            })))
            .mount(&server)
            .await;

        let client = client_for(&server.uri());
        let page = client
            .activity(
                &TelegramId::from("1"),
                &ActivityFilter {
                    activity_type: Some("tire_search".to_string()),
                    limit: Some(50),
                    ..ActivityFilter::default()
                },
            )
            .await
            .expect("activity");

        assert_eq!(page.total, 1);
        assert_eq!(page.logs[0].activity_type, ActivityType::TireSearch);
    }

    #[tokio::test]
    async fn test_reset_activity_returns_count() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/api/admin/activity/reset"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "success": true, "deleted_count": 128 })),
            )
            .mount(&server)
            .await;

        let client = client_for(&server.uri());
        let deleted = client
            .reset_activity(&TelegramId::from("1"))
            .await
            .expect("reset");

        assert_eq!(deleted, 128);
    }
}
