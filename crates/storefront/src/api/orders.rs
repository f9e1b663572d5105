//! Order endpoints, for customers and admins.

use reqwest::Method;
use serde::Serialize;
use tracing::instrument;
use wheelhouse_core::{NewOrder, OrderId, OrderStatus, TelegramId};

use super::types::{ActionResult, ConfirmOrder, Order, RejectOrder};
use super::{ApiClient, ApiError, AsUser, ensure_success};

#[derive(Serialize)]
struct StatusFilter<'a> {
    telegram_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    status: Option<&'a str>,
}

#[derive(Serialize)]
struct StatusChange<'a> {
    new_status: &'a str,
    telegram_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    comment: Option<&'a str>,
}

fn order_path(order_id: &OrderId, suffix: &str) -> String {
    format!("/orders/{}{suffix}", urlencoding::encode(order_id.as_str()))
}

impl ApiClient {
    /// Submit a new order for the user.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the backend refuses the order.
    #[instrument(skip(self, order), fields(items = order.items.len()))]
    pub async fn create_order(
        &self,
        telegram_id: &TelegramId,
        order: &NewOrder,
    ) -> Result<Order, ApiError> {
        let query = AsUser {
            telegram_id: telegram_id.as_str(),
        };
        let created: Order = self.send_json(Method::POST, "/orders", &query, order).await?;
        tracing::info!(order_id = %created.order_id, "Order created");
        Ok(created)
    }

    /// The user's own orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails.
    #[instrument(skip(self))]
    pub async fn my_orders(&self, telegram_id: &TelegramId) -> Result<Vec<Order>, ApiError> {
        let query = AsUser {
            telegram_id: telegram_id.as_str(),
        };
        self.get("/orders/my", &query).await
    }

    /// One order, visible to its owner and to admins.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the order is not accessible.
    #[instrument(skip(self))]
    pub async fn order(
        &self,
        telegram_id: &TelegramId,
        order_id: &OrderId,
    ) -> Result<Order, ApiError> {
        let query = AsUser {
            telegram_id: telegram_id.as_str(),
        };
        self.get(&order_path(order_id, ""), &query).await
    }

    /// Orders waiting for admin confirmation.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the user is not an admin.
    #[instrument(skip(self))]
    pub async fn pending_orders(&self, admin: &TelegramId) -> Result<Vec<Order>, ApiError> {
        let query = AsUser {
            telegram_id: admin.as_str(),
        };
        self.get("/orders/admin/pending", &query).await
    }

    /// All orders, optionally filtered by status.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the user is not an admin.
    #[instrument(skip(self))]
    pub async fn all_orders(
        &self,
        admin: &TelegramId,
        status: Option<&OrderStatus>,
    ) -> Result<Vec<Order>, ApiError> {
        let query = StatusFilter {
            telegram_id: admin.as_str(),
            status: status.map(OrderStatus::as_str),
        };
        self.get("/orders/admin/all", &query).await
    }

    /// Confirm a pending order.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the order cannot be confirmed.
    #[instrument(skip(self))]
    pub async fn confirm_order(
        &self,
        admin: &TelegramId,
        order_id: &OrderId,
        comment: Option<String>,
    ) -> Result<Order, ApiError> {
        let query = AsUser {
            telegram_id: admin.as_str(),
        };
        let body = ConfirmOrder {
            admin_comment: comment,
        };
        self.send_json(Method::POST, &order_path(order_id, "/confirm"), &query, &body)
            .await
    }

    /// Reject a pending order with a reason shown to the customer.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the order cannot be rejected.
    #[instrument(skip(self))]
    pub async fn reject_order(
        &self,
        admin: &TelegramId,
        order_id: &OrderId,
        reason: &str,
    ) -> Result<Order, ApiError> {
        let query = AsUser {
            telegram_id: admin.as_str(),
        };
        let body = RejectOrder {
            reason: reason.to_string(),
        };
        self.send_json(Method::POST, &order_path(order_id, "/reject"), &query, &body)
            .await
    }

    /// Move a confirmed order to another status.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the transition is refused.
    #[instrument(skip(self))]
    pub async fn update_order_status(
        &self,
        admin: &TelegramId,
        order_id: &OrderId,
        status: &OrderStatus,
        comment: Option<&str>,
    ) -> Result<Order, ApiError> {
        let query = StatusChange {
            new_status: status.as_str(),
            telegram_id: admin.as_str(),
            comment: comment.filter(|c| !c.is_empty()),
        };
        self.send_empty(Method::PATCH, &order_path(order_id, "/status"), &query)
            .await
    }

    /// Hide an order from admin listings.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the backend refuses.
    #[instrument(skip(self))]
    pub async fn hide_order(&self, admin: &TelegramId, order_id: &OrderId) -> Result<(), ApiError> {
        let query = AsUser {
            telegram_id: admin.as_str(),
        };
        let result: ActionResult = self
            .send_empty(Method::DELETE, &order_path(order_id, "/hide"), &query)
            .await?;
        ensure_success(result.success, "Hiding order")
    }
}
