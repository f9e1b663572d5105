//! Backend cart mirror.
//!
//! The session cart is authoritative; these calls only keep the backend's
//! copy in step so the cart survives a new session.

use reqwest::Method;
use serde::{Deserialize, Serialize};
use tracing::instrument;
use wheelhouse_core::{ProductCode, TelegramId, WarehouseId};

use super::types::{QuantityUpdate, RemoteCart, RemoteCartItem};
use super::{ApiClient, ApiError, NO_QUERY};

#[derive(Serialize)]
struct WarehouseQuery {
    warehouse_id: i32,
}

/// The backend answers cart mutations with a free-form message.
#[derive(Deserialize)]
struct CartAck {
    #[serde(default)]
    message: Option<String>,
}

fn cart_path(telegram_id: &TelegramId) -> String {
    format!("/cart/{}", urlencoding::encode(telegram_id.as_str()))
}

fn item_path(telegram_id: &TelegramId, code: &ProductCode) -> String {
    format!(
        "{}/items/{}",
        cart_path(telegram_id),
        urlencoding::encode(code.as_str())
    )
}

impl ApiClient {
    /// The backend's copy of the user's cart.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails.
    #[instrument(skip(self))]
    pub async fn remote_cart(&self, telegram_id: &TelegramId) -> Result<RemoteCart, ApiError> {
        self.get(&cart_path(telegram_id), NO_QUERY).await
    }

    /// Add an item (or increase its quantity) in the backend cart.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails.
    #[instrument(skip(self, item), fields(code = %item.code))]
    pub async fn remote_add_item(
        &self,
        telegram_id: &TelegramId,
        item: &RemoteCartItem,
    ) -> Result<(), ApiError> {
        let path = format!("{}/items", cart_path(telegram_id));
        let ack: CartAck = self.send_json(Method::POST, &path, NO_QUERY, item).await?;
        tracing::debug!(message = ?ack.message, "Backend cart item added");
        Ok(())
    }

    /// Replace the quantity of a backend cart item.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails.
    #[instrument(skip(self))]
    pub async fn remote_update_item(
        &self,
        telegram_id: &TelegramId,
        code: &ProductCode,
        warehouse_id: WarehouseId,
        quantity: u32,
    ) -> Result<(), ApiError> {
        let query = WarehouseQuery {
            warehouse_id: warehouse_id.as_i32(),
        };
        let ack: CartAck = self
            .send_json(
                Method::PUT,
                &item_path(telegram_id, code),
                &query,
                &QuantityUpdate { quantity },
            )
            .await?;
        tracing::debug!(message = ?ack.message, "Backend cart item updated");
        Ok(())
    }

    /// Remove an item from the backend cart.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails.
    #[instrument(skip(self))]
    pub async fn remote_remove_item(
        &self,
        telegram_id: &TelegramId,
        code: &ProductCode,
        warehouse_id: WarehouseId,
    ) -> Result<(), ApiError> {
        let query = WarehouseQuery {
            warehouse_id: warehouse_id.as_i32(),
        };
        let ack: CartAck = self
            .send_empty(Method::DELETE, &item_path(telegram_id, code), &query)
            .await?;
        tracing::debug!(message = ?ack.message, "Backend cart item removed");
        Ok(())
    }

    /// Empty the backend cart.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails.
    #[instrument(skip(self))]
    pub async fn remote_clear(&self, telegram_id: &TelegramId) -> Result<(), ApiError> {
        let ack: CartAck = self
            .send_empty(Method::DELETE, &cart_path(telegram_id), NO_QUERY)
            .await?;
        tracing::debug!(message = ?ack.message, "Backend cart cleared");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::test_support::client_for;
    use serde_json::json;
    use wiremock::matchers::{body_json, body_partial_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_remote_cart() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/cart/42"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "telegram_id": "42",
                "items": [{
                    "code": "T1", "name": "Nokian Nordman 8", "brand": "Nokian",
                    "quantity": 2, "price": 5750, "warehouse_id": 1, "warehouse_name": "Москва"
                }]
            })))
            .mount(&server)
            .await;

        let client = client_for(&server.uri());
        let cart = client
            .remote_cart(&TelegramId::from("42"))
            .await
            .expect("cart");

        assert_eq!(cart.items.len(), 1);
        assert_eq!(cart.items[0].quantity, 2);
    }

    #[tokio::test]
    async fn test_add_item_posts_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/cart/42/items"))
            .and(body_partial_json(json!({ "code": "T1", "quantity": 1 })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "message": "Item added to cart", "cart_items_count": 1
            })))
            .expect(1)
            .mount(&server)
            .await;

        let item: RemoteCartItem = serde_json::from_value(json!({
            "code": "T1", "name": "Nokian Nordman 8", "brand": "Nokian",
            "quantity": 1, "price": 5750, "warehouse_id": 1, "warehouse_name": "Москва"
        }))
        .expect("item");

        let client = client_for(&server.uri());
        client
            .remote_add_item(&TelegramId::from("42"), &item)
            .await
            .expect("added");
    }

    #[tokio::test]
    async fn test_update_item_sends_warehouse() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/api/cart/42/items/T1"))
            .and(query_param("warehouse_id", "3"))
            .and(body_json(json!({ "quantity": 5 })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "message": "ok" })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server.uri());
        client
            .remote_update_item(
                &TelegramId::from("42"),
                &ProductCode::from("T1"),
                WarehouseId::new(3),
                5,
            )
            .await
            .expect("updated");
    }

    #[tokio::test]
    async fn test_clear_failure_surfaces_status() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/api/cart/42"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let client = client_for(&server.uri());
        let err = client
            .remote_clear(&TelegramId::from("42"))
            .await
            .expect_err("500 fails");

        assert_eq!(err.status(), Some(500));
    }
}
