//! Session-backed cart persistence.
//!
//! The cart lives in the user's session under [`session_keys::CART`]. Every
//! mutation is load → apply → save; a failed save is reported to the caller
//! but never leaves a half-applied cart behind, because the next request
//! simply reloads what was last stored.
//!
//! With cart sync enabled, each mutation is also mirrored to the backend cart
//! endpoints. Mirror failures are logged and otherwise ignored.

use thiserror::Error;
use tower_sessions::Session;
use wheelhouse_core::{Cart, DEFAULT_WAREHOUSE_ID, Product, ProductCode, TelegramId};

use crate::api::{ApiClient, User, product_from_remote, remote_item_from_line};
use crate::models::session_keys;
use crate::state::AppState;

/// Errors reading or writing the session cart.
#[derive(Debug, Error)]
pub enum CartStoreError {
    #[error("failed to load cart: {0}")]
    Load(#[source] tower_sessions::session::Error),

    #[error("failed to save cart: {0}")]
    Save(#[source] tower_sessions::session::Error),
}

/// Backend cart the session cart is mirrored to.
#[derive(Clone, Copy)]
struct Mirror<'a> {
    api: &'a ApiClient,
    telegram_id: &'a TelegramId,
}

/// Cart operations for one request.
pub struct CartStore<'a> {
    session: &'a Session,
    mirror: Option<Mirror<'a>>,
}

impl<'a> CartStore<'a> {
    /// A store over the session cart only.
    #[must_use]
    pub const fn new(session: &'a Session) -> Self {
        Self {
            session,
            mirror: None,
        }
    }

    /// Mirror mutations to the backend cart of `telegram_id`.
    #[must_use]
    pub fn with_mirror(mut self, api: &'a ApiClient, telegram_id: &'a TelegramId) -> Self {
        self.mirror = Some(Mirror { api, telegram_id });
        self
    }

    /// The store for a request: mirrored when sync is enabled and a user is
    /// signed in.
    #[must_use]
    pub fn for_request(state: &'a AppState, session: &'a Session, user: Option<&'a User>) -> Self {
        let store = Self::new(session);
        match user {
            Some(user) if state.config().cart_sync => {
                store.with_mirror(state.api(), &user.telegram_id)
            }
            _ => store,
        }
    }

    /// The stored cart; an absent key is an empty cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be read.
    pub async fn load(&self) -> Result<Cart, CartStoreError> {
        self.session
            .get::<Cart>(session_keys::CART)
            .await
            .map(Option::unwrap_or_default)
            .map_err(CartStoreError::Load)
    }

    /// Persist the cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be written.
    pub async fn save(&self, cart: &Cart) -> Result<(), CartStoreError> {
        self.session
            .insert(session_keys::CART, cart)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Failed to save cart");
                CartStoreError::Save(e)
            })
    }

    /// Add `quantity` units of a product.
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be read or written.
    pub async fn add(&self, product: &Product, quantity: u32) -> Result<Cart, CartStoreError> {
        let mut cart = self.load().await?;
        cart.add(product, quantity);
        self.save(&cart).await?;

        if let Some(mirror) = self.mirror
            && quantity > 0
            && let Some(line) = cart.get(&product.code)
        {
            let mut item = remote_item_from_line(line);
            item.quantity = quantity;
            if let Err(e) = mirror.api.remote_add_item(mirror.telegram_id, &item).await {
                tracing::warn!(error = %e, code = %product.code, "Cart mirror add failed");
            }
        }

        Ok(cart)
    }

    /// Remove a line; unknown codes are ignored.
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be read or written.
    pub async fn remove(&self, code: &ProductCode) -> Result<Cart, CartStoreError> {
        let mut cart = self.load().await?;
        let removed = cart.remove(code);
        self.save(&cart).await?;

        if let (Some(mirror), Some(line)) = (self.mirror, removed) {
            let warehouse = line.warehouse_id.unwrap_or(DEFAULT_WAREHOUSE_ID);
            if let Err(e) = mirror
                .api
                .remote_remove_item(mirror.telegram_id, code, warehouse)
                .await
            {
                tracing::warn!(error = %e, code = %code, "Cart mirror remove failed");
            }
        }

        Ok(cart)
    }

    /// Set a line's quantity; zero or less removes it.
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be read or written.
    pub async fn set_quantity(
        &self,
        code: &ProductCode,
        quantity: i64,
    ) -> Result<Cart, CartStoreError> {
        let mut cart = self.load().await?;
        let warehouse = cart
            .get(code)
            .map(|line| line.warehouse_id.unwrap_or(DEFAULT_WAREHOUSE_ID));
        let changed = cart.set_quantity(code, quantity);
        self.save(&cart).await?;

        if let (Some(mirror), Some(warehouse), true) = (self.mirror, warehouse, changed) {
            let result = match cart.get(code) {
                Some(line) => {
                    mirror
                        .api
                        .remote_update_item(mirror.telegram_id, code, warehouse, line.quantity())
                        .await
                }
                None => {
                    mirror
                        .api
                        .remote_remove_item(mirror.telegram_id, code, warehouse)
                        .await
                }
            };
            if let Err(e) = result {
                tracing::warn!(error = %e, code = %code, "Cart mirror update failed");
            }
        }

        Ok(cart)
    }

    /// Empty the cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be written.
    pub async fn clear(&self) -> Result<Cart, CartStoreError> {
        let cart = Cart::new();
        self.save(&cart).await?;

        if let Some(mirror) = self.mirror
            && let Err(e) = mirror.api.remote_clear(mirror.telegram_id).await
        {
            tracing::warn!(error = %e, "Cart mirror clear failed");
        }

        Ok(cart)
    }

    /// Fill an empty session cart from the backend copy.
    ///
    /// Does nothing without a mirror or when the session already has lines.
    /// Returns the number of restored lines.
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be read or written.
    pub async fn restore(&self) -> Result<usize, CartStoreError> {
        let Some(mirror) = self.mirror else {
            return Ok(0);
        };
        let mut cart = self.load().await?;
        if !cart.is_empty() {
            return Ok(0);
        }

        let remote = match mirror.api.remote_cart(mirror.telegram_id).await {
            Ok(remote) => remote,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to fetch backend cart");
                return Ok(0);
            }
        };

        for item in &remote.items {
            cart.add(&product_from_remote(item), item.quantity);
        }
        if cart.is_empty() {
            return Ok(0);
        }

        self.save(&cart).await?;
        tracing::info!(lines = cart.len(), "Cart restored from backend");
        Ok(cart.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use crate::api::test_support::client_for;
    use serde_json::json;
    use std::sync::Arc;
    use tower_sessions::MemoryStore;
    use wheelhouse_core::{Price, ProductSpec, TireSpec};
    use wiremock::matchers::{body_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn session() -> Session {
        Session::new(None, Arc::new(MemoryStore::default()), None)
    }

    fn tire(code: &str, price: i64) -> Product {
        Product {
            code: ProductCode::from(code),
            brand: "Nokian".to_string(),
            model: "Nordman 8".to_string(),
            price: Price::from_roubles(price),
            price_original: None,
            rest: 10,
            warehouse_id: None,
            warehouse_name: None,
            img_small: None,
            stock: Vec::new(),
            spec: ProductSpec::Tire(TireSpec::default()),
        }
    }

    #[tokio::test]
    async fn test_mutations_are_persisted() {
        let session = session();
        let store = CartStore::new(&session);

        store.add(&tire("T1", 100), 1).await.expect("add");
        store.add(&tire("T1", 100), 3).await.expect("add again");
        store.add(&tire("D2", 50), 1).await.expect("add other");

        let cart = store.load().await.expect("load");
        assert_eq!(cart.len(), 2);
        assert_eq!(cart.get(&ProductCode::from("T1")).map(|l| l.quantity()), Some(4));
        assert_eq!(cart.total(), Price::from_roubles(450));

        store
            .set_quantity(&ProductCode::from("T1"), 0)
            .await
            .expect("set");
        let cart = store.load().await.expect("reload");
        assert_eq!(cart.len(), 1);
        assert!(cart.get(&ProductCode::from("D2")).is_some());

        store.clear().await.expect("clear");
        assert!(store.load().await.expect("empty").is_empty());
    }

    #[tokio::test]
    async fn test_cart_is_stored_as_array() {
        let session = session();
        let store = CartStore::new(&session);
        store.add(&tire("T1", 100), 2).await.expect("add");

        let raw: serde_json::Value = session
            .get(session_keys::CART)
            .await
            .expect("read")
            .expect("present");
        assert!(raw.is_array());
        assert_eq!(raw[0]["code"], "T1");
    }

    #[tokio::test]
    async fn test_mirror_receives_updates() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/cart/42/items"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "message": "ok" })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .and(path("/api/cart/42/items/T1"))
            .and(query_param("warehouse_id", "1"))
            .and(body_json(json!({ "quantity": 5 })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "message": "ok" })))
            .expect(1)
            .mount(&server)
            .await;

        let api = client_for(&server.uri());
        let telegram_id = TelegramId::from("42");
        let session = session();
        let store = CartStore::new(&session).with_mirror(&api, &telegram_id);

        store.add(&tire("T1", 100), 2).await.expect("add");
        store
            .set_quantity(&ProductCode::from("T1"), 5)
            .await
            .expect("update");
    }

    #[tokio::test]
    async fn test_mirror_failure_keeps_local_cart() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/cart/42/items"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let api = client_for(&server.uri());
        let telegram_id = TelegramId::from("42");
        let session = session();
        let store = CartStore::new(&session).with_mirror(&api, &telegram_id);

        let cart = store.add(&tire("T1", 100), 1).await.expect("local add succeeds");
        assert_eq!(cart.len(), 1);
        assert_eq!(store.load().await.expect("load").len(), 1);
    }

    #[tokio::test]
    async fn test_restore_fills_empty_cart() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/cart/42"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "telegram_id": "42",
                "items": [{
                    "code": "T1", "name": "Nokian Nordman 8", "brand": "Nokian", "model": "Nordman 8",
                    "quantity": 2, "price": 100, "warehouse_id": 1, "warehouse_name": "Москва"
                }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let api = client_for(&server.uri());
        let telegram_id = TelegramId::from("42");
        let session = session();
        let store = CartStore::new(&session).with_mirror(&api, &telegram_id);

        assert_eq!(store.restore().await.expect("restore"), 1);
        let cart = store.load().await.expect("load");
        assert_eq!(cart.total(), Price::from_roubles(200));

        // A non-empty cart is left alone
        assert_eq!(store.restore().await.expect("second restore"), 0);
    }
}
