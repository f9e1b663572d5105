//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                       - Home menu (sign-in form when anonymous)
//! GET  /health                 - Health check
//!
//! # Auth
//! POST /auth/telegram          - Sign in with Telegram initData
//! GET  /auth/blocked           - Blocked account page
//! POST /auth/logout            - Sign out
//!
//! # Search
//! GET  /search                 - Search form and last results (?category=tires|disks)
//! POST /search                 - Run a search
//! POST /search/add             - Add a result to the cart
//!
//! # Car selection
//! GET  /car-selection          - Current wizard step
//! POST /car-selection/select   - Pick an option
//! POST /car-selection/reset    - Back to the first step
//! POST /car-selection/category - Tyres/disks toggle on the results step
//! POST /car-selection/add      - Add a result to the cart
//!
//! # Cart
//! GET  /cart                   - Cart and checkout form
//! POST /cart/update            - Change a quantity
//! POST /cart/remove            - Remove a line
//! POST /cart/checkout          - Place the order (requires sign-in)
//! GET  /cart/placed            - Order confirmation
//!
//! # Orders (requires sign-in)
//! GET  /orders                 - Order history
//! GET  /orders/{id}            - Order detail
//!
//! # Admin (requires admin)
//! GET  /admin                  - Console (?tab=pending|all|users|activity|settings|stats)
//! POST /admin/orders/{id}/confirm
//! POST /admin/orders/{id}/reject
//! POST /admin/orders/{id}/status
//! POST /admin/orders/{id}/hide
//! POST /admin/markup
//! POST /admin/users/{id}/block
//! POST /admin/users/{id}/unblock
//! POST /admin/users/{id}/message
//! POST /admin/activity/reset
//! POST /admin/stats/reset
//! ```

pub mod admin;
pub mod auth;
pub mod car_selection;
pub mod cart;
pub mod home;
pub mod orders;
pub mod search;
pub mod views;

use axum::{
    Router, middleware as axum_middleware,
    routing::{get, post},
};
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::middleware::{
    create_session_layer, request_id_middleware, security_headers_middleware,
};
use crate::state::AppState;

/// Directory served under `/static`.
pub const STATIC_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/static");

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/telegram", post(auth::telegram_sign_in))
        .route("/blocked", get(auth::blocked))
        .route("/logout", post(auth::sign_out))
}

/// Create the search routes router.
pub fn search_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(search::show).post(search::run))
        .route("/add", post(search::add))
}

/// Create the car-selection routes router.
pub fn car_selection_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(car_selection::show))
        .route("/select", post(car_selection::select))
        .route("/reset", post(car_selection::reset))
        .route("/category", post(car_selection::category))
        .route("/add", post(car_selection::add))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/update", post(cart::update))
        .route("/remove", post(cart::remove))
        .route("/checkout", post(cart::checkout))
        .route("/placed", get(cart::placed))
}

/// Create the order history routes router.
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(orders::index))
        .route("/{id}", get(orders::show))
}

/// Create the admin console routes router.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(admin::index))
        .route("/orders/{id}/confirm", post(admin::confirm_order))
        .route("/orders/{id}/reject", post(admin::reject_order))
        .route("/orders/{id}/status", post(admin::update_status))
        .route("/orders/{id}/hide", post(admin::hide_order))
        .route("/markup", post(admin::set_markup))
        .route("/users/{id}/block", post(admin::block_user))
        .route("/users/{id}/unblock", post(admin::unblock_user))
        .route("/users/{id}/message", post(admin::message_user))
        .route("/activity/reset", post(admin::reset_activity))
        .route("/stats/reset", post(admin::reset_stats))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home::home))
        .nest("/auth", auth_routes())
        .nest("/search", search_routes())
        .nest("/car-selection", car_selection_routes())
        .nest("/cart", cart_routes())
        .nest("/orders", order_routes())
        .nest("/admin", admin_routes())
}

/// The complete application with its middleware stack.
///
/// Sentry layers are added by the binary on top of this.
pub fn app(state: AppState) -> Router {
    let session_layer = create_session_layer(state.config());

    Router::new()
        .route("/health", get(home::health))
        .merge(routes())
        .nest_service("/static", ServeDir::new(STATIC_DIR))
        .layer(axum_middleware::from_fn(security_headers_middleware))
        .layer(session_layer)
        .layer(axum_middleware::from_fn(request_id_middleware))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use tower::ServiceExt;

    use crate::config::StorefrontConfig;

    fn test_app() -> Router {
        let config = StorefrontConfig::local("http://127.0.0.1:9").unwrap();
        app(AppState::new(config).unwrap())
    }

    #[tokio::test]
    async fn test_health() {
        let response = test_app()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_orders_redirect_anonymous_users_home() {
        let response = test_app()
            .oneshot(Request::get("/orders").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[header::LOCATION], "/");
    }

    #[tokio::test]
    async fn test_static_assets_are_served() {
        let response = test_app()
            .oneshot(Request::get("/static/app.css").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().get(header::CACHE_CONTROL).is_none());
    }
}
