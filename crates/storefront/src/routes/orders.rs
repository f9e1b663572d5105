//! Order history.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, State},
    response::IntoResponse,
};
use tower_sessions::Session;
use tracing::instrument;
use wheelhouse_core::OrderId;

use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::RequireUser;
use crate::navigation::Page;
use crate::routes::views::{Layout, OrderView, order_views};
use crate::state::AppState;
use crate::telegram::{Notice, push_notice};

/// Order list template.
#[derive(Template, WebTemplate)]
#[template(path = "orders/index.html")]
pub struct OrdersTemplate {
    pub layout: Layout,
    pub orders: Vec<OrderView>,
    pub failed: bool,
}

/// Order detail template.
#[derive(Template, WebTemplate)]
#[template(path = "orders/show.html")]
pub struct OrderTemplate {
    pub layout: Layout,
    pub order: OrderView,
}

/// List the user's orders.
#[instrument(skip(state, session, user), fields(telegram_id = %user.telegram_id))]
pub async fn index(
    State(state): State<AppState>,
    session: Session,
    RequireUser(user): RequireUser,
) -> impl IntoResponse {
    let (orders, failed) = match state.api().my_orders(&user.telegram_id).await {
        Ok(orders) => (order_views(&orders), false),
        Err(e) => {
            tracing::error!(error = %e, "Failed to load orders");
            push_notice(&session, Notice::error("Ошибка загрузки заказов")).await;
            (Vec::new(), true)
        }
    };

    OrdersTemplate {
        layout: Layout::new(&state, &session, Page::Orders, Some(user)).await,
        orders,
        failed,
    }
}

/// One order.
#[instrument(skip(state, session, user), fields(telegram_id = %user.telegram_id))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    RequireUser(user): RequireUser,
    Path(order_id): Path<String>,
) -> Result<impl IntoResponse> {
    let order = state
        .api()
        .order(&user.telegram_id, &OrderId::from(order_id.as_str()))
        .await
        .map_err(|e| {
            if e.is_not_found() {
                AppError::NotFound(format!("order {order_id}"))
            } else {
                AppError::Api(e)
            }
        })?;

    Ok(OrderTemplate {
        layout: Layout::new(&state, &session, Page::Orders, Some(user)).await,
        order: OrderView::from(&order),
    })
}
