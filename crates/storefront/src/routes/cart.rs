//! Cart and checkout route handlers.
//!
//! The cart lives in the session (see [`CartStore`]). Mutations are
//! post/redirect/get: each action redirects back to the cart page with a
//! notice. Checkout re-renders the page in place on failure so the typed
//! address is kept.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;
use wheelhouse_core::{DeliveryAddress, NewOrder, Product, ProductCode};

use crate::api::User;
use crate::error::{Result, add_breadcrumb};
use crate::filters;
use crate::middleware::{OptionalUser, RequireUser};
use crate::navigation::Page;
use crate::routes::views::{CartView, Layout};
use crate::services::CartStore;
use crate::state::AppState;
use crate::telegram::{Notice, push_notice};

// =============================================================================
// Form Types
// =============================================================================

/// Quantity change from the +/− controls.
#[derive(Debug, Deserialize)]
pub struct UpdateCartForm {
    pub code: String,
    pub quantity: i64,
}

/// Line removal.
#[derive(Debug, Deserialize)]
pub struct RemoveFromCartForm {
    pub code: String,
}

/// Checkout form, as typed.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CheckoutForm {
    pub city: String,
    pub street: String,
    pub house: String,
    pub apartment: String,
    pub phone: String,
    pub comment: String,
}

/// `?order=<id>` on the confirmation page.
#[derive(Debug, Deserialize)]
pub struct PlacedQuery {
    pub order: Option<String>,
}

// =============================================================================
// Templates
// =============================================================================

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart/show.html")]
pub struct CartShowTemplate {
    pub layout: Layout,
    pub cart: CartView,
    pub form: CheckoutForm,
    pub form_error: Option<String>,
    pub can_checkout: bool,
}

/// Order confirmation template.
#[derive(Template, WebTemplate)]
#[template(path = "cart/placed.html")]
pub struct OrderPlacedTemplate {
    pub layout: Layout,
    pub order_id: Option<String>,
}

// =============================================================================
// Handlers
// =============================================================================

/// Display the cart and the checkout form.
#[instrument(skip(state, session, user))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    OptionalUser(user): OptionalUser,
) -> Result<Response> {
    let cart = CartStore::new(&session).load().await?;
    Ok(render(&state, &session, user, &cart, CheckoutForm::default(), None)
        .await
        .into_response())
}

/// Change a line's quantity; zero or less removes it.
#[instrument(skip(state, session, user))]
pub async fn update(
    State(state): State<AppState>,
    session: Session,
    OptionalUser(user): OptionalUser,
    Form(form): Form<UpdateCartForm>,
) -> Redirect {
    let store = CartStore::for_request(&state, &session, user.as_ref());
    if let Err(e) = store
        .set_quantity(&ProductCode::from(form.code), form.quantity)
        .await
    {
        tracing::error!(error = %e, "Cart update failed");
        push_notice(&session, Notice::error("Не удалось обновить корзину")).await;
    }
    Redirect::to(Page::Cart.path())
}

/// Remove a line.
#[instrument(skip(state, session, user))]
pub async fn remove(
    State(state): State<AppState>,
    session: Session,
    OptionalUser(user): OptionalUser,
    Form(form): Form<RemoveFromCartForm>,
) -> Redirect {
    let store = CartStore::for_request(&state, &session, user.as_ref());
    match store.remove(&ProductCode::from(form.code)).await {
        Ok(_) => push_notice(&session, Notice::info("Товар удалён из корзины")).await,
        Err(e) => {
            tracing::error!(error = %e, "Cart remove failed");
            push_notice(&session, Notice::error("Не удалось обновить корзину")).await;
        }
    }
    Redirect::to(Page::Cart.path())
}

/// Validate the address and submit the order.
///
/// On success the cart is cleared and the confirmation page shown; on any
/// failure the cart is kept and the form re-rendered with the error.
#[instrument(skip(state, session, user, form), fields(telegram_id = %user.telegram_id))]
pub async fn checkout(
    State(state): State<AppState>,
    session: Session,
    RequireUser(user): RequireUser,
    Form(form): Form<CheckoutForm>,
) -> Result<Response> {
    let store = CartStore::for_request(&state, &session, Some(&user));
    let cart = store.load().await?;

    if cart.is_empty() {
        push_notice(&session, Notice::error("Корзина пуста")).await;
        return Ok(Redirect::to(Page::Cart.path()).into_response());
    }

    let address = match DeliveryAddress::parse(
        &form.city,
        &form.street,
        &form.house,
        &form.apartment,
        &form.phone,
        &form.comment,
    ) {
        Ok(address) => address,
        Err(e) => {
            let message = e.to_string();
            let page = render(&state, &session, Some(user), &cart, form, Some(message)).await;
            return Ok((StatusCode::UNPROCESSABLE_ENTITY, page).into_response());
        }
    };

    let order = NewOrder::from_cart(&cart, address);
    match state.api().create_order(&user.telegram_id, &order).await {
        Ok(created) => {
            add_breadcrumb("checkout", "Order created", Some(&[("order_id", created.order_id.as_str())]));
            tracing::info!(order_id = %created.order_id, total = %order.total(), "Order created");
            if let Err(e) = store.clear().await {
                tracing::error!(error = %e, "Failed to clear cart after order");
            }
            push_notice(&session, Notice::success("Заказ успешно создан!")).await;
            let target = format!(
                "/cart/placed?order={}",
                urlencoding::encode(created.order_id.as_str())
            );
            Ok(Redirect::to(&target).into_response())
        }
        Err(e) => {
            tracing::error!(error = %e, "Order creation failed");
            let message = match e.detail() {
                Some(detail) => format!("Ошибка при создании заказа: {detail}"),
                None => "Ошибка при создании заказа".to_string(),
            };
            push_notice(&session, Notice::error(message)).await;
            let page = render(&state, &session, Some(user), &cart, form, None).await;
            Ok((StatusCode::BAD_GATEWAY, page).into_response())
        }
    }
}

/// Order confirmation.
#[instrument(skip(state, session, user))]
pub async fn placed(
    State(state): State<AppState>,
    session: Session,
    OptionalUser(user): OptionalUser,
    Query(query): Query<PlacedQuery>,
) -> impl IntoResponse {
    OrderPlacedTemplate {
        layout: Layout::new(&state, &session, Page::Cart, user).await,
        order_id: query.order.filter(|id| !id.is_empty()),
    }
}

// =============================================================================
// Helpers
// =============================================================================

/// Add a product shown on a result list to the cart and queue the outcome
/// notice.
pub(crate) async fn add_product(
    state: &AppState,
    session: &Session,
    user: Option<&User>,
    product: Option<Product>,
) {
    let Some(product) = product else {
        push_notice(session, Notice::error("Товар не найден, повторите поиск")).await;
        return;
    };

    let store = CartStore::for_request(state, session, user);
    match store.add(&product, 1).await {
        Ok(_) => {
            add_breadcrumb("cart", "Added to cart", Some(&[("code", product.code.as_str())]));
            push_notice(session, Notice::success("Товар добавлен в корзину")).await;
        }
        Err(e) => {
            tracing::error!(error = %e, code = %product.code, "Add to cart failed");
            push_notice(session, Notice::error("Не удалось добавить товар в корзину")).await;
        }
    }
}

async fn render(
    state: &AppState,
    session: &Session,
    user: Option<User>,
    cart: &wheelhouse_core::Cart,
    form: CheckoutForm,
    form_error: Option<String>,
) -> CartShowTemplate {
    let can_checkout = user.is_some() && !cart.is_empty();
    CartShowTemplate {
        layout: Layout::new(state, session, Page::Cart, user).await,
        cart: CartView::from(cart),
        form,
        form_error,
        can_checkout,
    }
}
