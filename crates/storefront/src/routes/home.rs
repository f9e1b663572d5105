//! Home screen.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::filters;
use crate::middleware::OptionalUser;
use crate::navigation::Page;
use crate::routes::views::Layout;
use crate::services::CartStore;
use crate::state::AppState;

/// One entry of the home menu.
#[derive(Clone)]
pub struct MenuEntry {
    pub path: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub badge: Option<usize>,
}

/// `?page=<id>` lets the bot's menu button deep-link into a screen.
#[derive(Debug, Deserialize)]
pub struct HomeQuery {
    pub page: Option<String>,
}

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub layout: Layout,
    pub greeting: Option<String>,
    pub menu: Vec<MenuEntry>,
    /// Render the sign-in form that `bridge.js` submits with `initData`.
    pub needs_sign_in: bool,
    pub dev_sign_in: bool,
    /// Deep-link target after sign-in.
    pub next: &'static str,
}

/// Display the home menu.
///
/// Without a signed-in user the page carries the hidden sign-in form.
#[instrument(skip(state, session, user))]
pub async fn home(
    State(state): State<AppState>,
    session: Session,
    OptionalUser(user): OptionalUser,
    Query(query): Query<HomeQuery>,
) -> Response {
    let target = query.page.as_deref().map_or(Page::Home, Page::from_id);
    if user.is_some() && target != Page::Home && target.is_visible_to(user.as_ref()) {
        return Redirect::to(target.path()).into_response();
    }

    let cart_lines = match CartStore::new(&session).load().await {
        Ok(cart) => cart.len(),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to load cart for badge");
            0
        }
    };

    let menu = Page::menu(user.as_ref())
        .into_iter()
        .map(|page| MenuEntry {
            path: page.path(),
            title: page.title(),
            description: page.description(),
            badge: (page == Page::Cart && cart_lines > 0).then_some(cart_lines),
        })
        .collect();

    let greeting = user.as_ref().map(|u| u.display_name().to_string());
    let needs_sign_in = user.is_none();
    let dev_sign_in = needs_sign_in && state.config().telegram.dev_telegram_id.is_some();

    HomeTemplate {
        layout: Layout::new(&state, &session, Page::Home, user).await,
        greeting,
        menu,
        needs_sign_in,
        dev_sign_in,
        next: target.id(),
    }
    .into_response()
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check the backend.
pub async fn health() -> &'static str {
    "ok"
}
