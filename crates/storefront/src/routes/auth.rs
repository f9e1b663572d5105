//! Telegram sign-in.
//!
//! The home page posts `Telegram.WebApp.initData` here. The signature is
//! checked against the bot token (unless no token is configured), the user is
//! registered with the backend, and the returned record is kept in the
//! session. Outside Telegram an optional development identity stands in.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use chrono::Utc;
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;
use wheelhouse_core::TelegramId;

use crate::api::TelegramAuthRequest;
use crate::error::{add_breadcrumb, clear_sentry_user, set_sentry_user};
use crate::filters;
use crate::middleware::{clear_current_user, set_current_user};
use crate::navigation::Page;
use crate::routes::views::Layout;
use crate::services::CartStore;
use crate::state::AppState;
use crate::telegram::{Notice, init_data, push_notice};

/// Sign-in form posted by `bridge.js`.
#[derive(Debug, Default, Deserialize)]
pub struct SignInForm {
    #[serde(default)]
    pub init_data: String,
    /// Page id to open afterwards.
    #[serde(default)]
    pub next: String,
}

/// Dead-end page for blocked users.
#[derive(Template, WebTemplate)]
#[template(path = "blocked.html")]
pub struct BlockedTemplate {
    pub layout: Layout,
}

/// Sign in with Telegram launch data.
#[instrument(skip(state, session, form))]
pub async fn telegram_sign_in(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<SignInForm>,
) -> Response {
    let Some(request) = auth_request(&state, &form.init_data) else {
        push_notice(
            &session,
            Notice::error("Не удалось подтвердить вход. Откройте магазин через Telegram."),
        )
        .await;
        return Redirect::to(Page::Home.path()).into_response();
    };

    let user = match state.api().authenticate(&request).await {
        Ok(user) if !user.is_blocked => user,
        Ok(_) => return blocked_redirect(&session, &request.telegram_id).await,
        Err(e) if e.is_forbidden() => {
            return blocked_redirect(&session, &request.telegram_id).await;
        }
        Err(e) => {
            tracing::error!(error = %e, "Telegram sign-in failed");
            push_notice(&session, Notice::error("Сервер недоступен, попробуйте позже")).await;
            return Redirect::to(Page::Home.path()).into_response();
        }
    };

    if let Err(e) = set_current_user(&session, &user).await {
        tracing::error!(error = %e, "Failed to store user in session");
        push_notice(&session, Notice::error("Не удалось сохранить сессию")).await;
        return Redirect::to(Page::Home.path()).into_response();
    }

    set_sentry_user(&user.telegram_id, user.username.as_deref());
    add_breadcrumb("auth", "Signed in via Telegram", None);
    tracing::info!(telegram_id = %user.telegram_id, "User signed in");

    match CartStore::for_request(&state, &session, Some(&user)).restore().await {
        Ok(0) => {}
        Ok(_) => push_notice(&session, Notice::info("Корзина восстановлена")).await,
        Err(e) => tracing::warn!(error = %e, "Cart restore failed"),
    }

    let next = Page::from_id(&form.next);
    let next = if next.is_visible_to(Some(&user)) {
        next
    } else {
        Page::Home
    };
    Redirect::to(next.path()).into_response()
}

/// Show the blocked notice.
#[instrument(skip(state, session))]
pub async fn blocked(State(state): State<AppState>, session: Session) -> impl IntoResponse {
    BlockedTemplate {
        layout: Layout::new(&state, &session, Page::Home, None).await,
    }
}

/// Forget the signed-in user.
#[instrument(skip(session))]
pub async fn sign_out(session: Session) -> Response {
    if let Err(e) = clear_current_user(&session).await {
        tracing::warn!(error = %e, "Failed to clear user from session");
    }
    clear_sentry_user();
    Redirect::to(Page::Home.path()).into_response()
}

/// The registration payload for this launch, or `None` if it is rejected.
fn auth_request(state: &AppState, raw_init_data: &str) -> Option<TelegramAuthRequest> {
    let telegram = &state.config().telegram;

    if raw_init_data.trim().is_empty() {
        let dev_id = telegram.dev_telegram_id.as_deref()?;
        tracing::debug!(telegram_id = %dev_id, "Using development identity");
        return Some(TelegramAuthRequest {
            telegram_id: TelegramId::from(dev_id),
            username: None,
            first_name: None,
            last_name: None,
        });
    }

    let verified = match &telegram.bot_token {
        Some(token) => init_data::verify(raw_init_data, token, Utc::now()),
        None => init_data::parse_unverified(raw_init_data),
    };

    match verified {
        Ok(user) => Some(user.into_auth_request()),
        Err(e) => {
            tracing::warn!(error = %e, "Rejected Telegram initData");
            None
        }
    }
}

async fn blocked_redirect(session: &Session, telegram_id: &TelegramId) -> Response {
    tracing::info!(telegram_id = %telegram_id, "Blocked user refused");
    if let Err(e) = clear_current_user(session).await {
        tracing::warn!(error = %e, "Failed to clear user from session");
    }
    Redirect::to("/auth/blocked").into_response()
}
