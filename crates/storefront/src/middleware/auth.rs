//! Authentication extractors.
//!
//! The signed-in Telegram user is stored in the session by the
//! `/auth/telegram` handler. These extractors read it back; they never call
//! the backend.

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use crate::api::User;
use crate::models::session_keys;

/// Extractor that requires a signed-in user.
///
/// Without one, the request is sent back to the home screen, which runs the
/// Telegram sign-in.
///
/// ```rust,ignore
/// async fn orders(RequireUser(user): RequireUser) -> impl IntoResponse {
///     format!("Hello, {}!", user.display_name())
/// }
/// ```
pub struct RequireUser(pub User);

/// Extractor that requires a signed-in admin.
pub struct RequireAdmin(pub User);

/// Why an auth extractor refused the request.
#[derive(Debug)]
pub enum AuthRejection {
    /// No user in the session: go home and sign in.
    RedirectHome,
    /// Signed in but not an admin.
    Forbidden,
    /// No session layer configured.
    Unavailable,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectHome => Redirect::to("/").into_response(),
            Self::Forbidden => (StatusCode::FORBIDDEN, "Доступ запрещён").into_response(),
            Self::Unavailable => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
        }
    }
}

async fn session_user(parts: &Parts) -> Result<Option<User>, AuthRejection> {
    let session = parts
        .extensions
        .get::<Session>()
        .ok_or(AuthRejection::Unavailable)?;

    Ok(session
        .get::<User>(session_keys::CURRENT_USER)
        .await
        .unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Failed to read user from session");
            None
        }))
}

impl<S> FromRequestParts<S> for RequireUser
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = session_user(parts)
            .await?
            .ok_or(AuthRejection::RedirectHome)?;
        if user.is_blocked {
            return Err(AuthRejection::RedirectHome);
        }
        Ok(Self(user))
    }
}

impl<S> FromRequestParts<S> for RequireAdmin
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let RequireUser(user) = RequireUser::from_request_parts(parts, state).await?;
        if !user.is_admin {
            tracing::warn!(telegram_id = %user.telegram_id, path = %parts.uri.path(), "Non-admin reached admin route");
            return Err(AuthRejection::Forbidden);
        }
        Ok(Self(user))
    }
}

/// Extractor that optionally gets the current user.
pub struct OptionalUser(pub Option<User>);

impl<S> FromRequestParts<S> for OptionalUser
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(session_user(parts).await.ok().flatten()))
    }
}

/// Store the signed-in user in the session.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_user(
    session: &Session,
    user: &User,
) -> Result<(), tower_sessions::session::Error> {
    session.insert(session_keys::CURRENT_USER, user).await
}

/// Forget the signed-in user.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_current_user(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session.remove::<User>(session_keys::CURRENT_USER).await?;
    Ok(())
}
