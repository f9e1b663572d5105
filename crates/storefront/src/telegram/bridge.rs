//! Server side of the Telegram `WebApp` bridge.
//!
//! Pages carry the bridge settings and any pending notices as data
//! attributes; `static/bridge.js` applies them through `Telegram.WebApp`
//! (colours, `expand()`, `showAlert`, `showConfirm`) and falls back to
//! `window.alert`/`window.confirm` in a regular browser.

use serde::{Deserialize, Serialize};
use tower_sessions::Session;

use crate::config::TelegramConfig;
use crate::models::session_keys;

/// Colours applied to the Telegram chrome on every page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgeSettings {
    pub header_color: String,
    pub background_color: String,
}

impl From<&TelegramConfig> for BridgeSettings {
    fn from(config: &TelegramConfig) -> Self {
        Self {
            header_color: config.header_color.clone(),
            background_color: config.background_color.clone(),
        }
    }
}

/// How a notice is presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeKind {
    Success,
    Info,
    Error,
}

impl NoticeKind {
    /// CSS modifier and `data-kind` value.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Info => "info",
            Self::Error => "error",
        }
    }
}

/// A one-shot message shown on the next rendered page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub kind: NoticeKind,
    pub text: String,
}

impl Notice {
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Success,
            text: text.into(),
        }
    }

    pub fn info(text: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Info,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Error,
            text: text.into(),
        }
    }

    /// Errors are also raised as a native alert.
    #[must_use]
    pub const fn alerts(&self) -> bool {
        matches!(self.kind, NoticeKind::Error)
    }
}

/// Queue a notice for the next page render.
///
/// A session failure only loses the notice; it is logged and never fails
/// the request.
pub async fn push_notice(session: &Session, notice: Notice) {
    let mut queue: Vec<Notice> = match session.get(session_keys::NOTICES).await {
        Ok(queue) => queue.unwrap_or_default(),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to read notice queue");
            Vec::new()
        }
    };
    queue.push(notice);
    if let Err(e) = session.insert(session_keys::NOTICES, &queue).await {
        tracing::warn!(error = %e, "Failed to store notice");
    }
}

/// Remove and return all queued notices.
pub async fn take_notices(session: &Session) -> Vec<Notice> {
    match session.remove::<Vec<Notice>>(session_keys::NOTICES).await {
        Ok(queue) => queue.unwrap_or_default(),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to read notice queue");
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tower_sessions::MemoryStore;

    #[tokio::test]
    async fn test_notices_are_taken_once() {
        let session = Session::new(None, Arc::new(MemoryStore::default()), None);

        push_notice(&session, Notice::success("Товар добавлен в корзину")).await;
        push_notice(&session, Notice::error("Ошибка при создании заказа")).await;

        let notices = take_notices(&session).await;
        assert_eq!(notices.len(), 2);
        assert_eq!(notices[0].kind, NoticeKind::Success);
        assert!(notices[1].alerts());

        assert!(take_notices(&session).await.is_empty());
    }

    #[test]
    fn test_settings_from_config() {
        let settings = BridgeSettings::from(&TelegramConfig::default());
        assert_eq!(settings.header_color, "#ffffff");
        assert_eq!(settings.background_color, "#f5f5f5");
    }
}
