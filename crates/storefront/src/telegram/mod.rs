//! Telegram Mini-App integration: launch data verification and the
//! client-side `WebApp` bridge.

pub mod bridge;
pub mod init_data;

pub use bridge::{BridgeSettings, Notice, NoticeKind, push_notice, take_notices};
pub use init_data::{InitDataError, TelegramUser};
