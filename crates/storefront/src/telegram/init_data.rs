//! Telegram Mini-App `initData` verification.
//!
//! Telegram signs the launch parameters with HMAC-SHA256:
//!
//! ```text
//! secret_key = HMAC_SHA256(key = "WebAppData", msg = bot_token)
//! hash       = hex(HMAC_SHA256(key = secret_key, msg = data_check_string))
//! ```
//!
//! where `data_check_string` is every `key=value` pair except `hash`, sorted
//! by key and joined with `\n`.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use sha2::Sha256;
use thiserror::Error;
use wheelhouse_core::TelegramId;

use crate::api::TelegramAuthRequest;

type HmacSha256 = Hmac<Sha256>;

/// Signed data older than this is rejected (24 hours).
const MAX_AGE_SECS: i64 = 24 * 60 * 60;

/// Why `initData` was rejected.
#[derive(Debug, Error)]
pub enum InitDataError {
    #[error("initData is empty")]
    Empty,

    #[error("initData has no hash")]
    MissingHash,

    #[error("initData signature does not match")]
    InvalidHash,

    #[error("initData has no valid auth_date")]
    MissingAuthDate,

    #[error("initData is too old ({age_secs} seconds)")]
    Expired { age_secs: i64 },

    #[error("initData has no user")]
    MissingUser,

    #[error("initData user is malformed: {0}")]
    InvalidUser(#[from] serde_json::Error),
}

/// The Telegram account that opened the Mini-App.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TelegramUser {
    pub id: i64,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

impl TelegramUser {
    /// Registration payload for the backend.
    #[must_use]
    pub fn into_auth_request(self) -> TelegramAuthRequest {
        TelegramAuthRequest {
            telegram_id: TelegramId::new(self.id.to_string()),
            username: self.username,
            first_name: self.first_name,
            last_name: self.last_name,
        }
    }
}

/// Verify the signature and freshness of `initData` and return its user.
///
/// # Errors
///
/// Returns an error if the hash is missing or wrong, `auth_date` is missing
/// or older than 24 hours, or the user field is missing or malformed.
pub fn verify(
    init_data: &str,
    bot_token: &SecretString,
    now: DateTime<Utc>,
) -> Result<TelegramUser, InitDataError> {
    let mut params = parse_params(init_data)?;
    let received = params.remove("hash").ok_or(InitDataError::MissingHash)?;
    let received = hex::decode(received).map_err(|_| InitDataError::InvalidHash)?;

    let data_check_string = data_check_string(&params);
    signer(bot_token, &data_check_string)?
        .verify_slice(&received)
        .map_err(|_| InitDataError::InvalidHash)?;

    let auth_date = params
        .get("auth_date")
        .and_then(|v| v.parse::<i64>().ok())
        .ok_or(InitDataError::MissingAuthDate)?;
    let age_secs = now.timestamp() - auth_date;
    if age_secs > MAX_AGE_SECS {
        return Err(InitDataError::Expired { age_secs });
    }

    user_from(&params)
}

/// Read the user from `initData` without checking the signature.
///
/// Only for deployments without a bot token configured.
///
/// # Errors
///
/// Returns an error if the user field is missing or malformed.
pub fn parse_unverified(init_data: &str) -> Result<TelegramUser, InitDataError> {
    user_from(&parse_params(init_data)?)
}

fn parse_params(init_data: &str) -> Result<BTreeMap<String, String>, InitDataError> {
    let init_data = init_data.trim();
    if init_data.is_empty() {
        return Err(InitDataError::Empty);
    }
    Ok(url::form_urlencoded::parse(init_data.as_bytes())
        .into_owned()
        .collect())
}

fn data_check_string(params: &BTreeMap<String, String>) -> String {
    params
        .iter()
        .map(|(key, value)| format!("{key}={value}"))
        .collect::<Vec<_>>()
        .join("\n")
}

fn signer(bot_token: &SecretString, data_check_string: &str) -> Result<HmacSha256, InitDataError> {
    let mut secret = <HmacSha256 as Mac>::new_from_slice(b"WebAppData")
        .map_err(|_| InitDataError::InvalidHash)?;
    secret.update(bot_token.expose_secret().as_bytes());
    let secret_key = secret.finalize().into_bytes();

    let mut mac =
        <HmacSha256 as Mac>::new_from_slice(&secret_key).map_err(|_| InitDataError::InvalidHash)?;
    mac.update(data_check_string.as_bytes());
    Ok(mac)
}

fn user_from(params: &BTreeMap<String, String>) -> Result<TelegramUser, InitDataError> {
    let raw = params.get("user").ok_or(InitDataError::MissingUser)?;
    Ok(serde_json::from_str(raw)?)
}

/// Build a correctly signed `initData` string.
#[cfg(test)]
pub(crate) fn sign_for_tests(pairs: &[(&str, &str)], bot_token: &str) -> String {
    let params: BTreeMap<String, String> = pairs
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect();
    let token = SecretString::from(bot_token.to_string());
    let hash = hex::encode(
        signer(&token, &data_check_string(&params))
            .expect("hmac key")
            .finalize()
            .into_bytes(),
    );

    let mut serializer = url::form_urlencoded::Serializer::new(String::new());
    for (key, value) in &params {
        serializer.append_pair(key, value);
    }
    serializer.append_pair("hash", &hash);
    serializer.finish()
}
