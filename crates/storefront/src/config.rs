//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `WHEELHOUSE_API_URL` - Backend base URL (the `/api` prefix is appended)
//! - `WHEELHOUSE_BASE_URL` - Public URL Telegram opens as the Mini-App
//!
//! ## Optional
//! - `WHEELHOUSE_HOST` - Bind address (default: 127.0.0.1)
//! - `WHEELHOUSE_PORT` - Listen port (default: 3000)
//! - `TELEGRAM_BOT_TOKEN` - Bot token; enables init-data signature checks
//! - `WHEELHOUSE_DEV_TELEGRAM_ID` - Identity used when the app is opened outside Telegram
//! - `WHEELHOUSE_CART_SYNC` - Mirror cart changes to the backend (default: false)
//! - `WHEELHOUSE_HEADER_COLOR` - Telegram header colour (default: #ffffff)
//! - `WHEELHOUSE_BACKGROUND_COLOR` - Telegram background colour (default: #f5f5f5)
//! - `WHEELHOUSE_API_TIMEOUT_SECS` - Backend request timeout (default: 15)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "secret",
    "password",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "enter-",
    "put-your",
    "add-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// Backend REST API root, including the `/api` prefix
    pub api_url: Url,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the Mini-App
    pub base_url: String,
    /// Timeout applied to every backend request
    pub api_timeout: Duration,
    /// Mirror cart mutations to the backend cart endpoints
    pub cart_sync: bool,
    /// Telegram Mini-App settings
    pub telegram: TelegramConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
}

/// Telegram Mini-App configuration.
///
/// Implements `Debug` manually to redact the bot token.
#[derive(Clone)]
pub struct TelegramConfig {
    /// Bot token used to verify init-data signatures. `None` skips verification.
    pub bot_token: Option<SecretString>,
    /// Telegram id used when the page is opened without init data
    pub dev_telegram_id: Option<String>,
    /// Header colour applied through the WebApp bridge
    pub header_color: String,
    /// Background colour applied through the WebApp bridge
    pub background_color: String,
}

impl std::fmt::Debug for TelegramConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramConfig")
            .field(
                "bot_token",
                &self.bot_token.as_ref().map(|_| "[REDACTED]"),
            )
            .field("dev_telegram_id", &self.dev_telegram_id)
            .field("header_color", &self.header_color)
            .field("background_color", &self.background_color)
            .finish()
    }
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            bot_token: None,
            dev_telegram_id: None,
            header_color: "#ffffff".to_string(),
            background_color: "#f5f5f5".to_string(),
        }
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if the bot token fails validation (placeholder detection, entropy check).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let api_url = api_root(&get_required_env("WHEELHOUSE_API_URL")?)?;
        let host = get_env_or_default("WHEELHOUSE_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("WHEELHOUSE_HOST".to_string(), e.to_string())
            })?;
        let port = get_env_or_default("WHEELHOUSE_PORT", "3000")
            .parse::<u16>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("WHEELHOUSE_PORT".to_string(), e.to_string())
            })?;
        let base_url = get_required_env("WHEELHOUSE_BASE_URL")?;
        let api_timeout = get_env_or_default("WHEELHOUSE_API_TIMEOUT_SECS", "15")
            .parse::<u64>()
            .map(Duration::from_secs)
            .map_err(|e| {
                ConfigError::InvalidEnvVar(
                    "WHEELHOUSE_API_TIMEOUT_SECS".to_string(),
                    e.to_string(),
                )
            })?;
        let cart_sync = parse_flag("WHEELHOUSE_CART_SYNC")?;

        Ok(Self {
            api_url,
            host,
            port,
            base_url,
            api_timeout,
            cart_sync,
            telegram: TelegramConfig::from_env()?,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
        })
    }

    /// Configuration for a local instance talking to `backend_url`.
    ///
    /// Signature checks are off and cart mirroring is disabled.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvVar` if `backend_url` is not a valid URL.
    pub fn local(backend_url: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            api_url: api_root(backend_url)?,
            host: IpAddr::from([127, 0, 0, 1]),
            port: 3000,
            base_url: "http://localhost:3000".to_string(),
            api_timeout: Duration::from_secs(15),
            cart_sync: false,
            telegram: TelegramConfig::default(),
            sentry_dsn: None,
            sentry_environment: None,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether the public URL is served over HTTPS.
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}

impl TelegramConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let bot_token = get_optional_env("TELEGRAM_BOT_TOKEN")
            .map(|token| {
                validate_bot_token(&token, "TELEGRAM_BOT_TOKEN")?;
                Ok::<_, ConfigError>(SecretString::from(token))
            })
            .transpose()?;

        Ok(Self {
            bot_token,
            dev_telegram_id: get_optional_env("WHEELHOUSE_DEV_TELEGRAM_ID"),
            header_color: get_color("WHEELHOUSE_HEADER_COLOR", "#ffffff")?,
            background_color: get_color("WHEELHOUSE_BACKGROUND_COLOR", "#f5f5f5")?,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an optional environment variable, treating blank values as unset.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parse a boolean flag (`true`/`false`/`1`/`0`), defaulting to false.
fn parse_flag(key: &str) -> Result<bool, ConfigError> {
    match get_env_or_default(key, "false").to_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" | "" => Ok(false),
        other => Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("expected true or false, got '{other}'"),
        )),
    }
}

/// Get a `#rrggbb` colour with a default.
fn get_color(key: &str, default: &str) -> Result<String, ConfigError> {
    let value = get_env_or_default(key, default);
    if is_hex_color(&value) {
        Ok(value)
    } else {
        Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("expected a #rrggbb colour, got '{value}'"),
        ))
    }
}

fn is_hex_color(value: &str) -> bool {
    value.len() == 7
        && value.starts_with('#')
        && value.chars().skip(1).all(|c| c.is_ascii_hexdigit())
}

/// Parse the backend base URL and append the `/api` prefix.
fn api_root(raw: &str) -> Result<Url, ConfigError> {
    let joined = format!("{}/api", raw.trim_end_matches('/'));
    Url::parse(&joined)
        .map_err(|e| ConfigError::InvalidEnvVar("WHEELHOUSE_API_URL".to_string(), e.to_string()))
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.len() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)] // Character count will never exceed f64 precision
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate a bot token: `<bot id>:<secret>`, not a placeholder, high entropy secret part.
fn validate_bot_token(token: &str, var_name: &str) -> Result<(), ConfigError> {
    let Some((bot_id, secret)) = token.split_once(':') else {
        return Err(ConfigError::InvalidEnvVar(
            var_name.to_string(),
            "expected '<bot id>:<token>'".to_string(),
        ));
    };
    if bot_id.is_empty() || !bot_id.chars().all(|c| c.is_ascii_digit()) {
        return Err(ConfigError::InvalidEnvVar(
            var_name.to_string(),
            "bot id must be numeric".to_string(),
        ));
    }

    let lower = secret.to_lowercase();

    // Check blocklist
    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    // Check entropy (real tokens are randomly generated)
    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Copy the token issued by @BotFather."
            ),
        ));
    }

    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_shannon_entropy_empty() {
        assert!((shannon_entropy("") - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_shannon_entropy_two_chars() {
        // "ab" has entropy of 1 bit per char (50% a, 50% b)
        let entropy = shannon_entropy("ab");
        assert!((entropy - 1.0).abs() < 0.01);
    }

    #[test]
    fn test_validate_bot_token_valid() {
        let result = validate_bot_token("7012345678:AAGq3Yk9rT-xLm2Vb8NcPw5Zd1Hs6Ej4Ufo", "TEST_VAR");
        assert!(result.is_ok());
    }

    #[test]
    fn test_validate_bot_token_missing_colon() {
        let result = validate_bot_token("AAGq3Yk9rTxLm2Vb8NcPw5Zd1Hs6Ej4Ufo", "TEST_VAR");
        assert!(matches!(result.unwrap_err(), ConfigError::InvalidEnvVar(_, _)));
    }

    #[test]
    fn test_validate_bot_token_placeholder() {
        let result = validate_bot_token("123:your-bot-token-here", "TEST_VAR");
        assert!(matches!(result.unwrap_err(), ConfigError::InsecureSecret(_, _)));
    }

    #[test]
    fn test_validate_bot_token_low_entropy() {
        let result = validate_bot_token("123:aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa", "TEST_VAR");
        assert!(matches!(result.unwrap_err(), ConfigError::InsecureSecret(_, _)));
    }

    #[test]
    fn test_api_root_appends_prefix() {
        assert_eq!(
            api_root("https://backend.example.org/").unwrap().as_str(),
            "https://backend.example.org/api"
        );
        assert!(api_root("not a url").is_err());
    }

    #[test]
    fn test_hex_color() {
        assert!(is_hex_color("#f5f5f5"));
        assert!(!is_hex_color("f5f5f5"));
        assert!(!is_hex_color("#f5f5fg"));
    }

    #[test]
    fn test_local_config() {
        let config = StorefrontConfig::local("http://127.0.0.1:8001").unwrap();

        assert_eq!(config.api_url.as_str(), "http://127.0.0.1:8001/api");
        assert_eq!(config.socket_addr().port(), 3000);
        assert!(!config.is_secure());
        assert!(config.telegram.bot_token.is_none());
    }

    #[test]
    fn test_telegram_config_debug_redacts_token() {
        let config = TelegramConfig {
            bot_token: Some(SecretString::from("7012345678:super_private_token")),
            dev_telegram_id: Some("42".to_string()),
            ..TelegramConfig::default()
        };

        let debug_output = format!("{config:?}");

        assert!(debug_output.contains("42"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("super_private_token"));
    }
}
