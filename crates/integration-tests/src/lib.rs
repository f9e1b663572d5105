//! End-to-end tests for the Wheelhouse storefront.
//!
//! Each test drives the full router in-process (`tower::ServiceExt::oneshot`)
//! while a `wiremock` server stands in for the shop backend. [`TestApp`]
//! carries the session cookie between requests like a webview would.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p wheelhouse-integration-tests
//! ```

#![allow(clippy::missing_panics_doc, clippy::unwrap_used)]

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use axum::response::Response;
use hmac::{Hmac, Mac};
use secrecy::SecretString;
use serde_json::{Value, json};
use sha2::Sha256;
use tower::ServiceExt;
use wheelhouse_storefront::config::StorefrontConfig;
use wheelhouse_storefront::routes;
use wheelhouse_storefront::state::AppState;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Bot token the test app verifies `initData` against.
pub const BOT_TOKEN: &str = "7412369850:AAHk2mQx9vLrT4bWc8pZ1nYd6sFg3jKe5uE";

/// Largest page body the tests read.
const MAX_BODY: usize = 1024 * 1024;

/// The storefront under test plus its mocked backend.
pub struct TestApp {
    pub backend: MockServer,
    router: Router,
    cookie: Option<String>,
}

/// A response with its body read.
pub struct Page {
    pub status: StatusCode,
    pub location: Option<String>,
    pub body: String,
}

impl TestApp {
    /// Start a backend mock and build the app with signature checks on.
    pub async fn start() -> Self {
        let backend = MockServer::start().await;
        let mut config = StorefrontConfig::local(&backend.uri()).unwrap();
        config.telegram.bot_token = Some(SecretString::from(BOT_TOKEN.to_string()));
        let state = AppState::new(config).unwrap();

        Self {
            backend,
            router: routes::app(state),
            cookie: None,
        }
    }

    /// Send a request with the current session cookie and keep any new one.
    pub async fn send(&mut self, mut request: Request<Body>) -> Page {
        if let Some(cookie) = &self.cookie {
            request
                .headers_mut()
                .insert(header::COOKIE, cookie.parse().unwrap());
        }

        let response: Response = self.router.clone().oneshot(request).await.unwrap();

        if let Some(set_cookie) = response.headers().get(header::SET_COOKIE) {
            let pair = set_cookie.to_str().unwrap().split(';').next().unwrap();
            self.cookie = Some(pair.to_string());
        }

        let status = response.status();
        let location = response
            .headers()
            .get(header::LOCATION)
            .map(|v| v.to_str().unwrap().to_string());
        let bytes = to_bytes(response.into_body(), MAX_BODY).await.unwrap();

        Page {
            status,
            location,
            body: String::from_utf8(bytes.to_vec()).unwrap(),
        }
    }

    pub async fn get(&mut self, uri: &str) -> Page {
        self.send(Request::get(uri).body(Body::empty()).unwrap())
            .await
    }

    pub async fn post_form(&mut self, uri: &str, fields: &[(&str, &str)]) -> Page {
        let body = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(fields)
            .finish();
        let request = Request::post(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body))
            .unwrap();
        self.send(request).await
    }

    /// Sign in as `user` (a backend user record) through `/auth/telegram`.
    pub async fn sign_in(&mut self, user: &Value) -> Page {
        Mock::given(method("POST"))
            .and(path("/api/auth/telegram"))
            .respond_with(ResponseTemplate::new(200).set_body_json(user))
            .mount(&self.backend)
            .await;

        let telegram_user = json!({
            "id": user["telegram_id"].as_str().unwrap().parse::<i64>().unwrap(),
            "first_name": user["first_name"],
            "username": user["username"],
        });
        let init_data = sign_init_data(&telegram_user.to_string(), chrono::Utc::now().timestamp());
        self.post_form("/auth/telegram", &[("init_data", &init_data), ("next", "home")])
            .await
    }
}

/// A backend user record.
pub fn user_json(telegram_id: &str, first_name: &str, is_admin: bool) -> Value {
    json!({
        "telegram_id": telegram_id,
        "username": first_name.to_lowercase(),
        "first_name": first_name,
        "is_admin": is_admin,
        "is_blocked": false,
        "created_at": "2025-03-01T12:00:00"
    })
}

/// A backend order record.
pub fn order_json(order_id: &str, status: &str) -> Value {
    json!({
        "order_id": order_id,
        "user_telegram_id": "42",
        "user_name": "Анна",
        "items": [{ "code": "T1", "name": "Nokian Nordman 8", "quantity": 4, "price_final": 5750 }],
        "total_amount": 23000,
        "status": status,
        "delivery_address": {
            "city": "Тюмень",
            "street": "Ленина",
            "house": "15",
            "phone": "+7 912 345 67 89"
        },
        "created_at": "2025-03-01T12:00:00"
    })
}

/// Build Telegram `initData` for `user_json`, signed with [`BOT_TOKEN`].
pub fn sign_init_data(user_json: &str, auth_date: i64) -> String {
    let auth_date = auth_date.to_string();
    // Keys in sorted order, as Telegram builds the check string
    let pairs = [
        ("auth_date", auth_date.as_str()),
        ("query_id", "AAHdF6IQAAAAAN0XohDhrOrc"),
        ("user", user_json),
    ];
    let data_check_string = pairs
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("\n");

    let mut secret = Hmac::<Sha256>::new_from_slice(b"WebAppData").unwrap();
    secret.update(BOT_TOKEN.as_bytes());
    let secret_key = secret.finalize().into_bytes();

    let mut mac = Hmac::<Sha256>::new_from_slice(&secret_key).unwrap();
    mac.update(data_check_string.as_bytes());
    let hash = hex::encode(mac.finalize().into_bytes());

    url::form_urlencoded::Serializer::new(String::new())
        .extend_pairs(pairs)
        .append_pair("hash", &hash)
        .finish()
}
