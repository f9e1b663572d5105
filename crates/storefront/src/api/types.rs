//! Wire types for the Wheelhouse backend REST API.
//!
//! Response types are lenient: the backend passes supplier data through
//! mostly untouched, so numbers arrive as strings, sizes as floats and many
//! fields are simply missing. Request types serialize exactly what the
//! backend expects.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use wheelhouse_core::{
    ActivityType, DeliveryAddress, OrderId, OrderStatus, Price, ProductCode, TelegramId,
};

// =============================================================================
// Envelopes
// =============================================================================

/// `{ "success": bool, "data": T }` wrapper used by search and car endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope<T> {
    #[serde(default = "default_success")]
    pub success: bool,
    pub data: T,
}

/// Search response: the envelope plus paging and pricing metadata.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchEnvelope {
    #[serde(default = "default_success")]
    pub success: bool,
    #[serde(default)]
    pub data: Vec<RawProduct>,
    #[serde(default)]
    pub total_pages: u32,
    pub markup_percentage: Option<f64>,
}

/// `{ "success": bool, "message": "..." }` returned by admin actions.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ActionResult {
    #[serde(default = "default_success")]
    pub success: bool,
    pub message: Option<String>,
}

const fn default_success() -> bool {
    true
}

// =============================================================================
// Users
// =============================================================================

/// Body of `POST /auth/telegram`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TelegramAuthRequest {
    pub telegram_id: TelegramId,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

/// A backend user record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub telegram_id: TelegramId,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    #[serde(default)]
    pub is_admin: bool,
    #[serde(default)]
    pub is_blocked: bool,
    #[serde(default, with = "lenient::timestamp")]
    pub created_at: Option<DateTime<Utc>>,
}

impl User {
    /// Name used in greetings: first name, else username, else "Гость".
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.first_name
            .as_deref()
            .filter(|s| !s.is_empty())
            .or_else(|| self.username.as_deref().filter(|s| !s.is_empty()))
            .unwrap_or("Гость")
    }

    /// Full name for admin listings.
    #[must_use]
    pub fn full_name(&self) -> String {
        let parts: Vec<&str> = [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .filter(|s| !s.is_empty())
            .collect();
        if parts.is_empty() {
            self.display_name().to_string()
        } else {
            parts.join(" ")
        }
    }
}

/// `GET /admin/users` response.
#[derive(Debug, Clone, Deserialize)]
pub struct UsersPage {
    #[serde(default = "default_success")]
    pub success: bool,
    #[serde(default)]
    pub users: Vec<User>,
    #[serde(default)]
    pub total: u64,
}

// =============================================================================
// Products
// =============================================================================

/// A product row exactly as the backend forwards it from the supplier.
#[derive(Debug, Clone, Deserialize)]
pub struct RawProduct {
    pub code: ProductCode,
    pub brand: Option<String>,
    pub model: Option<String>,
    pub name: Option<String>,
    #[serde(default, with = "lenient::text")]
    pub width: Option<String>,
    #[serde(default, with = "lenient::text")]
    pub height: Option<String>,
    #[serde(default, with = "lenient::text")]
    pub diameter: Option<String>,
    pub season: Option<String>,
    pub season_name: Option<String>,
    pub price: Option<Price>,
    pub price_original: Option<Price>,
    #[serde(default, with = "lenient::count")]
    pub rest: Option<u32>,
    #[serde(default, with = "lenient::number")]
    pub warehouse_id: Option<i32>,
    pub warehouse_name: Option<String>,
    #[serde(default, with = "lenient::text")]
    pub load_index: Option<String>,
    #[serde(default, with = "lenient::text")]
    pub speed_index: Option<String>,
    #[serde(default)]
    pub runflat: Option<bool>,
    #[serde(default)]
    pub thorn: Option<bool>,
    pub img_small: Option<String>,
    #[serde(default, with = "lenient::text")]
    pub pcd: Option<String>,
    #[serde(default, with = "lenient::text")]
    pub et: Option<String>,
    #[serde(default, with = "lenient::text")]
    pub dia: Option<String>,
    #[serde(default, with = "lenient::text")]
    pub color: Option<String>,
    pub whpr: Option<RawStockBreakdown>,
}

/// Supplier per-warehouse breakdown (`whpr.wh_price_rest`).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawStockBreakdown {
    #[serde(default)]
    pub wh_price_rest: Vec<RawStock>,
}

/// One supplier warehouse row.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawStock {
    #[serde(default, with = "lenient::count")]
    pub rest: Option<u32>,
    #[serde(default, with = "lenient::text")]
    pub wrh: Option<String>,
    pub price: Option<Price>,
}

/// A supplier warehouse from `GET /products/warehouses`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Warehouse {
    #[serde(default, alias = "wrh", with = "lenient::text")]
    pub id: Option<String>,
    pub name: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
}

/// Query for `GET /products/tires/search`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TireQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diameter: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub season: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    pub page: u32,
    pub page_size: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub telegram_id: Option<TelegramId>,
}

/// Query for `GET /products/disks/search`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DiskQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diameter: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    pub page: u32,
    pub page_size: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub telegram_id: Option<TelegramId>,
}

// =============================================================================
// Car catalogue
// =============================================================================

/// A fully specified vehicle, the filter for `GET /cars/goods`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VehicleQuery {
    pub brand: String,
    pub model: String,
    pub year_begin: String,
    pub year_end: String,
    pub modification: String,
    pub product_type: String,
}

// =============================================================================
// Orders
// =============================================================================

/// An order line as stored by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    pub code: ProductCode,
    pub name: String,
    pub brand: Option<String>,
    pub quantity: u32,
    pub price_base: Option<Price>,
    pub price_final: Price,
    #[serde(default, with = "lenient::number")]
    pub warehouse_id: Option<i32>,
    pub warehouse_name: Option<String>,
    #[serde(default, with = "lenient::text")]
    pub width: Option<String>,
    #[serde(default, with = "lenient::text")]
    pub height: Option<String>,
    #[serde(default, with = "lenient::text")]
    pub diameter: Option<String>,
    pub season: Option<String>,
    #[serde(default, with = "lenient::text")]
    pub pcd: Option<String>,
    #[serde(default, with = "lenient::text")]
    pub et: Option<String>,
    #[serde(default, with = "lenient::text")]
    pub dia: Option<String>,
    #[serde(default, with = "lenient::text")]
    pub color: Option<String>,
}

impl OrderItem {
    /// `W/H RD` for tires, `WxD` for disks, `None` when sizes are missing.
    #[must_use]
    pub fn size_label(&self) -> Option<String> {
        match (&self.width, &self.height, &self.diameter) {
            (Some(w), Some(h), Some(d)) => Some(format!("{w}/{h} R{d}")),
            (Some(w), None, Some(d)) => Some(format!("{w}x{d}")),
            _ => None,
        }
    }

    /// Season badge (`❄️ Зима`), falling back to the raw value.
    #[must_use]
    pub fn season_label(&self) -> Option<String> {
        let raw = self.season.as_deref().filter(|s| !s.is_empty())?;
        Some(
            raw.parse::<wheelhouse_core::Season>()
                .map_or_else(|_| raw.to_string(), |season| season.badge().to_string()),
        )
    }

    /// `PCD … · ET … · DIA … · colour` for disks.
    #[must_use]
    pub fn disk_params(&self) -> Option<String> {
        let parts: Vec<String> = [
            self.pcd.as_deref().map(|v| format!("PCD {v}")),
            self.et.as_deref().map(|v| format!("ET {v}")),
            self.dia.as_deref().map(|v| format!("DIA {v}")),
            self.color.clone(),
        ]
        .into_iter()
        .flatten()
        .collect();
        (!parts.is_empty()).then(|| parts.join(" · "))
    }

    /// Price of the line.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.price_final.times(self.quantity)
    }
}

/// An order as returned by `/orders` endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub order_id: OrderId,
    pub user_telegram_id: Option<TelegramId>,
    pub user_name: Option<String>,
    #[serde(default)]
    pub items: Vec<OrderItem>,
    pub total_amount: Price,
    pub markup_percentage: Option<f64>,
    pub status: OrderStatus,
    pub delivery_address: Option<DeliveryAddress>,
    #[serde(default, with = "lenient::timestamp")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, with = "lenient::timestamp")]
    pub confirmed_at: Option<DateTime<Utc>>,
    pub admin_comment: Option<String>,
}

/// Body of `POST /orders/{id}/confirm`.
#[derive(Debug, Clone, Serialize)]
pub struct ConfirmOrder {
    pub admin_comment: Option<String>,
}

/// Body of `POST /orders/{id}/reject`.
#[derive(Debug, Clone, Serialize)]
pub struct RejectOrder {
    pub reason: String,
}

// =============================================================================
// Admin
// =============================================================================

/// Store markup applied on top of supplier prices.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarkupSettings {
    pub markup_percentage: f64,
}

/// Aggregate counters from `GET /admin/stats`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct AdminStats {
    #[serde(default)]
    pub total_orders: u64,
    #[serde(default)]
    pub pending_orders: u64,
    #[serde(default)]
    pub confirmed_orders: u64,
    #[serde(default)]
    pub completed_orders: u64,
    #[serde(default)]
    pub cancelled_orders: u64,
    #[serde(default)]
    pub total_users: u64,
    #[serde(default)]
    pub total_revenue: Price,
}

/// `GET /admin/stats` response.
#[derive(Debug, Clone, Deserialize)]
pub struct StatsEnvelope {
    #[serde(default = "default_success")]
    pub success: bool,
    #[serde(default)]
    pub stats: AdminStats,
}

/// One recorded user action.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ActivityLog {
    pub telegram_id: TelegramId,
    pub username: Option<String>,
    pub activity_type: ActivityType,
    pub search_params: Option<serde_json::Value>,
    pub result_count: Option<u64>,
    #[serde(default, with = "lenient::timestamp")]
    pub timestamp: Option<DateTime<Utc>>,
}

impl ActivityLog {
    /// Compact `key=value` rendering of the search parameters.
    #[must_use]
    pub fn params_summary(&self) -> Option<String> {
        let serde_json::Value::Object(map) = self.search_params.as_ref()? else {
            return None;
        };
        let parts: Vec<String> = map
            .iter()
            .filter(|(_, v)| !v.is_null())
            .map(|(k, v)| match v {
                serde_json::Value::String(s) => format!("{k}={s}"),
                other => format!("{k}={other}"),
            })
            .collect();
        (!parts.is_empty()).then(|| parts.join(", "))
    }
}

/// `GET /admin/activity` response.
#[derive(Debug, Clone, Deserialize)]
pub struct ActivityPage {
    #[serde(default = "default_success")]
    pub success: bool,
    #[serde(default)]
    pub logs: Vec<ActivityLog>,
    #[serde(default)]
    pub total: u64,
}

/// Filters for `GET /admin/activity`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_telegram_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub activity_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

/// `{ "success": bool, "deleted_count": n }` returned by reset endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct ResetResult {
    #[serde(default = "default_success")]
    pub success: bool,
    #[serde(default)]
    pub deleted_count: u64,
}

/// Body of `POST /admin/users/{id}/message`.
#[derive(Debug, Clone, Serialize)]
pub struct UserMessage {
    pub message: String,
}

// =============================================================================
// Backend cart mirror
// =============================================================================

/// A cart item in the backend's cart model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteCartItem {
    pub code: ProductCode,
    pub name: String,
    pub brand: String,
    pub model: Option<String>,
    pub quantity: u32,
    pub price: Price,
    pub price_original: Option<Price>,
    pub warehouse_id: i32,
    pub warehouse_name: String,
    #[serde(default)]
    pub rest: u32,
    pub img_small: Option<String>,
    #[serde(default, with = "lenient::text")]
    pub width: Option<String>,
    #[serde(default, with = "lenient::text")]
    pub height: Option<String>,
    #[serde(default, with = "lenient::text")]
    pub diameter: Option<String>,
    pub season: Option<String>,
    #[serde(default, with = "lenient::text")]
    pub pcd: Option<String>,
    #[serde(default, with = "lenient::text")]
    pub et: Option<String>,
    #[serde(default, with = "lenient::text")]
    pub dia: Option<String>,
    #[serde(default, with = "lenient::text")]
    pub color: Option<String>,
}

/// `GET /cart/{telegram_id}` response.
#[derive(Debug, Clone, Deserialize)]
pub struct RemoteCart {
    pub telegram_id: Option<TelegramId>,
    #[serde(default)]
    pub items: Vec<RemoteCartItem>,
}

/// Body of `PUT /cart/{telegram_id}/items/{code}`.
#[derive(Debug, Clone, Serialize)]
pub struct QuantityUpdate {
    pub quantity: u32,
}

// =============================================================================
// Lenient field decoding
// =============================================================================

/// Field adapters for supplier data that is loose about its JSON types.
pub(crate) mod lenient {
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    /// Text form of a JSON scalar; booleans, arrays and objects have none.
    fn into_text(value: Value) -> Option<String> {
        match value {
            Value::String(s) => {
                let trimmed = s.trim();
                (!trimmed.is_empty()).then(|| trimmed.to_string())
            }
            Value::Number(n) => match n.as_i64() {
                Some(i) => Some(i.to_string()),
                None => n.as_f64().map(|f| {
                    if f.fract() == 0.0 && f.abs() < 1e15 {
                        format!("{f:.0}")
                    } else {
                        f.to_string()
                    }
                }),
            },
            _ => None,
        }
    }

    /// Strings, integers and floats as display text (`185.0` becomes `185`).
    pub mod text {
        use super::{Deserialize, Deserializer, Value, into_text};
        use serde::Serializer;

        pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
            Ok(Option::<Value>::deserialize(d)?.and_then(into_text))
        }

        #[allow(clippy::ref_option)]
        pub fn serialize<S: Serializer>(value: &Option<String>, s: S) -> Result<S::Ok, S::Error> {
            match value {
                Some(v) => s.serialize_str(v),
                None => s.serialize_none(),
            }
        }
    }

    /// Stock counts: negative or unparseable values become `None`.
    pub mod count {
        use super::{Deserialize, Deserializer, Value, into_text};

        pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<u32>, D::Error> {
            Ok(Option::<Value>::deserialize(d)?
                .and_then(into_text)
                .and_then(|t| t.trim_start_matches(['>', '<', '+']).parse::<f64>().ok())
                .filter(|n| *n >= 0.0 && *n <= f64::from(u32::MAX))
                .map(|n| {
                    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
                    let count = n.trunc() as u32;
                    count
                }))
        }
    }

    /// Integer ids that may arrive as strings.
    pub mod number {
        use super::{Deserialize, Deserializer, Value, into_text};
        use serde::Serializer;

        pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<i32>, D::Error> {
            Ok(Option::<Value>::deserialize(d)?
                .and_then(into_text)
                .and_then(|t| t.parse::<i32>().ok()))
        }

        #[allow(clippy::ref_option, clippy::trivially_copy_pass_by_ref)]
        pub fn serialize<S: Serializer>(value: &Option<i32>, s: S) -> Result<S::Ok, S::Error> {
            match value {
                Some(v) => s.serialize_i32(*v),
                None => s.serialize_none(),
            }
        }
    }

    /// RFC 3339 timestamps, or naive ISO timestamps assumed to be UTC.
    pub mod timestamp {
        use chrono::{DateTime, NaiveDateTime, Utc};
        use serde::{Deserialize, Deserializer, Serializer};

        pub fn deserialize<'de, D: Deserializer<'de>>(
            d: D,
        ) -> Result<Option<DateTime<Utc>>, D::Error> {
            let Some(raw) = Option::<String>::deserialize(d)? else {
                return Ok(None);
            };
            if let Ok(parsed) = DateTime::parse_from_rfc3339(&raw) {
                return Ok(Some(parsed.with_timezone(&Utc)));
            }
            Ok(NaiveDateTime::parse_from_str(&raw, "%Y-%m-%dT%H:%M:%S%.f")
                .ok()
                .map(|naive| naive.and_utc()))
        }

        #[allow(clippy::ref_option)]
        pub fn serialize<S: Serializer>(
            value: &Option<DateTime<Utc>>,
            s: S,
        ) -> Result<S::Ok, S::Error> {
            match value {
                Some(v) => s.serialize_str(&v.to_rfc3339()),
                None => s.serialize_none(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_raw_product_accepts_loose_types() {
        let raw: RawProduct = serde_json::from_value(json!({
            "code": 2_329_500,
            "brand": "Nokian",
            "model": "Nordman 8",
            "width": 205.0,
            "height": "55",
            "diameter": 16,
            "price": 5750.5,
            "rest": ">20",
            "warehouse_id": "3",
            "load_index": 94,
            "speed_index": false,
            "color": ["black"],
            "thorn": true
        }))
        .expect("raw product");

        assert_eq!(raw.code.as_str(), "2329500");
        assert_eq!(raw.width.as_deref(), Some("205"));
        assert_eq!(raw.height.as_deref(), Some("55"));
        assert_eq!(raw.diameter.as_deref(), Some("16"));
        assert_eq!(raw.rest, Some(20));
        assert_eq!(raw.warehouse_id, Some(3));
        assert_eq!(raw.load_index.as_deref(), Some("94"));
        assert_eq!(raw.speed_index, None);
        assert_eq!(raw.color, None);
    }

    #[test]
    fn test_order_parses_naive_timestamp_and_unknown_status() {
        let order: Order = serde_json::from_value(json!({
            "order_id": "ORD-20250101120000",
            "items": [],
            "total_amount": 12000,
            "status": "returned",
            "created_at": "2025-01-01T12:00:00.123456"
        }))
        .expect("order");

        assert_eq!(order.status.label(), "returned");
        assert!(order.created_at.is_some());
    }

    #[test]
    fn test_order_item_labels() {
        let item: OrderItem = serde_json::from_value(json!({
            "code": "T1",
            "name": "Nokian Nordman 8",
            "quantity": 2,
            "price_final": 100,
            "width": 205,
            "height": 55,
            "diameter": 16,
            "season": "winter"
        }))
        .expect("item");

        assert_eq!(item.size_label().as_deref(), Some("205/55 R16"));
        assert_eq!(item.season_label().as_deref(), Some("❄️ Зима"));
        assert_eq!(item.line_total(), Price::from_roubles(200));
    }

    #[test]
    fn test_user_display_name_fallbacks() {
        let mut user = User {
            telegram_id: TelegramId::from("1"),
            username: Some("rider".to_string()),
            first_name: None,
            last_name: None,
            is_admin: false,
            is_blocked: false,
            created_at: None,
        };
        assert_eq!(user.display_name(), "rider");

        user.username = None;
        assert_eq!(user.display_name(), "Гость");

        user.first_name = Some("Анна".to_string());
        assert_eq!(user.display_name(), "Анна");
    }

    #[test]
    fn test_tire_query_omits_empty_fields() {
        let query = TireQuery {
            width: Some(205),
            page: 0,
            page_size: 20,
            ..TireQuery::default()
        };
        let value = serde_json::to_value(&query).expect("serialize");

        assert_eq!(value, json!({ "width": 205, "page": 0, "page_size": 20 }));
    }

    #[test]
    fn test_activity_params_summary() {
        let log: ActivityLog = serde_json::from_value(json!({
            "telegram_id": "42",
            "activity_type": "tire_search",
            "search_params": { "width": 205, "season": "winter", "brand": null },
            "timestamp": "2025-03-01T10:00:00+00:00"
        }))
        .expect("log");

        assert_eq!(log.activity_type, ActivityType::TireSearch);
        let summary = log.params_summary().expect("summary");
        assert!(summary.contains("width=205"));
        assert!(summary.contains("season=winter"));
        assert!(!summary.contains("brand"));
    }
}
