//! Status and classification enums.
//!
//! The order lifecycle is owned by the backend; the storefront only labels
//! what it receives. Unknown values are kept verbatim so a newer backend never
//! breaks the order list.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

/// Order status as reported by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum OrderStatus {
    PendingConfirmation,
    Confirmed,
    AwaitingPayment,
    InProgress,
    Delivery,
    Delayed,
    Completed,
    Cancelled,
    /// A status this build does not know about, rendered as-is.
    Unknown(String),
}

impl OrderStatus {
    /// Statuses an admin may move a confirmed order to.
    pub const ADMIN_TRANSITIONS: [Self; 6] = [
        Self::AwaitingPayment,
        Self::InProgress,
        Self::Delivery,
        Self::Delayed,
        Self::Completed,
        Self::Cancelled,
    ];

    /// Wire value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::PendingConfirmation => "pending_confirmation",
            Self::Confirmed => "confirmed",
            Self::AwaitingPayment => "awaiting_payment",
            Self::InProgress => "in_progress",
            Self::Delivery => "delivery",
            Self::Delayed => "delayed",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
            Self::Unknown(raw) => raw,
        }
    }

    /// Human-readable label shown on order badges.
    #[must_use]
    pub fn label(&self) -> &str {
        match self {
            Self::PendingConfirmation => "Ожидает подтверждения",
            Self::Confirmed => "Подтвержден",
            Self::AwaitingPayment => "Ожидание оплаты",
            Self::InProgress => "В работе",
            Self::Delivery => "Доставка",
            Self::Delayed => "Задержка",
            Self::Completed => "Выполнен",
            Self::Cancelled => "Отменен",
            Self::Unknown(raw) => raw,
        }
    }

    /// CSS modifier for the status badge.
    #[must_use]
    pub const fn tone(&self) -> &'static str {
        match self {
            Self::PendingConfirmation | Self::AwaitingPayment => "pending",
            Self::Confirmed | Self::InProgress | Self::Delivery => "active",
            Self::Delayed => "warning",
            Self::Completed => "done",
            Self::Cancelled => "cancelled",
            Self::Unknown(_) => "neutral",
        }
    }

    /// Whether the order still waits for an admin decision.
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        matches!(self, Self::PendingConfirmation)
    }
}

impl From<String> for OrderStatus {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "pending_confirmation" => Self::PendingConfirmation,
            "confirmed" => Self::Confirmed,
            "awaiting_payment" => Self::AwaitingPayment,
            "in_progress" => Self::InProgress,
            "delivery" => Self::Delivery,
            "delayed" => Self::Delayed,
            "completed" => Self::Completed,
            "cancelled" => Self::Cancelled,
            _ => Self::Unknown(raw),
        }
    }
}

impl From<OrderStatus> for String {
    fn from(status: OrderStatus) -> Self {
        match status {
            OrderStatus::Unknown(raw) => raw,
            known => known.as_str().to_owned(),
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tire season.
///
/// The search API takes `summer`/`winter`/`all-season`; the supplier feed
/// reports single-letter codes (`s`, `w`, `u` or `ws`). Both parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Season {
    Summer,
    Winter,
    AllSeason,
}

impl Season {
    /// Every season, in the order the search form lists them.
    pub const ALL: [Self; 3] = [Self::Summer, Self::Winter, Self::AllSeason];

    /// Query value understood by the search endpoint.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Summer => "summer",
            Self::Winter => "winter",
            Self::AllSeason => "all-season",
        }
    }

    /// Label used in the search form.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Summer => "Летние",
            Self::Winter => "Зимние",
            Self::AllSeason => "Всесезонные",
        }
    }

    /// Short label with an icon, used on order lines.
    #[must_use]
    pub const fn badge(&self) -> &'static str {
        match self {
            Self::Summer => "☀️ Лето",
            Self::Winter => "❄️ Зима",
            Self::AllSeason => "🍂 Всесезон",
        }
    }
}

impl FromStr for Season {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "summer" | "s" => Ok(Self::Summer),
            "winter" | "w" => Ok(Self::Winter),
            "all-season" | "all_season" | "u" | "ws" => Ok(Self::AllSeason),
            other => Err(format!("invalid season: {other}")),
        }
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// User activity kinds recorded by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ActivityType {
    TireSearch,
    DiskSearch,
    CarSelection,
    OrderCreated,
    CartAdd,
    CartRemove,
    Other(String),
}

impl ActivityType {
    /// Types offered by the activity log filter.
    pub const FILTERABLE: [Self; 6] = [
        Self::TireSearch,
        Self::DiskSearch,
        Self::CarSelection,
        Self::OrderCreated,
        Self::CartAdd,
        Self::CartRemove,
    ];

    /// Wire value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::TireSearch => "tire_search",
            Self::DiskSearch => "disk_search",
            Self::CarSelection => "car_selection",
            Self::OrderCreated => "order_created",
            Self::CartAdd => "cart_add",
            Self::CartRemove => "cart_remove",
            Self::Other(raw) => raw,
        }
    }

    /// Label used in the admin activity log.
    #[must_use]
    pub fn label(&self) -> &str {
        match self {
            Self::TireSearch => "Поиск шин",
            Self::DiskSearch => "Поиск дисков",
            Self::CarSelection => "Подбор по авто",
            Self::OrderCreated => "Создание заказа",
            Self::CartAdd => "Добавление в корзину",
            Self::CartRemove => "Удаление из корзины",
            Self::Other(raw) => raw,
        }
    }
}

impl From<String> for ActivityType {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "tire_search" => Self::TireSearch,
            "disk_search" => Self::DiskSearch,
            "car_selection" => Self::CarSelection,
            "order_created" => Self::OrderCreated,
            "cart_add" => Self::CartAdd,
            "cart_remove" => Self::CartRemove,
            _ => Self::Other(raw),
        }
    }
}

impl From<ActivityType> for String {
    fn from(kind: ActivityType) -> Self {
        match kind {
            ActivityType::Other(raw) => raw,
            known => known.as_str().to_owned(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_status_labels() {
        let status: OrderStatus = serde_json::from_str("\"pending_confirmation\"").expect("status");
        assert_eq!(status, OrderStatus::PendingConfirmation);
        assert_eq!(status.label(), "Ожидает подтверждения");
        assert!(status.is_pending());
    }

    #[test]
    fn test_unknown_status_kept_verbatim() {
        let status: OrderStatus = serde_json::from_str("\"returned\"").expect("status");
        assert_eq!(status.label(), "returned");
        assert_eq!(serde_json::to_string(&status).expect("serialize"), "\"returned\"");
    }

    #[test]
    fn test_season_parses_supplier_codes() {
        assert_eq!("w".parse::<Season>(), Ok(Season::Winter));
        assert_eq!("all-season".parse::<Season>(), Ok(Season::AllSeason));
        assert_eq!("ws".parse::<Season>(), Ok(Season::AllSeason));
        assert!("spring".parse::<Season>().is_err());
    }

    #[test]
    fn test_activity_type_round_trip_unknown() {
        let kind = ActivityType::from("login".to_owned());
        assert_eq!(kind, ActivityType::Other("login".to_owned()));
        assert_eq!(String::from(ActivityType::CartAdd), "cart_add");
    }
}
