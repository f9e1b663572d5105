//! Display data shared by several templates.
//!
//! Templates only print strings and booleans; all formatting happens here.

use tower_sessions::Session;
use wheelhouse_core::{Cart, CartLine, Product, ProductSpec};

use crate::api::{Order, OrderItem, User};
use crate::navigation::Page;
use crate::state::AppState;
use crate::telegram::{BridgeSettings, Notice, take_notices};

// =============================================================================
// Layout
// =============================================================================

/// Data every page renders: heading, Telegram bridge settings, pending
/// notices and the signed-in user.
#[derive(Clone)]
pub struct Layout {
    pub page: Page,
    pub bridge: BridgeSettings,
    pub notices: Vec<Notice>,
    pub user: Option<User>,
}

impl Layout {
    /// Build the layout for `page`, draining the notice queue.
    pub async fn new(state: &AppState, session: &Session, page: Page, user: Option<User>) -> Self {
        Self {
            page,
            bridge: state.bridge().clone(),
            notices: take_notices(session).await,
            user,
        }
    }

    /// Whether the "go home" link is shown.
    #[must_use]
    pub fn shows_home_link(&self) -> bool {
        self.page != Page::Home
    }

    /// Whether the signed-in user is an admin.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.user.as_ref().is_some_and(|u| u.is_admin)
    }
}

// =============================================================================
// Products
// =============================================================================

/// A search or car-lookup result card.
#[derive(Clone)]
pub struct ProductCard {
    pub code: String,
    pub brand: String,
    pub model: String,
    pub price: String,
    pub size: String,
    pub season: Option<String>,
    pub indices: Option<String>,
    pub studded: bool,
    pub runflat: bool,
    pub disk_params: Option<String>,
    pub rest: u32,
    pub warehouse: String,
    pub image: Option<String>,
}

impl From<&Product> for ProductCard {
    fn from(product: &Product) -> Self {
        let (rest, warehouse) = product.availability();
        let (studded, runflat) = match &product.spec {
            ProductSpec::Tire(tire) => (tire.studded, tire.runflat),
            ProductSpec::Disk(_) => (false, false),
        };
        Self {
            code: product.code.to_string(),
            brand: product.brand.clone(),
            model: product.model.clone(),
            price: product.price.display(),
            size: product.spec.size_label(),
            season: product.spec.season_label(),
            indices: product.spec.indices(),
            studded,
            runflat,
            disk_params: product.spec.disk_params(),
            rest,
            warehouse,
            image: product.img_small.clone().filter(|url| url.starts_with("https://")),
        }
    }
}

/// Cards for a result list.
#[must_use]
pub fn product_cards(products: &[Product]) -> Vec<ProductCard> {
    products.iter().map(ProductCard::from).collect()
}

// =============================================================================
// Cart
// =============================================================================

/// One cart line for display.
#[derive(Clone)]
pub struct CartLineView {
    pub code: String,
    pub name: String,
    pub size: String,
    pub season: Option<String>,
    pub warehouse: Option<String>,
    pub quantity: u32,
    pub unit_price: String,
    pub line_total: String,
    pub image: Option<String>,
}

impl From<&CartLine> for CartLineView {
    fn from(line: &CartLine) -> Self {
        Self {
            code: line.code.to_string(),
            name: line.name(),
            size: line.spec.size_label(),
            season: line.spec.season_label(),
            warehouse: line.warehouse_name.clone(),
            quantity: line.quantity(),
            unit_price: line.price.display(),
            line_total: line.line_total().display(),
            image: line.img_small.clone().filter(|url| url.starts_with("https://")),
        }
    }
}

/// The cart for display.
#[derive(Clone)]
pub struct CartView {
    pub lines: Vec<CartLineView>,
    pub item_count: u32,
    pub total: String,
}

impl From<&Cart> for CartView {
    fn from(cart: &Cart) -> Self {
        Self {
            lines: cart.items().iter().map(CartLineView::from).collect(),
            item_count: cart.item_count(),
            total: cart.total().display(),
        }
    }
}

impl CartView {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

// =============================================================================
// Orders
// =============================================================================

/// An order line for display.
#[derive(Clone)]
pub struct OrderItemView {
    pub name: String,
    pub size: Option<String>,
    pub season: Option<String>,
    pub disk_params: Option<String>,
    pub quantity: u32,
    pub unit_price: String,
    pub line_total: String,
    pub warehouse: Option<String>,
}

impl From<&OrderItem> for OrderItemView {
    fn from(item: &OrderItem) -> Self {
        Self {
            name: item.name.clone(),
            size: item.size_label(),
            season: item.season_label(),
            disk_params: item.disk_params(),
            quantity: item.quantity,
            unit_price: item.price_final.display(),
            line_total: item.line_total().display(),
            warehouse: item.warehouse_name.clone(),
        }
    }
}

/// An order for display.
#[derive(Clone)]
pub struct OrderView {
    pub id: String,
    pub status_value: String,
    pub status_label: String,
    pub status_tone: &'static str,
    pub is_pending: bool,
    pub items: Vec<OrderItemView>,
    pub total: String,
    pub markup: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub comment: Option<String>,
    pub admin_comment: Option<String>,
    pub created_at: String,
    pub customer: Option<String>,
}

impl From<&Order> for OrderView {
    fn from(order: &Order) -> Self {
        let customer = match (&order.user_name, &order.user_telegram_id) {
            (Some(name), Some(id)) if !name.is_empty() => Some(format!("{name} ({id})")),
            (_, Some(id)) => Some(id.to_string()),
            (Some(name), None) => Some(name.clone()),
            (None, None) => None,
        };
        Self {
            id: order.order_id.to_string(),
            status_value: order.status.as_str().to_string(),
            status_label: order.status.label().to_string(),
            status_tone: order.status.tone(),
            is_pending: order.status.is_pending(),
            items: order.items.iter().map(OrderItemView::from).collect(),
            total: order.total_amount.display_rounded(),
            markup: order.markup_percentage.map(|m| format!("{m}%")),
            address: order.delivery_address.as_ref().map(|a| a.summary()),
            phone: order.delivery_address.as_ref().map(|a| a.phone.clone()),
            comment: order
                .delivery_address
                .as_ref()
                .and_then(|a| a.comment.clone()),
            admin_comment: order.admin_comment.clone().filter(|c| !c.is_empty()),
            created_at: crate::filters::format_datetime(order.created_at),
            customer,
        }
    }
}

/// Views for an order list.
#[must_use]
pub fn order_views(orders: &[Order]) -> Vec<OrderView> {
    orders.iter().map(OrderView::from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use wheelhouse_core::{Price, ProductCode, TireSpec};

    #[test]
    fn test_product_card_for_tire() {
        let product = Product {
            code: ProductCode::from("T1"),
            brand: "Nokian".to_string(),
            model: "Nordman 8".to_string(),
            price: Price::from_roubles(5400),
            price_original: None,
            rest: 12,
            warehouse_id: None,
            warehouse_name: None,
            img_small: Some("http://insecure.example/img.png".to_string()),
            stock: Vec::new(),
            spec: ProductSpec::Tire(TireSpec {
                width: Some("205".to_string()),
                height: Some("55".to_string()),
                diameter: Some("16".to_string()),
                season: Some("w".to_string()),
                load_index: Some("94".to_string()),
                speed_index: Some("T".to_string()),
                studded: true,
                ..TireSpec::default()
            }),
        };

        let card = ProductCard::from(&product);
        assert_eq!(card.size, "205/55 R16");
        assert_eq!(card.indices.as_deref(), Some("94T"));
        assert!(card.studded);
        assert!(!card.runflat);
        assert_eq!(card.warehouse, "Склад");
        assert_eq!(card.rest, 12);
        assert!(card.image.is_none());
    }
}
