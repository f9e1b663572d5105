//! Order payload submitted at checkout.

use serde::{Deserialize, Serialize};

use super::address::DeliveryAddress;
use super::cart::{Cart, CartLine};
use super::id::{ProductCode, WarehouseId};
use super::price::Price;

/// Warehouse assumed for lines whose product did not name one.
pub const DEFAULT_WAREHOUSE_ID: WarehouseId = WarehouseId::new(1);

/// Warehouse name assumed for lines whose product did not name one.
pub const DEFAULT_WAREHOUSE_NAME: &str = "Москва";

/// One order line as the backend expects it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewOrderLine {
    pub code: ProductCode,
    pub name: String,
    pub brand: String,
    pub quantity: u32,
    /// Supplier price before markup.
    pub price_base: Price,
    /// Price charged to the customer.
    pub price_final: Price,
    pub warehouse_id: WarehouseId,
    pub warehouse_name: String,
}

impl From<&CartLine> for NewOrderLine {
    fn from(line: &CartLine) -> Self {
        Self {
            code: line.code.clone(),
            name: line.name(),
            brand: line.brand.clone(),
            quantity: line.quantity(),
            price_base: line.price_original.unwrap_or(line.price),
            price_final: line.price,
            warehouse_id: line.warehouse_id.unwrap_or(DEFAULT_WAREHOUSE_ID),
            warehouse_name: line
                .warehouse_name
                .clone()
                .filter(|name| !name.is_empty())
                .unwrap_or_else(|| DEFAULT_WAREHOUSE_NAME.to_owned()),
        }
    }
}

/// Body of `POST /orders`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewOrder {
    pub items: Vec<NewOrderLine>,
    pub delivery_address: DeliveryAddress,
}

impl NewOrder {
    /// Build the order for every line in the cart.
    #[must_use]
    pub fn from_cart(cart: &Cart, delivery_address: DeliveryAddress) -> Self {
        Self {
            items: cart.items().iter().map(NewOrderLine::from).collect(),
            delivery_address,
        }
    }

    /// Customer total of the submitted lines.
    #[must_use]
    pub fn total(&self) -> Price {
        self.items
            .iter()
            .map(|item| item.price_final.times(item.quantity))
            .sum()
    }
}
