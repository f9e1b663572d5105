//! The cart container.
//!
//! [`Cart`] is an explicitly owned value: callers load it, mutate it through
//! the methods below and persist it themselves. It enforces two invariants:
//!
//! - at most one line per product code (adding an existing code increments)
//! - every line has `quantity >= 1` (driving a quantity to zero removes it)
//!
//! The total is derived on every read and never stored.

use serde::{Deserialize, Serialize};

use super::id::{ProductCode, WarehouseId};
use super::price::Price;
use super::product::{Product, ProductSpec};

/// One distinct product the user intends to order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub code: ProductCode,
    pub brand: String,
    pub model: String,
    pub spec: ProductSpec,
    pub price: Price,
    pub price_original: Option<Price>,
    quantity: u32,
    pub warehouse_id: Option<WarehouseId>,
    pub warehouse_name: Option<String>,
    pub img_small: Option<String>,
    pub rest: u32,
}

impl CartLine {
    fn from_product(product: &Product, quantity: u32) -> Self {
        Self {
            code: product.code.clone(),
            brand: product.brand.clone(),
            model: product.model.clone(),
            spec: product.spec.clone(),
            price: product.price,
            price_original: product.price_original,
            quantity,
            warehouse_id: product.warehouse_id,
            warehouse_name: product.warehouse_name.clone(),
            img_small: product.img_small.clone(),
            rest: product.rest,
        }
    }

    /// Units of this product in the cart, always at least one.
    #[must_use]
    pub const fn quantity(&self) -> u32 {
        self.quantity
    }

    /// `"{brand} {model}"`.
    #[must_use]
    pub fn name(&self) -> String {
        format!("{} {}", self.brand, self.model).trim().to_owned()
    }

    /// Unit price times quantity.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.price.times(self.quantity)
    }
}

/// Ordered collection of cart lines.
///
/// Serializes as a plain JSON array of lines. Deserializing re-establishes
/// the invariants: duplicate codes are merged and empty lines dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<CartLine>", into = "Vec<CartLine>")]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    /// An empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { lines: Vec::new() }
    }

    /// Add `quantity` units of a product.
    ///
    /// An existing line for the same code is incremented; otherwise a new
    /// line is appended. Adding zero units changes nothing.
    pub fn add(&mut self, product: &Product, quantity: u32) {
        if quantity == 0 {
            return;
        }
        match self.lines.iter_mut().find(|line| line.code == product.code) {
            Some(line) => line.quantity = line.quantity.saturating_add(quantity),
            None => self.lines.push(CartLine::from_product(product, quantity)),
        }
    }

    /// Remove the line for `code`, returning it if it was present.
    pub fn remove(&mut self, code: &ProductCode) -> Option<CartLine> {
        let index = self.lines.iter().position(|line| &line.code == code)?;
        Some(self.lines.remove(index))
    }

    /// Replace the quantity of the line for `code`.
    ///
    /// A quantity of zero or below removes the line. Returns `false` when
    /// no line with that code exists.
    pub fn set_quantity(&mut self, code: &ProductCode, quantity: i64) -> bool {
        if quantity <= 0 {
            return self.remove(code).is_some();
        }
        let Some(line) = self.lines.iter_mut().find(|line| &line.code == code) else {
            return false;
        };
        line.quantity = u32::try_from(quantity).unwrap_or(u32::MAX);
        true
    }

    /// Empty the cart.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Sum of price times quantity over all lines.
    #[must_use]
    pub fn total(&self) -> Price {
        self.lines.iter().map(CartLine::line_total).sum()
    }

    /// Total number of units across lines.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.lines
            .iter()
            .fold(0_u32, |acc, line| acc.saturating_add(line.quantity))
    }

    /// Number of distinct lines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// The line for `code`, if any.
    #[must_use]
    pub fn get(&self, code: &ProductCode) -> Option<&CartLine> {
        self.lines.iter().find(|line| &line.code == code)
    }

    /// Lines in insertion order.
    #[must_use]
    pub fn items(&self) -> &[CartLine] {
        &self.lines
    }
}

impl From<Vec<CartLine>> for Cart {
    fn from(stored: Vec<CartLine>) -> Self {
        let mut lines: Vec<CartLine> = Vec::with_capacity(stored.len());
        for line in stored.into_iter().filter(|line| line.quantity > 0) {
            match lines.iter_mut().find(|existing| existing.code == line.code) {
                Some(existing) => {
                    existing.quantity = existing.quantity.saturating_add(line.quantity);
                }
                None => lines.push(line),
            }
        }
        Self { lines }
    }
}

impl From<Cart> for Vec<CartLine> {
    fn from(cart: Cart) -> Self {
        cart.lines
    }
}
