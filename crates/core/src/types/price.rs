//! Rouble prices using decimal arithmetic.
//!
//! Prices are computed by the backend (supplier base price plus the store
//! markup) and are opaque to the storefront: it only multiplies them by
//! quantities, sums them and formats them for display.

use core::fmt;
use core::iter::Sum;
use core::ops::Add;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Non-breaking space used as the thousands separator.
const GROUP_SEPARATOR: char = '\u{a0}';

/// A price in roubles.
///
/// Deserializes from a JSON number or a numeric string. Serializes as a JSON
/// number because the backend models every amount as a float.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Price(Decimal);

impl Price {
    /// Zero roubles.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create a new price.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Create a price from whole roubles.
    #[must_use]
    pub fn from_roubles(roubles: i64) -> Self {
        Self(Decimal::from(roubles))
    }

    /// The underlying decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Returns `true` for a zero amount.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Price of `quantity` units.
    #[must_use]
    pub fn times(self, quantity: u32) -> Self {
        Self(self.0 * Decimal::from(quantity))
    }

    /// Format for display, keeping kopecks only when present (e.g. "3 450,50 ₽").
    #[must_use]
    pub fn display(&self) -> String {
        format_roubles(self.0.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero))
    }

    /// Format rounded to whole roubles (e.g. "3 451 ₽").
    #[must_use]
    pub fn display_rounded(&self) -> String {
        format_roubles(self.0.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero))
    }
}

fn format_roubles(amount: Decimal) -> String {
    let negative = amount.is_sign_negative() && !amount.is_zero();
    let abs = amount.abs();
    let whole = abs.trunc();
    let kopecks = ((abs - whole) * Decimal::ONE_HUNDRED).to_u32().unwrap_or(0);

    let digits = whole.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 8);
    if negative {
        grouped.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(GROUP_SEPARATOR);
        }
        grouped.push(ch);
    }
    if kopecks > 0 {
        grouped.push_str(&format!(",{kopecks:02}"));
    }
    grouped.push_str(" ₽");
    grouped
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display())
    }
}

impl Add for Price {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl Sum for Price {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl From<Decimal> for Price {
    fn from(amount: Decimal) -> Self {
        Self(amount)
    }
}

impl Serialize for Price {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.0.to_f64() {
            Some(value) => serializer.serialize_f64(value),
            None => serializer.serialize_str(&self.0.to_string()),
        }
    }
}

impl<'de> Deserialize<'de> for Price {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        <Decimal as Deserialize>::deserialize(deserializer).map(Self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_display_groups_thousands() {
        assert_eq!(Price::from_roubles(123_456).display(), "123\u{a0}456 ₽");
        assert_eq!(Price::from_roubles(999).display(), "999 ₽");
        assert_eq!(Price::from_roubles(1_000_000).display(), "1\u{a0}000\u{a0}000 ₽");
    }

    #[test]
    fn test_display_keeps_kopecks() {
        let price = Price::new(Decimal::new(345_050, 2));
        assert_eq!(price.display(), "3\u{a0}450,50 ₽");
    }

    #[test]
    fn test_display_rounded() {
        let price = Price::new(Decimal::new(345_050, 2));
        assert_eq!(price.display_rounded(), "3\u{a0}451 ₽");
    }

    #[test]
    fn test_times_and_sum() {
        let total: Price = [Price::from_roubles(100).times(2), Price::from_roubles(50)]
            .into_iter()
            .sum();
        assert_eq!(total, Price::from_roubles(250));
    }

    #[test]
    fn test_deserialize_number_and_string() {
        let number: Price = serde_json::from_str("4599.5").expect("number");
        let text: Price = serde_json::from_str("\"4599.5\"").expect("string");
        assert_eq!(number, text);
        assert_eq!(number.amount(), Decimal::new(45995, 1));
    }

    #[test]
    fn test_serialize_as_number() {
        let json = serde_json::to_string(&Price::from_roubles(1500)).expect("serialize");
        assert_eq!(json, "1500.0");
    }
}
