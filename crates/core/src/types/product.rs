//! Tires and disks as returned by search and car lookup.
//!
//! A product is one supplier offer: shared commercial fields plus a
//! category-specific [`ProductSpec`]. The storefront never computes prices or
//! stock; it only displays what the backend resolved.

use core::fmt;

use serde::{Deserialize, Serialize};

use super::id::{ProductCode, WarehouseId};
use super::price::Price;
use super::status::Season;

/// Fallback label when neither the stock breakdown nor the product names a warehouse.
pub const UNNAMED_WAREHOUSE: &str = "Склад";

/// Product category, selectable on the search page and in car lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductCategory {
    #[default]
    Tires,
    Disks,
}

impl ProductCategory {
    /// Path segment used by the search endpoints and page URLs.
    #[must_use]
    pub const fn slug(&self) -> &'static str {
        match self {
            Self::Tires => "tires",
            Self::Disks => "disks",
        }
    }

    /// Value of the `product_type` parameter of the car goods endpoint.
    #[must_use]
    pub const fn product_type(&self) -> &'static str {
        match self {
            Self::Tires => "tyre",
            Self::Disks => "disk",
        }
    }

    /// Tab label.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Tires => "Шины",
            Self::Disks => "Диски",
        }
    }

    /// Parse either a slug (`tires`) or a `product_type` value (`tyre`).
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "tires" | "tyre" | "tire" => Some(Self::Tires),
            "disks" | "disk" => Some(Self::Disks),
            _ => None,
        }
    }
}

impl fmt::Display for ProductCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

/// Tire-specific attributes.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TireSpec {
    pub width: Option<String>,
    pub height: Option<String>,
    pub diameter: Option<String>,
    /// Raw season code from the feed (`w`, `s`, `winter`, ...).
    pub season: Option<String>,
    pub season_name: Option<String>,
    pub load_index: Option<String>,
    pub speed_index: Option<String>,
    pub studded: bool,
    pub runflat: bool,
}

/// Disk (wheel) attributes.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DiskSpec {
    pub width: Option<String>,
    pub diameter: Option<String>,
    pub pcd: Option<String>,
    pub et: Option<String>,
    pub dia: Option<String>,
    pub color: Option<String>,
}

/// Category-specific product data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProductSpec {
    Tire(TireSpec),
    Disk(DiskSpec),
}

impl ProductSpec {
    /// The category this spec belongs to.
    #[must_use]
    pub const fn category(&self) -> ProductCategory {
        match self {
            Self::Tire(_) => ProductCategory::Tires,
            Self::Disk(_) => ProductCategory::Disks,
        }
    }

    /// Size line: `185/60 R15` for tires, `6.5x15` for disks.
    #[must_use]
    pub fn size_label(&self) -> String {
        match self {
            Self::Tire(tire) => format!(
                "{}/{} R{}",
                tire.width.as_deref().unwrap_or_default(),
                tire.height.as_deref().unwrap_or_default(),
                tire.diameter.as_deref().unwrap_or_default(),
            ),
            Self::Disk(disk) => format!(
                "{}x{}",
                disk.width.as_deref().unwrap_or_default(),
                disk.diameter.as_deref().unwrap_or_default(),
            ),
        }
    }

    /// Parsed season for tires.
    #[must_use]
    pub fn season(&self) -> Option<Season> {
        match self {
            Self::Tire(tire) => tire.season.as_deref().and_then(|s| s.parse().ok()),
            Self::Disk(_) => None,
        }
    }

    /// Season text: the feed's own name, else the label for the parsed code.
    #[must_use]
    pub fn season_label(&self) -> Option<String> {
        match self {
            Self::Tire(tire) => tire
                .season_name
                .clone()
                .filter(|name| !name.is_empty())
                .or_else(|| self.season().map(|s| s.badge().to_owned()))
                .or_else(|| tire.season.clone()),
            Self::Disk(_) => None,
        }
    }

    /// Load and speed index (`91T`), only when both are known.
    #[must_use]
    pub fn indices(&self) -> Option<String> {
        match self {
            Self::Tire(TireSpec {
                load_index: Some(load),
                speed_index: Some(speed),
                ..
            }) if !load.is_empty() && !speed.is_empty() => Some(format!("{load}{speed}")),
            _ => None,
        }
    }

    /// Disk parameters line: `PCD 5x114.3 · ET 45 · DIA 67.1 · black`.
    #[must_use]
    pub fn disk_params(&self) -> Option<String> {
        let Self::Disk(disk) = self else {
            return None;
        };
        let parts: Vec<String> = [
            disk.pcd.as_deref().map(|v| format!("PCD {v}")),
            disk.et.as_deref().map(|v| format!("ET {v}")),
            disk.dia.as_deref().map(|v| format!("DIA {v}")),
            disk.color.clone(),
        ]
        .into_iter()
        .flatten()
        .collect();
        (!parts.is_empty()).then(|| parts.join(" · "))
    }
}

/// One row of the per-warehouse stock breakdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockEntry {
    pub rest: u32,
    pub warehouse: Option<String>,
    pub price: Option<Price>,
}

/// A product offer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub code: ProductCode,
    pub brand: String,
    pub model: String,
    /// Unit price with markup applied.
    pub price: Price,
    /// Supplier base price before markup.
    pub price_original: Option<Price>,
    pub rest: u32,
    pub warehouse_id: Option<WarehouseId>,
    pub warehouse_name: Option<String>,
    pub img_small: Option<String>,
    #[serde(default)]
    pub stock: Vec<StockEntry>,
    pub spec: ProductSpec,
}

impl Product {
    /// Display name, `"{brand} {model}"`.
    #[must_use]
    pub fn name(&self) -> String {
        format!("{} {}", self.brand, self.model).trim().to_owned()
    }

    /// Category of the product.
    #[must_use]
    pub const fn category(&self) -> ProductCategory {
        self.spec.category()
    }

    /// Stock count and warehouse label shown on the product card.
    ///
    /// The first stock breakdown entry wins; otherwise the product's own
    /// `rest`/`warehouse_name`, with a generic label as the last resort.
    #[must_use]
    pub fn availability(&self) -> (u32, String) {
        if let Some(entry) = self.stock.first() {
            let name = entry
                .warehouse
                .clone()
                .filter(|w| !w.is_empty())
                .unwrap_or_else(|| UNNAMED_WAREHOUSE.to_owned());
            return (entry.rest, name);
        }
        let name = self
            .warehouse_name
            .clone()
            .filter(|w| !w.is_empty())
            .unwrap_or_else(|| UNNAMED_WAREHOUSE.to_owned());
        (self.rest, name)
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::{disk, tire};
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_size_labels() {
        assert_eq!(tire("T1", 100).spec.size_label(), "205/55 R16");
        assert_eq!(disk("D1", 100).spec.size_label(), "7x17");
    }

    #[test]
    fn test_tire_details() {
        let product = tire("T1", 100);
        assert_eq!(product.spec.indices().as_deref(), Some("94T"));
        assert_eq!(product.spec.season(), Some(Season::Winter));
        assert_eq!(product.spec.season_label().as_deref(), Some("❄️ Зима"));
        assert_eq!(product.spec.disk_params(), None);
    }

    #[test]
    fn test_disk_params() {
        assert_eq!(
            disk("D1", 100).spec.disk_params().as_deref(),
            Some("PCD 5x114.3 · ET 45 · DIA 60.1 · S")
        );
    }

    #[test]
    fn test_availability_prefers_stock_breakdown() {
        let mut product = disk("D1", 100);
        assert_eq!(product.availability(), (4, "Тюмень".to_owned()));

        product.stock.push(StockEntry {
            rest: 12,
            warehouse: Some("Екатеринбург".to_owned()),
            price: None,
        });
        assert_eq!(product.availability(), (12, "Екатеринбург".to_owned()));
    }

    #[test]
    fn test_availability_falls_back_to_generic_label() {
        assert_eq!(tire("T1", 100).availability(), (8, UNNAMED_WAREHOUSE.to_owned()));
    }

    #[test]
    fn test_category_parse() {
        assert_eq!(ProductCategory::parse("tyre"), Some(ProductCategory::Tires));
        assert_eq!(ProductCategory::parse("disks"), Some(ProductCategory::Disks));
        assert_eq!(ProductCategory::parse("rims"), None);
    }
}
