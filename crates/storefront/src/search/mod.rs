//! Search form model and query building.
//!
//! The form is kept as the raw strings the user typed so it can be
//! re-rendered unchanged. Query building is where interpretation happens:
//! empty or unparseable numbers are dropped rather than sent, tire sizes are
//! whole numbers and disk width may be fractional.

use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use wheelhouse_core::{Product, ProductCategory, ProductCode, Season, TelegramId};

use crate::api::{DiskQuery, SearchResults, TireQuery};
use crate::models::session_keys;

/// Cities offered by the search form.
pub const CITIES: [&str; 9] = [
    "Тюмень",
    "Сургут",
    "Лянтор",
    "Нефтеюганск",
    "Белый Яр",
    "Екатеринбург",
    "Челябинск",
    "Москва",
    "Санкт-Петербург",
];

/// City preselected in the form.
pub const DEFAULT_CITY: &str = "Тюмень";

/// Results requested per search.
pub const PAGE_SIZE: u32 = 20;

/// Search filters as submitted by the form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchForm {
    pub category: ProductCategory,
    pub width: String,
    pub height: String,
    pub diameter: String,
    pub season: String,
    pub brand: String,
    pub city: String,
}

impl Default for SearchForm {
    fn default() -> Self {
        Self::new(ProductCategory::Tires)
    }
}

impl SearchForm {
    /// An empty form for a category.
    #[must_use]
    pub fn new(category: ProductCategory) -> Self {
        Self {
            category,
            width: String::new(),
            height: String::new(),
            diameter: String::new(),
            season: String::new(),
            brand: String::new(),
            city: DEFAULT_CITY.to_string(),
        }
    }

    /// Selected season, if the field holds a known value.
    #[must_use]
    pub fn season(&self) -> Option<Season> {
        non_empty(&self.season).and_then(|s| s.parse().ok())
    }

    /// Selected city; unknown values fall back to the default.
    #[must_use]
    pub fn city(&self) -> &str {
        let city = self.city.trim();
        if CITIES.contains(&city) {
            city
        } else {
            DEFAULT_CITY
        }
    }

    /// Tire search parameters.
    #[must_use]
    pub fn tire_query(&self, telegram_id: Option<TelegramId>) -> TireQuery {
        TireQuery {
            width: parse_whole(&self.width),
            height: parse_whole(&self.height),
            diameter: parse_whole(&self.diameter),
            season: self.season().map(|s| s.as_str().to_string()),
            brand: non_empty(&self.brand).map(str::to_string),
            city: Some(self.city().to_string()),
            page: 0,
            page_size: PAGE_SIZE,
            telegram_id,
        }
    }

    /// Disk search parameters.
    #[must_use]
    pub fn disk_query(&self, telegram_id: Option<TelegramId>) -> DiskQuery {
        DiskQuery {
            diameter: parse_whole(&self.diameter),
            width: parse_fraction(&self.width),
            brand: non_empty(&self.brand).map(str::to_string),
            city: Some(self.city().to_string()),
            page: 0,
            page_size: PAGE_SIZE,
            telegram_id,
        }
    }
}

/// The search page's stored state: the form and the last outcome.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchState {
    pub form: SearchForm,
    /// `None` until a search has run for the current category.
    pub results: Option<Vec<Product>>,
    #[serde(default)]
    pub total_pages: u32,
}

impl SearchState {
    /// Fresh state for a category; switching category clears results.
    #[must_use]
    pub fn for_category(category: ProductCategory) -> Self {
        Self {
            form: SearchForm::new(category),
            results: None,
            total_pages: 0,
        }
    }

    /// Record a completed search.
    pub fn record(&mut self, results: SearchResults) {
        self.total_pages = results.total_pages;
        self.results = Some(results.products);
    }

    /// Record a failed search as "nothing found".
    pub fn record_failure(&mut self) {
        self.total_pages = 0;
        self.results = Some(Vec::new());
    }

    /// The stored search; absent or unreadable state is a fresh tire search.
    pub async fn load(session: &Session) -> Self {
        session
            .get::<Self>(session_keys::SEARCH)
            .await
            .unwrap_or_else(|e| {
                tracing::warn!(error = %e, "Failed to read search state");
                None
            })
            .unwrap_or_default()
    }

    /// Persist the search.
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be written.
    pub async fn save(&self, session: &Session) -> Result<(), tower_sessions::session::Error> {
        session.insert(session_keys::SEARCH, self).await
    }

    /// A product from the last results.
    #[must_use]
    pub fn find(&self, code: &ProductCode) -> Option<&Product> {
        self.results
            .as_deref()
            .and_then(|products| products.iter().find(|p| &p.code == code))
    }
}

fn non_empty(value: &str) -> Option<&str> {
    let value = value.trim();
    (!value.is_empty()).then_some(value)
}

/// Leading whole number: `"205.5"` reads as `205`, `"205/55"` as `205`.
fn parse_whole(value: &str) -> Option<u32> {
    let value = non_empty(value)?;
    let end = value
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(value.len());
    value[..end].parse().ok()
}

/// Decimal number, accepting a comma as the separator.
fn parse_fraction(value: &str) -> Option<f64> {
    let value = non_empty(value)?.replace(',', ".");
    value
        .parse::<f64>()
        .ok()
        .filter(|f| f.is_finite() && *f >= 0.0 && *f <= f64::from(u32::MAX))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn form(width: &str, height: &str, diameter: &str) -> SearchForm {
        SearchForm {
            width: width.to_string(),
            height: height.to_string(),
            diameter: diameter.to_string(),
            ..SearchForm::default()
        }
    }

    #[test]
    fn test_tire_query_omits_empty_fields() {
        let query = form("205", "", "16").tire_query(None);

        assert_eq!(query.width, Some(205));
        assert_eq!(query.height, None);
        assert_eq!(query.diameter, Some(16));
        assert_eq!(query.season, None);
        assert_eq!(query.brand, None);
        assert_eq!(query.city.as_deref(), Some("Тюмень"));
        assert_eq!(query.page, 0);
        assert_eq!(query.page_size, 20);
    }

    #[test]
    fn test_unparseable_numbers_are_dropped() {
        let query = form("abc", "55.7", " ").tire_query(None);

        assert_eq!(query.width, None);
        assert_eq!(query.height, Some(55));
        assert_eq!(query.diameter, None);
    }

    #[test]
    fn test_whole_numbers_keep_leading_digits() {
        let query = form("205/55", "55%", "16\"").tire_query(None);

        assert_eq!(query.width, Some(205));
        assert_eq!(query.height, Some(55));
        assert_eq!(query.diameter, Some(16));
    }

    #[test]
    fn test_disk_width_is_fractional() {
        let mut disk = form("6,5", "", "15");
        disk.category = ProductCategory::Disks;
        let query = disk.disk_query(Some(TelegramId::from("42")));

        assert_eq!(query.width, Some(6.5));
        assert_eq!(query.diameter, Some(15));
        assert_eq!(query.telegram_id, Some(TelegramId::from("42")));
    }

    #[test]
    fn test_season_and_city_normalisation() {
        let mut search = SearchForm::default();
        search.season = "winter".to_string();
        search.city = "Атлантида".to_string();
        search.brand = "  Nokian ".to_string();

        let query = search.tire_query(None);
        assert_eq!(query.season.as_deref(), Some("winter"));
        assert_eq!(query.city.as_deref(), Some(DEFAULT_CITY));
        assert_eq!(query.brand.as_deref(), Some("Nokian"));

        search.season = "spring".to_string();
        assert_eq!(search.tire_query(None).season, None);
    }

    #[test]
    fn test_category_switch_clears_results() {
        let mut state = SearchState::default();
        state.record_failure();
        assert_eq!(state.results.as_deref().map(<[Product]>::len), Some(0));

        let switched = SearchState::for_category(ProductCategory::Disks);
        assert_eq!(switched.results, None);
        assert_eq!(switched.form.category, ProductCategory::Disks);
    }
}
