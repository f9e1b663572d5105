//! Car catalogue cascade and goods-by-car lookup.
//!
//! Brands, models, years and modifications are cached for 5 minutes; the
//! goods lookup is priced by the backend and always fetched.

use serde::Deserialize;
use tracing::{debug, instrument};
use wheelhouse_core::ProductCategory;

use super::cache::CatalogueKey;
use super::products::SearchResults;
use super::types::{Envelope, SearchEnvelope, VehicleQuery};
use super::{ApiClient, ApiError, NO_QUERY, ensure_success};

/// A catalogue option as the supplier sends it: plain text, a number
/// (years) or an object with a `name`.
#[derive(Deserialize)]
#[serde(untagged)]
enum CatalogueEntry {
    Text(String),
    Int(i64),
    Float(f64),
    Named { name: String },
}

impl CatalogueEntry {
    fn into_option(self) -> Option<String> {
        let text = match self {
            Self::Text(s) | Self::Named { name: s } => s.trim().to_string(),
            Self::Int(n) => n.to_string(),
            Self::Float(f) => f.to_string(),
        };
        (!text.is_empty()).then_some(text)
    }
}

impl CatalogueKey {
    fn path(&self) -> &'static str {
        match self {
            Self::Brands => "/cars/brands",
            Self::Models { .. } => "/cars/models",
            Self::Years { .. } => "/cars/years",
            Self::Modifications { .. } => "/cars/modifications",
        }
    }

    /// Query parameters; the chosen year is sent as both ends of the range.
    fn query(&self) -> Vec<(&'static str, &str)> {
        match self {
            Self::Brands => Vec::new(),
            Self::Models { brand } => vec![("brand", brand.as_str())],
            Self::Years { brand, model } => {
                vec![("brand", brand.as_str()), ("model", model.as_str())]
            }
            Self::Modifications { brand, model, year } => vec![
                ("brand", brand.as_str()),
                ("model", model.as_str()),
                ("year_begin", year.as_str()),
                ("year_end", year.as_str()),
            ],
        }
    }
}

impl ApiClient {
    /// Car brands.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the backend rejects it.
    pub async fn car_brands(&self) -> Result<Vec<String>, ApiError> {
        self.catalogue(CatalogueKey::Brands).await
    }

    /// Models of a brand.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the backend rejects it.
    pub async fn car_models(&self, brand: &str) -> Result<Vec<String>, ApiError> {
        self.catalogue(CatalogueKey::Models {
            brand: brand.to_string(),
        })
        .await
    }

    /// Production years of a model.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the backend rejects it.
    pub async fn car_years(&self, brand: &str, model: &str) -> Result<Vec<String>, ApiError> {
        self.catalogue(CatalogueKey::Years {
            brand: brand.to_string(),
            model: model.to_string(),
        })
        .await
    }

    /// Modifications of a model in a given year.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the backend rejects it.
    pub async fn car_modifications(
        &self,
        brand: &str,
        model: &str,
        year: &str,
    ) -> Result<Vec<String>, ApiError> {
        self.catalogue(CatalogueKey::Modifications {
            brand: brand.to_string(),
            model: model.to_string(),
            year: year.to_string(),
        })
        .await
    }

    /// Tires or disks fitting a fully specified vehicle.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the backend rejects it.
    #[instrument(skip(self), fields(brand = %vehicle.brand, model = %vehicle.model))]
    pub async fn goods_by_car(&self, vehicle: &VehicleQuery) -> Result<SearchResults, ApiError> {
        let category =
            ProductCategory::parse(&vehicle.product_type).unwrap_or(ProductCategory::Tires);
        let envelope: SearchEnvelope = self.get("/cars/goods", vehicle).await?;
        SearchResults::from_envelope(envelope, category, "Goods lookup")
    }

    #[instrument(skip(self))]
    async fn catalogue(&self, key: CatalogueKey) -> Result<Vec<String>, ApiError> {
        if let Some(options) = self.inner.catalogue.get(&key).await {
            debug!("Cache hit for catalogue");
            return Ok(options);
        }

        let query = key.query();
        let envelope: Envelope<Vec<CatalogueEntry>> = if query.is_empty() {
            self.get(key.path(), NO_QUERY).await?
        } else {
            self.get(key.path(), &query).await?
        };
        ensure_success(envelope.success, "Catalogue lookup")?;

        let options: Vec<String> = envelope
            .data
            .into_iter()
            .filter_map(CatalogueEntry::into_option)
            .collect();

        // Empty lists are not cached
        if !options.is_empty() {
            self.inner.catalogue.insert(key, options.clone()).await;
        }

        Ok(options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::test_support::client_for;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_brands_are_cached() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/cars/brands"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "data": ["Toyota", "Lada", ""]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server.uri());
        let first = client.car_brands().await.expect("brands");
        let second = client.car_brands().await.expect("cached brands");

        assert_eq!(first, vec!["Toyota".to_string(), "Lada".to_string()]);
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_modifications_send_year_range() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/cars/modifications"))
            .and(query_param("brand", "Toyota"))
            .and(query_param("model", "Camry"))
            .and(query_param("year_begin", "2018"))
            .and(query_param("year_end", "2018"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "data": ["2.5 AT", { "name": "3.5 AT" }]
            })))
            .mount(&server)
            .await;

        let client = client_for(&server.uri());
        let mods = client
            .car_modifications("Toyota", "Camry", "2018")
            .await
            .expect("modifications");

        assert_eq!(mods, vec!["2.5 AT".to_string(), "3.5 AT".to_string()]);
    }

    #[tokio::test]
    async fn test_years_accept_numbers() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/cars/years"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "success": true, "data": [2019, 2020] })),
            )
            .mount(&server)
            .await;

        let client = client_for(&server.uri());
        let years = client.car_years("Lada", "Vesta").await.expect("years");

        assert_eq!(years, vec!["2019".to_string(), "2020".to_string()]);
    }

    #[tokio::test]
    async fn test_goods_by_car_uses_product_type() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/cars/goods"))
            .and(query_param("modification", "2.5 AT"))
            .and(query_param("product_type", "disk"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "data": [{ "code": "D1", "brand": "Replay", "model": "TY145", "pcd": "5x114.3", "price": 9000 }]
            })))
            .mount(&server)
            .await;

        let client = client_for(&server.uri());
        let results = client
            .goods_by_car(&VehicleQuery {
                brand: "Toyota".to_string(),
                model: "Camry".to_string(),
                year_begin: "2018".to_string(),
                year_end: "2018".to_string(),
                modification: "2.5 AT".to_string(),
                product_type: "disk".to_string(),
            })
            .await
            .expect("goods");

        assert_eq!(results.products.len(), 1);
        assert_eq!(results.products[0].category(), ProductCategory::Disks);
    }
}
