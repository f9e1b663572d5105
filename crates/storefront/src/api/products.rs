//! Product search endpoints.

use tracing::instrument;
use wheelhouse_core::{Product, ProductCategory};

use super::conversions::product_from_raw;
use super::types::{DiskQuery, Envelope, SearchEnvelope, TireQuery, Warehouse};
use super::{ApiClient, ApiError, NO_QUERY, ensure_success};

/// One page of search results converted to domain products.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchResults {
    pub products: Vec<Product>,
    pub total_pages: u32,
    /// Markup the backend applied to the prices, when reported.
    pub markup_percentage: Option<f64>,
}

impl SearchResults {
    pub(crate) fn from_envelope(
        envelope: SearchEnvelope,
        category: ProductCategory,
        what: &str,
    ) -> Result<Self, ApiError> {
        ensure_success(envelope.success, what)?;
        let received = envelope.data.len();
        let products: Vec<Product> = envelope
            .data
            .into_iter()
            .filter_map(|raw| product_from_raw(raw, category))
            .collect();
        if products.len() < received {
            tracing::debug!(skipped = received - products.len(), "Dropped rows without a price");
        }
        Ok(Self {
            products,
            total_pages: envelope.total_pages,
            markup_percentage: envelope.markup_percentage,
        })
    }

    /// No products on this page.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}

impl ApiClient {
    /// Search tires by size, season and brand.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the backend rejects it.
    #[instrument(skip(self))]
    pub async fn search_tires(&self, query: &TireQuery) -> Result<SearchResults, ApiError> {
        let envelope: SearchEnvelope = self.get("/products/tires/search", query).await?;
        let results = SearchResults::from_envelope(envelope, ProductCategory::Tires, "Tire search")?;
        tracing::debug!(count = results.products.len(), "Tire search completed");
        Ok(results)
    }

    /// Search disks by diameter, width and brand.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the backend rejects it.
    #[instrument(skip(self))]
    pub async fn search_disks(&self, query: &DiskQuery) -> Result<SearchResults, ApiError> {
        let envelope: SearchEnvelope = self.get("/products/disks/search", query).await?;
        let results = SearchResults::from_envelope(envelope, ProductCategory::Disks, "Disk search")?;
        tracing::debug!(count = results.products.len(), "Disk search completed");
        Ok(results)
    }

    /// Supplier warehouses.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the backend rejects it.
    #[instrument(skip(self))]
    pub async fn warehouses(&self) -> Result<Vec<Warehouse>, ApiError> {
        let envelope: Envelope<Vec<Warehouse>> = self.get("/products/warehouses", NO_QUERY).await?;
        ensure_success(envelope.success, "Warehouse list")?;
        Ok(envelope.data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::test_support::client_for;
    use serde_json::json;
    use wheelhouse_core::{Price, TelegramId};
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_search_tires_sends_filters() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/products/tires/search"))
            .and(query_param("width", "205"))
            .and(query_param("season", "winter"))
            .and(query_param("page", "0"))
            .and(query_param("page_size", "20"))
            .and(query_param("telegram_id", "42"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "data": [
                    { "code": "T1", "brand": "Nokian", "model": "Nordman 8", "price": 5750, "width": 205, "height": 55, "diameter": 16 }
                ],
                "total_pages": 3,
                "markup_percentage": 15.0
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server.uri());
        let results = client
            .search_tires(&TireQuery {
                width: Some(205),
                season: Some("winter".to_string()),
                page: 0,
                page_size: 20,
                telegram_id: Some(TelegramId::from("42")),
                ..TireQuery::default()
            })
            .await
            .expect("search succeeds");

        assert_eq!(results.total_pages, 3);
        assert_eq!(results.markup_percentage, Some(15.0));
        let product = results.products.first().expect("one product");
        assert_eq!(product.category(), ProductCategory::Tires);
        assert_eq!(product.price, Price::from_roubles(5750));
    }

    #[tokio::test]
    async fn test_search_disks_rejected_envelope() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/products/disks/search"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "success": false, "data": [] })),
            )
            .mount(&server)
            .await;

        let client = client_for(&server.uri());
        let result = client
            .search_disks(&DiskQuery {
                diameter: Some(17),
                page_size: 20,
                ..DiskQuery::default()
            })
            .await;

        assert!(matches!(result, Err(ApiError::Rejected(_))));
    }

    #[tokio::test]
    async fn test_warehouses() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/products/warehouses"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "data": [{ "wrh": 42, "name": "Тюмень", "city": "Тюмень" }]
            })))
            .mount(&server)
            .await;

        let client = client_for(&server.uri());
        let warehouses = client.warehouses().await.expect("warehouses");

        assert_eq!(warehouses.len(), 1);
        assert_eq!(warehouses[0].id.as_deref(), Some("42"));
    }
}
