//! Cache keys for the car catalogue cascade.

/// One level of the brand → model → year → modification cascade.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub enum CatalogueKey {
    Brands,
    Models {
        brand: String,
    },
    Years {
        brand: String,
        model: String,
    },
    Modifications {
        brand: String,
        model: String,
        year: String,
    },
}
