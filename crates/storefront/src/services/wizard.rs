//! Car-selection wizard.
//!
//! Five linear steps: brand, model, year, modification, results. The current
//! step is derived from how many selections have been made, so the state can
//! never claim a step whose prerequisites are missing. Selecting advances by
//! one; going back always resets to the first step.

use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use wheelhouse_core::{Product, ProductCategory, ProductCode};

use crate::api::{ApiClient, SearchResults, VehicleQuery};
use crate::models::session_keys;

/// A wizard step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum WizardStep {
    Brand,
    Model,
    Year,
    Modification,
    Results,
}

impl WizardStep {
    /// 1-based position, as shown in the progress indicator.
    #[must_use]
    pub const fn number(&self) -> u8 {
        match self {
            Self::Brand => 1,
            Self::Model => 2,
            Self::Year => 3,
            Self::Modification => 4,
            Self::Results => 5,
        }
    }

    /// Prompt shown above the option list.
    #[must_use]
    pub const fn prompt(&self) -> &'static str {
        match self {
            Self::Brand => "Выберите марку",
            Self::Model => "Выберите модель",
            Self::Year => "Выберите год выпуска",
            Self::Modification => "Выберите модификацию",
            Self::Results => "Подходящие товары",
        }
    }

    /// Message shown when the backend returns no options.
    #[must_use]
    pub const fn empty_message(&self) -> &'static str {
        match self {
            Self::Brand => "Марки не найдены",
            Self::Model => "Модели не найдены",
            Self::Year => "Годы выпуска не найдены",
            Self::Modification => "Модификации не найдены",
            Self::Results => "Подходящие товары не найдены",
        }
    }
}

/// Selections made so far.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Wizard {
    brand: Option<String>,
    model: Option<String>,
    year: Option<String>,
    modification: Option<String>,
    #[serde(default)]
    category: ProductCategory,
    /// Goods last shown on the results step, for add-to-cart.
    #[serde(default)]
    goods: Vec<Product>,
}

impl Wizard {
    /// Current step, derived from the selections.
    #[must_use]
    pub const fn step(&self) -> WizardStep {
        match (&self.brand, &self.model, &self.year, &self.modification) {
            (None, ..) => WizardStep::Brand,
            (Some(_), None, ..) => WizardStep::Model,
            (Some(_), Some(_), None, _) => WizardStep::Year,
            (Some(_), Some(_), Some(_), None) => WizardStep::Modification,
            (Some(_), Some(_), Some(_), Some(_)) => WizardStep::Results,
        }
    }

    /// Record the option picked on the current step and advance.
    ///
    /// Blank values and selections on the results step are ignored. Returns
    /// whether the wizard advanced.
    pub fn select(&mut self, value: &str) -> bool {
        let value = value.trim();
        if value.is_empty() {
            return false;
        }
        let slot = match self.step() {
            WizardStep::Brand => &mut self.brand,
            WizardStep::Model => &mut self.model,
            WizardStep::Year => &mut self.year,
            WizardStep::Modification => &mut self.modification,
            WizardStep::Results => return false,
        };
        *slot = Some(value.to_string());
        true
    }

    /// Back to step 1 with nothing selected.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Product type shown on the results step.
    #[must_use]
    pub const fn category(&self) -> ProductCategory {
        self.category
    }

    /// Switch the results between tires and disks.
    pub fn set_category(&mut self, category: ProductCategory) {
        if self.category != category {
            self.category = category;
            self.goods.clear();
        }
    }

    /// Keep the goods just shown so they can be added to the cart.
    pub fn remember(&mut self, goods: &[Product]) {
        goods.clone_into(&mut self.goods);
    }

    /// A product from the goods last shown.
    #[must_use]
    pub fn find(&self, code: &ProductCode) -> Option<&Product> {
        self.goods.iter().find(|p| &p.code == code)
    }

    /// Selections in order, for the breadcrumb.
    #[must_use]
    pub fn breadcrumb(&self) -> Vec<&str> {
        [&self.brand, &self.model, &self.year, &self.modification]
            .into_iter()
            .map_while(Option::as_deref)
            .collect()
    }

    /// The goods filter, once every selection is made.
    #[must_use]
    pub fn vehicle_query(&self) -> Option<VehicleQuery> {
        let (Some(brand), Some(model), Some(year), Some(modification)) =
            (&self.brand, &self.model, &self.year, &self.modification)
        else {
            return None;
        };
        Some(VehicleQuery {
            brand: brand.clone(),
            model: model.clone(),
            year_begin: year.clone(),
            year_end: year.clone(),
            modification: modification.clone(),
            product_type: self.category.product_type().to_string(),
        })
    }

    /// The stored wizard; absent or unreadable state starts over.
    pub async fn load(session: &Session) -> Self {
        session
            .get::<Self>(session_keys::WIZARD)
            .await
            .unwrap_or_else(|e| {
                tracing::warn!(error = %e, "Failed to read wizard state");
                None
            })
            .unwrap_or_default()
    }

    /// Persist the wizard.
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be written.
    pub async fn save(&self, session: &Session) -> Result<(), tower_sessions::session::Error> {
        session.insert(session_keys::WIZARD, self).await
    }

    /// Fetch what the current step shows.
    ///
    /// Backend failures are logged and shown as an empty list.
    pub async fn content(&self, api: &ApiClient) -> StepContent {
        let result = match (
            self.step(),
            self.brand.as_deref(),
            self.model.as_deref(),
            self.year.as_deref(),
        ) {
            (WizardStep::Brand, ..) => api.car_brands().await.map(StepContent::Options),
            (WizardStep::Model, Some(brand), ..) => {
                api.car_models(brand).await.map(StepContent::Options)
            }
            (WizardStep::Year, Some(brand), Some(model), _) => {
                api.car_years(brand, model).await.map(StepContent::Options)
            }
            (WizardStep::Modification, Some(brand), Some(model), Some(year)) => api
                .car_modifications(brand, model, year)
                .await
                .map(StepContent::Options),
            (WizardStep::Results, ..) => match self.vehicle_query() {
                Some(query) => api.goods_by_car(&query).await.map(StepContent::Goods),
                None => Ok(StepContent::Options(Vec::new())),
            },
            _ => Ok(StepContent::Options(Vec::new())),
        };

        result.unwrap_or_else(|e| {
            tracing::error!(error = %e, step = self.step().number(), "Car catalogue request failed");
            match self.step() {
                WizardStep::Results => StepContent::Goods(SearchResults::default()),
                _ => StepContent::Options(Vec::new()),
            }
        })
    }
}

/// What a wizard step displays.
#[derive(Debug)]
pub enum StepContent {
    /// Choices for steps 1 to 4.
    Options(Vec<String>),
    /// Matching products on step 5.
    Goods(SearchResults),
}

impl StepContent {
    /// Nothing to show: a dead end, not an error.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Options(options) => options.is_empty(),
            Self::Goods(results) => results.is_empty(),
        }
    }
}
