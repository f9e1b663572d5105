//! Tire and disk search.
//!
//! The form posts here, the outcome is stored in the session and the page
//! redirects back to `GET /search`. Switching category with
//! `?category=disks` starts a fresh form and clears the results.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    response::{IntoResponse, Redirect},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;
use wheelhouse_core::{ProductCategory, ProductCode, Season};

use crate::error::add_breadcrumb;
use crate::filters;
use crate::middleware::OptionalUser;
use crate::navigation::Page;
use crate::routes::cart::add_product;
use crate::routes::views::{Layout, ProductCard, product_cards};
use crate::search::{CITIES, SearchForm, SearchState};
use crate::state::AppState;
use crate::telegram::{Notice, push_notice};

/// `?category=tires|disks`.
#[derive(Debug, Deserialize)]
pub struct CategoryQuery {
    pub category: Option<String>,
}

/// Add-to-cart button on a result card.
#[derive(Debug, Deserialize)]
pub struct AddForm {
    pub code: String,
}

/// A `<select>` option.
#[derive(Clone)]
pub struct SelectOption {
    pub value: &'static str,
    pub label: &'static str,
    pub selected: bool,
}

/// Search page template.
#[derive(Template, WebTemplate)]
#[template(path = "search.html")]
pub struct SearchTemplate {
    pub layout: Layout,
    pub form: SearchForm,
    pub is_tires: bool,
    pub seasons: Vec<SelectOption>,
    pub cities: Vec<SelectOption>,
    /// `None` until a search has run.
    pub results: Option<Vec<ProductCard>>,
    pub total_pages: u32,
}

/// Display the search form and the last results.
#[instrument(skip(state, session, user))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    OptionalUser(user): OptionalUser,
    Query(query): Query<CategoryQuery>,
) -> impl IntoResponse {
    let mut search = SearchState::load(&session).await;

    if let Some(category) = query.category.as_deref().and_then(ProductCategory::parse)
        && category != search.form.category
    {
        search = SearchState::for_category(category);
        if let Err(e) = search.save(&session).await {
            tracing::warn!(error = %e, "Failed to store search state");
        }
    }

    let season = search.form.season();
    let seasons = Season::ALL
        .into_iter()
        .map(|s| SelectOption {
            value: s.as_str(),
            label: s.label(),
            selected: season == Some(s),
        })
        .collect();
    let city = search.form.city().to_string();
    let cities = CITIES
        .into_iter()
        .map(|c| SelectOption {
            value: c,
            label: c,
            selected: c == city,
        })
        .collect();

    SearchTemplate {
        layout: Layout::new(&state, &session, Page::Search, user).await,
        is_tires: search.form.category == ProductCategory::Tires,
        seasons,
        cities,
        results: search.results.as_deref().map(product_cards),
        total_pages: search.total_pages,
        form: search.form,
    }
}

/// Run a search.
///
/// A backend failure is shown as "nothing found" and logged.
#[instrument(skip(state, session, user, form), fields(category = %form.category))]
pub async fn run(
    State(state): State<AppState>,
    session: Session,
    OptionalUser(user): OptionalUser,
    Form(form): Form<SearchForm>,
) -> Redirect {
    let telegram_id = user.as_ref().map(|u| u.telegram_id.clone());
    let mut search = SearchState::load(&session).await;
    search.form = form;

    let outcome = match search.form.category {
        ProductCategory::Tires => {
            state
                .api()
                .search_tires(&search.form.tire_query(telegram_id))
                .await
        }
        ProductCategory::Disks => {
            state
                .api()
                .search_disks(&search.form.disk_query(telegram_id))
                .await
        }
    };

    match outcome {
        Ok(results) => {
            tracing::info!(found = results.products.len(), "Search completed");
            add_breadcrumb("search", "Search", Some(&[("category", search.form.category.slug())]));
            search.record(results);
        }
        Err(e) => {
            tracing::error!(error = %e, "Search failed");
            search.record_failure();
        }
    }

    if let Err(e) = search.save(&session).await {
        tracing::error!(error = %e, "Failed to store search results");
        push_notice(&session, Notice::error("Не удалось сохранить результаты поиска")).await;
    }
    Redirect::to(Page::Search.path())
}

/// Add a product from the last results to the cart.
#[instrument(skip(state, session, user))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    OptionalUser(user): OptionalUser,
    Form(form): Form<AddForm>,
) -> Redirect {
    let search = SearchState::load(&session).await;
    let product = search.find(&ProductCode::from(form.code)).cloned();
    add_product(&state, &session, user.as_ref(), product).await;
    Redirect::to(Page::Search.path())
}
