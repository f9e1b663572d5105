//! Car-selection wizard pages.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;
use wheelhouse_core::{ProductCategory, ProductCode};

use crate::filters;
use crate::middleware::OptionalUser;
use crate::navigation::Page;
use crate::routes::cart::add_product;
use crate::routes::views::{Layout, ProductCard, product_cards};
use crate::services::{StepContent, Wizard};
use crate::state::AppState;
use crate::telegram::{Notice, push_notice};

/// An option button.
#[derive(Debug, Deserialize)]
pub struct SelectForm {
    pub value: String,
}

/// Tyre/disk toggle on the results step.
#[derive(Debug, Deserialize)]
pub struct CategoryForm {
    pub category: String,
}

/// Add-to-cart button on a result card.
#[derive(Debug, Deserialize)]
pub struct AddForm {
    pub code: String,
}

/// Wizard page template.
#[derive(Template, WebTemplate)]
#[template(path = "car_selection.html")]
pub struct CarSelectionTemplate {
    pub layout: Layout,
    pub step: u8,
    pub prompt: &'static str,
    pub breadcrumb: Vec<String>,
    pub options: Vec<String>,
    pub goods: Option<Vec<ProductCard>>,
    pub empty_message: Option<&'static str>,
    pub is_tires: bool,
}

/// Display the current step.
#[instrument(skip(state, session, user))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    OptionalUser(user): OptionalUser,
) -> impl IntoResponse {
    let mut wizard = Wizard::load(&session).await;
    let step = wizard.step();
    let content = wizard.content(state.api()).await;
    let empty_message = content.is_empty().then(|| step.empty_message());

    let (options, goods) = match content {
        StepContent::Options(options) => (options, None),
        StepContent::Goods(results) => {
            wizard.remember(&results.products);
            if let Err(e) = wizard.save(&session).await {
                tracing::warn!(error = %e, "Failed to store wizard goods");
            }
            (Vec::new(), Some(product_cards(&results.products)))
        }
    };

    CarSelectionTemplate {
        layout: Layout::new(&state, &session, Page::CarSelection, user).await,
        step: step.number(),
        prompt: step.prompt(),
        breadcrumb: wizard.breadcrumb().into_iter().map(str::to_string).collect(),
        options,
        goods,
        empty_message,
        is_tires: wizard.category() == ProductCategory::Tires,
    }
}

/// Pick an option and advance one step.
#[instrument(skip(session))]
pub async fn select(session: Session, Form(form): Form<SelectForm>) -> Redirect {
    let mut wizard = Wizard::load(&session).await;
    if wizard.select(&form.value) {
        tracing::debug!(step = wizard.step().number(), "Wizard advanced");
        save(&session, &wizard).await;
    }
    Redirect::to(Page::CarSelection.path())
}

/// Go back: always to the first step.
#[instrument(skip(session))]
pub async fn reset(session: Session) -> Redirect {
    let mut wizard = Wizard::load(&session).await;
    wizard.reset();
    save(&session, &wizard).await;
    Redirect::to(Page::CarSelection.path())
}

/// Switch the results between tires and disks.
#[instrument(skip(session))]
pub async fn category(session: Session, Form(form): Form<CategoryForm>) -> Redirect {
    if let Some(category) = ProductCategory::parse(&form.category) {
        let mut wizard = Wizard::load(&session).await;
        wizard.set_category(category);
        save(&session, &wizard).await;
    }
    Redirect::to(Page::CarSelection.path())
}

/// Add a product from the results to the cart.
#[instrument(skip(state, session, user))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    OptionalUser(user): OptionalUser,
    Form(form): Form<AddForm>,
) -> Redirect {
    let wizard = Wizard::load(&session).await;
    let product = wizard.find(&ProductCode::from(form.code)).cloned();
    add_product(&state, &session, user.as_ref(), product).await;
    Redirect::to(Page::CarSelection.path())
}

async fn save(session: &Session, wizard: &Wizard) {
    if let Err(e) = wizard.save(session).await {
        tracing::error!(error = %e, "Failed to store wizard state");
        push_notice(session, Notice::error("Не удалось сохранить выбор")).await;
    }
}
