//! Per-request state services backed by the session.

pub mod cart;
pub mod wizard;

pub use cart::{CartStore, CartStoreError};
pub use wizard::{StepContent, Wizard, WizardStep};
