//! Core types for Wheelhouse.
//!
//! This module provides type-safe wrappers for the storefront's domain concepts.

pub mod address;
pub mod cart;
pub mod id;
pub mod order;
pub mod price;
pub mod product;
pub mod status;

pub use address::{AddressError, AddressField, DeliveryAddress};
pub use cart::{Cart, CartLine};
pub use id::*;
pub use order::{DEFAULT_WAREHOUSE_ID, DEFAULT_WAREHOUSE_NAME, NewOrder, NewOrderLine};
pub use price::Price;
pub use product::{
    DiskSpec, Product, ProductCategory, ProductSpec, StockEntry, TireSpec, UNNAMED_WAREHOUSE,
};
pub use status::*;
