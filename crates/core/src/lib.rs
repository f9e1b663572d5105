//! Wheelhouse Core - Shared domain types.
//!
//! This crate provides the types used by the Wheelhouse Mini-App storefront:
//! - product identifiers and prices as handed out by the backend
//! - the tagged tire/disk product variant
//! - the cart container with its quantity invariants
//! - delivery address validation and the order payload built at checkout
//!
//! # Architecture
//!
//! The core crate contains only types and pure logic - no I/O, no HTTP
//! clients, no session access. Everything that talks to the backend lives in
//! `wheelhouse-storefront`.
//!
//! # Modules
//!
//! - [`types`] - Newtype ids, prices, statuses, products, cart, addresses

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
