//! Wheelhouse Storefront library.
//!
//! A Telegram Mini-App for a tyre and wheel shop, rendered server side.
//! The crate is a thin presentation layer over the shop backend: it keeps
//! the cart, search form and car-selection wizard in the user's session and
//! forwards everything else (prices, stock, orders, users) to the backend.
//!
//! [`routes::app`] builds the full router; the binary only adds Sentry and
//! starts the listener.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod config;
pub mod error;
pub mod filters;
pub mod middleware;
pub mod models;
pub mod navigation;
pub mod routes;
pub mod search;
pub mod services;
pub mod state;
pub mod telegram;
