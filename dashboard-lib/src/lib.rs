//! Merchant dashboard client library
//!
//! Record model, REST gateway and the headless CRUD table used by the
//! dashboard's products, transactions, taxes and reports views.

pub mod api;
pub mod auth;
pub mod error;
pub mod model;
pub mod table;

mod client;

pub use client::*;
