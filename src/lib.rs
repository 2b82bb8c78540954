//! Core library of the product catalog admin client.
//!
//! `domain` and `forms` are always available. The `client` feature adds the
//! backend clients, configuration, and the services driving the add product
//! workflow.

pub mod domain;
#[cfg(feature = "client")]
pub mod error_conversions;
pub mod forms;
#[cfg(feature = "client")]
pub mod models;
#[cfg(feature = "client")]
pub mod repository;
#[cfg(feature = "client")]
pub mod routes;
#[cfg(feature = "client")]
pub mod services;
