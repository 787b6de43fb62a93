//! Carina Core
//!
//! Core library for an infrastructure management tool: the provider
//! lifecycle contract, typed resource records, attribute schemas, change
//! detection and the state waiter shared by providers.

pub mod differ;
pub mod provider;
pub mod resource;
pub mod schema;
pub mod waiter;
