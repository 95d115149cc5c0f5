//! Shared types and models for Stockroom
//!
//! This crate contains the domain model and the pure stock arithmetic shared
//! between the backend, the browser (via WASM), and tests.

pub mod export;
pub mod models;
pub mod types;
pub mod validation;

pub use export::*;
pub use models::*;
pub use types::*;
pub use validation::*;
