//! Business logic services for Stockroom

pub mod auth;
pub mod dates;
pub mod inventory;
pub mod product;
pub mod reporting;

pub use auth::{AuthResponse, AuthService, Claims};
pub use inventory::InventoryService;
pub use product::ProductService;
pub use reporting::ReportingService;
