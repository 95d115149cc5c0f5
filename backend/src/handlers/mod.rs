//! HTTP request handlers

pub mod auth;
pub mod health;
pub mod inventory;
pub mod product;
pub mod reporting;

pub use auth::{current_user, login, register};
pub use health::health_check;
pub use inventory::{daily_movements, list_movements, record_movement};
pub use product::{
    create_product, delete_product, get_product, list_low_stock, list_products, update_product,
};
pub use reporting::{
    get_category_breakdown, get_dashboard, get_inventory_report, get_summary_report,
};
