//! Persistence boundary for the catalog, the movement ledger and users
//!
//! Services only ever see `dyn InventoryStore`; the server picks the
//! PostgreSQL implementation, tests use the in-memory one.

use async_trait::async_trait;
use shared::{DateRange, NewMovement, NewProduct, NewUser, Product, ProductUpdate, StockMovement, User};

use crate::error::AppResult;

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Storage capability used by every service
#[async_trait]
pub trait InventoryStore: Send + Sync {
    /// Cheap connectivity check for the health endpoint
    async fn ping(&self) -> AppResult<()>;

    // Users

    async fn count_users(&self) -> AppResult<i64>;

    async fn find_user_by_id(&self, id: i32) -> AppResult<Option<User>>;

    async fn find_user_by_username(&self, username: &str) -> AppResult<Option<User>>;

    /// Insert a user, deciding the role in the same atomic unit: admin when no
    /// user exists yet, staff otherwise.
    async fn create_user(&self, user: NewUser) -> AppResult<User>;

    // Product catalog

    /// All products ordered by id
    async fn list_products(&self) -> AppResult<Vec<Product>>;

    async fn find_product(&self, id: i32) -> AppResult<Option<Product>>;

    async fn create_product(&self, product: NewProduct) -> AppResult<Product>;

    /// Update descriptive fields; `None` when the product does not exist
    async fn update_product(&self, id: i32, update: ProductUpdate) -> AppResult<Option<Product>>;

    /// Remove a product, leaving its movements in the ledger. Returns whether
    /// a product was removed.
    async fn delete_product(&self, id: i32) -> AppResult<bool>;

    // Movement ledger

    /// Adjust the product's balance by the movement's signed delta and append
    /// the movement as one all-or-nothing unit. Concurrent calls for the same product are
    /// serialised. Fails with `ProductNotFound` without writing anything when
    /// the product is missing.
    async fn apply_movement(&self, movement: NewMovement) -> AppResult<StockMovement>;

    /// Movements, newest first, optionally for one product
    async fn list_movements(&self, product_id: Option<i32>) -> AppResult<Vec<StockMovement>>;

    /// Movements whose timestamp lies in `range` (inclusive), newest first
    async fn list_movements_between(&self, range: DateRange) -> AppResult<Vec<StockMovement>>;
}
