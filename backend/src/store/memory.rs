//! In-memory store used by tests and the `memory` storage backend

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use shared::{
    apply_delta, DateRange, NewMovement, NewProduct, NewUser, Product, ProductUpdate, Role,
    StockMovement, User,
};
use tokio::sync::Mutex;

use super::InventoryStore;
use crate::error::{AppError, AppResult};

type Clock = Box<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// Map-backed store. One lock guards users, catalog and ledger together, so
/// every operation is atomic and movements on a product are serialised.
pub struct MemoryStore {
    state: Mutex<State>,
    clock: Clock,
    fail_next_append: AtomicBool,
}

#[derive(Default)]
struct State {
    users: BTreeMap<i32, User>,
    products: BTreeMap<i32, Product>,
    movements: Vec<StockMovement>,
    next_user_id: i32,
    next_product_id: i32,
    next_movement_id: i32,
}

impl State {
    fn next_id(counter: &mut i32) -> i32 {
        *counter += 1;
        *counter
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::with_clock(Utc::now)
    }

    /// Store whose movement timestamps come from `clock`
    pub fn with_clock<F>(clock: F) -> Self
    where
        F: Fn() -> DateTime<Utc> + Send + Sync + 'static,
    {
        Self {
            state: Mutex::new(State::default()),
            clock: Box::new(clock),
            fail_next_append: AtomicBool::new(false),
        }
    }

    /// Make the next ledger append fail after the balance change has been
    /// staged, as a storage fault in the middle of the transaction would.
    pub fn fail_next_ledger_append(&self) {
        self.fail_next_append.store(true, Ordering::SeqCst);
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

fn newest_first(movements: &mut [StockMovement]) {
    movements.sort_by(|a, b| b.timestamp.cmp(&a.timestamp).then(b.id.cmp(&a.id)));
}

#[async_trait]
impl InventoryStore for MemoryStore {
    async fn ping(&self) -> AppResult<()> {
        Ok(())
    }

    async fn count_users(&self) -> AppResult<i64> {
        Ok(self.state.lock().await.users.len() as i64)
    }

    async fn find_user_by_id(&self, id: i32) -> AppResult<Option<User>> {
        Ok(self.state.lock().await.users.get(&id).cloned())
    }

    async fn find_user_by_username(&self, username: &str) -> AppResult<Option<User>> {
        let state = self.state.lock().await;
        Ok(state.users.values().find(|u| u.username == username).cloned())
    }

    async fn create_user(&self, user: NewUser) -> AppResult<User> {
        let mut state = self.state.lock().await;
        if state.users.values().any(|u| u.username == user.username) {
            return Err(AppError::DuplicateEntry("username".to_string()));
        }

        let role = Role::for_new_user(state.users.len() as i64);
        let id = State::next_id(&mut state.next_user_id);
        let user = User {
            id,
            username: user.username,
            password: user.password_hash,
            role,
        };
        state.users.insert(id, user.clone());
        Ok(user)
    }

    async fn list_products(&self) -> AppResult<Vec<Product>> {
        Ok(self.state.lock().await.products.values().cloned().collect())
    }

    async fn find_product(&self, id: i32) -> AppResult<Option<Product>> {
        Ok(self.state.lock().await.products.get(&id).cloned())
    }

    async fn create_product(&self, product: NewProduct) -> AppResult<Product> {
        let mut state = self.state.lock().await;
        if state.products.values().any(|p| p.sku == product.sku) {
            return Err(AppError::DuplicateEntry("sku".to_string()));
        }

        let id = State::next_id(&mut state.next_product_id);
        let product = Product {
            id,
            sku: product.sku,
            name: product.name,
            category: product.category,
            attributes: product.attributes,
            min_stock: product.min_stock,
            current_stock: product.current_stock,
        };
        state.products.insert(id, product.clone());
        Ok(product)
    }

    async fn update_product(&self, id: i32, update: ProductUpdate) -> AppResult<Option<Product>> {
        let mut state = self.state.lock().await;
        Ok(state.products.get_mut(&id).map(|product| {
            update.apply_to(product);
            product.clone()
        }))
    }

    async fn delete_product(&self, id: i32) -> AppResult<bool> {
        Ok(self.state.lock().await.products.remove(&id).is_some())
    }

    async fn apply_movement(&self, movement: NewMovement) -> AppResult<StockMovement> {
        let delta = movement.signed_delta();
        let mut state = self.state.lock().await;

        let product = state
            .products
            .get_mut(&movement.product_id)
            .ok_or(AppError::ProductNotFound(movement.product_id))?;
        let previous_stock = product.current_stock;
        let new_stock = apply_delta(previous_stock, delta)
            .ok_or_else(|| AppError::validation("quantity", "Resulting stock is out of range"))?;

        // Stage the balance change, then append; undo the stage if the append fails
        product.current_stock = new_stock;

        if self.fail_next_append.swap(false, Ordering::SeqCst) {
            if let Some(product) = state.products.get_mut(&movement.product_id) {
                product.current_stock = previous_stock;
            }
            return Err(AppError::StorageError(
                "ledger append failed; transaction rolled back".to_string(),
            ));
        }

        let id = State::next_id(&mut state.next_movement_id);
        let recorded = StockMovement {
            id,
            product_id: movement.product_id,
            movement_type: movement.movement_type,
            quantity: movement.quantity,
            reason: movement.reason,
            timestamp: (self.clock)(),
            user_id: movement.user_id,
        };
        state.movements.push(recorded.clone());
        Ok(recorded)
    }

    async fn list_movements(&self, product_id: Option<i32>) -> AppResult<Vec<StockMovement>> {
        let state = self.state.lock().await;
        let mut movements: Vec<StockMovement> = state
            .movements
            .iter()
            .filter(|m| product_id.map_or(true, |id| m.product_id == id))
            .cloned()
            .collect();
        newest_first(&mut movements);
        Ok(movements)
    }

    async fn list_movements_between(&self, range: DateRange) -> AppResult<Vec<StockMovement>> {
        let state = self.state.lock().await;
        let mut movements: Vec<StockMovement> = state
            .movements
            .iter()
            .filter(|m| range.contains(m.timestamp))
            .cloned()
            .collect();
        newest_first(&mut movements);
        Ok(movements)
    }
}
