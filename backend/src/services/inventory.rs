//! Inventory service: the stock movement ledger and the balance updater

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use shared::{validate_quantity, DateRange, NewMovement, ProductMovement, StockMovement};
use tracing::instrument;

use crate::error::{AppError, AppResult};
use crate::services::dates::local_day_bounds;
use crate::store::InventoryStore;

/// Inventory service for recording and querying stock movements
#[derive(Clone)]
pub struct InventoryService {
    store: Arc<dyn InventoryStore>,
}

impl InventoryService {
    /// Create a new InventoryService instance
    pub fn new(store: Arc<dyn InventoryStore>) -> Self {
        Self { store }
    }

    /// Record a movement and adjust the product's balance in one atomic step.
    ///
    /// The balance may go negative; it is never clamped. A missing product
    /// fails with `ProductNotFound` and nothing is written.
    #[instrument(
        skip(self, movement),
        fields(
            product_id = movement.product_id,
            movement_type = %movement.movement_type,
            quantity = movement.quantity,
        )
    )]
    pub async fn record_movement(&self, movement: NewMovement) -> AppResult<StockMovement> {
        validate_quantity(movement.quantity).map_err(|msg| AppError::validation("quantity", msg))?;

        let delta = movement.signed_delta();
        let recorded = self.store.apply_movement(movement).await?;

        tracing::info!(
            movement_id = recorded.id,
            delta,
            user_id = recorded.user_id,
            "stock movement recorded"
        );

        Ok(recorded)
    }

    /// List movements, newest first, optionally for a single product
    pub async fn list_movements(&self, product_id: Option<i32>) -> AppResult<Vec<StockMovement>> {
        self.store.list_movements(product_id).await
    }

    /// Movements with `start <= timestamp <= end`, newest first
    pub async fn list_movements_in_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> AppResult<Vec<StockMovement>> {
        let range = DateRange::between(start, end);
        if range.is_inverted() {
            return Err(AppError::validation("startDate", "Start date must not be after end date"));
        }
        self.store.list_movements_between(range).await
    }

    /// Movements of one local calendar day with product details attached
    pub async fn daily_movements(&self, date: NaiveDate) -> AppResult<Vec<ProductMovement>> {
        let (start, end) = local_day_bounds(date)?;
        let movements = self.list_movements_in_range(start, end).await?;

        let products: HashMap<i32, _> = self
            .store
            .list_products()
            .await?
            .into_iter()
            .map(|p| (p.id, p))
            .collect();

        Ok(movements
            .into_iter()
            .map(|m| {
                let product = products.get(&m.product_id);
                m.with_product(product)
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use shared::{MovementType, NewProduct, ProductAttributes};

    async fn setup(current_stock: i32) -> (InventoryService, Arc<MemoryStore>, i32) {
        let store = Arc::new(MemoryStore::new());
        let product = store
            .create_product(NewProduct {
                sku: "BOX-S".to_string(),
                name: "Small box".to_string(),
                category: "Packaging".to_string(),
                attributes: ProductAttributes::default(),
                min_stock: 10,
                current_stock,
            })
            .await
            .unwrap();
        let service = InventoryService::new(store.clone());
        (service, store, product.id)
    }

    fn movement(product_id: i32, movement_type: MovementType, quantity: i32) -> NewMovement {
        NewMovement {
            product_id,
            movement_type,
            quantity,
            reason: String::new(),
            user_id: 1,
        }
    }

    #[tokio::test]
    async fn test_non_positive_quantity_rejected_before_storage() {
        let (service, store, id) = setup(5).await;
        for quantity in [0, -3] {
            let err = service
                .record_movement(movement(id, MovementType::In, quantity))
                .await
                .unwrap_err();
            assert!(matches!(err, AppError::Validation { ref field, .. } if field == "quantity"));
        }
        assert!(store.list_movements(None).await.unwrap().is_empty());
        assert_eq!(store.find_product(id).await.unwrap().unwrap().current_stock, 5);
    }

    #[tokio::test]
    async fn test_inverted_range_rejected() {
        let (service, _, _) = setup(0).await;
        let now = Utc::now();
        let err = service
            .list_movements_in_range(now, now - chrono::Duration::seconds(1))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation { .. }));
    }
}
