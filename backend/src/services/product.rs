//! Product catalog service

use std::sync::Arc;

use shared::{NewProduct, Product, ProductUpdate};
use tracing::instrument;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::store::InventoryStore;

/// Product service for catalog maintenance and stock alerts
#[derive(Clone)]
pub struct ProductService {
    store: Arc<dyn InventoryStore>,
}

impl ProductService {
    pub fn new(store: Arc<dyn InventoryStore>) -> Self {
        Self { store }
    }

    /// All products ordered by id
    pub async fn list_products(&self) -> AppResult<Vec<Product>> {
        self.store.list_products().await
    }

    pub async fn get_product(&self, id: i32) -> AppResult<Product> {
        self.store
            .find_product(id)
            .await?
            .ok_or(AppError::ProductNotFound(id))
    }

    /// Create a product with its opening balance
    #[instrument(skip(self, input), fields(sku = %input.sku))]
    pub async fn create_product(&self, input: NewProduct) -> AppResult<Product> {
        input.validate()?;

        let product = self.store.create_product(input).await?;
        tracing::info!(
            product_id = product.id,
            opening_stock = product.current_stock,
            "product created"
        );
        Ok(product)
    }

    /// Update descriptive fields. The sku is immutable and the balance only
    /// moves through the ledger, so patches touching either are refused.
    #[instrument(skip(self, update))]
    pub async fn update_product(&self, id: i32, update: ProductUpdate) -> AppResult<Product> {
        if update.sku.is_some() {
            return Err(AppError::validation("sku", "SKU cannot be changed"));
        }
        if update.current_stock.is_some() {
            return Err(AppError::validation(
                "currentStock",
                "Current stock can only change through stock movements",
            ));
        }
        update.validate()?;
        if update.is_empty() {
            return self.get_product(id).await;
        }

        self.store
            .update_product(id, update)
            .await?
            .ok_or(AppError::ProductNotFound(id))
    }

    /// Remove a product. Its movements stay in the ledger; deleting an
    /// unknown id is not an error.
    #[instrument(skip(self))]
    pub async fn delete_product(&self, id: i32) -> AppResult<()> {
        if self.store.delete_product(id).await? {
            tracing::info!(product_id = id, "product deleted; movements retained");
        }
        Ok(())
    }

    /// Products strictly below their reorder threshold
    pub async fn low_stock(&self) -> AppResult<Vec<Product>> {
        let products = self.store.list_products().await?;
        Ok(products.into_iter().filter(Product::is_low_stock).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use shared::ProductAttributes;

    fn new_product(sku: &str, min_stock: i32, current_stock: i32) -> NewProduct {
        NewProduct {
            sku: sku.to_string(),
            name: "Sneaker".to_string(),
            category: "Footwear".to_string(),
            attributes: ProductAttributes {
                size: Some("42".to_string()),
                color: Some("white".to_string()),
                style: None,
            },
            min_stock,
            current_stock,
        }
    }

    fn service() -> ProductService {
        ProductService::new(Arc::new(MemoryStore::new()))
    }

    #[tokio::test]
    async fn test_update_rejects_balance_changes() {
        let service = service();
        let product = service.create_product(new_product("SN-42", 5, 8)).await.unwrap();

        let err = service
            .update_product(
                product.id,
                ProductUpdate {
                    current_stock: Some(100),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation { ref field, .. } if field == "currentStock"));

        let err = service
            .update_product(
                product.id,
                ProductUpdate {
                    sku: Some("OTHER".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation { ref field, .. } if field == "sku"));

        assert_eq!(service.get_product(product.id).await.unwrap(), product);
    }

    #[tokio::test]
    async fn test_update_missing_product() {
        let err = service()
            .update_product(
                77,
                ProductUpdate {
                    name: Some("X".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ProductNotFound(77)));
    }

    #[tokio::test]
    async fn test_low_stock() {
        let service = service();
        service.create_product(new_product("A", 10, 9)).await.unwrap();
        service.create_product(new_product("B", 10, 10)).await.unwrap();
        service.create_product(new_product("C", 0, -1)).await.unwrap();

        let skus: Vec<String> = service
            .low_stock()
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.sku)
            .collect();
        assert_eq!(skus, vec!["A", "C"]);
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let service = service();
        let product = service.create_product(new_product("A", 1, 1)).await.unwrap();
        service.delete_product(product.id).await.unwrap();
        service.delete_product(product.id).await.unwrap();
        assert!(matches!(
            service.get_product(product.id).await,
            Err(AppError::ProductNotFound(_))
        ));
    }
}
