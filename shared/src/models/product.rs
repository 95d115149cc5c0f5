//! Product catalog models

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::validation::validate_sku_format;

/// Default reorder threshold when none is supplied
pub const DEFAULT_MIN_STOCK: i32 = 10;

/// A catalog entry with its materialized stock balance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: i32,
    pub sku: String,
    pub name: String,
    pub category: String,
    pub attributes: ProductAttributes,
    pub min_stock: i32,
    /// Stock at creation plus the signed sum of every recorded movement
    pub current_stock: i32,
}

impl Product {
    /// Strictly below the reorder threshold
    pub fn is_low_stock(&self) -> bool {
        self.current_stock < self.min_stock
    }
}

/// Free-form variant descriptors
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductAttributes {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,
}

/// Input for creating a product
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewProduct {
    #[validate(custom = "validate_sku_format")]
    pub sku: String,
    #[validate(length(min = 1, max = 255, message = "Name is required"))]
    pub name: String,
    #[validate(length(min = 1, max = 100, message = "Category is required"))]
    pub category: String,
    #[serde(default)]
    pub attributes: ProductAttributes,
    #[serde(default = "default_min_stock")]
    #[validate(range(min = 0, message = "Minimum stock cannot be negative"))]
    pub min_stock: i32,
    /// Opening balance; every later change goes through the movement ledger
    #[serde(default)]
    pub current_stock: i32,
}

fn default_min_stock() -> i32 {
    DEFAULT_MIN_STOCK
}

/// Partial update of a product's descriptive fields.
///
/// `sku` and `current_stock` are accepted only so they can be rejected with a
/// field-level error: the sku is immutable and the balance is owned by the
/// movement ledger.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ProductUpdate {
    #[validate(length(min = 1, max = 255, message = "Name cannot be empty"))]
    pub name: Option<String>,
    #[validate(length(min = 1, max = 100, message = "Category cannot be empty"))]
    pub category: Option<String>,
    pub attributes: Option<ProductAttributes>,
    #[validate(range(min = 0, message = "Minimum stock cannot be negative"))]
    pub min_stock: Option<i32>,
    pub sku: Option<String>,
    pub current_stock: Option<i32>,
}

impl ProductUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.category.is_none()
            && self.attributes.is_none()
            && self.min_stock.is_none()
    }

    /// Apply the descriptive fields onto an existing product
    pub fn apply_to(&self, product: &mut Product) {
        if let Some(name) = &self.name {
            product.name = name.clone();
        }
        if let Some(category) = &self.category {
            product.category = category.clone();
        }
        if let Some(attributes) = &self.attributes {
            product.attributes = attributes.clone();
        }
        if let Some(min_stock) = self.min_stock {
            product.min_stock = min_stock;
        }
    }
}
