//! Stock movement ledger models

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use validator::Validate;

use super::Product;

/// Kind of stock-affecting event. Quantities are always magnitudes; the sign
/// comes from the type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MovementType {
    In,
    Out,
    Return,
}

impl MovementType {
    pub const ALL: [MovementType; 3] = [MovementType::In, MovementType::Out, MovementType::Return];

    pub fn as_str(&self) -> &'static str {
        match self {
            MovementType::In => "in",
            MovementType::Out => "out",
            MovementType::Return => "return",
        }
    }

    /// `+quantity` for in and return, `-quantity` for out
    pub fn signed_delta(&self, quantity: i32) -> i32 {
        match self {
            MovementType::In | MovementType::Return => quantity,
            MovementType::Out => -quantity,
        }
    }
}

impl fmt::Display for MovementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown movement type: {0}")]
pub struct UnknownMovementType(pub String);

impl FromStr for MovementType {
    type Err = UnknownMovementType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "in" => Ok(MovementType::In),
            "out" => Ok(MovementType::Out),
            "return" => Ok(MovementType::Return),
            other => Err(UnknownMovementType(other.to_string())),
        }
    }
}

/// Apply a signed delta to a balance. Negative results are legitimate
/// (overdraft or miscount) and are returned as-is; only arithmetic overflow
/// is refused.
pub fn apply_delta(current_stock: i32, delta: i32) -> Option<i32> {
    current_stock.checked_add(delta)
}

/// One immutable ledger entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockMovement {
    pub id: i32,
    pub product_id: i32,
    #[serde(rename = "type")]
    pub movement_type: MovementType,
    pub quantity: i32,
    pub reason: String,
    pub timestamp: DateTime<Utc>,
    pub user_id: i32,
}

impl StockMovement {
    pub fn signed_delta(&self) -> i32 {
        self.movement_type.signed_delta(self.quantity)
    }

    /// Attach denormalized product details. Movements whose product has since
    /// been deleted get placeholder values.
    pub fn with_product(self, product: Option<&Product>) -> ProductMovement {
        let (product_name, product_sku, product_category) = match product {
            Some(p) => (p.name.clone(), p.sku.clone(), p.category.clone()),
            None => (
                "Unknown Product".to_string(),
                "Unknown SKU".to_string(),
                "Unknown Category".to_string(),
            ),
        };

        ProductMovement {
            movement: self,
            product_name,
            product_sku,
            product_category,
        }
    }
}

/// Caller-supplied part of a movement. The server adds the acting user, the
/// id and the timestamp.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct MovementRequest {
    pub product_id: i32,
    #[serde(rename = "type")]
    pub movement_type: MovementType,
    #[validate(range(min = 1, message = "Quantity must be a positive integer"))]
    pub quantity: i32,
    pub reason: String,
}

/// A movement ready to be appended to the ledger
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMovement {
    pub product_id: i32,
    pub movement_type: MovementType,
    pub quantity: i32,
    pub reason: String,
    pub user_id: i32,
}

impl NewMovement {
    pub fn from_request(request: MovementRequest, user_id: i32) -> Self {
        Self {
            product_id: request.product_id,
            movement_type: request.movement_type,
            quantity: request.quantity,
            reason: request.reason,
            user_id,
        }
    }

    pub fn signed_delta(&self) -> i32 {
        self.movement_type.signed_delta(self.quantity)
    }
}

/// Movement enriched with the product it refers to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductMovement {
    #[serde(flatten)]
    pub movement: StockMovement,
    pub product_name: String,
    pub product_sku: String,
    pub product_category: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signed_delta() {
        assert_eq!(MovementType::In.signed_delta(50), 50);
        assert_eq!(MovementType::Out.signed_delta(20), -20);
        assert_eq!(MovementType::Return.signed_delta(5), 5);
    }

    #[test]
    fn test_parse_round_trip() {
        for ty in MovementType::ALL {
            assert_eq!(ty.as_str().parse::<MovementType>().unwrap(), ty);
        }
        assert!("adjustment".parse::<MovementType>().is_err());
        assert!("IN".parse::<MovementType>().is_err());
    }

    #[test]
    fn test_apply_delta_keeps_negative_balances() {
        assert_eq!(apply_delta(30, -100), Some(-70));
        assert_eq!(apply_delta(i32::MAX, 1), None);
        assert_eq!(apply_delta(i32::MIN, -1), None);
    }

    #[test]
    fn test_request_wire_format() {
        let request: MovementRequest = serde_json::from_str(
            r#"{"productId":3,"type":"return","quantity":5,"reason":"customer return"}"#,
        )
        .unwrap();
        assert_eq!(request.movement_type, MovementType::Return);
        assert!(request.validate().is_ok());

        let unknown = serde_json::from_str::<MovementRequest>(
            r#"{"productId":3,"type":"transfer","quantity":5,"reason":""}"#,
        );
        assert!(unknown.is_err());
    }

    #[test]
    fn test_zero_quantity_rejected() {
        let request: MovementRequest = serde_json::from_str(
            r#"{"productId":3,"type":"in","quantity":0,"reason":""}"#,
        )
        .unwrap();
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_orphaned_movement_placeholders() {
        let movement = StockMovement {
            id: 1,
            product_id: 42,
            movement_type: MovementType::Out,
            quantity: 2,
            reason: String::new(),
            timestamp: Utc::now(),
            user_id: 1,
        };
        let enriched = movement.with_product(None);
        assert_eq!(enriched.product_name, "Unknown Product");
        assert_eq!(enriched.product_sku, "Unknown SKU");
        assert_eq!(enriched.product_category, "Unknown Category");

        let json = serde_json::to_value(&enriched).unwrap();
        assert_eq!(json["type"], "out");
        assert_eq!(json["productId"], 42);
        assert_eq!(json["productSku"], "Unknown SKU");
    }
}
