//! WebAssembly module for Stockroom
//!
//! Provides client-side computation for:
//! - Signed movement deltas and low-stock checks
//! - Summary report previews from already-fetched data
//! - CSV export without a round trip to the server
//! - Form validation

use serde::Serialize;
use wasm_bindgen::prelude::*;

// Re-export shared types for use in JavaScript
pub use shared::models::*;
pub use shared::validation::*;

/// Initialize the WASM module
#[wasm_bindgen(start)]
pub fn init() {
    web_sys::console::debug_1(&JsValue::from_str("stockroom-wasm loaded"));
}

fn parse<T: serde::de::DeserializeOwned>(what: &str, json: &str) -> Result<T, String> {
    serde_json::from_str(json).map_err(|e| format!("Invalid {} JSON: {}", what, e))
}

fn to_json<T: Serialize>(value: &T) -> Result<String, String> {
    serde_json::to_string(value).map_err(|e| e.to_string())
}

fn movement_delta(movement_type: &str, quantity: i32) -> Result<i32, String> {
    validate_quantity(quantity)?;
    let movement_type: MovementType = movement_type.parse().map_err(|e| format!("{}", e))?;
    Ok(movement_type.signed_delta(quantity))
}

fn summary(products_json: &str, movements_json: &str) -> Result<String, String> {
    let products: Vec<Product> = parse("products", products_json)?;
    let movements: Vec<StockMovement> = parse("movements", movements_json)?;
    to_json(&build_summary(&products, &movements))
}

fn summary_rows_csv(rows_json: &str) -> Result<String, String> {
    let rows: Vec<SummaryRow> = parse("summary", rows_json)?;
    let csv_rows: Vec<SummaryCsvRow> = rows.iter().map(SummaryCsvRow::from).collect();
    shared::to_csv(&csv_rows).map_err(|e| e.to_string())
}

fn categories(products_json: &str) -> Result<String, String> {
    let products: Vec<Product> = parse("products", products_json)?;
    to_json(&category_breakdown(&products))
}

/// Signed stock change of a movement: +quantity for `in`/`return`,
/// -quantity for `out`
#[wasm_bindgen]
pub fn signed_delta(movement_type: &str, quantity: i32) -> Result<i32, JsValue> {
    movement_delta(movement_type, quantity).map_err(|e| JsValue::from_str(&e))
}

/// Whether a product is below its reorder threshold
#[wasm_bindgen]
pub fn is_low_stock(current_stock: i32, min_stock: i32) -> bool {
    current_stock < min_stock
}

/// Summary rows for products and the movements of a window, both as JSON
#[wasm_bindgen]
pub fn summary_report(products_json: &str, movements_json: &str) -> Result<String, JsValue> {
    summary(products_json, movements_json).map_err(|e| JsValue::from_str(&e))
}

/// CSV text for summary rows as returned by the reports endpoint
#[wasm_bindgen]
pub fn summary_csv(rows_json: &str) -> Result<String, JsValue> {
    summary_rows_csv(rows_json).map_err(|e| JsValue::from_str(&e))
}

/// Category breakdown for a product list
#[wasm_bindgen]
pub fn category_breakdown_json(products_json: &str) -> Result<String, JsValue> {
    categories(products_json).map_err(|e| JsValue::from_str(&e))
}

/// Validation message for a SKU field, or `None` when it is acceptable
#[wasm_bindgen]
pub fn sku_error(sku: &str) -> Option<String> {
    validate_sku(sku).err().map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PRODUCTS: &str = r#"[
        {"id":1,"sku":"A-1","name":"Cap","category":"Hats","attributes":{},"minStock":10,"currentStock":35},
        {"id":2,"sku":"B-2","name":"Beanie","category":"Hats","attributes":{"color":"red"},"minStock":10,"currentStock":4}
    ]"#;

    #[test]
    fn test_movement_delta() {
        assert_eq!(movement_delta("in", 5), Ok(5));
        assert_eq!(movement_delta("return", 5), Ok(5));
        assert_eq!(movement_delta("out", 5), Ok(-5));
        assert!(movement_delta("transfer", 5).is_err());
        assert!(movement_delta("in", 0).is_err());
    }

    #[test]
    fn test_is_low_stock() {
        assert!(is_low_stock(4, 10));
        assert!(!is_low_stock(10, 10));
        assert!(is_low_stock(-3, 0));
    }

    #[test]
    fn test_summary_preview() {
        let movements = r#"[
            {"id":3,"productId":1,"type":"return","quantity":5,"reason":"","timestamp":"2024-03-03T09:00:00Z","userId":1},
            {"id":9,"productId":77,"type":"in","quantity":8,"reason":"","timestamp":"2024-03-03T10:00:00Z","userId":1}
        ]"#;
        let json = summary(PRODUCTS, movements).unwrap();
        let rows: Vec<SummaryRow> = serde_json::from_str(&json).unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].returns, 5);
        assert_eq!(rows[0].initial_quantity, 30);
        assert_eq!(rows[1].initial_quantity, 4);
    }

    #[test]
    fn test_summary_csv() {
        let rows = r#"[{"productCode":"A-1","initialQuantity":30,"scannedIn":0,"scannedOut":0,"returns":5,"currentClosingStock":35}]"#;
        let csv = summary_rows_csv(rows).unwrap();
        assert!(csv.ends_with("A-1,30,0,0,5,35\n"));
    }

    #[test]
    fn test_categories_and_bad_input() {
        let json = categories(PRODUCTS).unwrap();
        assert!(json.contains(r#""totalStock":39"#));
        assert!(categories("not json").unwrap_err().starts_with("Invalid products JSON"));
    }

    #[test]
    fn test_sku_error() {
        assert_eq!(sku_error("A-1"), None);
        assert!(sku_error("").is_some());
        assert!(sku_error("has space").is_some());
    }
}
