//! Reporting models and the ledger aggregation behind them

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use super::{MovementType, Product, StockMovement};
use crate::export::CsvRecord;

/// Per-type quantity totals of a set of movements
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MovementTotals {
    pub scanned_in: i64,
    pub scanned_out: i64,
    pub returns: i64,
}

impl MovementTotals {
    pub fn record(&mut self, movement_type: MovementType, quantity: i32) {
        let quantity = i64::from(quantity);
        match movement_type {
            MovementType::In => self.scanned_in += quantity,
            MovementType::Out => self.scanned_out += quantity,
            MovementType::Return => self.returns += quantity,
        }
    }

    /// Net effect on stock: in + returns - out
    pub fn net(&self) -> i64 {
        self.scanned_in + self.returns - self.scanned_out
    }
}

/// Group movements by product and total them per type
pub fn totals_by_product<'a, I>(movements: I) -> HashMap<i32, MovementTotals>
where
    I: IntoIterator<Item = &'a StockMovement>,
{
    let mut totals: HashMap<i32, MovementTotals> = HashMap::new();
    for movement in movements {
        totals
            .entry(movement.product_id)
            .or_default()
            .record(movement.movement_type, movement.quantity);
    }
    totals
}

/// One line of the summary report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryRow {
    pub product_code: String,
    /// Balance immediately before the windowed movements
    pub initial_quantity: i64,
    pub scanned_in: i64,
    pub scanned_out: i64,
    pub returns: i64,
    /// The live balance, not the balance as of the window end
    pub current_closing_stock: i64,
}

impl SummaryRow {
    /// Derive the opening balance by inverting the window's net effect off
    /// the present balance.
    pub fn reconstruct(product: &Product, totals: &MovementTotals) -> Self {
        let current_closing_stock = i64::from(product.current_stock);
        Self {
            product_code: product.sku.clone(),
            initial_quantity: current_closing_stock - totals.net(),
            scanned_in: totals.scanned_in,
            scanned_out: totals.scanned_out,
            returns: totals.returns,
            current_closing_stock,
        }
    }
}

/// Build one summary row per product from the catalog and the (already
/// windowed) movements. Row order follows `products`; movements of products
/// no longer in the catalog are ignored.
pub fn build_summary(products: &[Product], windowed: &[StockMovement]) -> Vec<SummaryRow> {
    let totals = totals_by_product(windowed);
    products
        .iter()
        .map(|product| {
            let product_totals = totals.get(&product.id).copied().unwrap_or_default();
            SummaryRow::reconstruct(product, &product_totals)
        })
        .collect()
}

/// Products and stock per category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryBreakdown {
    pub name: String,
    pub count: i64,
    pub total_stock: i64,
}

/// Category breakdown, sorted by category name
pub fn category_breakdown(products: &[Product]) -> Vec<CategoryBreakdown> {
    let mut by_category: BTreeMap<&str, (i64, i64)> = BTreeMap::new();
    for product in products {
        let entry = by_category.entry(product.category.as_str()).or_default();
        entry.0 += 1;
        entry.1 += i64::from(product.current_stock);
    }

    by_category
        .into_iter()
        .map(|(name, (count, total_stock))| CategoryBreakdown {
            name: name.to_string(),
            count,
            total_stock,
        })
        .collect()
}

/// Headline numbers for the dashboard
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardMetrics {
    pub total_products: i64,
    pub total_stock: i64,
    pub low_stock_count: i64,
}

impl DashboardMetrics {
    pub fn from_products(products: &[Product]) -> Self {
        Self {
            total_products: products.len() as i64,
            total_stock: products.iter().map(|p| i64::from(p.current_stock)).sum(),
            low_stock_count: products.iter().filter(|p| p.is_low_stock()).count() as i64,
        }
    }
}

/// CSV layout of the summary report export
#[derive(Debug, Clone, Serialize)]
pub struct SummaryCsvRow<'a> {
    #[serde(rename = "Product Code")]
    pub product_code: &'a str,
    #[serde(rename = "Initial Quantity")]
    pub initial_quantity: i64,
    #[serde(rename = "Scanned IN")]
    pub scanned_in: i64,
    #[serde(rename = "Scanned Out")]
    pub scanned_out: i64,
    #[serde(rename = "Returns")]
    pub returns: i64,
    #[serde(rename = "Current Closing Stock")]
    pub current_closing_stock: i64,
}

impl CsvRecord for SummaryCsvRow<'_> {
    const HEADERS: &'static [&'static str] = &[
        "Product Code",
        "Initial Quantity",
        "Scanned IN",
        "Scanned Out",
        "Returns",
        "Current Closing Stock",
    ];
}

impl<'a> From<&'a SummaryRow> for SummaryCsvRow<'a> {
    fn from(row: &'a SummaryRow) -> Self {
        Self {
            product_code: &row.product_code,
            initial_quantity: row.initial_quantity,
            scanned_in: row.scanned_in,
            scanned_out: row.scanned_out,
            returns: row.returns,
            current_closing_stock: row.current_closing_stock,
        }
    }
}

/// CSV layout of the inventory export
#[derive(Debug, Clone, Serialize)]
pub struct InventoryCsvRow<'a> {
    #[serde(rename = "SKU")]
    pub sku: &'a str,
    #[serde(rename = "Name")]
    pub name: &'a str,
    #[serde(rename = "Category")]
    pub category: &'a str,
    #[serde(rename = "Current Stock")]
    pub current_stock: i32,
    #[serde(rename = "Min Stock")]
    pub min_stock: i32,
}

impl CsvRecord for InventoryCsvRow<'_> {
    const HEADERS: &'static [&'static str] =
        &["SKU", "Name", "Category", "Current Stock", "Min Stock"];
}

impl<'a> From<&'a Product> for InventoryCsvRow<'a> {
    fn from(product: &'a Product) -> Self {
        Self {
            sku: &product.sku,
            name: &product.name,
            category: &product.category,
            current_stock: product.current_stock,
            min_stock: product.min_stock,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ProductAttributes;
    use chrono::Utc;

    fn product(id: i32, sku: &str, category: &str, current_stock: i32) -> Product {
        Product {
            id,
            sku: sku.to_string(),
            name: format!("Product {}", id),
            category: category.to_string(),
            attributes: ProductAttributes::default(),
            min_stock: 10,
            current_stock,
        }
    }

    fn movement(id: i32, product_id: i32, movement_type: MovementType, quantity: i32) -> StockMovement {
        StockMovement {
            id,
            product_id,
            movement_type,
            quantity,
            reason: String::new(),
            timestamp: Utc::now(),
            user_id: 1,
        }
    }

    #[test]
    fn test_totals_by_type() {
        let movements = vec![
            movement(1, 1, MovementType::In, 50),
            movement(2, 1, MovementType::Out, 20),
            movement(3, 1, MovementType::Return, 5),
            movement(4, 2, MovementType::In, 7),
        ];
        let totals = totals_by_product(&movements);
        assert_eq!(
            totals[&1],
            MovementTotals {
                scanned_in: 50,
                scanned_out: 20,
                returns: 5
            }
        );
        assert_eq!(totals[&1].net(), 35);
        assert_eq!(totals[&2].net(), 7);
    }

    #[test]
    fn test_summary_window_with_only_a_return() {
        let products = vec![product(1, "SKU-1", "A", 35)];
        let windowed = vec![movement(3, 1, MovementType::Return, 5)];

        let rows = build_summary(&products, &windowed);
        assert_eq!(
            rows,
            vec![SummaryRow {
                product_code: "SKU-1".to_string(),
                initial_quantity: 30,
                scanned_in: 0,
                scanned_out: 0,
                returns: 5,
                current_closing_stock: 35,
            }]
        );
    }

    #[test]
    fn test_products_without_movements_get_zero_rows() {
        let products = vec![product(1, "SKU-1", "A", 35), product(2, "SKU-2", "A", -4)];
        let rows = build_summary(&products, &[movement(1, 1, MovementType::In, 35)]);

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].product_code, "SKU-2");
        assert_eq!(rows[1].initial_quantity, -4);
        assert_eq!(rows[1].scanned_in + rows[1].scanned_out + rows[1].returns, 0);
    }

    #[test]
    fn test_orphaned_movements_are_ignored() {
        let products = vec![product(1, "SKU-1", "A", 3)];
        let rows = build_summary(&products, &[movement(1, 99, MovementType::Out, 8)]);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].initial_quantity, 3);
    }

    #[test]
    fn test_category_breakdown() {
        let products = vec![
            product(1, "A-1", "Shoes", 5),
            product(2, "B-1", "Bags", 2),
            product(3, "A-2", "Shoes", 7),
        ];
        let breakdown = category_breakdown(&products);
        assert_eq!(breakdown.len(), 2);
        assert_eq!(breakdown[0].name, "Bags");
        assert_eq!(breakdown[1].count, 2);
        assert_eq!(breakdown[1].total_stock, 12);
    }

    #[test]
    fn test_dashboard_metrics() {
        let products = vec![product(1, "A", "X", 50), product(2, "B", "X", 3)];
        let metrics = DashboardMetrics::from_products(&products);
        assert_eq!(metrics.total_products, 2);
        assert_eq!(metrics.total_stock, 53);
        assert_eq!(metrics.low_stock_count, 1);
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        fn movement_type_strategy() -> impl Strategy<Value = MovementType> {
            prop_oneof![
                Just(MovementType::In),
                Just(MovementType::Out),
                Just(MovementType::Return),
            ]
        }

        proptest! {
            /// Replaying any movement history forward from an opening balance and
            /// then reconstructing gives that opening balance back.
            #[test]
            fn prop_reconstruction_inverts_replay(
                opening in -1_000i32..1_000,
                history in prop::collection::vec((movement_type_strategy(), 1i32..500), 0..40),
            ) {
                let movements: Vec<StockMovement> = history
                    .iter()
                    .enumerate()
                    .map(|(i, (ty, qty))| movement(i as i32 + 1, 1, *ty, *qty))
                    .collect();
                let closing = opening + movements.iter().map(StockMovement::signed_delta).sum::<i32>();

                let rows = build_summary(&[product(1, "SKU-1", "A", closing)], &movements);
                let row = &rows[0];

                prop_assert_eq!(row.initial_quantity, i64::from(opening));
                prop_assert_eq!(row.current_closing_stock, i64::from(closing));
                prop_assert_eq!(
                    row.initial_quantity + row.scanned_in + row.returns - row.scanned_out,
                    row.current_closing_stock
                );
            }
        }
    }
}
