//! Reporting service: summary reconstruction, breakdowns and CSV export

use std::sync::Arc;

use shared::{
    build_summary, category_breakdown, CategoryBreakdown, CsvRecord, DashboardMetrics, DateRange,
    InventoryCsvRow, SummaryCsvRow, SummaryRow,
};
use tracing::instrument;

use crate::error::{AppError, AppResult};
use crate::store::InventoryStore;

/// Reporting service
#[derive(Clone)]
pub struct ReportingService {
    store: Arc<dyn InventoryStore>,
}

impl ReportingService {
    pub fn new(store: Arc<dyn InventoryStore>) -> Self {
        Self { store }
    }

    /// One row per product: movement totals inside `range` and the opening
    /// balance reconstructed from the live balance.
    ///
    /// `currentClosingStock` is always the present balance, including any
    /// movements after the end of the window. An unbounded range aggregates
    /// the whole ledger, so the opening balance is the stock before any
    /// movement was recorded.
    #[instrument(skip(self))]
    pub async fn summary_report(&self, range: DateRange) -> AppResult<Vec<SummaryRow>> {
        if range.is_inverted() {
            return Err(AppError::validation("startDate", "Start date must not be after end date"));
        }

        let products = self.store.list_products().await?;
        let movements = if range.is_unbounded() {
            self.store.list_movements(None).await?
        } else {
            self.store.list_movements_between(range).await?
        };

        tracing::debug!(
            products = products.len(),
            movements = movements.len(),
            "building summary report"
        );

        Ok(build_summary(&products, &movements))
    }

    /// Product count and stock per category
    pub async fn category_breakdown(&self) -> AppResult<Vec<CategoryBreakdown>> {
        let products = self.store.list_products().await?;
        Ok(category_breakdown(&products))
    }

    /// Headline numbers for the dashboard
    pub async fn dashboard(&self) -> AppResult<DashboardMetrics> {
        let products = self.store.list_products().await?;
        Ok(DashboardMetrics::from_products(&products))
    }

    /// Catalog export: SKU, name, category, current and minimum stock
    pub async fn inventory_csv(&self) -> AppResult<String> {
        let products = self.store.list_products().await?;
        let rows: Vec<InventoryCsvRow> = products.iter().map(InventoryCsvRow::from).collect();
        Self::export_to_csv(&rows)
    }

    /// Summary report rows in their CSV layout
    pub fn summary_csv(rows: &[SummaryRow]) -> AppResult<String> {
        let csv_rows: Vec<SummaryCsvRow> = rows.iter().map(SummaryCsvRow::from).collect();
        Self::export_to_csv(&csv_rows)
    }

    /// Export report data as CSV
    pub fn export_to_csv<T: CsvRecord>(data: &[T]) -> AppResult<String> {
        Ok(shared::to_csv(data)?)
    }
}
