//! Reporting handlers for summaries, breakdowns and data export

use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use shared::{CategoryBreakdown, DashboardMetrics, DateRange};

use crate::error::AppResult;
use crate::extract::AppQuery;
use crate::middleware::CurrentUser;
use crate::services::dates::{parse_optional_bound, Bound};
use crate::services::{ProductService, ReportingService};
use crate::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportQuery {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub format: Option<String>, // "json" or "csv"
}

#[derive(Debug, Deserialize)]
pub struct ExportQuery {
    pub format: Option<String>,
}

fn wants_csv(format: Option<&str>) -> bool {
    format.is_some_and(|f| f.eq_ignore_ascii_case("csv"))
}

fn csv_attachment(filename: &str, body: String) -> Response {
    (
        [
            (header::CONTENT_TYPE, "text/csv".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        body,
    )
        .into_response()
}

/// Inventory summary per product for a date range
pub async fn get_summary_report(
    State(state): State<AppState>,
    _user: CurrentUser,
    AppQuery(query): AppQuery<ReportQuery>,
) -> AppResult<Response> {
    let range = DateRange::new(
        parse_optional_bound("startDate", query.start_date.as_deref(), Bound::Start)?,
        parse_optional_bound("endDate", query.end_date.as_deref(), Bound::End)?,
    );

    let service = ReportingService::new(state.store);
    let rows = service.summary_report(range).await?;

    if wants_csv(query.format.as_deref()) {
        let csv = ReportingService::summary_csv(&rows)?;
        Ok(csv_attachment("inventory_summary.csv", csv))
    } else {
        Ok(Json(rows).into_response())
    }
}

/// Product catalog with stock levels
pub async fn get_inventory_report(
    State(state): State<AppState>,
    _user: CurrentUser,
    AppQuery(query): AppQuery<ExportQuery>,
) -> AppResult<Response> {
    if wants_csv(query.format.as_deref()) {
        let service = ReportingService::new(state.store);
        let csv = service.inventory_csv().await?;
        Ok(csv_attachment("inventory.csv", csv))
    } else {
        let products = ProductService::new(state.store).list_products().await?;
        Ok(Json(products).into_response())
    }
}

/// Product count and stock per category
pub async fn get_category_breakdown(
    State(state): State<AppState>,
    _user: CurrentUser,
) -> AppResult<Json<Vec<CategoryBreakdown>>> {
    let service = ReportingService::new(state.store);
    Ok(Json(service.category_breakdown().await?))
}

/// Get dashboard metrics
pub async fn get_dashboard(
    State(state): State<AppState>,
    _user: CurrentUser,
) -> AppResult<Json<DashboardMetrics>> {
    let service = ReportingService::new(state.store);
    Ok(Json(service.dashboard().await?))
}
