//! HTTP handlers for the stock movement ledger

use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use shared::{MovementRequest, NewMovement, ProductMovement, StockMovement};
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::extract::{AppJson, AppQuery};
use crate::middleware::CurrentUser;
use crate::services::dates::{parse_day, parse_optional_bound, Bound};
use crate::services::InventoryService;
use crate::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MovementQuery {
    pub product_id: Option<i32>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DailyQuery {
    pub date: Option<String>,
}

/// Record a stock movement for the calling user
pub async fn record_movement(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    AppJson(request): AppJson<MovementRequest>,
) -> AppResult<(StatusCode, Json<StockMovement>)> {
    request.validate()?;
    let service = InventoryService::new(state.store);
    let movement = service
        .record_movement(NewMovement::from_request(request, user.user_id))
        .await?;
    Ok((StatusCode::CREATED, Json(movement)))
}

/// List movements, newest first. `productId` narrows to one product; a
/// `startDate`/`endDate` pair narrows to a time window.
pub async fn list_movements(
    State(state): State<AppState>,
    _user: CurrentUser,
    AppQuery(query): AppQuery<MovementQuery>,
) -> AppResult<Json<Vec<StockMovement>>> {
    let service = InventoryService::new(state.store);

    let start = parse_optional_bound("startDate", query.start_date.as_deref(), Bound::Start)?;
    let end = parse_optional_bound("endDate", query.end_date.as_deref(), Bound::End)?;

    let movements = match (start, end) {
        (None, None) => service.list_movements(query.product_id).await?,
        (Some(start), Some(end)) => {
            let mut movements = service.list_movements_in_range(start, end).await?;
            if let Some(product_id) = query.product_id {
                movements.retain(|m| m.product_id == product_id);
            }
            movements
        }
        (None, Some(_)) => {
            return Err(AppError::validation("startDate", "startDate is required with endDate"))
        }
        (Some(_), None) => {
            return Err(AppError::validation("endDate", "endDate is required with startDate"))
        }
    };

    Ok(Json(movements))
}

/// Movements of one local calendar day with product details attached
pub async fn daily_movements(
    State(state): State<AppState>,
    _user: CurrentUser,
    AppQuery(query): AppQuery<DailyQuery>,
) -> AppResult<Json<Vec<ProductMovement>>> {
    let raw = query
        .date
        .as_deref()
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .ok_or_else(|| AppError::validation("date", "Date parameter is required"))?;
    let date = parse_day("date", raw)?;

    let service = InventoryService::new(state.store);
    Ok(Json(service.daily_movements(date).await?))
}
