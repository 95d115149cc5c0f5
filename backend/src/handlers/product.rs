//! HTTP handlers for the product catalog

use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use shared::{NewProduct, Product, ProductUpdate};

use crate::error::AppResult;
use crate::extract::{AppJson, AppPath};
use crate::middleware::CurrentUser;
use crate::services::ProductService;
use crate::AppState;

/// List all products
pub async fn list_products(
    State(state): State<AppState>,
    _user: CurrentUser,
) -> AppResult<Json<Vec<Product>>> {
    let service = ProductService::new(state.store);
    Ok(Json(service.list_products().await?))
}

/// Products below their minimum stock level
pub async fn list_low_stock(
    State(state): State<AppState>,
    _user: CurrentUser,
) -> AppResult<Json<Vec<Product>>> {
    let service = ProductService::new(state.store);
    Ok(Json(service.low_stock().await?))
}

/// Get a single product
pub async fn get_product(
    State(state): State<AppState>,
    _user: CurrentUser,
    AppPath(id): AppPath<i32>,
) -> AppResult<Json<Product>> {
    let service = ProductService::new(state.store);
    Ok(Json(service.get_product(id).await?))
}

/// Create a product (admin only)
pub async fn create_product(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    AppJson(input): AppJson<NewProduct>,
) -> AppResult<(StatusCode, Json<Product>)> {
    user.require_admin()?;
    let service = ProductService::new(state.store);
    let product = service.create_product(input).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

/// Update a product's descriptive fields (admin only)
pub async fn update_product(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    AppPath(id): AppPath<i32>,
    AppJson(update): AppJson<ProductUpdate>,
) -> AppResult<Json<Product>> {
    user.require_admin()?;
    let service = ProductService::new(state.store);
    Ok(Json(service.update_product(id, update).await?))
}

/// Delete a product (admin only); its movements stay in the ledger
pub async fn delete_product(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    AppPath(id): AppPath<i32>,
) -> AppResult<StatusCode> {
    user.require_admin()?;
    let service = ProductService::new(state.store);
    service.delete_product(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
