//! Authentication handlers

use axum::{extract::State, http::StatusCode, Json};
use shared::{Credentials, User};

use crate::error::AppResult;
use crate::extract::AppJson;
use crate::middleware::CurrentUser;
use crate::services::{AuthResponse, AuthService};
use crate::AppState;

/// Register endpoint handler
pub async fn register(
    State(state): State<AppState>,
    AppJson(body): AppJson<Credentials>,
) -> AppResult<(StatusCode, Json<AuthResponse>)> {
    let auth_service = AuthService::new(state.store.clone(), &state.config.auth);
    let response = auth_service.register(body).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// Login endpoint handler
pub async fn login(
    State(state): State<AppState>,
    AppJson(body): AppJson<Credentials>,
) -> AppResult<Json<AuthResponse>> {
    let auth_service = AuthService::new(state.store.clone(), &state.config.auth);
    Ok(Json(auth_service.login(body).await?))
}

/// The account behind the bearer token
pub async fn current_user(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> AppResult<Json<User>> {
    let auth_service = AuthService::new(state.store.clone(), &state.config.auth);
    Ok(Json(auth_service.current_user(user.user_id).await?))
}
