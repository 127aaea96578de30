//! Authentication handlers

use super::ValidatedJson;
use crate::{
    auth::RequireAuth,
    error::AppError,
    middleware::AppState,
    models::{LoginRequest, RefreshTokenRequest, SignUpRequest},
};
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use std::sync::Arc;

/// Register
pub async fn signup(
    State(state): State<Arc<AppState>>,
    ValidatedJson(req): ValidatedJson<SignUpRequest>,
) -> Result<impl IntoResponse, AppError> {
    let id = state.auth_service.signup(req).await?;

    Ok((StatusCode::CREATED, Json(id)))
}

/// Login
pub async fn login(
    State(state): State<Arc<AppState>>,
    ValidatedJson(req): ValidatedJson<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    let tokens = state.auth_service.login(req).await?;

    Ok(Json(tokens))
}

/// Rotate the refresh token
pub async fn refresh(
    State(state): State<Arc<AppState>>,
    ValidatedJson(req): ValidatedJson<RefreshTokenRequest>,
) -> Result<impl IntoResponse, AppError> {
    let tokens = state.auth_service.refresh(req).await?;

    Ok(Json(tokens))
}

/// Logout
pub async fn logout(
    State(state): State<Arc<AppState>>,
    RequireAuth(auth_context): RequireAuth,
) -> Result<impl IntoResponse, AppError> {
    state.auth_service.logout(&auth_context).await?;

    Ok(Json(json!({"message": "Logged out"})))
}

/// Current account
pub async fn me(
    State(state): State<Arc<AppState>>,
    RequireAuth(auth_context): RequireAuth,
) -> Result<impl IntoResponse, AppError> {
    let account = state.auth_service.me(&auth_context).await?;

    Ok(Json(account))
}
