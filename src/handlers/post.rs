//! Post handlers

use super::{Path, ValidatedJson};
use crate::{
    auth::RequireAuth,
    error::AppError,
    middleware::AppState,
    models::{CreatePostRequest, PostResponse, UpdatePostRequest},
};
use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use std::sync::Arc;
use uuid::Uuid;

pub async fn create_post(
    State(state): State<Arc<AppState>>,
    RequireAuth(auth_context): RequireAuth,
    ValidatedJson(req): ValidatedJson<CreatePostRequest>,
) -> Result<impl IntoResponse, AppError> {
    let post = state.post_service.create(&auth_context, req).await?;

    Ok((StatusCode::CREATED, Json(post.id)))
}

pub async fn list_posts(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, AppError> {
    let posts: Vec<PostResponse> = state
        .post_service
        .list()
        .await?
        .into_iter()
        .map(PostResponse::from)
        .collect();

    Ok(Json(posts))
}

/// Read one post; counts as a view
pub async fn get_post(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let post = state.post_service.get(id).await?;

    Ok(Json(PostResponse::from(post)))
}

pub async fn update_post(
    State(state): State<Arc<AppState>>,
    RequireAuth(auth_context): RequireAuth,
    Path(id): Path<Uuid>,
    ValidatedJson(req): ValidatedJson<UpdatePostRequest>,
) -> Result<impl IntoResponse, AppError> {
    let post = state.post_service.update(&auth_context, id, req).await?;

    Ok(Json(PostResponse::from(post)))
}

pub async fn delete_post(
    State(state): State<Arc<AppState>>,
    RequireAuth(auth_context): RequireAuth,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    state.post_service.delete(&auth_context, id).await?;

    Ok(StatusCode::NO_CONTENT)
}
