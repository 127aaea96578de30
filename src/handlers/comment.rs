//! Comment handlers, nested under `/api/posts/{id}/comments`

use super::{Path, ValidatedJson};
use crate::{
    auth::RequireAuth,
    error::AppError,
    middleware::AppState,
    models::{CommentRequest, CommentResponse},
};
use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use std::sync::Arc;
use uuid::Uuid;

pub async fn add_comment(
    State(state): State<Arc<AppState>>,
    RequireAuth(auth_context): RequireAuth,
    Path(post_id): Path<Uuid>,
    ValidatedJson(req): ValidatedJson<CommentRequest>,
) -> Result<impl IntoResponse, AppError> {
    let comment = state
        .comment_service
        .add(&auth_context, post_id, req)
        .await?;

    Ok((StatusCode::CREATED, Json(comment.id)))
}

pub async fn list_comments(
    State(state): State<Arc<AppState>>,
    Path(post_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let comments: Vec<CommentResponse> = state
        .comment_service
        .list(post_id)
        .await?
        .into_iter()
        .map(CommentResponse::from)
        .collect();

    Ok(Json(comments))
}

pub async fn update_comment(
    State(state): State<Arc<AppState>>,
    RequireAuth(auth_context): RequireAuth,
    Path((post_id, comment_id)): Path<(Uuid, Uuid)>,
    ValidatedJson(req): ValidatedJson<CommentRequest>,
) -> Result<impl IntoResponse, AppError> {
    let comment = state
        .comment_service
        .edit(&auth_context, post_id, comment_id, req)
        .await?;

    Ok(Json(CommentResponse::from(comment)))
}

pub async fn delete_comment(
    State(state): State<Arc<AppState>>,
    RequireAuth(auth_context): RequireAuth,
    Path((post_id, comment_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, AppError> {
    state
        .comment_service
        .delete(&auth_context, post_id, comment_id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
