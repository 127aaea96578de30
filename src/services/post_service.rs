//! Post service

use crate::{
    auth::{authorize_owner, AuthContext, ResourceKind},
    error::AppError,
    models::{CreatePostRequest, Post, UpdatePostRequest},
    repository::PostRepository,
};
use std::sync::Arc;
use uuid::Uuid;

pub struct PostService {
    posts: Arc<dyn PostRepository>,
}

impl PostService {
    pub fn new(posts: Arc<dyn PostRepository>) -> Self {
        Self { posts }
    }

    pub async fn create(&self, auth: &AuthContext, req: CreatePostRequest) -> Result<Post, AppError> {
        let principal = auth.principal()?;
        let post = self
            .posts
            .create(principal.account_id, &req.title, &req.content)
            .await?;

        tracing::info!(post_id = %post.id, author_id = %post.author_id, "Post created");

        Ok(post)
    }

    /// Fetch a post, counting the read
    pub async fn get(&self, id: Uuid) -> Result<Post, AppError> {
        self.posts
            .increment_view_count(id)
            .await?
            .ok_or_else(|| AppError::not_found("Post not found"))
    }

    pub async fn list(&self) -> Result<Vec<Post>, AppError> {
        self.posts.list().await
    }

    pub async fn update(
        &self,
        auth: &AuthContext,
        id: Uuid,
        req: UpdatePostRequest,
    ) -> Result<Post, AppError> {
        authorize_owner(auth, ResourceKind::Post, self.posts.find_by_id(id)).await?;

        // deleted between the check and the write
        self.posts
            .update(id, &req.title, &req.content)
            .await?
            .ok_or_else(|| AppError::not_found("Post not found"))
    }

    pub async fn delete(&self, auth: &AuthContext, id: Uuid) -> Result<(), AppError> {
        let (principal, _) =
            authorize_owner(auth, ResourceKind::Post, self.posts.find_by_id(id)).await?;

        if !self.posts.delete(id).await? {
            return Err(AppError::not_found("Post not found"));
        }

        tracing::info!(post_id = %id, account_id = %principal.account_id, "Post deleted");

        Ok(())
    }
}
