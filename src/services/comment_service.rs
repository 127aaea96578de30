//! Comment service
//!
//! Comments are always addressed through their post. A comment id paired with
//! the wrong post id is treated as missing.

use crate::{
    auth::{authorize_owner, AuthContext, ResourceKind},
    error::AppError,
    models::{Comment, CommentRequest},
    repository::{CommentRepository, PostRepository},
};
use std::sync::Arc;
use uuid::Uuid;

pub struct CommentService {
    posts: Arc<dyn PostRepository>,
    comments: Arc<dyn CommentRepository>,
}

impl CommentService {
    pub fn new(posts: Arc<dyn PostRepository>, comments: Arc<dyn CommentRepository>) -> Self {
        Self { posts, comments }
    }

    pub async fn add(
        &self,
        auth: &AuthContext,
        post_id: Uuid,
        req: CommentRequest,
    ) -> Result<Comment, AppError> {
        let principal = auth.principal()?;
        self.ensure_post_exists(post_id).await?;

        let comment = self
            .comments
            .create(post_id, principal.account_id, &req.content)
            .await?;

        tracing::info!(
            comment_id = %comment.id,
            post_id = %post_id,
            author_id = %comment.author_id,
            "Comment added"
        );

        Ok(comment)
    }

    pub async fn list(&self, post_id: Uuid) -> Result<Vec<Comment>, AppError> {
        self.ensure_post_exists(post_id).await?;
        self.comments.list_by_post(post_id).await
    }

    pub async fn edit(
        &self,
        auth: &AuthContext,
        post_id: Uuid,
        comment_id: Uuid,
        req: CommentRequest,
    ) -> Result<Comment, AppError> {
        authorize_owner(
            auth,
            ResourceKind::Comment,
            self.find_in_post(post_id, comment_id),
        )
        .await?;

        self.comments
            .update(comment_id, &req.content)
            .await?
            .ok_or_else(|| AppError::not_found("Comment not found"))
    }

    pub async fn delete(
        &self,
        auth: &AuthContext,
        post_id: Uuid,
        comment_id: Uuid,
    ) -> Result<(), AppError> {
        let (principal, _) = authorize_owner(
            auth,
            ResourceKind::Comment,
            self.find_in_post(post_id, comment_id),
        )
        .await?;

        if !self.comments.delete(comment_id).await? {
            return Err(AppError::not_found("Comment not found"));
        }

        tracing::info!(
            comment_id = %comment_id,
            account_id = %principal.account_id,
            "Comment deleted"
        );

        Ok(())
    }

    async fn ensure_post_exists(&self, post_id: Uuid) -> Result<(), AppError> {
        match self.posts.find_by_id(post_id).await? {
            Some(_) => Ok(()),
            None => Err(AppError::not_found("Post not found")),
        }
    }

    async fn find_in_post(&self, post_id: Uuid, comment_id: Uuid) -> Result<Option<Comment>, AppError> {
        Ok(self
            .comments
            .find_by_id(comment_id)
            .await?
            .filter(|comment| comment.post_id == post_id))
    }
}
