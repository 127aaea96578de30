//! Repository layer
//!
//! Each store is an async trait with a Postgres implementation and an
//! in-process one (`memory`) used by tests and `memory://` deployments.

pub mod account_repo;
pub mod comment_repo;
pub mod memory;
pub mod post_repo;
pub mod refresh_token_repo;

pub use account_repo::PgAccountRepository;
pub use comment_repo::PgCommentRepository;
pub use memory::MemoryStore;
pub use post_repo::PgPostRepository;
pub use refresh_token_repo::{hash_token, PgRefreshTokenRepository};

use crate::{
    error::Result,
    models::{Account, Comment, NewAccount, Post, RefreshToken},
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

/// Credential store
#[async_trait]
pub trait AccountRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Account>>;

    async fn find_by_email(&self, email: &str) -> Result<Option<Account>>;

    async fn exists_by_email(&self, email: &str) -> Result<bool>;

    async fn exists_by_username(&self, username: &str) -> Result<bool>;

    /// Insert a new account; duplicate email or username is a `Conflict`
    async fn create(&self, account: NewAccount) -> Result<Account>;
}

/// Refresh token store; at most one row per account
#[async_trait]
pub trait RefreshTokenRepository: Send + Sync {
    /// Overwrite the account's row in place, or insert it. Fails if the token
    /// value already belongs to a different account.
    async fn upsert(&self, account_id: Uuid, token: &str, expires_at: DateTime<Utc>) -> Result<()>;

    async fn find_by_token(&self, token: &str) -> Result<Option<RefreshToken>>;

    async fn find_by_account(&self, account_id: Uuid) -> Result<Option<RefreshToken>>;

    async fn delete_by_account(&self, account_id: Uuid) -> Result<bool>;
}

#[async_trait]
pub trait PostRepository: Send + Sync {
    async fn create(&self, author_id: Uuid, title: &str, content: &str) -> Result<Post>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>>;

    /// Newest first
    async fn list(&self) -> Result<Vec<Post>>;

    async fn update(&self, id: Uuid, title: &str, content: &str) -> Result<Option<Post>>;

    /// Also removes the post's comments
    async fn delete(&self, id: Uuid) -> Result<bool>;

    async fn increment_view_count(&self, id: Uuid) -> Result<Option<Post>>;
}

#[async_trait]
pub trait CommentRepository: Send + Sync {
    async fn create(&self, post_id: Uuid, author_id: Uuid, content: &str) -> Result<Comment>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Comment>>;

    /// Oldest first
    async fn list_by_post(&self, post_id: Uuid) -> Result<Vec<Comment>>;

    async fn update(&self, id: Uuid, content: &str) -> Result<Option<Comment>>;

    async fn delete(&self, id: Uuid) -> Result<bool>;
}

/// All stores the services depend on
#[derive(Clone)]
pub struct Repositories {
    pub accounts: Arc<dyn AccountRepository>,
    pub refresh_tokens: Arc<dyn RefreshTokenRepository>,
    pub posts: Arc<dyn PostRepository>,
    pub comments: Arc<dyn CommentRepository>,
}

impl Repositories {
    pub fn postgres(db: PgPool) -> Self {
        Self {
            accounts: Arc::new(PgAccountRepository::new(db.clone())),
            refresh_tokens: Arc::new(PgRefreshTokenRepository::new(db.clone())),
            posts: Arc::new(PgPostRepository::new(db.clone())),
            comments: Arc::new(PgCommentRepository::new(db)),
        }
    }

    pub fn in_memory() -> Self {
        Self::from_store(Arc::new(MemoryStore::new()))
    }

    /// Share one in-process store across all four traits
    pub fn from_store(store: Arc<MemoryStore>) -> Self {
        Self {
            accounts: store.clone(),
            refresh_tokens: store.clone(),
            posts: store.clone(),
            comments: store,
        }
    }
}
