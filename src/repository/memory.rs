//! In-process store implementing every repository trait
//!
//! Account and refresh-token tables keep secondary indexes that must change
//! together with the primary map, so each sits behind a single lock. Posts and
//! comments have no cross-row invariant and live in `DashMap`s.

use crate::{
    error::{AppError, Result},
    models::{Account, Comment, NewAccount, Post, RefreshToken},
    repository::{
        hash_token, AccountRepository, CommentRepository, PostRepository, RefreshTokenRepository,
    },
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::collections::HashMap;
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

#[derive(Default)]
struct AccountTable {
    by_id: HashMap<Uuid, Account>,
    by_email: HashMap<String, Uuid>,
    by_username: HashMap<String, Uuid>,
}

#[derive(Default)]
struct RefreshTokenTable {
    by_account: HashMap<Uuid, RefreshToken>,
    by_hash: HashMap<String, Uuid>,
}

#[derive(Default)]
pub struct MemoryStore {
    accounts: RwLock<AccountTable>,
    refresh_tokens: Mutex<RefreshTokenTable>,
    posts: DashMap<Uuid, Post>,
    comments: DashMap<Uuid, Comment>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total refresh-token rows across all accounts
    pub async fn refresh_token_rows(&self) -> usize {
        self.refresh_tokens.lock().await.by_account.len()
    }
}

#[async_trait]
impl AccountRepository for MemoryStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Account>> {
        Ok(self.accounts.read().await.by_id.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Account>> {
        let table = self.accounts.read().await;
        Ok(table
            .by_email
            .get(email)
            .and_then(|id| table.by_id.get(id))
            .cloned())
    }

    async fn exists_by_email(&self, email: &str) -> Result<bool> {
        Ok(self.accounts.read().await.by_email.contains_key(email))
    }

    async fn exists_by_username(&self, username: &str) -> Result<bool> {
        Ok(self.accounts.read().await.by_username.contains_key(username))
    }

    async fn create(&self, account: NewAccount) -> Result<Account> {
        let mut table = self.accounts.write().await;

        if table.by_email.contains_key(&account.email) {
            return Err(AppError::conflict("Email is already registered"));
        }
        if table.by_username.contains_key(&account.username) {
            return Err(AppError::conflict("Username is already taken"));
        }

        let now = Utc::now();
        let created = Account {
            id: Uuid::new_v4(),
            email: account.email,
            username: account.username,
            password_hash: account.password_hash,
            role: account.role,
            created_at: now,
            updated_at: now,
        };

        table.by_email.insert(created.email.clone(), created.id);
        table.by_username.insert(created.username.clone(), created.id);
        table.by_id.insert(created.id, created.clone());

        Ok(created)
    }
}

#[async_trait]
impl RefreshTokenRepository for MemoryStore {
    async fn upsert(&self, account_id: Uuid, token: &str, expires_at: DateTime<Utc>) -> Result<()> {
        let token_hash = hash_token(token);
        let mut table = self.refresh_tokens.lock().await;

        if let Some(owner) = table.by_hash.get(&token_hash) {
            if *owner != account_id {
                tracing::error!(%account_id, "Refresh token collides with another account's token");
                return Err(AppError::Internal("Refresh token collision".to_string()));
            }
        }

        let row = RefreshToken {
            account_id,
            token_hash: token_hash.clone(),
            expires_at,
            updated_at: Utc::now(),
        };

        if let Some(previous) = table.by_account.insert(account_id, row) {
            table.by_hash.remove(&previous.token_hash);
        }
        table.by_hash.insert(token_hash, account_id);

        Ok(())
    }

    async fn find_by_token(&self, token: &str) -> Result<Option<RefreshToken>> {
        let table = self.refresh_tokens.lock().await;
        Ok(table
            .by_hash
            .get(&hash_token(token))
            .and_then(|account_id| table.by_account.get(account_id))
            .cloned())
    }

    async fn find_by_account(&self, account_id: Uuid) -> Result<Option<RefreshToken>> {
        Ok(self
            .refresh_tokens
            .lock()
            .await
            .by_account
            .get(&account_id)
            .cloned())
    }

    async fn delete_by_account(&self, account_id: Uuid) -> Result<bool> {
        let mut table = self.refresh_tokens.lock().await;
        match table.by_account.remove(&account_id) {
            Some(row) => {
                table.by_hash.remove(&row.token_hash);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[async_trait]
impl PostRepository for MemoryStore {
    async fn create(&self, author_id: Uuid, title: &str, content: &str) -> Result<Post> {
        let now = Utc::now();
        let post = Post {
            id: Uuid::new_v4(),
            title: title.to_string(),
            content: content.to_string(),
            view_count: 0,
            author_id,
            created_at: now,
            updated_at: now,
        };
        self.posts.insert(post.id, post.clone());
        Ok(post)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>> {
        Ok(self.posts.get(&id).map(|r| r.value().clone()))
    }

    async fn list(&self) -> Result<Vec<Post>> {
        let mut posts: Vec<Post> = self.posts.iter().map(|r| r.value().clone()).collect();
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(posts)
    }

    async fn update(&self, id: Uuid, title: &str, content: &str) -> Result<Option<Post>> {
        Ok(self.posts.get_mut(&id).map(|mut post| {
            post.title = title.to_string();
            post.content = content.to_string();
            post.updated_at = Utc::now();
            post.clone()
        }))
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        let removed = self.posts.remove(&id).is_some();
        if removed {
            self.comments.retain(|_, comment| comment.post_id != id);
        }
        Ok(removed)
    }

    async fn increment_view_count(&self, id: Uuid) -> Result<Option<Post>> {
        Ok(self.posts.get_mut(&id).map(|mut post| {
            post.view_count += 1;
            post.clone()
        }))
    }
}

#[async_trait]
impl CommentRepository for MemoryStore {
    async fn create(&self, post_id: Uuid, author_id: Uuid, content: &str) -> Result<Comment> {
        let now = Utc::now();
        let comment = Comment {
            id: Uuid::new_v4(),
            post_id,
            content: content.to_string(),
            author_id,
            created_at: now,
            updated_at: now,
        };
        self.comments.insert(comment.id, comment.clone());
        Ok(comment)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Comment>> {
        Ok(self.comments.get(&id).map(|r| r.value().clone()))
    }

    async fn list_by_post(&self, post_id: Uuid) -> Result<Vec<Comment>> {
        let mut comments: Vec<Comment> = self
            .comments
            .iter()
            .filter(|r| r.value().post_id == post_id)
            .map(|r| r.value().clone())
            .collect();
        comments.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(comments)
    }

    async fn update(&self, id: Uuid, content: &str) -> Result<Option<Comment>> {
        Ok(self.comments.get_mut(&id).map(|mut comment| {
            comment.content = content.to_string();
            comment.updated_at = Utc::now();
            comment.clone()
        }))
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        Ok(self.comments.remove(&id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Role;
    use chrono::Duration;

    fn new_account(email: &str, username: &str) -> NewAccount {
        NewAccount {
            email: email.to_string(),
            username: username.to_string(),
            password_hash: "hash".to_string(),
            role: Role::User,
        }
    }

    #[tokio::test]
    async fn test_account_uniqueness() {
        let store = MemoryStore::new();
        AccountRepository::create(&store, new_account("a@x.com", "alice"))
            .await
            .unwrap();

        let dup_email = AccountRepository::create(&store, new_account("a@x.com", "other"))
            .await
            .unwrap_err();
        assert_eq!(dup_email.code(), 409);

        let dup_name = AccountRepository::create(&store, new_account("b@x.com", "alice"))
            .await
            .unwrap_err();
        assert_eq!(dup_name.code(), 409);

        assert!(store.exists_by_email("a@x.com").await.unwrap());
        assert!(store.exists_by_username("alice").await.unwrap());
        assert!(!store.exists_by_username("bob").await.unwrap());
    }

    #[tokio::test]
    async fn test_upsert_rotates_in_place() {
        let store = MemoryStore::new();
        let account_id = Uuid::new_v4();
        let first_expiry = Utc::now() + Duration::days(1);
        let second_expiry = Utc::now() + Duration::days(2);

        store.upsert(account_id, "first", first_expiry).await.unwrap();
        store.upsert(account_id, "second", second_expiry).await.unwrap();

        assert_eq!(store.refresh_token_rows().await, 1);
        assert!(store.find_by_token("first").await.unwrap().is_none());

        let row = store.find_by_token("second").await.unwrap().unwrap();
        assert_eq!(row.account_id, account_id);
        assert_eq!(row.expires_at, second_expiry);
        assert_eq!(row.token_hash, hash_token("second"));
    }

    #[tokio::test]
    async fn test_upsert_collision_with_other_account_fails() {
        let store = MemoryStore::new();
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();
        let expiry = Utc::now() + Duration::days(1);

        store.upsert(alice, "shared", expiry).await.unwrap();
        let err = store.upsert(bob, "shared", expiry).await.unwrap_err();

        assert_eq!(err.code(), 500);
        // alice's row untouched, bob got nothing
        assert_eq!(store.find_by_token("shared").await.unwrap().unwrap().account_id, alice);
        assert!(store.find_by_account(bob).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_by_account() {
        let store = MemoryStore::new();
        let account_id = Uuid::new_v4();
        store
            .upsert(account_id, "token", Utc::now() + Duration::days(1))
            .await
            .unwrap();

        assert!(store.delete_by_account(account_id).await.unwrap());
        assert!(!store.delete_by_account(account_id).await.unwrap());
        assert!(store.find_by_token("token").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_post_delete_cascades_to_comments() {
        let store = MemoryStore::new();
        let author = Uuid::new_v4();
        let post = PostRepository::create(&store, author, "t", "c").await.unwrap();
        let comment = CommentRepository::create(&store, post.id, author, "hi").await.unwrap();

        assert!(PostRepository::delete(&store, post.id).await.unwrap());
        assert!(CommentRepository::find_by_id(&store, comment.id)
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_view_count_increments() {
        let store = MemoryStore::new();
        let post = PostRepository::create(&store, Uuid::new_v4(), "t", "c").await.unwrap();

        store.increment_view_count(post.id).await.unwrap();
        let post = store.increment_view_count(post.id).await.unwrap().unwrap();
        assert_eq!(post.view_count, 2);

        assert!(store.increment_view_count(Uuid::new_v4()).await.unwrap().is_none());
    }
}
