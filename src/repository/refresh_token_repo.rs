//! Refresh token repository (Postgres)

use crate::{
    db::is_unique_violation,
    error::{AppError, Result},
    models::RefreshToken,
    repository::RefreshTokenRepository,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use sqlx::PgPool;
use uuid::Uuid;

/// Tokens are stored as SHA-256 hex digests, never in the clear
pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}

pub struct PgRefreshTokenRepository {
    db: PgPool,
}

impl PgRefreshTokenRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl RefreshTokenRepository for PgRefreshTokenRepository {
    async fn upsert(&self, account_id: Uuid, token: &str, expires_at: DateTime<Utc>) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO refresh_tokens (account_id, token_hash, expires_at, updated_at)
            VALUES ($1, $2, $3, NOW())
            ON CONFLICT (account_id) DO UPDATE
            SET token_hash = EXCLUDED.token_hash,
                expires_at = EXCLUDED.expires_at,
                updated_at = NOW()
            "#,
        )
        .bind(account_id)
        .bind(hash_token(token))
        .bind(expires_at)
        .execute(&self.db)
        .await
        .map_err(|e| {
            if is_unique_violation(&e, "refresh_tokens_token_hash_key") {
                tracing::error!(%account_id, "Refresh token collides with another account's token");
                AppError::Internal("Refresh token collision".to_string())
            } else {
                AppError::Database(e)
            }
        })?;

        Ok(())
    }

    async fn find_by_token(&self, token: &str) -> Result<Option<RefreshToken>> {
        let row = sqlx::query_as::<_, RefreshToken>(
            "SELECT account_id, token_hash, expires_at, updated_at FROM refresh_tokens WHERE token_hash = $1",
        )
        .bind(hash_token(token))
        .fetch_optional(&self.db)
        .await?;

        Ok(row)
    }

    async fn find_by_account(&self, account_id: Uuid) -> Result<Option<RefreshToken>> {
        let row = sqlx::query_as::<_, RefreshToken>(
            "SELECT account_id, token_hash, expires_at, updated_at FROM refresh_tokens WHERE account_id = $1",
        )
        .bind(account_id)
        .fetch_optional(&self.db)
        .await?;

        Ok(row)
    }

    async fn delete_by_account(&self, account_id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM refresh_tokens WHERE account_id = $1")
            .bind(account_id)
            .execute(&self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
