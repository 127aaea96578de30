//! Account repository (Postgres)

use crate::{
    db::is_unique_violation,
    error::{AppError, Result},
    models::{Account, NewAccount, Role},
    repository::AccountRepository,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

/// Row shape; `role` is stored as text
#[derive(sqlx::FromRow)]
struct AccountRow {
    id: Uuid,
    email: String,
    username: String,
    password_hash: String,
    role: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<AccountRow> for Account {
    fn from(row: AccountRow) -> Self {
        Self {
            id: row.id,
            email: row.email,
            username: row.username,
            password_hash: row.password_hash,
            role: Role::from(row.role),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

pub struct PgAccountRepository {
    db: PgPool,
}

impl PgAccountRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl AccountRepository for PgAccountRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Account>> {
        let row = sqlx::query_as::<_, AccountRow>("SELECT * FROM accounts WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.db)
            .await?;

        Ok(row.map(Account::from))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Account>> {
        let row = sqlx::query_as::<_, AccountRow>("SELECT * FROM accounts WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.db)
            .await?;

        Ok(row.map(Account::from))
    }

    async fn exists_by_email(&self, email: &str) -> Result<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM accounts WHERE email = $1)")
                .bind(email)
                .fetch_one(&self.db)
                .await?;

        Ok(exists)
    }

    async fn exists_by_username(&self, username: &str) -> Result<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM accounts WHERE username = $1)")
                .bind(username)
                .fetch_one(&self.db)
                .await?;

        Ok(exists)
    }

    async fn create(&self, account: NewAccount) -> Result<Account> {
        let row = sqlx::query_as::<_, AccountRow>(
            r#"
            INSERT INTO accounts (id, email, username, password_hash, role)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&account.email)
        .bind(&account.username)
        .bind(&account.password_hash)
        .bind(account.role.as_str())
        .fetch_one(&self.db)
        .await
        .map_err(|e| {
            // a concurrent sign-up can slip past the service's existence checks
            if is_unique_violation(&e, "accounts_email_key") {
                AppError::conflict("Email is already registered")
            } else if is_unique_violation(&e, "accounts_username_key") {
                AppError::conflict("Username is already taken")
            } else {
                AppError::Database(e)
            }
        })?;

        Ok(row.into())
    }
}
