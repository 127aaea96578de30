//! Authentication request/response models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::not_blank;

/// Sign-up request
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SignUpRequest {
    #[validate(email(message = "must be a well-formed email address"))]
    pub email: String,

    #[validate(
        length(min = 2, max = 20, message = "must be between 2 and 20 characters"),
        custom(function = "not_blank")
    )]
    pub username: String,

    #[validate(
        length(min = 6, message = "must be at least 6 characters"),
        must_match(other = "pwd_confirm", message = "Passwords do not match")
    )]
    pub password: String,

    pub pwd_confirm: String,
}

/// Login request
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "must be a well-formed email address"))]
    pub email: String,

    #[validate(length(min = 1, message = "must not be empty"))]
    pub password: String,
}

/// Token refresh request
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RefreshTokenRequest {
    #[validate(length(min = 1, message = "must not be empty"))]
    pub refresh_token: String,
}

/// Stored refresh token; one row per account, rotated in place
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct RefreshToken {
    pub account_id: Uuid,
    /// SHA-256 hex digest of the token string
    pub token_hash: String,
    pub expires_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl RefreshToken {
    /// Lazy expiry: only checked when a token is presented
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// Token pair returned by login and refresh
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
}
