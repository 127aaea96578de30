//! JWT issuance and verification
//! Access and refresh tokens share one claim shape and one HS256 key; they
//! differ only in validity.

use crate::{config::AppConfig, error::AppError, models::Role};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// JWT claims
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Claims {
    /// Subject (account ID)
    pub sub: String,

    /// Granted roles; always exactly one entry when minted here
    pub roles: Vec<Role>,

    /// Issued at (unix seconds)
    pub iat: i64,

    /// Expiration (unix seconds)
    pub exp: i64,

    /// Unique token identifier, keeps tokens minted in the same second distinct
    pub jti: String,
}

impl Claims {
    pub fn account_id(&self) -> Result<Uuid, TokenError> {
        Uuid::parse_str(&self.sub).map_err(|_| TokenError::Invalid)
    }

    pub fn role(&self) -> Option<Role> {
        self.roles.first().copied()
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.exp, 0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Access,
    Refresh,
}

/// Token verification failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TokenError {
    #[error("Invalid JWT token")]
    Invalid,

    #[error("Expired JWT token")]
    Expired,
}

impl From<TokenError> for AppError {
    fn from(e: TokenError) -> Self {
        AppError::Unauthenticated(e.to_string())
    }
}

/// Freshly minted access/refresh pair
#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub refresh_expires_at: DateTime<Utc>,
}

pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    access_validity: Duration,
    refresh_validity: Duration,
}

impl JwtService {
    pub fn from_config(config: &AppConfig) -> Result<Self, AppError> {
        Self::new(
            config.security.jwt_secret.expose_secret().as_bytes(),
            Duration::seconds(config.security.access_token_validity_secs as i64),
            Duration::seconds(config.security.refresh_token_validity_secs as i64),
        )
    }

    pub fn new(
        secret: &[u8],
        access_validity: Duration,
        refresh_validity: Duration,
    ) -> Result<Self, AppError> {
        // HS256 needs at least 256 bits of key material
        if secret.len() < 32 {
            return Err(AppError::Config("JWT secret too short (min 32 bytes)".to_string()));
        }

        // Expiry is checked against a caller-supplied instant in `decode_at`,
        // so the library's wall-clock check is turned off.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "iat", "sub"]);

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            access_validity,
            refresh_validity,
        })
    }

    pub fn validity(&self, kind: TokenKind) -> Duration {
        match kind {
            TokenKind::Access => self.access_validity,
            TokenKind::Refresh => self.refresh_validity,
        }
    }

    /// Mint a signed token for `account_id` valid from `now`
    pub fn issue(
        &self,
        account_id: Uuid,
        role: Role,
        kind: TokenKind,
        now: DateTime<Utc>,
    ) -> Result<String, AppError> {
        let claims = Claims {
            sub: account_id.to_string(),
            roles: vec![role],
            iat: now.timestamp(),
            exp: (now + self.validity(kind)).timestamp(),
            jti: Uuid::new_v4().to_string(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key).map_err(|e| {
            tracing::error!("Failed to encode {:?} token: {:?}", kind, e);
            AppError::Internal(format!("Failed to encode token: {}", e))
        })
    }

    pub fn issue_pair(
        &self,
        account_id: Uuid,
        role: Role,
        now: DateTime<Utc>,
    ) -> Result<TokenPair, AppError> {
        let access_token = self.issue(account_id, role, TokenKind::Access, now)?;
        let refresh_token = self.issue(account_id, role, TokenKind::Refresh, now)?;

        Ok(TokenPair {
            access_token,
            refresh_token,
            refresh_expires_at: now + self.refresh_validity,
        })
    }

    /// Verify against the current time
    pub fn decode(&self, token: &str) -> Result<Claims, TokenError> {
        self.decode_at(token, Utc::now())
    }

    /// Verify signature and structure, then expiry as of `now`
    pub fn decode_at(&self, token: &str, now: DateTime<Utc>) -> Result<Claims, TokenError> {
        let claims = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| {
                tracing::debug!("Token validation failed: {:?}", e.kind());
                TokenError::Invalid
            })?
            .claims;

        claims.account_id()?;

        if now.timestamp() >= claims.exp {
            return Err(TokenError::Expired);
        }

        Ok(claims)
    }

    pub fn is_valid(&self, token: &str) -> bool {
        self.decode(token).is_ok()
    }
}
