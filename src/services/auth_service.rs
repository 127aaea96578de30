//! Account service: sign-up, login, token refresh and logout

use crate::{
    auth::{AuthContext, JwtService, PasswordHasher, TokenPair},
    error::AppError,
    models::{
        AccountResponse, LoginRequest, NewAccount, RefreshTokenRequest, Role, SignUpRequest,
        TokenResponse,
    },
    repository::{AccountRepository, RefreshTokenRepository},
};
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

const BAD_CREDENTIALS: &str = "Email or password does not match";

pub struct AuthService {
    accounts: Arc<dyn AccountRepository>,
    refresh_tokens: Arc<dyn RefreshTokenRepository>,
    jwt_service: Arc<JwtService>,
    hasher: Arc<PasswordHasher>,
}

impl AuthService {
    pub fn new(
        accounts: Arc<dyn AccountRepository>,
        refresh_tokens: Arc<dyn RefreshTokenRepository>,
        jwt_service: Arc<JwtService>,
        hasher: Arc<PasswordHasher>,
    ) -> Self {
        Self {
            accounts,
            refresh_tokens,
            jwt_service,
            hasher,
        }
    }

    /// Register a new USER account and return its id
    pub async fn signup(&self, req: SignUpRequest) -> Result<Uuid, AppError> {
        if self.accounts.exists_by_email(&req.email).await? {
            return Err(AppError::conflict("Email is already registered"));
        }
        if self.accounts.exists_by_username(&req.username).await? {
            return Err(AppError::conflict("Username is already taken"));
        }

        let password_hash = self.hasher.hash(&req.password)?;

        // the store re-checks uniqueness, so a concurrent duplicate still ends in Conflict
        let account = self
            .accounts
            .create(NewAccount {
                email: req.email,
                username: req.username,
                password_hash,
                role: Role::User,
            })
            .await?;

        tracing::info!(account_id = %account.id, "Account registered");

        Ok(account.id)
    }

    /// Verify credentials and issue a fresh token pair
    pub async fn login(&self, req: LoginRequest) -> Result<TokenResponse, AppError> {
        let account = match self.accounts.find_by_email(&req.email).await? {
            Some(account) if self.hasher.matches(&req.password, &account.password_hash) => account,
            Some(account) => {
                tracing::info!(account_id = %account.id, "Login rejected: password mismatch");
                return Err(AppError::unauthenticated(BAD_CREDENTIALS));
            }
            None => {
                self.hasher.verify_dummy(&req.password);
                tracing::info!("Login rejected: unknown email");
                return Err(AppError::unauthenticated(BAD_CREDENTIALS));
            }
        };

        let pair = self.jwt_service.issue_pair(account.id, account.role, Utc::now())?;
        self.store_refresh_token(account.id, &pair).await?;

        tracing::info!(account_id = %account.id, "Login succeeded");

        Ok(TokenResponse {
            access_token: pair.access_token,
            refresh_token: pair.refresh_token,
        })
    }

    /// Exchange a stored refresh token for a new pair; the old value stops working
    pub async fn refresh(&self, req: RefreshTokenRequest) -> Result<TokenResponse, AppError> {
        let now = Utc::now();
        let claims = self.jwt_service.decode_at(&req.refresh_token, now)?;
        let account_id = claims.account_id()?;

        let stored = self
            .refresh_tokens
            .find_by_token(&req.refresh_token)
            .await?
            .ok_or_else(|| {
                tracing::info!(%account_id, "Refresh rejected: token not on record");
                AppError::unauthenticated("Refresh token is not recognized")
            })?;

        if stored.account_id != account_id {
            tracing::warn!(
                %account_id,
                owner_id = %stored.account_id,
                "Refresh rejected: subject does not own the stored token"
            );
            return Err(AppError::unauthenticated("Refresh token is not recognized"));
        }

        if stored.is_expired(now) {
            self.refresh_tokens.delete_by_account(account_id).await?;
            tracing::info!(%account_id, "Refresh rejected: stored token expired");
            return Err(AppError::unauthenticated("Expired JWT token"));
        }

        let account = self
            .accounts
            .find_by_id(account_id)
            .await?
            .ok_or_else(|| AppError::unauthenticated("Account no longer exists"))?;

        let pair = self.jwt_service.issue_pair(account.id, account.role, now)?;
        self.store_refresh_token(account.id, &pair).await?;

        tracing::debug!(%account_id, "Refresh token rotated");

        Ok(TokenResponse {
            access_token: pair.access_token,
            refresh_token: pair.refresh_token,
        })
    }

    /// Drop the caller's refresh token. Access tokens stay valid until expiry.
    pub async fn logout(&self, auth: &AuthContext) -> Result<(), AppError> {
        let principal = auth.principal()?;
        let removed = self
            .refresh_tokens
            .delete_by_account(principal.account_id)
            .await?;

        tracing::info!(account_id = %principal.account_id, removed, "Logged out");

        Ok(())
    }

    /// Profile of the authenticated caller
    pub async fn me(&self, auth: &AuthContext) -> Result<AccountResponse, AppError> {
        let principal = auth.principal()?;
        let account = self
            .accounts
            .find_by_id(principal.account_id)
            .await?
            .ok_or_else(|| AppError::unauthenticated("Account no longer exists"))?;

        Ok(AccountResponse::from(account))
    }

    async fn store_refresh_token(&self, account_id: Uuid, pair: &TokenPair) -> Result<(), AppError> {
        self.refresh_tokens
            .upsert(account_id, &pair.refresh_token, pair.refresh_expires_at)
            .await
    }
}
