//! Authentication gate
//!
//! Runs once per request. It never rejects on its own: the outcome is stored
//! in the request extensions as an [`AuthContext`], and the operation that
//! actually needs an identity turns a missing or failed authentication into
//! a 401.

use crate::{
    auth::jwt::{JwtService, TokenError},
    error::AppError,
    middleware::AppState,
    models::Role,
    repository::AccountRepository,
};
use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};
use std::{convert::Infallible, sync::Arc};
use thiserror::Error;
use uuid::Uuid;

/// Paths that never attempt token decoding
pub const GATE_BYPASS_PREFIXES: &[&str] = &[
    "/api/auth/signup",
    "/api/auth/login",
    "/api/auth/refresh",
    "/swagger-ui",
    "/v3/api-docs",
];

pub fn bypasses_gate(path: &str) -> bool {
    GATE_BYPASS_PREFIXES
        .iter()
        .any(|prefix| path.starts_with(prefix))
}

/// Caller identity for one request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub account_id: Uuid,
    pub email: String,
    pub role: Role,
}

/// Why a presented bearer token did not yield a principal
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthFailure {
    #[error(transparent)]
    Token(#[from] TokenError),

    #[error("Account no longer exists")]
    UnknownAccount,

    #[error("Could not resolve account")]
    Lookup,
}

/// Outcome of the authentication gate
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthContext {
    /// No bearer token was presented, or the path bypasses the gate
    Anonymous,
    Authenticated(Principal),
    /// A token was presented but failed; kept so the rejection can explain why
    Rejected(AuthFailure),
}

impl AuthContext {
    /// The principal, or the 401 that an identity-requiring operation must raise
    pub fn principal(&self) -> Result<&Principal, AppError> {
        match self {
            AuthContext::Authenticated(principal) => Ok(principal),
            AuthContext::Anonymous => Err(AppError::unauthenticated("Login required")),
            AuthContext::Rejected(failure) => Err(AppError::Unauthenticated(failure.to_string())),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, AuthContext::Authenticated(_))
    }
}

impl<S> FromRequestParts<S> for AuthContext
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts
            .extensions
            .get::<AuthContext>()
            .cloned()
            .unwrap_or(AuthContext::Anonymous))
    }
}

/// Extractor for operations that need a caller identity
///
/// Rejects with the context's 401 before any later extractor reads the path
/// or body, so an anonymous caller never learns how its input would fare.
pub struct RequireAuth(pub AuthContext);

impl<S> FromRequestParts<S> for RequireAuth
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let context = match AuthContext::from_request_parts(parts, state).await {
            Ok(context) => context,
            Err(never) => match never {},
        };
        context.principal()?;
        Ok(Self(context))
    }
}

/// Bearer token from the `Authorization` header; the scheme is case-sensitive
pub fn extract_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Resolves bearer tokens to principals
pub struct Authenticator {
    jwt_service: Arc<JwtService>,
    accounts: Arc<dyn AccountRepository>,
}

impl Authenticator {
    pub fn new(jwt_service: Arc<JwtService>, accounts: Arc<dyn AccountRepository>) -> Self {
        Self {
            jwt_service,
            accounts,
        }
    }

    pub async fn authenticate(&self, headers: &HeaderMap) -> AuthContext {
        let Some(token) = extract_token(headers) else {
            return AuthContext::Anonymous;
        };

        match self.resolve(token).await {
            Ok(principal) => AuthContext::Authenticated(principal),
            Err(failure) => {
                tracing::debug!(reason = %failure, "Bearer token rejected");
                AuthContext::Rejected(failure)
            }
        }
    }

    async fn resolve(&self, token: &str) -> Result<Principal, AuthFailure> {
        let claims = self.jwt_service.decode(token)?;
        let account_id = claims.account_id()?;

        let account = self
            .accounts
            .find_by_id(account_id)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Account lookup failed during authentication");
                AuthFailure::Lookup
            })?
            .ok_or(AuthFailure::UnknownAccount)?;

        Ok(Principal {
            account_id: account.id,
            email: account.email,
            role: account.role,
        })
    }
}

/// Gate middleware; records an [`AuthContext`] on every request it does not bypass
pub async fn authentication_gate(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Response {
    if !bypasses_gate(req.uri().path()) {
        let context = state.authenticator.authenticate(req.headers()).await;
        req.extensions_mut().insert(context);
    }

    next.run(req).await
}
