//! Application state and request tracking middleware

use crate::{
    auth::{Authenticator, JwtService, PasswordHasher},
    config::AppConfig,
    error::AppError,
    repository::Repositories,
    services::{AuthService, CommentService, PostService},
};
use axum::{
    extract::Request,
    http::{HeaderMap, HeaderValue},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use std::time::Instant;
use tracing::Instrument;
use uuid::Uuid;

/// Shared state handed to every handler
///
/// `db` is `None` when running on the in-memory store.
#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub db: Option<sqlx::PgPool>,
    pub repos: Repositories,
    pub jwt_service: Arc<JwtService>,
    pub authenticator: Arc<Authenticator>,
    pub auth_service: Arc<AuthService>,
    pub post_service: Arc<PostService>,
    pub comment_service: Arc<CommentService>,
}

impl AppState {
    /// Wire services onto the given stores
    pub fn new(
        config: AppConfig,
        repos: Repositories,
        db: Option<sqlx::PgPool>,
    ) -> Result<Self, AppError> {
        let jwt_service = Arc::new(JwtService::from_config(&config)?);
        let hasher = Arc::new(PasswordHasher::from_config(&config)?);

        let authenticator = Arc::new(Authenticator::new(
            jwt_service.clone(),
            repos.accounts.clone(),
        ));
        let auth_service = Arc::new(AuthService::new(
            repos.accounts.clone(),
            repos.refresh_tokens.clone(),
            jwt_service.clone(),
            hasher,
        ));
        let post_service = Arc::new(PostService::new(repos.posts.clone()));
        let comment_service = Arc::new(CommentService::new(
            repos.posts.clone(),
            repos.comments.clone(),
        ));

        Ok(Self {
            config,
            db,
            repos,
            jwt_service,
            authenticator,
            auth_service,
            post_service,
            comment_service,
        })
    }
}

/// Per-request span, ids and metrics
pub async fn request_tracking_middleware(req: Request, next: Next) -> Response {
    let trace_id = extract_or_generate_trace_id(req.headers());
    let request_id = Uuid::new_v4().to_string();

    let method = req.method().clone();
    let path = req.uri().path().to_string();

    let span = tracing::info_span!(
        "http_request",
        trace_id = %trace_id,
        request_id = %request_id,
        method = %method,
        path = %path,
    );

    async move {
        let start = Instant::now();
        let mut response = next.run(req).await;
        let elapsed = start.elapsed();

        let status = response.status().as_u16();
        let method_name = match method.as_str() {
            "GET" => "GET",
            "POST" => "POST",
            "PUT" => "PUT",
            "DELETE" => "DELETE",
            "OPTIONS" => "OPTIONS",
            _ => "OTHER",
        };
        let status_class = match status {
            200..=299 => "2xx",
            300..=399 => "3xx",
            400..=499 => "4xx",
            _ => "5xx",
        };

        metrics::counter!("http_requests_total", "method" => method_name, "status" => status_class)
            .increment(1);
        metrics::histogram!("http_request_duration_seconds").record(elapsed.as_secs_f64());

        tracing::info!(
            status = status,
            elapsed_ms = elapsed.as_millis() as u64,
            "Request completed"
        );

        if let Ok(value) = HeaderValue::from_str(&trace_id) {
            response.headers_mut().insert("x-trace-id", value);
        }
        if let Ok(value) = HeaderValue::from_str(&request_id) {
            response.headers_mut().insert("x-request-id", value);
        }

        response
    }
    .instrument(span)
    .await
}

/// Incoming `x-trace-id`, or a fresh one
fn extract_or_generate_trace_id(headers: &HeaderMap) -> String {
    headers
        .get("x-trace-id")
        .and_then(|v| v.to_str().ok())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
        .unwrap_or_else(|| Uuid::new_v4().to_string())
}
