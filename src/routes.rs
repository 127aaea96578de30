//! Route table and middleware stack

use axum::{
    http::{header, HeaderValue, Method},
    routing::{get, post, put},
    Router,
};
use std::{sync::Arc, time::Duration};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    limit::RequestBodyLimitLayer,
    trace::TraceLayer,
};

use crate::{auth::authentication_gate, config::CorsConfig, handlers, middleware::AppState};

pub fn create_router(state: Arc<AppState>) -> Router {
    let public_routes = Router::new()
        .route("/", get(handlers::health::root))
        .route("/api/health", get(handlers::health::health_check))
        .route("/api/ready", get(handlers::health::readiness_check));

    let auth_routes = Router::new()
        .route("/api/auth/signup", post(handlers::auth::signup))
        .route("/api/auth/login", post(handlers::auth::login))
        .route("/api/auth/refresh", post(handlers::auth::refresh))
        .route("/api/auth/logout", post(handlers::auth::logout))
        .route("/api/auth/me", get(handlers::auth::me));

    // reads are open; mutations ask the AuthContext for a principal
    let board_routes = Router::new()
        .route(
            "/api/posts",
            get(handlers::post::list_posts).post(handlers::post::create_post),
        )
        .route(
            "/api/posts/{id}",
            get(handlers::post::get_post)
                .put(handlers::post::update_post)
                .delete(handlers::post::delete_post),
        )
        .route(
            "/api/posts/{id}/comments",
            get(handlers::comment::list_comments).post(handlers::comment::add_comment),
        )
        .route(
            "/api/posts/{id}/comments/{comment_id}",
            put(handlers::comment::update_comment).delete(handlers::comment::delete_comment),
        );

    Router::new()
        .merge(public_routes)
        .merge(auth_routes)
        .merge(board_routes)
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            authentication_gate,
        ))
        .layer(RequestBodyLimitLayer::new(state.config.server.max_body_bytes))
        .layer(cors_layer(&state.config.cors))
        .layer(TraceLayer::new_for_http())
        .layer(axum::middleware::from_fn(crate::middleware::request_tracking_middleware))
        .with_state(state)
}

fn cors_layer(config: &CorsConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(%origin, "Ignoring unparsable CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_credentials(true)
        .max_age(Duration::from_secs(config.max_age_secs))
}
