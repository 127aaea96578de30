//! Health handlers: `/`, `/api/health` and `/api/ready`

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;
use std::sync::{Arc, OnceLock};
use std::time::Instant;

use crate::{db, middleware::AppState};

static APP_START_TIME: OnceLock<Instant> = OnceLock::new();

/// Record process start; later calls are no-ops
pub fn set_start_time() {
    APP_START_TIME.get_or_init(Instant::now);
}

pub fn get_uptime() -> u64 {
    APP_START_TIME
        .get()
        .map_or(0, |start| start.elapsed().as_secs())
}

/// Liveness response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub message: String,
    pub version: &'static str,
    pub uptime_secs: u64,
}

#[derive(Serialize)]
pub struct ReadinessResponse {
    pub ready: bool,
    pub checks: Vec<HealthCheck>,
}

#[derive(Serialize)]
pub struct HealthCheck {
    pub name: String,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

pub async fn root() -> &'static str {
    "Board API is running"
}

/// Liveness; does not touch dependencies
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "UP",
        message: "Service is healthy".to_string(),
        version: env!("CARGO_PKG_VERSION"),
        uptime_secs: get_uptime(),
    })
}

/// Readiness; 503 when the database is unreachable
pub async fn readiness_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let mut checks = Vec::new();

    match &state.db {
        Some(pool) => {
            let db_health = db::health_check(pool).await;
            checks.push(HealthCheck {
                name: "database".to_string(),
                status: match &db_health {
                    db::HealthStatus::Healthy => "healthy".to_string(),
                    db::HealthStatus::Unhealthy(_) => "unhealthy".to_string(),
                },
                message: match db_health {
                    db::HealthStatus::Healthy => None,
                    db::HealthStatus::Unhealthy(msg) => Some(msg),
                },
            });
        }
        None => checks.push(HealthCheck {
            name: "database".to_string(),
            status: "healthy".to_string(),
            message: Some("in-memory store".to_string()),
        }),
    }

    let ready = checks.iter().all(|c| c.status == "healthy");
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status, Json(ReadinessResponse { ready, checks }))
}
