//! Health check endpoints

use std::future::Future;
use std::time::Instant;

use axum::{extract::State, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use tracing::warn;

use crate::api::types::Json;
use crate::domain::DomainError;

use super::state::AppState;

/// Detailed health response with component status
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: HealthStatus,
    pub version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checks: Option<Vec<HealthCheck>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<u64>,
}

/// Health check status
#[derive(Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Unhealthy,
}

/// Individual component health check
#[derive(Serialize)]
pub struct HealthCheck {
    pub name: String,
    pub status: HealthStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<u64>,
}

/// Liveness: 200 while the process is serving
pub async fn health_check() -> impl IntoResponse {
    let response = HealthResponse {
        status: HealthStatus::Healthy,
        version: env!("CARGO_PKG_VERSION").to_string(),
        checks: None,
        latency_ms: None,
    };

    (StatusCode::OK, Json(response))
}

/// Readiness check: both stores answer a read
pub async fn ready_check(State(state): State<AppState>) -> impl IntoResponse {
    let start = Instant::now();

    let checks = vec![
        run_check("key_store", state.auth.health_check()).await,
        run_check("task_store", state.tasks.health_check()).await,
    ];

    let overall_status = if checks.iter().all(|c| c.status == HealthStatus::Healthy) {
        HealthStatus::Healthy
    } else {
        HealthStatus::Unhealthy
    };

    let response = HealthResponse {
        status: overall_status,
        version: env!("CARGO_PKG_VERSION").to_string(),
        checks: Some(checks),
        latency_ms: Some(start.elapsed().as_millis() as u64),
    };

    let status_code = match overall_status {
        HealthStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
        _ => StatusCode::OK,
    };

    (status_code, Json(response))
}

async fn run_check(
    name: &str,
    check: impl Future<Output = Result<bool, DomainError>>,
) -> HealthCheck {
    let start = Instant::now();
    let result = check.await;
    let latency_ms = Some(start.elapsed().as_millis() as u64);

    match result {
        Ok(true) => HealthCheck {
            name: name.to_string(),
            status: HealthStatus::Healthy,
            message: None,
            latency_ms,
        },
        Ok(false) => {
            warn!(check = name, "Readiness check reported unhealthy");
            HealthCheck {
                name: name.to_string(),
                status: HealthStatus::Unhealthy,
                message: Some("unavailable".to_string()),
                latency_ms,
            }
        }
        Err(e) => {
            warn!(check = name, error = %e, "Readiness check failed");
            HealthCheck {
                name: name.to_string(),
                status: HealthStatus::Unhealthy,
                message: Some("unavailable".to_string()),
                latency_ms,
            }
        }
    }
}
