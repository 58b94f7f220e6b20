// SPDX-License-Identifier: Apache-2.0
// Copyright 2025-2026 Atrium Team
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared application state for health endpoints.
#[derive(Clone)]
pub struct AppState {
    /// Hosted backend health state (true = healthy)
    pub backend_healthy: Arc<AtomicBool>,
    /// Flag indicating if we're shutting down
    pub shutting_down: Arc<AtomicBool>,
}

/// Health check response body.
#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    backend_status: Option<&'static str>,
}

/// Kubernetes liveness probe endpoint.
///
/// Returns 200 OK if the process is alive.
///
/// # Endpoint
/// `GET /health/live`
pub async fn health_live() -> Response {
    let response = HealthResponse {
        status: "ok",
        backend_status: None,
    };
    (StatusCode::OK, Json(response)).into_response()
}

/// Kubernetes readiness probe endpoint.
///
/// Returns 200 OK if the gateway is ready to accept traffic and 503
/// while shutting down. A degraded backend does not fail readiness:
/// cached sessions keep being served and unprotected routes need no
/// backend at all.
///
/// # Endpoint
/// `GET /health/ready`
pub async fn health_ready(State(state): State<AppState>) -> Response {
    if state.shutting_down.load(Ordering::SeqCst) {
        let response = HealthResponse {
            status: "shutting_down",
            backend_status: None,
        };
        return (StatusCode::SERVICE_UNAVAILABLE, Json(response)).into_response();
    }

    let backend_healthy = state.backend_healthy.load(Ordering::SeqCst);
    let backend_status = if backend_healthy { "healthy" } else { "unhealthy" };

    let response = HealthResponse {
        status: if backend_healthy { "ok" } else { "degraded" },
        backend_status: Some(backend_status),
    };

    (StatusCode::OK, Json(response)).into_response()
}

/// Kubernetes startup probe endpoint.
///
/// Returns 200 OK once the gateway has completed initialization.
///
/// # Endpoint
/// `GET /health/startup`
pub async fn health_startup() -> Response {
    let response = HealthResponse {
        status: "ok",
        backend_status: None,
    };
    (StatusCode::OK, Json(response)).into_response()
}
