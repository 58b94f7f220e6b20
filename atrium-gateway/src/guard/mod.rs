// SPDX-License-Identifier: Apache-2.0
// Copyright 2025-2026 Atrium Team
//! Route Guard
//!
//! Axum middleware enforcing the dashboard's role/route rules on every
//! request. The guard asks the access evaluator which role (if any) the
//! requested path needs, and only lets the request through to the
//! upstream dashboard when the session's role satisfies it.
//!
//! Decisions on protected routes are counted in metrics and recorded in
//! the audit log; unprotected traffic passes through untouched.

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};

use atrium_access::policy::AccessEvaluator;

use crate::audit::{AuditEvent, AuditHandle};
use crate::metrics::Metrics;
use crate::session::{GuardError, SessionUser};

// =============================================================================
// Guard State
// =============================================================================

/// State shared by the route guard middleware.
#[derive(Clone)]
pub struct GuardState {
    /// Access evaluator with the loaded route rules
    pub evaluator: Arc<AccessEvaluator>,

    /// Metrics registry
    pub metrics: Metrics,

    /// Audit event sink
    pub audit: AuditHandle,
}

impl GuardState {
    /// Create a new guard state.
    pub fn new(evaluator: Arc<AccessEvaluator>, metrics: Metrics, audit: AuditHandle) -> Self {
        Self {
            evaluator,
            metrics,
            audit,
        }
    }

    fn record_audit(&self, event: AuditEvent) {
        if self.audit.record(event) {
            self.metrics.record_audit("enqueued");
        } else {
            self.metrics.record_audit("dropped");
        }
    }
}

// =============================================================================
// Guard Middleware
// =============================================================================

/// Role/route guard middleware.
///
/// Must run after the session middleware so an authenticated caller is
/// already present in request extensions.
pub async fn route_guard(
    State(state): State<GuardState>,
    request: Request<Body>,
    next: Next,
) -> Result<Response, GuardError> {
    let path = request.uri().path().to_string();
    let method = request.method().to_string();
    let user = request.extensions().get::<SessionUser>().cloned();

    let required = state.evaluator.required_role(&path);
    let route_class = required.map(|r| r.as_str()).unwrap_or("public");

    if let Some(required) = required {
        match &user {
            None => {
                warn!(path = %path, required = %required, "anonymous request on protected route");
                state.metrics.record_decision("deny", required.as_str());
                state.record_audit(AuditEvent::denied(None, &method, &path, required));
                return Err(GuardError::unauthorized("Authentication required"));
            }
            Some(user) if !user.role.satisfies(required) => {
                warn!(
                    user_id = %user.id,
                    role = %user.role,
                    required = %required,
                    path = %path,
                    "insufficient role"
                );
                state.metrics.record_decision("deny", required.as_str());
                state.record_audit(AuditEvent::denied(Some(user), &method, &path, required));
                return Err(GuardError::forbidden("Insufficient role"));
            }
            Some(user) => {
                debug!(
                    user_id = %user.id,
                    role = %user.role,
                    required = %required,
                    path = %path,
                    "access granted"
                );
                state.metrics.record_decision("allow", required.as_str());
                state.record_audit(AuditEvent::allowed(user, &method, &path, required));
            }
        }
    }

    let start = Instant::now();
    let response = next.run(request).await;
    state
        .metrics
        .record_request(route_class, start.elapsed(), response.status().as_u16());

    Ok(response)
}

// =============================================================================
// Tests
// =============================================================================
