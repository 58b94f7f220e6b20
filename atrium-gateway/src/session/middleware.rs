//! Session Middleware
//!
//! Axum middleware for backend session resolution.
//!
//! Features:
//! - Extract bearer token from the Authorization header
//! - Resolve the token to a dashboard user via the session client
//! - Inject the session user into request extensions
//! - Optional mode for public endpoints

use axum::{
    body::Body,
    extract::{FromRequestParts, State},
    http::{header::AUTHORIZATION, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, warn};

use super::client::{SessionClient, SessionError};
use super::user::SessionUser;

// =============================================================================
// Session State
// =============================================================================

/// Session state shared across handlers.
#[derive(Clone)]
pub struct SessionState {
    /// Backend session client
    pub client: Arc<SessionClient>,

    /// Whether a session is required (false = optional)
    pub required: bool,
}

impl SessionState {
    /// Create a new session state requiring authentication.
    pub fn new(client: Arc<SessionClient>) -> Self {
        Self {
            client,
            required: true,
        }
    }

    /// Create with optional authentication.
    pub fn optional(client: Arc<SessionClient>) -> Self {
        Self {
            client,
            required: false,
        }
    }
}

// =============================================================================
// Guard Error Response
// =============================================================================

/// Access error response body shared by the session middleware and the
/// route guard.
#[derive(Debug, Serialize)]
pub struct GuardError {
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl GuardError {
    pub fn unauthorized(message: &str) -> Self {
        Self {
            error: "unauthorized".to_string(),
            message: message.to_string(),
            details: None,
        }
    }

    pub fn forbidden(message: &str) -> Self {
        Self {
            error: "forbidden".to_string(),
            message: message.to_string(),
            details: None,
        }
    }

    pub fn bad_gateway(message: &str) -> Self {
        Self {
            error: "bad_gateway".to_string(),
            message: message.to_string(),
            details: None,
        }
    }
}

impl IntoResponse for GuardError {
    fn into_response(self) -> Response {
        let status = match self.error.as_str() {
            "forbidden" => StatusCode::FORBIDDEN,
            "bad_gateway" => StatusCode::BAD_GATEWAY,
            _ => StatusCode::UNAUTHORIZED,
        };

        (status, Json(self)).into_response()
    }
}

// =============================================================================
// Session Middleware
// =============================================================================

/// Backend session middleware.
///
/// Resolves the bearer token from the Authorization header. If valid,
/// injects `SessionUser` into request extensions. A present-but-invalid
/// token is always rejected, even in optional mode; only the absence of
/// a token is tolerated there.
pub async fn session_middleware(
    State(state): State<SessionState>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, GuardError> {
    let auth_header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok());

    match auth_header {
        Some(header) => {
            let token = SessionClient::extract_token(header)
                .map_err(|e| GuardError::unauthorized(&e.to_string()))?;

            let user = state.client.resolve(token).await.map_err(|e| {
                warn!(error = %e, "session resolution failed");
                match e {
                    SessionError::Backend(_) => {
                        GuardError::bad_gateway("Session backend unavailable")
                    }
                    SessionError::Rejected { .. } => {
                        GuardError::unauthorized("Session rejected")
                    }
                    _ => GuardError::unauthorized(&e.to_string()),
                }
            })?;

            debug!(
                user_id = %user.id,
                role = %user.role,
                "session established"
            );

            // Inject user into request extensions
            request.extensions_mut().insert(user);
        }
        None => {
            if state.required {
                return Err(GuardError::unauthorized("Missing Authorization header"));
            }
            // Optional session: continue anonymous, the route guard
            // decides whether this path needs one.
            debug!("no auth header, continuing as anonymous");
        }
    }

    Ok(next.run(request).await)
}

/// Optional session middleware (continues if no token).
pub async fn optional_session(
    State(state): State<SessionState>,
    request: Request<Body>,
    next: Next,
) -> Result<Response, GuardError> {
    let state = SessionState {
        client: state.client,
        required: false,
    };
    session_middleware(State(state), request, next).await
}

// =============================================================================
// Sign-out
// =============================================================================

/// Sign-out endpoint.
///
/// Revokes the caller's token upstream and drops it from the session
/// cache.
///
/// # Endpoint
/// `POST /auth/signout`
pub async fn signout(
    State(state): State<SessionState>,
    CurrentUser(user): CurrentUser,
) -> Response {
    match state.client.revoke(&user.raw_token).await {
        Ok(()) => {
            debug!(user_id = %user.id, "user signed out");
            StatusCode::NO_CONTENT.into_response()
        }
        Err(e) => {
            warn!(user_id = %user.id, error = %e, "sign-out failed upstream");
            GuardError::bad_gateway("Failed to revoke session").into_response()
        }
    }
}

// =============================================================================
// Extractors
// =============================================================================

/// Extractor for the session user.
///
/// Use this in handler parameters to get the authenticated user:
/// ```ignore
/// async fn handler(CurrentUser(user): CurrentUser) -> impl IntoResponse {
///     format!("Hello, {}", user.id)
/// }
/// ```
#[derive(Debug, Clone)]
pub struct CurrentUser(pub SessionUser);

#[axum::async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = GuardError;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<SessionUser>()
            .cloned()
            .map(CurrentUser)
            .ok_or_else(|| GuardError::unauthorized("No active session"))
    }
}

/// Optional extractor for the session user.
///
/// Returns None when the request is anonymous.
#[derive(Debug, Clone)]
pub struct OptionalUser(pub Option<SessionUser>);

#[axum::async_trait]
impl<S> FromRequestParts<S> for OptionalUser
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        Ok(OptionalUser(parts.extensions.get::<SessionUser>().cloned()))
    }
}

// =============================================================================
// Tests
// =============================================================================
