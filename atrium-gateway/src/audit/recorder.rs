use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, info, warn};

use atrium_access::role::Role;

use crate::session::SessionUser;

// =============================================================================
// Errors
// =============================================================================

#[derive(Debug, Error)]
pub enum AuditError {
    #[error("audit request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("audit sink rejected event: {status}")]
    Rejected { status: u16 },
}

// =============================================================================
// Audit Event
// =============================================================================

/// Outcome recorded for an audited request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AuditDecision {
    Allow,
    Deny,
}

/// A single audit record for a request that touched a protected route.
#[derive(Debug, Clone, Serialize)]
pub struct AuditEvent {
    /// Acting user, absent for anonymous denials
    pub actor_id: Option<String>,

    /// Acting user's role at decision time
    pub actor_role: Option<Role>,

    /// HTTP method of the request
    pub method: String,

    /// Requested pathname
    pub path: String,

    /// Role the route required
    pub required_role: Role,

    /// Whether the request was allowed through
    pub decision: AuditDecision,

    /// When the decision was made
    pub occurred_at: DateTime<Utc>,
}

impl AuditEvent {
    /// Event for an allowed request on a protected route.
    pub fn allowed(user: &SessionUser, method: &str, path: &str, required: Role) -> Self {
        Self {
            actor_id: Some(user.id.clone()),
            actor_role: Some(user.role),
            method: method.to_string(),
            path: path.to_string(),
            required_role: required,
            decision: AuditDecision::Allow,
            occurred_at: Utc::now(),
        }
    }

    /// Event for a denied request, anonymous or not.
    pub fn denied(user: Option<&SessionUser>, method: &str, path: &str, required: Role) -> Self {
        Self {
            actor_id: user.map(|u| u.id.clone()),
            actor_role: user.map(|u| u.role),
            method: method.to_string(),
            path: path.to_string(),
            required_role: required,
            decision: AuditDecision::Deny,
            occurred_at: Utc::now(),
        }
    }
}

// =============================================================================
// Audit Handle
// =============================================================================

/// Cheap, cloneable handle for enqueueing audit events.
#[derive(Clone)]
pub struct AuditHandle {
    tx: Option<mpsc::Sender<AuditEvent>>,
    dropped: Arc<AtomicU64>,
}

impl AuditHandle {
    /// A handle that swallows every event (audit disabled, tests).
    pub fn disabled() -> Self {
        Self {
            tx: None,
            dropped: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Enqueue an event without blocking.
    ///
    /// Returns false when the event had to be dropped because the
    /// channel is full or the recorder has stopped.
    pub fn record(&self, event: AuditEvent) -> bool {
        let Some(tx) = &self.tx else {
            return true;
        };

        match tx.try_send(event) {
            Ok(()) => true,
            Err(e) => {
                let count = self.dropped.fetch_add(1, Ordering::Relaxed) + 1;
                warn!(total_dropped = count, error = %e, "audit event dropped");
                false
            }
        }
    }

    /// Total number of events dropped so far.
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}

// =============================================================================
// Audit Recorder
// =============================================================================

/// Background task draining the audit channel into the backend.
pub struct AuditRecorder {
    rx: mpsc::Receiver<AuditEvent>,
    client: reqwest::Client,
    endpoint: String,
    service_key: Option<String>,
}

impl AuditRecorder {
    /// Create a recorder and its enqueueing handle.
    ///
    /// # Arguments
    /// * `backend_url` - Base URL of the hosted backend
    /// * `service_key` - Service key authorizing audit inserts
    /// * `buffer` - Channel capacity before events get dropped
    pub fn new(
        backend_url: &str,
        service_key: Option<String>,
        buffer: usize,
    ) -> (AuditHandle, AuditRecorder) {
        let (tx, rx) = mpsc::channel(buffer);

        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .expect("Failed to create HTTP client");

        let handle = AuditHandle {
            tx: Some(tx),
            dropped: Arc::new(AtomicU64::new(0)),
        };

        let recorder = AuditRecorder {
            rx,
            client,
            endpoint: format!("{}/rest/v1/audit_log", backend_url),
            service_key,
        };

        (handle, recorder)
    }

    /// Run the recorder loop until shutdown, then drain what is queued.
    pub async fn run(mut self, mut shutdown: broadcast::Receiver<()>) {
        info!(endpoint = %self.endpoint, "starting audit recorder");

        loop {
            tokio::select! {
                maybe_event = self.rx.recv() => {
                    match maybe_event {
                        Some(event) => self.post(&event).await,
                        None => break,
                    }
                }
                _ = shutdown.recv() => {
                    debug!("audit recorder draining before shutdown");
                    while let Ok(event) = self.rx.try_recv() {
                        self.post(&event).await;
                    }
                    break;
                }
            }
        }

        info!("audit recorder stopped");
    }

    async fn post(&self, event: &AuditEvent) {
        if let Err(e) = self.try_post(event).await {
            warn!(
                path = %event.path,
                error = %e,
                "failed to persist audit event"
            );
        }
    }

    async fn try_post(&self, event: &AuditEvent) -> Result<(), AuditError> {
        let mut request = self.client.post(&self.endpoint).json(event);

        if let Some(key) = &self.service_key {
            request = request.header("apikey", key).bearer_auth(key);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(AuditError::Rejected {
                status: status.as_u16(),
            });
        }

        debug!(path = %event.path, decision = ?event.decision, "audit event persisted");
        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::user::{UserMetadata, UserRecord};

    fn make_user(role: &str) -> SessionUser {
        SessionUser::from_record(
            UserRecord {
                id: "user-1".to_string(),
                email: None,
                user_metadata: UserMetadata {
                    username: None,
                    role: Some(role.to_string()),
                },
            },
            "tok".to_string(),
        )
        .unwrap()
    }

    #[test]
    fn test_disabled_handle_swallows_events() {
        let handle = AuditHandle::disabled();
        let user = make_user("admin");
        assert!(handle.record(AuditEvent::allowed(&user, "GET", "/admin", Role::Admin)));
        assert_eq!(handle.dropped(), 0);
    }

    #[tokio::test]
    async fn test_full_channel_drops_events() {
        let (handle, _recorder) = AuditRecorder::new("https://api.atrium.dev", None, 1);
        let user = make_user("admin");

        // First event fills the buffer; nothing drains it.
        assert!(handle.record(AuditEvent::allowed(&user, "GET", "/admin", Role::Admin)));
        assert!(!handle.record(AuditEvent::allowed(&user, "GET", "/admin/users", Role::Admin)));
        assert_eq!(handle.dropped(), 1);
    }

    #[test]
    fn test_allowed_event_fields() {
        let user = make_user("associate");
        let event = AuditEvent::allowed(&user, "GET", "/associate/sprints", Role::Associate);

        assert_eq!(event.actor_id.as_deref(), Some("user-1"));
        assert_eq!(event.actor_role, Some(Role::Associate));
        assert_eq!(event.decision, AuditDecision::Allow);
    }

    #[test]
    fn test_denied_event_for_anonymous() {
        let event = AuditEvent::denied(None, "GET", "/admin", Role::Admin);

        assert!(event.actor_id.is_none());
        assert!(event.actor_role.is_none());
        assert_eq!(event.decision, AuditDecision::Deny);
        assert_eq!(event.required_role, Role::Admin);
    }

    #[test]
    fn test_event_serialization() {
        let user = make_user("admin");
        let event = AuditEvent::allowed(&user, "POST", "/admin/users", Role::Admin);

        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"decision\":\"allow\""));
        assert!(json.contains("\"required_role\":\"admin\""));
        assert!(json.contains("\"path\":\"/admin/users\""));
    }
}
