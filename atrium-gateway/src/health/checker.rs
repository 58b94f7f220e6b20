use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;

/// Health checker for the hosted backend.
///
/// Periodically probes the backend's auth health endpoint and tracks
/// outages. Supports graceful shutdown via broadcast channel. While the
/// backend is down, new sessions cannot be resolved; cached sessions
/// keep working until their TTL runs out.
pub struct HealthChecker {
    backend_url: String,
    check_interval: Duration,
    current_state: Arc<AtomicBool>,
    outage_count: Arc<AtomicU64>,
    client: reqwest::Client,
}

impl HealthChecker {
    /// Create a new health checker.
    ///
    /// # Arguments
    /// * `backend_url` - Base URL of the hosted backend
    /// * `check_interval` - How often to probe (default: 5s)
    /// * `check_timeout` - Timeout for each probe (default: 2s)
    pub fn new(backend_url: String, check_interval: Duration, check_timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(check_timeout)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            backend_url,
            check_interval,
            current_state: Arc::new(AtomicBool::new(true)), // Assume healthy initially
            outage_count: Arc::new(AtomicU64::new(0)),
            client,
        }
    }

    /// The shared health flag, for readiness probes and metrics.
    pub fn state(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.current_state)
    }

    /// Run the probe loop until a shutdown signal is received.
    pub async fn run(&self, mut shutdown: broadcast::Receiver<()>) {
        let mut interval = tokio::time::interval(self.check_interval);
        // Don't burst on startup
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        tracing::info!(
            url = %self.backend_url,
            interval_secs = self.check_interval.as_secs(),
            "starting backend health checker"
        );

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    let is_healthy = self.check_backend().await;
                    let was_healthy = self.current_state.swap(is_healthy, Ordering::SeqCst);

                    if was_healthy && !is_healthy {
                        let count = self.outage_count.fetch_add(1, Ordering::Relaxed) + 1;
                        tracing::warn!(
                            event = "outage",
                            total_outages = count,
                            "backend became unreachable, serving cached sessions only"
                        );
                    } else if !was_healthy && is_healthy {
                        tracing::info!(
                            event = "recovery",
                            "backend recovered, session resolution restored"
                        );
                    }
                }
                _ = shutdown.recv() => {
                    tracing::info!("health checker received shutdown signal");
                    break;
                }
            }
        }

        tracing::info!("health checker stopped");
    }

    /// Probe the backend's auth health endpoint once.
    async fn check_backend(&self) -> bool {
        let health_url = format!("{}/auth/v1/health", self.backend_url);

        match self.client.get(&health_url).send().await {
            Ok(resp) => {
                let status = resp.status();
                if status.is_success() {
                    tracing::trace!(status = %status, "backend health check passed");
                    true
                } else {
                    tracing::warn!(
                        status = %status,
                        url = %health_url,
                        "backend health check returned non-success status"
                    );
                    false
                }
            }
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    url = %health_url,
                    "backend health check failed"
                );
                false
            }
        }
    }

    /// Whether the backend is currently considered healthy.
    pub fn is_healthy(&self) -> bool {
        self.current_state.load(Ordering::SeqCst)
    }

    /// Total number of outages observed since startup.
    pub fn outages(&self) -> u64 {
        self.outage_count.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state_is_healthy() {
        let checker = HealthChecker::new(
            "https://api.atrium.dev".to_string(),
            Duration::from_secs(5),
            Duration::from_secs(2),
        );
        assert!(checker.is_healthy());
        assert_eq!(checker.outages(), 0);
    }

    #[test]
    fn test_state_handle_is_shared() {
        let checker = HealthChecker::new(
            "https://api.atrium.dev".to_string(),
            Duration::from_secs(5),
            Duration::from_secs(2),
        );
        let state = checker.state();
        state.store(false, Ordering::SeqCst);
        assert!(!checker.is_healthy());
    }
}
