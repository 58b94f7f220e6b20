use prometheus::{
    CounterVec, Encoder, GaugeVec, HistogramOpts, HistogramVec, Opts, Registry, TextEncoder,
};
use std::sync::Arc;
use std::time::Duration;

/// Prometheus metrics for the gateway.
///
/// Thread-safe registry tracking access decisions, request latency,
/// backend health, and audit throughput.
#[derive(Clone)]
pub struct Metrics {
    registry: Arc<Registry>,

    /// Decision counter: atrium_access_decision_total{decision, required}
    decision_total: CounterVec,

    /// Request duration histogram: atrium_request_duration_seconds{route_class, status}
    request_duration: HistogramVec,

    /// Backend health gauge: atrium_backend_health_status{backend} (1=up, 0=down)
    backend_health: GaugeVec,

    /// Audit event counter: atrium_audit_event_total{outcome}
    audit_events: CounterVec,
}

impl Metrics {
    /// Create a new metrics registry with all collectors registered.
    pub fn new() -> Self {
        let registry = Registry::new();

        let decision_total = CounterVec::new(
            Opts::new(
                "atrium_access_decision_total",
                "Access decisions on protected routes",
            ),
            &["decision", "required"],
        )
        .expect("failed to create decision_total counter");

        // Buckets from 1ms to 10s (exponential)
        let request_duration = HistogramVec::new(
            HistogramOpts::new(
                "atrium_request_duration_seconds",
                "Request duration in seconds",
            )
            .buckets(vec![
                0.001, 0.002, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
            ]),
            &["route_class", "status"],
        )
        .expect("failed to create request_duration histogram");

        let backend_health = GaugeVec::new(
            Opts::new(
                "atrium_backend_health_status",
                "Hosted backend health (1=up, 0=down)",
            ),
            &["backend"],
        )
        .expect("failed to create backend_health gauge");

        let audit_events = CounterVec::new(
            Opts::new("atrium_audit_event_total", "Audit events by outcome"),
            &["outcome"],
        )
        .expect("failed to create audit_events counter");

        registry
            .register(Box::new(decision_total.clone()))
            .expect("failed to register decision_total");
        registry
            .register(Box::new(request_duration.clone()))
            .expect("failed to register request_duration");
        registry
            .register(Box::new(backend_health.clone()))
            .expect("failed to register backend_health");
        registry
            .register(Box::new(audit_events.clone()))
            .expect("failed to register audit_events");

        // Assume the backend is up until the checker says otherwise
        backend_health.with_label_values(&["auth"]).set(1.0);

        Self {
            registry: Arc::new(registry),
            decision_total,
            request_duration,
            backend_health,
            audit_events,
        }
    }

    /// Count an access decision on a protected route.
    pub fn record_decision(&self, decision: &str, required: &str) {
        self.decision_total
            .with_label_values(&[decision, required])
            .inc();
    }

    /// Record a completed request.
    pub fn record_request(&self, route_class: &str, duration: Duration, status: u16) {
        self.request_duration
            .with_label_values(&[route_class, &status.to_string()])
            .observe(duration.as_secs_f64());
    }

    /// Set backend health status.
    pub fn set_backend_health(&self, healthy: bool) {
        self.backend_health
            .with_label_values(&["auth"])
            .set(if healthy { 1.0 } else { 0.0 });
    }

    /// Count an audit event outcome ("enqueued" or "dropped").
    pub fn record_audit(&self, outcome: &str) {
        self.audit_events.with_label_values(&[outcome]).inc();
    }

    /// Encode metrics in Prometheus text format.
    pub fn encode(&self) -> String {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder
            .encode(&metric_families, &mut buffer)
            .expect("failed to encode metrics");
        String::from_utf8(buffer).expect("metrics are not valid UTF-8")
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_creation() {
        let metrics = Metrics::new();
        assert!(!metrics.encode().is_empty());
    }

    #[test]
    fn test_record_decision() {
        let metrics = Metrics::new();
        metrics.record_decision("allow", "admin");
        metrics.record_decision("deny", "admin");

        let output = metrics.encode();
        assert!(output.contains("atrium_access_decision_total"));
    }

    #[test]
    fn test_record_request() {
        let metrics = Metrics::new();
        metrics.record_request("admin", Duration::from_millis(12), 200);
        metrics.record_request("public", Duration::from_millis(3), 404);

        let output = metrics.encode();
        assert!(output.contains("atrium_request_duration_seconds"));
    }

    #[test]
    fn test_backend_health() {
        let metrics = Metrics::new();
        metrics.set_backend_health(false);

        let output = metrics.encode();
        assert!(output.contains("atrium_backend_health_status"));
    }

    #[test]
    fn test_audit_counter() {
        let metrics = Metrics::new();
        metrics.record_audit("enqueued");
        metrics.record_audit("dropped");

        let output = metrics.encode();
        assert!(output.contains("atrium_audit_event_total"));
    }
}
