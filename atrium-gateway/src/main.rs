use anyhow::{Context, Result};
use axum::{
    middleware,
    routing::{any, get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::signal;
use tokio::sync::broadcast;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use atrium_access::policy::AccessEvaluator;
use atrium_gateway::audit::{AuditHandle, AuditRecorder};
use atrium_gateway::config::Config;
use atrium_gateway::guard::{route_guard, GuardState};
use atrium_gateway::handlers::{
    health_live, health_ready, health_startup, metrics_handler, AppState,
};
use atrium_gateway::health::HealthChecker;
use atrium_gateway::metrics::Metrics;
use atrium_gateway::proxy::{forward_request, UpstreamProxy};
use atrium_gateway::session::{session_middleware, signout, SessionClient, SessionState};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize tracing
    init_tracing(&config);

    tracing::info!(
        host = %config.host,
        port = config.port,
        backend_url = %config.backend_url,
        upstream_url = %config.upstream_url,
        audit_enabled = config.audit_enabled,
        "starting atrium-gateway"
    );

    // Create shutdown broadcast channel
    let (shutdown_tx, _) = broadcast::channel::<()>(1);
    let shutting_down = Arc::new(AtomicBool::new(false));

    // Create metrics registry
    let metrics = Metrics::new();

    // Load route rules
    let evaluator = Arc::new(load_evaluator(&config)?);
    tracing::info!(rules = evaluator.rule_count(), "route rules loaded");

    // Create backend health checker
    let health_checker = Arc::new(HealthChecker::new(
        config.backend_url.clone(),
        Duration::from_secs(config.backend_health_check_interval_secs),
        Duration::from_secs(config.backend_health_check_timeout_secs),
    ));

    // Get shared health state
    let health_state = health_checker.state();

    // Spawn health checker task
    let health_shutdown_rx = shutdown_tx.subscribe();
    let health_checker_clone = Arc::clone(&health_checker);
    tokio::spawn(async move {
        health_checker_clone.run(health_shutdown_rx).await;
    });

    // Spawn metrics sync task (mirrors backend health into prometheus)
    let metrics_shutdown_rx = shutdown_tx.subscribe();
    let health_metrics = metrics.clone();
    let health_state_for_metrics = Arc::clone(&health_state);
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(1));
        let mut shutdown_rx = metrics_shutdown_rx;

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    let is_healthy = health_state_for_metrics.load(Ordering::SeqCst);
                    health_metrics.set_backend_health(is_healthy);
                }
                _ = shutdown_rx.recv() => {
                    tracing::debug!("metrics sync task shutting down");
                    break;
                }
            }
        }
    });

    // Create audit recorder
    let audit_handle = if config.audit_enabled {
        let (handle, recorder) = AuditRecorder::new(
            &config.backend_url,
            config.backend_service_key.clone(),
            config.audit_buffer,
        );
        let audit_shutdown_rx = shutdown_tx.subscribe();
        tokio::spawn(async move {
            recorder.run(audit_shutdown_rx).await;
        });
        handle
    } else {
        AuditHandle::disabled()
    };

    // Create session client (optional mode, the guard decides per route)
    let session_client = Arc::new(SessionClient::new(
        config.backend_url.clone(),
        config.session_cache_ttl_secs,
    ));
    let session_state = SessionState::optional(Arc::clone(&session_client));

    // Create guard state
    let guard_state = GuardState::new(Arc::clone(&evaluator), metrics.clone(), audit_handle);

    // Create app state for health endpoints
    let app_state = AppState {
        backend_healthy: Arc::clone(&health_state),
        shutting_down: Arc::clone(&shutting_down),
    };

    // Create upstream proxy
    let proxy = UpstreamProxy::new(config.upstream_url.clone());

    // Build application router
    let app = Router::new()
        // Health endpoints (no state needed for live/startup)
        .route("/health/live", get(health_live))
        .route("/health/startup", get(health_startup))
        .route(
            "/health/ready",
            get(health_ready).with_state(app_state.clone()),
        )
        // Metrics endpoint
        .route("/metrics", get(metrics_handler).with_state(metrics.clone()))
        // Sign-out endpoint
        .route(
            "/auth/signout",
            post(signout).with_state(session_state.clone()),
        )
        // Everything else is guarded and forwarded to the dashboard app
        .fallback(any(forward_request).with_state(proxy))
        // Guard runs after the session middleware has resolved the caller
        .layer(middleware::from_fn_with_state(guard_state, route_guard))
        .layer(middleware::from_fn_with_state(
            session_state,
            session_middleware,
        ))
        // Add tracing layer
        .layer(TraceLayer::new_for_http());

    // Create TCP listener
    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(address = %addr, "listening for connections");

    // Spawn graceful shutdown handler
    let shutdown_tx_clone = shutdown_tx.clone();
    let shutting_down_clone = Arc::clone(&shutting_down);
    tokio::spawn(async move {
        shutdown_signal().await;
        tracing::info!("shutdown signal received, initiating graceful shutdown");

        // Mark as shutting down (readiness probe will flip to 503)
        shutting_down_clone.store(true, Ordering::SeqCst);

        // Signal all tasks to stop
        let _ = shutdown_tx_clone.send(());

        // Give in-flight requests and the audit drain some time
        tokio::time::sleep(Duration::from_secs(5)).await;
    });

    // Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let mut rx = shutdown_tx.subscribe();
            let _ = rx.recv().await;
        })
        .await?;

    tracing::info!("atrium-gateway stopped");
    Ok(())
}

/// Load the access evaluator from the configured rules file, or fall
/// back to the built-in dashboard rules.
fn load_evaluator(config: &Config) -> Result<AccessEvaluator> {
    match &config.route_rules_path {
        Some(path) => {
            let yaml = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read route rules from {}", path))?;
            AccessEvaluator::from_yaml(&yaml)
                .with_context(|| format!("failed to parse route rules from {}", path))
        }
        None => Ok(AccessEvaluator::default()),
    }
}

/// Initialize tracing based on configuration.
fn init_tracing(config: &Config) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level));

    if config.log_format == "json" {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().pretty())
            .init();
    }
}

/// Wait for shutdown signal (SIGTERM or SIGINT).
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
