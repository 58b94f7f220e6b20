// SPDX-License-Identifier: Apache-2.0
// Copyright 2025-2026 Atrium Team
use serde::Deserialize;

/// Configuration loaded from environment variables.
///
/// All configuration is externalized to support 12-factor app deployment.
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Server host (default: 0.0.0.0)
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port (default: 8080)
    #[serde(default = "default_port")]
    pub port: u16,

    /// Hosted backend base URL (auth + audit storage)
    #[serde(default = "default_backend_url")]
    pub backend_url: String,

    /// Service key for backend writes (audit log inserts)
    #[serde(default)]
    pub backend_service_key: Option<String>,

    /// Dashboard application URL that allowed requests are forwarded to
    #[serde(default = "default_upstream_url")]
    pub upstream_url: String,

    /// Backend health check interval in seconds (default: 5)
    #[serde(default = "default_health_check_interval")]
    pub backend_health_check_interval_secs: u64,

    /// Backend health check timeout in seconds (default: 2)
    #[serde(default = "default_health_check_timeout")]
    pub backend_health_check_timeout_secs: u64,

    /// How long resolved sessions stay cached, in seconds (default: 60)
    #[serde(default = "default_session_cache_ttl")]
    pub session_cache_ttl_secs: i64,

    /// Optional path to a route rules YAML file; built-in rules when unset
    #[serde(default)]
    pub route_rules_path: Option<String>,

    /// Whether audit events are recorded (default: true)
    #[serde(default = "default_audit_enabled")]
    pub audit_enabled: bool,

    /// Audit channel capacity; events beyond it are dropped (default: 1024)
    #[serde(default = "default_audit_buffer")]
    pub audit_buffer: usize,

    /// Log level (default: info)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Log format: "json" or "pretty" (default: json)
    #[serde(default = "default_log_format")]
    pub log_format: String,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_backend_url() -> String {
    "https://api.atrium.dev".to_string()
}

fn default_upstream_url() -> String {
    "http://127.0.0.1:3000".to_string()
}

fn default_health_check_interval() -> u64 {
    5
}

fn default_health_check_timeout() -> u64 {
    2
}

fn default_session_cache_ttl() -> i64 {
    60
}

fn default_audit_enabled() -> bool {
    true
}

fn default_audit_buffer() -> usize {
    1024
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "json".to_string()
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Environment variables are uppercase with underscore separators.
    /// Example: `BACKEND_URL`, `ROUTE_RULES_PATH`, etc.
    pub fn from_env() -> Result<Self, envy::Error> {
        envy::from_env()
    }
}
