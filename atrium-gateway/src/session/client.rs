// SPDX-License-Identifier: Apache-2.0
// Copyright 2025-2026 Atrium Team
//! Backend Session Client
//!
//! Resolves bearer tokens into dashboard users via the hosted backend's
//! auth endpoint, with a TTL cache so a burst of requests from one
//! browser does not re-hit the backend on every call.

use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::RwLock;
use thiserror::Error;
use tracing::{debug, warn};

use super::user::{SessionUser, UserRecord};

// =============================================================================
// Errors
// =============================================================================

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("missing Authorization header")]
    MissingHeader,

    #[error("malformed Authorization header")]
    MalformedHeader,

    #[error("session rejected by backend: {status}")]
    Rejected { status: u16 },

    #[error("session backend unavailable: {0}")]
    Backend(#[from] reqwest::Error),

    #[error("unknown role '{0}' in user record")]
    UnknownRole(String),
}

// =============================================================================
// Cache Entry
// =============================================================================

/// A cached resolved session with expiration.
#[derive(Debug, Clone)]
struct CacheEntry {
    user: SessionUser,
    expires_at: DateTime<Utc>,
}

impl CacheEntry {
    fn new(user: SessionUser, ttl: Duration) -> Self {
        Self {
            user,
            expires_at: Utc::now() + ttl,
        }
    }

    fn is_expired(&self) -> bool {
        Utc::now() > self.expires_at
    }
}

// =============================================================================
// Session Client
// =============================================================================

/// Client for the backend auth service.
pub struct SessionClient {
    base_url: String,
    client: reqwest::Client,
    cache: RwLock<HashMap<String, CacheEntry>>,
    ttl: Duration,
}

impl SessionClient {
    /// Create a new session client.
    ///
    /// # Arguments
    /// * `base_url` - Base URL of the hosted backend
    /// * `ttl_seconds` - How long resolved sessions stay cached
    pub fn new(base_url: String, ttl_seconds: i64) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url,
            client,
            cache: RwLock::new(HashMap::new()),
            ttl: Duration::seconds(ttl_seconds),
        }
    }

    /// Extract the bearer token from an Authorization header value.
    pub fn extract_token(auth_header: &str) -> Result<&str, SessionError> {
        let parts: Vec<&str> = auth_header.splitn(2, ' ').collect();

        if parts.len() != 2 {
            return Err(SessionError::MalformedHeader);
        }

        if parts[0].to_lowercase() != "bearer" {
            return Err(SessionError::MalformedHeader);
        }

        Ok(parts[1].trim())
    }

    /// Resolve a bearer token into a session user.
    ///
    /// Served from cache when a non-expired entry exists; otherwise asks
    /// the backend and caches the result.
    pub async fn resolve(&self, token: &str) -> Result<SessionUser, SessionError> {
        if let Some(user) = self.cache_get(token) {
            debug!(user_id = %user.id, "session resolved from cache");
            return Ok(user);
        }

        let url = format!("{}/auth/v1/user", self.base_url);
        let response = self.client.get(&url).bearer_auth(token).send().await?;

        let status = response.status();
        if !status.is_success() {
            warn!(status = %status, "backend rejected session token");
            return Err(SessionError::Rejected {
                status: status.as_u16(),
            });
        }

        let record: UserRecord = response.json().await?;
        let user = SessionUser::from_record(record, token.to_string())?;

        debug!(user_id = %user.id, role = %user.role, "session resolved from backend");
        self.cache_put(token, user.clone());
        Ok(user)
    }

    /// Revoke a token upstream and forget its cached session.
    ///
    /// The cache entry is dropped even when the backend call fails, so a
    /// signed-out browser never gets served from cache again.
    pub async fn revoke(&self, token: &str) -> Result<(), SessionError> {
        self.cache_remove(token);

        let url = format!("{}/auth/v1/logout", self.base_url);
        let response = self.client.post(&url).bearer_auth(token).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SessionError::Rejected {
                status: status.as_u16(),
            });
        }

        Ok(())
    }

    /// Number of sessions currently cached (expired entries included).
    pub fn cached_sessions(&self) -> usize {
        self.cache.read().unwrap().len()
    }

    fn cache_get(&self, token: &str) -> Option<SessionUser> {
        let cache = self.cache.read().unwrap();
        match cache.get(token) {
            Some(entry) if !entry.is_expired() => Some(entry.user.clone()),
            _ => None,
        }
    }

    fn cache_put(&self, token: &str, user: SessionUser) {
        let mut cache = self.cache.write().unwrap();
        cache.insert(token.to_string(), CacheEntry::new(user, self.ttl));
    }

    fn cache_remove(&self, token: &str) {
        let mut cache = self.cache.write().unwrap();
        cache.remove(token);
    }
}

// =============================================================================
// Tests
// =============================================================================
