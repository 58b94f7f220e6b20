//! Session Module
//!
//! Resolves bearer tokens against the hosted backend's auth service and
//! makes the resulting user available to the rest of the request pipeline.
//!
//! This module provides:
//! - Backend session client with TTL caching
//! - Axum middleware injecting the session user into request extensions
//! - `CurrentUser` / `OptionalUser` extractors for handlers
//! - Sign-out handler revoking the token upstream

pub mod client;
pub mod middleware;
pub mod user;

pub use client::{SessionClient, SessionError};
pub use middleware::{
    optional_session, session_middleware, signout, CurrentUser, GuardError, OptionalUser,
    SessionState,
};
pub use user::{SessionUser, UserRecord};
