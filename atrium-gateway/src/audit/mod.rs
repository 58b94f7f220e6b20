// SPDX-License-Identifier: Apache-2.0
// Copyright 2025-2026 Atrium Team
//! Audit Module
//!
//! Records access decisions on protected routes to the backend's audit
//! table. Recording is best-effort and decoupled from the request path:
//! the guard enqueues events on a bounded channel and a background task
//! posts them upstream, dropping (and counting) events when the channel
//! is full rather than stalling requests.

pub mod recorder;

pub use recorder::{AuditDecision, AuditError, AuditEvent, AuditHandle, AuditRecorder};
