// SPDX-License-Identifier: Apache-2.0
// Copyright 2025-2026 Atrium Team
pub mod config;
pub mod evaluator;
pub mod rule;

pub use config::{RouteRules, RulesError};
pub use evaluator::{AccessDecision, AccessEvaluator, DenyReason};
pub use rule::RouteRule;
