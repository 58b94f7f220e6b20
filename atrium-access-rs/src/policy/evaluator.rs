use serde::Serialize;

use crate::policy::config::{RouteRules, RulesError};
use crate::policy::rule::RouteRule;
use crate::role::Role;

/// Why a request was denied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DenyReason {
    /// No authenticated session was presented
    Unauthenticated,
    /// The session's role ranks below the route's requirement
    InsufficientRole { actual: Role },
}

/// Result of an authorization check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "decision", rename_all = "lowercase")]
pub enum AccessDecision {
    /// Request may proceed. `required` is the matched route requirement,
    /// or None for an unprotected route.
    Allow {
        #[serde(skip_serializing_if = "Option::is_none")]
        required: Option<Role>,
    },

    /// Request is denied for the given requirement.
    Deny { required: Role, reason: DenyReason },
}

impl AccessDecision {
    /// Check if this is an Allow decision.
    pub fn is_allowed(&self) -> bool {
        matches!(self, AccessDecision::Allow { .. })
    }

    /// The route requirement involved in this decision, if any.
    pub fn required(&self) -> Option<Role> {
        match self {
            AccessDecision::Allow { required } => *required,
            AccessDecision::Deny { required, .. } => Some(*required),
        }
    }
}

/// The access control evaluator.
///
/// Holds an immutable, ordered list of route rules and answers two
/// questions: which role (if any) a pathname requires, and whether a
/// caller's role is sufficient for it. All lookups are pure and complete
/// in time proportional to the fixed number of declared rules.
#[derive(Debug, Clone)]
pub struct AccessEvaluator {
    rules: Vec<RouteRule>,
}

impl AccessEvaluator {
    /// Create an evaluator from an ordered list of rules.
    pub fn new(rules: Vec<RouteRule>) -> Self {
        Self { rules }
    }

    /// Create an evaluator from a parsed rule set.
    pub fn from_config(config: RouteRules) -> Self {
        Self::new(config.rules)
    }

    /// Load an evaluator from a YAML rule set.
    pub fn from_yaml(yaml: &str) -> Result<Self, RulesError> {
        Ok(Self::from_config(RouteRules::from_yaml(yaml)?))
    }

    /// The declared rules, in evaluation order.
    pub fn rules(&self) -> &[RouteRule] {
        &self.rules
    }

    /// Number of declared rules.
    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    /// Determine the minimum role required for a pathname.
    ///
    /// Rules are scanned in declaration order and the FIRST matching
    /// prefix wins; overlap is resolved by position, never by length or
    /// specificity. Returns None when no rule matches, meaning the route
    /// is unprotected.
    pub fn required_role(&self, path: &str) -> Option<Role> {
        self.rules.iter().find(|r| r.matches(path)).map(|r| r.role)
    }

    /// Decide whether a caller may access a pathname.
    ///
    /// `role` is None for anonymous callers. Unprotected routes are
    /// always allowed, with or without a session.
    pub fn authorize(&self, role: Option<Role>, path: &str) -> AccessDecision {
        match self.required_role(path) {
            None => AccessDecision::Allow { required: None },
            Some(required) => match role {
                Some(actual) if actual.satisfies(required) => AccessDecision::Allow {
                    required: Some(required),
                },
                Some(actual) => AccessDecision::Deny {
                    required,
                    reason: DenyReason::InsufficientRole { actual },
                },
                None => AccessDecision::Deny {
                    required,
                    reason: DenyReason::Unauthenticated,
                },
            },
        }
    }
}

impl Default for AccessEvaluator {
    fn default() -> Self {
        Self::from_config(RouteRules::default())
    }
}
