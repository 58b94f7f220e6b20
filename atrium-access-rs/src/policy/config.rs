// SPDX-License-Identifier: Apache-2.0
// Copyright 2025-2026 Atrium Team
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::policy::rule::RouteRule;
use crate::role::Role;

/// Errors that can occur while loading route rules.
#[derive(Debug, Error)]
pub enum RulesError {
    #[error("failed to parse rules YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Root configuration structure for route-rule YAML files.
///
/// Rules are kept in declaration order; the evaluator scans them top to
/// bottom and the first matching prefix wins, regardless of specificity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteRules {
    pub version: String,
    pub rules: Vec<RouteRule>,
}

impl RouteRules {
    /// Parse a rule set from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self, RulesError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Serialize the rule set to a YAML string.
    pub fn to_yaml(&self) -> Result<String, RulesError> {
        Ok(serde_yaml::to_string(self)?)
    }
}

impl Default for RouteRules {
    /// The built-in dashboard rule set.
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            rules: vec![
                RouteRule::new("/admin", Role::Admin),
                RouteRule::new("/associate", Role::Associate),
                RouteRule::new("/member", Role::Member),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_YAML: &str = r#"
version: "1.0"
rules:
  - prefix: "/admin"
    role: admin
  - prefix: "/associate"
    role: associate
  - prefix: "/member"
    role: member
"#;

    #[test]
    fn test_parse_yaml() {
        let rules = RouteRules::from_yaml(SAMPLE_YAML).unwrap();
        assert_eq!(rules.version, "1.0");
        assert_eq!(rules.rules.len(), 3);
        assert_eq!(rules.rules[0].prefix, "/admin");
        assert_eq!(rules.rules[0].role, Role::Admin);
    }

    #[test]
    fn test_parse_preserves_declaration_order() {
        let yaml = r#"
version: "1.0"
rules:
  - prefix: "/a"
    role: member
  - prefix: "/a/b"
    role: admin
"#;
        let rules = RouteRules::from_yaml(yaml).unwrap();
        assert_eq!(rules.rules[0].prefix, "/a");
        assert_eq!(rules.rules[1].prefix, "/a/b");
    }

    #[test]
    fn test_parse_rejects_unknown_role() {
        let yaml = r#"
version: "1.0"
rules:
  - prefix: "/admin"
    role: superuser
"#;
        assert!(RouteRules::from_yaml(yaml).is_err());
    }

    #[test]
    fn test_default_rule_set() {
        let rules = RouteRules::default();
        assert_eq!(rules.rules.len(), 3);
        assert_eq!(rules.rules[0].role, Role::Admin);
        assert_eq!(rules.rules[2].role, Role::Member);
    }

    #[test]
    fn test_roundtrip_yaml() {
        let rules = RouteRules::default();
        let yaml = rules.to_yaml().unwrap();
        let parsed = RouteRules::from_yaml(&yaml).unwrap();
        assert_eq!(parsed.rules, rules.rules);
    }
}
