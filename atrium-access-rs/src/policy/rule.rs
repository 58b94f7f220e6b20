use serde::{Deserialize, Serialize};

use crate::role::Role;

/// A route rule mapping a literal path prefix to a minimum required role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteRule {
    pub prefix: String,
    pub role: Role,
}

impl RouteRule {
    /// Create a new route rule.
    pub fn new(prefix: impl Into<String>, role: Role) -> Self {
        Self {
            prefix: prefix.into(),
            role,
        }
    }

    /// Check if this rule applies to the given pathname.
    ///
    /// Matching is a plain, case-sensitive prefix test with no path
    /// normalization: `/adminfoo` matches the prefix `/admin`. Route
    /// definitions rely on this permissive behavior, so it must not be
    /// tightened to segment-boundary matching.
    pub fn matches(&self, path: &str) -> bool {
        path.starts_with(&self.prefix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matches_prefix() {
        let rule = RouteRule::new("/admin", Role::Admin);
        assert!(rule.matches("/admin"));
        assert!(rule.matches("/admin/users"));
        assert!(!rule.matches("/associate/sprints"));
        assert!(!rule.matches(""));
    }

    #[test]
    fn test_matches_is_case_sensitive() {
        let rule = RouteRule::new("/admin", Role::Admin);
        assert!(!rule.matches("/Admin/users"));
    }

    #[test]
    fn test_matches_without_segment_boundary() {
        // Substring-prefix semantics: no separator required after the prefix.
        let rule = RouteRule::new("/admin", Role::Admin);
        assert!(rule.matches("/adminfoo"));
        assert!(rule.matches("/administration"));
    }

    #[test]
    fn test_yaml_roundtrip() {
        let rule = RouteRule::new("/member", Role::Member);
        let yaml = serde_yaml::to_string(&rule).unwrap();
        let parsed: RouteRule = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(parsed, rule);
    }
}
