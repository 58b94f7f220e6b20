//! Atrium Access - role and route access control for the Atrium dashboard
//!
//! This crate decides whether a caller may reach a dashboard route, by
//! consulting a static role ladder (member < associate < admin) and an
//! ordered list of path-prefix rules loaded from YAML.
//!
//! # Example
//!
//! ```rust
//! use atrium_access::policy::AccessEvaluator;
//! use atrium_access::role::Role;
//!
//! let rules = r#"
//! version: "1.0"
//! rules:
//!   - prefix: "/admin"
//!     role: admin
//!   - prefix: "/member"
//!     role: member
//! "#;
//!
//! let evaluator = AccessEvaluator::from_yaml(rules).unwrap();
//!
//! assert_eq!(evaluator.required_role("/admin/users"), Some(Role::Admin));
//! assert_eq!(evaluator.required_role("/public/about"), None);
//! assert!(evaluator.authorize(Some(Role::Admin), "/admin/users").is_allowed());
//! ```

pub mod policy;
pub mod role;

// Re-export commonly used types at the crate root
pub use policy::{AccessDecision, AccessEvaluator, RouteRule, RouteRules, RulesError};
pub use role::Role;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Determine the required role for a pathname against a YAML rule set.
///
/// This is a convenience function for simple use cases; callers that
/// evaluate more than one path should build an [`AccessEvaluator`] once.
///
/// # Example
///
/// ```rust
/// use atrium_access::{required_role_for, Role};
///
/// let rules = r#"
/// version: "1.0"
/// rules:
///   - prefix: "/member"
///     role: member
/// "#;
///
/// let role = required_role_for(rules, "/member/profile").unwrap();
/// assert_eq!(role, Some(Role::Member));
/// ```
pub fn required_role_for(rules_yaml: &str, path: &str) -> Result<Option<Role>, RulesError> {
    Ok(AccessEvaluator::from_yaml(rules_yaml)?.required_role(path))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_required_role_for_convenience() {
        let rules = r#"
version: "1.0"
rules:
  - prefix: "/admin"
    role: admin
"#;

        let role = required_role_for(rules, "/admin/users").unwrap();
        assert_eq!(role, Some(Role::Admin));

        let role = required_role_for(rules, "/public").unwrap();
        assert_eq!(role, None);
    }

    #[test]
    fn test_required_role_for_invalid_yaml() {
        assert!(required_role_for("version: [", "/admin").is_err());
    }
}
