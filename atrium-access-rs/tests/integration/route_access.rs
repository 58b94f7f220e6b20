use atrium_access::policy::{AccessDecision, AccessEvaluator, DenyReason, RouteRule};
use atrium_access::role::Role;

const DASHBOARD_RULES: &str = r#"
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
fn test_dashboard_route_requirements() {
    let evaluator = AccessEvaluator::from_yaml(DASHBOARD_RULES).unwrap();

    assert_eq!(evaluator.required_role("/admin/users"), Some(Role::Admin));
    assert_eq!(
        evaluator.required_role("/associate/sprints"),
        Some(Role::Associate)
    );
    assert_eq!(
        evaluator.required_role("/member/profile"),
        Some(Role::Member)
    );
    assert_eq!(evaluator.required_role("/public/about"), None);
    assert_eq!(evaluator.required_role(""), None);
}

#[test]
fn test_admin_reaches_every_tier() {
    let evaluator = AccessEvaluator::from_yaml(DASHBOARD_RULES).unwrap();

    for path in ["/admin/users", "/associate/sprints", "/member/profile"] {
        assert!(
            evaluator.authorize(Some(Role::Admin), path).is_allowed(),
            "admin must be allowed on {path}"
        );
    }
}

#[test]
fn test_member_stays_in_member_tier() {
    let evaluator = AccessEvaluator::from_yaml(DASHBOARD_RULES).unwrap();

    assert!(evaluator
        .authorize(Some(Role::Member), "/member/profile")
        .is_allowed());
    assert!(!evaluator
        .authorize(Some(Role::Member), "/associate/sprints")
        .is_allowed());
    assert!(!evaluator
        .authorize(Some(Role::Member), "/admin/users")
        .is_allowed());
}

#[test]
fn test_associate_denied_admin_with_reason() {
    let evaluator = AccessEvaluator::from_yaml(DASHBOARD_RULES).unwrap();

    let decision = evaluator.authorize(Some(Role::Associate), "/admin/settings");
    assert_eq!(
        decision,
        AccessDecision::Deny {
            required: Role::Admin,
            reason: DenyReason::InsufficientRole {
                actual: Role::Associate
            },
        }
    );
}

#[test]
fn test_anonymous_denied_on_protected_routes() {
    let evaluator = AccessEvaluator::from_yaml(DASHBOARD_RULES).unwrap();

    for path in ["/admin", "/associate", "/member"] {
        let decision = evaluator.authorize(None, path);
        match decision {
            AccessDecision::Deny { reason, .. } => {
                assert_eq!(reason, DenyReason::Unauthenticated)
            }
            other => panic!("expected Deny for anonymous on {path}, got {other:?}"),
        }
    }
}

#[test]
fn test_declaration_order_tie_break() {
    // An out-of-order rule set: the broad prefix is declared first, so it
    // shadows the more specific rule below it. Position decides, not
    // specificity.
    let shadowed = AccessEvaluator::new(vec![
        RouteRule::new("/a", Role::Member),
        RouteRule::new("/a/b", Role::Admin),
    ]);
    assert_eq!(shadowed.required_role("/a/b"), Some(Role::Member));

    // Reversing the declaration order changes the outcome.
    let ordered = AccessEvaluator::new(vec![
        RouteRule::new("/a/b", Role::Admin),
        RouteRule::new("/a", Role::Member),
    ]);
    assert_eq!(ordered.required_role("/a/b"), Some(Role::Admin));
}

#[test]
fn test_permissive_prefix_is_preserved() {
    let evaluator = AccessEvaluator::from_yaml(DASHBOARD_RULES).unwrap();

    // `/adminfoo` is not an admin page, but plain prefix matching still
    // classifies it as one. Downstream route definitions depend on this.
    assert_eq!(evaluator.required_role("/adminfoo"), Some(Role::Admin));
    assert_eq!(evaluator.required_role("/membership"), Some(Role::Member));
}

#[test]
fn test_custom_rule_set_over_default() {
    let custom = r#"
version: "1.0"
rules:
  - prefix: "/billing"
    role: admin
  - prefix: "/reports"
    role: associate
"#;
    let evaluator = AccessEvaluator::from_yaml(custom).unwrap();

    assert_eq!(evaluator.required_role("/billing/invoices"), Some(Role::Admin));
    assert_eq!(evaluator.required_role("/reports/q3"), Some(Role::Associate));
    // The built-in dashboard prefixes are not implied
    assert_eq!(evaluator.required_role("/admin/users"), None);
}

#[test]
fn test_invalid_rules_rejected() {
    assert!(AccessEvaluator::from_yaml("rules: {").is_err());
    assert!(AccessEvaluator::from_yaml(
        r#"
version: "1.0"
rules:
  - prefix: "/admin"
    role: root
"#
    )
    .is_err());
}
