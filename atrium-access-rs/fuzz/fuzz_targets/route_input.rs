#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

use atrium_access::policy::{AccessDecision, AccessEvaluator};
use atrium_access::role::Role;

const RULES: &str = r#"
version: "1.0"
rules:
  - prefix: "/admin"
    role: admin
  - prefix: "/associate"
    role: associate
  - prefix: "/member"
    role: member
  - prefix: ""
    role: member
"#;

#[derive(Arbitrary, Debug)]
struct FuzzInput {
    path: String,
    role_index: Option<u8>,
}

fuzz_target!(|input: FuzzInput| {
    let evaluator = AccessEvaluator::from_yaml(RULES).expect("valid YAML");

    let role = input
        .role_index
        .map(|i| Role::ALL[(i as usize) % Role::ALL.len()]);

    // Lookup must never panic, for any byte sequence that is a Rust string
    let required = evaluator.required_role(&input.path);

    // If a requirement came back, some declared rule must prefix-match
    if required.is_some() {
        assert!(evaluator.rules().iter().any(|r| r.matches(&input.path)));
    }

    // Authorization must agree with the pure lookup
    match evaluator.authorize(role, &input.path) {
        AccessDecision::Allow { required: None } => assert!(required.is_none()),
        AccessDecision::Allow {
            required: Some(req),
        } => {
            assert_eq!(required, Some(req));
            assert!(role.expect("allow with requirement implies a role").satisfies(req));
        }
        AccessDecision::Deny { required: req, .. } => {
            assert_eq!(required, Some(req));
            if let Some(actual) = role {
                assert!(!actual.satisfies(req));
            }
        }
    }
});
