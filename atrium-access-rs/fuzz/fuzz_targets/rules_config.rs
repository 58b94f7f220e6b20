#![no_main]

use libfuzzer_sys::fuzz_target;

use atrium_access::policy::AccessEvaluator;

fuzz_target!(|data: &str| {
    // Arbitrary strings must parse or error, never panic
    let _ = AccessEvaluator::from_yaml(data);
});
