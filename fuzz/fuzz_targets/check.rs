#![no_main]
use libfuzzer_sys::fuzz_target;

use jsoncheck::{Check, Checker, Policy};

fuzz_target!(|input: (Policy, Vec<(String, Vec<Check>)>, Vec<u8>)| {
    let (policy, rules, document) = input;

    let value: serde_json::Value = match serde_json::from_slice(&document) {
        Ok(value) => value,
        Err(_) => return,
    };

    let mut checker = match Checker::from_value(&value, policy) {
        Ok(checker) => checker,
        Err(_) => return,
    };

    for (pattern, checks) in rules {
        checker.add_rule(pattern, checks);
    }

    let first = checker.check();
    assert_eq!(first.passed, first.results.is_empty());
    assert_eq!(first, checker.check());
});
