#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|pattern_and_path: (String, String)| {
    let (pattern, path) = pattern_and_path;

    // A pattern without wildcards or '?' only ever matches itself.
    if !pattern.contains(|c: char| c == '#' || c == '*' || c == '?') {
        assert_eq!(pattern == path, jsoncheck::matches(&pattern, &path));
    }

    assert!(jsoncheck::matches("#", &path));
});
