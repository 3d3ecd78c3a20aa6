#![no_main]

use docgate_site::{DEFAULT_PATTERN, VersionPattern};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(body) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(pattern) = VersionPattern::new(DEFAULT_PATTERN) else {
        return;
    };

    let versions = pattern.scan(body);
    assert!(versions.len() <= body.lines().count());
    for v in &versions {
        assert!(body.contains(v.as_str()));
    }
});
