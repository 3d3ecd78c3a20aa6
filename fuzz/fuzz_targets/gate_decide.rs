#![no_main]

use docgate_core::gate::decide;
use docgate_types::{BuildVersion, CompareMode};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|input: (String, Vec<String>, bool)| {
    let (build, matches, semantic) = input;
    let mode = if semantic {
        CompareMode::Semantic
    } else {
        CompareMode::Lexicographic
    };
    let count = matches.len();

    let decision = decide("https://example.org", &BuildVersion::new(build), matches, mode);
    if count != 1 {
        assert!(!decision.deploy);
    }
    assert_eq!(decision.site_version.versions().len(), count);
});
