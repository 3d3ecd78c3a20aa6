#![no_main]

use docgate_git::parse_describe;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(raw) = std::str::from_utf8(data) {
        if let Some(d) = parse_describe(raw) {
            assert!(!d.tag.is_empty());
            assert!(!d.commit.is_empty());
        }
    }
});
