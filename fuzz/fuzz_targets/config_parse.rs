#![no_main]

use docgate_config::parse_config;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(text) = std::str::from_utf8(data) {
        if let Ok(config) = parse_config(text) {
            let _ = config.docs_site();
            let _ = config.compare_mode();
            let _ = config.merge(&config);
        }
    }
});
