#![no_main]

use libfuzzer_sys::fuzz_target;
use snaplabel::config::AppConfig;

fuzz_target!(|data: &[u8]| {
    // Arbitrary config files must either load or be rejected, never panic
    if let Ok(s) = std::str::from_utf8(data) {
        if let Ok(config) = serde_json::from_str::<AppConfig>(s) {
            let _ = config.api.timeout();
            let _ = serde_json::to_string(&config);
        }
    }
});
