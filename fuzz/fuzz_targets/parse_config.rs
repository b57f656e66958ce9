//! Fuzz harness for config.json
//!
//! Resolution must produce a usable configuration for any JSON value.

#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(value) = serde_json::from_slice::<serde_json::Value>(data) else {
        return;
    };
    let config = xraygen_config::resolve(&value);
    assert!(!config.jira.base_url.is_empty());
    assert!(config.ai.timeout_secs <= xraygen_config::MAX_TIMEOUT_SECS);
    assert!(config.browser.element_timeout_secs <= xraygen_config::MAX_TIMEOUT_SECS);
});
