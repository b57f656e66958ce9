//! Fuzz harness for model replies
//!
//! Arbitrary text must either parse or yield an error, never panic.

#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(text) = std::str::from_utf8(data) {
        let _ = xraygen_llm::parse::extract_object(text);
        let _ = xraygen_llm::parse_document(text);
    }
});
