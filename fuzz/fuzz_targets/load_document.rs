//! Fuzz harness for saved test documents
//!
//! Mirrors the load path: strip comments, parse, coerce.

#![no_main]

use libfuzzer_sys::fuzz_target;
use xraygen_schema::{ArtifactKind, GeneratedDocument};

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    let stripped = xraygen_store::strip_comments(text);
    if let Ok(value) = serde_json::from_str(&stripped) {
        let document = GeneratedDocument::from_value(value);
        for kind in ArtifactKind::CREATION_ORDER {
            assert_eq!(document.drafts(kind).len(), document.count(kind));
        }
    }
});
