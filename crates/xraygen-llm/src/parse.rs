//! Pulling a JSON object out of free-form model output.
//!
//! Each stage is a pure function from text to an optional JSON object; the
//! first stage that yields one wins.

use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

type Stage = fn(&str) -> Option<Value>;

/// Extraction stages in priority order.
pub const STAGES: [(&str, Stage); 4] = [
    ("direct", direct),
    ("fenced", fenced),
    ("balanced", balanced),
    ("greedy", greedy),
];

static FENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)```[A-Za-z0-9_+-]*[ \t]*\r?\n(.*?)```").expect("fence pattern is valid")
});

/// Run the stages in order. Returns the winning stage name and the object.
pub fn extract_object(text: &str) -> Option<(&'static str, Value)> {
    STAGES
        .iter()
        .find_map(|(name, stage)| stage(text).map(|value| (*name, value)))
}

fn object(candidate: &str) -> Option<Value> {
    serde_json::from_str::<Value>(candidate.trim())
        .ok()
        .filter(Value::is_object)
}

/// The whole text is a JSON object.
pub fn direct(text: &str) -> Option<Value> {
    object(text)
}

/// The first fenced code block whose body is a JSON object.
pub fn fenced(text: &str) -> Option<Value> {
    FENCE
        .captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .find_map(|body| object(body.as_str()))
}

/// The first balanced `{...}` span that parses. Braces inside string
/// literals do not count.
pub fn balanced(text: &str) -> Option<Value> {
    text.match_indices('{')
        .filter_map(|(start, _)| balanced_end(&text[start..]).map(|len| &text[start..start + len]))
        .find_map(object)
}

/// Everything from the first `{` to the last `}`.
pub fn greedy(text: &str) -> Option<Value> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| object(&text[start..=end])).flatten()
}

/// Byte length of the balanced span starting at `span[0] == '{'`.
fn balanced_end(span: &str) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    for (i, c) in span.char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(i + 1);
                }
            }
            _ => {}
        }
    }
    None
}
