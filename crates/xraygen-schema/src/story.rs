use serde::{Deserialize, Serialize};

/// A user story as read from the Jira issue view.
///
/// Only lives between the fetch and the generation step; it is never written
/// to disk on its own.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserStory {
    pub id: String,
    pub summary: String,
    pub description: String,
}

/// Derive a story identifier from an issue key or issue URL.
///
/// The identifier is the last non-empty path segment, ignoring any query
/// string or fragment, so `XTP-42` and
/// `https://jira.example.com/browse/XTP-42?focusedId=1` both yield `XTP-42`.
pub fn story_id_from_reference(reference: &str) -> String {
    let trimmed = reference.trim();
    let without_suffix = trimmed.split(['?', '#']).next().unwrap_or(trimmed);
    without_suffix
        .split('/')
        .rfind(|segment| !segment.is_empty())
        .unwrap_or_default()
        .to_string()
}
