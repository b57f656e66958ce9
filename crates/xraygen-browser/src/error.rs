use std::time::Duration;
use thiserror::Error;

/// Failures of a browser-driven Jira interaction.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BrowserError {
    #[error("authentication failed: login form still shown at {url} after {}s", .waited.as_secs())]
    Authentication { url: String, waited: Duration },

    #[error("issue not found: {selector} did not appear at {url} within {}s", .waited.as_secs())]
    IssueNotFound {
        url: String,
        selector: String,
        waited: Duration,
    },

    #[error("element {selector} not visible within {}s", .waited.as_secs())]
    ElementNotFound { selector: String, waited: Duration },

    #[error("submission failed: no confirmation for {summary:?} within {}s", .waited.as_secs())]
    Submission { summary: String, waited: Duration },
}
