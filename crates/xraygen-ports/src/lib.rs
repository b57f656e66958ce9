use anyhow::Result;
use std::path::Path;
use std::time::Duration;
use xraygen_schema::{ArtifactKind, GeneratedDocument, UserStory};

/// Interval between visibility probes in the default wait helpers.
pub const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Reads a user story out of Jira.
///
/// Adapters live in `xraygen-ingest-*` crates.
pub trait StoryFetcher {
    fn fetch(&self, issue_key_or_url: &str) -> Result<UserStory>;
}

/// Turns a user story into a test document.
///
/// Generation is best-effort enrichment: implementations report failures
/// through logging and return an empty document instead of an error.
pub trait TestGenerator {
    fn generate(&self, story: &UserStory) -> GeneratedDocument;
}

/// One browser tab, addressed through CSS selectors.
///
/// This is the only surface the Jira page objects talk to, so they can be
/// exercised against a scripted page in tests.
pub trait BrowserPage {
    fn goto(&self, url: &str) -> Result<()>;

    /// Wait for the current navigation to settle.
    fn wait_for_idle(&self) -> Result<()>;

    fn is_visible(&self, selector: &str) -> Result<bool>;

    fn fill(&self, selector: &str, text: &str) -> Result<()>;

    fn click(&self, selector: &str) -> Result<()>;

    fn press(&self, selector: &str, key: &str) -> Result<()>;

    fn set_checked(&self, selector: &str, checked: bool) -> Result<()>;

    fn select_option(&self, selector: &str, label: &str) -> Result<()>;

    /// Click the first visible element matching `selector` whose text
    /// contains `text`. Returns false when there is none.
    fn click_text(&self, selector: &str, text: &str) -> Result<bool>;

    fn inner_text(&self, selector: &str) -> Result<String>;

    fn pause(&self, duration: Duration);

    fn close(self: Box<Self>) -> Result<()>;

    /// Poll until `selector` is visible. Returns false on timeout.
    fn wait_for(&self, selector: &str, timeout: Duration) -> Result<bool> {
        poll(self, timeout, |page| page.is_visible(selector))
    }

    /// Poll until `selector` is no longer visible. Returns false on timeout.
    fn wait_until_hidden(&self, selector: &str, timeout: Duration) -> Result<bool> {
        poll(self, timeout, |page| Ok(!page.is_visible(selector)?))
    }
}

fn poll<P, F>(page: &P, timeout: Duration, mut probe: F) -> Result<bool>
where
    P: BrowserPage + ?Sized,
    F: FnMut(&P) -> Result<bool>,
{
    let attempts = (timeout.as_millis() / POLL_INTERVAL.as_millis()).max(1);
    for attempt in 0..=attempts {
        if probe(page)? {
            return Ok(true);
        }
        if attempt < attempts {
            page.pause(POLL_INTERVAL);
        }
    }
    Ok(false)
}

/// Opens browser sessions. Each call yields a fresh page that the caller
/// must close.
pub trait BrowserLauncher {
    fn launch(&self) -> Result<Box<dyn BrowserPage>>;
}

/// Captured result of one creation batch run out of process.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RunnerOutput {
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
}

/// Runs the creation batch for one artifact kind.
pub trait CreationRunner {
    fn run(&self, kind: ArtifactKind, data_path: &Path, project_key: &str) -> Result<RunnerOutput>;
}
