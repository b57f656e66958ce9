//! Jira user-story fetcher.
//!
//! Reads the summary and description off the issue view page. Every fetch
//! runs in its own browser session, closed whether or not the fetch worked.

use anyhow::{Context, Result, anyhow};
use std::time::Duration;
use url::Url;
use xraygen_browser::{BrowserError, authenticate};
use xraygen_config::Credentials;
use xraygen_ports::{BrowserLauncher, BrowserPage, StoryFetcher};
use xraygen_schema::{UserStory, story_id_from_reference};

pub const SUMMARY_FIELD: &str = "#summary-val";
pub const DESCRIPTION_FIELD: &str = "#description-val";

/// How long the summary may take to render before the issue counts as missing.
pub const SUMMARY_TIMEOUT: Duration = Duration::from_secs(10);

pub struct JiraStoryFetcher<'a> {
    launcher: &'a dyn BrowserLauncher,
    /// Jira instance root, e.g. `https://company.atlassian.net`.
    pub base_url: String,
    pub credentials: Credentials,
    pub login_timeout: Duration,
    pub summary_timeout: Duration,
}

impl<'a> JiraStoryFetcher<'a> {
    pub fn new(
        launcher: &'a dyn BrowserLauncher,
        base_url: impl Into<String>,
        credentials: Credentials,
    ) -> Self {
        Self {
            launcher,
            base_url: base_url.into(),
            credentials,
            login_timeout: SUMMARY_TIMEOUT,
            summary_timeout: SUMMARY_TIMEOUT,
        }
    }

    pub fn with_login_timeout(mut self, timeout: Duration) -> Self {
        self.login_timeout = timeout;
        self
    }

    pub fn with_summary_timeout(mut self, timeout: Duration) -> Self {
        self.summary_timeout = timeout;
        self
    }

    fn read_story(&self, page: &dyn BrowserPage, reference: &str) -> Result<UserStory> {
        let url = issue_url(&self.base_url, reference)?;
        // Jira redirects an anonymous visit to the login form.
        authenticate(page, url.as_str(), &self.credentials, self.login_timeout)?;

        page.goto(url.as_str())
            .with_context(|| format!("failed to open {url}"))?;
        page.wait_for_idle()?;

        if !page.wait_for(SUMMARY_FIELD, self.summary_timeout)? {
            return Err(BrowserError::IssueNotFound {
                url: url.to_string(),
                selector: SUMMARY_FIELD.to_string(),
                waited: self.summary_timeout,
            }
            .into());
        }
        let summary = page.inner_text(SUMMARY_FIELD)?.trim().to_string();

        let description = if page.is_visible(DESCRIPTION_FIELD)? {
            page.inner_text(DESCRIPTION_FIELD)?.trim().to_string()
        } else {
            tracing::warn!(issue = reference, "story has no description, using empty text");
            String::new()
        };

        Ok(UserStory {
            id: story_id_from_reference(reference),
            summary,
            description,
        })
    }
}

impl StoryFetcher for JiraStoryFetcher<'_> {
    fn fetch(&self, issue_key_or_url: &str) -> Result<UserStory> {
        let page = self.launcher.launch().context("failed to start browser")?;
        let result = self.read_story(page.as_ref(), issue_key_or_url);
        if let Err(e) = page.close() {
            tracing::warn!(error = %e, "failed to close browser session");
        }
        let story = result?;
        tracing::info!(id = %story.id, summary = %story.summary, "fetched user story");
        Ok(story)
    }
}

/// Resolve an issue key or URL to the issue view URL.
///
/// Absolute `http(s)` URLs are used unchanged; anything else is treated as a
/// key under `{base_url}/browse/`. A trailing `/` on the base is ignored.
pub fn issue_url(base_url: &str, reference: &str) -> Result<Url> {
    let reference = reference.trim();
    if let Ok(url) = Url::parse(reference)
        && matches!(url.scheme(), "http" | "https")
    {
        return Ok(url);
    }

    let key = reference.trim_matches('/');
    if key.is_empty() {
        return Err(anyhow!("empty issue key"));
    }
    let base = base_url.trim().trim_end_matches('/');
    Url::parse(&format!("{base}/browse/{key}"))
        .with_context(|| format!("invalid Jira base URL {base_url:?}"))
}
