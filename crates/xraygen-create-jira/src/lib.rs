//! Issue creation through Jira's create-issue dialog.
//!
//! One batch covers the records of one artifact kind. Records are created
//! in order in a single page; a failed record is reported and the batch
//! moves on to the next one.

mod page;
pub mod selectors;

pub use page::{CreateIssuePage, StepOutcome};

use anyhow::{Context, Result};
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use std::time::Duration;
use xraygen_browser::authenticate;
use xraygen_config::Credentials;
use xraygen_ports::{BrowserLauncher, BrowserPage};
use xraygen_schema::{ArtifactKind, IssueDraft, TestRecord};
use xraygen_store::{load_document, update_document};

static ISSUE_KEY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b[A-Z][A-Z0-9_]+-\d+\b").expect("issue key pattern is valid")
});

/// Find the created issue key in a confirmation message, preferring keys of
/// `project_key`.
pub fn parse_issue_key(message: &str, project_key: &str) -> Option<String> {
    let prefix = format!("{project_key}-");
    let keys: Vec<&str> = ISSUE_KEY.find_iter(message).map(|m| m.as_str()).collect();
    keys.iter()
        .find(|k| k.starts_with(&prefix))
        .or_else(|| keys.first())
        .map(|k| k.to_string())
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RecordOutcome {
    pub index: usize,
    pub summary: String,
    pub created_key: Option<String>,
    pub warnings: Vec<String>,
    pub error: Option<String>,
}

impl RecordOutcome {
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BatchReport {
    pub kind: ArtifactKind,
    pub outcomes: Vec<RecordOutcome>,
}

impl BatchReport {
    pub fn empty(kind: ArtifactKind) -> Self {
        Self {
            kind,
            outcomes: Vec::new(),
        }
    }

    pub fn failures(&self) -> usize {
        self.outcomes.iter().filter(|o| !o.is_success()).count()
    }

    pub fn is_success(&self) -> bool {
        self.failures() == 0
    }

    /// `(record index, key)` for every record whose key was captured.
    pub fn created_keys(&self) -> Vec<(usize, String)> {
        self.outcomes
            .iter()
            .filter_map(|o| o.created_key.clone().map(|key| (o.index, key)))
            .collect()
    }
}

/// Drives the create dialog for a batch of records in one page.
pub struct IssueCreator<'p> {
    form: CreateIssuePage<'p>,
    project_key: String,
}

impl<'p> IssueCreator<'p> {
    pub fn new(
        page: &'p dyn BrowserPage,
        project_key: impl Into<String>,
        element_timeout: Duration,
    ) -> Self {
        Self {
            form: CreateIssuePage::new(page, element_timeout),
            project_key: project_key.into(),
        }
    }

    pub fn run_batch(&self, kind: ArtifactKind, drafts: &[IssueDraft<'_>]) -> BatchReport {
        let mut report = BatchReport::empty(kind);
        let total = drafts.len();

        for (position, draft) in drafts.iter().enumerate() {
            let is_first = position == 0;
            let is_last = position + 1 == total;
            let mut outcome = RecordOutcome {
                index: draft.index,
                summary: draft.summary.to_string(),
                ..RecordOutcome::default()
            };

            match self.create_one(draft, is_first, is_last, &mut outcome.warnings) {
                Ok(key) => {
                    tracing::info!(
                        kind = %kind,
                        record = position + 1,
                        total,
                        key = key.as_deref().unwrap_or("?"),
                        summary = draft.summary,
                        "issue created"
                    );
                    outcome.created_key = key;
                }
                Err(e) => {
                    tracing::error!(
                        kind = %kind,
                        record = position + 1,
                        total,
                        summary = draft.summary,
                        error = %format!("{e:#}"),
                        "issue creation failed"
                    );
                    outcome.error = Some(format!("{e:#}"));
                }
            }
            report.outcomes.push(outcome);
        }
        report
    }

    fn create_one(
        &self,
        draft: &IssueDraft<'_>,
        is_first: bool,
        is_last: bool,
        warnings: &mut Vec<String>,
    ) -> Result<Option<String>> {
        let mut note = |step: StepOutcome| {
            if let Some(warning) = step.warning {
                tracing::warn!(summary = draft.summary, "{warning}");
                warnings.push(warning);
            }
        };

        if is_first {
            note(self.form.open()?);
        } else if !self.form.is_open()? {
            tracing::warn!("create dialog was closed, reopening");
            note(self.form.open()?);
        }

        note(self.form.select_project(&self.project_key)?);
        note(self.form.select_issue_type(draft.kind.issue_type())?);
        self.form.fill_summary(draft.summary)?;
        note(self.form.fill_description(draft.description)?);

        if let Some(test) = draft.test {
            for step in self.test_fields(test)? {
                note(step);
            }
        }

        let (message, uncheck) = self.form.submit(draft.summary, is_last)?;
        if let Some(step) = uncheck {
            note(step);
        }
        let key = parse_issue_key(&message, &self.project_key);
        if key.is_none() {
            note(StepOutcome::skipped(format!(
                "no issue key in confirmation {:?}",
                message.trim()
            )));
        }
        Ok(key)
    }

    /// Components, priority, test details and links of a Test.
    fn test_fields(&self, test: &TestRecord) -> Result<Vec<StepOutcome>> {
        let mut steps = Vec::new();
        if !test.components.is_empty() {
            steps.push(self.form.fill_components(&test.components)?);
        }
        if let Some(priority) = &test.priority {
            steps.push(self.form.fill_priority(priority)?);
        }
        if test.is_cucumber() {
            steps.push(self.form.select_tab(selectors::TEST_DETAILS_TAB)?);
            if let Some(test_type) = &test.test_type {
                steps.push(self.form.set_test_type(test_type)?);
            }
            if let Some(scenario) = &test.cucumber_scenario {
                steps.push(self.form.set_cucumber_scenario(scenario)?);
            }
        }
        if !test.linked_test_sets.is_empty() {
            steps.push(self.form.select_tab(selectors::TEST_SETS_TAB)?);
            steps.push(self.form.link_test_sets(&test.linked_test_sets)?);
        }
        if !test.linked_user_stories.is_empty() {
            steps.push(self.form.select_tab(selectors::LINK_ISSUES_TAB)?);
            steps.push(self.form.link_user_stories(&test.linked_user_stories)?);
        }
        Ok(steps)
    }
}

/// One out-of-process creation run: a kind, a document, a project.
pub struct CreationJob<'a> {
    pub launcher: &'a dyn BrowserLauncher,
    pub base_url: String,
    pub credentials: Credentials,
    pub element_timeout: Duration,
    pub kind: ArtifactKind,
    pub data_path: PathBuf,
    pub project_key: String,
}

impl CreationJob<'_> {
    /// Create every record of the job's kind, then write captured keys back
    /// into the document.
    pub fn run(&self) -> Result<BatchReport> {
        let document = load_document(&self.data_path)
            .with_context(|| format!("failed to load {}", self.data_path.display()))?;
        let drafts = document.drafts(self.kind);
        if drafts.is_empty() {
            tracing::info!(kind = %self.kind, "no records to create");
            return Ok(BatchReport::empty(self.kind));
        }
        tracing::info!(
            kind = %self.kind,
            records = drafts.len(),
            project = %self.project_key,
            "creating issues"
        );

        let page = self.launcher.launch().context("failed to start browser")?;
        let result = self.create_all(page.as_ref(), &drafts);
        if let Err(e) = page.close() {
            tracing::warn!(error = %e, "failed to close browser session");
        }
        let report = result?;

        let created = report.created_keys();
        if !created.is_empty() {
            write_back(&self.data_path, self.kind, &created)?;
        }
        Ok(report)
    }

    fn create_all(&self, page: &dyn BrowserPage, drafts: &[IssueDraft<'_>]) -> Result<BatchReport> {
        authenticate(page, &self.base_url, &self.credentials, self.element_timeout)?;
        let creator = IssueCreator::new(page, &self.project_key, self.element_timeout);
        Ok(creator.run_batch(self.kind, drafts))
    }
}

fn write_back(path: &Path, kind: ArtifactKind, created: &[(usize, String)]) -> Result<()> {
    update_document(path, |doc| doc.with_created_keys(kind, created))
        .with_context(|| format!("failed to record created keys in {}", path.display()))?;
    tracing::info!(path = %path.display(), created = created.len(), "recorded created issue keys");
    Ok(())
}
