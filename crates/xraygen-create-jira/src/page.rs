//! Page object for Jira's create-issue dialog.

use crate::selectors::*;
use anyhow::Result;
use itertools::Itertools;
use std::time::Duration;
use xraygen_browser::BrowserError;
use xraygen_ports::{BrowserPage, POLL_INTERVAL};

/// Result of one optional form step.
///
/// A missing or unusable field is not an error: the step reports it and the
/// record carries on.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StepOutcome {
    pub applied: bool,
    pub warning: Option<String>,
}

impl StepOutcome {
    pub fn applied() -> Self {
        Self {
            applied: true,
            warning: None,
        }
    }

    pub fn skipped(warning: impl Into<String>) -> Self {
        Self {
            applied: false,
            warning: Some(warning.into()),
        }
    }
}

pub struct CreateIssuePage<'p> {
    page: &'p dyn BrowserPage,
    element_timeout: Duration,
}

impl<'p> CreateIssuePage<'p> {
    pub fn new(page: &'p dyn BrowserPage, element_timeout: Duration) -> Self {
        Self {
            page,
            element_timeout,
        }
    }

    pub fn is_open(&self) -> Result<bool> {
        self.page.is_visible(CREATE_DIALOG)
    }

    /// Open the dialog and tick "create another" so it stays open between
    /// records.
    pub fn open(&self) -> Result<StepOutcome> {
        self.page.click(CREATE_BUTTON)?;
        if !self.page.wait_for(CREATE_DIALOG, self.element_timeout)? {
            return Err(BrowserError::ElementNotFound {
                selector: CREATE_DIALOG.to_string(),
                waited: self.element_timeout,
            }
            .into());
        }
        Ok(self.checkbox(CREATE_ANOTHER, true, "create another"))
    }

    pub fn select_project(&self, project_key: &str) -> Result<StepOutcome> {
        self.picker(PROJECT_FIELD, project_key, "project", SETTLE_PROJECT)
    }

    pub fn select_issue_type(&self, issue_type: &str) -> Result<StepOutcome> {
        self.picker(ISSUE_TYPE_FIELD, issue_type, "issue type", SETTLE_FIELD)
    }

    /// The summary is required; without it there is nothing to submit.
    pub fn fill_summary(&self, summary: &str) -> Result<()> {
        if !self.page.wait_for(SUMMARY_FIELD, self.element_timeout)? {
            return Err(BrowserError::ElementNotFound {
                selector: SUMMARY_FIELD.to_string(),
                waited: self.element_timeout,
            }
            .into());
        }
        self.page.fill(SUMMARY_FIELD, summary)
    }

    pub fn fill_description(&self, description: &str) -> Result<StepOutcome> {
        if !self.page.is_visible(DESCRIPTION_FIELD)? {
            return Ok(missing("description", DESCRIPTION_FIELD));
        }
        self.page.fill(DESCRIPTION_FIELD, description)?;
        Ok(StepOutcome::applied())
    }

    pub fn fill_components(&self, components: &[String]) -> Result<StepOutcome> {
        if !self.page.is_visible(COMPONENTS_FIELD)? {
            return Ok(missing("components", COMPONENTS_FIELD));
        }
        self.page.click(COMPONENTS_FIELD)?;
        self.page.fill(COMPONENTS_FIELD, "")?;
        for component in components.iter().unique() {
            self.page.fill(COMPONENTS_FIELD, component)?;
            self.page.press(COMPONENTS_FIELD, "Enter")?;
        }
        self.page.pause(SETTLE_FIELD);
        Ok(StepOutcome::applied())
    }

    pub fn fill_priority(&self, priority: &str) -> Result<StepOutcome> {
        self.picker(PRIORITY_FIELD, priority, "priority", SETTLE_FIELD)
    }

    pub fn select_tab(&self, name: &str) -> Result<StepOutcome> {
        if !self.page.click_text(TAB_LINKS, name)? {
            return Ok(StepOutcome::skipped(format!(
                "tab {name:?} not found on the create screen"
            )));
        }
        self.page.pause(SETTLE_SHORT);
        Ok(StepOutcome::applied())
    }

    pub fn set_test_type(&self, test_type: &str) -> Result<StepOutcome> {
        if !self.page.is_visible(TEST_TYPE_FIELD)? {
            return Ok(missing("test type", TEST_TYPE_FIELD));
        }
        if let Err(e) = self.page.select_option(TEST_TYPE_FIELD, test_type) {
            return Ok(StepOutcome::skipped(format!(
                "could not set test type {test_type:?}: {e}"
            )));
        }
        self.page.pause(SETTLE_FIELD);
        Ok(StepOutcome::applied())
    }

    pub fn set_cucumber_scenario(&self, scenario: &str) -> Result<StepOutcome> {
        if !self.page.is_visible(CUCUMBER_SCENARIO_FIELD)? {
            return Ok(missing("cucumber scenario", CUCUMBER_SCENARIO_FIELD));
        }
        self.page.fill(CUCUMBER_SCENARIO_FIELD, scenario)?;
        self.page.pause(SETTLE_SHORT);
        Ok(StepOutcome::applied())
    }

    pub fn link_test_sets(&self, keys: &[String]) -> Result<StepOutcome> {
        if !self.page.is_visible(TEST_SETS_FIELD)? {
            return Ok(missing("test sets", TEST_SETS_FIELD));
        }
        for key in keys.iter().unique() {
            self.page.fill(TEST_SETS_FIELD, key)?;
            self.page.press(TEST_SETS_FIELD, "Enter")?;
            self.page.pause(SETTLE_SHORT);
        }
        Ok(StepOutcome::applied())
    }

    pub fn link_user_stories(&self, keys: &[String]) -> Result<StepOutcome> {
        let mut warning = None;
        if self.page.is_visible(LINK_TYPE_FIELD)?
            && let Err(e) = self.page.select_option(LINK_TYPE_FIELD, LINK_TYPE_TESTS)
        {
            warning = Some(format!("could not set link type {LINK_TYPE_TESTS:?}: {e}"));
        }

        let field = if self.page.is_visible(LINK_ISSUES_FIELD)? {
            LINK_ISSUES_FIELD
        } else if self.page.is_visible(LINK_ISSUES_PICKER)? {
            LINK_ISSUES_PICKER
        } else {
            return Ok(missing("linked issues", LINK_ISSUES_FIELD));
        };
        for key in keys.iter().unique() {
            self.page.fill(field, key)?;
            self.page.press(field, "Enter")?;
        }
        Ok(StepOutcome {
            applied: true,
            warning,
        })
    }

    /// Submit the form and return the confirmation text.
    ///
    /// On the last record "create another" is unticked first so the dialog
    /// closes after this submission.
    pub fn submit(&self, summary: &str, is_last: bool) -> Result<(String, Option<StepOutcome>)> {
        let uncheck = is_last.then(|| self.checkbox(CREATE_ANOTHER, false, "create another"));

        let previous = if self.page.is_visible(SUCCESS_MESSAGE)? {
            Some(self.page.inner_text(SUCCESS_MESSAGE)?)
        } else {
            None
        };

        self.page.click(SUBMIT_BUTTON)?;
        match self.await_confirmation(previous.as_deref())? {
            Some(text) => Ok((text, uncheck)),
            None => Err(BrowserError::Submission {
                summary: summary.to_string(),
                waited: self.element_timeout,
            }
            .into()),
        }
    }

    /// Wait for a success message whose text differs from `previous`.
    fn await_confirmation(&self, previous: Option<&str>) -> Result<Option<String>> {
        let attempts = (self.element_timeout.as_millis() / POLL_INTERVAL.as_millis()).max(1);
        for attempt in 0..=attempts {
            if self.page.is_visible(SUCCESS_MESSAGE)? {
                let text = self.page.inner_text(SUCCESS_MESSAGE)?;
                if previous != Some(text.as_str()) {
                    return Ok(Some(text));
                }
            }
            if attempt < attempts {
                self.page.pause(POLL_INTERVAL);
            }
        }
        Ok(None)
    }

    fn picker(
        &self,
        selector: &str,
        value: &str,
        label: &str,
        settle: Duration,
    ) -> Result<StepOutcome> {
        if !self.page.wait_for(selector, self.element_timeout)? {
            return Ok(missing(label, selector));
        }
        self.page.click(selector)?;
        self.page.fill(selector, value)?;
        self.page.press(selector, "Enter")?;
        self.page.pause(settle);
        Ok(StepOutcome::applied())
    }

    fn checkbox(&self, selector: &str, checked: bool, label: &str) -> StepOutcome {
        match self.page.set_checked(selector, checked) {
            Ok(()) => StepOutcome::applied(),
            Err(e) => StepOutcome::skipped(format!("could not set {label} checkbox: {e}")),
        }
    }
}

fn missing(label: &str, selector: &str) -> StepOutcome {
    StepOutcome::skipped(format!("{label} field ({selector}) not visible"))
}
