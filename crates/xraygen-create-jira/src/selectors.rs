//! Create-issue dialog selectors. Jira instances differ, custom field ids
//! in particular, so these are the place to adjust.

use std::time::Duration;

pub const CREATE_BUTTON: &str = "#create_link";
pub const CREATE_DIALOG: &str = "#create-issue-dialog";
pub const CREATE_ANOTHER: &str = "#qf-create-another";
pub const PROJECT_FIELD: &str = "#project-field";
pub const ISSUE_TYPE_FIELD: &str = "#issuetype-field";
pub const SUMMARY_FIELD: &str = "#summary";
pub const DESCRIPTION_FIELD: &str = "#description";
pub const COMPONENTS_FIELD: &str = "#components-textarea";
pub const PRIORITY_FIELD: &str = "#priority-field";
pub const SUBMIT_BUTTON: &str = "#create-issue-submit";
pub const SUCCESS_MESSAGE: &str = ".aui-message-success";
pub const TAB_LINKS: &str = "ul.tabs-menu > li > a";

pub const TEST_TYPE_FIELD: &str = "#customfield_15113";
pub const CUCUMBER_SCENARIO_FIELD: &str = ".ace_text-input";
pub const TEST_SETS_FIELD: &str = "#customfield_15118-textarea";

pub const LINK_TYPE_FIELD: &str = "#issuelinks-linktype";
pub const LINK_ISSUES_FIELD: &str = "#issuelinks-issues-textarea";
pub const LINK_ISSUES_PICKER: &str = "#issuelinks-issues-multi-select";

pub const TEST_DETAILS_TAB: &str = "Test Details";
pub const TEST_SETS_TAB: &str = "Test Sets";
pub const LINK_ISSUES_TAB: &str = "Link Issues";
pub const LINK_TYPE_TESTS: &str = "tests";

/// Time for the dialog to re-render after a picker or tab change.
pub const SETTLE_PROJECT: Duration = Duration::from_millis(1000);
pub const SETTLE_FIELD: Duration = Duration::from_millis(2000);
pub const SETTLE_SHORT: Duration = Duration::from_millis(500);
