//! The Jira login form.

use crate::BrowserError;
use anyhow::{Context, Result};
use std::time::Duration;
use xraygen_config::Credentials;
use xraygen_ports::BrowserPage;

pub const USERNAME_FIELD: &str = r#"input[name="os_username"]"#;
pub const PASSWORD_FIELD: &str = r#"input[name="os_password"]"#;
pub const SUBMIT_BUTTON: &str = r##"#login-form-submit, input[value="Log In"]"##;

/// Navigate to `entry_url` and log in if the login form is shown.
///
/// A page without the form is treated as an existing session and nothing is
/// submitted. After submitting, the form must disappear within `timeout`.
pub fn authenticate(
    page: &dyn BrowserPage,
    entry_url: &str,
    credentials: &Credentials,
    timeout: Duration,
) -> Result<()> {
    page.goto(entry_url)
        .with_context(|| format!("failed to open {entry_url}"))?;
    page.wait_for_idle()?;

    if !page.is_visible(USERNAME_FIELD)? {
        tracing::debug!(url = entry_url, "no login form, session already authenticated");
        return Ok(());
    }

    tracing::info!(user = %credentials.username, "logging in to Jira");
    page.fill(USERNAME_FIELD, &credentials.username)?;
    page.fill(PASSWORD_FIELD, &credentials.password)?;
    page.click(SUBMIT_BUTTON)?;
    page.wait_for_idle()?;

    if !page.wait_until_hidden(USERNAME_FIELD, timeout)? {
        return Err(BrowserError::Authentication {
            url: entry_url.to_string(),
            waited: timeout,
        }
        .into());
    }
    tracing::debug!("login accepted");
    Ok(())
}
