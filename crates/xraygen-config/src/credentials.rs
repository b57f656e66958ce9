//! Jira and hosted-AI credential resolution.

use crate::{AiConfig, AiProvider, FileCredentials, JiraConfig};
use std::fmt;
use thiserror::Error;

pub const JIRA_USERNAME_ENV: &str = "JIRA_USERNAME";
pub const JIRA_PASSWORD_ENV: &str = "JIRA_PASSWORD";
pub const OPENAI_API_KEY_ENV: &str = "OPENAI_API_KEY";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error(
        "missing Jira credentials: set JIRA_USERNAME and JIRA_PASSWORD or add jira.credentials to config.json"
    )]
    MissingCredentials,
    #[error("missing API key: the hosted AI provider requires OPENAI_API_KEY")]
    MissingApiKey,
}

/// A resolved username and password pair.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl Credentials {
    /// Resolve from `JIRA_USERNAME`/`JIRA_PASSWORD`, then the config file.
    pub fn resolve(jira: &JiraConfig) -> Result<Self, ConfigError> {
        Self::from_sources(
            env_nonempty(JIRA_USERNAME_ENV),
            env_nonempty(JIRA_PASSWORD_ENV),
            jira.credentials.as_ref(),
        )
    }

    /// The environment pair wins only when both halves are present. Otherwise
    /// the config file pair is used, again only when complete.
    pub fn from_sources(
        env_username: Option<String>,
        env_password: Option<String>,
        file: Option<&FileCredentials>,
    ) -> Result<Self, ConfigError> {
        if let (Some(username), Some(password)) = (env_username, env_password) {
            return Ok(Self { username, password });
        }
        match file {
            Some(FileCredentials {
                username: Some(username),
                password: Some(password),
            }) => Ok(Self {
                username: username.clone(),
                password: password.clone(),
            }),
            _ => Err(ConfigError::MissingCredentials),
        }
    }
}

/// Read the hosted-provider API key. Returns `Ok(None)` for the local provider.
pub fn hosted_api_key(ai: &AiConfig) -> Result<Option<String>, ConfigError> {
    match ai.provider {
        AiProvider::Local => Ok(None),
        AiProvider::Hosted => env_nonempty(OPENAI_API_KEY_ENV)
            .map(Some)
            .ok_or(ConfigError::MissingApiKey),
    }
}

fn env_nonempty(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
