//! Configuration management and loading for xraygen.
//!
//! `config.json` values are overlaid field by field onto hard defaults.
//! Loading never fails: an unreadable or malformed file, or a single
//! ill-typed field, falls back to the default for what it could not supply.

mod credentials;

pub use credentials::{
    ConfigError, Credentials, JIRA_PASSWORD_ENV, JIRA_USERNAME_ENV, OPENAI_API_KEY_ENV,
    hosted_api_key,
};

use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::path::{Path, PathBuf};

/// Well-known config location, relative to the working directory.
pub const CONFIG_FILENAME: &str = "config.json";

pub const DEFAULT_JIRA_BASE_URL: &str = "https://jira.example.com";
pub const DEFAULT_PROJECT_KEY: &str = "XTP";
pub const DEFAULT_AI_BASE_URL: &str = "http://localhost:11434";
pub const DEFAULT_AI_MODEL: &str = "llama3.1:8b";
pub const DEFAULT_AI_TIMEOUT_SECS: u64 = 120;
pub const DEFAULT_ELEMENT_TIMEOUT_SECS: u64 = 10;
/// Longest accepted timeout; larger values fall back to the default.
pub const MAX_TIMEOUT_SECS: u64 = 3600;
pub const DEFAULT_PROJECTS_DIR: &str = "Projects";
pub const DEFAULT_PROMPT_TEMPLATE: &str = "PROMPT_TEMPLATE.md";

/// Which generation backend to talk to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AiProvider {
    /// Self-hosted model server speaking the `/api/generate` protocol.
    #[default]
    Local,
    /// Chat-completions API with bearer-token auth.
    Hosted,
}

impl AiProvider {
    /// Parse a provider name. `ollama` and `openai` are accepted as aliases.
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "local" | "ollama" => Some(Self::Local),
            "hosted" | "openai" => Some(Self::Hosted),
            _ => None,
        }
    }
}

impl fmt::Display for AiProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AiProvider::Local => write!(f, "local"),
            AiProvider::Hosted => write!(f, "hosted"),
        }
    }
}

/// Credentials as written in the config file. Either half may be missing.
#[derive(Clone, Default, PartialEq, Eq, Serialize)]
pub struct FileCredentials {
    pub username: Option<String>,
    pub password: Option<String>,
}

impl fmt::Debug for FileCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileCredentials")
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JiraConfig {
    pub base_url: String,
    pub project_key_default: String,
    #[serde(skip)]
    pub credentials: Option<FileCredentials>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AiConfig {
    pub provider: AiProvider,
    pub base_url: String,
    pub model: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BrowserConfig {
    pub headless: bool,
    pub element_timeout_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PathsConfig {
    pub projects_dir: PathBuf,
    pub prompt_template: PathBuf,
}

/// Main xraygen configuration. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AppConfig {
    pub jira: JiraConfig,
    pub ai: AiConfig,
    pub browser: BrowserConfig,
    pub paths: PathsConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            jira: JiraConfig {
                base_url: DEFAULT_JIRA_BASE_URL.to_string(),
                project_key_default: DEFAULT_PROJECT_KEY.to_string(),
                credentials: None,
            },
            ai: AiConfig {
                provider: AiProvider::Local,
                base_url: DEFAULT_AI_BASE_URL.to_string(),
                model: DEFAULT_AI_MODEL.to_string(),
                timeout_secs: DEFAULT_AI_TIMEOUT_SECS,
            },
            browser: BrowserConfig {
                headless: false,
                element_timeout_secs: DEFAULT_ELEMENT_TIMEOUT_SECS,
            },
            paths: PathsConfig {
                projects_dir: PathBuf::from(DEFAULT_PROJECTS_DIR),
                prompt_template: PathBuf::from(DEFAULT_PROMPT_TEMPLATE),
            },
        }
    }
}

/// Load `config.json` from the working directory.
pub fn load() -> AppConfig {
    load_from(CONFIG_FILENAME)
}

/// Load configuration from an explicit path. Never fails.
pub fn load_from(path: impl AsRef<Path>) -> AppConfig {
    let path = path.as_ref();
    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) => {
            tracing::debug!(
                path = %path.display(),
                error = %e,
                "config not readable, using defaults"
            );
            return AppConfig::default();
        }
    };
    match serde_json::from_str::<Value>(&text) {
        Ok(value) => resolve(&value),
        Err(e) => {
            tracing::debug!(
                path = %path.display(),
                error = %e,
                "config is not valid JSON, using defaults"
            );
            AppConfig::default()
        }
    }
}

/// Overlay the values of a parsed config document onto the defaults.
///
/// Each field is taken from the document only when present, of the right
/// type, and (for strings) non-empty.
pub fn resolve(value: &Value) -> AppConfig {
    let defaults = AppConfig::default();

    let credentials = value
        .pointer("/jira/credentials")
        .filter(|v| v.is_object())
        .map(|_| FileCredentials {
            username: str_at(value, "/jira/credentials/username"),
            password: str_at(value, "/jira/credentials/password"),
        });

    let provider = str_at(value, "/ai/provider")
        .and_then(|name| AiProvider::parse(&name))
        .unwrap_or(defaults.ai.provider);

    AppConfig {
        jira: JiraConfig {
            base_url: str_at(value, "/jira/baseUrl").unwrap_or(defaults.jira.base_url),
            project_key_default: str_at(value, "/jira/projectKeyDefault")
                .unwrap_or(defaults.jira.project_key_default),
            credentials,
        },
        ai: AiConfig {
            provider,
            base_url: str_at(value, "/ai/baseUrl").unwrap_or(defaults.ai.base_url),
            model: str_at(value, "/ai/model").unwrap_or(defaults.ai.model),
            timeout_secs: timeout_secs_at(value, "/ai/timeoutSecs")
                .unwrap_or(defaults.ai.timeout_secs),
        },
        browser: BrowserConfig {
            headless: value
                .pointer("/browser/headless")
                .and_then(Value::as_bool)
                .unwrap_or(defaults.browser.headless),
            element_timeout_secs: timeout_secs_at(value, "/browser/elementTimeoutSecs")
                .unwrap_or(defaults.browser.element_timeout_secs),
        },
        paths: PathsConfig {
            projects_dir: str_at(value, "/paths/projectsDir")
                .map(PathBuf::from)
                .unwrap_or(defaults.paths.projects_dir),
            prompt_template: str_at(value, "/paths/promptTemplate")
                .map(PathBuf::from)
                .unwrap_or(defaults.paths.prompt_template),
        },
    }
}

fn str_at(value: &Value, pointer: &str) -> Option<String> {
    value
        .pointer(pointer)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn timeout_secs_at(value: &Value, pointer: &str) -> Option<u64> {
    value
        .pointer(pointer)
        .and_then(Value::as_u64)
        .filter(|n| (1..=MAX_TIMEOUT_SECS).contains(n))
}
