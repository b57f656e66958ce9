use std::fmt;
use thiserror::Error;

pub const USAGE: &str = "\
Usage:
  xraygen generate <ISSUE_KEY> [PROJECT_KEY]        (fetch -> generate -> create)
  xraygen generate FILE <ISSUE_KEY> [PROJECT_KEY]   (fetch -> generate only)
  xraygen generate JIRA <ISSUE_KEY> [PROJECT_KEY]   (create from the existing file)";

/// Which phases a run covers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    /// Fetch, generate, then create.
    All,
    /// Fetch and generate only.
    File,
    /// Create from a previously written file.
    Jira,
}

impl Mode {
    pub fn generates(self) -> bool {
        matches!(self, Mode::All | Mode::File)
    }

    pub fn creates(self) -> bool {
        matches!(self, Mode::All | Mode::Jira)
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::All => write!(f, "ALL"),
            Mode::File => write!(f, "FILE"),
            Mode::Jira => write!(f, "JIRA"),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("{0}")]
pub struct UsageError(pub String);

/// A parsed `generate` command line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Invocation {
    pub mode: Mode,
    /// Issue key or issue URL, as given.
    pub issue: String,
    pub project_key: String,
}

impl Invocation {
    /// Parse `[MODE] <ISSUE_KEY> [PROJECT_KEY]`. Mode words are
    /// case-insensitive; without one the mode is [`Mode::All`].
    pub fn parse<S: AsRef<str>>(args: &[S], default_project: &str) -> Result<Self, UsageError> {
        let args: Vec<&str> = args
            .iter()
            .map(|a| a.as_ref().trim())
            .filter(|a| !a.is_empty())
            .collect();

        let (mode, rest) = match args.first().map(|a| a.to_uppercase()) {
            Some(word) if word == "FILE" => (Mode::File, &args[1..]),
            Some(word) if word == "JIRA" => (Mode::Jira, &args[1..]),
            _ => (Mode::All, &args[..]),
        };

        let (issue, project) = match rest {
            [] => return Err(UsageError("issue key is required".to_string())),
            [issue] => (*issue, default_project),
            [issue, project] => (*issue, *project),
            [_, _, extra, ..] => {
                return Err(UsageError(format!("unexpected argument {extra:?}")));
            }
        };

        if project.is_empty() {
            return Err(UsageError("project key is required".to_string()));
        }
        Ok(Self {
            mode,
            issue: issue.to_string(),
            project_key: project.to_string(),
        })
    }
}
