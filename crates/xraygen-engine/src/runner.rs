use anyhow::{Context, Result};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;
use xraygen_ports::{CreationRunner, RunnerOutput};
use xraygen_schema::ArtifactKind;

/// Runs each creation batch as `<program> [global args] create ...` in a
/// child process with its own browser session.
#[derive(Clone, Debug)]
pub struct SubprocessRunner {
    pub program: PathBuf,
    /// Flags placed before the subcommand, e.g. `--config` or `--headless`.
    pub global_args: Vec<OsString>,
}

impl SubprocessRunner {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            global_args: Vec::new(),
        }
    }

    /// Re-invoke the running binary.
    pub fn current_exe() -> Result<Self> {
        let exe = std::env::current_exe().context("failed to locate the xraygen binary")?;
        Ok(Self::new(exe))
    }

    pub fn with_global_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.global_args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn command(&self, kind: ArtifactKind, data_path: &Path, project_key: &str) -> Command {
        let mut command = Command::new(&self.program);
        command
            .args(&self.global_args)
            .arg("create")
            .arg("--kind")
            .arg(kind.slug())
            .arg("--data")
            .arg(data_path)
            .arg("--project")
            .arg(project_key);
        command
    }
}

impl CreationRunner for SubprocessRunner {
    fn run(&self, kind: ArtifactKind, data_path: &Path, project_key: &str) -> Result<RunnerOutput> {
        tracing::debug!(program = %self.program.display(), kind = %kind, "spawning creation batch");
        let output = self
            .command(kind, data_path, project_key)
            .output()
            .with_context(|| format!("failed to run {}", self.program.display()))?;
        Ok(RunnerOutput {
            success: output.status.success(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}
