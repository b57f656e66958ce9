//! Orchestration engine for xraygen.
//!
//! Wires the story fetcher, test generator, artifact store and creation
//! runner together. The two phases only share the artifact file, so the
//! creation phase can run long after generation.

mod mode;
mod runner;

pub use mode::{Invocation, Mode, USAGE, UsageError};
pub use runner::SubprocessRunner;

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use xraygen_ports::{CreationRunner, RunnerOutput, StoryFetcher, TestGenerator};
use xraygen_schema::{ArtifactKind, UserStory, story_id_from_reference};
use xraygen_store::{ArtifactStore, load_document};

/// What the generation phase produced.
#[derive(Clone, Debug)]
pub struct GenerationOutcome {
    pub story: UserStory,
    /// `None` when the model produced no tests and no test sets.
    pub document_path: Option<PathBuf>,
    pub tests: usize,
    pub test_sets: usize,
}

/// One child run of the creation phase.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KindRun {
    pub kind: ArtifactKind,
    pub records: usize,
    pub output: RunnerOutput,
}

#[derive(Clone, Debug, Default)]
pub struct CreationOutcome {
    pub document_path: PathBuf,
    pub runs: Vec<KindRun>,
}

impl CreationOutcome {
    pub fn failed_kinds(&self) -> Vec<ArtifactKind> {
        self.runs
            .iter()
            .filter(|r| !r.output.success)
            .map(|r| r.kind)
            .collect()
    }
}

/// Result of a whole `generate` invocation.
#[derive(Clone, Debug)]
pub struct RunReport {
    pub invocation: Invocation,
    pub story_id: String,
    pub generation: Option<GenerationOutcome>,
    pub creation: Option<CreationOutcome>,
}

impl RunReport {
    pub fn is_success(&self) -> bool {
        self.creation
            .as_ref()
            .is_none_or(|c| c.failed_kinds().is_empty())
    }
}

pub struct Engine<'a> {
    pub fetcher: &'a dyn StoryFetcher,
    pub generator: &'a dyn TestGenerator,
    pub runner: &'a dyn CreationRunner,
    pub store: &'a ArtifactStore,
}

impl<'a> Engine<'a> {
    pub fn new(
        fetcher: &'a dyn StoryFetcher,
        generator: &'a dyn TestGenerator,
        runner: &'a dyn CreationRunner,
        store: &'a ArtifactStore,
    ) -> Self {
        Self {
            fetcher,
            generator,
            runner,
            store,
        }
    }

    /// Run the phases selected by the invocation's mode.
    pub fn run(&self, invocation: &Invocation) -> Result<RunReport> {
        let mut report = RunReport {
            invocation: invocation.clone(),
            story_id: story_id_from_reference(&invocation.issue),
            generation: None,
            creation: None,
        };

        if invocation.mode.generates() {
            let generation = self.generation_phase(&invocation.issue, &invocation.project_key)?;
            report.story_id = generation.story.id.clone();
            let produced = generation.document_path.is_some();
            report.generation = Some(generation);
            if !produced {
                if invocation.mode == Mode::All {
                    tracing::info!("no tests generated, skipping creation phase");
                }
                return Ok(report);
            }
        }

        if invocation.mode.creates() {
            let path = self
                .store
                .document_path(&invocation.project_key, &report.story_id)?;
            report.creation = Some(self.creation_phase(&path, &invocation.project_key)?);
        }
        Ok(report)
    }

    /// Fetch the story, generate tests, and save them if there are any.
    pub fn generation_phase(&self, issue: &str, project_key: &str) -> Result<GenerationOutcome> {
        tracing::info!(issue, "fetching user story and generating tests");
        let story = self
            .fetcher
            .fetch(issue)
            .with_context(|| format!("failed to fetch user story {issue}"))?;
        let document = self.generator.generate(&story);

        let (tests, test_sets) = (document.tests.len(), document.test_sets.len());
        if !document.has_generated_content() {
            tracing::warn!(story = %story.id, "no tests generated");
            return Ok(GenerationOutcome {
                story,
                document_path: None,
                tests,
                test_sets,
            });
        }

        tracing::info!(tests, test_sets, "generated test document");
        let path = self
            .store
            .save(&document, project_key, &story.id)
            .with_context(|| format!("failed to save tests for {}", story.id))?;
        Ok(GenerationOutcome {
            story,
            document_path: Some(path),
            tests,
            test_sets,
        })
    }

    /// Create issues from the file at `path`, one child run per artifact
    /// kind in creation order. A failed kind is logged and the next kind
    /// still runs.
    pub fn creation_phase(&self, path: &Path, project_key: &str) -> Result<CreationOutcome> {
        let document = load_document(path).with_context(|| {
            format!(
                "cannot create issues from {}; run the FILE mode first to generate tests",
                path.display()
            )
        })?;
        tracing::info!(path = %path.display(), "creating Jira issues");

        let mut outcome = CreationOutcome {
            document_path: path.to_path_buf(),
            runs: Vec::new(),
        };
        for kind in ArtifactKind::CREATION_ORDER {
            let records = document.count(kind);
            if records == 0 {
                tracing::debug!(kind = %kind, "no records, skipping");
                continue;
            }

            tracing::info!(kind = %kind, records, "running creation batch");
            let output = match self.runner.run(kind, path, project_key) {
                Ok(output) => output,
                Err(e) => RunnerOutput {
                    success: false,
                    stdout: String::new(),
                    stderr: format!("{e:#}"),
                },
            };
            log_child_output(kind, &output);
            outcome.runs.push(KindRun {
                kind,
                records,
                output,
            });
        }
        Ok(outcome)
    }
}

fn log_child_output(kind: ArtifactKind, output: &RunnerOutput) {
    let stdout = output.stdout.trim();
    let stderr = output.stderr.trim();
    if !stdout.is_empty() {
        tracing::info!(kind = %kind, "batch output:\n{stdout}");
    }
    if output.success {
        if !stderr.is_empty() {
            tracing::debug!(kind = %kind, "batch diagnostics:\n{stderr}");
        }
        tracing::info!(kind = %kind, "creation batch finished");
    } else {
        tracing::error!(kind = %kind, "creation batch failed:\n{stderr}");
    }
}
