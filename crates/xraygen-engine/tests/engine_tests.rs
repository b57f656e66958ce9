use anyhow::{Result, bail};
use std::cell::RefCell;
use std::path::{Path, PathBuf};
use xraygen_engine::{Engine, Invocation, Mode};
use xraygen_ports::{CreationRunner, RunnerOutput, StoryFetcher, TestGenerator};
use xraygen_schema::{ArtifactKind, GeneratedDocument, IssueRecord, UserStory};
use xraygen_store::{ArtifactStore, load_document, write_document};
use xraygen_testkit::{document_with_tests, sample_document, sample_story};

struct StubFetcher {
    fail: bool,
    calls: RefCell<Vec<String>>,
}

impl StubFetcher {
    fn ok() -> Self {
        Self {
            fail: false,
            calls: RefCell::default(),
        }
    }
}

impl StoryFetcher for StubFetcher {
    fn fetch(&self, issue: &str) -> Result<UserStory> {
        self.calls.borrow_mut().push(issue.to_string());
        if self.fail {
            bail!("issue view did not load");
        }
        Ok(sample_story())
    }
}

struct FixedGenerator(GeneratedDocument);

impl TestGenerator for FixedGenerator {
    fn generate(&self, _story: &UserStory) -> GeneratedDocument {
        self.0.clone()
    }
}

#[derive(Default)]
struct RecordingRunner {
    calls: RefCell<Vec<(ArtifactKind, PathBuf, String)>>,
    failing: Vec<ArtifactKind>,
}

impl CreationRunner for RecordingRunner {
    fn run(&self, kind: ArtifactKind, data_path: &Path, project_key: &str) -> Result<RunnerOutput> {
        self.calls
            .borrow_mut()
            .push((kind, data_path.to_path_buf(), project_key.to_string()));
        if self.failing.contains(&kind) {
            return Ok(RunnerOutput {
                success: false,
                stdout: String::new(),
                stderr: "submission failed".into(),
            });
        }
        Ok(RunnerOutput {
            success: true,
            stdout: format!("created {kind}"),
            stderr: String::new(),
        })
    }
}

impl RecordingRunner {
    fn kinds(&self) -> Vec<ArtifactKind> {
        self.calls.borrow().iter().map(|(k, _, _)| *k).collect()
    }
}

fn invocation(mode: Mode) -> Invocation {
    Invocation {
        mode,
        issue: "XTP-42".into(),
        project_key: "XTP".into(),
    }
}

fn store(dir: &tempfile::TempDir) -> ArtifactStore {
    ArtifactStore::new(dir.path().join("Projects")).unwrap()
}

#[test]
fn file_mode_saves_and_never_creates() {
    let dir = tempfile::tempdir().unwrap();
    let store = store(&dir);
    let fetcher = StubFetcher::ok();
    let generator = FixedGenerator(sample_document());
    let runner = RecordingRunner::default();

    let report = Engine::new(&fetcher, &generator, &runner, &store)
        .run(&invocation(Mode::File))
        .unwrap();

    let path = dir.path().join("Projects/XTP/XTP-42.json");
    assert_eq!(
        report.generation.unwrap().document_path.as_deref(),
        Some(path.as_path())
    );
    assert_eq!(load_document(&path).unwrap(), sample_document());
    assert!(runner.kinds().is_empty());
    assert!(report.creation.is_none());
}

#[test]
fn all_mode_creates_kinds_in_order_and_skips_empty_ones() {
    let dir = tempfile::tempdir().unwrap();
    let store = store(&dir);
    let mut document = sample_document();
    document.test_plans.push(IssueRecord::new("Sprint 12 plan", ""));
    let fetcher = StubFetcher::ok();
    let generator = FixedGenerator(document);
    let runner = RecordingRunner::default();

    let report = Engine::new(&fetcher, &generator, &runner, &store)
        .run(&invocation(Mode::All))
        .unwrap();

    assert!(report.is_success());
    assert_eq!(
        runner.kinds(),
        [ArtifactKind::TestSet, ArtifactKind::Test, ArtifactKind::TestPlan]
    );
    let expected = dir.path().join("Projects/XTP/XTP-42.json");
    for (_, path, project) in runner.calls.borrow().iter() {
        assert_eq!(path, &expected);
        assert_eq!(project, "XTP");
    }
}

#[test]
fn all_mode_skips_creation_when_nothing_was_generated() {
    let dir = tempfile::tempdir().unwrap();
    let store = store(&dir);
    let fetcher = StubFetcher::ok();
    let generator = FixedGenerator(GeneratedDocument::empty());
    let runner = RecordingRunner::default();

    let report = Engine::new(&fetcher, &generator, &runner, &store)
        .run(&invocation(Mode::All))
        .unwrap();

    assert!(report.generation.unwrap().document_path.is_none());
    assert!(runner.kinds().is_empty());
    assert!(!dir.path().join("Projects/XTP/XTP-42.json").exists());
}

#[test]
fn jira_mode_reads_the_saved_file_without_fetching() {
    let dir = tempfile::tempdir().unwrap();
    let store = store(&dir);
    store.save(&document_with_tests(2), "XTP", "XTP-42").unwrap();
    let fetcher = StubFetcher::ok();
    let generator = FixedGenerator(sample_document());
    let runner = RecordingRunner::default();

    let report = Engine::new(&fetcher, &generator, &runner, &store)
        .run(&invocation(Mode::Jira))
        .unwrap();

    assert!(fetcher.calls.borrow().is_empty());
    assert_eq!(runner.kinds(), [ArtifactKind::Test]);
    let creation = report.creation.unwrap();
    assert_eq!(creation.runs[0].records, 2);
}

#[test]
fn jira_mode_accepts_an_issue_url() {
    let dir = tempfile::tempdir().unwrap();
    let store = store(&dir);
    store.save(&document_with_tests(1), "XTP", "XTP-42").unwrap();
    let fetcher = StubFetcher::ok();
    let generator = FixedGenerator(GeneratedDocument::empty());
    let runner = RecordingRunner::default();
    let invocation = Invocation {
        issue: "https://example.atlassian.net/browse/XTP-42".into(),
        ..invocation(Mode::Jira)
    };

    let report = Engine::new(&fetcher, &generator, &runner, &store)
        .run(&invocation)
        .unwrap();

    assert_eq!(report.story_id, "XTP-42");
    assert_eq!(runner.kinds(), [ArtifactKind::Test]);
}

#[test]
fn jira_mode_without_a_file_names_the_missing_path() {
    let dir = tempfile::tempdir().unwrap();
    let store = store(&dir);
    let fetcher = StubFetcher::ok();
    let generator = FixedGenerator(GeneratedDocument::empty());
    let runner = RecordingRunner::default();

    let err = Engine::new(&fetcher, &generator, &runner, &store)
        .run(&invocation(Mode::Jira))
        .unwrap_err();

    let message = format!("{err:#}");
    assert!(message.contains("XTP-42.json"), "{message}");
    assert!(message.contains("FILE mode"), "{message}");
    assert!(runner.kinds().is_empty());
}

#[test]
fn failed_kind_is_reported_and_later_kinds_still_run() {
    let dir = tempfile::tempdir().unwrap();
    let store = store(&dir);
    let path = store.document_path("XTP", "XTP-42").unwrap();
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    write_document(&path, &sample_document()).unwrap();
    let fetcher = StubFetcher::ok();
    let generator = FixedGenerator(GeneratedDocument::empty());
    let runner = RecordingRunner {
        failing: vec![ArtifactKind::TestSet],
        ..RecordingRunner::default()
    };

    let report = Engine::new(&fetcher, &generator, &runner, &store)
        .run(&invocation(Mode::Jira))
        .unwrap();

    assert!(!report.is_success());
    assert_eq!(runner.kinds(), [ArtifactKind::TestSet, ArtifactKind::Test]);
    let creation = report.creation.unwrap();
    assert_eq!(creation.failed_kinds(), [ArtifactKind::TestSet]);
    assert!(creation.runs[1].output.success);
    assert_eq!(creation.runs[1].kind, ArtifactKind::Test);
}

#[test]
fn fetch_failure_aborts_before_anything_is_written() {
    let dir = tempfile::tempdir().unwrap();
    let store = store(&dir);
    let fetcher = StubFetcher {
        fail: true,
        calls: RefCell::default(),
    };
    let generator = FixedGenerator(sample_document());
    let runner = RecordingRunner::default();

    let err = Engine::new(&fetcher, &generator, &runner, &store)
        .run(&invocation(Mode::All))
        .unwrap_err();

    assert!(format!("{err:#}").contains("failed to fetch user story XTP-42"));
    assert!(!dir.path().join("Projects").exists());
    assert!(runner.kinds().is_empty());
}
