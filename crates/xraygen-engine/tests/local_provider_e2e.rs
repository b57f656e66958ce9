//! FILE mode against a scripted Jira page and a mock local model server.

use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};
use xraygen_config::Credentials;
use xraygen_engine::{Engine, Invocation};
use xraygen_ingest_jira::{DESCRIPTION_FIELD, JiraStoryFetcher, SUMMARY_FIELD};
use xraygen_llm::{LlmTestGenerator, OllamaBackend, prompt};
use xraygen_ports::{CreationRunner, RunnerOutput};
use xraygen_schema::ArtifactKind;
use xraygen_store::ArtifactStore;
use xraygen_testkit::{ScriptedLauncher, ScriptedPage, local_provider_body};

struct NoRunner;

impl CreationRunner for NoRunner {
    fn run(
        &self,
        kind: ArtifactKind,
        _data_path: &std::path::Path,
        _project_key: &str,
    ) -> anyhow::Result<RunnerOutput> {
        panic!("FILE mode must not create {kind}");
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn file_mode_writes_the_generated_document() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .respond_with(ResponseTemplate::new(200).set_body_json(local_provider_body()))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().join("Projects");
    let base = server.uri();

    let written = tokio::task::spawn_blocking(move || {
        let page = ScriptedPage::new()
            .with_text(SUMMARY_FIELD, "As a user I can log in")
            .with_text(DESCRIPTION_FIELD, "SSO login with error banner");
        let launcher = ScriptedLauncher::new(page);
        let fetcher = JiraStoryFetcher::new(
            &launcher,
            "https://example.atlassian.net",
            Credentials {
                username: "qa.bot".into(),
                password: "s3cret".into(),
            },
        )
        .with_summary_timeout(Duration::from_millis(200));
        let generator = LlmTestGenerator::new(
            Box::new(OllamaBackend::new(&base, "llama3.1:8b", 5)),
            prompt::BUILTIN_TEMPLATE,
        );
        let store = ArtifactStore::new(&root).unwrap();
        let invocation = Invocation::parse(&["FILE", "XTP-42", "XTP"], "XTP").unwrap();

        let report = Engine::new(&fetcher, &generator, &NoRunner, &store)
            .run(&invocation)
            .unwrap();
        assert!(launcher.page().is_closed());
        report.generation.unwrap().document_path.unwrap()
    })
    .await
    .unwrap();

    assert_eq!(written, dir.path().join("Projects/XTP/XTP-42.json"));
    let saved: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&written).unwrap()).unwrap();
    assert_eq!(saved["tests"][0]["summary"], json!("Login fails with bad password"));
    assert_eq!(saved["tests"].as_array().unwrap().len(), 1);
    assert_eq!(saved["testSets"], json!([]));
}
