//! Small helpers for building fixtures in tests.
//!
//! Keeping these in a microcrate avoids copy-paste across the browser,
//! fetcher, driver and engine tests.

mod page;

pub use page::{PageAction, PageState, ScriptedLauncher, ScriptedPage};

use serde_json::{Value, json};
use xraygen_schema::{GeneratedDocument, IssueRecord, TestRecord, UserStory};

pub fn sample_story() -> UserStory {
    UserStory {
        id: "XTP-42".into(),
        summary: "As a user I can log in with my company account".into(),
        description: "Users authenticate with SSO. Invalid passwords show an error banner."
            .into(),
    }
}

/// A Cucumber test linked to a set and a story, plus one manual test.
pub fn cucumber_test(summary: &str) -> TestRecord {
    TestRecord {
        summary: summary.into(),
        description: format!("Verify: {summary}"),
        test_type: Some("Cucumber".into()),
        priority: Some("High".into()),
        components: vec!["Auth".into(), "Web".into()],
        cucumber_scenario: Some(
            "Scenario: bad password\n  Given the login page\n  When I submit a wrong password\n  Then I see an error"
                .into(),
        ),
        linked_test_sets: vec!["XTP-7".into()],
        linked_user_stories: vec!["XTP-42".into()],
        ..TestRecord::default()
    }
}

pub fn sample_document() -> GeneratedDocument {
    GeneratedDocument {
        tests: vec![
            cucumber_test("Login fails with bad password"),
            TestRecord {
                description: "Log in with valid credentials".into(),
                priority: Some("Medium".into()),
                ..TestRecord::new("Login succeeds with valid password")
            },
        ],
        test_sets: vec![IssueRecord::new("Login regression", "All login tests")],
        ..GeneratedDocument::default()
    }
}

/// A document with `n` plain tests and nothing else.
pub fn document_with_tests(n: usize) -> GeneratedDocument {
    GeneratedDocument {
        tests: (1..=n)
            .map(|i| TestRecord {
                description: format!("Step-by-step check number {i}"),
                ..TestRecord::new(format!("Generated test {i}"))
            })
            .collect(),
        ..GeneratedDocument::default()
    }
}

/// The document from the local-provider end-to-end example.
pub fn local_provider_body() -> Value {
    json!({
        "response": "{\"tests\":[{\"summary\":\"Login fails with bad password\"}],\"testSets\":[]}"
    })
}
