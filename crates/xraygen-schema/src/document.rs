use crate::kind::ArtifactKind;
use crate::lenient;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// The artifact handed from the generation phase to the creation phase.
///
/// `tests` and `testSets` are always present after deserialization, whatever
/// the source held at those keys. Plans and executions are optional and are
/// omitted from the file when empty.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedDocument {
    #[serde(default, deserialize_with = "lenient::records")]
    pub tests: Vec<TestRecord>,
    #[serde(default, deserialize_with = "lenient::records")]
    pub test_sets: Vec<IssueRecord>,
    #[serde(
        default,
        deserialize_with = "lenient::records",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub test_plans: Vec<IssueRecord>,
    #[serde(
        default,
        deserialize_with = "lenient::records",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub test_executions: Vec<IssueRecord>,
}

/// One Xray Test.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestRecord {
    #[serde(default, deserialize_with = "lenient::text")]
    pub summary: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub description: String,
    #[serde(
        rename = "type",
        default,
        deserialize_with = "lenient::opt_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub test_type: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient::opt_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub priority: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient::strings",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub components: Vec<String>,
    #[serde(
        default,
        deserialize_with = "lenient::opt_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub cucumber_scenario: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient::strings",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub linked_test_sets: Vec<String>,
    #[serde(
        default,
        deserialize_with = "lenient::strings",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub linked_user_stories: Vec<String>,
    /// Jira key assigned on creation.
    #[serde(
        default,
        deserialize_with = "lenient::opt_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<String>,
    /// Keys this tool does not interpret, kept so rewrites don't lose them.
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// A Test Set, Test Plan or Test Execution.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueRecord {
    #[serde(default, deserialize_with = "lenient::text")]
    pub summary: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub description: String,
    #[serde(
        default,
        deserialize_with = "lenient::opt_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl TestRecord {
    pub fn new(summary: impl Into<String>) -> Self {
        Self {
            summary: summary.into(),
            ..Self::default()
        }
    }

    /// Cucumber tests carry a scenario that goes on the Test Details tab.
    pub fn is_cucumber(&self) -> bool {
        self.test_type
            .as_deref()
            .is_some_and(|t| t.eq_ignore_ascii_case("cucumber"))
            && self
                .cucumber_scenario
                .as_deref()
                .is_some_and(|s| !s.trim().is_empty())
    }
}

impl IssueRecord {
    pub fn new(summary: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            summary: summary.into(),
            description: description.into(),
            ..Self::default()
        }
    }
}

/// Borrowed view of one record, uniform across artifact kinds.
#[derive(Clone, Copy, Debug)]
pub struct IssueDraft<'a> {
    pub index: usize,
    pub kind: ArtifactKind,
    pub summary: &'a str,
    pub description: &'a str,
    /// Present only for [`ArtifactKind::Test`].
    pub test: Option<&'a TestRecord>,
}

impl GeneratedDocument {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a document from any JSON value.
    ///
    /// Non-object values yield the empty document.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(_) => serde_json::from_value(value).unwrap_or_default(),
            _ => Self::default(),
        }
    }

    /// True when at least one test or test set was produced.
    pub fn has_generated_content(&self) -> bool {
        !self.tests.is_empty() || !self.test_sets.is_empty()
    }

    pub fn count(&self, kind: ArtifactKind) -> usize {
        match kind {
            ArtifactKind::Test => self.tests.len(),
            ArtifactKind::TestSet => self.test_sets.len(),
            ArtifactKind::TestPlan => self.test_plans.len(),
            ArtifactKind::TestExecution => self.test_executions.len(),
        }
    }

    pub fn drafts(&self, kind: ArtifactKind) -> Vec<IssueDraft<'_>> {
        match kind {
            ArtifactKind::Test => self
                .tests
                .iter()
                .enumerate()
                .map(|(index, t)| IssueDraft {
                    index,
                    kind,
                    summary: &t.summary,
                    description: &t.description,
                    test: Some(t),
                })
                .collect(),
            _ => self
                .issue_records(kind)
                .iter()
                .enumerate()
                .map(|(index, r)| IssueDraft {
                    index,
                    kind,
                    summary: &r.summary,
                    description: &r.description,
                    test: None,
                })
                .collect(),
        }
    }

    fn issue_records(&self, kind: ArtifactKind) -> &[IssueRecord] {
        match kind {
            ArtifactKind::Test => &[],
            ArtifactKind::TestSet => &self.test_sets,
            ArtifactKind::TestPlan => &self.test_plans,
            ArtifactKind::TestExecution => &self.test_executions,
        }
    }

    /// Return a copy with created Jira keys assigned to the records at the
    /// given indices. Out-of-range indices are ignored.
    pub fn with_created_keys(mut self, kind: ArtifactKind, keys: &[(usize, String)]) -> Self {
        for (index, key) in keys {
            let slot = match kind {
                ArtifactKind::Test => self.tests.get_mut(*index).map(|t| &mut t.id),
                ArtifactKind::TestSet => self.test_sets.get_mut(*index).map(|r| &mut r.id),
                ArtifactKind::TestPlan => self.test_plans.get_mut(*index).map(|r| &mut r.id),
                ArtifactKind::TestExecution => {
                    self.test_executions.get_mut(*index).map(|r| &mut r.id)
                }
            };
            if let Some(slot) = slot {
                *slot = Some(key.clone());
            }
        }
        self
    }
}
