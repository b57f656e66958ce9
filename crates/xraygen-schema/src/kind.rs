use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The Xray issue types the creation phase can materialize.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ArtifactKind {
    Test,
    TestSet,
    TestPlan,
    TestExecution,
}

impl ArtifactKind {
    /// Order in which the creation phase replays a document.
    ///
    /// Test sets go first so tests created afterwards can link to them.
    pub const CREATION_ORDER: [ArtifactKind; 4] = [
        ArtifactKind::TestSet,
        ArtifactKind::Test,
        ArtifactKind::TestPlan,
        ArtifactKind::TestExecution,
    ];

    /// Issue type name as shown in Jira's issue-type picker.
    pub fn issue_type(self) -> &'static str {
        match self {
            Self::Test => "Test",
            Self::TestSet => "Test Set",
            Self::TestPlan => "Test Plan",
            Self::TestExecution => "Test Execution",
        }
    }

    /// Command-line spelling, also used in log lines.
    pub fn slug(self) -> &'static str {
        match self {
            Self::Test => "tests",
            Self::TestSet => "test-sets",
            Self::TestPlan => "test-plans",
            Self::TestExecution => "test-executions",
        }
    }

    /// Key of the matching sequence in the artifact file.
    pub fn document_key(self) -> &'static str {
        match self {
            Self::Test => "tests",
            Self::TestSet => "testSets",
            Self::TestPlan => "testPlans",
            Self::TestExecution => "testExecutions",
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

/// Returned when a string names no known artifact kind.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnknownArtifactKind(pub String);

impl fmt::Display for UnknownArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown artifact kind '{}' (expected tests, test-sets, test-plans or test-executions)",
            self.0
        )
    }
}

impl std::error::Error for UnknownArtifactKind {}

impl FromStr for ArtifactKind {
    type Err = UnknownArtifactKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .to_lowercase()
            .chars()
            .filter(|c| !matches!(c, '-' | '_' | ' '))
            .collect();
        match normalized.as_str() {
            "test" | "tests" => Ok(Self::Test),
            "testset" | "testsets" => Ok(Self::TestSet),
            "testplan" | "testplans" => Ok(Self::TestPlan),
            "testexecution" | "testexecutions" => Ok(Self::TestExecution),
            _ => Err(UnknownArtifactKind(s.to_string())),
        }
    }
}
