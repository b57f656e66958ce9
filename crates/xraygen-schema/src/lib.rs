//! Canonical data model for the xraygen pipeline.
//!
//! Defines the user story read from Jira, the generated test document that is
//! handed from the generation phase to the creation phase, and the artifact
//! kinds the creation phase knows how to materialize. All other crates depend
//! on these types.

pub mod document;
pub mod kind;
mod lenient;
pub mod story;

pub use document::{GeneratedDocument, IssueDraft, IssueRecord, TestRecord};
pub use kind::{ArtifactKind, UnknownArtifactKind};
pub use story::{UserStory, story_id_from_reference};
