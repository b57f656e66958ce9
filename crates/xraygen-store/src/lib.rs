//! Artifact files handed from the generation phase to the creation phase.
//!
//! Layout: `{root}/{projectKey}/{storyId}.json`, pretty JSON. Every write
//! goes through a temp file in the target directory and a rename, so a
//! reader sees either the old or the new document.

mod comments;

pub use comments::strip_comments;

use serde_json::Value;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use thiserror::Error;
use xraygen_schema::GeneratedDocument;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("invalid path {path:?}: {reason}")]
    InvalidPath { path: PathBuf, reason: &'static str },

    #[error("file not found: {}", .path.display())]
    FileNotFound { path: PathBuf },

    #[error("malformed JSON in {}: {source}", .path.display())]
    MalformedData {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize document: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl StoreError {
    fn io(path: &Path, source: std::io::Error) -> Self {
        StoreError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// File-backed store rooted at an absolute projects directory.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArtifactStore {
    root: PathBuf,
}

impl ArtifactStore {
    /// `root` is resolved against the working directory if relative.
    pub fn new(root: impl AsRef<Path>) -> Result<Self, StoreError> {
        let root = root.as_ref();
        if root.as_os_str().is_empty() {
            return Err(StoreError::InvalidPath {
                path: root.to_path_buf(),
                reason: "empty path",
            });
        }
        let root = std::path::absolute(root).map_err(|e| StoreError::io(root, e))?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn project_dir(&self, project_key: &str) -> Result<PathBuf, StoreError> {
        Ok(self.root.join(path_component(project_key)?))
    }

    pub fn document_path(&self, project_key: &str, story_id: &str) -> Result<PathBuf, StoreError> {
        let file = format!("{}.json", path_component(story_id)?);
        Ok(self.project_dir(project_key)?.join(file))
    }

    /// Write `document` for a story, creating the project directory if
    /// needed. An existing file is replaced, not merged.
    pub fn save(
        &self,
        document: &GeneratedDocument,
        project_key: &str,
        story_id: &str,
    ) -> Result<PathBuf, StoreError> {
        let dir = self.project_dir(project_key)?;
        std::fs::create_dir_all(&dir).map_err(|e| StoreError::io(&dir, e))?;
        let path = self.document_path(project_key, story_id)?;
        write_document(&path, document)?;
        tracing::info!(
            path = %path.display(),
            tests = document.tests.len(),
            test_sets = document.test_sets.len(),
            "saved test document"
        );
        Ok(path)
    }
}

fn path_component(name: &str) -> Result<&str, StoreError> {
    let trimmed = name.trim();
    let invalid = |reason| StoreError::InvalidPath {
        path: PathBuf::from(name),
        reason,
    };
    if trimmed.is_empty() {
        return Err(invalid("empty name"));
    }
    if trimmed.contains(['/', '\\']) || trimmed == "." || trimmed == ".." {
        return Err(invalid("name must be a single path component"));
    }
    Ok(trimmed)
}

/// Read a document. The path must be absolute and the file must exist;
/// `//` and `/* */` comments outside strings are ignored. A JSON value
/// that is not an object loads as the empty document.
pub fn load_document(path: &Path) -> Result<GeneratedDocument, StoreError> {
    if path.as_os_str().is_empty() {
        return Err(StoreError::InvalidPath {
            path: path.to_path_buf(),
            reason: "empty path",
        });
    }
    if !path.is_absolute() {
        return Err(StoreError::InvalidPath {
            path: path.to_path_buf(),
            reason: "path must be absolute",
        });
    }
    if !path.is_file() {
        return Err(StoreError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    let text = std::fs::read_to_string(path).map_err(|e| StoreError::io(path, e))?;
    let value: Value =
        serde_json::from_str(&strip_comments(&text)).map_err(|source| StoreError::MalformedData {
            path: path.to_path_buf(),
            source,
        })?;
    Ok(GeneratedDocument::from_value(value))
}

/// Atomically replace `path` with the pretty-printed document.
pub fn write_document(path: &Path, document: &GeneratedDocument) -> Result<(), StoreError> {
    let mut text = serde_json::to_string_pretty(document)?;
    text.push('\n');

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut temp = NamedTempFile::new_in(dir).map_err(|e| StoreError::io(dir, e))?;
    temp.write_all(text.as_bytes())
        .and_then(|()| temp.as_file().sync_all())
        .map_err(|e| StoreError::io(temp.path(), e))?;
    temp.persist(path)
        .map_err(|e| StoreError::io(path, e.error))?;
    Ok(())
}

/// Load, transform, and atomically write back. Returns the new document.
pub fn update_document<F>(path: &Path, transform: F) -> Result<GeneratedDocument, StoreError>
where
    F: FnOnce(GeneratedDocument) -> GeneratedDocument,
{
    let updated = transform(load_document(path)?);
    write_document(path, &updated)?;
    Ok(updated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use xraygen_schema::ArtifactKind;
    use xraygen_testkit::sample_document;

    fn store() -> (TempDir, ArtifactStore) {
        let temp = TempDir::new().unwrap();
        let store = ArtifactStore::new(temp.path().join("Projects")).unwrap();
        (temp, store)
    }

    #[test]
    fn save_creates_project_dir_and_named_file() {
        let (_temp, store) = store();
        let path = store.save(&sample_document(), "XTP", "XTP-42").unwrap();
        assert_eq!(path, store.root().join("XTP").join("XTP-42.json"));
        assert!(path.is_file());
        assert_eq!(load_document(&path).unwrap(), sample_document());
    }

    #[test]
    fn save_overwrites_without_merging() {
        let (_temp, store) = store();
        store.save(&sample_document(), "XTP", "XTP-42").unwrap();
        let path = store.save(&GeneratedDocument::empty(), "XTP", "XTP-42").unwrap();
        assert_eq!(load_document(&path).unwrap(), GeneratedDocument::empty());
    }

    #[test]
    fn saved_file_is_pretty_and_omits_empty_optional_sections() {
        let (_temp, store) = store();
        let path = store.save(&GeneratedDocument::empty(), "XTP", "XTP-1").unwrap();
        let text = std::fs::read_to_string(path).unwrap();
        assert_eq!(text, "{\n  \"tests\": [],\n  \"testSets\": []\n}\n");
    }

    #[test]
    fn relative_root_is_made_absolute() {
        let store = ArtifactStore::new("Projects").unwrap();
        assert!(store.root().is_absolute());
        assert!(store.document_path("XTP", "XTP-1").unwrap().is_absolute());
    }

    #[test]
    fn empty_root_is_rejected() {
        assert!(matches!(
            ArtifactStore::new(""),
            Err(StoreError::InvalidPath { .. })
        ));
    }

    #[test]
    fn names_with_separators_are_rejected() {
        let (_temp, store) = store();
        assert!(matches!(
            store.document_path("XTP", "a/b"),
            Err(StoreError::InvalidPath { .. })
        ));
        assert!(matches!(
            store.project_dir(".."),
            Err(StoreError::InvalidPath { .. })
        ));
        assert!(matches!(
            store.document_path("", "XTP-1"),
            Err(StoreError::InvalidPath { .. })
        ));
    }

    #[test]
    fn load_rejects_empty_and_relative_paths() {
        assert!(matches!(
            load_document(Path::new("")),
            Err(StoreError::InvalidPath { .. })
        ));
        assert!(matches!(
            load_document(Path::new("Projects/XTP/XTP-1.json")),
            Err(StoreError::InvalidPath { .. })
        ));
    }

    #[test]
    fn load_missing_file_names_the_path() {
        let (_temp, store) = store();
        let path = store.document_path("XTP", "XTP-404").unwrap();
        let err = load_document(&path).unwrap_err();
        assert!(matches!(err, StoreError::FileNotFound { .. }));
        assert!(err.to_string().contains("XTP-404.json"));
    }

    #[test]
    fn load_strips_comments() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("doc.json");
        std::fs::write(
            &path,
            r#"{
  // generated by hand
  "tests": [ /* one */ {"summary": "keep // this", "description": "and /* this */"} ],
  "testSets": []
}"#,
        )
        .unwrap();
        let doc = load_document(&path).unwrap();
        assert_eq!(doc.tests[0].summary, "keep // this");
        assert_eq!(doc.tests[0].description, "and /* this */");
    }

    #[test]
    fn load_malformed_json_is_malformed_data() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("doc.json");
        std::fs::write(&path, "{\"tests\": [").unwrap();
        assert!(matches!(
            load_document(&path),
            Err(StoreError::MalformedData { .. })
        ));
    }

    #[test]
    fn non_object_json_loads_as_empty_document() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("doc.json");
        std::fs::write(&path, "[1, 2, 3]").unwrap();
        assert_eq!(load_document(&path).unwrap(), GeneratedDocument::empty());
    }

    #[test]
    fn update_merges_created_keys_and_leaves_no_temp_files() {
        let (_temp, store) = store();
        let path = store.save(&sample_document(), "XTP", "XTP-42").unwrap();

        let updated = update_document(&path, |doc| {
            doc.with_created_keys(ArtifactKind::Test, &[(1, "XTP-101".to_string())])
        })
        .unwrap();

        assert_eq!(updated.tests[1].id.as_deref(), Some("XTP-101"));
        assert_eq!(load_document(&path).unwrap(), updated);

        let entries: Vec<_> = std::fs::read_dir(path.parent().unwrap())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(entries, vec![std::ffi::OsString::from("XTP-42.json")]);
    }

    #[test]
    fn unknown_record_keys_survive_a_rewrite() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("doc.json");
        std::fs::write(
            &path,
            r#"{"tests":[{"summary":"A","fixVersion":"2.1"}],"testSets":[],"owner":"qa"}"#,
        )
        .unwrap();

        update_document(&path, |doc| doc).unwrap();

        let value: Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["tests"][0]["fixVersion"], "2.1");
    }
}
