//! Content-addressed document store over a vault directory.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use pipeline::{DocumentName, DocumentStore, StoreError};
use tokio::io::AsyncWriteExt;

/// Writes documents as files directly under the vault root.
#[derive(Debug, Clone)]
pub struct FsDocumentStore {
    root: PathBuf,
}

impl FsDocumentStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// File path for `name`. Names must be a single path component.
    pub fn path_of(&self, name: &DocumentName) -> Result<PathBuf, StoreError> {
        let raw = name.as_str();
        if raw.contains(['/', '\\']) || raw == "." || raw == ".." || raw.starts_with('.') {
            return Err(StoreError::InvalidName {
                name: raw.to_string(),
            });
        }
        Ok(self.root.join(raw))
    }
}

fn backend(error: &std::io::Error) -> StoreError {
    StoreError::Backend {
        message: error.to_string(),
    }
}

#[async_trait]
impl DocumentStore for FsDocumentStore {
    async fn exists(&self, name: &DocumentName) -> Result<bool, StoreError> {
        let path = self.path_of(name)?;
        tokio::fs::try_exists(&path).await.map_err(|e| backend(&e))
    }

    async fn create(&self, name: &DocumentName, content: &str) -> Result<(), StoreError> {
        let path = self.path_of(name)?;
        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(|e| backend(&e))?;

        let mut file = match tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
        {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                return Err(StoreError::AlreadyExists { name: name.clone() });
            }
            Err(e) => return Err(backend(&e)),
        };

        file.write_all(content.as_bytes())
            .await
            .map_err(|e| backend(&e))?;
        file.flush().await.map_err(|e| backend(&e))?;
        tracing::debug!(path = %path.display(), bytes = content.len(), "document written");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pipeline::identify;
    use tempfile::tempdir;

    #[tokio::test]
    async fn create_writes_file_with_exact_content() {
        let dir = tempdir().unwrap();
        let store = FsDocumentStore::new(dir.path());
        let name = DocumentName::for_identifier(&identify("Cats are mammals."));

        store.create(&name, "Cats are mammals.").await.unwrap();

        let written = std::fs::read_to_string(dir.path().join(name.as_str())).unwrap();
        assert_eq!(written, "Cats are mammals.");
        assert!(store.exists(&name).await.unwrap());
    }

    #[tokio::test]
    async fn create_never_overwrites() {
        let dir = tempdir().unwrap();
        let store = FsDocumentStore::new(dir.path());
        let name = DocumentName::new("doc.md").unwrap();

        store.create(&name, "first").await.unwrap();
        let err = store.create(&name, "second").await.unwrap_err();

        assert_eq!(err, StoreError::AlreadyExists { name: name.clone() });
        let kept = std::fs::read_to_string(dir.path().join("doc.md")).unwrap();
        assert_eq!(kept, "first");
    }

    #[tokio::test]
    async fn create_makes_missing_vault_directory() {
        let dir = tempdir().unwrap();
        let store = FsDocumentStore::new(dir.path().join("nested").join("vault"));
        let name = DocumentName::new("a.md").unwrap();

        store.create(&name, "x").await.unwrap();

        assert!(dir.path().join("nested/vault/a.md").is_file());
    }

    #[tokio::test]
    async fn exists_is_false_for_missing_document() {
        let dir = tempdir().unwrap();
        let store = FsDocumentStore::new(dir.path());
        assert!(!store
            .exists(&DocumentName::new("missing.md").unwrap())
            .await
            .unwrap());
    }

    #[test]
    fn names_with_path_components_are_rejected() {
        let store = FsDocumentStore::new("/tmp/vault");
        for bad in ["../escape.md", "a/b.md", "a\\b.md", ".hidden.md", ".."] {
            let name = DocumentName::new(bad).unwrap();
            assert!(
                matches!(store.path_of(&name), Err(StoreError::InvalidName { .. })),
                "{bad} should be rejected"
            );
        }
    }
}
