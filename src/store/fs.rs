//! Filesystem-backed artifact store.
//!
//! Keeps the conventional on-disk layout: review artifacts under `data/`,
//! report/draft artifacts and the send log under `output/`. Overwrites go
//! through a sibling temp file + rename, so a reader never observes a
//! half-written artifact.

use std::path::PathBuf;

use async_trait::async_trait;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::debug;
use uuid::Uuid;

use super::{ArtifactKind, ArtifactStore};
use crate::error::StoreError;

pub struct FsArtifactStore {
    base_dir: PathBuf,
    app_slug: String,
}

impl FsArtifactStore {
    /// Create a store rooted at `base_dir`, naming report/draft files after
    /// `app_slug`.
    pub fn new(base_dir: impl Into<PathBuf>, app_slug: impl Into<String>) -> Self {
        Self {
            base_dir: base_dir.into(),
            app_slug: app_slug.into(),
        }
    }

    /// On-disk location of an artifact.
    pub fn path_for(&self, kind: ArtifactKind) -> PathBuf {
        match kind {
            ArtifactKind::Filtered => self.base_dir.join("data").join("reviews_filtered.json"),
            ArtifactKind::Tagged => self.base_dir.join("data").join("reviews_tagged.json"),
            ArtifactKind::Report => self
                .base_dir
                .join("output")
                .join(format!("weekly_pulse_{}.md", self.app_slug)),
            ArtifactKind::Draft => self
                .base_dir
                .join("output")
                .join(format!("email_draft_{}.txt", self.app_slug)),
        }
    }

    /// On-disk location of the send log.
    pub fn send_log_path(&self) -> PathBuf {
        self.base_dir
            .join("output")
            .join("email_logs")
            .join("email_log.txt")
    }
}

#[async_trait]
impl ArtifactStore for FsArtifactStore {
    async fn read(&self, kind: ArtifactKind) -> Result<String, StoreError> {
        let path = self.path_for(kind);
        if !path.exists() {
            return Err(StoreError::NotFound(kind.name().to_string()));
        }
        Ok(fs::read_to_string(&path).await?)
    }

    async fn write(&self, kind: ArtifactKind, content: &str) -> Result<(), StoreError> {
        let path = self.path_for(kind);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }

        // Sibling temp file in the same directory keeps the rename atomic.
        let tmp = path.with_extension(format!("tmp-{}", Uuid::new_v4()));
        fs::write(&tmp, content).await?;
        fs::rename(&tmp, &path).await?;

        debug!(artifact = kind.name(), path = %path.display(), "Wrote artifact");
        Ok(())
    }

    async fn exists(&self, kind: ArtifactKind) -> bool {
        self.path_for(kind).exists()
    }

    async fn append_send_log(&self, line: &str) -> Result<(), StoreError> {
        let path = self.send_log_path();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        let mut file = fs::OpenOptions::new()
            .append(true)
            .create(true)
            .open(&path)
            .await?;
        file.write_all(line.as_bytes()).await?;
        file.write_all(b"\n").await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn test_store() -> (FsArtifactStore, TempDir) {
        let dir = TempDir::new().unwrap();
        let store = FsArtifactStore::new(dir.path(), "groww");
        (store, dir)
    }

    #[tokio::test]
    async fn write_read_roundtrip() {
        let (store, _dir) = test_store();
        store
            .write(ArtifactKind::Filtered, "[{\"text\":\"ok\"}]")
            .await
            .unwrap();
        let content = store.read(ArtifactKind::Filtered).await.unwrap();
        assert_eq!(content, "[{\"text\":\"ok\"}]");
    }

    #[tokio::test]
    async fn read_missing_artifact_is_not_found() {
        let (store, _dir) = test_store();
        let err = store.read(ArtifactKind::Report).await;
        assert!(matches!(err, Err(StoreError::NotFound(_))));
    }

    #[tokio::test]
    async fn exists_flips_after_write() {
        let (store, _dir) = test_store();
        assert!(!store.exists(ArtifactKind::Filtered).await);
        store.write(ArtifactKind::Filtered, "[]").await.unwrap();
        assert!(store.exists(ArtifactKind::Filtered).await);
    }

    #[tokio::test]
    async fn write_overwrites_previous_content() {
        let (store, _dir) = test_store();
        store.write(ArtifactKind::Report, "first").await.unwrap();
        store.write(ArtifactKind::Report, "second").await.unwrap();
        assert_eq!(store.read(ArtifactKind::Report).await.unwrap(), "second");
    }

    #[tokio::test]
    async fn write_leaves_no_temp_files_behind() {
        let (store, dir) = test_store();
        store.write(ArtifactKind::Tagged, "[]").await.unwrap();
        let mut names = Vec::new();
        let mut entries = fs::read_dir(dir.path().join("data")).await.unwrap();
        while let Some(entry) = entries.next_entry().await.unwrap() {
            names.push(entry.file_name().to_string_lossy().to_string());
        }
        assert_eq!(names, vec!["reviews_tagged.json"]);
    }

    #[tokio::test]
    async fn artifacts_land_in_conventional_paths() {
        let (store, dir) = test_store();
        assert_eq!(
            store.path_for(ArtifactKind::Filtered),
            dir.path().join("data/reviews_filtered.json")
        );
        assert_eq!(
            store.path_for(ArtifactKind::Tagged),
            dir.path().join("data/reviews_tagged.json")
        );
        assert_eq!(
            store.path_for(ArtifactKind::Report),
            dir.path().join("output/weekly_pulse_groww.md")
        );
        assert_eq!(
            store.path_for(ArtifactKind::Draft),
            dir.path().join("output/email_draft_groww.txt")
        );
    }

    #[tokio::test]
    async fn send_log_appends_lines() {
        let (store, _dir) = test_store();
        store.append_send_log("first | line").await.unwrap();
        store.append_send_log("second | line").await.unwrap();
        let content = fs::read_to_string(store.send_log_path()).await.unwrap();
        assert_eq!(content, "first | line\nsecond | line\n");
    }
}
