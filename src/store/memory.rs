//! In-memory artifact store for tests and dry runs.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use super::{ArtifactKind, ArtifactStore};
use crate::error::StoreError;

#[derive(Default)]
pub struct MemoryArtifactStore {
    artifacts: Mutex<HashMap<ArtifactKind, String>>,
    send_log: Mutex<Vec<String>>,
}

impl MemoryArtifactStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lines appended to the send log so far, oldest first.
    pub fn send_log_lines(&self) -> Vec<String> {
        self.send_log.lock().unwrap().clone()
    }
}

#[async_trait]
impl ArtifactStore for MemoryArtifactStore {
    async fn read(&self, kind: ArtifactKind) -> Result<String, StoreError> {
        self.artifacts
            .lock()
            .unwrap()
            .get(&kind)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(kind.name().to_string()))
    }

    async fn write(&self, kind: ArtifactKind, content: &str) -> Result<(), StoreError> {
        self.artifacts
            .lock()
            .unwrap()
            .insert(kind, content.to_string());
        Ok(())
    }

    async fn exists(&self, kind: ArtifactKind) -> bool {
        self.artifacts.lock().unwrap().contains_key(&kind)
    }

    async fn append_send_log(&self, line: &str) -> Result<(), StoreError> {
        self.send_log.lock().unwrap().push(line.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn read_back_what_was_written() {
        let store = MemoryArtifactStore::new();
        store.write(ArtifactKind::Report, "hello").await.unwrap();
        assert_eq!(store.read(ArtifactKind::Report).await.unwrap(), "hello");
    }

    #[tokio::test]
    async fn missing_artifact_is_not_found() {
        let store = MemoryArtifactStore::new();
        let err = store.read(ArtifactKind::Draft).await;
        assert!(matches!(err, Err(StoreError::NotFound(_))));
        assert!(!store.exists(ArtifactKind::Draft).await);
    }

    #[tokio::test]
    async fn artifacts_are_tracked_per_kind() {
        let store = MemoryArtifactStore::new();
        store.write(ArtifactKind::Filtered, "[]").await.unwrap();
        assert!(store.exists(ArtifactKind::Filtered).await);
        assert!(!store.exists(ArtifactKind::Tagged).await);
    }

    #[tokio::test]
    async fn send_log_preserves_order() {
        let store = MemoryArtifactStore::new();
        store.append_send_log("one").await.unwrap();
        store.append_send_log("two").await.unwrap();
        assert_eq!(store.send_log_lines(), vec!["one", "two"]);
    }
}
