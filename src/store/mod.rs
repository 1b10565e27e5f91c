//! Durable stage artifacts.
//!
//! Each pipeline stage persists exactly one named artifact. Presence of the
//! prior stage's artifact is the only signal gating the next stage; absence
//! means the stage has not run. Writes are total overwrites and must be
//! atomic from a reader's perspective.

use async_trait::async_trait;

use crate::error::StoreError;

pub mod fs;
pub mod memory;

pub use fs::FsArtifactStore;
pub use memory::MemoryArtifactStore;

// ── Artifact kinds ──────────────────────────────────────────────────

/// The four durable stage outputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArtifactKind {
    /// Canonical reviews that passed admission (JSON array).
    Filtered,
    /// Filtered reviews with their themes (JSON array).
    Tagged,
    /// Rendered weekly digest text.
    Report,
    /// Email draft in its `Subject: …` text form.
    Draft,
}

impl ArtifactKind {
    pub const ALL: [ArtifactKind; 4] = [Self::Filtered, Self::Tagged, Self::Report, Self::Draft];

    /// Stable name used in file names and error messages.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Filtered => "filtered reviews",
            Self::Tagged => "tagged reviews",
            Self::Report => "weekly report",
            Self::Draft => "email draft",
        }
    }
}

impl std::fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

// ── Store capability ────────────────────────────────────────────────

/// Storage capability for stage artifacts plus the append-only send log.
#[async_trait]
pub trait ArtifactStore: Send + Sync {
    /// Full content of an artifact. `StoreError::NotFound` when absent.
    async fn read(&self, kind: ArtifactKind) -> Result<String, StoreError>;

    /// Overwrite an artifact with `content`.
    async fn write(&self, kind: ArtifactKind, content: &str) -> Result<(), StoreError>;

    /// Whether the artifact exists (its stage has completed at least once).
    async fn exists(&self, kind: ArtifactKind) -> bool;

    /// Append one line to the send log.
    async fn append_send_log(&self, line: &str) -> Result<(), StoreError>;
}
