//! Raw reviews from a local JSON export.

use std::path::PathBuf;

use async_trait::async_trait;
use tokio::fs;

use super::ReviewSource;
use crate::config::AppTarget;
use crate::error::SourceError;
use crate::pipeline::types::RawReview;

/// Reads a JSON array of source-shaped records from disk — a Google Play
/// export produced by an external scraper, or a fixture for offline runs.
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl ReviewSource for JsonFileSource {
    fn name(&self) -> &'static str {
        "json-file"
    }

    async fn fetch(
        &self,
        _target: &AppTarget,
        count: usize,
    ) -> Result<Vec<RawReview>, SourceError> {
        let content = fs::read_to_string(&self.path).await?;
        let mut reviews: Vec<RawReview> = serde_json::from_str(&content)?;
        reviews.truncate(count);
        tracing::info!("Loaded {} reviews from {}", reviews.len(), self.path.display());
        Ok(reviews)
    }
}
