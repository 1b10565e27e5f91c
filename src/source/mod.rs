//! Raw review producers.
//!
//! A [`ReviewSource`] yields raw, source-shaped review records for one app.
//! The pipeline only requires the sequence to be finite — each record is
//! normalized or dropped independently downstream, so a producer never has
//! to guarantee well-formedness.

use async_trait::async_trait;

use crate::config::AppTarget;
use crate::error::SourceError;
use crate::pipeline::types::RawReview;

pub mod file;
pub mod itunes;

pub use file::JsonFileSource;
pub use itunes::ItunesRssSource;

/// Producer of raw review records.
#[async_trait]
pub trait ReviewSource: Send + Sync {
    fn name(&self) -> &'static str;

    /// Fetch up to `count` of the most recent reviews for `target`.
    async fn fetch(
        &self,
        target: &AppTarget,
        count: usize,
    ) -> Result<Vec<RawReview>, SourceError>;
}
