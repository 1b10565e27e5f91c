//! Review Pulse — app review ingestion, theming, and weekly reporting.

pub mod config;
pub mod error;
pub mod pipeline;
pub mod redact;
pub mod report;
pub mod sender;
pub mod source;
pub mod store;
pub mod workflow;
