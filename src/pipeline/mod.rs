//! Review processing pipeline.
//!
//! Raw records from any source flow through:
//! 1. `ReviewSource::fetch()` — source-specific I/O
//! 2. `normalize` + `admit` — canonical shape, PII redaction, admission
//! 3. `Classifier::classify()` — exactly one theme per review
//!
//! Stage sequencing and artifact persistence live in `crate::workflow`.

pub mod classify;
pub mod normalize;
pub mod types;
