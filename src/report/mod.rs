//! Digest synthesis and outbound draft composition.

pub mod digest;
pub mod draft;
