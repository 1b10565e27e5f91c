//! Error types for Review Pulse.

/// Top-level error type for the pipeline.
///
/// Transparent wrapping: action reports and logs surface the underlying
/// message without a layer of prefixes.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Source(#[from] SourceError),

    #[error(transparent)]
    Send(#[from] SendError),

    #[error(transparent)]
    Workflow(#[from] WorkflowError),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    #[error("Unrecognized app identifier: {0}")]
    UnrecognizedTarget(String),

    #[error("Fallback theme '{0}' is not a member of the theme set")]
    FallbackNotInSet(String),
}

/// Artifact store errors.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Artifact not found: {0}")]
    NotFound(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Review source errors.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("Source {name} request failed: {reason}")]
    RequestFailed { name: String, reason: String },

    #[error("Invalid response from {name}: {reason}")]
    InvalidResponse { name: String, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Outbound send errors.
#[derive(Debug, thiserror::Error)]
pub enum SendError {
    #[error("Invalid recipient email address.")]
    InvalidRecipient,

    #[error("Missing email credentials (EMAIL_SENDER or EMAIL_PASSWORD) in environment.")]
    NotConfigured,

    #[error("Failed to build message: {0}")]
    MessageBuild(String),

    #[error("SMTP send failed: {0}")]
    Transport(String),
}

/// Workflow sequencing errors.
#[derive(Debug, thiserror::Error)]
pub enum WorkflowError {
    #[error("No {artifact} artifact found. Run '{required_action}' first.")]
    MissingArtifact {
        artifact: String,
        required_action: String,
    },

    #[error("No reviews to process: {0}")]
    NoData(String),
}

/// Result type alias for the pipeline.
pub type Result<T> = std::result::Result<T, Error>;
