use std::io;

use crate::mapping::Scope;

/// Errors that can occur during lifemap operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Malformed rule: {0}")]
    MalformedRule(String),

    #[error("Rule already present in {scope} scope: {filter}")]
    DuplicateRule { scope: Scope, filter: String },

    #[error("Discovery unavailable: {0}")]
    DiscoveryUnavailable(String),

    #[error("Conflicting selection: {0}")]
    ConflictingSelection(String),

    #[error("Failed to write {target}: {reason}")]
    WriteFailure { target: String, reason: String },

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("No ancestor of {project} declares {execution}")]
    NoDeclaringParent { project: String, execution: String },

    #[error("Scope {0} cannot be written")]
    ScopeNotWritable(Scope),

    #[error("Install failed for proposal {proposal}: {reason}")]
    Install { proposal: String, reason: String },

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Wrap any error raised while persisting a rule as a write failure
    pub fn write_failure(target: impl std::fmt::Display, reason: impl std::fmt::Display) -> Self {
        Error::WriteFailure {
            target: target.to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn is_duplicate(&self) -> bool {
        matches!(self, Error::DuplicateRule { .. })
    }
}

/// Result type alias for lifemap operations
pub type Result<T> = std::result::Result<T, Error>;
