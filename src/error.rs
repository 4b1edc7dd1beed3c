use thiserror::Error;

/// Unified error type for autosemver operations
#[derive(Error, Debug)]
pub enum AutosemverError {
    #[error("Git operation failed: {0}")]
    Git(#[from] git2::Error),

    #[error("Repository unavailable: {0}")]
    RepositoryUnavailable(String),

    #[error("Object not found: {0}")]
    ObjectNotFound(String),

    #[error("Malformed tag: {0}")]
    MalformedTag(String),

    #[error("Invalid wrap configuration: {0}")]
    InvalidWrapConfig(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience type alias for Results in autosemver
pub type Result<T> = std::result::Result<T, AutosemverError>;

impl AutosemverError {
    /// Create a repository-unavailable error with context
    pub fn unavailable(msg: impl Into<String>) -> Self {
        AutosemverError::RepositoryUnavailable(msg.into())
    }

    /// Create an object-not-found error with context
    pub fn not_found(msg: impl Into<String>) -> Self {
        AutosemverError::ObjectNotFound(msg.into())
    }

    /// Create a malformed-tag error with context
    pub fn malformed_tag(msg: impl Into<String>) -> Self {
        AutosemverError::MalformedTag(msg.into())
    }

    /// Create an invalid-wrap-configuration error with context
    pub fn wrap_config(msg: impl Into<String>) -> Self {
        AutosemverError::InvalidWrapConfig(msg.into())
    }

    /// Create a configuration error with context
    pub fn config(msg: impl Into<String>) -> Self {
        AutosemverError::Config(msg.into())
    }

    /// Whether this error means a referenced object is missing.
    ///
    /// Traversal code treats missing objects as skippable, not fatal.
    pub fn is_not_found(&self) -> bool {
        matches!(self, AutosemverError::ObjectNotFound(_))
    }
}
