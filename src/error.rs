use thiserror::Error;

/// Unified error type for release-bump operations
#[derive(Error, Debug)]
pub enum ReleaseBumpError {
    #[error("Git operation failed: {0}")]
    Git(#[from] git2::Error),

    #[error("Repository error: {0}")]
    Repository(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Version parsing error: {0}")]
    Version(String),

    #[error("Command failed: {0}")]
    Command(String),

    #[error("Migration failed during {step}: {reason}")]
    Migration { step: &'static str, reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience type alias for Results in release-bump
pub type Result<T> = std::result::Result<T, ReleaseBumpError>;

impl ReleaseBumpError {
    /// Create a configuration error with context
    pub fn config(msg: impl Into<String>) -> Self {
        ReleaseBumpError::Config(msg.into())
    }

    /// Create a repository error with context
    pub fn repository(msg: impl Into<String>) -> Self {
        ReleaseBumpError::Repository(msg.into())
    }

    /// Create a version error with context
    pub fn version(msg: impl Into<String>) -> Self {
        ReleaseBumpError::Version(msg.into())
    }

    /// Create a command error with context
    pub fn command(msg: impl Into<String>) -> Self {
        ReleaseBumpError::Command(msg.into())
    }

    /// Create a migration error for the named step
    pub fn migration(step: &'static str, reason: impl Into<String>) -> Self {
        ReleaseBumpError::Migration {
            step,
            reason: reason.into(),
        }
    }

    /// Whether this error came out of the module path migration
    pub fn is_migration(&self) -> bool {
        matches!(self, ReleaseBumpError::Migration { .. })
    }
}
