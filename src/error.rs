//! Error types
//!
//! `SessionError` is what a browsing session reports for a single interaction.
//! The enrichment components absorb it at their own boundary; only the table
//! and configuration edges surface `EnrichError` to callers.

/// Failure of one interaction with the browsing session
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("element not found: {0}")]
    NotFound(String),

    #[error("click intercepted: {0}")]
    Intercepted(String),

    #[error("stale element handle: {0}")]
    Stale(String),

    #[error("navigation to {url} failed: {reason}")]
    Navigation { url: String, reason: String },

    #[error("session error: {0}")]
    Other(String),
}

impl SessionError {
    pub fn is_intercepted(&self) -> bool {
        matches!(self, SessionError::Intercepted(_))
    }

    pub fn is_stale(&self) -> bool {
        matches!(self, SessionError::Stale(_))
    }
}

/// Errors at the edges of a batch: reading tables, writing tables, loading config
#[derive(thiserror::Error, Debug)]
pub enum EnrichError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Config error: {0}")]
    Config(#[from] serde_json::Error),

    #[error("Invalid selector: {0}")]
    Selector(String),

    #[error("Missing column: {0}")]
    MissingColumn(String),
}

/// Convenience result type.
pub type Result<T> = std::result::Result<T, EnrichError>;
