//! Error types for damedit

use thiserror::Error;

/// Result type alias for highlighting operations
pub type Result<T> = std::result::Result<T, HighlightError>;

/// Highlighting error types
///
/// None of these are fatal to the host: configuration errors leave the
/// previous profile or theme in place, pattern errors skip one rule, and
/// tokenize errors truncate a single pass.
#[derive(Error, Debug)]
pub enum HighlightError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Bad regex {regex:?}: {reason}")]
    PatternCompile { regex: String, reason: String },

    #[error("Tokenize error at {line}:{column}: {reason}")]
    Tokenize {
        line: usize,
        column: usize,
        reason: String,
    },
}

impl HighlightError {
    /// Shorthand for a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        HighlightError::Config(msg.into())
    }

    /// Whether this error came from malformed profile or theme input
    pub fn is_config(&self) -> bool {
        matches!(
            self,
            HighlightError::Config(_) | HighlightError::Json(_) | HighlightError::Toml(_)
        )
    }
}
