//! Error types for atcgen-core

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Unsupported expression '{kind}' during {operation}")]
    UnsupportedExpression {
        kind: &'static str,
        operation: &'static str,
    },

    #[error("Invalid spec table: {0}")]
    InvalidSpec(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Shorthand for the fail-fast error raised on a node an operation cannot handle
    pub fn unsupported(kind: &'static str, operation: &'static str) -> Self {
        Error::UnsupportedExpression { kind, operation }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
