//! Error types for code generation

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CodegenError {
    #[error(transparent)]
    Core(#[from] atcgen_core::Error),

    #[error("Cannot parse signature of '{method}': {reason} in '{header}'")]
    SignatureParse {
        method: String,
        header: String,
        reason: &'static str,
    },

    #[error("IO error at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type CodegenResult<T> = Result<T, CodegenError>;
