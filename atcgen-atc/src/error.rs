//! Error types for test-unit construction

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AtcError {
    #[error("No spec for call sequence entry '{name}'")]
    MissingSpec { name: String },

    #[error("Precondition of '{function}' refers to post-state of '{variable}'")]
    PostStateInPrecondition { function: String, variable: String },

    #[error("Failed to build helper for '{function}': {source}")]
    Helper {
        function: String,
        #[source]
        source: atcgen_core::Error,
    },

    #[error(transparent)]
    Core(#[from] atcgen_core::Error),
}

pub type AtcResult<T> = Result<T, AtcError>;
