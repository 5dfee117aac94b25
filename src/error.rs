//! Typed errors for the checks that run before any model is loaded.

use std::path::PathBuf;

use thiserror::Error;

/// Input validation failures.
///
/// Each of these terminates the process with exit status 1 and is reported
/// before device selection or model loading happens.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("input text file '{}' not found.", .0.display())]
    InputNotFound(PathBuf),

    #[error("input text file '{}' is empty.", .0.display())]
    EmptyInput(PathBuf),

    #[error("failed to read input text file '{}': {source}", .path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("audio prompt file '{}' not found.", .0.display())]
    PromptNotFound(PathBuf),
}
