//! Error types for dataset export.

use std::path::PathBuf;

use thiserror::Error;

/// Result type for export operations.
pub type ExportResult<T> = Result<T, ExportError>;

/// Errors that can occur while writing a dataset.
#[derive(Debug, Error)]
pub enum ExportError {
    /// I/O error during file operations.
    #[error("I/O error at '{path}': {source}")]
    Io {
        /// The path where the error occurred.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// JSON encoding failed.
    #[error("JSON error at '{path}': {source}")]
    Json {
        /// The file being written.
        path: PathBuf,
        /// The underlying serde error.
        #[source]
        source: serde_json::Error,
    },

    /// Two fragments would be written to the same file.
    #[error("fragment '{fragment}' would overwrite '{file}' written for '{existing}'")]
    FileNameCollision {
        /// The file both fragments map to.
        file: String,
        /// Fragment that claimed the file first.
        existing: String,
        /// Fragment that collides with it.
        fragment: String,
    },

    /// A vessel has no fragments to export.
    #[error("vessel '{vessel}' has no fragments")]
    EmptyVessel {
        /// Vessel id.
        vessel: String,
    },
}
