//! Error types for surface sampling.

use shard_types::Diagnostic;
use thiserror::Error;

/// Result type for sampling operations.
pub type SampleResult<T> = Result<T, SampleError>;

/// Errors that can occur while sampling one fragment.
#[derive(Debug, Error)]
pub enum SampleError {
    /// Every face of the fragment has zero area.
    #[error("fragment '{fragment}' has no face with positive area")]
    NoSampleableSurface {
        /// Fragment name.
        fragment: String,
    },

    /// The facet table for the fragment does not cover its faces.
    #[error("fragment '{fragment}' has {faces} faces but the facet table has {entries}")]
    LabelTableMismatch {
        /// Fragment name.
        fragment: String,
        /// Number of faces on the mesh.
        faces: usize,
        /// Number of entries in the facet table.
        entries: usize,
    },
}

impl SampleError {
    /// The batch diagnostic for this error, if any.
    #[must_use]
    pub fn to_diagnostic(&self) -> Option<Diagnostic> {
        match self {
            Self::NoSampleableSurface { fragment } => Some(Diagnostic::NoSampleableSurface {
                fragment: fragment.clone(),
            }),
            Self::LabelTableMismatch { .. } => None,
        }
    }
}
