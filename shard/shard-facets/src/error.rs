//! Error types for facet segmentation.

use shard_types::Diagnostic;
use thiserror::Error;

/// Result type for facet operations.
pub type FacetResult<T> = Result<T, FacetError>;

/// Errors that can occur while segmenting a fragment.
///
/// Every variant is scoped to a single fragment or label string; a batch
/// turns them into [`Diagnostic`]s and carries on.
#[derive(Debug, Error)]
pub enum FacetError {
    /// The fragment carries no interior flags.
    #[error("fragment '{fragment}' has no interior attribute")]
    MissingInteriorAttribute {
        /// Fragment name.
        fragment: String,
    },

    /// The interior flag count does not match the face count.
    #[error("fragment '{fragment}' has {faces} faces but {flags} interior flags")]
    InteriorAttributeMismatch {
        /// Fragment name.
        fragment: String,
        /// Number of faces on the mesh.
        faces: usize,
        /// Number of flags supplied.
        flags: usize,
    },

    /// A facet label string could not be parsed.
    #[error("invalid facet label: {0:?}")]
    InvalidLabel(String),
}

impl FacetError {
    /// The batch diagnostic for this error, if it is one the pipeline
    /// reports rather than treats as a caller bug.
    #[must_use]
    pub fn to_diagnostic(&self) -> Option<Diagnostic> {
        match self {
            Self::MissingInteriorAttribute { fragment } => {
                Some(Diagnostic::MissingInteriorAttribute {
                    fragment: fragment.clone(),
                })
            }
            Self::InteriorAttributeMismatch {
                fragment,
                faces,
                flags,
            } => Some(Diagnostic::InteriorAttributeMismatch {
                fragment: fragment.clone(),
                faces: *faces,
                flags: *flags,
            }),
            Self::InvalidLabel(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_attribute_maps_to_diagnostic() {
        let err = FacetError::MissingInteriorAttribute {
            fragment: "a".to_string(),
        };
        assert_eq!(err.to_string(), "fragment 'a' has no interior attribute");
        assert_eq!(
            err.to_diagnostic(),
            Some(Diagnostic::MissingInteriorAttribute {
                fragment: "a".to_string()
            })
        );
    }

    #[test]
    fn label_error_is_not_a_diagnostic() {
        let err = FacetError::InvalidLabel("oops".to_string());
        assert!(err.to_string().contains("\"oops\""));
        assert!(err.to_diagnostic().is_none());
    }
}
