//! Fracture-face classification.
//!
//! Candidate faces come straight from the per-face interior attribute that
//! the fracture tool writes; nothing is inferred from geometry.

use serde::{Deserialize, Serialize};
use shard_types::Fragment;

use crate::error::{FacetError, FacetResult};

/// Indices of a fragment's interior (break) faces, ascending.
///
/// # Errors
///
/// Returns [`FacetError::MissingInteriorAttribute`] when the fragment has
/// no interior flags and [`FacetError::InteriorAttributeMismatch`] when the
/// flag count differs from the face count.
///
/// # Example
///
/// ```
/// use shard_facets::candidate_faces;
/// use shard_types::{Fragment, Point3, ShardMesh};
///
/// let mesh = ShardMesh::cuboid(Point3::origin(), Point3::new(1.0, 1.0, 1.0));
/// let fragment = Fragment::new("a", mesh)
///     .with_interior(vec![false, true, false, false, false, true]);
///
/// assert_eq!(candidate_faces(&fragment).unwrap(), vec![1, 5]);
/// ```
pub fn candidate_faces(fragment: &Fragment) -> FacetResult<Vec<usize>> {
    let flags = fragment
        .interior()
        .ok_or_else(|| FacetError::MissingInteriorAttribute {
            fragment: fragment.name().to_string(),
        })?;

    if flags.len() != fragment.face_count() {
        return Err(FacetError::InteriorAttributeMismatch {
            fragment: fragment.name().to_string(),
            faces: fragment.face_count(),
            flags: flags.len(),
        });
    }

    Ok(flags
        .iter()
        .enumerate()
        .filter(|&(_, &interior)| interior)
        .map(|(face, _)| face)
        .collect())
}

/// Summary of the interior attribute across a fragment set.
///
/// # Example
///
/// ```
/// use shard_facets::ClassifierReport;
/// use shard_types::{Fragment, Point3, ShardMesh};
///
/// let mesh = ShardMesh::cuboid(Point3::origin(), Point3::new(1.0, 1.0, 1.0));
/// let fragments = [
///     Fragment::new("a", mesh.clone()).with_interior(vec![true; 6]),
///     Fragment::new("b", mesh),
/// ];
///
/// let report = ClassifierReport::from_fragments(&fragments);
/// assert_eq!(report.fragments_with_interior, 1);
/// assert_eq!(report.interior_faces, 6);
/// assert_eq!(report.missing_attribute, vec!["b".to_string()]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifierReport {
    /// Fragments inspected.
    pub fragments: usize,
    /// Fragments with at least one interior face.
    pub fragments_with_interior: usize,
    /// Interior faces across all valid fragments.
    pub interior_faces: usize,
    /// Names of fragments without the attribute.
    pub missing_attribute: Vec<String>,
    /// Names of fragments whose flag count differs from the face count.
    pub mismatched_attribute: Vec<String>,
}

impl ClassifierReport {
    /// Classify every fragment and tally the outcome.
    #[must_use]
    pub fn from_fragments(fragments: &[Fragment]) -> Self {
        let mut report = Self {
            fragments: fragments.len(),
            ..Self::default()
        };
        for fragment in fragments {
            match candidate_faces(fragment) {
                Ok(faces) => {
                    if !faces.is_empty() {
                        report.fragments_with_interior += 1;
                    }
                    report.interior_faces += faces.len();
                }
                Err(FacetError::InteriorAttributeMismatch { .. }) => {
                    report.mismatched_attribute.push(fragment.name().to_string());
                }
                Err(_) => report.missing_attribute.push(fragment.name().to_string()),
            }
        }
        report
    }

    /// Check if every fragment carries a well-formed attribute.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.missing_attribute.is_empty() && self.mismatched_attribute.is_empty()
    }
}

impl std::fmt::Display for ClassifierReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Interior Attribute Check:")?;
        writeln!(f, "  Fragments: {}", self.fragments)?;
        writeln!(f, "  With interior faces: {}", self.fragments_with_interior)?;
        writeln!(f, "  Interior faces: {}", self.interior_faces)?;
        if !self.missing_attribute.is_empty() {
            writeln!(f, "  Missing attribute: {}", self.missing_attribute.join(", "))?;
        }
        if !self.mismatched_attribute.is_empty() {
            writeln!(f, "  Mismatched attribute: {}", self.mismatched_attribute.join(", "))?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use shard_types::{Point3, ShardMesh};

    fn cube() -> ShardMesh {
        ShardMesh::cuboid(Point3::origin(), Point3::new(1.0, 1.0, 1.0))
    }

    #[test]
    fn missing_attribute_is_an_error() {
        let fragment = Fragment::new("a", cube());
        assert!(matches!(
            candidate_faces(&fragment),
            Err(FacetError::MissingInteriorAttribute { .. })
        ));
    }

    #[test]
    fn wrong_length_is_an_error() {
        let fragment = Fragment::new("a", cube()).with_interior(vec![true; 4]);
        let err = candidate_faces(&fragment).unwrap_err();
        assert!(matches!(
            err,
            FacetError::InteriorAttributeMismatch {
                faces: 6,
                flags: 4,
                ..
            }
        ));
    }

    #[test]
    fn no_interior_faces_is_empty_not_error() {
        let fragment = Fragment::new("a", cube()).with_interior(vec![false; 6]);
        assert!(candidate_faces(&fragment).unwrap().is_empty());
    }

    #[test]
    fn report_tallies_everything() {
        let fragments = [
            Fragment::new("a", cube()).with_interior(vec![true, true, false, false, false, false]),
            Fragment::new("b", cube()).with_interior(vec![false; 6]),
            Fragment::new("c", cube()),
            Fragment::new("d", cube()).with_interior(vec![true]),
        ];
        let report = ClassifierReport::from_fragments(&fragments);
        assert_eq!(report.fragments, 4);
        assert_eq!(report.fragments_with_interior, 1);
        assert_eq!(report.interior_faces, 2);
        assert_eq!(report.missing_attribute, vec!["c".to_string()]);
        assert_eq!(report.mismatched_attribute, vec!["d".to_string()]);
        assert!(!report.is_complete());

        let text = report.to_string();
        assert!(text.contains("Interior faces: 2"));
        assert!(text.contains("Missing attribute: c"));
    }
}
