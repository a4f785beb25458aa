//! Non-fatal conditions reported by the reconstruction pipeline.

use crate::FacetId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A recoverable condition affecting a single fragment or facet.
///
/// None of these abort a batch; they are collected and returned alongside
/// the results so callers can decide how to surface them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    /// The fragment carries no interior flags and was skipped.
    MissingInteriorAttribute {
        /// Fragment name.
        fragment: String,
    },

    /// The interior flag count does not match the face count; the fragment
    /// was skipped.
    InteriorAttributeMismatch {
        /// Fragment name.
        fragment: String,
        /// Number of faces on the mesh.
        faces: usize,
        /// Number of interior flags supplied.
        flags: usize,
    },

    /// Faces of one facet lie within the proximity threshold of more than
    /// one other fragment.
    MultiNeighborFacet {
        /// The facet.
        facet: FacetId,
        /// Name of the fragment owning the facet.
        fragment: String,
        /// Names of every fragment found within the threshold, in fragment
        /// order.
        neighbors: Vec<String>,
    },

    /// A facet picked a partner whose own nearest pick is a different facet
    /// (or nothing).
    AsymmetricMatch {
        /// The facet that made the pick.
        facet: FacetId,
        /// The partner it picked.
        partner: FacetId,
        /// The partner's own pick, if any.
        partner_choice: Option<FacetId>,
    },

    /// Two or more facets picked the same partner as their nearest.
    ContestedFacet {
        /// The facet picked more than once.
        facet: FacetId,
        /// Facets that picked it, ascending.
        claimants: Vec<FacetId>,
    },

    /// The fragment has no positive-area face, so nothing was sampled.
    NoSampleableSurface {
        /// Fragment name.
        fragment: String,
    },
}

impl Diagnostic {
    /// Short, stable name of the condition.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::MissingInteriorAttribute { .. } => "missing interior attribute",
            Self::InteriorAttributeMismatch { .. } => "interior attribute mismatch",
            Self::MultiNeighborFacet { .. } => "multi-neighbor facet",
            Self::AsymmetricMatch { .. } => "asymmetric match",
            Self::ContestedFacet { .. } => "contested facet",
            Self::NoSampleableSurface { .. } => "no sampleable surface",
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: ", self.name())?;
        match self {
            Self::MissingInteriorAttribute { fragment }
            | Self::NoSampleableSurface { fragment } => write!(f, "fragment '{fragment}'"),
            Self::InteriorAttributeMismatch {
                fragment,
                faces,
                flags,
            } => write!(f, "fragment '{fragment}' has {faces} faces but {flags} flags"),
            Self::MultiNeighborFacet {
                facet,
                fragment,
                neighbors,
            } => write!(
                f,
                "facet {facet} on '{fragment}' touches {}",
                neighbors.join(", ")
            ),
            Self::AsymmetricMatch {
                facet,
                partner,
                partner_choice,
            } => match partner_choice {
                Some(choice) => write!(f, "facet {facet} -> {partner}, but {partner} -> {choice}"),
                None => write!(f, "facet {facet} -> {partner}, but {partner} has no pick"),
            },
            Self::ContestedFacet { facet, claimants } => {
                let list: Vec<String> = claimants.iter().map(ToString::to_string).collect();
                write!(f, "facet {facet} picked by {}", list.join(", "))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_the_condition() {
        let d = Diagnostic::MultiNeighborFacet {
            facet: 4,
            fragment: "a".to_string(),
            neighbors: vec!["b".to_string(), "c".to_string()],
        };
        assert_eq!(d.to_string(), "multi-neighbor facet: facet 4 on 'a' touches b, c");

        let d = Diagnostic::AsymmetricMatch {
            facet: 1,
            partner: 2,
            partner_choice: Some(3),
        };
        assert_eq!(d.to_string(), "asymmetric match: facet 1 -> 2, but 2 -> 3");

        let d = Diagnostic::ContestedFacet {
            facet: 2,
            claimants: vec![1, 3],
        };
        assert_eq!(d.to_string(), "contested facet: facet 2 picked by 1, 3");
    }

    #[test]
    fn fragment_level_display() {
        let d = Diagnostic::MissingInteriorAttribute {
            fragment: "pot_cell".to_string(),
        };
        assert_eq!(d.name(), "missing interior attribute");
        assert!(d.to_string().contains("'pot_cell'"));

        let d = Diagnostic::InteriorAttributeMismatch {
            fragment: "x".to_string(),
            faces: 6,
            flags: 4,
        };
        assert!(d.to_string().contains("6 faces but 4 flags"));
    }
}
