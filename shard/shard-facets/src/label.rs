//! Facet label strings.
//!
//! A facet is named after the fragment it touches and its index among the
//! owning fragment's facets: `FACET_<neighbor>_<index>`, with `NONE` as the
//! neighbor of unresolved facets. Fragment names may themselves contain
//! underscores, so parsing takes the *last* underscore-delimited token as
//! the index and everything between the prefix and it as the name.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{FacetError, FacetResult};

/// Parsed form of a facet label string.
///
/// # Example
///
/// ```
/// use shard_facets::FacetLabel;
///
/// let label = FacetLabel::new(Some("pot_cell.004".to_string()), 2);
/// assert_eq!(label.to_string(), "FACET_pot_cell.004_2");
///
/// let parsed: FacetLabel = "FACET_pot_cell.004_2".parse().unwrap();
/// assert_eq!(parsed, label);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FacetLabel {
    /// Name of the touching fragment, or `None` for an unresolved facet.
    pub neighbor: Option<String>,
    /// Index of the facet among its fragment's facets.
    pub local_index: usize,
}

impl FacetLabel {
    /// Fixed prefix of every label.
    pub const PREFIX: &'static str = "FACET_";

    /// Neighbor token written for unresolved facets.
    pub const NONE: &'static str = "NONE";

    /// Create a label.
    #[must_use]
    pub const fn new(neighbor: Option<String>, local_index: usize) -> Self {
        Self {
            neighbor,
            local_index,
        }
    }

    /// Parse a label string.
    ///
    /// # Errors
    ///
    /// Returns [`FacetError::InvalidLabel`] if the prefix is missing, there
    /// is no index token, the index is not a number, or the name is empty.
    pub fn parse(text: &str) -> FacetResult<Self> {
        let invalid = || FacetError::InvalidLabel(text.to_string());

        let core = text.strip_prefix(Self::PREFIX).ok_or_else(invalid)?;
        let (name, index) = core.rsplit_once('_').ok_or_else(invalid)?;
        let local_index = index.parse::<usize>().map_err(|_| invalid())?;
        if name.is_empty() {
            return Err(invalid());
        }

        let neighbor = (name != Self::NONE).then(|| name.to_string());
        Ok(Self {
            neighbor,
            local_index,
        })
    }
}

impl fmt::Display for FacetLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = self.neighbor.as_deref().unwrap_or(Self::NONE);
        write!(f, "{}{}_{}", Self::PREFIX, name, self.local_index)
    }
}

impl FromStr for FacetLabel {
    type Err = FacetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn name_with_underscores() {
        let label = FacetLabel::parse("FACET_Pot_001_cell_007_12").unwrap();
        assert_eq!(label.neighbor.as_deref(), Some("Pot_001_cell_007"));
        assert_eq!(label.local_index, 12);
    }

    #[test]
    fn none_neighbor() {
        let label = FacetLabel::parse("FACET_NONE_0").unwrap();
        assert_eq!(label.neighbor, None);
        assert_eq!(FacetLabel::new(None, 3).to_string(), "FACET_NONE_3");
    }

    #[test]
    fn rejects_malformed() {
        for bad in [
            "",
            "FACET_",
            "FACET_abc",
            "FACET__1",
            "FACET_abc_x",
            "RECON_abc_1",
            "FACET_abc_-1",
        ] {
            assert!(
                matches!(FacetLabel::parse(bad), Err(FacetError::InvalidLabel(_))),
                "{bad:?} should not parse"
            );
        }
    }

    #[test]
    fn display_then_parse_keeps_name() {
        let label = FacetLabel::new(Some("a_b_c".to_string()), 0);
        assert_eq!(label.to_string().parse::<FacetLabel>().unwrap(), label);
    }
}
