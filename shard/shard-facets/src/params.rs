//! Parameters for facet segmentation and matching.

use serde::{Deserialize, Serialize};
use shard_spatial::DEFAULT_MAX_LEAF_SIZE;

/// Tunable thresholds for segmentation and adjacency matching.
///
/// # Example
///
/// ```
/// use shard_facets::FacetParams;
///
/// let params = FacetParams::default();
/// assert!((params.proximity_threshold - 0.001).abs() < 1e-12);
/// assert_eq!(params.propagation_iterations, 5);
///
/// // Thresholds for an object roughly 20 units across.
/// let scaled = FacetParams::scaled_to(20.0);
/// assert!((scaled.proximity_threshold - 0.1).abs() < 1e-12);
/// assert!((scaled.match_distance - 20.0).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FacetParams {
    /// A face touches another fragment only if that fragment's surface is
    /// strictly closer than this to the face center.
    pub proximity_threshold: f64,

    /// Number of majority-vote smoothing passes over the face labels.
    pub propagation_iterations: usize,

    /// Matched facet centroids must be strictly closer than this.
    pub match_distance: f64,

    /// Maximum triangles per leaf of each fragment's surface index.
    pub max_leaf_size: usize,
}

impl Default for FacetParams {
    fn default() -> Self {
        Self {
            proximity_threshold: 0.001,
            propagation_iterations: 5,
            match_distance: 2.0,
            max_leaf_size: DEFAULT_MAX_LEAF_SIZE,
        }
    }
}

impl FacetParams {
    /// Fraction of the characteristic size used as proximity threshold.
    pub const PROXIMITY_FRACTION: f64 = 0.005;

    /// Thresholds derived from a characteristic object size.
    ///
    /// The proximity threshold is 0.5% of `size`; the match distance is
    /// `size` itself.
    #[must_use]
    pub fn scaled_to(size: f64) -> Self {
        Self {
            proximity_threshold: size * Self::PROXIMITY_FRACTION,
            match_distance: size,
            ..Self::default()
        }
    }

    /// Set the proximity threshold.
    #[must_use]
    pub const fn proximity_threshold(mut self, threshold: f64) -> Self {
        self.proximity_threshold = threshold;
        self
    }

    /// Set the number of propagation passes.
    #[must_use]
    pub const fn propagation_iterations(mut self, iterations: usize) -> Self {
        self.propagation_iterations = iterations;
        self
    }

    /// Set the match distance.
    #[must_use]
    pub const fn match_distance(mut self, distance: f64) -> Self {
        self.match_distance = distance;
        self
    }

    /// Set the surface index leaf size.
    #[must_use]
    pub const fn max_leaf_size(mut self, size: usize) -> Self {
        self.max_leaf_size = size;
        self
    }
}
