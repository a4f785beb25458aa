//! Parameters for surface sampling.

use serde::{Deserialize, Serialize};

/// How many points to draw and how to seed the generator.
///
/// With a seed, fragment `i` draws from a stream seeded with
/// `seed + i`, so results do not depend on how fragments are scheduled
/// across threads. Without one, each fragment is seeded from entropy.
///
/// # Example
///
/// ```
/// use shard_sample::SampleParams;
///
/// let params = SampleParams::default().points_per_fragment(512).seed(7);
/// assert_eq!(params.points_per_fragment, 512);
/// assert_eq!(params.seed, Some(7));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SampleParams {
    /// Number of points drawn on every fragment.
    pub points_per_fragment: usize,

    /// Base seed, or `None` for entropy.
    pub seed: Option<u64>,
}

impl Default for SampleParams {
    fn default() -> Self {
        Self {
            points_per_fragment: 2048,
            seed: None,
        }
    }
}

impl SampleParams {
    /// Reproducible sampling with the given base seed.
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self::default().seed(seed)
    }

    /// Set the number of points per fragment.
    #[must_use]
    pub const fn points_per_fragment(mut self, count: usize) -> Self {
        self.points_per_fragment = count;
        self
    }

    /// Set the base seed.
    #[must_use]
    pub const fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}
