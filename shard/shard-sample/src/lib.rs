//! Facet-labeled point clouds.
//!
//! Draws area-weighted random points on each fragment's surface at its
//! current pose and labels each point with the facet id of the nearest
//! face (0 for outer surface). Fragments are sampled independently and in
//! parallel; a seeded run is reproducible regardless of thread count.
//!
//! # Example
//!
//! ```
//! use shard_facets::{FacetMap, FragmentSegmentation};
//! use shard_sample::{SampleParams, sample_all};
//! use shard_types::{Fragment, Point3, ShardMesh};
//!
//! let cube = ShardMesh::cuboid(Point3::origin(), Point3::new(1.0, 1.0, 1.0));
//! let fragments = [Fragment::new("a", cube)];
//! let facets = FacetMap::from_segmentations(vec![FragmentSegmentation::empty(0, 6)]);
//!
//! let params = SampleParams::seeded(42).points_per_fragment(100);
//! let (clouds, diagnostics) = sample_all(&fragments, &facets, &params);
//!
//! assert!(diagnostics.is_empty());
//! assert_eq!(clouds[0].len(), 100);
//! assert!(clouds[0].iter().all(|p| p.label == 0));
//! ```

#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]

mod distribution;
mod error;
mod params;
mod sampler;

pub use distribution::{AreaDistribution, sample_triangle};
pub use error::{SampleError, SampleResult};
pub use params::SampleParams;
pub use sampler::{LabeledPoint, fragment_rng, sample_all, sample_fragment};
