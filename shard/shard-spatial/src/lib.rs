//! Spatial queries across fragment surfaces.
//!
//! This crate answers one question for the reconstruction pipeline: given a
//! world-space point, which *other* fragment's surface is closest, and how
//! far away is it?
//!
//! - [`SurfaceIndex`] - A bounding volume hierarchy over one fragment's
//!   fan-triangulated faces, posed in world space, answering closest-point
//!   queries by branch and bound
//! - [`NeighborResolver`] - One [`SurfaceIndex`] per fragment, built once
//!   (in parallel) and then queried read-only
//!
//! # Example
//!
//! ```
//! use shard_spatial::NeighborResolver;
//! use shard_types::{Fragment, PoseKind, Point3, ShardMesh};
//!
//! let unit = |x: f64| {
//!     ShardMesh::cuboid(Point3::new(x, 0.0, 0.0), Point3::new(x + 1.0, 1.0, 1.0))
//! };
//! let a = Fragment::new("a", unit(0.0));
//! let b = Fragment::new("b", unit(1.0));
//! let fragments = [a, b];
//!
//! let resolver = NeighborResolver::build(&fragments, PoseKind::Canonical);
//!
//! // The +X face center of `a` lies on `b`'s -X face.
//! let query = fragments[0].world_face_center(5, PoseKind::Canonical);
//! assert_eq!(resolver.resolve(&query, 0, 0.001), Some(1));
//!
//! // The -X face center of `a` is a full unit away from `b`.
//! let query = fragments[0].world_face_center(4, PoseKind::Canonical);
//! assert_eq!(resolver.resolve(&query, 0, 0.001), None);
//! ```

#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]

mod index;
mod resolver;

pub use index::{DEFAULT_MAX_LEAF_SIZE, IndexStats, SurfaceHit, SurfaceIndex};
pub use resolver::{NeighborHit, NeighborResolver};
