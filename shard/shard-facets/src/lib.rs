//! Facet segmentation of fracture surfaces.
//!
//! Each fragment's break surface (its interior faces) is split into
//! *facets*: connected regions that touched one particular neighboring
//! fragment before the object broke.
//!
//! The per-fragment steps are:
//!
//! 1. [`candidate_faces`] reads the interior attribute.
//! 2. [`resolve_raw_labels`] asks a [`NeighborResolver`] which other
//!    fragment each candidate face touches.
//! 3. [`propagate_labels`] smooths those labels by majority vote over
//!    shared-edge neighbors.
//! 4. [`segment_faces`] grows facets breadth-first over faces with equal
//!    labels.
//!
//! [`segment_all`] runs the steps for every fragment in parallel and hands
//! the results to [`FacetMap`], which assigns global ids.
//!
//! # Example
//!
//! ```
//! use shard_facets::{FacetParams, segment_all};
//! use shard_spatial::NeighborResolver;
//! use shard_types::{Fragment, PoseKind, Point3, ShardMesh};
//!
//! let left = ShardMesh::cuboid(Point3::origin(), Point3::new(1.0, 1.0, 1.0));
//! let right = ShardMesh::cuboid(Point3::new(1.0, 0.0, 0.0), Point3::new(2.0, 1.0, 1.0));
//! let fragments = [
//!     Fragment::new("left", left).with_interior(vec![false, false, false, false, false, true]),
//!     Fragment::new("right", right).with_interior(vec![false, false, false, false, true, false]),
//! ];
//!
//! let resolver = NeighborResolver::build(&fragments, PoseKind::Canonical);
//! let (facets, diagnostics) = segment_all(&fragments, &resolver, &FacetParams::default());
//!
//! assert!(diagnostics.is_empty());
//! assert_eq!(facets.len(), 2);
//! assert_eq!(facets.facet(1).unwrap().neighbor, Some(1));
//! assert_eq!(facets.facet(2).unwrap().neighbor, Some(0));
//! ```
//!
//! [`NeighborResolver`]: shard_spatial::NeighborResolver

#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]

mod adjacency;
mod classify;
mod diagnose;
mod error;
mod facet;
mod label;
mod params;
mod propagate;
mod segment;

pub use adjacency::FaceAdjacency;
pub use classify::{ClassifierReport, candidate_faces};
pub use diagnose::diagnose_multi_neighbor;
pub use error::{FacetError, FacetResult};
pub use facet::{Facet, FacetMap};
pub use label::FacetLabel;
pub use params::FacetParams;
pub use propagate::{Propagation, propagate_labels, resolve_raw_labels};
pub use segment::{
    FragmentSegmentation, LocalFacet, facet_centroid, segment_all, segment_faces,
    segment_fragment,
};
