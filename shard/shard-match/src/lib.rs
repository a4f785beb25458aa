//! Fracture adjacency reconstruction.
//!
//! Pairs facets across fragments: a facet on fragment A that touched B is
//! matched with the nearest facet on B that touched A, comparing centroids
//! at the canonical pose. The result is an [`AdjacencyGraph`] of unordered
//! facet-id pairs, plus diagnostics for picks the two sides disagree on.
//!
//! Matching must run after every fragment has been segmented, because it
//! looks up facets of other fragments by index.

#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]

mod graph;
mod matcher;
mod segments;

pub use graph::{AdjacencyEdge, AdjacencyGraph};
pub use matcher::{FacetMatching, Pick, find_partner, match_facets};
pub use segments::{EdgeSegment, edge_segments};
