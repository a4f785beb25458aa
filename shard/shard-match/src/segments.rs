//! World-space line segments for adjacency edges.

use serde::{Deserialize, Serialize};
use shard_facets::FacetMap;
use shard_types::{Fragment, Point3, PoseKind};

use crate::graph::{AdjacencyEdge, AdjacencyGraph};

/// An adjacency edge drawn between the two facet centroids.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeSegment {
    /// The edge this segment represents.
    pub edge: AdjacencyEdge,
    /// Centroid of the smaller-id facet.
    pub start: Point3<f64>,
    /// Centroid of the larger-id facet.
    pub end: Point3<f64>,
}

impl EdgeSegment {
    /// Length of the segment.
    #[must_use]
    pub fn length(&self) -> f64 {
        (self.end - self.start).norm()
    }
}

/// Centroid-to-centroid segments for every edge at the given pose.
///
/// At the canonical pose segments are short (the facets touch); at the
/// current pose they show how far the pieces have moved apart. Edges
/// naming a facet that is not in `facets` are skipped.
#[must_use]
pub fn edge_segments(
    fragments: &[Fragment],
    facets: &FacetMap,
    graph: &AdjacencyGraph,
    kind: PoseKind,
) -> Vec<EdgeSegment> {
    let centroid = |id| {
        let facet = facets.facet(id)?;
        let owner = fragments.get(facet.fragment)?;
        Some(facet.world_centroid(owner, kind))
    };

    graph
        .edges()
        .iter()
        .filter_map(|&edge| {
            Some(EdgeSegment {
                edge,
                start: centroid(edge.a())?,
                end: centroid(edge.b())?,
            })
        })
        .collect()
}
