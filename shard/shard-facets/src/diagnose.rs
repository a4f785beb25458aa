//! Facets touching more than one fragment.
//!
//! Propagation forces one label per facet, which can hide a real
//! contradiction: member faces that were each within the proximity
//! threshold of a *different* fragment. This check looks at every member
//! face again, without smoothing, and reports the facet when the union of
//! touching fragments has more than one element.

use rayon::prelude::*;
use shard_spatial::NeighborResolver;
use shard_types::{Diagnostic, Fragment};
use tracing::warn;

use crate::facet::FacetMap;

/// Report every facet whose faces lie within `threshold` of more than one
/// other fragment.
///
/// Neighbor names in each diagnostic are listed in fragment order.
/// Diagnostics are returned in facet id order.
#[must_use]
pub fn diagnose_multi_neighbor(
    fragments: &[Fragment],
    facets: &FacetMap,
    resolver: &NeighborResolver,
    threshold: f64,
) -> Vec<Diagnostic> {
    let diagnostics: Vec<Diagnostic> = facets
        .facets()
        .par_iter()
        .filter_map(|facet| {
            let owner = fragments.get(facet.fragment)?;
            let mut touching: Vec<usize> = facet
                .faces
                .iter()
                .flat_map(|&face| {
                    let query = owner.world_face_center(face, resolver.pose());
                    resolver.neighbors_within(&query, facet.fragment, threshold)
                })
                .collect();
            touching.sort_unstable();
            touching.dedup();

            (touching.len() > 1).then(|| Diagnostic::MultiNeighborFacet {
                facet: facet.id,
                fragment: owner.name().to_string(),
                neighbors: touching
                    .iter()
                    .filter_map(|&n| fragments.get(n))
                    .map(|f| f.name().to_string())
                    .collect(),
            })
        })
        .collect();

    for diagnostic in &diagnostics {
        warn!(%diagnostic, "facet touches several fragments");
    }
    diagnostics
}
