//! Nearest-centroid facet matching.
//!
//! Every resolved facet looks for a partner on the fragment it touched,
//! among that fragment's facets that touched it back, and picks the one
//! with the nearest canonical-pose centroid. Picks are made independently
//! per facet, so they need not agree; disagreements are reported rather
//! than repaired.

use hashbrown::HashMap;
use rayon::prelude::*;
use shard_facets::{Facet, FacetMap};
use shard_types::{Diagnostic, FacetId, Fragment, PoseKind};
use tracing::{debug, info, warn};

use crate::graph::AdjacencyGraph;

/// One facet's chosen partner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pick {
    /// The facet that chose.
    pub facet: FacetId,
    /// The chosen partner.
    pub partner: FacetId,
    /// Canonical-pose centroid distance between the two.
    pub distance: f64,
}

/// Result of matching a whole facet map.
#[derive(Debug, Clone, Default)]
pub struct FacetMatching {
    /// Deduplicated adjacency edges in facet id order of discovery.
    pub graph: AdjacencyGraph,
    /// Picks, ordered by the choosing facet's id.
    pub picks: Vec<Pick>,
    /// Resolved facets that found no partner within range, ascending.
    pub unmatched: Vec<FacetId>,
    /// Asymmetric and contested picks.
    pub diagnostics: Vec<Diagnostic>,
}

impl FacetMatching {
    /// The partner `facet` chose, if any.
    #[must_use]
    pub fn pick_of(&self, facet: FacetId) -> Option<FacetId> {
        self.picks
            .binary_search_by_key(&facet, |p| p.facet)
            .ok()
            .map(|i| self.picks[i].partner)
    }

    /// Number of picks confirmed from both sides.
    #[must_use]
    pub fn mutual_count(&self) -> usize {
        self.picks
            .iter()
            .filter(|p| p.facet < p.partner && self.pick_of(p.partner) == Some(p.facet))
            .count()
    }
}

/// Nearest partner for one facet, if one lies strictly within
/// `max_distance`.
///
/// Candidates are the facets of the fragment `facet` touched whose own
/// neighbor is `facet`'s fragment. Centroids are compared at the canonical
/// pose; on equal distance the lower id wins.
#[must_use]
pub fn find_partner(
    facet: &Facet,
    fragments: &[Fragment],
    facets: &FacetMap,
    max_distance: f64,
) -> Option<Pick> {
    let target = facet.neighbor?;
    let owner = fragments.get(facet.fragment)?;
    let other = fragments.get(target)?;
    let origin = facet.world_centroid(owner, PoseKind::Canonical);

    let mut best: Option<Pick> = None;
    for candidate in facets.facets_of(target) {
        if candidate.neighbor != Some(facet.fragment) {
            continue;
        }
        let distance = (candidate.world_centroid(other, PoseKind::Canonical) - origin).norm();
        if distance >= max_distance {
            continue;
        }
        if best.is_none_or(|b| distance < b.distance) {
            best = Some(Pick {
                facet: facet.id,
                partner: candidate.id,
                distance,
            });
        }
    }
    best
}

/// Match every resolved facet and build the adjacency graph.
///
/// Partner searches run in parallel; edges are then inserted in the
/// choosing facet's id order, so the graph is the same on every run.
/// A pair found from both sides is emitted once.
///
/// # Example
///
/// ```
/// use shard_facets::{FacetMap, FragmentSegmentation, LocalFacet};
/// use shard_match::match_facets;
/// use shard_types::{Fragment, Point3, ShardMesh};
///
/// let cube = ShardMesh::cuboid(Point3::origin(), Point3::new(1.0, 1.0, 1.0));
/// let fragments = [
///     Fragment::new("a", cube.clone()),
///     Fragment::new("b", cube).with_canonical_translation(1.0, 0.0, 0.0),
/// ];
///
/// let facet = |fragment, neighbor, x| {
///     let mut seg = FragmentSegmentation::empty(fragment, 6);
///     seg.facets.push(LocalFacet {
///         faces: vec![5 - fragment],
///         neighbor: Some(neighbor),
///         centroid: Point3::new(x, 0.5, 0.5),
///         area: 1.0,
///     });
///     seg
/// };
/// let map = FacetMap::from_segmentations(vec![facet(0, 1, 1.0), facet(1, 0, 0.0)]);
///
/// let matching = match_facets(&fragments, &map, 2.0);
/// assert_eq!(matching.graph.to_pairs(), vec![[1, 2]]);
/// assert!(matching.diagnostics.is_empty());
/// ```
#[must_use]
pub fn match_facets(fragments: &[Fragment], facets: &FacetMap, max_distance: f64) -> FacetMatching {
    let searches: Vec<(FacetId, Option<Pick>)> = facets
        .facets()
        .par_iter()
        .filter(|f| f.neighbor.is_some())
        .map(|f| (f.id, find_partner(f, fragments, facets, max_distance)))
        .collect();

    let mut graph = AdjacencyGraph::new();
    let mut picks = Vec::new();
    let mut unmatched = Vec::new();
    for (id, pick) in searches {
        match pick {
            Some(pick) => {
                graph.insert(pick.facet, pick.partner);
                picks.push(pick);
            }
            None => unmatched.push(id),
        }
    }

    let mut matching = FacetMatching {
        graph,
        picks,
        unmatched,
        diagnostics: Vec::new(),
    };
    matching.diagnostics = diagnose_picks(&matching);
    for diagnostic in &matching.diagnostics {
        warn!(%diagnostic, "ambiguous facet match");
    }

    debug!(
        unmatched = matching.unmatched.len(),
        mutual = matching.mutual_count(),
        "facet picks"
    );
    info!(
        facets = facets.len(),
        edges = matching.graph.len(),
        diagnostics = matching.diagnostics.len(),
        "matched facets"
    );
    matching
}

/// Asymmetric picks first, in the choosing facet's id order, then
/// contested partners in id order.
fn diagnose_picks(matching: &FacetMatching) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();
    let mut claims: HashMap<FacetId, Vec<FacetId>> = HashMap::new();

    for pick in &matching.picks {
        let choice = matching.pick_of(pick.partner);
        if choice != Some(pick.facet) {
            diagnostics.push(Diagnostic::AsymmetricMatch {
                facet: pick.facet,
                partner: pick.partner,
                partner_choice: choice,
            });
        }
        claims.entry(pick.partner).or_default().push(pick.facet);
    }

    let mut contested: Vec<(FacetId, Vec<FacetId>)> = claims
        .into_iter()
        .filter(|(_, claimants)| claimants.len() > 1)
        .collect();
    contested.sort_unstable_by_key(|(facet, _)| *facet);
    diagnostics.extend(
        contested
            .into_iter()
            .map(|(facet, claimants)| Diagnostic::ContestedFacet { facet, claimants }),
    );
    diagnostics
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use shard_facets::{FragmentSegmentation, LocalFacet};
    use shard_types::{NeighborLabel, Point3, ShardMesh};

    fn fragments(n: usize) -> Vec<Fragment> {
        let cube = ShardMesh::cuboid(Point3::origin(), Point3::new(1.0, 1.0, 1.0));
        (0..n)
            .map(|i| Fragment::new(format!("f{i}"), cube.clone()))
            .collect()
    }

    fn local(neighbor: NeighborLabel, x: f64) -> LocalFacet {
        LocalFacet {
            faces: vec![0],
            neighbor,
            centroid: Point3::new(x, 0.0, 0.0),
            area: 1.0,
        }
    }

    fn map(per_fragment: Vec<Vec<LocalFacet>>) -> FacetMap {
        FacetMap::from_segmentations(
            per_fragment
                .into_iter()
                .enumerate()
                .map(|(i, facets)| {
                    let mut seg = FragmentSegmentation::empty(i, 6);
                    seg.facets = facets;
                    seg
                })
                .collect(),
        )
    }

    #[test]
    fn mutual_pair_emitted_once() {
        let frags = fragments(2);
        let m = map(vec![vec![local(Some(1), 0.0)], vec![local(Some(0), 0.1)]]);
        let matching = match_facets(&frags, &m, 2.0);

        assert_eq!(matching.graph.to_pairs(), vec![[1, 2]]);
        assert_eq!(matching.picks.len(), 2);
        assert_eq!(matching.mutual_count(), 1);
        assert_relative_eq!(matching.picks[0].distance, 0.1, epsilon = 1e-12);
        assert!(matching.unmatched.is_empty());
        assert!(matching.diagnostics.is_empty());
    }

    #[test]
    fn partner_must_point_back() {
        // Facet 2 on f1 touched f2, not f0, so facet 1 has no candidate.
        let frags = fragments(3);
        let m = map(vec![
            vec![local(Some(1), 0.0)],
            vec![local(Some(2), 0.0)],
            vec![],
        ]);
        let matching = match_facets(&frags, &m, 2.0);
        assert!(matching.graph.is_empty());
        assert_eq!(matching.unmatched, vec![1, 2]);
    }

    #[test]
    fn distance_threshold_is_strict() {
        let frags = fragments(2);
        let m = map(vec![vec![local(Some(1), 0.0)], vec![local(Some(0), 2.0)]]);
        assert!(match_facets(&frags, &m, 2.0).graph.is_empty());
        assert_eq!(match_facets(&frags, &m, 2.5).graph.len(), 1);
    }

    #[test]
    fn canonical_pose_used_for_distance() {
        let mut frags = fragments(2);
        frags[1] = frags[1].clone().with_canonical_translation(5.0, 0.0, 0.0);
        let m = map(vec![vec![local(Some(1), 5.0)], vec![local(Some(0), 0.0)]]);
        let matching = match_facets(&frags, &m, 0.5);
        assert_eq!(matching.graph.len(), 1);
        assert_relative_eq!(matching.picks[0].distance, 0.0);

        // The current pose is ignored.
        frags[1] = frags[1].clone().with_current_translation(100.0, 0.0, 0.0);
        assert_eq!(match_facets(&frags, &m, 0.5).graph.len(), 1);
    }

    #[test]
    fn nearest_candidate_wins_and_ties_go_to_lower_id() {
        let frags = fragments(2);
        let m = map(vec![
            vec![local(Some(1), 0.0)],
            vec![local(Some(0), 0.5), local(Some(0), 0.2), local(Some(0), -0.2)],
        ]);
        let matching = match_facets(&frags, &m, 2.0);
        assert_eq!(matching.pick_of(1), Some(3));
    }

    #[test]
    fn asymmetric_and_contested_are_reported() {
        // f0 has facets at x=0 (id 1) and x=1 (id 2); f1 has one at x=0.9
        // (id 3). Both f0 facets pick 3; 3 picks 2.
        let frags = fragments(2);
        let m = map(vec![
            vec![local(Some(1), 0.0), local(Some(1), 1.0)],
            vec![local(Some(0), 0.9)],
        ]);
        let matching = match_facets(&frags, &m, 2.0);

        assert_eq!(matching.graph.to_pairs(), vec![[1, 3], [2, 3]]);
        assert_eq!(
            matching.diagnostics,
            vec![
                Diagnostic::AsymmetricMatch {
                    facet: 1,
                    partner: 3,
                    partner_choice: Some(2),
                },
                Diagnostic::ContestedFacet {
                    facet: 3,
                    claimants: vec![1, 2],
                },
            ]
        );
        assert_eq!(matching.mutual_count(), 1);
    }

    #[test]
    fn unresolved_facets_never_match() {
        let frags = fragments(2);
        let m = map(vec![vec![local(None, 0.0)], vec![local(Some(0), 0.0)]]);
        let matching = match_facets(&frags, &m, 2.0);
        assert!(matching.graph.is_empty());
        assert_eq!(matching.unmatched, vec![2]);
        assert_eq!(matching.pick_of(1), None);
    }

    #[test]
    fn neighbor_out_of_range_is_unmatched() {
        let frags = fragments(1);
        let m = map(vec![vec![local(Some(4), 0.0)]]);
        let matching = match_facets(&frags, &m, 2.0);
        assert_eq!(matching.unmatched, vec![1]);
    }
}
