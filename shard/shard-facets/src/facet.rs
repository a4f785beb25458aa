//! Facets with global ids.

use std::ops::Range;

use serde::{Deserialize, Serialize};
use shard_types::{FacetId, Fragment, NeighborLabel, Point3, PoseKind, UNASSIGNED_FACET};

use crate::label::FacetLabel;
use crate::segment::FragmentSegmentation;

/// A connected region of one fragment's break surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Facet {
    /// Global id, starting at 1.
    pub id: FacetId,
    /// Index of the owning fragment.
    pub fragment: usize,
    /// Position among the owning fragment's facets.
    pub local_index: usize,
    /// Member faces, ascending.
    pub faces: Vec<usize>,
    /// Fragment this facet touched, if resolved.
    pub neighbor: NeighborLabel,
    /// Area-weighted centroid in the owning fragment's local frame.
    pub centroid: Point3<f64>,
    /// Total area of the member faces.
    pub area: f64,
}

impl Facet {
    /// Centroid in world space at the requested pose of `owner`.
    ///
    /// `owner` must be the fragment this facet belongs to.
    #[must_use]
    pub fn world_centroid(&self, owner: &Fragment, kind: PoseKind) -> Point3<f64> {
        owner.pose(kind) * self.centroid
    }

    /// Label string naming the touched fragment and the local index.
    ///
    /// A neighbor index outside `fragments` is written as unresolved.
    #[must_use]
    pub fn label(&self, fragments: &[Fragment]) -> FacetLabel {
        let neighbor = self
            .neighbor
            .and_then(|n| fragments.get(n))
            .map(|f| f.name().to_string());
        FacetLabel::new(neighbor, self.local_index)
    }
}

/// All facets of a fragment set, with dense global ids.
///
/// Ids are assigned in fragment order, then in each fragment's discovery
/// order, starting at 1. Facet `id` is stored at position `id - 1`, and a
/// per-fragment face table maps every face to its facet id
/// ([`UNASSIGNED_FACET`] for faces outside every facet).
///
/// # Example
///
/// ```
/// use shard_facets::{FacetMap, FragmentSegmentation, LocalFacet};
/// use shard_types::Point3;
///
/// let mut seg = FragmentSegmentation::empty(0, 6);
/// seg.candidates = vec![5];
/// seg.labels[5] = Some(1);
/// seg.facets.push(LocalFacet {
///     faces: vec![5],
///     neighbor: Some(1),
///     centroid: Point3::new(1.0, 0.5, 0.5),
///     area: 1.0,
/// });
///
/// let map = FacetMap::from_segmentations(vec![FragmentSegmentation::empty(1, 6), seg]);
///
/// assert_eq!(map.len(), 1);
/// assert_eq!(map.facet(1).unwrap().fragment, 0);
/// assert_eq!(map.facet_of_face(0, 5), 1);
/// assert_eq!(map.facet_of_face(1, 5), 0);
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FacetMap {
    facets: Vec<Facet>,
    ranges: Vec<Range<usize>>,
    face_facets: Vec<Vec<FacetId>>,
}

impl FacetMap {
    /// Assign global ids to per-fragment segmentations.
    ///
    /// Segmentations are ordered by fragment index first, so the result does
    /// not depend on the order they were produced in. Fragment indices
    /// should be `0..n` without gaps; a missing index gets an empty face
    /// table.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn from_segmentations(mut segmentations: Vec<FragmentSegmentation>) -> Self {
        segmentations.sort_by_key(|s| s.fragment);
        let fragment_count = segmentations.last().map_or(0, |s| s.fragment + 1);

        let mut facets = Vec::new();
        let mut ranges = vec![0..0; fragment_count];
        let mut face_facets = vec![Vec::new(); fragment_count];

        for seg in segmentations {
            let start = facets.len();
            let mut table = vec![UNASSIGNED_FACET; seg.face_count];
            for (local_index, local) in seg.facets.into_iter().enumerate() {
                let id = (facets.len() + 1) as FacetId;
                for &face in &local.faces {
                    if let Some(slot) = table.get_mut(face) {
                        *slot = id;
                    }
                }
                facets.push(Facet {
                    id,
                    fragment: seg.fragment,
                    local_index,
                    faces: local.faces,
                    neighbor: local.neighbor,
                    centroid: local.centroid,
                    area: local.area,
                });
            }
            ranges[seg.fragment] = start..facets.len();
            face_facets[seg.fragment] = table;
        }

        Self {
            facets,
            ranges,
            face_facets,
        }
    }

    /// All facets, ordered by id.
    #[must_use]
    pub fn facets(&self) -> &[Facet] {
        &self.facets
    }

    /// Facet by global id.
    #[must_use]
    pub fn facet(&self, id: FacetId) -> Option<&Facet> {
        (id as usize).checked_sub(1).and_then(|i| self.facets.get(i))
    }

    /// Facets owned by one fragment, in discovery order.
    #[must_use]
    pub fn facets_of(&self, fragment: usize) -> &[Facet] {
        self.ranges
            .get(fragment)
            .and_then(|r| self.facets.get(r.clone()))
            .unwrap_or(&[])
    }

    /// Facet id of every face of a fragment.
    #[must_use]
    pub fn face_facets(&self, fragment: usize) -> &[FacetId] {
        self.face_facets.get(fragment).map_or(&[], Vec::as_slice)
    }

    /// Facet id of one face, or [`UNASSIGNED_FACET`].
    #[must_use]
    pub fn facet_of_face(&self, fragment: usize, face: usize) -> FacetId {
        self.face_facets(fragment)
            .get(face)
            .copied()
            .unwrap_or(UNASSIGNED_FACET)
    }

    /// Number of facets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.facets.len()
    }

    /// Check if there are no facets.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.facets.is_empty()
    }

    /// Number of fragments with a face table.
    #[must_use]
    pub fn fragment_count(&self) -> usize {
        self.face_facets.len()
    }

    /// Facets with a resolved neighbor.
    pub fn resolved(&self) -> impl Iterator<Item = &Facet> {
        self.facets.iter().filter(|f| f.neighbor.is_some())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use crate::segment::LocalFacet;
    use shard_types::ShardMesh;

    fn local(faces: Vec<usize>, neighbor: NeighborLabel) -> LocalFacet {
        LocalFacet {
            faces,
            neighbor,
            centroid: Point3::origin(),
            area: 1.0,
        }
    }

    fn seg(fragment: usize, facets: Vec<LocalFacet>) -> FragmentSegmentation {
        let mut s = FragmentSegmentation::empty(fragment, 6);
        s.facets = facets;
        s
    }

    #[test]
    fn ids_follow_fragment_then_discovery_order() {
        let segs = vec![
            seg(2, vec![local(vec![0], Some(0))]),
            seg(0, vec![local(vec![1], Some(2)), local(vec![3, 4], None)]),
            seg(1, vec![]),
        ];
        let map = FacetMap::from_segmentations(segs);

        let ids: Vec<(FacetId, usize, usize)> = map
            .facets()
            .iter()
            .map(|f| (f.id, f.fragment, f.local_index))
            .collect();
        assert_eq!(ids, vec![(1, 0, 0), (2, 0, 1), (3, 2, 0)]);

        assert_eq!(map.facets_of(0).len(), 2);
        assert!(map.facets_of(1).is_empty());
        assert!(map.facets_of(9).is_empty());
        assert_eq!(map.face_facets(0), &[0, 1, 0, 2, 2, 0]);
        assert_eq!(map.resolved().count(), 2);
        assert_eq!(map.fragment_count(), 3);
    }

    #[test]
    fn facet_lookup_rejects_zero() {
        let map = FacetMap::from_segmentations(vec![seg(0, vec![local(vec![0], None)])]);
        assert!(map.facet(0).is_none());
        assert!(map.facet(1).is_some());
        assert!(map.facet(2).is_none());
    }

    #[test]
    fn empty_map() {
        let map = FacetMap::from_segmentations(Vec::new());
        assert!(map.is_empty());
        assert_eq!(map.facet_of_face(0, 0), UNASSIGNED_FACET);
    }

    #[test]
    fn label_uses_neighbor_name() {
        let mesh = ShardMesh::cuboid(Point3::origin(), Point3::new(1.0, 1.0, 1.0));
        let fragments = [
            Fragment::new("left_cell", mesh.clone()),
            Fragment::new("right_cell", mesh),
        ];
        let map = FacetMap::from_segmentations(vec![
            seg(0, vec![local(vec![5], None), local(vec![4], Some(1))]),
            seg(1, vec![]),
        ]);
        assert_eq!(map.facet(1).unwrap().label(&fragments).to_string(), "FACET_NONE_0");
        assert_eq!(
            map.facet(2).unwrap().label(&fragments).to_string(),
            "FACET_right_cell_1"
        );
    }

    #[test]
    fn world_centroid_uses_pose() {
        let mesh = ShardMesh::cuboid(Point3::origin(), Point3::new(1.0, 1.0, 1.0));
        let owner = Fragment::new("a", mesh).with_current_translation(0.0, 4.0, 0.0);
        let mut l = local(vec![5], Some(1));
        l.centroid = Point3::new(1.0, 0.5, 0.5);
        let map = FacetMap::from_segmentations(vec![seg(0, vec![l])]);
        let facet = map.facet(1).unwrap();
        assert_eq!(facet.world_centroid(&owner, PoseKind::Canonical).y, 0.5);
        assert_eq!(facet.world_centroid(&owner, PoseKind::Current).y, 4.5);
    }
}
