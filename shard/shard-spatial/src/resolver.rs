//! Cross-fragment nearest-surface resolution.

use crate::index::{SurfaceIndex, build_all};
use crate::DEFAULT_MAX_LEAF_SIZE;
use shard_types::{Fragment, NeighborLabel, Point3, PoseKind};
use tracing::debug;

/// The nearest foreign surface found for a query point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NeighborHit {
    /// Index of the fragment owning the surface.
    pub fragment: usize,
    /// Face on that fragment containing the closest point.
    pub face: usize,
    /// Closest point, in world space.
    pub point: Point3<f64>,
    /// Distance from the query point.
    pub distance: f64,
}

/// One closest-point index per fragment, all at the same pose.
///
/// Indices are built once (in parallel) by [`NeighborResolver::build`] and
/// are read-only afterwards, so the resolver can be shared across threads
/// for per-fragment work.
#[derive(Debug)]
pub struct NeighborResolver {
    indices: Vec<SurfaceIndex>,
    pose: PoseKind,
}

impl NeighborResolver {
    /// Index every fragment at `pose` with the default leaf size.
    #[must_use]
    pub fn build(fragments: &[Fragment], pose: PoseKind) -> Self {
        Self::with_leaf_size(fragments, pose, DEFAULT_MAX_LEAF_SIZE)
    }

    /// Index every fragment at `pose` with an explicit leaf size.
    #[must_use]
    pub fn with_leaf_size(fragments: &[Fragment], pose: PoseKind, max_leaf_size: usize) -> Self {
        let indices = build_all(fragments, pose, max_leaf_size);
        debug!(
            fragments = indices.len(),
            triangles = indices.iter().map(SurfaceIndex::triangle_count).sum::<usize>(),
            ?pose,
            "built surface indices"
        );
        Self { indices, pose }
    }

    /// Pose the indices were built at.
    #[must_use]
    pub fn pose(&self) -> PoseKind {
        self.pose
    }

    /// Number of indexed fragments.
    #[must_use]
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    /// Check if no fragments are indexed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Index for a single fragment.
    #[must_use]
    pub fn index(&self, fragment: usize) -> Option<&SurfaceIndex> {
        self.indices.get(fragment)
    }

    /// Nearest surface among all fragments except `exclude`.
    ///
    /// The strictly closest fragment wins; an exact tie goes to the lower
    /// fragment index.
    #[must_use]
    pub fn nearest(&self, point: &Point3<f64>, exclude: usize) -> Option<NeighborHit> {
        self.nearest_within(point, exclude, f64::INFINITY)
    }

    /// Nearest surface among all fragments except `exclude`, considering
    /// only surfaces within `max_distance` (inclusive).
    #[must_use]
    pub fn nearest_within(
        &self,
        point: &Point3<f64>,
        exclude: usize,
        max_distance: f64,
    ) -> Option<NeighborHit> {
        let mut best: Option<NeighborHit> = None;
        for (fragment, index) in self.indices.iter().enumerate() {
            if fragment == exclude {
                continue;
            }
            let limit = best.map_or(max_distance, |b| b.distance);
            let Some(hit) = index.closest_point_within(point, limit) else {
                continue;
            };
            if best.is_none_or(|b| hit.distance < b.distance) {
                best = Some(NeighborHit {
                    fragment,
                    face: hit.face,
                    point: hit.point,
                    distance: hit.distance,
                });
            }
        }
        best
    }

    /// Resolve the neighbor label of a query point.
    ///
    /// Returns the index of the closest other fragment if it lies strictly
    /// closer than `threshold`, otherwise `None`.
    #[must_use]
    pub fn resolve(&self, point: &Point3<f64>, exclude: usize, threshold: f64) -> NeighborLabel {
        self.nearest_within(point, exclude, threshold)
            .filter(|hit| hit.distance < threshold)
            .map(|hit| hit.fragment)
    }

    /// Every fragment other than `exclude` whose surface lies strictly
    /// closer than `threshold`, ascending.
    #[must_use]
    pub fn neighbors_within(
        &self,
        point: &Point3<f64>,
        exclude: usize,
        threshold: f64,
    ) -> Vec<usize> {
        self.indices
            .iter()
            .enumerate()
            .filter(|&(fragment, _)| fragment != exclude)
            .filter(|(_, index)| {
                index
                    .closest_point_within(point, threshold)
                    .is_some_and(|hit| hit.distance < threshold)
            })
            .map(|(fragment, _)| fragment)
            .collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use shard_types::ShardMesh;

    fn cube_at(name: &str, x: f64, y: f64) -> Fragment {
        Fragment::new(
            name,
            ShardMesh::cuboid(Point3::new(x, y, 0.0), Point3::new(x + 1.0, y + 1.0, 1.0)),
        )
    }

    #[test]
    fn excludes_own_fragment() {
        let fragments = [cube_at("a", 0.0, 0.0), cube_at("b", 3.0, 0.0)];
        let resolver = NeighborResolver::build(&fragments, PoseKind::Canonical);

        let p = Point3::new(0.5, 0.5, 1.0);
        let hit = resolver.nearest(&p, 0).unwrap();
        assert_eq!(hit.fragment, 1);
        assert_relative_eq!(hit.distance, 2.5, epsilon = 1e-12);
    }

    #[test]
    fn strictly_closest_wins() {
        // b at distance 0.2, c at distance 0.1 from the query point.
        let fragments = [
            cube_at("a", 0.0, 0.0),
            cube_at("b", 1.2, 0.0),
            cube_at("c", 0.0, 1.1),
        ];
        let resolver = NeighborResolver::build(&fragments, PoseKind::Canonical);
        let p = Point3::new(1.0, 1.0, 0.5);
        assert_eq!(resolver.resolve(&p, 0, 0.5), Some(2));
        assert_eq!(resolver.neighbors_within(&p, 0, 0.5), vec![1, 2]);
    }

    #[test]
    fn exact_tie_goes_to_lower_index() {
        let fragments = [
            cube_at("a", 0.0, 0.0),
            cube_at("b", 1.5, 0.0),
            cube_at("c", -1.5, 0.0),
        ];
        let resolver = NeighborResolver::build(&fragments, PoseKind::Canonical);
        // Exactly 1.0 from b's -X face and from c's +X face.
        let p = Point3::new(0.5, 0.5, 0.5);
        assert_eq!(resolver.nearest(&p, 0).unwrap().fragment, 1);
        assert_eq!(resolver.resolve(&p, 0, 2.0), Some(1));
    }

    #[test]
    fn threshold_is_strict() {
        let fragments = [cube_at("a", 0.0, 0.0), cube_at("b", 1.5, 0.0)];
        let resolver = NeighborResolver::build(&fragments, PoseKind::Canonical);
        let p = Point3::new(1.0, 0.5, 0.5);
        assert_eq!(resolver.resolve(&p, 0, 0.5), None);
        assert_eq!(resolver.resolve(&p, 0, 0.500_001), Some(1));
        assert!(resolver.neighbors_within(&p, 0, 0.5).is_empty());
    }

    #[test]
    fn uses_requested_pose() {
        let fragments = [
            cube_at("a", 0.0, 0.0),
            cube_at("b", 1.0, 0.0).with_current_translation(50.0, 0.0, 0.0),
        ];
        let canonical = NeighborResolver::build(&fragments, PoseKind::Canonical);
        let current = NeighborResolver::build(&fragments, PoseKind::Current);
        let p = Point3::new(1.0, 0.5, 0.5);

        assert_eq!(canonical.pose(), PoseKind::Canonical);
        assert_eq!(canonical.resolve(&p, 0, 0.001), Some(1));
        assert_eq!(current.resolve(&p, 0, 0.001), None);
    }

    #[test]
    fn single_fragment_has_no_neighbors() {
        let fragments = [cube_at("a", 0.0, 0.0)];
        let resolver = NeighborResolver::build(&fragments, PoseKind::Canonical);
        assert_eq!(resolver.len(), 1);
        assert!(resolver.nearest(&Point3::origin(), 0).is_none());
    }
}
