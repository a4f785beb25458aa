//! Bounding volume hierarchy for closest-point queries on a posed surface.

use rayon::prelude::*;
use shard_types::{Aabb, Fragment, Isometry3, Point3, PoseKind, ShardMesh, Triangle};
use smallvec::SmallVec;

/// Default maximum number of triangles per leaf.
pub const DEFAULT_MAX_LEAF_SIZE: usize = 8;

/// Subtrees larger than this are built with `rayon::join`.
const PARALLEL_THRESHOLD: usize = 4096;

/// A fan triangle in world space with a back-reference to its polygon face.
#[derive(Debug, Clone, Copy)]
struct PosedTriangle {
    triangle: Triangle,
    face: u32,
    bbox: Aabb,
}

#[derive(Debug)]
enum Node {
    Leaf {
        bbox: Aabb,
        triangles: SmallVec<[u32; 8]>,
    },
    Internal {
        bbox: Aabb,
        left: Box<Node>,
        right: Box<Node>,
    },
}

impl Node {
    fn bbox(&self) -> &Aabb {
        match self {
            Self::Leaf { bbox, .. } | Self::Internal { bbox, .. } => bbox,
        }
    }
}

/// Result of a closest-point query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceHit {
    /// Closest point on the surface, in world space.
    pub point: Point3<f64>,
    /// Index of the polygon face containing the closest point.
    pub face: usize,
    /// Distance from the query point.
    pub distance: f64,
}

/// Closest-point index over one fragment's surface at a fixed pose.
///
/// Built once and then only read; building is the expensive step, queries
/// are logarithmic in the triangle count for well-distributed meshes.
///
/// # Example
///
/// ```
/// use shard_spatial::SurfaceIndex;
/// use shard_types::{Fragment, PoseKind, Point3, ShardMesh};
///
/// let mesh = ShardMesh::cuboid(Point3::origin(), Point3::new(1.0, 1.0, 1.0));
/// let fragment = Fragment::new("a", mesh).with_current_translation(10.0, 0.0, 0.0);
/// let index = SurfaceIndex::build(&fragment, PoseKind::Current, 8);
///
/// let hit = index.closest_point(&Point3::new(13.0, 0.5, 0.5)).unwrap();
/// assert_eq!(hit.face, 5);
/// assert!((hit.distance - 2.0).abs() < 1e-12);
/// ```
#[derive(Debug)]
pub struct SurfaceIndex {
    triangles: Vec<PosedTriangle>,
    root: Option<Node>,
}

impl SurfaceIndex {
    /// Index a fragment's surface at the requested pose.
    #[must_use]
    pub fn build(fragment: &Fragment, pose: PoseKind, max_leaf_size: usize) -> Self {
        Self::build_posed(fragment.mesh(), fragment.pose(pose), max_leaf_size)
    }

    /// Index a mesh transformed by an explicit isometry.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn build_posed(mesh: &ShardMesh, pose: &Isometry3<f64>, max_leaf_size: usize) -> Self {
        let triangles: Vec<PosedTriangle> = (0..mesh.face_count())
            .flat_map(|face| {
                mesh.face_triangles_posed(face, pose).map(move |triangle| {
                    let mut bbox = Aabb::empty();
                    bbox.expand_to_include(&triangle.v0);
                    bbox.expand_to_include(&triangle.v1);
                    bbox.expand_to_include(&triangle.v2);
                    PosedTriangle {
                        triangle,
                        face: face as u32,
                        bbox,
                    }
                })
            })
            .collect();

        if triangles.is_empty() {
            return Self {
                triangles,
                root: None,
            };
        }

        let indices: Vec<u32> = (0..triangles.len() as u32).collect();
        let max_leaf = max_leaf_size.max(1);
        let root = build_recursive(&triangles, indices, max_leaf);

        Self {
            triangles,
            root: Some(root),
        }
    }

    /// Number of indexed (fan) triangles.
    #[must_use]
    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    /// Check if the index holds no triangles.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// World-space bounds of the indexed surface, if any.
    #[must_use]
    pub fn bounds(&self) -> Option<&Aabb> {
        self.root.as_ref().map(Node::bbox)
    }

    /// Closest point on the surface to `point`.
    ///
    /// Returns `None` only for an empty index. When two faces are exactly
    /// equidistant the lower face index wins.
    #[must_use]
    pub fn closest_point(&self, point: &Point3<f64>) -> Option<SurfaceHit> {
        self.closest_point_within(point, f64::INFINITY)
    }

    /// Closest point on the surface, searching only up to `max_distance`.
    ///
    /// Subtrees farther than `max_distance` are never visited, which makes
    /// thresholded queries against distant fragments nearly free.
    #[must_use]
    pub fn closest_point_within(
        &self,
        point: &Point3<f64>,
        max_distance: f64,
    ) -> Option<SurfaceHit> {
        let root = self.root.as_ref()?;
        let mut best = Best {
            distance_squared: max_distance * max_distance,
            hit: None,
        };
        self.nearest_recursive(root, point, &mut best);
        best.hit.map(|(point_on_surface, face)| SurfaceHit {
            point: point_on_surface,
            face: face as usize,
            distance: best.distance_squared.sqrt(),
        })
    }

    fn nearest_recursive(&self, node: &Node, point: &Point3<f64>, best: &mut Best) {
        if node.bbox().distance_squared_to(point) > best.distance_squared {
            return;
        }
        match node {
            Node::Leaf { triangles, .. } => {
                for &t in triangles {
                    let posed = &self.triangles[t as usize];
                    if posed.bbox.distance_squared_to(point) > best.distance_squared {
                        continue;
                    }
                    let closest = posed.triangle.closest_point(point);
                    let d2 = (point - closest).norm_squared();
                    best.offer(d2, closest, posed.face);
                }
            }
            Node::Internal { left, right, .. } => {
                let dl = left.bbox().distance_squared_to(point);
                let dr = right.bbox().distance_squared_to(point);
                if dl <= dr {
                    self.nearest_recursive(left, point, best);
                    self.nearest_recursive(right, point, best);
                } else {
                    self.nearest_recursive(right, point, best);
                    self.nearest_recursive(left, point, best);
                }
            }
        }
    }

    /// Get statistics about the hierarchy.
    #[must_use]
    pub fn stats(&self) -> IndexStats {
        let mut stats = IndexStats::default();
        if let Some(ref root) = self.root {
            collect_stats(root, 0, &mut stats);
        }
        stats
    }
}

struct Best {
    distance_squared: f64,
    hit: Option<(Point3<f64>, u32)>,
}

impl Best {
    fn offer(&mut self, d2: f64, point: Point3<f64>, face: u32) {
        let better = match self.hit {
            None => d2 <= self.distance_squared,
            Some((_, best_face)) => {
                d2 < self.distance_squared
                    || (d2 <= self.distance_squared && face < best_face)
            }
        };
        if better {
            self.distance_squared = d2;
            self.hit = Some((point, face));
        }
    }
}

fn build_recursive(
    triangles: &[PosedTriangle],
    mut indices: Vec<u32>,
    max_leaf_size: usize,
) -> Node {
    let mut bbox = Aabb::empty();
    for &i in &indices {
        bbox.merge(&triangles[i as usize].bbox);
    }

    if indices.len() <= max_leaf_size {
        return Node::Leaf {
            bbox,
            triangles: indices.into_iter().collect(),
        };
    }

    // Median split on the longest axis of the node bounds.
    let axis = bbox.longest_axis();
    indices.sort_by(|&a, &b| {
        let ca = triangles[a as usize].bbox.center()[axis];
        let cb = triangles[b as usize].bbox.center()[axis];
        ca.total_cmp(&cb)
    });
    let right_indices = indices.split_off(indices.len() / 2);
    let left_indices = indices;

    let (left, right) = if left_indices.len() + right_indices.len() >= PARALLEL_THRESHOLD {
        rayon::join(
            || build_recursive(triangles, left_indices, max_leaf_size),
            || build_recursive(triangles, right_indices, max_leaf_size),
        )
    } else {
        (
            build_recursive(triangles, left_indices, max_leaf_size),
            build_recursive(triangles, right_indices, max_leaf_size),
        )
    };

    Node::Internal {
        bbox,
        left: Box::new(left),
        right: Box::new(right),
    }
}

fn collect_stats(node: &Node, depth: usize, stats: &mut IndexStats) {
    stats.max_depth = stats.max_depth.max(depth);
    match node {
        Node::Leaf { triangles, .. } => {
            stats.leaf_count += 1;
            stats.total_triangles_in_leaves += triangles.len();
            stats.max_leaf_size = stats.max_leaf_size.max(triangles.len());
        }
        Node::Internal { left, right, .. } => {
            stats.internal_count += 1;
            collect_stats(left, depth + 1, stats);
            collect_stats(right, depth + 1, stats);
        }
    }
}

/// Statistics about the hierarchy structure.
#[derive(Debug, Default, Clone)]
pub struct IndexStats {
    /// Number of internal (branch) nodes.
    pub internal_count: usize,
    /// Number of leaf nodes.
    pub leaf_count: usize,
    /// Maximum depth of the tree.
    pub max_depth: usize,
    /// Maximum number of triangles in any leaf.
    pub max_leaf_size: usize,
    /// Total triangles stored across all leaves.
    pub total_triangles_in_leaves: usize,
}

/// Build one index per fragment in parallel.
pub(crate) fn build_all(
    fragments: &[Fragment],
    pose: PoseKind,
    max_leaf_size: usize,
) -> Vec<SurfaceIndex> {
    fragments
        .par_iter()
        .map(|fragment| SurfaceIndex::build(fragment, pose, max_leaf_size))
        .collect()
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::float_cmp,
    clippy::cast_precision_loss
)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn grid_mesh(n: u32) -> ShardMesh {
        // n x n unit quads in the z = 0 plane.
        let mut vertices = Vec::new();
        for j in 0..=n {
            for i in 0..=n {
                vertices.push(Point3::new(f64::from(i), f64::from(j), 0.0));
            }
        }
        let row = n + 1;
        let mut quads = Vec::new();
        for j in 0..n {
            for i in 0..n {
                let a = j * row + i;
                quads.push([a, a + 1, a + row + 1, a + row]);
            }
        }
        ShardMesh::from_polygons(vertices, quads).unwrap()
    }

    fn brute_force(mesh: &ShardMesh, p: &Point3<f64>) -> f64 {
        (0..mesh.face_count())
            .flat_map(|f| mesh.face_triangles(f))
            .map(|t| t.distance_squared_to(p))
            .fold(f64::INFINITY, f64::min)
            .sqrt()
    }

    #[test]
    fn empty_mesh_has_no_hits() {
        let index = SurfaceIndex::build_posed(&ShardMesh::new(), &Isometry3::identity(), 8);
        assert!(index.is_empty());
        assert!(index.closest_point(&Point3::origin()).is_none());
        assert!(index.bounds().is_none());
    }

    #[test]
    fn matches_brute_force() {
        let mesh = grid_mesh(12);
        let index = SurfaceIndex::build_posed(&mesh, &Isometry3::identity(), 4);
        assert_eq!(index.triangle_count(), 12 * 12 * 2);

        for k in 0..50 {
            let t = f64::from(k);
            let p = Point3::new(
                (t * 0.37) % 14.0 - 1.0,
                (t * 0.53) % 14.0 - 1.0,
                (t * 0.11) % 3.0 - 1.5,
            );
            let hit = index.closest_point(&p).unwrap();
            assert_relative_eq!(hit.distance, brute_force(&mesh, &p), epsilon = 1e-9);
        }
    }

    #[test]
    fn reports_polygon_face_not_fan_triangle() {
        let mesh = grid_mesh(3);
        let index = SurfaceIndex::build_posed(&mesh, &Isometry3::identity(), 2);
        // Quad (1, 2) covers [1,2]x[2,3]; it is face 2 * 3 + 1.
        let hit = index.closest_point(&Point3::new(1.25, 2.75, 0.5)).unwrap();
        assert_eq!(hit.face, 7);
        assert_relative_eq!(hit.distance, 0.5, epsilon = 1e-12);
    }

    #[test]
    fn equidistant_prefers_lower_face() {
        let mesh = grid_mesh(2);
        let index = SurfaceIndex::build_posed(&mesh, &Isometry3::identity(), 1);
        // Shared corner of all four quads.
        let hit = index.closest_point(&Point3::new(1.0, 1.0, 1.0)).unwrap();
        assert_eq!(hit.face, 0);
    }

    #[test]
    fn respects_pose() {
        let mesh = ShardMesh::cuboid(Point3::origin(), Point3::new(1.0, 1.0, 1.0));
        let pose = Isometry3::translation(0.0, 0.0, 5.0);
        let index = SurfaceIndex::build_posed(&mesh, &pose, 8);
        let hit = index.closest_point(&Point3::new(0.5, 0.5, 0.0)).unwrap();
        assert_eq!(hit.face, 0);
        assert_relative_eq!(hit.distance, 5.0, epsilon = 1e-12);
        assert_relative_eq!(hit.point.z, 5.0, epsilon = 1e-12);
    }

    #[test]
    fn bounded_search_misses_far_surface() {
        let mesh = ShardMesh::cuboid(Point3::origin(), Point3::new(1.0, 1.0, 1.0));
        let index = SurfaceIndex::build_posed(&mesh, &Isometry3::identity(), 8);
        let p = Point3::new(3.0, 0.5, 0.5);
        assert!(index.closest_point_within(&p, 1.0).is_none());
        assert_eq!(index.closest_point_within(&p, 2.5).unwrap().face, 5);
    }

    #[test]
    fn stats_respect_leaf_size() {
        let mesh = grid_mesh(8);
        let index = SurfaceIndex::build_posed(&mesh, &Isometry3::identity(), 4);
        let stats = index.stats();
        assert!(stats.max_leaf_size <= 4);
        assert_eq!(stats.total_triangles_in_leaves, index.triangle_count());
        assert_eq!(stats.leaf_count, stats.internal_count + 1);
    }
}
