//! Fragments: named rigid mesh pieces with a canonical and a current pose.

use crate::{Aabb, ShardMesh};
use nalgebra::{Isometry3, Point3};
use serde::{Deserialize, Serialize};

/// Selects which of a fragment's two rigid transforms to apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PoseKind {
    /// Pose at which the pieces still touch; used for adjacency reconstruction.
    Canonical,
    /// Arbitrary pose used for exported samples.
    Current,
}

/// One rigid piece of a fractured object.
///
/// The mesh is stored in the fragment's local frame. The per-face interior
/// flags mark faces created by the break; a fragment without flags is
/// skipped by facet segmentation.
///
/// # Example
///
/// ```
/// use shard_types::{Fragment, PoseKind, ShardMesh, Point3};
///
/// let mesh = ShardMesh::cuboid(Point3::origin(), Point3::new(1.0, 1.0, 1.0));
/// let fragment = Fragment::new("vase_cell.003", mesh)
///     .with_canonical_translation(0.0, 2.0, 0.0);
///
/// assert_eq!(fragment.name(), "vase_cell.003");
/// assert!(fragment.interior().is_none());
/// let bounds = fragment.world_bounds(PoseKind::Canonical);
/// assert!((bounds.min.y - 2.0).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Fragment {
    name: String,
    mesh: ShardMesh,
    interior: Option<Vec<bool>>,
    canonical: Isometry3<f64>,
    current: Isometry3<f64>,
}

impl Fragment {
    /// Create a fragment with identity poses and no interior attribute.
    #[must_use]
    pub fn new(name: impl Into<String>, mesh: ShardMesh) -> Self {
        Self {
            name: name.into(),
            mesh,
            interior: None,
            canonical: Isometry3::identity(),
            current: Isometry3::identity(),
        }
    }

    /// Attach per-face interior flags (one per face, in face order).
    #[must_use]
    pub fn with_interior(mut self, interior: Vec<bool>) -> Self {
        self.interior = Some(interior);
        self
    }

    /// Set the canonical pose.
    #[must_use]
    pub fn with_canonical_pose(mut self, pose: Isometry3<f64>) -> Self {
        self.canonical = pose;
        self
    }

    /// Set the current pose.
    #[must_use]
    pub fn with_current_pose(mut self, pose: Isometry3<f64>) -> Self {
        self.current = pose;
        self
    }

    /// Set the canonical pose to a pure translation.
    #[must_use]
    pub fn with_canonical_translation(self, x: f64, y: f64, z: f64) -> Self {
        self.with_canonical_pose(Isometry3::translation(x, y, z))
    }

    /// Set the current pose to a pure translation.
    #[must_use]
    pub fn with_current_translation(self, x: f64, y: f64, z: f64) -> Self {
        self.with_current_pose(Isometry3::translation(x, y, z))
    }

    /// Fragment name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Rename the fragment.
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Mesh in the local frame.
    #[must_use]
    pub fn mesh(&self) -> &ShardMesh {
        &self.mesh
    }

    /// Per-face interior flags, if the attribute is present.
    #[must_use]
    pub fn interior(&self) -> Option<&[bool]> {
        self.interior.as_deref()
    }

    /// Rigid transform for the requested pose.
    #[must_use]
    pub fn pose(&self, kind: PoseKind) -> &Isometry3<f64> {
        match kind {
            PoseKind::Canonical => &self.canonical,
            PoseKind::Current => &self.current,
        }
    }

    /// Number of faces.
    #[must_use]
    pub fn face_count(&self) -> usize {
        self.mesh.face_count()
    }

    /// Vertex mean of a face, in world space at the requested pose.
    ///
    /// # Panics
    ///
    /// Panics if `face` is out of bounds.
    #[must_use]
    pub fn world_face_center(&self, face: usize, kind: PoseKind) -> Point3<f64> {
        self.pose(kind) * self.mesh.face_center(face)
    }

    /// World-space bounding box at the requested pose.
    #[must_use]
    pub fn world_bounds(&self, kind: PoseKind) -> Aabb {
        self.mesh.bounds_posed(self.pose(kind))
    }
}

/// Diagonal of the union of all fragments' canonical-pose bounds.
///
/// This is the characteristic size used to scale distance thresholds.
/// Returns 0 for an empty slice.
#[must_use]
pub fn characteristic_size(fragments: &[Fragment]) -> f64 {
    let mut bounds = Aabb::empty();
    for fragment in fragments {
        bounds.merge(&fragment.world_bounds(PoseKind::Canonical));
    }
    bounds.diagonal()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::{Translation3, UnitQuaternion, Vector3};
    use std::f64::consts::FRAC_PI_2;

    fn unit_box(name: &str) -> Fragment {
        Fragment::new(
            name,
            ShardMesh::cuboid(Point3::origin(), Point3::new(1.0, 1.0, 1.0)),
        )
    }

    #[test]
    fn poses_are_independent() {
        let f = unit_box("a")
            .with_canonical_translation(1.0, 0.0, 0.0)
            .with_current_translation(0.0, 0.0, 10.0);

        let canonical = f.world_face_center(5, PoseKind::Canonical);
        let current = f.world_face_center(5, PoseKind::Current);
        assert_relative_eq!(canonical.x, 2.0);
        assert_relative_eq!(canonical.z, 0.5);
        assert_relative_eq!(current.x, 1.0);
        assert_relative_eq!(current.z, 10.5);
    }

    #[test]
    fn rotated_current_pose() {
        let rotation = UnitQuaternion::from_axis_angle(&Vector3::z_axis(), FRAC_PI_2);
        let f = unit_box("a").with_current_pose(Isometry3::from_parts(
            Translation3::identity(),
            rotation,
        ));
        // +X face center (1, 0.5, 0.5) rotates to (-0.5, 1, 0.5).
        let c = f.world_face_center(5, PoseKind::Current);
        assert_relative_eq!(c.x, -0.5, epsilon = 1e-12);
        assert_relative_eq!(c.y, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn characteristic_size_spans_all_fragments() {
        let fragments = vec![
            unit_box("a"),
            unit_box("b").with_canonical_translation(1.0, 0.0, 0.0),
        ];
        // Union is [0,2]x[0,1]x[0,1].
        assert_relative_eq!(characteristic_size(&fragments), 6.0_f64.sqrt());
        assert_relative_eq!(characteristic_size(&[]), 0.0);
    }

    #[test]
    fn deserialized_fragment_with_bad_face_is_rejected() {
        let mut value = serde_json::to_value(unit_box("b")).unwrap();
        value["mesh"]["faces"][0]["indices"] = serde_json::json!([0, 1, 99]);
        assert!(serde_json::from_value::<Fragment>(value).is_err());
    }

    #[test]
    fn deserialized_fragment_round_trips() {
        let f = unit_box("a").with_current_translation(2.0, 0.0, 0.0);
        let loaded: Fragment = serde_json::from_value(serde_json::to_value(&f).unwrap()).unwrap();
        assert_eq!(loaded.name(), "a");
        assert_eq!(loaded.face_count(), 6);
        assert_relative_eq!(loaded.world_face_center(5, PoseKind::Current).x, 3.0);
    }

    #[test]
    fn rename() {
        let mut f = unit_box("pot_cell.001");
        f.set_name("Pot_001_cell.001");
        assert_eq!(f.name(), "Pot_001_cell.001");
    }
}
