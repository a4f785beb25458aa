//! Polygon mesh with cached face normals.

use crate::{Aabb, ShardError, ShardResult, Triangle};
use nalgebra::{Isometry3, Point3, Vector3};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// A polygon face: three or more vertex indices plus a cached unit normal.
///
/// Indices are ordered counter-clockwise when viewed from outside. The
/// normal is computed once at insertion and is the zero vector for
/// degenerate (zero-area) polygons.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Face {
    /// Vertex indices, at least three.
    pub indices: SmallVec<[u32; 4]>,
    /// Unit normal in the mesh's local frame.
    pub normal: Vector3<f64>,
}

impl Face {
    /// Number of vertices on the face.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    /// Always `false` for faces built through [`ShardMesh`].
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Undirected edges of the face as `(low, high)` vertex index pairs.
    pub fn edges(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        let n = self.indices.len();
        (0..n).map(move |i| {
            let a = self.indices[i];
            let b = self.indices[(i + 1) % n];
            if a < b { (a, b) } else { (b, a) }
        })
    }
}

/// A polygon mesh in a fragment's local frame.
///
/// Faces may be triangles, quads or larger convex polygons. Queries that
/// need triangles (closest point, sampling) fan-triangulate each polygon
/// around its first vertex.
///
/// # Example
///
/// ```
/// use shard_types::{ShardMesh, Point3};
///
/// let vertices = vec![
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(1.0, 0.0, 0.0),
///     Point3::new(1.0, 1.0, 0.0),
///     Point3::new(0.0, 1.0, 0.0),
/// ];
/// let mesh = ShardMesh::from_polygons(vertices, [[0u32, 1, 2, 3]]).unwrap();
///
/// assert_eq!(mesh.face_count(), 1);
/// assert!((mesh.face_area(0) - 1.0).abs() < 1e-12);
/// assert!((mesh.faces[0].normal.z - 1.0).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(try_from = "RawMesh")]
pub struct ShardMesh {
    /// Vertex positions.
    pub vertices: Vec<Point3<f64>>,
    /// Polygon faces.
    pub faces: Vec<Face>,
}

/// Wire form of a mesh. Face normals are recomputed on load.
#[derive(Deserialize)]
struct RawMesh {
    vertices: Vec<Point3<f64>>,
    faces: Vec<RawFace>,
}

#[derive(Deserialize)]
struct RawFace {
    indices: SmallVec<[u32; 4]>,
}

impl TryFrom<RawMesh> for ShardMesh {
    type Error = ShardError;

    fn try_from(raw: RawMesh) -> ShardResult<Self> {
        Self::from_polygons(raw.vertices, raw.faces.iter().map(|f| f.indices.as_slice()))
    }
}

impl ShardMesh {
    /// Create an empty mesh.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self {
            vertices: Vec::new(),
            faces: Vec::new(),
        }
    }

    /// Build a mesh from vertex positions and polygon index lists.
    ///
    /// # Errors
    ///
    /// Returns [`ShardError::DegenerateFace`] for a polygon with fewer than
    /// three indices and [`ShardError::InvalidVertexIndex`] for an index
    /// outside `vertices`.
    pub fn from_polygons<I, P>(vertices: Vec<Point3<f64>>, polygons: I) -> ShardResult<Self>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<[u32]>,
    {
        let mut mesh = Self {
            vertices,
            faces: Vec::new(),
        };
        for polygon in polygons {
            mesh.push_face(polygon.as_ref())?;
        }
        Ok(mesh)
    }

    /// Append a polygon face, computing its normal. Returns the face index.
    ///
    /// # Errors
    ///
    /// Same conditions as [`ShardMesh::from_polygons`].
    pub fn push_face(&mut self, indices: &[u32]) -> ShardResult<usize> {
        let face = self.faces.len();
        if indices.len() < 3 {
            return Err(ShardError::DegenerateFace {
                face,
                vertex_count: indices.len(),
            });
        }
        if let Some(&index) = indices
            .iter()
            .find(|&&i| i as usize >= self.vertices.len())
        {
            return Err(ShardError::InvalidVertexIndex {
                face,
                index,
                vertex_count: self.vertices.len(),
            });
        }

        let area_vector = self.area_vector(indices);
        let len = area_vector.norm();
        let normal = if len > f64::EPSILON * f64::EPSILON {
            area_vector / len
        } else {
            Vector3::zeros()
        };

        self.faces.push(Face {
            indices: SmallVec::from_slice(indices),
            normal,
        });
        Ok(face)
    }

    /// Number of vertices.
    #[inline]
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Number of faces.
    #[inline]
    #[must_use]
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Check if the mesh has no faces.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }

    /// Vertex mean of a face in the local frame.
    ///
    /// # Panics
    ///
    /// Panics if `face` is out of bounds.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn face_center(&self, face: usize) -> Point3<f64> {
        let indices = &self.faces[face].indices;
        let sum = indices
            .iter()
            .fold(Vector3::zeros(), |acc, &i| acc + self.vertices[i as usize].coords);
        Point3::from(sum / indices.len() as f64)
    }

    /// Polygon area (sum of its fan triangles).
    ///
    /// # Panics
    ///
    /// Panics if `face` is out of bounds.
    #[must_use]
    pub fn face_area(&self, face: usize) -> f64 {
        self.face_triangles(face).map(|tri| tri.area()).sum()
    }

    /// Fan triangles of a face in the local frame.
    ///
    /// # Panics
    ///
    /// Panics if `face` is out of bounds.
    pub fn face_triangles(&self, face: usize) -> impl Iterator<Item = Triangle> + '_ {
        let indices = &self.faces[face].indices;
        let v0 = self.vertices[indices[0] as usize];
        indices.windows(2).skip(1).map(move |pair| {
            Triangle::new(
                v0,
                self.vertices[pair[0] as usize],
                self.vertices[pair[1] as usize],
            )
        })
    }

    /// Fan triangles of a face transformed by `pose`.
    ///
    /// # Panics
    ///
    /// Panics if `face` is out of bounds.
    pub fn face_triangles_posed<'a>(
        &'a self,
        face: usize,
        pose: &'a Isometry3<f64>,
    ) -> impl Iterator<Item = Triangle> + 'a {
        self.face_triangles(face).map(move |tri| {
            Triangle::new(pose * tri.v0, pose * tri.v1, pose * tri.v2)
        })
    }

    /// Total surface area.
    #[must_use]
    pub fn surface_area(&self) -> f64 {
        (0..self.faces.len()).map(|f| self.face_area(f)).sum()
    }

    /// Bounding box in the local frame.
    #[must_use]
    pub fn bounds(&self) -> Aabb {
        Aabb::from_points(self.vertices.iter())
    }

    /// Bounding box after transforming every vertex by `pose`.
    #[must_use]
    pub fn bounds_posed(&self, pose: &Isometry3<f64>) -> Aabb {
        let mut aabb = Aabb::empty();
        for v in &self.vertices {
            aabb.expand_to_include(&(pose * v));
        }
        aabb
    }

    /// Split every polygon into its fan triangles.
    ///
    /// Returns the triangle mesh together with, for each new face, the index
    /// of the polygon it came from.
    #[must_use]
    pub fn triangulated(&self) -> (Self, Vec<usize>) {
        let mut faces = Vec::new();
        let mut origin = Vec::new();
        for (f, face) in self.faces.iter().enumerate() {
            let first = face.indices[0];
            for pair in face.indices.windows(2).skip(1) {
                faces.push(Face {
                    indices: SmallVec::from_slice(&[first, pair[0], pair[1]]),
                    normal: face.normal,
                });
                origin.push(f);
            }
        }
        (
            Self {
                vertices: self.vertices.clone(),
                faces,
            },
            origin,
        )
    }

    /// Axis-aligned box with one quad per side.
    ///
    /// Face order is -Z, +Z, -Y, +Y, -X, +X; normals point outward.
    #[must_use]
    pub fn cuboid(min: Point3<f64>, max: Point3<f64>) -> Self {
        let vertices = vec![
            Point3::new(min.x, min.y, min.z),
            Point3::new(max.x, min.y, min.z),
            Point3::new(max.x, max.y, min.z),
            Point3::new(min.x, max.y, min.z),
            Point3::new(min.x, min.y, max.z),
            Point3::new(max.x, min.y, max.z),
            Point3::new(max.x, max.y, max.z),
            Point3::new(min.x, max.y, max.z),
        ];
        let quads: [[u32; 4]; 6] = [
            [0, 3, 2, 1],
            [4, 5, 6, 7],
            [0, 1, 5, 4],
            [3, 7, 6, 2],
            [0, 4, 7, 3],
            [1, 2, 6, 5],
        ];
        let mut mesh = Self {
            vertices,
            faces: Vec::with_capacity(6),
        };
        for quad in quads {
            let area_vector = mesh.area_vector(&quad);
            let len = area_vector.norm();
            mesh.faces.push(Face {
                indices: SmallVec::from_slice(&quad),
                normal: if len > 0.0 { area_vector / len } else { Vector3::zeros() },
            });
        }
        mesh
    }

    /// Twice the polygon's vector area, summed over its fan triangles.
    fn area_vector(&self, indices: &[u32]) -> Vector3<f64> {
        let v0 = self.vertices[indices[0] as usize];
        indices.windows(2).skip(1).fold(Vector3::zeros(), |acc, pair| {
            let a = self.vertices[pair[0] as usize] - v0;
            let b = self.vertices[pair[1] as usize] - v0;
            acc + a.cross(&b)
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn cuboid_normals_point_outward() {
        let mesh = ShardMesh::cuboid(Point3::origin(), Point3::new(2.0, 3.0, 4.0));
        let expected = [
            Vector3::new(0.0, 0.0, -1.0),
            Vector3::new(0.0, 0.0, 1.0),
            Vector3::new(0.0, -1.0, 0.0),
            Vector3::new(0.0, 1.0, 0.0),
            Vector3::new(-1.0, 0.0, 0.0),
            Vector3::new(1.0, 0.0, 0.0),
        ];
        for (face, normal) in mesh.faces.iter().zip(expected) {
            assert_relative_eq!(face.normal, normal, epsilon = 1e-12);
        }
        assert_relative_eq!(mesh.surface_area(), 2.0 * (6.0 + 8.0 + 12.0), epsilon = 1e-12);
    }

    #[test]
    fn cuboid_face_centers() {
        let mesh = ShardMesh::cuboid(Point3::origin(), Point3::new(1.0, 1.0, 1.0));
        let c = mesh.face_center(5);
        assert_relative_eq!(c.x, 1.0);
        assert_relative_eq!(c.y, 0.5);
        assert_relative_eq!(c.z, 0.5);
    }

    #[test]
    fn rejects_short_polygon() {
        let vertices = vec![Point3::origin(), Point3::new(1.0, 0.0, 0.0)];
        let err = ShardMesh::from_polygons(vertices, [[0u32, 1]]).unwrap_err();
        assert!(matches!(
            err,
            ShardError::DegenerateFace {
                face: 0,
                vertex_count: 2
            }
        ));
    }

    #[test]
    fn rejects_out_of_range_index() {
        let vertices = vec![
            Point3::origin(),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ];
        let err = ShardMesh::from_polygons(vertices, [[0u32, 1, 7]]).unwrap_err();
        assert!(matches!(err, ShardError::InvalidVertexIndex { index: 7, .. }));
    }

    #[test]
    fn degenerate_polygon_has_zero_normal() {
        let vertices = vec![
            Point3::origin(),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
        ];
        let mesh = ShardMesh::from_polygons(vertices, [[0u32, 1, 2]]).unwrap();
        assert_eq!(mesh.faces[0].normal, Vector3::zeros());
        assert_relative_eq!(mesh.face_area(0), 0.0);
    }

    #[test]
    fn pentagon_fan_area() {
        // Unit square with an extra vertex on the bottom edge.
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(0.5, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ];
        let mesh = ShardMesh::from_polygons(vertices, [[0u32, 1, 2, 3, 4]]).unwrap();
        assert_eq!(mesh.face_triangles(0).count(), 3);
        assert_relative_eq!(mesh.face_area(0), 1.0, epsilon = 1e-12);
        assert_relative_eq!(mesh.faces[0].normal.z, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn triangulated_keeps_origin() {
        let mesh = ShardMesh::cuboid(Point3::origin(), Point3::new(1.0, 1.0, 1.0));
        let (tris, origin) = mesh.triangulated();
        assert_eq!(tris.face_count(), 12);
        assert_eq!(origin, vec![0, 0, 1, 1, 2, 2, 3, 3, 4, 4, 5, 5]);
        assert_relative_eq!(tris.surface_area(), 6.0, epsilon = 1e-12);
        assert_eq!(tris.faces[11].normal, mesh.faces[5].normal);
    }

    #[test]
    fn face_edges_are_normalized() {
        let mesh = ShardMesh::cuboid(Point3::origin(), Point3::new(1.0, 1.0, 1.0));
        let edges: Vec<_> = mesh.faces[0].edges().collect();
        assert_eq!(edges, vec![(0, 3), (2, 3), (1, 2), (0, 1)]);
    }

    #[test]
    fn deserialize_recomputes_normals() {
        let mesh = ShardMesh::cuboid(Point3::origin(), Point3::new(1.0, 2.0, 3.0));
        let mut value = serde_json::to_value(&mesh).unwrap();
        value["faces"][5]["normal"] = serde_json::json!([0.0, 0.0, 0.0]);

        let loaded: ShardMesh = serde_json::from_value(value).unwrap();
        assert_eq!(loaded.face_count(), 6);
        assert_relative_eq!(loaded.faces[5].normal, Vector3::x(), epsilon = 1e-12);
        assert_relative_eq!(loaded.surface_area(), mesh.surface_area(), epsilon = 1e-12);
    }

    #[test]
    fn deserialize_rejects_out_of_range_index() {
        let mesh = ShardMesh::cuboid(Point3::origin(), Point3::new(1.0, 1.0, 1.0));
        let mut value = serde_json::to_value(&mesh).unwrap();
        value["faces"][0]["indices"] = serde_json::json!([0, 1, 99]);

        let err = serde_json::from_value::<ShardMesh>(value).unwrap_err();
        assert!(err.to_string().contains("references vertex 99"));
    }

    #[test]
    fn deserialize_rejects_short_face() {
        let json = r#"{"vertices":[[0,0,0],[1,0,0]],"faces":[{"indices":[0,1]}]}"#;
        let err = serde_json::from_str::<ShardMesh>(json).unwrap_err();
        assert!(err.to_string().contains("at least 3"));
    }

    #[test]
    fn posed_bounds() {
        let mesh = ShardMesh::cuboid(Point3::origin(), Point3::new(1.0, 1.0, 1.0));
        let pose = Isometry3::translation(3.0, 0.0, -1.0);
        let b = mesh.bounds_posed(&pose);
        assert_relative_eq!(b.min.x, 3.0);
        assert_relative_eq!(b.max.z, 0.0);
    }
}
