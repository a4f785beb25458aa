//! Area-weighted selection of surface triangles.

use rand::Rng;
use shard_types::{Point3, ShardMesh, Triangle};

/// Cumulative area table over a mesh's fan triangles.
///
/// Zero-area triangles get no entry, so a fully degenerate face can never
/// be selected. Because every fan triangle remembers its face, the chance
/// of landing on a face is that face's share of the total area.
///
/// # Example
///
/// ```
/// use shard_sample::AreaDistribution;
/// use shard_types::{Point3, ShardMesh};
///
/// let mesh = ShardMesh::cuboid(Point3::origin(), Point3::new(2.0, 1.0, 1.0));
/// let dist = AreaDistribution::from_mesh(&mesh);
///
/// assert!((dist.total_area() - 10.0).abs() < 1e-12);
/// // The +Z face is 2 x 1.
/// assert!((dist.face_probability(1) - 0.2).abs() < 1e-12);
/// ```
#[derive(Debug, Clone)]
pub struct AreaDistribution {
    triangles: Vec<(usize, Triangle)>,
    cumulative: Vec<f64>,
}

impl AreaDistribution {
    /// Build the table in the mesh's local frame.
    #[must_use]
    pub fn from_mesh(mesh: &ShardMesh) -> Self {
        let mut triangles = Vec::new();
        let mut cumulative = Vec::new();
        let mut total = 0.0;

        for face in 0..mesh.face_count() {
            for triangle in mesh.face_triangles(face) {
                let area = triangle.area();
                if area > 0.0 {
                    total += area;
                    triangles.push((face, triangle));
                    cumulative.push(total);
                }
            }
        }

        Self {
            triangles,
            cumulative,
        }
    }

    /// Sum of all positive triangle areas.
    #[must_use]
    pub fn total_area(&self) -> f64 {
        self.cumulative.last().copied().unwrap_or(0.0)
    }

    /// Number of sampleable triangles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.triangles.len()
    }

    /// Check if nothing can be sampled.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    /// Triangle whose cumulative interval contains `value`.
    ///
    /// `value` is expected in `[0, total_area)`; values outside are clamped
    /// to the first or last triangle. Returns `None` only when the table is
    /// empty.
    #[must_use]
    pub fn locate(&self, value: f64) -> Option<(usize, &Triangle)> {
        let i = self.cumulative.partition_point(|&c| c <= value);
        let i = i.min(self.triangles.len().checked_sub(1)?);
        self.triangles.get(i).map(|(face, tri)| (*face, tri))
    }

    /// Share of the total area belonging to `face`.
    #[must_use]
    pub fn face_probability(&self, face: usize) -> f64 {
        let total = self.total_area();
        if total <= 0.0 {
            return 0.0;
        }
        let area: f64 = self
            .triangles
            .iter()
            .filter(|(f, _)| *f == face)
            .map(|(_, t)| t.area())
            .sum();
        area / total
    }

    /// Draw one face and a uniform point on it, in the local frame.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<(usize, Point3<f64>)> {
        let total = self.total_area();
        if total <= 0.0 {
            return None;
        }
        let (face, triangle) = self.locate(rng.gen_range(0.0..total))?;
        Some((face, sample_triangle(triangle, rng)))
    }
}

/// Uniform point on a triangle.
///
/// Two uniform variates in `[0, 1)` are used as barycentric weights; pairs
/// summing past 1 are reflected back into the triangle.
pub fn sample_triangle<R: Rng + ?Sized>(triangle: &Triangle, rng: &mut R) -> Point3<f64> {
    let mut u: f64 = rng.r#gen();
    let mut v: f64 = rng.r#gen();
    if u + v > 1.0 {
        u = 1.0 - u;
        v = 1.0 - v;
    }
    triangle.point_at(u, v)
}
