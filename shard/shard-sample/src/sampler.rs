//! Labeled point clouds at the current pose.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use shard_facets::FacetMap;
use shard_spatial::{DEFAULT_MAX_LEAF_SIZE, SurfaceIndex};
use shard_types::{Diagnostic, FacetId, Fragment, PoseKind, UNASSIGNED_FACET};
use tracing::{debug, info, warn};

use crate::distribution::AreaDistribution;
use crate::error::{SampleError, SampleResult};
use crate::params::SampleParams;

/// One surface sample.
///
/// Serializes as `{ "pos": [x, y, z], "norm": [x, y, z], "label": n }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabeledPoint {
    /// World-space position at the current pose.
    pub pos: [f64; 3],
    /// World-space unit normal of the face the point was drawn from.
    pub norm: [f64; 3],
    /// Facet id of the nearest face, or 0 for outer surface.
    pub label: FacetId,
}

impl LabeledPoint {
    /// Check if the point lies on a facet.
    #[must_use]
    pub const fn is_labeled(&self) -> bool {
        self.label != UNASSIGNED_FACET
    }
}

/// Random generator for one fragment.
///
/// Seeded runs give every fragment its own stream derived from the base
/// seed and the fragment index.
#[must_use]
pub fn fragment_rng(seed: Option<u64>, fragment_index: usize) -> ChaCha8Rng {
    seed.map_or_else(ChaCha8Rng::from_entropy, |s| {
        ChaCha8Rng::seed_from_u64(s.wrapping_add(fragment_index as u64))
    })
}

/// Draw `params.points_per_fragment` labeled points on one fragment.
///
/// Faces are chosen in proportion to their area and points are uniform
/// within each face. Positions and normals are at the fragment's current
/// pose. The label is read from the face nearest to the sampled point
/// (same fragment, current pose) through `facets`.
///
/// # Errors
///
/// Returns [`SampleError::LabelTableMismatch`] if `facets` has no face
/// table of the right size for `fragment_index`, and
/// [`SampleError::NoSampleableSurface`] if every face has zero area.
pub fn sample_fragment(
    fragment_index: usize,
    fragment: &Fragment,
    facets: &FacetMap,
    params: &SampleParams,
) -> SampleResult<Vec<LabeledPoint>> {
    let table = facets.face_facets(fragment_index);
    if table.len() != fragment.face_count() {
        return Err(SampleError::LabelTableMismatch {
            fragment: fragment.name().to_string(),
            faces: fragment.face_count(),
            entries: table.len(),
        });
    }

    let distribution = AreaDistribution::from_mesh(fragment.mesh());
    if distribution.is_empty() {
        return Err(SampleError::NoSampleableSurface {
            fragment: fragment.name().to_string(),
        });
    }

    let pose = fragment.pose(PoseKind::Current);
    let index = SurfaceIndex::build(fragment, PoseKind::Current, DEFAULT_MAX_LEAF_SIZE);
    let mut rng = fragment_rng(params.seed, fragment_index);

    let mut points = Vec::with_capacity(params.points_per_fragment);
    for _ in 0..params.points_per_fragment {
        let Some((face, local)) = distribution.sample(&mut rng) else {
            break;
        };
        let pos = pose * local;
        let norm = pose.rotation * fragment.mesh().faces[face].normal;
        let label = index
            .closest_point(&pos)
            .map_or(UNASSIGNED_FACET, |hit| facets.facet_of_face(fragment_index, hit.face));

        points.push(LabeledPoint {
            pos: [pos.x, pos.y, pos.z],
            norm: [norm.x, norm.y, norm.z],
            label,
        });
    }

    debug!(
        fragment = fragment.name(),
        points = points.len(),
        labeled = points.iter().filter(|p| p.is_labeled()).count(),
        "sampled fragment"
    );
    Ok(points)
}

/// Sample every fragment in parallel.
///
/// Returns one point list per fragment, in fragment order. A fragment that
/// cannot be sampled gets an empty list; the reason is reported as a
/// diagnostic when it is one.
#[must_use]
pub fn sample_all(
    fragments: &[Fragment],
    facets: &FacetMap,
    params: &SampleParams,
) -> (Vec<Vec<LabeledPoint>>, Vec<Diagnostic>) {
    let results: Vec<(Vec<LabeledPoint>, Option<Diagnostic>)> = fragments
        .par_iter()
        .enumerate()
        .map(|(index, fragment)| match sample_fragment(index, fragment, facets, params) {
            Ok(points) => (points, None),
            Err(err) => {
                warn!(fragment = fragment.name(), %err, "fragment not sampled");
                (Vec::new(), err.to_diagnostic())
            }
        })
        .collect();

    let mut clouds = Vec::with_capacity(results.len());
    let mut diagnostics = Vec::new();
    for (points, diagnostic) in results {
        clouds.push(points);
        diagnostics.extend(diagnostic);
    }

    info!(
        fragments = fragments.len(),
        points = clouds.iter().map(Vec::len).sum::<usize>(),
        "sampled point clouds"
    );
    (clouds, diagnostics)
}
