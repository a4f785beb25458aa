//! Facet segmentation.
//!
//! A facet is a maximal set of candidate faces that is connected through
//! shared edges and carries one resolved neighbor label. Faces whose label
//! stayed `None` still form facets of their own; they simply never match.

use std::collections::VecDeque;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use shard_spatial::NeighborResolver;
use shard_types::{Diagnostic, Fragment, NeighborLabel, Point3, ShardMesh, Vector3};
use tracing::{debug, warn};

use crate::adjacency::FaceAdjacency;
use crate::classify::candidate_faces;
use crate::error::FacetResult;
use crate::facet::FacetMap;
use crate::params::FacetParams;
use crate::propagate::{propagate_labels, resolve_raw_labels};

/// A facet of one fragment before global ids are assigned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocalFacet {
    /// Member faces, ascending.
    pub faces: Vec<usize>,
    /// Neighbor label shared by every member face.
    pub neighbor: NeighborLabel,
    /// Area-weighted centroid in the fragment's local frame.
    pub centroid: Point3<f64>,
    /// Total area of the member faces.
    pub area: f64,
}

/// Everything segmentation learned about one fragment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FragmentSegmentation {
    /// Index of the fragment in the input slice.
    pub fragment: usize,
    /// Number of faces on the fragment.
    pub face_count: usize,
    /// Candidate (interior) faces, ascending.
    pub candidates: Vec<usize>,
    /// Smoothed neighbor label of every face.
    pub labels: Vec<NeighborLabel>,
    /// Facets in discovery order.
    pub facets: Vec<LocalFacet>,
}

impl FragmentSegmentation {
    /// A fragment that contributes no facets.
    #[must_use]
    pub fn empty(fragment: usize, face_count: usize) -> Self {
        Self {
            fragment,
            face_count,
            candidates: Vec::new(),
            labels: vec![None; face_count],
            facets: Vec::new(),
        }
    }
}

/// Partition candidate faces into facets.
///
/// Seeds are taken in ascending candidate order and grown breadth-first.
/// Two faces join the same facet only if they share an edge, both are
/// candidates, and their labels are equal (`None == None` included).
/// Returns `(faces, label)` pairs in discovery order; faces ascending.
/// Candidates outside `labels` are ignored.
///
/// # Example
///
/// ```
/// use shard_facets::{FaceAdjacency, segment_faces};
/// use shard_types::{Point3, ShardMesh};
///
/// let mesh = ShardMesh::cuboid(Point3::origin(), Point3::new(1.0, 1.0, 1.0));
/// let adjacency = FaceAdjacency::from_mesh(&mesh);
/// let labels = vec![None, None, Some(1), Some(1), Some(2), None];
///
/// let facets = segment_faces(&adjacency, &[2, 3, 4], &labels);
///
/// // Faces 2 and 3 (-Y, +Y) are opposite sides and never share an edge.
/// assert_eq!(facets, vec![
///     (vec![2], Some(1)),
///     (vec![3], Some(1)),
///     (vec![4], Some(2)),
/// ]);
/// ```
#[must_use]
pub fn segment_faces(
    adjacency: &FaceAdjacency,
    candidates: &[usize],
    labels: &[NeighborLabel],
) -> Vec<(Vec<usize>, NeighborLabel)> {
    let face_count = labels.len();
    let mut is_candidate = vec![false; face_count];
    for &face in candidates {
        if face < face_count {
            is_candidate[face] = true;
        }
    }

    let mut sorted: Vec<usize> = candidates.iter().copied().filter(|&f| f < face_count).collect();
    sorted.sort_unstable();
    sorted.dedup();

    let mut assigned = vec![false; face_count];
    let mut facets = Vec::new();
    let mut queue = VecDeque::new();

    for &seed in &sorted {
        if assigned[seed] {
            continue;
        }
        let label = labels[seed];
        let mut faces = Vec::new();
        assigned[seed] = true;
        queue.push_back(seed);

        while let Some(face) = queue.pop_front() {
            faces.push(face);
            for &neighbor in adjacency.neighbors(face) {
                if neighbor < face_count
                    && is_candidate[neighbor]
                    && !assigned[neighbor]
                    && labels[neighbor] == label
                {
                    assigned[neighbor] = true;
                    queue.push_back(neighbor);
                }
            }
        }

        faces.sort_unstable();
        facets.push((faces, label));
    }

    facets
}

/// Area-weighted centroid and total area of a set of faces, local frame.
///
/// Falls back to the mean of the face centers when every face is
/// degenerate.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn facet_centroid(mesh: &ShardMesh, faces: &[usize]) -> (Point3<f64>, f64) {
    let mut weighted = Vector3::zeros();
    let mut area = 0.0;
    for &face in faces {
        for triangle in mesh.face_triangles(face) {
            let a = triangle.area();
            weighted += triangle.centroid().coords * a;
            area += a;
        }
    }

    if area > 0.0 {
        return (Point3::from(weighted / area), area);
    }

    let sum = faces
        .iter()
        .fold(Vector3::zeros(), |acc, &f| acc + mesh.face_center(f).coords);
    let count = faces.len().max(1) as f64;
    (Point3::from(sum / count), 0.0)
}

/// Classify, resolve, smooth and segment one fragment.
///
/// `resolver` must index every fragment of `fragments` at the pose the
/// neighbor labels should be measured in (normally canonical).
///
/// A fragment without candidate faces yields an empty segmentation.
///
/// # Errors
///
/// Returns the classifier's error when the interior attribute is missing
/// or malformed.
///
/// # Panics
///
/// Panics if `fragment_index` is out of bounds for `fragments`.
pub fn segment_fragment(
    fragment_index: usize,
    fragments: &[Fragment],
    resolver: &NeighborResolver,
    params: &FacetParams,
) -> FacetResult<FragmentSegmentation> {
    let fragment = &fragments[fragment_index];
    let candidates = candidate_faces(fragment)?;
    if candidates.is_empty() {
        return Ok(FragmentSegmentation::empty(
            fragment_index,
            fragment.face_count(),
        ));
    }

    let raw = resolve_raw_labels(
        fragment_index,
        fragment,
        &candidates,
        resolver,
        params.proximity_threshold,
    );
    let unresolved = candidates.iter().filter(|&&f| raw[f].is_none()).count();

    let adjacency = FaceAdjacency::from_mesh(fragment.mesh());
    let propagation = propagate_labels(
        &adjacency,
        &candidates,
        raw,
        params.propagation_iterations,
    );

    let facets: Vec<LocalFacet> = segment_faces(&adjacency, &candidates, &propagation.labels)
        .into_iter()
        .map(|(faces, neighbor)| {
            let (centroid, area) = facet_centroid(fragment.mesh(), &faces);
            LocalFacet {
                faces,
                neighbor,
                centroid,
                area,
            }
        })
        .collect();

    debug!(
        fragment = fragment.name(),
        candidates = candidates.len(),
        unresolved,
        passes = propagation.passes(),
        facets = facets.len(),
        "segmented fragment"
    );

    Ok(FragmentSegmentation {
        fragment: fragment_index,
        face_count: fragment.face_count(),
        candidates,
        labels: propagation.labels,
        facets,
    })
}

/// Segment every fragment in parallel and assign global facet ids.
///
/// Fragments whose interior attribute is missing or malformed are skipped
/// with a diagnostic and contribute an empty face table. Ids are assigned
/// only after every fragment has finished, so they do not depend on
/// scheduling.
#[must_use]
pub fn segment_all(
    fragments: &[Fragment],
    resolver: &NeighborResolver,
    params: &FacetParams,
) -> (FacetMap, Vec<Diagnostic>) {
    let results: Vec<(FragmentSegmentation, Option<Diagnostic>)> = (0..fragments.len())
        .into_par_iter()
        .map(|index| match segment_fragment(index, fragments, resolver, params) {
            Ok(seg) => (seg, None),
            Err(err) => {
                warn!(fragment = fragments[index].name(), %err, "skipping fragment");
                (
                    FragmentSegmentation::empty(index, fragments[index].face_count()),
                    err.to_diagnostic(),
                )
            }
        })
        .collect();

    let mut diagnostics = Vec::new();
    let mut segmentations = Vec::with_capacity(results.len());
    for (seg, diagnostic) in results {
        segmentations.push(seg);
        diagnostics.extend(diagnostic);
    }

    (FacetMap::from_segmentations(segmentations), diagnostics)
}
