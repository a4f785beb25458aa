//! Neighbor-label resolution and majority-vote smoothing.

use shard_spatial::NeighborResolver;
use shard_types::{Fragment, NeighborLabel};
use smallvec::SmallVec;

use crate::adjacency::FaceAdjacency;

/// Raw neighbor label of every candidate face.
///
/// Each candidate face is queried at its vertex mean, posed at the
/// resolver's pose. Non-candidate faces get `None`. The returned vector has
/// one entry per face of the fragment.
#[must_use]
pub fn resolve_raw_labels(
    fragment_index: usize,
    fragment: &Fragment,
    candidates: &[usize],
    resolver: &NeighborResolver,
    threshold: f64,
) -> Vec<NeighborLabel> {
    let mut labels = vec![None; fragment.face_count()];
    for &face in candidates {
        let query = fragment.world_face_center(face, resolver.pose());
        labels[face] = resolver.resolve(&query, fragment_index, threshold);
    }
    labels
}

/// Result of [`propagate_labels`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Propagation {
    /// Smoothed label of every face (non-candidates stay `None`).
    pub labels: Vec<NeighborLabel>,
    /// Number of candidate labels changed by each pass that ran.
    pub changes_per_pass: Vec<usize>,
}

impl Propagation {
    /// Number of passes actually run.
    #[must_use]
    pub fn passes(&self) -> usize {
        self.changes_per_pass.len()
    }

    /// Whether the last pass changed nothing.
    #[must_use]
    pub fn converged(&self) -> bool {
        self.changes_per_pass.last().is_some_and(|&c| c == 0)
    }
}

/// Smooth candidate-face labels by majority vote over shared-edge neighbors.
///
/// Each pass gives every candidate face the most common non-`None` label
/// among itself and its adjacent candidate faces. Votes are counted in
/// order (own label, then neighbors ascending) and a tie goes to the label
/// counted first. A face with no non-`None` vote stays `None`.
///
/// Candidates outside `labels` are ignored, as are repeats.
///
/// Every pass reads only the previous pass's labels. Passes stop early once
/// one changes nothing, since later passes would repeat it.
///
/// # Example
///
/// ```
/// use shard_facets::{FaceAdjacency, propagate_labels};
/// use shard_types::{Point3, ShardMesh};
///
/// let mesh = ShardMesh::cuboid(Point3::origin(), Point3::new(1.0, 1.0, 1.0));
/// let adjacency = FaceAdjacency::from_mesh(&mesh);
///
/// // Side faces 2..=5 all touch fragment 7 except one noisy face.
/// let candidates = [2, 3, 4, 5];
/// let labels = vec![None, None, Some(7), Some(7), None, Some(7)];
///
/// let result = propagate_labels(&adjacency, &candidates, labels, 5);
/// assert_eq!(result.labels[4], Some(7));
/// ```
#[must_use]
pub fn propagate_labels(
    adjacency: &FaceAdjacency,
    candidates: &[usize],
    labels: Vec<NeighborLabel>,
    iterations: usize,
) -> Propagation {
    let mut candidates: Vec<usize> = candidates
        .iter()
        .copied()
        .filter(|&f| f < labels.len())
        .collect();
    candidates.sort_unstable();
    candidates.dedup();

    let mut is_candidate = vec![false; labels.len()];
    for &face in &candidates {
        is_candidate[face] = true;
    }

    let mut current = labels;
    for (face, label) in current.iter_mut().enumerate() {
        if !is_candidate[face] {
            *label = None;
        }
    }
    let mut next = current.clone();
    let mut changes_per_pass = Vec::with_capacity(iterations);

    for _ in 0..iterations {
        let mut changes = 0;
        for &face in &candidates {
            let votes = std::iter::once(current[face]).chain(
                adjacency
                    .neighbors(face)
                    .iter()
                    .filter(|&&n| is_candidate.get(n).copied().unwrap_or(false))
                    .map(|&n| current[n]),
            );
            let winner = majority(votes);
            if winner != current[face] {
                changes += 1;
            }
            next[face] = winner;
        }
        std::mem::swap(&mut current, &mut next);
        changes_per_pass.push(changes);
        if changes == 0 {
            break;
        }
    }

    Propagation {
        labels: current,
        changes_per_pass,
    }
}

/// Most common non-`None` vote; ties go to the earliest-counted label.
fn majority(votes: impl Iterator<Item = NeighborLabel>) -> NeighborLabel {
    let mut tally: SmallVec<[(usize, usize); 8]> = SmallVec::new();
    for vote in votes.flatten() {
        if let Some(entry) = tally.iter_mut().find(|(label, _)| *label == vote) {
            entry.1 += 1;
        } else {
            tally.push((vote, 1));
        }
    }

    let mut best: NeighborLabel = None;
    let mut best_count = 0;
    for (label, count) in tally {
        if count > best_count {
            best = Some(label);
            best_count = count;
        }
    }
    best
}
