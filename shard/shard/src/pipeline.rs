//! The batch pipeline.
//!
//! One batch is one set of fragments that broke from the same object. The
//! stages are:
//!
//! 1. Build a surface index per fragment at the canonical pose (parallel).
//! 2. Classify, resolve, smooth and segment every fragment (parallel).
//! 3. Barrier: assign global facet ids, check facets for contradictory
//!    neighbors, and match facets across fragments.
//! 4. Sample labeled point clouds at the current pose (parallel).
//!
//! No stage aborts the batch; per-fragment and per-facet problems are
//! collected as [`Diagnostic`]s.

use std::fmt;

use serde::{Deserialize, Serialize};
use shard_facets::{
    ClassifierReport, FacetLabel, FacetMap, FacetParams, diagnose_multi_neighbor, segment_all,
};
use shard_match::{AdjacencyGraph, EdgeSegment, FacetMatching, edge_segments, match_facets};
use shard_sample::{LabeledPoint, SampleParams, sample_all};
use shard_spatial::NeighborResolver;
use shard_types::{Diagnostic, FacetId, Fragment, PoseKind, characteristic_size};
use tracing::info;

/// Configuration for a whole batch.
///
/// # Example
///
/// ```
/// use shard::PipelineParams;
///
/// let params: PipelineParams =
///     serde_json::from_str(r#"{ "sample": { "seed": 3 } }"#).unwrap();
/// assert_eq!(params.sample.seed, Some(3));
/// assert_eq!(params.facets.propagation_iterations, 5);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineParams {
    /// Segmentation and matching thresholds.
    pub facets: FacetParams,
    /// Point cloud sampling.
    pub sample: SampleParams,
}

impl PipelineParams {
    /// Thresholds scaled to the size of `fragments` at the canonical pose.
    ///
    /// See [`FacetParams::scaled_to`].
    #[must_use]
    pub fn for_fragments(fragments: &[Fragment]) -> Self {
        Self {
            facets: FacetParams::scaled_to(characteristic_size(fragments)),
            sample: SampleParams::default(),
        }
    }

    /// Set the facet parameters.
    #[must_use]
    pub fn with_facets(mut self, facets: FacetParams) -> Self {
        self.facets = facets;
        self
    }

    /// Set the sampling parameters.
    #[must_use]
    pub fn with_sample(mut self, sample: SampleParams) -> Self {
        self.sample = sample;
        self
    }
}

/// Facets and adjacency of one batch.
#[derive(Debug, Clone)]
pub struct Reconstruction {
    /// Interior attribute check over the input.
    pub classifier: ClassifierReport,
    /// Every facet, with global ids.
    pub facets: FacetMap,
    /// Picks and the adjacency graph.
    pub matching: FacetMatching,
    /// Every diagnostic raised, in stage order.
    pub diagnostics: Vec<Diagnostic>,
}

impl Reconstruction {
    /// The adjacency graph.
    #[must_use]
    pub fn graph(&self) -> &AdjacencyGraph {
        &self.matching.graph
    }

    /// Centroid-to-centroid segment of every edge at the given pose.
    #[must_use]
    pub fn edge_segments(&self, fragments: &[Fragment], kind: PoseKind) -> Vec<EdgeSegment> {
        edge_segments(fragments, &self.facets, &self.matching.graph, kind)
    }

    /// Label string of every facet, by id.
    #[must_use]
    pub fn facet_labels(&self, fragments: &[Fragment]) -> Vec<(FacetId, FacetLabel)> {
        self.facets
            .facets()
            .iter()
            .map(|f| (f.id, f.label(fragments)))
            .collect()
    }

    /// Counts for logging and reports.
    #[must_use]
    pub fn summary(&self) -> ReconstructionSummary {
        let resolved = self.facets.resolved().count();
        ReconstructionSummary {
            fragments: self.classifier.fragments,
            facets: self.facets.len(),
            resolved_facets: resolved,
            orphan_facets: self.facets.len() - resolved,
            edges: self.matching.graph.len(),
            unmatched_facets: self.matching.unmatched.len(),
            diagnostics: self.diagnostics.len(),
        }
    }
}

/// Counts describing one reconstruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ReconstructionSummary {
    /// Fragments in the batch.
    pub fragments: usize,
    /// Facets found.
    pub facets: usize,
    /// Facets with a resolved neighbor.
    pub resolved_facets: usize,
    /// Facets that touched no other fragment.
    pub orphan_facets: usize,
    /// Adjacency edges.
    pub edges: usize,
    /// Resolved facets that found no partner.
    pub unmatched_facets: usize,
    /// Diagnostics raised.
    pub diagnostics: usize,
}

impl fmt::Display for ReconstructionSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Fracture Reconstruction:")?;
        writeln!(f, "  Fragments: {}", self.fragments)?;
        writeln!(
            f,
            "  Facets: {} ({} resolved, {} orphan)",
            self.facets, self.resolved_facets, self.orphan_facets
        )?;
        writeln!(f, "  Adjacency edges: {}", self.edges)?;
        writeln!(f, "  Unmatched facets: {}", self.unmatched_facets)?;
        writeln!(f, "  Diagnostics: {}", self.diagnostics)?;
        Ok(())
    }
}

/// Segment every fragment and build the adjacency graph.
///
/// Geometry is read at the canonical pose only.
///
/// # Example
///
/// ```
/// use shard::{FacetParams, reconstruct};
/// use shard::types::{Fragment, Point3, ShardMesh};
///
/// let left = ShardMesh::cuboid(Point3::origin(), Point3::new(1.0, 1.0, 1.0));
/// let right = ShardMesh::cuboid(Point3::new(1.0, 0.0, 0.0), Point3::new(2.0, 1.0, 1.0));
/// let fragments = [
///     Fragment::new("a", left).with_interior(vec![false, false, false, false, false, true]),
///     Fragment::new("b", right).with_interior(vec![false, false, false, false, true, false]),
/// ];
///
/// let result = reconstruct(&fragments, &FacetParams::default());
/// assert_eq!(result.graph().to_pairs(), vec![[1, 2]]);
/// ```
#[must_use]
pub fn reconstruct(fragments: &[Fragment], params: &FacetParams) -> Reconstruction {
    let classifier = ClassifierReport::from_fragments(fragments);
    info!(
        fragments = classifier.fragments,
        with_interior = classifier.fragments_with_interior,
        interior_faces = classifier.interior_faces,
        "classified fragments"
    );

    let resolver =
        NeighborResolver::with_leaf_size(fragments, PoseKind::Canonical, params.max_leaf_size);

    let (facets, mut diagnostics) = segment_all(fragments, &resolver, params);
    info!(
        facets = facets.len(),
        resolved = facets.resolved().count(),
        "segmented fragments"
    );

    diagnostics.extend(diagnose_multi_neighbor(
        fragments,
        &facets,
        &resolver,
        params.proximity_threshold,
    ));

    let matching = match_facets(fragments, &facets, params.match_distance);
    diagnostics.extend(matching.diagnostics.iter().cloned());

    Reconstruction {
        classifier,
        facets,
        matching,
        diagnostics,
    }
}

/// A reconstruction together with the sampled point clouds.
#[derive(Debug, Clone)]
pub struct BatchOutput {
    /// Facets, graph and diagnostics, sampling diagnostics included.
    pub reconstruction: Reconstruction,
    /// One point cloud per fragment, in fragment order.
    pub clouds: Vec<Vec<LabeledPoint>>,
}

/// Run the whole pipeline on one batch.
#[must_use]
pub fn run_batch(fragments: &[Fragment], params: &PipelineParams) -> BatchOutput {
    let mut reconstruction = reconstruct(fragments, &params.facets);
    let (clouds, diagnostics) = sample_all(fragments, &reconstruction.facets, &params.sample);
    reconstruction.diagnostics.extend(diagnostics);

    let summary = reconstruction.summary();
    info!(
        fragments = summary.fragments,
        facets = summary.facets,
        edges = summary.edges,
        diagnostics = summary.diagnostics,
        "batch complete"
    );

    BatchOutput {
        reconstruction,
        clouds,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use shard_types::{Point3, ShardMesh};

    fn pair() -> Vec<Fragment> {
        let left = ShardMesh::cuboid(Point3::origin(), Point3::new(1.0, 1.0, 1.0));
        let right = ShardMesh::cuboid(Point3::new(1.0, 0.0, 0.0), Point3::new(2.0, 1.0, 1.0));
        vec![
            Fragment::new("a_cell.001", left)
                .with_interior(vec![false, false, false, false, false, true]),
            Fragment::new("a_cell.002", right)
                .with_interior(vec![false, false, false, false, true, false]),
        ]
    }

    #[test]
    fn summary_counts() {
        let fragments = pair();
        let result = reconstruct(&fragments, &FacetParams::default());
        let summary = result.summary();
        assert_eq!(
            summary,
            ReconstructionSummary {
                fragments: 2,
                facets: 2,
                resolved_facets: 2,
                orphan_facets: 0,
                edges: 1,
                unmatched_facets: 0,
                diagnostics: 0,
            }
        );
        let text = summary.to_string();
        assert!(text.starts_with("Fracture Reconstruction:"));
        assert!(text.contains("Adjacency edges: 1"));
    }

    #[test]
    fn labels_name_the_neighbor() {
        let fragments = pair();
        let result = reconstruct(&fragments, &FacetParams::default());
        let labels: Vec<String> = result
            .facet_labels(&fragments)
            .into_iter()
            .map(|(_, l)| l.to_string())
            .collect();
        assert_eq!(labels, vec!["FACET_a_cell.002_0", "FACET_a_cell.001_0"]);
    }

    #[test]
    fn params_scale_with_fragments() {
        let fragments = pair();
        let params = PipelineParams::for_fragments(&fragments);
        let size = 6.0_f64.sqrt();
        assert!((params.facets.match_distance - size).abs() < 1e-12);
        assert!((params.facets.proximity_threshold - size * 0.005).abs() < 1e-12);
    }

    #[test]
    fn batch_samples_every_fragment() {
        let fragments = pair();
        let params = PipelineParams::default()
            .with_sample(SampleParams::seeded(1).points_per_fragment(32));
        let output = run_batch(&fragments, &params);
        assert_eq!(output.clouds.len(), 2);
        assert!(output.clouds.iter().all(|c| c.len() == 32));
        assert!(output.reconstruction.diagnostics.is_empty());
    }
}
