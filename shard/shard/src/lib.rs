//! Fracture-surface reconstruction for broken objects.
//!
//! Given the fragments of a broken object (meshes whose break faces are
//! flagged, each with a canonical pose where the pieces still touch and a
//! current pose where they lie scattered), this crate finds:
//!
//! - **Facets**: connected regions of each fragment's break surface, each
//!   labeled with the fragment it touched
//! - **Adjacency**: which facet on one fragment met which facet on another
//! - **Point clouds**: area-weighted surface samples at the current pose,
//!   labeled with facet ids
//!
//! This umbrella crate re-exports the `shard-*` crates and adds the batch
//! pipeline, vessel grouping and JSON export.
//!
//! # Quick Start
//!
//! ```no_run
//! use shard::prelude::*;
//! use std::path::Path;
//!
//! # fn load_fragments() -> Vec<Fragment> { Vec::new() }
//! let grouping = shard::dataset::group_vessels(load_fragments());
//! let params = PipelineParams::default().with_sample(SampleParams::seeded(42));
//!
//! for vessel in &grouping.vessels {
//!     let export = shard::export::export_vessel(Path::new("dataset"), vessel, &params).unwrap();
//!     println!("{}", export.summary);
//! }
//! ```
//!
//! # Module Organization
//!
//! - [`types`] - Meshes, fragments, poses, diagnostics
//! - [`spatial`] - Closest-point surface indices and neighbor resolution
//! - [`facets`] - Interior classification, label propagation, segmentation
//! - [`matching`] - Facet matching and the adjacency graph
//! - [`sample`] - Labeled point cloud sampling
//! - [`dataset`] - Vessel grouping and renaming
//! - [`export`] - `adjacency.json` and point cloud files

#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]

// =============================================================================
// Re-exports
// =============================================================================

/// Meshes, fragments, poses and diagnostics.
pub use shard_types as types;

/// Closest-point surface indices and neighbor resolution.
pub use shard_spatial as spatial;

/// Interior classification, label propagation and facet segmentation.
pub use shard_facets as facets;

/// Facet matching and the adjacency graph.
pub use shard_match as matching;

/// Labeled point cloud sampling.
pub use shard_sample as sample;

pub mod dataset;
mod error;
pub mod export;
mod pipeline;

pub use error::{ExportError, ExportResult};
pub use pipeline::{
    BatchOutput, PipelineParams, Reconstruction, ReconstructionSummary, reconstruct, run_batch,
};
pub use shard_facets::FacetParams;
pub use shard_sample::SampleParams;

// =============================================================================
// Prelude
// =============================================================================

/// Common imports for reconstruction.
pub mod prelude {
    pub use shard_types::{Diagnostic, FacetId, Fragment, Point3, PoseKind, ShardMesh};

    pub use shard_facets::{FacetMap, FacetParams};
    pub use shard_match::AdjacencyGraph;
    pub use shard_sample::{LabeledPoint, SampleParams};

    pub use crate::dataset::{Vessel, group_vessels};
    pub use crate::pipeline::{PipelineParams, Reconstruction, reconstruct, run_batch};
}
