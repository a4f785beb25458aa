//! Core types for fracture-surface reconstruction.
//!
//! This crate provides the foundational types shared by the `shard-*` crates:
//!
//! - [`ShardMesh`] - A polygon mesh with cached per-face normals
//! - [`Face`] - A polygon face (three or more vertex indices)
//! - [`Fragment`] - One rigid piece of a fractured object, carrying a
//!   canonical pose and a current pose
//! - [`Triangle`] - A concrete triangle with vertex positions
//! - [`Aabb`] - Axis-aligned bounding box
//! - [`Diagnostic`] - Non-fatal conditions reported by the batch pipeline
//!
//! # Poses
//!
//! Every fragment carries two rigid transforms. The **canonical** pose is the
//! one at which the pieces still touch and pre-fracture contact can be
//! measured. The **current** pose is arbitrary (scattered pieces) and is only
//! used for exported samples. Geometry in world space is always requested
//! with an explicit [`PoseKind`]; there is no shared "active" pose.
//!
//! # Units
//!
//! This library is **unit-agnostic**. All coordinates are `f64`.
//!
//! # Example
//!
//! ```
//! use shard_types::{Fragment, PoseKind, ShardMesh, Point3};
//!
//! let mesh = ShardMesh::cuboid(Point3::origin(), Point3::new(1.0, 1.0, 1.0));
//! let interior = vec![false, false, false, false, false, true];
//!
//! let fragment = Fragment::new("pot_cell.001", mesh)
//!     .with_interior(interior)
//!     .with_current_translation(5.0, 0.0, 0.0);
//!
//! let center = fragment.world_face_center(5, PoseKind::Current);
//! assert!((center.x - 6.0).abs() < 1e-12);
//! ```

#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]

mod bounds;
mod diagnostic;
mod error;
mod fragment;
mod mesh;
mod triangle;

pub use bounds::Aabb;
pub use diagnostic::Diagnostic;
pub use error::{ShardError, ShardResult};
pub use fragment::{Fragment, PoseKind, characteristic_size};
pub use mesh::{Face, ShardMesh};
pub use triangle::Triangle;

// Re-export nalgebra types for convenience
pub use nalgebra::{Isometry3, Point3, Vector3};

/// Global facet identifier.
///
/// Facet ids start at 1; [`UNASSIGNED_FACET`] marks faces that belong to no
/// facet (outer-surface faces, or faces of a fragment that was skipped).
pub type FacetId = u32;

/// Facet id reserved for "not a facet".
pub const UNASSIGNED_FACET: FacetId = 0;

/// Resolved neighbor of a face or facet: the index of the touching fragment
/// in the input slice, or `None` when nothing was within the proximity
/// threshold.
pub type NeighborLabel = Option<usize>;
