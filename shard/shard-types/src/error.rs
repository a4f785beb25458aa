//! Error types for mesh construction.

use thiserror::Error;

/// Result type for mesh construction.
pub type ShardResult<T> = Result<T, ShardError>;

/// Errors that can occur while building a [`crate::ShardMesh`].
#[derive(Debug, Error)]
pub enum ShardError {
    /// A face references a vertex that does not exist.
    #[error("face {face} references vertex {index} (mesh has {vertex_count} vertices)")]
    InvalidVertexIndex {
        /// Index of the offending face.
        face: usize,
        /// The invalid vertex index.
        index: u32,
        /// Total number of vertices in the mesh.
        vertex_count: usize,
    },

    /// A face has fewer than three vertices.
    #[error("face {face} has {vertex_count} vertices, need at least 3")]
    DegenerateFace {
        /// Index of the offending face.
        face: usize,
        /// Number of vertices on the face.
        vertex_count: usize,
    },
}
