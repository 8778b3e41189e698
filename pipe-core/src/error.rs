//! Error types for geometry edits.
//!
//! Failures inside a growing branch never leave the branch: the engine
//! turns them into a family termination. These types exist for callers
//! of the mesh API itself.

use crate::types::FaceId;
use thiserror::Error;

/// Errors raised by [`crate::mesh::Mesh`] edits.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GeometryError {
    /// No faces were selected.
    #[error("face selection is empty")]
    EmptySelection,

    /// Every face of the object was selected, so detaching would leave
    /// the source object empty.
    #[error("face selection covers all {0} faces of the object")]
    WholeObject(usize),

    /// A face id does not exist in the mesh.
    #[error("face {face} is out of range (mesh has {count} faces)")]
    FaceOutOfRange {
        /// The offending id.
        face: FaceId,
        /// Number of faces in the mesh.
        count: usize,
    },
}
