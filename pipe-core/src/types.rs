/// Identifier for a face in a [`crate::mesh::Mesh`].
///
/// This is an index into `Mesh::faces`. Extrusion only appends faces, so
/// ids stay valid while a branch grows; deleting or detaching faces
/// compacts the list and invalidates previously held ids.
pub type FaceId = usize;

/// Identifier for a vertex position in a [`crate::mesh::Mesh`].
pub type VertexId = usize;

/// Identifier for a branch in a [`crate::forest::PipeForest`].
///
/// Ids are handed out in increasing order and never reused, so a stale id
/// simply stops resolving once its branch has been released.
pub type BranchId = u64;
