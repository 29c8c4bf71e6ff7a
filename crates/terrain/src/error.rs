use thiserror::Error;

/// Failures that abort a chunk rebuild.
///
/// A failed rebuild leaves the chunk's previously published mesh and
/// colliders in place; the caller decides whether to retry the edit.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SurfaceError {
    /// A stitch query point had no containing index leaf: the index was
    /// built over the wrong bounds for the segment soup.
    #[error("stitch query point ({x}, {y}) is outside the segment index bounds")]
    UncoveredQueryPoint { x: f32, y: f32 },

    /// Extraction emitted a boundary segment starting outside the chunk.
    #[error("boundary segment starts at ({x}, {y}), outside the chunk bounds")]
    SegmentOutsideChunk { x: f32, y: f32 },

    /// Extraction emitted more geometry than the chunk's fixed capacity.
    #[error("extraction produced {len} {kind}, chunk capacity is {capacity}")]
    ExtractionOverflow {
        kind: &'static str,
        len: usize,
        capacity: usize,
    },
}
