/// Leaf capacity of the segment quadtree; a leaf splits once its count
/// exceeds this.
pub const MAX_LEAF_SEGMENTS: usize = 4;

/// Per-cell capacity for extracted triangles (the extraction dispatch
/// buffers are sized to this).
pub const TRIANGLES_PER_CELL: usize = 4;

/// Per-cell capacity for extracted boundary segments.
pub const SEGMENTS_PER_CELL: usize = 4;

/// Chains with this many points or fewer enclose nothing and are dropped.
pub const DEGENERATE_CHAIN_POINTS: usize = 2;
