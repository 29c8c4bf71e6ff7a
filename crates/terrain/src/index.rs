//! Quadtree index over boundary segments, keyed by segment start point.
//!
//! Marching emits segments of uniform cell size, so classifying a segment by
//! its start point alone places it in the right neighborhood without
//! tracking extents. Node bounds tests are inclusive on every edge: a start
//! point on a shared quadrant boundary is stored in each matching child, and
//! the stitcher's identity-based visited tracking absorbs the duplicates.
//!
//! The index is transient. A chunk builds a fresh one per regeneration,
//! queries it during stitching, and drops it.

use glam::Vec2;

use crate::constants::MAX_LEAF_SEGMENTS;
use crate::geom::{Rect, SegmentId};

/// A segment reference held by the index: identity plus the start point
/// used for placement.
#[derive(Debug, Clone, Copy)]
pub struct SegmentEntry {
    pub id: SegmentId,
    pub start: Vec2,
}

/// A node stays a leaf until its entry count crosses the branching
/// threshold, then becomes an internal node with four owned children for
/// the rest of its life. No merging back.
#[derive(Debug)]
enum QuadNode {
    Leaf {
        bounds: Rect,
        entries: Vec<SegmentEntry>,
    },
    Internal {
        bounds: Rect,
        children: Box<[QuadNode; 4]>,
    },
}

impl QuadNode {
    fn bounds(&self) -> Rect {
        match self {
            QuadNode::Leaf { bounds, .. } => *bounds,
            QuadNode::Internal { bounds, .. } => *bounds,
        }
    }
}

/// Spatial index answering "which segments start near this point".
#[derive(Debug)]
pub struct SegmentIndex {
    root: QuadNode,
}

impl SegmentIndex {
    /// Create an empty index covering `bounds`.
    pub fn new(bounds: Rect) -> Self {
        Self {
            root: QuadNode::Leaf {
                bounds,
                entries: Vec::new(),
            },
        }
    }

    /// The overall bounds this index was built over.
    pub fn bounds(&self) -> Rect {
        self.root.bounds()
    }

    /// Insert a segment by identity and start point. Start points outside
    /// the index bounds are ignored.
    pub fn insert(&mut self, id: SegmentId, start: Vec2) {
        Self::insert_into(&mut self.root, SegmentEntry { id, start });
    }

    fn insert_into(node: &mut QuadNode, entry: SegmentEntry) {
        if !node.bounds().contains(entry.start) {
            return;
        }
        match node {
            QuadNode::Leaf { entries, .. } => {
                if entries.len() > MAX_LEAF_SEGMENTS {
                    Self::subdivide(node);
                    Self::insert_into(node, entry);
                } else {
                    entries.push(entry);
                }
            }
            QuadNode::Internal { children, .. } => {
                // Every child tests containment independently; boundary ties
                // land the entry in more than one.
                for child in children.iter_mut() {
                    Self::insert_into(child, entry);
                }
            }
        }
    }

    /// Convert a full leaf into an internal node, re-inserting every held
    /// entry into each child that contains it.
    fn subdivide(node: &mut QuadNode) {
        let QuadNode::Leaf { bounds, entries } = node else {
            return;
        };
        let bounds = *bounds;
        let held = std::mem::take(entries);
        let children = bounds.quadrants().map(|quadrant| QuadNode::Leaf {
            bounds: quadrant,
            entries: Vec::new(),
        });
        *node = QuadNode::Internal {
            bounds,
            children: Box::new(children),
        };
        for entry in held {
            Self::insert_into(node, entry);
        }
    }

    /// The contents of the first leaf, in top-left, top-right, bottom-left,
    /// bottom-right traversal order, whose bounds contain `point`; `None`
    /// when the point lies outside the indexed bounds.
    ///
    /// A point on a shared child edge can match several leaves; callers get
    /// one relevant local neighborhood, not a unique owner.
    pub fn leaf_at(&self, point: Vec2) -> Option<&[SegmentEntry]> {
        Self::leaf_in(&self.root, point)
    }

    fn leaf_in(node: &QuadNode, point: Vec2) -> Option<&[SegmentEntry]> {
        if !node.bounds().contains(point) {
            return None;
        }
        match node {
            QuadNode::Leaf { entries, .. } => Some(entries.as_slice()),
            QuadNode::Internal { children, .. } => {
                children.iter().find_map(|child| Self::leaf_in(child, point))
            }
        }
    }
}
