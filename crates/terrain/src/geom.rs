//! Geometric primitives shared across the terrain pipeline.

use glam::Vec2;

/// Type-safe segment identifier: the segment's index in its chunk's soup.
///
/// Segment identity is always this index, never endpoint equality - the
/// quadtree can legitimately hold the same segment in several leaves, and
/// distinct segments can share coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SegmentId(pub u32);

/// Hashable identity key for a vertex coordinate.
///
/// Vertex merging treats two points as the same vertex only when their
/// coordinates are bit-identical; the extraction stage guarantees vertices
/// shared between adjacent cells reproduce exactly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PointKey([u32; 2]);

impl PointKey {
    #[inline]
    pub fn of(point: Vec2) -> Self {
        Self([point.x.to_bits(), point.y.to_bits()])
    }
}

/// A directed boundary edge. `start -> end` runs with the filled region on
/// its left, so stitching must follow direction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub start: Vec2,
    pub end: Vec2,
}

impl Segment {
    pub fn new(start: Vec2, end: Vec2) -> Self {
        Self { start, end }
    }
}

/// A filled triangle from contour extraction. Only feeds mesh building and
/// vertex deduplication; stitching never looks at triangles.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle {
    pub a: Vec2,
    pub b: Vec2,
    pub c: Vec2,
}

impl Triangle {
    pub fn new(a: Vec2, b: Vec2, c: Vec2) -> Self {
        Self { a, b, c }
    }

    pub fn corners(&self) -> [Vec2; 3] {
        [self.a, self.b, self.c]
    }
}

/// Axis-aligned rectangle as origin + size, y-up.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub origin: Vec2,
    pub size: Vec2,
}

impl Rect {
    pub fn new(origin: Vec2, size: Vec2) -> Self {
        Self { origin, size }
    }

    /// Containment is inclusive on all four edges: a point on a shared
    /// quadrant boundary counts as inside both neighbors.
    #[inline]
    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.origin.x
            && point.x <= self.origin.x + self.size.x
            && point.y >= self.origin.y
            && point.y <= self.origin.y + self.size.y
    }

    pub fn center(&self) -> Vec2 {
        self.origin + self.size * 0.5
    }

    /// Quadrant bounds in fixed top-left, top-right, bottom-left,
    /// bottom-right order.
    pub fn quadrants(&self) -> [Rect; 4] {
        let half = self.size * 0.5;
        [
            Rect::new(Vec2::new(self.origin.x, self.origin.y + half.y), half),
            Rect::new(self.origin + half, half),
            Rect::new(self.origin, half),
            Rect::new(Vec2::new(self.origin.x + half.x, self.origin.y), half),
        ]
    }

    /// Whether a circle overlaps this rectangle (touching counts).
    pub fn intersects_circle(&self, center: Vec2, radius: f32) -> bool {
        let closest = center.clamp(self.origin, self.origin + self.size);
        closest.distance_squared(center) <= radius * radius
    }
}
