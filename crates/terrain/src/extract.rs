//! The seam to the contour-extraction stage.

use crate::field::FieldRegion;
use crate::geom::{Segment, Triangle};

/// Raw, unordered geometry from one extraction pass over one chunk.
///
/// Cells are generated independently, so duplicate vertices along shared
/// cell edges are expected - and must be byte-identical where they name the
/// same physical point, since downstream dedup and stitching match
/// coordinates exactly.
#[derive(Debug, Clone, Default)]
pub struct Extraction {
    pub triangles: Vec<Triangle>,
    pub segments: Vec<Segment>,
}

/// Produces a chunk's filled triangles and directed boundary segments for a
/// region of the density field at an iso threshold.
///
/// Contract: triangles tile the filled region; boundary segments trace the
/// filled/empty interface with the filled side on their left, consistently
/// across the whole region.
pub trait ContourExtractor {
    fn extract(&self, region: &FieldRegion<'_>, iso: f32) -> Extraction;
}
