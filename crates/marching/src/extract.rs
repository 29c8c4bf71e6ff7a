//! Cell-local marching squares over a density region.
//!
//! Every cell is processed independently, exactly like the cell-parallel
//! dispatch it stands in for: corners classify against the iso threshold,
//! crossings interpolate on cell edges, and each cell appends its own
//! triangles and boundary segments with no knowledge of its neighbors.
//! Duplicate vertices along shared cell edges are therefore expected, and
//! byte-identical: crossings always interpolate from the lower-indexed grid
//! endpoint, and corner positions derive from global sample indices.

use glam::Vec2;
use terrain::extract::{ContourExtractor, Extraction};
use terrain::field::FieldRegion;
use terrain::geom::{Segment, Triangle};

/// Marching-squares implementation of the extraction stage.
///
/// Boundary segments are emitted with the filled region on their left, so
/// stitched outer boundaries wind counterclockwise and holes clockwise.
#[derive(Debug, Default, Clone, Copy)]
pub struct MarchingSquares;

impl ContourExtractor for MarchingSquares {
    fn extract(&self, region: &FieldRegion<'_>, iso: f32) -> Extraction {
        let mut out = Extraction::default();
        let cells = region.cells_per_axis();
        for cy in 0..cells {
            for cx in 0..cells {
                march_cell(region, iso, cx, cy, &mut out);
            }
        }
        out
    }
}

/// Classify one cell and append its filled polygon (fan-triangulated) and
/// its boundary segments.
///
/// The filled polygon is collected by walking the cell perimeter
/// counterclockwise, keeping inside corners and inserting a crossing
/// wherever the inside/outside state flips. Polygon edges between an exit
/// crossing and the following entry crossing cut across the cell interior:
/// those are the contour, directed with the filled region on the left.
fn march_cell(region: &FieldRegion<'_>, iso: f32, cx: usize, cy: usize, out: &mut Extraction) {
    // Perimeter corners in counterclockwise order, bottom-left first.
    let corners = [
        (cx, cy),
        (cx + 1, cy),
        (cx + 1, cy + 1),
        (cx, cy + 1),
    ];
    let density = corners.map(|(ix, iy)| region.density(ix, iy));
    let inside = density.map(|d| d >= iso);

    if inside == [false; 4] {
        return;
    }

    let mut polygon: Vec<Vec2> = Vec::with_capacity(6);
    let mut exits: Vec<bool> = Vec::with_capacity(6);
    for i in 0..4 {
        let j = (i + 1) % 4;
        if inside[i] {
            let (ix, iy) = corners[i];
            polygon.push(region.world_position(ix, iy));
            exits.push(false);
        }
        if inside[i] != inside[j] {
            polygon.push(edge_crossing(region, iso, corners[i], corners[j], density[i], density[j]));
            // Leaving the filled region here; the matching entry crossing
            // is the next perimeter vertex kept.
            exits.push(inside[i]);
        }
    }

    for k in 1..polygon.len() - 1 {
        out.triangles.push(Triangle::new(polygon[0], polygon[k], polygon[k + 1]));
    }

    for (i, &is_exit) in exits.iter().enumerate() {
        if is_exit {
            let j = (i + 1) % polygon.len();
            out.segments.push(Segment::new(polygon[i], polygon[j]));
        }
    }
}

/// Interpolated iso crossing on the cell edge between two grid samples.
///
/// Interpolation always runs from the lower-indexed sample, so the two
/// cells sharing this edge (and the two chunks sharing a sample column)
/// compute bit-identical coordinates.
fn edge_crossing(
    region: &FieldRegion<'_>,
    iso: f32,
    a: (usize, usize),
    b: (usize, usize),
    density_a: f32,
    density_b: f32,
) -> Vec2 {
    let (lo, hi, density_lo, density_hi) = if a <= b {
        (a, b, density_a, density_b)
    } else {
        (b, a, density_b, density_a)
    };
    let t = (iso - density_lo) / (density_hi - density_lo);
    let from = region.world_position(lo.0, lo.1);
    let to = region.world_position(hi.0, hi.1);
    from + (to - from) * t
}
