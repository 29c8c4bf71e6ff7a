//! Per-chunk surface data and the rebuild cycle.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::constants::{SEGMENTS_PER_CELL, TRIANGLES_PER_CELL};
use crate::error::SurfaceError;
use crate::extract::{ContourExtractor, Extraction};
use crate::field::DensityField;
use crate::geom::{PointKey, Rect, SegmentId, Triangle};
use crate::index::SegmentIndex;
use crate::stitch::{ContourChain, ContourStitcher};

/// Grid coordinate of a chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChunkCoord {
    pub x: u32,
    pub y: u32,
}

/// A render vertex as published to the mesh consumer.
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
#[repr(C)]
pub struct MeshVertex {
    pub position: [f32; 2],
}

/// Deduplicated render geometry for one chunk: distinct vertices in
/// first-seen order plus index triples into them.
#[derive(Debug, Clone, Default)]
pub struct ChunkMesh {
    pub vertices: Vec<MeshVertex>,
    pub indices: Vec<u32>,
}

/// Counters from one completed rebuild.
#[derive(Debug, Clone, Copy, Default)]
pub struct RebuildStats {
    pub triangles: usize,
    pub segments: usize,
    pub vertices: usize,
    pub chains: usize,
}

/// One chunk of the terrain surface.
///
/// Owns the chunk's published mesh and collision chains. Each rebuild
/// replaces both wholesale; the segment index, the visited table, and the
/// vertex dedup table live only inside the rebuild call.
#[derive(Debug)]
pub struct ChunkSurface {
    coord: ChunkCoord,
    bounds: Rect,
    cells_per_axis: usize,
    sample_offset: (usize, usize),
    mesh: ChunkMesh,
    colliders: Vec<ContourChain>,
    revision: u64,
}

impl ChunkSurface {
    pub fn new(
        coord: ChunkCoord,
        bounds: Rect,
        cells_per_axis: usize,
        sample_offset: (usize, usize),
    ) -> Self {
        Self {
            coord,
            bounds,
            cells_per_axis,
            sample_offset,
            mesh: ChunkMesh::default(),
            colliders: Vec::new(),
            revision: 0,
        }
    }

    pub fn coord(&self) -> ChunkCoord {
        self.coord
    }

    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    /// The chunk's current renderable mesh.
    pub fn mesh(&self) -> &ChunkMesh {
        &self.mesh
    }

    /// The chunk's current collision boundary set.
    pub fn colliders(&self) -> &[ContourChain] {
        &self.colliders
    }

    /// Bumps on every successful rebuild; consumers use it to notice that
    /// the published mesh and colliders were replaced.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Regenerate this chunk from the current field contents and publish
    /// the result, replacing the previous mesh and colliders.
    ///
    /// Self-contained and idempotent: nothing carries over from earlier
    /// rebuilds, and a failed rebuild leaves the last published state
    /// untouched.
    pub fn rebuild<E: ContourExtractor>(
        &mut self,
        extractor: &E,
        field: &DensityField,
        iso: f32,
    ) -> Result<RebuildStats, SurfaceError> {
        let region = field.region(
            self.sample_offset.0,
            self.sample_offset.1,
            self.cells_per_axis + 1,
        );
        let Extraction { triangles, segments } = extractor.extract(&region, iso);

        let cells = self.cells_per_axis * self.cells_per_axis;
        let triangle_capacity = cells * TRIANGLES_PER_CELL;
        if triangles.len() > triangle_capacity {
            return Err(SurfaceError::ExtractionOverflow {
                kind: "triangles",
                len: triangles.len(),
                capacity: triangle_capacity,
            });
        }
        let segment_capacity = cells * SEGMENTS_PER_CELL;
        if segments.len() > segment_capacity {
            return Err(SurfaceError::ExtractionOverflow {
                kind: "segments",
                len: segments.len(),
                capacity: segment_capacity,
            });
        }

        let mesh = dedup_triangles(&triangles);

        let mut index = SegmentIndex::new(self.bounds);
        for (i, segment) in segments.iter().enumerate() {
            if !self.bounds.contains(segment.start) {
                return Err(SurfaceError::SegmentOutsideChunk {
                    x: segment.start.x,
                    y: segment.start.y,
                });
            }
            index.insert(SegmentId(i as u32), segment.start);
        }
        let chains = ContourStitcher::new(&segments, &index).stitch()?;

        let stats = RebuildStats {
            triangles: triangles.len(),
            segments: segments.len(),
            vertices: mesh.vertices.len(),
            chains: chains.len(),
        };
        debug!(
            "rebuilt chunk ({}, {}): {} triangles, {} segments -> {} vertices, {} chains",
            self.coord.x, self.coord.y, stats.triangles, stats.segments, stats.vertices, stats.chains,
        );

        self.mesh = mesh;
        self.colliders = chains;
        self.revision += 1;
        Ok(stats)
    }
}

/// Collapse the triangle soup's duplicate vertices into a mesh.
///
/// Cells generate their corners independently, so every shared vertex
/// arrives multiple times; the first occurrence claims the next dense index
/// and the rest map onto it by exact coordinate identity.
fn dedup_triangles(triangles: &[Triangle]) -> ChunkMesh {
    let mut lookup: HashMap<PointKey, u32> = HashMap::new();
    let mut vertices: Vec<MeshVertex> = Vec::new();
    let mut indices: Vec<u32> = Vec::with_capacity(triangles.len() * 3);

    for triangle in triangles {
        for corner in triangle.corners() {
            let next = vertices.len() as u32;
            let index = *lookup.entry(PointKey::of(corner)).or_insert(next);
            if index == next {
                vertices.push(MeshVertex {
                    position: corner.to_array(),
                });
            }
            indices.push(index);
        }
    }

    ChunkMesh { vertices, indices }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::FieldRegion;
    use crate::geom::Segment;
    use glam::Vec2;

    struct FixedExtraction(Extraction);

    impl ContourExtractor for FixedExtraction {
        fn extract(&self, _region: &FieldRegion<'_>, _iso: f32) -> Extraction {
            self.0.clone()
        }
    }

    fn tri(ax: f32, ay: f32, bx: f32, by: f32, cx: f32, cy: f32) -> Triangle {
        Triangle::new(Vec2::new(ax, ay), Vec2::new(bx, by), Vec2::new(cx, cy))
    }

    fn test_chunk(cells_per_axis: usize) -> (ChunkSurface, DensityField) {
        let size = cells_per_axis as f32;
        let chunk = ChunkSurface::new(
            ChunkCoord { x: 0, y: 0 },
            Rect::new(Vec2::ZERO, Vec2::splat(size)),
            cells_per_axis,
            (0, 0),
        );
        let field = DensityField::new(cells_per_axis + 1, Vec2::ZERO, 1.0);
        (chunk, field)
    }

    fn square_soup() -> Extraction {
        Extraction {
            triangles: vec![
                tri(0.0, 0.0, 1.0, 0.0, 1.0, 1.0),
                tri(0.0, 0.0, 1.0, 1.0, 0.0, 1.0),
            ],
            segments: vec![
                Segment::new(Vec2::new(0.0, 0.0), Vec2::new(1.0, 0.0)),
                Segment::new(Vec2::new(1.0, 0.0), Vec2::new(1.0, 1.0)),
                Segment::new(Vec2::new(1.0, 1.0), Vec2::new(0.0, 1.0)),
                Segment::new(Vec2::new(0.0, 1.0), Vec2::new(0.0, 0.0)),
            ],
        }
    }

    #[test]
    fn test_dedup_same_triangle_twice_adds_nothing() {
        let twice = [
            tri(0.0, 0.0, 1.0, 0.0, 0.0, 1.0),
            tri(0.0, 0.0, 1.0, 0.0, 0.0, 1.0),
        ];
        let mesh = dedup_triangles(&twice);
        assert_eq!(mesh.vertices.len(), 3);
        assert_eq!(mesh.indices, vec![0, 1, 2, 0, 1, 2]);
    }

    #[test]
    fn test_dedup_counts_distinct_coordinates() {
        // Two triangles sharing an edge: 6 raw corners, 4 distinct.
        let quad = [
            tri(0.0, 0.0, 1.0, 0.0, 1.0, 1.0),
            tri(0.0, 0.0, 1.0, 1.0, 0.0, 1.0),
        ];
        let mesh = dedup_triangles(&quad);
        assert_eq!(mesh.vertices.len(), 4);
        assert_eq!(mesh.indices.len(), 6);
        // First-seen order assigns indices.
        assert_eq!(mesh.vertices[0].position, [0.0, 0.0]);
        assert_eq!(mesh.vertices[3].position, [0.0, 1.0]);
    }

    #[test]
    fn test_rebuild_publishes_mesh_and_colliders() {
        let (mut chunk, field) = test_chunk(2);
        let extractor = FixedExtraction(square_soup());
        let stats = chunk.rebuild(&extractor, &field, 0.5).expect("rebuild succeeds");
        assert_eq!(stats.vertices, 4);
        assert_eq!(stats.chains, 1);
        assert_eq!(chunk.revision(), 1);
        assert_eq!(chunk.mesh().vertices.len(), 4);
        assert_eq!(chunk.colliders().len(), 1);
        assert!(chunk.colliders()[0].closed);
    }

    #[test]
    fn test_failed_rebuild_keeps_last_published_state() {
        let (mut chunk, field) = test_chunk(1);
        let good = FixedExtraction(square_soup());
        chunk.rebuild(&good, &field, 0.5).expect("first rebuild succeeds");
        let published = chunk.mesh().vertices.clone();

        // One cell holds at most 4 triangles; 5 overflow the chunk.
        let overflow = FixedExtraction(Extraction {
            triangles: vec![tri(0.0, 0.0, 1.0, 0.0, 0.0, 1.0); 5],
            segments: Vec::new(),
        });
        let err = chunk.rebuild(&overflow, &field, 0.5).unwrap_err();
        assert!(matches!(err, SurfaceError::ExtractionOverflow { kind: "triangles", .. }));
        assert_eq!(chunk.revision(), 1);
        assert_eq!(chunk.mesh().vertices, published);
        assert_eq!(chunk.colliders().len(), 1);
    }

    #[test]
    fn test_segment_outside_chunk_bounds_is_fatal() {
        let (mut chunk, field) = test_chunk(1);
        let stray = FixedExtraction(Extraction {
            triangles: Vec::new(),
            segments: vec![Segment::new(Vec2::new(5.0, 5.0), Vec2::new(6.0, 5.0))],
        });
        let err = chunk.rebuild(&stray, &field, 0.5).unwrap_err();
        assert!(matches!(err, SurfaceError::SegmentOutsideChunk { .. }));
        assert_eq!(chunk.revision(), 0);
    }

    #[test]
    fn test_rebuild_is_idempotent() {
        let (mut chunk, field) = test_chunk(2);
        let extractor = FixedExtraction(square_soup());
        chunk.rebuild(&extractor, &field, 0.5).expect("first rebuild");
        let mesh = chunk.mesh().vertices.clone();
        let chains = chunk.colliders().to_vec();
        chunk.rebuild(&extractor, &field, 0.5).expect("second rebuild");
        assert_eq!(chunk.mesh().vertices, mesh);
        assert_eq!(chunk.colliders(), chains.as_slice());
        assert_eq!(chunk.revision(), 2);
    }
}
