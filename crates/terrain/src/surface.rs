//! The terrain surface: a chunk grid over one density field.

use glam::Vec2;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::chunk::{ChunkCoord, ChunkSurface};
use crate::error::SurfaceError;
use crate::extract::ContourExtractor;
use crate::field::DensityField;
use crate::geom::Rect;

/// Sizing of the chunk grid. The surface is square.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TerrainConfig {
    /// Chunks per axis.
    pub chunks_per_axis: usize,
    /// Marching cells per chunk axis.
    pub cells_per_chunk: usize,
    /// World size of one cell.
    pub cell_size: f32,
    /// Density threshold separating filled from empty.
    pub iso: f32,
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            chunks_per_axis: 8,
            cells_per_chunk: 32,
            cell_size: 1.0,
            iso: 0.5,
        }
    }
}

impl TerrainConfig {
    /// Field samples per axis required by this grid. Adjacent chunks share
    /// their boundary sample row/column, hence the +1.
    pub fn samples_per_axis(&self) -> usize {
        self.chunks_per_axis * self.cells_per_chunk + 1
    }

    /// World size of one chunk.
    pub fn chunk_size(&self) -> f32 {
        self.cells_per_chunk as f32 * self.cell_size
    }
}

/// The whole editable surface: the density field, the chunk grid, and the
/// edit entry point that ties them together.
///
/// Chunks share no mutable state with each other; each holds its own
/// published mesh and colliders, replaced wholesale by its own rebuilds.
#[derive(Debug)]
pub struct Terrain {
    config: TerrainConfig,
    field: DensityField,
    chunks: Vec<ChunkSurface>,
}

impl Terrain {
    /// Build the chunk grid over `field`. The field must have exactly the
    /// sample count the config calls for.
    pub fn new(config: TerrainConfig, field: DensityField) -> Self {
        assert_eq!(
            field.samples_per_axis(),
            config.samples_per_axis(),
            "density field does not match the chunk grid",
        );
        let chunk_size = config.chunk_size();
        let per_axis = config.chunks_per_axis;
        let mut chunks = Vec::with_capacity(per_axis * per_axis);
        for cy in 0..per_axis {
            for cx in 0..per_axis {
                let origin = field.origin() + Vec2::new(cx as f32, cy as f32) * chunk_size;
                chunks.push(ChunkSurface::new(
                    ChunkCoord {
                        x: cx as u32,
                        y: cy as u32,
                    },
                    Rect::new(origin, Vec2::splat(chunk_size)),
                    config.cells_per_chunk,
                    (cx * config.cells_per_chunk, cy * config.cells_per_chunk),
                ));
            }
        }
        Self {
            config,
            field,
            chunks,
        }
    }

    pub fn config(&self) -> &TerrainConfig {
        &self.config
    }

    pub fn field(&self) -> &DensityField {
        &self.field
    }

    pub fn chunks(&self) -> &[ChunkSurface] {
        &self.chunks
    }

    pub fn chunk(&self, coord: ChunkCoord) -> Option<&ChunkSurface> {
        let per_axis = self.config.chunks_per_axis;
        if (coord.x as usize) >= per_axis || (coord.y as usize) >= per_axis {
            return None;
        }
        self.chunks.get(coord.y as usize * per_axis + coord.x as usize)
    }

    /// Build or rebuild every chunk against the current field.
    pub fn rebuild_all<E: ContourExtractor>(&mut self, extractor: &E) -> Result<(), SurfaceError> {
        for chunk in &mut self.chunks {
            chunk.rebuild(extractor, &self.field, self.config.iso)?;
        }
        Ok(())
    }

    /// Edit the field with a radial brush and synchronously regenerate
    /// every chunk the brush circle touches. Positive strength digs,
    /// negative fills.
    ///
    /// Returns the rebuilt chunk coordinates. On error the failing chunk
    /// (and any not yet reached) keeps its previous published state; there
    /// are no internal retries.
    pub fn terraform<E: ContourExtractor>(
        &mut self,
        extractor: &E,
        world_position: Vec2,
        radius: f32,
        strength: f32,
    ) -> Result<Vec<ChunkCoord>, SurfaceError> {
        if !self.field.apply_brush(world_position, radius, strength) {
            debug!(
                "terraform at ({}, {}) radius {} changed no samples",
                world_position.x, world_position.y, radius,
            );
            return Ok(Vec::new());
        }

        let mut rebuilt = Vec::new();
        for chunk in &mut self.chunks {
            // Inclusive overlap: a brush grazing the shared boundary sample
            // row touches both neighbors.
            if !chunk.bounds().intersects_circle(world_position, radius) {
                continue;
            }
            chunk.rebuild(extractor, &self.field, self.config.iso)?;
            rebuilt.push(chunk.coord());
        }
        info!(
            "terraform at ({}, {}) radius {} strength {} rebuilt {} chunks",
            world_position.x,
            world_position.y,
            radius,
            strength,
            rebuilt.len(),
        );
        Ok(rebuilt)
    }
}
