//! Scalar density samples backing the terrain surface.

use glam::Vec2;

/// A square grid of density samples in `[0, 1]`, row-major from the
/// bottom-left corner (y-up). Chunks read borrowed [`FieldRegion`] views of
/// it; terraforming writes it through [`DensityField::apply_brush`].
#[derive(Debug, Clone)]
pub struct DensityField {
    samples_per_axis: usize,
    values: Vec<f32>,
    origin: Vec2,
    cell_size: f32,
}

impl DensityField {
    /// Create a field of zeros.
    pub fn new(samples_per_axis: usize, origin: Vec2, cell_size: f32) -> Self {
        Self {
            samples_per_axis,
            values: vec![0.0; samples_per_axis * samples_per_axis],
            origin,
            cell_size,
        }
    }

    /// Build a field by evaluating `f` at every sample's world position.
    /// Values are clamped to `[0, 1]`.
    pub fn from_fn(
        samples_per_axis: usize,
        origin: Vec2,
        cell_size: f32,
        mut f: impl FnMut(Vec2) -> f32,
    ) -> Self {
        let mut field = Self::new(samples_per_axis, origin, cell_size);
        for iy in 0..samples_per_axis {
            for ix in 0..samples_per_axis {
                let value = f(field.world_position(ix, iy)).clamp(0.0, 1.0);
                field.values[iy * samples_per_axis + ix] = value;
            }
        }
        field
    }

    pub fn samples_per_axis(&self) -> usize {
        self.samples_per_axis
    }

    pub fn origin(&self) -> Vec2 {
        self.origin
    }

    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// World position of a sample, derived from its global grid index so
    /// the same sample yields bit-identical coordinates wherever it is
    /// read - including from two chunks sharing a boundary row or column.
    #[inline]
    pub fn world_position(&self, ix: usize, iy: usize) -> Vec2 {
        self.origin + Vec2::new(ix as f32, iy as f32) * self.cell_size
    }

    /// Density at a sample. Indices must be within the grid.
    #[inline]
    pub fn sample(&self, ix: usize, iy: usize) -> f32 {
        debug_assert!(ix < self.samples_per_axis && iy < self.samples_per_axis);
        self.values[iy * self.samples_per_axis + ix]
    }

    /// Overwrite one sample, clamped to `[0, 1]`. Indices must be within
    /// the grid.
    #[inline]
    pub fn set_sample(&mut self, ix: usize, iy: usize, value: f32) {
        debug_assert!(ix < self.samples_per_axis && iy < self.samples_per_axis);
        self.values[iy * self.samples_per_axis + ix] = value.clamp(0.0, 1.0);
    }

    /// Apply a radial brush with a smoothstep falloff to the rim. Positive
    /// strength lowers density (digs), negative raises it (fills); samples
    /// clamp to `[0, 1]`. Returns whether any sample changed.
    pub fn apply_brush(&mut self, center: Vec2, radius: f32, strength: f32) -> bool {
        if radius <= 0.0 || strength == 0.0 {
            return false;
        }
        let last = (self.samples_per_axis - 1) as f32;
        let lo = ((center - Vec2::splat(radius) - self.origin) / self.cell_size).floor();
        let hi = ((center + Vec2::splat(radius) - self.origin) / self.cell_size).ceil();
        let x0 = lo.x.clamp(0.0, last) as usize;
        let x1 = hi.x.clamp(0.0, last) as usize;
        let y0 = lo.y.clamp(0.0, last) as usize;
        let y1 = hi.y.clamp(0.0, last) as usize;

        let mut changed = false;
        for iy in y0..=y1 {
            for ix in x0..=x1 {
                let distance = self.world_position(ix, iy).distance(center);
                if distance > radius {
                    continue;
                }
                let t = distance / radius;
                let weight = 1.0 - t * t * (3.0 - 2.0 * t);
                let index = iy * self.samples_per_axis + ix;
                let updated = (self.values[index] - strength * weight).clamp(0.0, 1.0);
                if updated != self.values[index] {
                    self.values[index] = updated;
                    changed = true;
                }
            }
        }
        changed
    }

    /// Borrow a square sub-grid of samples starting at `(sample_x,
    /// sample_y)`. The region must lie within the grid.
    pub fn region(&self, sample_x: usize, sample_y: usize, samples_per_axis: usize) -> FieldRegion<'_> {
        debug_assert!(sample_x + samples_per_axis <= self.samples_per_axis);
        debug_assert!(sample_y + samples_per_axis <= self.samples_per_axis);
        FieldRegion {
            field: self,
            sample_x,
            sample_y,
            samples_per_axis,
        }
    }
}

/// A borrowed view of one chunk's samples: the chunk's cells plus the
/// shared boundary row and column.
#[derive(Debug, Clone, Copy)]
pub struct FieldRegion<'a> {
    field: &'a DensityField,
    sample_x: usize,
    sample_y: usize,
    samples_per_axis: usize,
}

impl FieldRegion<'_> {
    /// Samples per axis in this region (cells + 1).
    pub fn samples_per_axis(&self) -> usize {
        self.samples_per_axis
    }

    /// Marching cells per axis in this region.
    pub fn cells_per_axis(&self) -> usize {
        self.samples_per_axis - 1
    }

    pub fn cell_size(&self) -> f32 {
        self.field.cell_size()
    }

    /// Density at a region-local sample.
    #[inline]
    pub fn density(&self, lx: usize, ly: usize) -> f32 {
        self.field.sample(self.sample_x + lx, self.sample_y + ly)
    }

    /// World position of a region-local sample, computed from the global
    /// grid index: adjacent chunks reproduce shared samples exactly.
    #[inline]
    pub fn world_position(&self, lx: usize, ly: usize) -> Vec2 {
        self.field.world_position(self.sample_x + lx, self.sample_y + ly)
    }
}
