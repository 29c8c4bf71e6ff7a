//! Deterministic value-noise synthesis for the initial density field.
//!
//! Octave value noise shaped by a power curve and a radial falloff that
//! pulls the field to zero at the rim, leaving an island of filled terrain
//! centered in the surface.

use glam::Vec2;
use serde::{Deserialize, Serialize};
use terrain::field::DensityField;
use tracing::debug;

/// Parameters for island synthesis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NoiseConfig {
    /// Feature scale in world units.
    pub scale: f32,
    /// Offset into the noise domain, in world units.
    pub offset: Vec2,
    /// Octave count for the fractal sum.
    pub octaves: u32,
    /// Frequency multiplier between octaves.
    pub lacunarity: f32,
    /// Amplitude multiplier between octaves.
    pub persistence: f32,
    /// Power curve applied to the accumulated noise.
    pub power: i32,
    /// Fraction of the radius over which the field fades to zero at the
    /// rim; 0 disables the falloff.
    pub radial_falloff: f32,
}

impl Default for NoiseConfig {
    fn default() -> Self {
        Self {
            scale: 48.0,
            offset: Vec2::ZERO,
            octaves: 4,
            lacunarity: 2.0,
            persistence: 0.5,
            power: 2,
            radial_falloff: 0.65,
        }
    }
}

/// Integer lattice hash to `[0, 1)`.
fn hash2(ix: i32, iy: i32) -> f32 {
    let mut h = (ix as u32).wrapping_mul(0x85eb_ca6b) ^ (iy as u32).wrapping_mul(0xc2b2_ae35);
    h ^= h >> 13;
    h = h.wrapping_mul(0x27d4_eb2f);
    h ^= h >> 15;
    (h & 0x00ff_ffff) as f32 / 16_777_216.0
}

fn smoothstep(t: f32) -> f32 {
    t * t * (3.0 - 2.0 * t)
}

/// Bilinear value noise in `[0, 1)`.
pub fn value_noise(point: Vec2) -> f32 {
    let cell = point.floor();
    let frac = point - cell;
    let (ix, iy) = (cell.x as i32, cell.y as i32);
    let v00 = hash2(ix, iy);
    let v10 = hash2(ix + 1, iy);
    let v01 = hash2(ix, iy + 1);
    let v11 = hash2(ix + 1, iy + 1);
    let tx = smoothstep(frac.x);
    let ty = smoothstep(frac.y);
    let bottom = v00 + (v10 - v00) * tx;
    let top = v01 + (v11 - v01) * tx;
    bottom + (top - bottom) * ty
}

/// Octave sum of [`value_noise`], normalized back to `[0, 1]`.
pub fn fbm(point: Vec2, octaves: u32, lacunarity: f32, persistence: f32) -> f32 {
    let mut sum = 0.0;
    let mut amplitude = 1.0;
    let mut total = 0.0;
    let mut sample = point;
    for _ in 0..octaves.max(1) {
        sum += value_noise(sample) * amplitude;
        total += amplitude;
        amplitude *= persistence;
        sample *= lacunarity;
    }
    sum / total
}

/// Synthesize the initial island field: shaped fractal noise fading to
/// zero toward the rim of the surface.
pub fn island_field(
    samples_per_axis: usize,
    origin: Vec2,
    cell_size: f32,
    config: &NoiseConfig,
) -> DensityField {
    let extent = (samples_per_axis - 1) as f32 * cell_size;
    let center = origin + Vec2::splat(extent * 0.5);
    let max_distance = extent * 0.5;
    let falloff = config.radial_falloff.clamp(0.0, 1.0);
    debug!(
        "synthesizing {0}x{0} island field, scale {1}, {2} octaves",
        samples_per_axis, config.scale, config.octaves,
    );

    DensityField::from_fn(samples_per_axis, origin, cell_size, |world| {
        let sample = (world + config.offset) / config.scale;
        let mut value = fbm(sample, config.octaves, config.lacunarity, config.persistence);
        value = value.powi(config.power);
        if falloff > 0.0 {
            let t = (world.distance(center) / max_distance).min(1.0);
            let fade = ((t - (1.0 - falloff)) / falloff).clamp(0.0, 1.0);
            value *= 1.0 - smoothstep(fade);
        }
        value
    })
}
