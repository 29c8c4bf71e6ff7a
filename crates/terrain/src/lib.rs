//! Contour stitching core for a chunked, terraformable 2D terrain surface.
//!
//! A scalar density field is marched per chunk into raw triangle soup and
//! directed boundary-segment soup by an extraction stage behind
//! [`extract::ContourExtractor`]. This crate turns that soup into published
//! geometry:
//! - [`index::SegmentIndex`] - quadtree over segment start points
//! - [`stitch::ContourStitcher`] - ordered loops and open chains
//! - [`chunk::ChunkSurface`] - vertex dedup, rebuild, atomic publish
//! - [`surface::Terrain`] - chunk grid, density field, terraform edits
//!
//! Chunks regenerate independently: an edit retraces the affected chunks
//! from scratch, and each rebuild replaces the chunk's previously published
//! mesh and colliders wholesale.

pub mod chunk;
pub mod constants;
pub mod error;
pub mod extract;
pub mod field;
pub mod geom;
pub mod index;
pub mod stitch;
pub mod surface;

pub use chunk::*;
pub use constants::*;
pub use error::*;
pub use extract::*;
pub use field::*;
pub use geom::*;
pub use index::*;
pub use stitch::*;
pub use surface::*;
