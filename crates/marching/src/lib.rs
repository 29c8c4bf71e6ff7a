//! Marching-squares extraction and field synthesis for the relief terrain
//! core.
//!
//! This crate stands in for the cell-parallel extraction dispatch: given a
//! chunk's region of the density field and an iso threshold, it emits the
//! unordered triangle and directed boundary-segment soup that
//! `terrain::ChunkSurface` dedups, indexes, and stitches. It also
//! synthesizes the initial island density field from octave value noise.

pub mod extract;
pub mod noise;

pub use extract::*;
pub use noise::*;
