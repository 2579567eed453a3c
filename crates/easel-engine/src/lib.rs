//! Easel engine crate.
//!
//! The draw core of a 2D canvas: one indexed triangle stream carrying flat
//! colors, mask-atlas glyphs and color-atlas images, in world or viewport
//! space, drawn by a single wgpu pipeline. `shade` and `raster` hold a CPU
//! reference of the same two stages.

pub mod device;
pub mod logging;
pub mod mesh;
pub mod paint;
pub mod projection;
pub mod raster;
pub mod render;
pub mod shade;
