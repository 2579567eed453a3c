//! GPU realisation of the draw core.
//!
//! `CanvasPipeline` compiles `shaders/canvas.wgsl` and its two bind group
//! layouts; `CanvasRenderer` owns per-target GPU state and records passes.
//!
//! Convention:
//! - vertex positions are world units or logical pixels depending on kind
//! - both projection uniforms are column-major `mat4x4<f32>` (`glam::Mat4`)

mod atlas;
mod binds;
mod config;
mod ctx;
mod pipeline;
mod renderer;

pub use atlas::{AtlasKind, AtlasTexture};
pub use binds::{AtlasBind, ProjectionBind};
pub use config::{BlendMode, RendererConfig, SamplerConfig};
pub use ctx::{RenderCtx, RenderTarget};
pub use pipeline::{CanvasPipeline, Layouts};
pub use renderer::{Atlases, CanvasRenderer};
