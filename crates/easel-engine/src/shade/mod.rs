//! CPU reference of the two pipeline stages.
//!
//! `project_vertex` and `resolve_paint` compute exactly what `vs_main` and
//! `fs_main` in `render/shaders/canvas.wgsl` compute. Both are pure: they read
//! the vertex or fragment plus shared, immutable bindings and return a value.

mod atlas;
mod fragment;
mod vertex;

use glam::Mat4;

use crate::paint::Space;

pub use atlas::{AtlasSampler, CpuAtlases, LayeredImage};
pub use fragment::{resolve_paint, FragmentInput};
pub use vertex::{project_vertex, VertexOutput};

/// The two projection uniforms bound for a draw call.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Projections {
    /// Applied to world-space kinds (0..=2).
    pub world: Mat4,
    /// Applied to every other kind, valid or not.
    pub viewport: Mat4,
}

impl Projections {
    pub const IDENTITY: Self = Self {
        world: Mat4::IDENTITY,
        viewport: Mat4::IDENTITY,
    };

    #[inline]
    pub const fn new(world: Mat4, viewport: Mat4) -> Self {
        Self { world, viewport }
    }

    #[inline]
    pub const fn for_space(&self, space: Space) -> &Mat4 {
        match space {
            Space::World => &self.world,
            Space::Viewport => &self.viewport,
        }
    }
}

impl Default for Projections {
    fn default() -> Self {
        Self::IDENTITY
    }
}
