use bytemuck::{Pod, Zeroable};
use glam::Vec2;

use crate::paint::VertexKind;

/// One record of the vertex stream.
///
/// Layout (40 bytes, must match `canvas.wgsl`):
///
///  offset  0  position    [f32; 2]   loc 0
///  offset  8  color       [f32; 4]   loc 1
///  offset 24  kind        u32        loc 2  (flat)
///  offset 28  texture     u32        loc 3  (flat)
///  offset 32  tex_coords  [f32; 2]   loc 4
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 2],
    pub color: [f32; 4],
    pub kind: u32,
    /// Atlas array layer.
    pub texture: u32,
    pub tex_coords: [f32; 2],
}

impl Vertex {
    pub(crate) const ATTRS: [wgpu::VertexAttribute; 5] = wgpu::vertex_attr_array![
        0 => Float32x2, // position
        1 => Float32x4, // color
        2 => Uint32,    // kind
        3 => Uint32,    // texture
        4 => Float32x2  // tex_coords
    ];

    pub fn buffer_layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRS,
        }
    }

    /// Untextured vertex. `texture` and `tex_coords` are zeroed.
    pub fn with_color(position: Vec2, kind: VertexKind) -> Self {
        Self {
            position: position.to_array(),
            color: kind.color().to_array(),
            kind: kind.kind_id(),
            texture: 0,
            tex_coords: [0.0, 0.0],
        }
    }

    /// Vertex addressing `layer` of whichever atlas `kind` selects.
    pub fn textured(position: Vec2, kind: VertexKind, layer: u32, tex_coords: Vec2) -> Self {
        Self {
            position: position.to_array(),
            color: kind.color().to_array(),
            kind: kind.kind_id(),
            texture: layer,
            tex_coords: tex_coords.to_array(),
        }
    }

    #[inline]
    pub fn position(&self) -> Vec2 {
        Vec2::from_array(self.position)
    }

    #[inline]
    pub fn tex_coords(&self) -> Vec2 {
        Vec2::from_array(self.tex_coords)
    }
}
