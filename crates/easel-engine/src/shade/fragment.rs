use glam::Vec2;

use crate::paint::{Color, Kind, PaintSource};

use super::{AtlasSampler, VertexOutput};

/// Fragment stage input after rasterization.
///
/// `color` and `tex_coords` are interpolated; `kind` and `texture` are flat
/// and therefore always equal to the provoking vertex's values.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct FragmentInput {
    pub color: Color,
    pub kind: u32,
    pub texture: u32,
    pub tex_coords: Vec2,
}

impl From<&VertexOutput> for FragmentInput {
    /// Fragment input at a vertex (no interpolation).
    fn from(v: &VertexOutput) -> Self {
        Self {
            color: v.color,
            kind: v.kind,
            texture: v.texture,
            tex_coords: v.tex_coords,
        }
    }
}

/// Resolves the final RGBA for one fragment.
///
/// Tags outside the kind table produce transparent black.
pub fn resolve_paint<A: AtlasSampler + ?Sized>(input: &FragmentInput, atlases: &A) -> Color {
    let Some(kind) = Kind::from_raw(input.kind) else {
        return Color::TRANSPARENT;
    };

    match kind.source {
        PaintSource::Flat => input.color,
        PaintSource::Mask => {
            let coverage = atlases.sample_mask_level0(input.texture, input.tex_coords);
            input.color.scale_alpha(coverage)
        }
        PaintSource::ColorAtlas => atlases.sample_color(input.texture, input.tex_coords),
    }
}
