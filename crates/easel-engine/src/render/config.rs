use crate::paint::Color;

/// How fragment output is composited into the color target.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub enum BlendMode {
    /// Straight-alpha "over": `src * src.a + dst * (1 - src.a)`.
    #[default]
    Straight,
    /// Premultiplied "over": `src + dst * (1 - src.a)`.
    Premultiplied,
    /// No blending; fragments overwrite the target.
    Replace,
}

impl BlendMode {
    pub fn blend_state(self) -> Option<wgpu::BlendState> {
        match self {
            BlendMode::Straight => Some(wgpu::BlendState {
                color: wgpu::BlendComponent {
                    src_factor: wgpu::BlendFactor::SrcAlpha,
                    dst_factor: wgpu::BlendFactor::OneMinusSrcAlpha,
                    operation: wgpu::BlendOperation::Add,
                },
                alpha: wgpu::BlendComponent::OVER,
            }),
            BlendMode::Premultiplied => Some(wgpu::BlendState::PREMULTIPLIED_ALPHA_BLENDING),
            BlendMode::Replace => None,
        }
    }

    /// CPU equivalent of `blend_state`, applied to one pixel.
    pub fn apply(self, src: Color, dst: Color) -> Color {
        match self {
            BlendMode::Straight => {
                let inv = 1.0 - src.a;
                Color::new(
                    src.r * src.a + dst.r * inv,
                    src.g * src.a + dst.g * inv,
                    src.b * src.a + dst.b * inv,
                    src.a + dst.a * inv,
                )
            }
            BlendMode::Premultiplied => {
                let inv = 1.0 - src.a;
                Color::new(
                    src.r + dst.r * inv,
                    src.g + dst.g * inv,
                    src.b + dst.b * inv,
                    src.a + dst.a * inv,
                )
            }
            BlendMode::Replace => src,
        }
    }
}

/// Configuration of the sampler shared by both atlases.
#[derive(Debug, Clone, PartialEq)]
pub struct SamplerConfig {
    pub address_mode: wgpu::AddressMode,
    pub mag_filter: wgpu::FilterMode,
    pub min_filter: wgpu::FilterMode,
    pub mipmap_filter: wgpu::MipmapFilterMode,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            address_mode: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::MipmapFilterMode::Linear,
        }
    }
}

impl SamplerConfig {
    pub fn descriptor(&self) -> wgpu::SamplerDescriptor<'static> {
        wgpu::SamplerDescriptor {
            label: Some("easel atlas sampler"),
            address_mode_u: self.address_mode,
            address_mode_v: self.address_mode,
            address_mode_w: self.address_mode,
            mag_filter: self.mag_filter,
            min_filter: self.min_filter,
            mipmap_filter: self.mipmap_filter,
            ..Default::default()
        }
    }
}

/// Renderer-wide settings. Everything here is owned by the host; the draw core
/// only reads it when building the pipeline and recording passes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RendererConfig {
    pub blend: BlendMode,
    pub sampler: SamplerConfig,
    /// Clear the target before drawing. `None` loads existing contents.
    pub clear_color: Option<Color>,
}

impl RendererConfig {
    pub(crate) fn load_op(&self) -> wgpu::LoadOp<wgpu::Color> {
        match self.clear_color {
            Some(c) => wgpu::LoadOp::Clear(wgpu::Color {
                r: c.r as f64,
                g: c.g as f64,
                b: c.b as f64,
                a: c.a as f64,
            }),
            None => wgpu::LoadOp::Load,
        }
    }
}
