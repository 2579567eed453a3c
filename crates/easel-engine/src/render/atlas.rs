use std::sync::atomic::{AtomicU64, Ordering};

use anyhow::{ensure, Result};

/// Every texture (re)creation takes a fresh id so bind groups can detect it.
static NEXT_GENERATION: AtomicU64 = AtomicU64::new(1);

/// Which atlas binding a texture is meant for.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum AtlasKind {
    /// Coverage only, `R8Unorm`, single mip level.
    Mask,
    /// Full color, `Rgba8Unorm`.
    Color,
}

impl AtlasKind {
    pub fn format(self) -> wgpu::TextureFormat {
        match self {
            AtlasKind::Mask => wgpu::TextureFormat::R8Unorm,
            AtlasKind::Color => wgpu::TextureFormat::Rgba8Unorm,
        }
    }

    pub fn bytes_per_texel(self) -> u32 {
        match self {
            AtlasKind::Mask => 1,
            AtlasKind::Color => 4,
        }
    }

    fn label(self) -> &'static str {
        match self {
            AtlasKind::Mask => "easel mask atlas",
            AtlasKind::Color => "easel color atlas",
        }
    }
}

/// GPU array texture bound as `mask_atlas` or `color_atlas`.
///
/// Packing is the caller's business: this type only owns storage, accepts
/// texel uploads into a layer, and grows its layer count on request.
#[derive(Debug)]
pub struct AtlasTexture {
    kind: AtlasKind,
    texture: wgpu::Texture,
    view: wgpu::TextureView,
    width: u32,
    height: u32,
    layers: u32,
    mip_level_count: u32,
    generation: u64,
}

impl AtlasTexture {
    /// Creates a `width` x `height` atlas with `layers` array layers.
    ///
    /// Mask atlases always get one mip level; `mip_level_count` only applies to
    /// color atlases, whose chains are filled by the caller.
    pub fn new(
        device: &wgpu::Device,
        kind: AtlasKind,
        width: u32,
        height: u32,
        layers: u32,
        mip_level_count: u32,
    ) -> Result<Self> {
        let limits = device.limits();
        ensure!(width > 0 && height > 0, "atlas size must be non-zero, got {width}x{height}");
        ensure!(
            width <= limits.max_texture_dimension_2d && height <= limits.max_texture_dimension_2d,
            "atlas {width}x{height} exceeds max texture dimension {}",
            limits.max_texture_dimension_2d
        );
        ensure!(
            (1..=limits.max_texture_array_layers).contains(&layers),
            "atlas layer count {layers} outside 1..={}",
            limits.max_texture_array_layers
        );

        let mip_level_count = match kind {
            AtlasKind::Mask => 1,
            AtlasKind::Color => mip_level_count.clamp(1, max_mip_levels(width, height)),
        };

        let (texture, view) = create_texture(device, kind, width, height, layers, mip_level_count);
        Ok(Self {
            kind,
            texture,
            view,
            width,
            height,
            layers,
            mip_level_count,
            generation: NEXT_GENERATION.fetch_add(1, Ordering::Relaxed),
        })
    }

    #[inline]
    pub fn kind(&self) -> AtlasKind {
        self.kind
    }

    #[inline]
    pub fn view(&self) -> &wgpu::TextureView {
        &self.view
    }

    #[inline]
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    #[inline]
    pub fn layers(&self) -> u32 {
        self.layers
    }

    #[inline]
    pub fn mip_level_count(&self) -> u32 {
        self.mip_level_count
    }

    /// Changes whenever the underlying texture is replaced.
    #[inline]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Uploads tightly packed texels into a rectangle of `layer` at `mip_level`.
    pub fn write_region(
        &self,
        queue: &wgpu::Queue,
        layer: u32,
        mip_level: u32,
        origin: (u32, u32),
        size: (u32, u32),
        data: &[u8],
    ) -> Result<()> {
        let (x, y) = origin;
        let (w, h) = size;
        ensure!(layer < self.layers, "layer {layer} out of range ({} layers)", self.layers);
        ensure!(
            mip_level < self.mip_level_count,
            "mip level {mip_level} out of range ({} levels)",
            self.mip_level_count
        );
        let level_w = (self.width >> mip_level).max(1);
        let level_h = (self.height >> mip_level).max(1);
        ensure!(
            x.checked_add(w).is_some_and(|r| r <= level_w)
                && y.checked_add(h).is_some_and(|b| b <= level_h),
            "region {w}x{h}+{x}+{y} outside {level_w}x{level_h} level {mip_level}"
        );

        let bytes_per_row = w * self.kind.bytes_per_texel();
        ensure!(
            data.len() == (bytes_per_row * h) as usize,
            "expected {} bytes for {w}x{h} region, got {}",
            bytes_per_row * h,
            data.len()
        );
        if w == 0 || h == 0 {
            return Ok(());
        }

        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &self.texture,
                mip_level,
                origin: wgpu::Origin3d { x, y, z: layer },
                aspect: wgpu::TextureAspect::All,
            },
            data,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(bytes_per_row),
                rows_per_image: Some(h),
            },
            wgpu::Extent3d { width: w, height: h, depth_or_array_layers: 1 },
        );
        Ok(())
    }

    /// Makes room for at least `layers` layers, preserving existing contents.
    ///
    /// Recreates the texture (new generation) when it has to grow. The copy is
    /// submitted on `queue` immediately.
    pub fn ensure_layers(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        layers: u32,
    ) -> Result<()> {
        if layers <= self.layers {
            return Ok(());
        }
        let max = device.limits().max_texture_array_layers;
        ensure!(layers <= max, "atlas layer count {layers} exceeds device limit {max}");

        let (texture, view) = create_texture(
            device,
            self.kind,
            self.width,
            self.height,
            layers,
            self.mip_level_count,
        );

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("easel atlas grow encoder"),
        });
        for mip_level in 0..self.mip_level_count {
            encoder.copy_texture_to_texture(
                wgpu::TexelCopyTextureInfo {
                    texture: &self.texture,
                    mip_level,
                    origin: wgpu::Origin3d::ZERO,
                    aspect: wgpu::TextureAspect::All,
                },
                wgpu::TexelCopyTextureInfo {
                    texture: &texture,
                    mip_level,
                    origin: wgpu::Origin3d::ZERO,
                    aspect: wgpu::TextureAspect::All,
                },
                wgpu::Extent3d {
                    width: (self.width >> mip_level).max(1),
                    height: (self.height >> mip_level).max(1),
                    depth_or_array_layers: self.layers,
                },
            );
        }
        queue.submit(std::iter::once(encoder.finish()));

        log::debug!(
            "{}: grew from {} to {layers} layers",
            self.kind.label(),
            self.layers
        );

        self.texture = texture;
        self.view = view;
        self.layers = layers;
        self.generation = NEXT_GENERATION.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}

fn max_mip_levels(width: u32, height: u32) -> u32 {
    32 - width.max(height).leading_zeros()
}

fn create_texture(
    device: &wgpu::Device,
    kind: AtlasKind,
    width: u32,
    height: u32,
    layers: u32,
    mip_level_count: u32,
) -> (wgpu::Texture, wgpu::TextureView) {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some(kind.label()),
        size: wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: layers,
        },
        mip_level_count,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: kind.format(),
        usage: wgpu::TextureUsages::TEXTURE_BINDING
            | wgpu::TextureUsages::COPY_DST
            | wgpu::TextureUsages::COPY_SRC,
        view_formats: &[],
    });
    // A single-layer texture would default to a plain D2 view.
    let view = texture.create_view(&wgpu::TextureViewDescriptor {
        label: Some(kind.label()),
        dimension: Some(wgpu::TextureViewDimension::D2Array),
        ..Default::default()
    });
    (texture, view)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_match_bindings() {
        assert_eq!(AtlasKind::Mask.format(), wgpu::TextureFormat::R8Unorm);
        assert_eq!(AtlasKind::Color.format(), wgpu::TextureFormat::Rgba8Unorm);
        assert_eq!(AtlasKind::Mask.bytes_per_texel(), 1);
        assert_eq!(AtlasKind::Color.bytes_per_texel(), 4);
    }

    #[test]
    fn mip_chain_length() {
        assert_eq!(max_mip_levels(1, 1), 1);
        assert_eq!(max_mip_levels(2048, 2048), 12);
        assert_eq!(max_mip_levels(300, 17), 9);
    }
}
