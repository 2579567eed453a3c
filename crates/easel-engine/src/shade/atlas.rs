use glam::Vec2;
use wgpu::{AddressMode, FilterMode};

use crate::paint::Color;
use crate::render::SamplerConfig;

/// Read-only access to the two atlases as the fragment stage sees them.
///
/// The two methods intentionally differ: mask atlases are packed without
/// mip chains and are always read at level 0, while the color atlas goes
/// through the sampler's regular level selection.
pub trait AtlasSampler {
    /// Coverage from the mask atlas, level 0, first channel.
    fn sample_mask_level0(&self, layer: u32, uv: Vec2) -> f32;

    /// RGBA from the color atlas using default level selection.
    fn sample_color(&self, layer: u32, uv: Vec2) -> Color;
}

impl<T: AtlasSampler + ?Sized> AtlasSampler for &T {
    fn sample_mask_level0(&self, layer: u32, uv: Vec2) -> f32 {
        (**self).sample_mask_level0(layer, uv)
    }

    fn sample_color(&self, layer: u32, uv: Vec2) -> Color {
        (**self).sample_color(layer, uv)
    }
}

/// Texel types `LayeredImage` can filter linearly.
pub trait Texel: Copy + Default {
    fn lerp(self, other: Self, t: f32) -> Self;
}

impl Texel for f32 {
    #[inline]
    fn lerp(self, other: Self, t: f32) -> Self {
        self + (other - self) * t
    }
}

impl Texel for Color {
    #[inline]
    fn lerp(self, other: Self, t: f32) -> Self {
        Color::new(
            self.r.lerp(other.r, t),
            self.g.lerp(other.g, t),
            self.b.lerp(other.b, t),
            self.a.lerp(other.a, t),
        )
    }
}

/// Single-level layered image held in memory.
#[derive(Debug, Clone, PartialEq)]
pub struct LayeredImage<T> {
    width: u32,
    height: u32,
    layers: u32,
    texels: Vec<T>,
}

impl<T: Copy + Default> LayeredImage<T> {
    /// Image with every texel set to `T::default()`.
    pub fn new(width: u32, height: u32, layers: u32) -> Self {
        let len = width as usize * height as usize * layers as usize;
        Self {
            width,
            height,
            layers,
            texels: vec![T::default(); len],
        }
    }

    /// Image where every texel of every layer is `value`.
    pub fn filled(width: u32, height: u32, layers: u32, value: T) -> Self {
        let mut image = Self::new(width, height, layers);
        image.texels.fill(value);
        image
    }

    /// Wraps existing texels, row-major per layer. `None` on a length mismatch.
    pub fn from_texels(width: u32, height: u32, layers: u32, texels: Vec<T>) -> Option<Self> {
        let len = width as usize * height as usize * layers as usize;
        (texels.len() == len).then_some(Self {
            width,
            height,
            layers,
            texels,
        })
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn layers(&self) -> u32 {
        self.layers
    }

    fn offset(&self, layer: u32, x: u32, y: u32) -> Option<usize> {
        if layer >= self.layers || x >= self.width || y >= self.height {
            return None;
        }
        let layer_len = self.width as usize * self.height as usize;
        Some(layer as usize * layer_len + y as usize * self.width as usize + x as usize)
    }

    pub fn get(&self, layer: u32, x: u32, y: u32) -> Option<T> {
        self.offset(layer, x, y).map(|i| self.texels[i])
    }

    /// Writes one texel. Returns `false` if the coordinates are outside the image.
    pub fn set(&mut self, layer: u32, x: u32, y: u32, value: T) -> bool {
        match self.offset(layer, x, y) {
            Some(i) => {
                self.texels[i] = value;
                true
            }
            None => false,
        }
    }

    /// Nearest-texel lookup.
    ///
    /// The layer index is clamped to the last layer, matching GPU array
    /// sampling. Coordinates go through `address_mode`; `ClampToBorder`
    /// yields `T::default()` outside `[0, 1)`.
    pub fn sample_nearest(&self, layer: u32, uv: Vec2, address_mode: AddressMode) -> T {
        if self.layers == 0 || self.width == 0 || self.height == 0 {
            return T::default();
        }
        let layer = layer.min(self.layers - 1);

        let x = address(texel_index(uv.x, self.width), self.width, address_mode);
        let y = address(texel_index(uv.y, self.height), self.height, address_mode);
        match (x, y) {
            (Some(x), Some(y)) => self.get(layer, x, y).unwrap_or_default(),
            _ => T::default(),
        }
    }
}

impl<T: Texel> LayeredImage<T> {
    /// Bilinear lookup between the four texels around `uv`, with texel
    /// centres at half-integers. Each tap goes through `address_mode`
    /// separately, so `ClampToBorder` blends towards `T::default()` at edges.
    pub fn sample_linear(&self, layer: u32, uv: Vec2, address_mode: AddressMode) -> T {
        if self.layers == 0 || self.width == 0 || self.height == 0 {
            return T::default();
        }
        let layer = layer.min(self.layers - 1);

        let x = uv.x * self.width as f32 - 0.5;
        let y = uv.y * self.height as f32 - 0.5;
        let (x0, y0) = (x.floor(), y.floor());
        let (tx, ty) = (x - x0, y - y0);
        let (x0, y0) = (x0 as i64, y0 as i64);

        let tap = |ix: i64, iy: i64| {
            let x = address(ix, self.width, address_mode);
            let y = address(iy, self.height, address_mode);
            match (x, y) {
                (Some(x), Some(y)) => self.get(layer, x, y).unwrap_or_default(),
                _ => T::default(),
            }
        };

        let top = tap(x0, y0).lerp(tap(x0 + 1, y0), tx);
        let bottom = tap(x0, y0 + 1).lerp(tap(x0 + 1, y0 + 1), tx);
        top.lerp(bottom, ty)
    }

    /// Lookup with the given filter.
    pub fn sample(&self, layer: u32, uv: Vec2, address_mode: AddressMode, filter: FilterMode) -> T {
        match filter {
            FilterMode::Nearest => self.sample_nearest(layer, uv, address_mode),
            FilterMode::Linear => self.sample_linear(layer, uv, address_mode),
        }
    }
}

fn texel_index(coord: f32, size: u32) -> i64 {
    // float -> int casts saturate and map NaN to 0
    (coord * size as f32).floor() as i64
}

fn address(index: i64, size: u32, mode: AddressMode) -> Option<u32> {
    let n = i64::from(size);
    let resolved = match mode {
        AddressMode::ClampToEdge => index.clamp(0, n - 1),
        AddressMode::Repeat => index.rem_euclid(n),
        AddressMode::MirrorRepeat => {
            let m = index.rem_euclid(2 * n);
            if m < n { m } else { 2 * n - 1 - m }
        }
        AddressMode::ClampToBorder => {
            if !(0..n).contains(&index) {
                return None;
            }
            index
        }
    };
    Some(resolved as u32)
}

/// In-memory mask and color atlases read through one sampler setting.
///
/// Defaults follow `SamplerConfig::default()`, so the CPU reference filters
/// like the GPU sampler. Images are single-level: the GPU's mip selection and
/// minification filter have no counterpart, and `filter` is the sampler's
/// magnification filter. Hardware linear filtering rounds its weights, so
/// linear results agree with the GPU to within a few 8-bit steps.
#[derive(Debug, Clone)]
pub struct CpuAtlases {
    pub mask: LayeredImage<f32>,
    pub color: LayeredImage<Color>,
    pub address_mode: AddressMode,
    pub filter: FilterMode,
}

impl CpuAtlases {
    pub fn new(mask: LayeredImage<f32>, color: LayeredImage<Color>) -> Self {
        let sampler = SamplerConfig::default();
        Self {
            mask,
            color,
            address_mode: sampler.address_mode,
            filter: sampler.mag_filter,
        }
    }

    /// 1x1, single-layer atlases holding zero coverage and transparent black.
    pub fn empty() -> Self {
        Self::new(LayeredImage::new(1, 1, 1), LayeredImage::new(1, 1, 1))
    }

    pub fn with_address_mode(mut self, address_mode: AddressMode) -> Self {
        self.address_mode = address_mode;
        self
    }

    pub fn with_filter(mut self, filter: FilterMode) -> Self {
        self.filter = filter;
        self
    }

    /// Takes addressing and magnification filter from a GPU sampler setting.
    pub fn with_sampler(self, sampler: &SamplerConfig) -> Self {
        self.with_address_mode(sampler.address_mode)
            .with_filter(sampler.mag_filter)
    }
}

impl AtlasSampler for CpuAtlases {
    fn sample_mask_level0(&self, layer: u32, uv: Vec2) -> f32 {
        self.mask.sample(layer, uv, self.address_mode, self.filter)
    }

    fn sample_color(&self, layer: u32, uv: Vec2) -> Color {
        // Single-level images: default level selection always lands on level 0.
        self.color.sample(layer, uv, self.address_mode, self.filter)
    }
}
