use crate::device::OffscreenTarget;

/// Device, queue and the format of the color target being drawn into.
///
/// Borrowed from whoever owns the device; `Gpu::render_ctx` builds one for
/// headless use.
pub struct RenderCtx<'a> {
    pub device: &'a wgpu::Device,
    pub queue: &'a wgpu::Queue,
    pub target_format: wgpu::TextureFormat,
}

impl<'a> RenderCtx<'a> {
    #[inline]
    pub fn new(
        device: &'a wgpu::Device,
        queue: &'a wgpu::Queue,
        target_format: wgpu::TextureFormat,
    ) -> Self {
        Self { device, queue, target_format }
    }
}

/// Where one canvas pass is recorded: the frame's encoder and the color
/// attachment. The view's format must equal `RenderCtx::target_format`.
pub struct RenderTarget<'a> {
    pub encoder: &'a mut wgpu::CommandEncoder,
    pub color_view: &'a wgpu::TextureView,
}

impl<'a> RenderTarget<'a> {
    #[inline]
    pub fn new(encoder: &'a mut wgpu::CommandEncoder, color_view: &'a wgpu::TextureView) -> Self {
        Self { encoder, color_view }
    }

    pub fn offscreen(encoder: &'a mut wgpu::CommandEncoder, target: &'a OffscreenTarget) -> Self {
        Self::new(encoder, &target.view)
    }
}
