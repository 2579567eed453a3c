use wgpu::util::DeviceExt;

use crate::shade::Projections;

use super::atlas::AtlasTexture;
use super::pipeline::Layouts;

/// Owns the two projection uniform buffers and their bind group (group 0).
#[derive(Debug)]
pub struct ProjectionBind {
    world_projection: wgpu::Buffer,
    viewport_projection: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
}

impl ProjectionBind {
    pub fn new(device: &wgpu::Device, layouts: &Layouts, projections: &Projections) -> Self {
        let world_projection = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("easel world projection ubo"),
            contents: bytemuck::bytes_of(&projections.world),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let viewport_projection = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("easel viewport projection ubo"),
            contents: bytemuck::bytes_of(&projections.viewport),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("easel projection bind group"),
            layout: &layouts.projection,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: world_projection.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: viewport_projection.as_entire_binding(),
                },
            ],
        });

        Self {
            world_projection,
            viewport_projection,
            bind_group,
        }
    }

    /// Records an upload of both matrices on `encoder`.
    ///
    /// The copies are ordered with the passes recorded around them, so every
    /// pass on the same encoder sees the matrices recorded just before it.
    pub fn record_update(
        &self,
        device: &wgpu::Device,
        encoder: &mut wgpu::CommandEncoder,
        projections: &Projections,
    ) {
        record_upload(
            device,
            encoder,
            &self.world_projection,
            bytemuck::bytes_of(&projections.world),
        );
        record_upload(
            device,
            encoder,
            &self.viewport_projection,
            bytemuck::bytes_of(&projections.viewport),
        );
    }
}

/// Atlas bind group (group 1), tagged with the atlas generations it was built from.
#[derive(Debug)]
pub struct AtlasBind {
    pub bind_group: wgpu::BindGroup,
    generations: (u64, u64),
}

impl AtlasBind {
    pub fn new(
        device: &wgpu::Device,
        layouts: &Layouts,
        mask_atlas: &AtlasTexture,
        color_atlas: &AtlasTexture,
        sampler: &wgpu::Sampler,
    ) -> Self {
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("easel atlas bind group"),
            layout: &layouts.atlases,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(mask_atlas.view()),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(color_atlas.view()),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(sampler),
                },
            ],
        });

        Self {
            bind_group,
            generations: (mask_atlas.generation(), color_atlas.generation()),
        }
    }

    /// False once either atlas has been recreated since this group was built.
    pub fn is_current(&self, mask_atlas: &AtlasTexture, color_atlas: &AtlasTexture) -> bool {
        self.generations == (mask_atlas.generation(), color_atlas.generation())
    }
}

/// Copies `bytes` into the start of `dst` through a transient staging buffer.
///
/// `Queue::write_buffer` lands before every pass of the next submit; a copy
/// recorded on the encoder lands exactly where it was recorded.
pub(crate) fn record_upload(
    device: &wgpu::Device,
    encoder: &mut wgpu::CommandEncoder,
    dst: &wgpu::Buffer,
    bytes: &[u8],
) {
    if bytes.is_empty() {
        return;
    }
    debug_assert_eq!(bytes.len() as u64 % wgpu::COPY_BUFFER_ALIGNMENT, 0);
    debug_assert!(bytes.len() as u64 <= dst.size());

    let staging = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some("easel upload staging"),
        contents: bytes,
        usage: wgpu::BufferUsages::COPY_SRC,
    });
    encoder.copy_buffer_to_buffer(&staging, 0, dst, 0, bytes.len() as u64);
}
