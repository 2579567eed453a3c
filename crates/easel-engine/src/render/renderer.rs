use std::borrow::Cow;

use crate::mesh::{Mesh, Vertex};
use crate::shade::Projections;

use super::atlas::AtlasTexture;
use super::binds::{record_upload, AtlasBind, ProjectionBind};
use super::config::RendererConfig;
use super::pipeline::CanvasPipeline;
use super::{RenderCtx, RenderTarget};

const MIN_VERTEX_CAPACITY: usize = 256;
const MIN_INDEX_CAPACITY: usize = 384;

/// The atlases bound for one draw.
#[derive(Debug, Copy, Clone)]
pub struct Atlases<'a> {
    pub mask: &'a AtlasTexture,
    pub color: &'a AtlasTexture,
}

/// Draws one vertex stream through the canvas pipeline.
///
/// GPU objects are created lazily and reused: the pipeline per target format,
/// bind groups until an atlas is replaced, and vertex/index buffers until the
/// stream outgrows them.
///
/// Uploads are recorded on the target's encoder, so several `render` calls may
/// share one encoder: each pass draws its own mesh with its own projections.
/// `clear_color` applies to every call; leave it `None` for later batches.
#[derive(Default)]
pub struct CanvasRenderer {
    config: RendererConfig,

    pipeline: Option<CanvasPipeline>,
    projection_bind: Option<ProjectionBind>,
    atlas_bind: Option<AtlasBind>,

    vertex_buffer: Option<wgpu::Buffer>,
    vertex_capacity: usize,
    index_buffer: Option<wgpu::Buffer>,
    index_capacity: usize,
}

impl CanvasRenderer {
    pub fn new(config: RendererConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &RendererConfig {
        &self.config
    }

    /// Replaces the configuration. The pipeline is rebuilt on the next draw.
    pub fn set_config(&mut self, config: RendererConfig) {
        self.config = config;
        self.pipeline = None;
        self.projection_bind = None;
        self.atlas_bind = None;
    }

    /// Records one render pass drawing `mesh`.
    ///
    /// Triangles that break the stream invariants (dangling indices, mixed
    /// kind/texture) are dropped with a warning; the rest are drawn.
    pub fn render(
        &mut self,
        ctx: &RenderCtx<'_>,
        target: &mut RenderTarget<'_>,
        mesh: &Mesh,
        projections: &Projections,
        atlases: Atlases<'_>,
    ) {
        let indices = drawable_indices(mesh);
        if indices.is_empty() && self.config.clear_color.is_none() {
            return;
        }

        self.ensure_pipeline(ctx);
        self.ensure_projection_bind(ctx, projections);
        self.ensure_atlas_bind(ctx, atlases);
        self.ensure_buffers(ctx, mesh.vertices.len(), indices.len());

        let Some(vertex_buffer) = self.vertex_buffer.as_ref() else { return };
        let Some(index_buffer) = self.index_buffer.as_ref() else { return };
        let Some(pipeline) = self.pipeline.as_ref() else { return };
        let Some(projection_bind) = self.projection_bind.as_ref() else { return };
        let Some(atlas_bind) = self.atlas_bind.as_ref() else { return };

        if !indices.is_empty() {
            projection_bind.record_update(ctx.device, target.encoder, projections);
            record_upload(
                ctx.device,
                target.encoder,
                vertex_buffer,
                bytemuck::cast_slice(&mesh.vertices),
            );
            record_upload(ctx.device, target.encoder, index_buffer, bytemuck::cast_slice(&indices));
        }

        let mut rpass = target.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("easel canvas pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target.color_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: self.config.load_op(),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });

        if indices.is_empty() {
            return;
        }

        rpass.set_pipeline(&pipeline.render_pipeline);
        rpass.set_bind_group(0, &projection_bind.bind_group, &[]);
        rpass.set_bind_group(1, &atlas_bind.bind_group, &[]);
        rpass.set_vertex_buffer(0, vertex_buffer.slice(..));
        rpass.set_index_buffer(index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        rpass.draw_indexed(0..indices.len() as u32, 0, 0..1);
    }

    fn ensure_pipeline(&mut self, ctx: &RenderCtx<'_>) {
        if self.pipeline.as_ref().is_some_and(|p| p.format == ctx.target_format) {
            return;
        }
        self.pipeline = Some(CanvasPipeline::new(ctx.device, ctx.target_format, &self.config));
        // Bind groups reference the old layouts.
        self.projection_bind = None;
        self.atlas_bind = None;
    }

    fn ensure_projection_bind(&mut self, ctx: &RenderCtx<'_>, projections: &Projections) {
        if self.projection_bind.is_some() {
            return;
        }
        let Some(pipeline) = self.pipeline.as_ref() else { return };
        self.projection_bind = Some(ProjectionBind::new(ctx.device, &pipeline.layouts, projections));
    }

    fn ensure_atlas_bind(&mut self, ctx: &RenderCtx<'_>, atlases: Atlases<'_>) {
        if self
            .atlas_bind
            .as_ref()
            .is_some_and(|b| b.is_current(atlases.mask, atlases.color))
        {
            return;
        }
        let Some(pipeline) = self.pipeline.as_ref() else { return };
        self.atlas_bind = Some(AtlasBind::new(
            ctx.device,
            &pipeline.layouts,
            atlases.mask,
            atlases.color,
            &pipeline.sampler,
        ));
    }

    fn ensure_buffers(&mut self, ctx: &RenderCtx<'_>, vertices: usize, indices: usize) {
        if vertices > self.vertex_capacity || self.vertex_buffer.is_none() {
            let cap = vertices.next_power_of_two().max(MIN_VERTEX_CAPACITY);
            self.vertex_buffer = Some(ctx.device.create_buffer(&wgpu::BufferDescriptor {
                label: Some("easel canvas vbo"),
                size: (cap * std::mem::size_of::<Vertex>()) as u64,
                usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            }));
            self.vertex_capacity = cap;
        }
        if indices > self.index_capacity || self.index_buffer.is_none() {
            let cap = indices.next_power_of_two().max(MIN_INDEX_CAPACITY);
            self.index_buffer = Some(ctx.device.create_buffer(&wgpu::BufferDescriptor {
                label: Some("easel canvas ibo"),
                size: (cap * std::mem::size_of::<u32>()) as u64,
                usage: wgpu::BufferUsages::INDEX | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            }));
            self.index_capacity = cap;
        }
    }
}

/// Index list with invalid triangles removed. Borrows when nothing was dropped.
pub(crate) fn drawable_indices(mesh: &Mesh) -> Cow<'_, [u32]> {
    let Err(first) = mesh.validate() else {
        return Cow::Borrowed(&mesh.indices);
    };

    let mut kept = Vec::with_capacity(mesh.indices.len());
    let mut dropped = 0usize;
    for (t, tri) in mesh.indices.chunks_exact(3).enumerate() {
        match mesh.check_triangle(t) {
            Ok(_) => kept.extend_from_slice(tri),
            Err(_) => dropped += 1,
        }
    }
    let trailing = mesh.indices.len() % 3;
    log::warn!(
        "dropping {dropped} invalid triangle(s) and {trailing} trailing index(es); first error: {first}"
    );
    Cow::Owned(kept)
}
