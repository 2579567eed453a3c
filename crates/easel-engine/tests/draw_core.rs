use easel_engine::mesh::{Mesh, Vertex};
use easel_engine::paint::{Color, VertexKind};
use easel_engine::projection::{Projection, Viewport};
use easel_engine::raster::{rasterize, FrameBuffer};
use easel_engine::render::BlendMode;
use easel_engine::shade::{
    project_vertex, resolve_paint, AtlasSampler, CpuAtlases, FragmentInput, LayeredImage,
    Projections,
};
use easel_engine::device::{Gpu, GpuInit, OffscreenTarget};
use easel_engine::render::{
    AtlasKind, AtlasTexture, Atlases, CanvasRenderer, RenderTarget, RendererConfig,
};
use glam::{Mat4, Vec2, Vec3, Vec4};

fn raw_vertex(position: [f32; 2], color: [f32; 4], kind: u32, texture: u32) -> Vertex {
    Vertex {
        position,
        color,
        kind,
        texture,
        tex_coords: [0.25, 0.75],
    }
}

fn fragment_of(v: &Vertex, projections: &Projections, atlases: &impl AtlasSampler) -> Color {
    let out = project_vertex(v, projections);
    resolve_paint(&FragmentInput::from(&out), atlases)
}

#[test]
fn world_flat_vertex_passes_through_identity() {
    let v = raw_vertex([10.0, 10.0], [1.0, 0.0, 0.0, 1.0], 0, 0);
    let projections = Projections::new(Mat4::IDENTITY, Mat4::from_scale(Vec3::splat(2.0)));

    let out = project_vertex(&v, &projections);
    assert_eq!(out.clip_position, Vec4::new(10.0, 10.0, 0.0, 1.0));
    assert_eq!(
        fragment_of(&v, &projections, &CpuAtlases::empty()),
        Color::new(1.0, 0.0, 0.0, 1.0)
    );
}

#[test]
fn mask_coverage_scales_tint_alpha() {
    let mut mask = LayeredImage::new(2, 2, 2);
    // tex_coords (0.25, 0.75) sit on the centre of texel (0, 1).
    mask.set(1, 0, 1, 0.4);
    let atlases = CpuAtlases::new(mask, LayeredImage::new(1, 1, 1));

    let v = raw_vertex([0.0, 0.0], [0.0, 0.0, 1.0, 0.5], 1, 1);
    assert_eq!(
        fragment_of(&v, &Projections::IDENTITY, &atlases),
        Color::new(0.0, 0.0, 1.0, 0.2)
    );
}

#[test]
fn color_atlas_ignores_vertex_color() {
    let sprite = Color::new(0.2, 0.3, 0.4, 0.9);
    let atlases = CpuAtlases::new(
        LayeredImage::new(1, 1, 1),
        LayeredImage::filled(2, 2, 1, sprite),
    );

    let v = raw_vertex([0.0, 0.0], [1.0, 1.0, 1.0, 1.0], 5, 0);
    assert_eq!(fragment_of(&v, &Projections::IDENTITY, &atlases), sprite);
}

#[test]
fn unknown_kind_uses_viewport_projection_and_is_transparent() {
    let world = Mat4::from_translation(Vec3::new(100.0, 0.0, 0.0));
    let viewport = Mat4::from_translation(Vec3::new(0.0, 7.0, 0.0));
    let projections = Projections::new(world, viewport);

    let v = raw_vertex([1.0, 1.0], [1.0, 1.0, 1.0, 1.0], 99, 0);
    let out = project_vertex(&v, &projections);
    assert_eq!(out.clip_position, Vec4::new(1.0, 8.0, 0.0, 1.0));
    assert_eq!(
        fragment_of(&v, &projections, &CpuAtlases::empty()),
        Color::TRANSPARENT
    );
}

#[test]
fn label_over_panned_scene() {
    easel_engine::logging::init_logging(Default::default());

    let mut camera = Projection::new(Viewport::new(16.0, 8.0));
    camera.pan_by(Vec2::new(8.0, 0.0));

    // Scene: a world-space backdrop, then a viewport-space glyph on top.
    let backdrop = Mesh::new_color_quad(
        Vec2::ZERO,
        Vec2::new(8.0, 8.0),
        VertexKind::Color(Color::BLACK),
    );
    let glyph = Mesh::new_texture_quad(
        Vec2::new(10.0, 2.0),
        Vec2::new(12.0, 4.0),
        0,
        Vec2::ZERO,
        Vec2::ONE,
        VertexKind::MaskTextureViewport(Color::WHITE),
    );
    let mesh = Mesh::from_slice(&[backdrop, glyph]);
    mesh.validate().expect("scene mesh is well formed");

    let atlases = CpuAtlases::new(LayeredImage::filled(2, 2, 1, 1.0), LayeredImage::new(1, 1, 1));
    let mut fb = FrameBuffer::new(16, 8);
    let stats = rasterize(&mesh, &camera.projections(), &atlases, BlendMode::Straight, &mut fb);

    assert_eq!(stats.triangles_drawn, 4);
    assert_eq!(stats.triangles_skipped, 0);
    assert_eq!(fb.get(2, 2), Some(Color::TRANSPARENT));
    assert_eq!(fb.get(9, 6), Some(Color::BLACK));
    assert_eq!(fb.get(11, 3), Some(Color::WHITE));
}

fn gpu_setup(size: u32) -> anyhow::Result<(Gpu, OffscreenTarget, AtlasTexture, AtlasTexture)> {
    easel_engine::logging::init_logging(Default::default());

    let gpu = Gpu::new_blocking(GpuInit::default())?;
    let target = gpu.create_target(size, size, wgpu::TextureFormat::Rgba8Unorm)?;

    // Uniform atlases: every filter and level yields the stored value.
    let mask = AtlasTexture::new(gpu.device(), AtlasKind::Mask, 8, 8, 1, 1)?;
    mask.write_region(gpu.queue(), 0, 0, (0, 0), (8, 8), &[102; 64])?;
    let color = AtlasTexture::new(gpu.device(), AtlasKind::Color, 8, 8, 1, 1)?;
    let texel = [51u8, 77, 102, 230];
    color.write_region(gpu.queue(), 0, 0, (0, 0), (8, 8), &texel.repeat(64))?;

    Ok((gpu, target, mask, color))
}

fn pixel(rgba: &[u8], width: u32, x: u32, y: u32) -> [u8; 4] {
    let i = ((y * width + x) * 4) as usize;
    [rgba[i], rgba[i + 1], rgba[i + 2], rgba[i + 3]]
}

fn assert_pixel_near(actual: [u8; 4], expected: [u8; 4], what: &str) {
    let close = actual
        .iter()
        .zip(expected)
        .all(|(&a, e)| a.abs_diff(e) <= 1);
    assert!(close, "{what}: got {actual:?}, expected {expected:?}");
}

/// Needs a GPU adapter; run with `cargo test -- --ignored`.
#[test]
#[ignore]
fn gpu_matches_reference_paint_strategies() -> anyhow::Result<()> {
    let (gpu, target, mask, color) = gpu_setup(64)?;
    let format = target.format;

    let camera = Projection::new(Viewport::new(64.0, 64.0));
    let flat = Mesh::new_color_quad(
        Vec2::ZERO,
        Vec2::splat(16.0),
        VertexKind::Color(Color::new(1.0, 0.0, 0.0, 1.0)),
    );
    let masked = Mesh::new_texture_quad(
        Vec2::new(16.0, 0.0),
        Vec2::new(32.0, 16.0),
        0,
        Vec2::ZERO,
        Vec2::ONE,
        VertexKind::MaskTextureViewport(Color::new(0.0, 0.0, 1.0, 0.5)),
    );
    let sprite = Mesh::new_texture_quad(
        Vec2::new(32.0, 0.0),
        Vec2::new(48.0, 16.0),
        0,
        Vec2::ZERO,
        Vec2::ONE,
        VertexKind::ColorTextureViewport,
    );
    let mesh = Mesh::from_slice(&[flat, masked, sprite]);

    let mut renderer = CanvasRenderer::new(RendererConfig {
        blend: BlendMode::Replace,
        clear_color: Some(Color::TRANSPARENT),
        ..RendererConfig::default()
    });
    let ctx = gpu.render_ctx(format);
    let mut encoder = gpu.create_encoder("easel test encoder");
    renderer.render(
        &ctx,
        &mut RenderTarget::offscreen(&mut encoder, &target),
        &mesh,
        &camera.projections(),
        Atlases {
            mask: &mask,
            color: &color,
        },
    );
    gpu.submit(encoder);

    let rgba = gpu.read_rgba8(&target)?;
    assert_pixel_near(pixel(&rgba, 64, 8, 8), [255, 0, 0, 255], "flat color");
    // 0.5 tint alpha * 0.4 coverage
    assert_pixel_near(pixel(&rgba, 64, 24, 8), [0, 0, 255, 51], "mask");
    assert_pixel_near(pixel(&rgba, 64, 40, 8), [51, 77, 102, 230], "color atlas");
    assert_pixel_near(pixel(&rgba, 64, 56, 8), [0, 0, 0, 0], "untouched");
    Ok(())
}

/// Needs a GPU adapter; run with `cargo test -- --ignored`.
#[test]
#[ignore]
fn gpu_batches_on_one_encoder_keep_their_own_data() -> anyhow::Result<()> {
    let (gpu, target, mask, color) = gpu_setup(64)?;
    let format = target.format;

    let first = Mesh::new_color_quad(Vec2::ZERO, Vec2::splat(8.0), VertexKind::Color(Color::WHITE));
    let second = Mesh::new_color_quad(
        Vec2::ZERO,
        Vec2::splat(8.0),
        VertexKind::Color(Color::new(0.0, 1.0, 0.0, 1.0)),
    );
    let still = Projection::new(Viewport::new(64.0, 64.0));
    let mut panned = still.clone();
    panned.pan_by(Vec2::splat(32.0));

    // A fresh target reads back as zero, so loading it is enough.
    let mut renderer = CanvasRenderer::new(RendererConfig::default());
    let ctx = gpu.render_ctx(format);
    let atlases = Atlases {
        mask: &mask,
        color: &color,
    };
    let mut encoder = gpu.create_encoder("easel batch encoder");
    {
        let mut rt = RenderTarget::offscreen(&mut encoder, &target);
        renderer.render(&ctx, &mut rt, &first, &still.projections(), atlases);
        renderer.render(&ctx, &mut rt, &second, &panned.projections(), atlases);
    }
    gpu.submit(encoder);

    let rgba = gpu.read_rgba8(&target)?;
    assert_pixel_near(pixel(&rgba, 64, 4, 4), [255, 255, 255, 255], "first batch");
    assert_pixel_near(pixel(&rgba, 64, 36, 36), [0, 255, 0, 255], "second batch");
    Ok(())
}
