use crate::mesh::Vertex;

use super::config::RendererConfig;

pub(crate) const SHADER_SOURCE: &str = include_str!("shaders/canvas.wgsl");

/// Size of one `mat4x4<f32>` uniform.
pub(crate) const PROJECTION_UNIFORM_SIZE: u64 = 64;

/// Bind group layouts of the draw core.
///
/// group 0: `world_projection`, `viewport_projection` (vertex)
/// group 1: `mask_atlas`, `color_atlas`, `tex_sampler` (fragment)
#[derive(Debug)]
pub struct Layouts {
    pub projection: wgpu::BindGroupLayout,
    pub atlases: wgpu::BindGroupLayout,
}

impl Layouts {
    pub fn new(device: &wgpu::Device) -> Self {
        Self {
            projection: Self::projection_layout(device),
            atlases: Self::atlas_layout(device),
        }
    }

    fn projection_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
        let matrix = |binding| wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::VERTEX,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: wgpu::BufferSize::new(PROJECTION_UNIFORM_SIZE),
            },
            count: None,
        };

        device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("easel projection bgl"),
            entries: &[matrix(0), matrix(1)],
        })
    }

    fn atlas_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
        let atlas = |binding| wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Texture {
                sample_type: wgpu::TextureSampleType::Float { filterable: true },
                view_dimension: wgpu::TextureViewDimension::D2Array,
                multisampled: false,
            },
            count: None,
        };

        device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("easel atlas bgl"),
            entries: &[
                atlas(0),
                atlas(1),
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        })
    }
}

/// Compiled draw-core pipeline for one target format.
#[derive(Debug)]
pub struct CanvasPipeline {
    pub render_pipeline: wgpu::RenderPipeline,
    pub layouts: Layouts,
    pub sampler: wgpu::Sampler,
    pub format: wgpu::TextureFormat,
}

impl CanvasPipeline {
    pub fn new(
        device: &wgpu::Device,
        format: wgpu::TextureFormat,
        config: &RendererConfig,
    ) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("easel canvas shader"),
            source: wgpu::ShaderSource::Wgsl(SHADER_SOURCE.into()),
        });

        let layouts = Layouts::new(device);
        let sampler = device.create_sampler(&config.sampler.descriptor());

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("easel canvas pipeline layout"),
            bind_group_layouts: &[&layouts.projection, &layouts.atlases],
            immediate_size: 0,
        });

        let render_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("easel canvas pipeline"),
            layout: Some(&pipeline_layout),

            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[Vertex::buffer_layout()],
            },

            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format,
                    blend: config.blend.blend_state(),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),

            // Producers emit either winding; nothing is culled.
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },

            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });

        log::debug!("canvas pipeline created for {format:?}");

        Self {
            render_pipeline,
            layouts,
            sampler,
            format,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compact(src: &str) -> String {
        src.split_whitespace().collect::<Vec<_>>().join(" ")
    }

    #[test]
    fn selectors_cross_stages_flat() {
        let src = compact(SHADER_SOURCE);
        assert!(src.contains("@location(1) @interpolate(flat) kind: u32"));
        assert!(src.contains("@location(2) @interpolate(flat) texture_layer: u32"));
    }

    #[test]
    fn interpolated_attributes_stay_smooth() {
        let src = compact(SHADER_SOURCE);
        assert!(src.contains("@location(0) color: vec4<f32>"));
        assert!(src.contains("@location(3) tex_coords: vec2<f32>"));
        // Only the two selectors are flat.
        assert_eq!(src.matches("@interpolate(flat)").count(), 2);
    }

    #[test]
    fn vertex_inputs_match_buffer_layout() {
        let src = compact(SHADER_SOURCE);
        for decl in [
            "@location(0) position: vec2<f32>",
            "@location(1) color: vec4<f32>",
            "@location(2) kind: u32",
            "@location(3) texture_layer: u32",
            "@location(4) tex_coords: vec2<f32>",
        ] {
            assert!(src.contains(decl), "missing `{decl}`");
        }
    }

    #[test]
    fn bindings_match_layouts() {
        let src = compact(SHADER_SOURCE);
        for decl in [
            "@group(0) @binding(0) var<uniform> world_projection: mat4x4<f32>",
            "@group(0) @binding(1) var<uniform> viewport_projection: mat4x4<f32>",
            "@group(1) @binding(0) var mask_atlas: texture_2d_array<f32>",
            "@group(1) @binding(1) var color_atlas: texture_2d_array<f32>",
            "@group(1) @binding(2) var tex_sampler: sampler",
        ] {
            assert!(src.contains(decl), "missing `{decl}`");
        }
    }

    #[test]
    fn mask_reads_level_zero_and_color_uses_default_level() {
        let src = compact(SHADER_SOURCE);
        assert!(src.contains(
            "textureSampleLevel(mask_atlas, tex_sampler, in.tex_coords, in.texture_layer, 0.0)"
        ));
        assert!(src.contains("textureSample(color_atlas, tex_sampler, in.tex_coords, in.texture_layer)"));
    }

    fn parse_and_validate() -> naga::Module {
        let module = naga::front::wgsl::parse_str(SHADER_SOURCE).expect("canvas.wgsl parses");
        naga::valid::Validator::new(
            naga::valid::ValidationFlags::all(),
            naga::valid::Capabilities::default(),
        )
        .validate(&module)
        .expect("canvas.wgsl validates");
        module
    }

    fn member_interpolation(
        module: &naga::Module,
        struct_name: &str,
        member: &str,
    ) -> Option<naga::Interpolation> {
        module
            .types
            .iter()
            .filter(|(_, ty)| ty.name.as_deref() == Some(struct_name))
            .find_map(|(_, ty)| match &ty.inner {
                naga::TypeInner::Struct { members, .. } => members
                    .iter()
                    .find(|m| m.name.as_deref() == Some(member))
                    .and_then(|m| match &m.binding {
                        Some(naga::Binding::Location { interpolation, .. }) => *interpolation,
                        _ => None,
                    }),
                _ => None,
            })
    }

    #[test]
    fn shader_validates_with_both_entry_points() {
        let module = parse_and_validate();
        let stages: Vec<_> = module
            .entry_points
            .iter()
            .map(|ep| (ep.name.as_str(), ep.stage))
            .collect();
        assert!(stages.contains(&("vs_main", naga::ShaderStage::Vertex)));
        assert!(stages.contains(&("fs_main", naga::ShaderStage::Fragment)));
    }

    #[test]
    fn selectors_are_flat_in_shader_ir() {
        let module = parse_and_validate();
        for member in ["kind", "texture_layer"] {
            assert_eq!(
                member_interpolation(&module, "VertexOutput", member),
                Some(naga::Interpolation::Flat),
                "`{member}` must not be interpolated"
            );
        }
        for member in ["color", "tex_coords"] {
            assert_ne!(
                member_interpolation(&module, "VertexOutput", member),
                Some(naga::Interpolation::Flat),
                "`{member}` must interpolate"
            );
        }
    }

    #[test]
    fn projection_uniform_is_one_mat4() {
        assert_eq!(PROJECTION_UNIFORM_SIZE as usize, std::mem::size_of::<glam::Mat4>());
    }
}
