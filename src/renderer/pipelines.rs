//! Bind group layouts and render pipelines.

use std::borrow::Cow;

use crate::renderer::shadow::SHADOW_FORMAT;
use crate::renderer::stage::StageVertex;
use crate::scene::SkinnedVertex;

const COMMON_WGSL: &str = include_str!("shaders/common.wgsl");
const SKINNED_WGSL: &str = include_str!("shaders/skinned.wgsl");
const STAGE_WGSL: &str = include_str!("shaders/stage.wgsl");

fn shader_module(device: &wgpu::Device, label: &str, body: &str) -> wgpu::ShaderModule {
    device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(label),
        source: wgpu::ShaderSource::Wgsl(Cow::Owned(format!("{COMMON_WGSL}\n{body}"))),
    })
}

fn uniform_entry(binding: u32, visibility: wgpu::ShaderStages) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

/// Layouts shared by the pipelines and the bind groups built against them.
pub struct Layouts {
    /// Group 0: [`GlobalUniforms`](crate::renderer::GlobalUniforms), the
    /// shadow map and its comparison sampler.
    pub global: wgpu::BindGroupLayout,
    /// Group 0 of the shadow pass: the global uniforms alone, since the
    /// shadow map is the pass's attachment.
    pub shadow_global: wgpu::BindGroupLayout,
    /// Group 1 of the mesh pipeline: mesh uniforms and joint palette.
    pub mesh: wgpu::BindGroupLayout,
    /// Group 1 of the stage pipelines.
    pub stage: wgpu::BindGroupLayout,
}

impl Layouts {
    #[must_use]
    pub fn new(device: &wgpu::Device) -> Self {
        let global = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Global Layout"),
            entries: &[
                uniform_entry(0, wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT),
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Depth,
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Comparison),
                    count: None,
                },
            ],
        });

        let shadow_global = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Shadow Global Layout"),
            entries: &[uniform_entry(0, wgpu::ShaderStages::VERTEX)],
        });

        let mesh = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Mesh Layout"),
            entries: &[
                uniform_entry(0, wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT),
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::VERTEX,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Storage { read_only: true },
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
            ],
        });

        let stage = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Stage Layout"),
            entries: &[uniform_entry(
                0,
                wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
            )],
        });

        Self {
            global,
            shadow_global,
            mesh,
            stage,
        }
    }
}

/// Reverse-Z depth state.
fn depth_state(format: wgpu::TextureFormat, write: bool) -> wgpu::DepthStencilState {
    wgpu::DepthStencilState {
        format,
        depth_write_enabled: Some(write),
        depth_compare: Some(wgpu::CompareFunction::GreaterEqual),
        stencil: wgpu::StencilState::default(),
        bias: wgpu::DepthBiasState::default(),
    }
}

pub struct Pipelines {
    pub mesh: wgpu::RenderPipeline,
    /// Depth-only skinned pipeline of the shadow pass.
    pub shadow: wgpu::RenderPipeline,
    pub ground: wgpu::RenderPipeline,
    pub grid: wgpu::RenderPipeline,
}

impl Pipelines {
    #[must_use]
    pub fn new(
        device: &wgpu::Device,
        layouts: &Layouts,
        color_format: wgpu::TextureFormat,
        depth_format: wgpu::TextureFormat,
        sample_count: u32,
    ) -> Self {
        let multisample = wgpu::MultisampleState {
            count: sample_count,
            ..Default::default()
        };
        let skinned_shader = shader_module(device, "Skinned Mesh Shader", SKINNED_WGSL);
        let stage_shader = shader_module(device, "Stage Shader", STAGE_WGSL);

        let mesh_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Skinned Mesh Pipeline Layout"),
            bind_group_layouts: &[Some(&layouts.global), Some(&layouts.mesh)],
            immediate_size: 0,
        });
        let shadow_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Shadow Pipeline Layout"),
            bind_group_layouts: &[Some(&layouts.shadow_global), Some(&layouts.mesh)],
            immediate_size: 0,
        });
        let stage_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Stage Pipeline Layout"),
            bind_group_layouts: &[Some(&layouts.global), Some(&layouts.stage)],
            immediate_size: 0,
        });

        let skinned_attributes = wgpu::vertex_attr_array![
            0 => Float32x3,
            1 => Float32x3,
            2 => Uint32x4,
            3 => Float32x4,
        ];
        let skinned_buffer = wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<SkinnedVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &skinned_attributes,
        };

        let stage_attributes = wgpu::vertex_attr_array![0 => Float32x3];
        let stage_buffer = wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<StageVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &stage_attributes,
        };

        let mesh = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Skinned Mesh Pipeline"),
            layout: Some(&mesh_layout),
            vertex: wgpu::VertexState {
                module: &skinned_shader,
                entry_point: Some("vs_main"),
                buffers: &[skinned_buffer.clone()],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &skinned_shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: color_format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                cull_mode: Some(wgpu::Face::Back),
                ..Default::default()
            },
            depth_stencil: Some(depth_state(depth_format, true)),
            multisample,
            multiview_mask: None,
            cache: None,
        });

        let shadow = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Shadow Pipeline"),
            layout: Some(&shadow_layout),
            vertex: wgpu::VertexState {
                module: &skinned_shader,
                entry_point: Some("vs_shadow"),
                buffers: &[skinned_buffer.clone()],
                compilation_options: Default::default(),
            },
            fragment: None,
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                cull_mode: None,
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: SHADOW_FORMAT,
                depth_write_enabled: Some(true),
                depth_compare: Some(wgpu::CompareFunction::LessEqual),
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState {
                    constant: 2,
                    slope_scale: 2.0,
                    clamp: 0.0,
                },
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });

        let stage_pipeline = |label: &str,
                              topology: wgpu::PrimitiveTopology,
                              blend: wgpu::BlendState,
                              depth_write: bool| {
            device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(label),
                layout: Some(&stage_layout),
                vertex: wgpu::VertexState {
                    module: &stage_shader,
                    entry_point: Some("vs_main"),
                    buffers: &[stage_buffer.clone()],
                    compilation_options: Default::default(),
                },
                fragment: Some(wgpu::FragmentState {
                    module: &stage_shader,
                    entry_point: Some("fs_main"),
                    targets: &[Some(wgpu::ColorTargetState {
                        format: color_format,
                        blend: Some(blend),
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                    compilation_options: Default::default(),
                }),
                primitive: wgpu::PrimitiveState {
                    topology,
                    ..Default::default()
                },
                depth_stencil: Some(depth_state(depth_format, depth_write)),
                multisample,
                multiview_mask: None,
                cache: None,
            })
        };

        let ground = stage_pipeline(
            "Ground Pipeline",
            wgpu::PrimitiveTopology::TriangleList,
            wgpu::BlendState::REPLACE,
            true,
        );
        let grid = stage_pipeline(
            "Grid Pipeline",
            wgpu::PrimitiveTopology::LineList,
            wgpu::BlendState::ALPHA_BLENDING,
            false,
        );

        Self {
            mesh,
            shadow,
            ground,
            grid,
        }
    }
}
