//! Forward renderer for the character viewer.
//!
//! Each frame renders the character into the directional light's shadow
//! map, clears to the stage background, draws the ground, the character
//! and the grid in one (optionally multisampled) pass, then lets overlay
//! nodes (the UI) record into the resolved surface texture.
//!
//! ```rust,ignore
//! if let Some(composer) = renderer.begin_frame(&camera) {
//!     composer.add_overlay(&mut ui_pass).render();
//! }
//! ```

pub mod context;
pub mod gpu_model;
pub mod pipelines;
pub mod settings;
pub mod shadow;
pub mod stage;
pub mod uniforms;

use std::sync::Arc;

use wgpu::util::DeviceExt;

pub use context::WgpuContext;
pub use gpu_model::GpuModel;
pub use settings::RenderSettings;
pub use shadow::{ShadowMap, light_view_projection};
pub use uniforms::{GlobalUniforms, MeshUniforms, StageUniforms};

use crate::errors::Result;
use crate::renderer::pipelines::{Layouts, Pipelines};
use crate::renderer::stage::GpuStage;
use crate::scene::{Model, PerspectiveCamera};
use crate::viewer::{StageConfig, hex_to_linear};

/// Records extra GPU work into a frame after the scene pass.
pub trait OverlayNode {
    /// Returned command buffers are submitted before the frame's encoder.
    fn run(
        &mut self,
        ctx: &WgpuContext,
        encoder: &mut wgpu::CommandEncoder,
        view: &wgpu::TextureView,
    ) -> Vec<wgpu::CommandBuffer>;
}

struct GpuState {
    context: WgpuContext,
    layouts: Layouts,
    pipelines: Pipelines,
    global_buffer: wgpu::Buffer,
    global_bind_group: wgpu::BindGroup,
    shadow_map: ShadowMap,
    shadow_bind_group: wgpu::BindGroup,
    stage: GpuStage,
    model: Option<GpuModel>,
}

impl GpuState {
    /// Recreates the shadow map and the global bind group that samples it.
    fn rebuild_shadow_map(&mut self, stage: &StageConfig) {
        let device = &self.context.device;
        self.shadow_map = ShadowMap::new(device, stage.directional.shadow.as_ref());
        self.global_bind_group =
            create_global_bind_group(device, &self.layouts, &self.global_buffer, &self.shadow_map);
    }
}

fn create_global_bind_group(
    device: &wgpu::Device,
    layouts: &Layouts,
    buffer: &wgpu::Buffer,
    shadow_map: &ShadowMap,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("Global BindGroup"),
        layout: &layouts.global,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::TextureView(&shadow_map.view),
            },
            wgpu::BindGroupEntry {
                binding: 2,
                resource: wgpu::BindingResource::Sampler(&shadow_map.sampler),
            },
        ],
    })
}

pub struct Renderer {
    settings: RenderSettings,
    stage: StageConfig,
    gpu: Option<GpuState>,
}

fn background_color(stage: &StageConfig) -> wgpu::Color {
    let [r, g, b] = hex_to_linear(stage.background);
    wgpu::Color {
        r: f64::from(r),
        g: f64::from(g),
        b: f64::from(b),
        a: 1.0,
    }
}

impl Renderer {
    /// Creates the renderer. GPU resources are created by [`init`](Self::init).
    #[must_use]
    pub fn new(settings: RenderSettings, stage: StageConfig) -> Self {
        Self {
            settings,
            stage,
            gpu: None,
        }
    }

    pub async fn init<W>(&mut self, window: Arc<W>, width: u32, height: u32) -> Result<()>
    where
        W: raw_window_handle::HasWindowHandle
            + raw_window_handle::HasDisplayHandle
            + Send
            + Sync
            + 'static,
    {
        let mut context = WgpuContext::new(window, &self.settings, width, height).await?;
        context.clear_color = background_color(&self.stage);

        let device = &context.device;
        let layouts = Layouts::new(device);
        let pipelines = Pipelines::new(
            device,
            &layouts,
            context.color_format(),
            context.depth_format,
            context.msaa_samples,
        );

        let global_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Global Uniforms"),
            contents: bytemuck::bytes_of(&GlobalUniforms::default()),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let shadow_map = ShadowMap::new(device, self.stage.directional.shadow.as_ref());
        let global_bind_group =
            create_global_bind_group(device, &layouts, &global_buffer, &shadow_map);
        let shadow_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Shadow Global BindGroup"),
            layout: &layouts.shadow_global,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: global_buffer.as_entire_binding(),
            }],
        });
        let stage = GpuStage::new(device, &layouts.stage, &self.stage);

        log::info!(
            "Renderer ready: {}x{} {:?}, MSAA x{}, shadow map {}",
            context.config.width,
            context.config.height,
            context.color_format(),
            context.msaa_samples,
            shadow_map.size
        );

        self.gpu = Some(GpuState {
            context,
            layouts,
            pipelines,
            global_buffer,
            global_bind_group,
            shadow_map,
            shadow_bind_group,
            stage,
            model: None,
        });
        Ok(())
    }

    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.gpu.is_some()
    }

    #[must_use]
    pub fn context(&self) -> Option<&WgpuContext> {
        self.gpu.as_ref().map(|gpu| &gpu.context)
    }

    #[must_use]
    pub fn settings(&self) -> &RenderSettings {
        &self.settings
    }

    #[must_use]
    pub fn stage(&self) -> &StageConfig {
        &self.stage
    }

    /// Replaces the ground, grid, lights and fog.
    pub fn set_stage(&mut self, stage: StageConfig) {
        if let Some(gpu) = &mut self.gpu {
            gpu.stage = GpuStage::new(&gpu.context.device, &gpu.layouts.stage, &stage);
            gpu.context.clear_color = background_color(&stage);
            if stage.directional.shadow.map(|s| s.map_size)
                != self.stage.directional.shadow.map(|s| s.map_size)
            {
                gpu.rebuild_shadow_map(&stage);
            }
        }
        self.stage = stage;
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        if let Some(gpu) = &mut self.gpu {
            gpu.context.resize(width, height);
        }
    }

    /// Uploads the character geometry, replacing any previous upload.
    pub fn upload_model(&mut self, model: &Model) {
        if let Some(gpu) = &mut self.gpu {
            gpu.model = Some(GpuModel::new(&gpu.context.device, &gpu.layouts.mesh, model));
        }
    }

    #[must_use]
    pub fn has_model(&self) -> bool {
        self.gpu.as_ref().is_some_and(|gpu| gpu.model.is_some())
    }

    /// Copies the posed character into its GPU buffers.
    pub fn update_model(&self, model: &Model) {
        if let Some(gpu) = &self.gpu
            && let Some(gpu_model) = &gpu.model
        {
            gpu_model.update(&gpu.context.queue, model);
        }
    }

    /// Writes per-frame uniforms and returns a composer for this frame.
    ///
    /// Returns `None` before initialization.
    pub fn begin_frame(&mut self, camera: &PerspectiveCamera) -> Option<FrameComposer<'_>> {
        let gpu = self.gpu.as_mut()?;
        let globals = GlobalUniforms::new(camera, &self.stage);
        gpu.context
            .queue
            .write_buffer(&gpu.global_buffer, 0, bytemuck::bytes_of(&globals));

        let shadow = self.stage.directional.shadow;
        Some(FrameComposer {
            gpu,
            shadows: shadow.is_some(),
            model_casts: shadow.is_some_and(|s| s.model_casts),
            overlays: Vec::new(),
        })
    }
}

/// Collects overlay nodes for one frame, then records and presents it.
pub struct FrameComposer<'a> {
    gpu: &'a mut GpuState,
    shadows: bool,
    model_casts: bool,
    overlays: Vec<&'a mut dyn OverlayNode>,
}

impl<'a> FrameComposer<'a> {
    #[must_use]
    pub fn add_overlay(mut self, node: &'a mut dyn OverlayNode) -> Self {
        self.overlays.push(node);
        self
    }

    pub fn render(self) {
        let Self {
            gpu,
            shadows,
            model_casts,
            overlays,
        } = self;

        let output = match gpu.context.surface.get_current_texture() {
            wgpu::CurrentSurfaceTexture::Success(output)
            | wgpu::CurrentSurfaceTexture::Suboptimal(output) => output,
            wgpu::CurrentSurfaceTexture::Lost | wgpu::CurrentSurfaceTexture::Outdated => {
                gpu.context.reconfigure();
                return;
            }
            e => {
                log::error!("Render error: {e:?}");
                return;
            }
        };
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder =
            gpu.context
                .device
                .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                    label: Some("Frame Encoder"),
                });

        if shadows {
            // Cleared even without casters so the ground reads as lit
            gpu.shadow_map.record(&mut encoder, |pass| {
                if model_casts && let Some(model) = &gpu.model {
                    pass.set_pipeline(&gpu.pipelines.shadow);
                    pass.set_bind_group(0, &gpu.shadow_bind_group, &[]);
                    model.draw(pass);
                }
            });
        }

        // MSAA renders into the multisampled target and resolves into the
        // surface; the multisampled contents are not kept.
        let (color_view, resolve_target, store) = match gpu.context.msaa_view() {
            Some(msaa) => (msaa, Some(&view), wgpu::StoreOp::Discard),
            None => (&view, None, wgpu::StoreOp::Store),
        };

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Scene Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: color_view,
                    resolve_target,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(gpu.context.clear_color),
                        store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: gpu.context.depth_view(),
                    depth_ops: Some(wgpu::Operations {
                        // Reverse Z: clear to the far plane
                        load: wgpu::LoadOp::Clear(0.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

            pass.set_bind_group(0, &gpu.global_bind_group, &[]);

            pass.set_pipeline(&gpu.pipelines.ground);
            gpu.stage.draw_ground(&mut pass);

            if let Some(model) = &gpu.model {
                pass.set_pipeline(&gpu.pipelines.mesh);
                model.draw(&mut pass);
            }

            pass.set_pipeline(&gpu.pipelines.grid);
            gpu.stage.draw_grid(&mut pass);
        }

        let mut command_buffers = Vec::new();
        for overlay in overlays {
            command_buffers.extend(overlay.run(&gpu.context, &mut encoder, &view));
        }
        command_buffers.push(encoder.finish());

        gpu.context.queue.submit(command_buffers);
        output.present();
    }
}
