//! Ground plane and grid geometry.

use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;

use crate::renderer::uniforms::StageUniforms;
use crate::viewer::{StageConfig, hex_to_linear};

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct StageVertex {
    pub position: [f32; 3],
}

/// Lift of the grid above the ground so the lines win the depth test.
pub const GRID_LIFT: f32 = 0.5;

/// Two triangles covering a `size` x `size` square on the XZ plane,
/// wound counter-clockwise when seen from above.
#[must_use]
pub fn ground_quad(size: f32) -> [StageVertex; 6] {
    let h = size * 0.5;
    let v = |x: f32, z: f32| StageVertex {
        position: [x, 0.0, z],
    };
    [v(-h, -h), v(-h, h), v(h, h), v(-h, -h), v(h, h), v(h, -h)]
}

/// Line list of a square grid with `divisions` cells per side.
///
/// Produces `divisions + 1` lines along each axis.
#[must_use]
pub fn grid_lines(size: f32, divisions: u32) -> Vec<StageVertex> {
    let divisions = divisions.max(1);
    let h = size * 0.5;
    let step = size / divisions as f32;
    let mut vertices = Vec::with_capacity(((divisions + 1) * 4) as usize);

    for i in 0..=divisions {
        let k = -h + step * i as f32;
        vertices.push(StageVertex {
            position: [-h, GRID_LIFT, k],
        });
        vertices.push(StageVertex {
            position: [h, GRID_LIFT, k],
        });
        vertices.push(StageVertex {
            position: [k, GRID_LIFT, -h],
        });
        vertices.push(StageVertex {
            position: [k, GRID_LIFT, h],
        });
    }
    vertices
}

/// GPU buffers of the ground and grid for one [`StageConfig`].
pub struct GpuStage {
    ground_vertices: wgpu::Buffer,
    ground_bind_group: wgpu::BindGroup,
    grid_vertices: wgpu::Buffer,
    grid_vertex_count: u32,
    grid_bind_group: wgpu::BindGroup,
}

impl GpuStage {
    #[must_use]
    pub fn new(device: &wgpu::Device, layout: &wgpu::BindGroupLayout, stage: &StageConfig) -> Self {
        let uniform_group = |label: &str, uniforms: StageUniforms| {
            let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(label),
                contents: bytemuck::bytes_of(&uniforms),
                usage: wgpu::BufferUsages::UNIFORM,
            });
            device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some(label),
                layout,
                entries: &[wgpu::BindGroupEntry {
                    binding: 0,
                    resource: buffer.as_entire_binding(),
                }],
            })
        };

        let [r, g, b] = hex_to_linear(stage.ground_color);
        let ground_bind_group = uniform_group(
            "Ground Uniforms",
            StageUniforms {
                color: [r, g, b, 1.0],
                params: [1.0, 0.0, 0.0, 0.0],
            },
        );

        let [r, g, b] = hex_to_linear(stage.grid_color);
        let grid_bind_group = uniform_group(
            "Grid Uniforms",
            StageUniforms {
                color: [r, g, b, stage.grid_opacity.clamp(0.0, 1.0)],
                params: [0.0; 4],
            },
        );

        let ground_vertices = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Ground Vertices"),
            contents: bytemuck::cast_slice(&ground_quad(stage.ground_size)),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let lines = grid_lines(stage.ground_size, stage.grid_divisions);
        let grid_vertices = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Grid Vertices"),
            contents: bytemuck::cast_slice(&lines),
            usage: wgpu::BufferUsages::VERTEX,
        });

        Self {
            ground_vertices,
            ground_bind_group,
            grid_vertices,
            grid_vertex_count: lines.len() as u32,
            grid_bind_group,
        }
    }

    pub fn draw_ground(&self, pass: &mut wgpu::RenderPass<'_>) {
        pass.set_bind_group(1, &self.ground_bind_group, &[]);
        pass.set_vertex_buffer(0, self.ground_vertices.slice(..));
        pass.draw(0..6, 0..1);
    }

    pub fn draw_grid(&self, pass: &mut wgpu::RenderPass<'_>) {
        pass.set_bind_group(1, &self.grid_bind_group, &[]);
        pass.set_vertex_buffer(0, self.grid_vertices.slice(..));
        pass.draw(0..self.grid_vertex_count, 0..1);
    }
}
