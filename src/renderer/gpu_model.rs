//! GPU mirror of a [`Model`].
//!
//! Geometry is uploaded once. Node world matrices and joint palettes are
//! rewritten every frame by [`GpuModel::update`].

use glam::Mat4;
use wgpu::util::DeviceExt;

use crate::renderer::uniforms::MeshUniforms;
use crate::scene::{Model, NodeHandle};

struct GpuMesh {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
}

/// A node carrying a mesh, with its own uniforms.
struct DrawItem {
    node: NodeHandle,
    mesh: usize,
    base_color: [f32; 4],
    uniform_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

pub struct GpuModel {
    meshes: Vec<GpuMesh>,
    /// One joint palette buffer per skeleton, same order as `Model::skeletons`.
    joint_buffers: Vec<wgpu::Buffer>,
    items: Vec<DrawItem>,
}

impl GpuModel {
    #[must_use]
    pub fn new(device: &wgpu::Device, mesh_layout: &wgpu::BindGroupLayout, model: &Model) -> Self {
        let meshes: Vec<GpuMesh> = model
            .meshes
            .iter()
            .map(|mesh| GpuMesh {
                vertex_buffer: device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some(format!("{} Vertices", mesh.name).as_str()),
                    contents: bytemuck::cast_slice(&mesh.vertices),
                    usage: wgpu::BufferUsages::VERTEX,
                }),
                index_buffer: device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some(format!("{} Indices", mesh.name).as_str()),
                    contents: bytemuck::cast_slice(&mesh.indices),
                    usage: wgpu::BufferUsages::INDEX,
                }),
                index_count: mesh.indices.len() as u32,
            })
            .collect();

        let joint_buffers: Vec<wgpu::Buffer> = model
            .skeletons
            .iter()
            .map(|skeleton| {
                let mut palette = skeleton.joint_matrices().to_vec();
                if palette.is_empty() {
                    palette.push(Mat4::IDENTITY);
                }
                device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some(format!("{} Joints", skeleton.name).as_str()),
                    contents: bytemuck::cast_slice(&palette),
                    usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_DST,
                })
            })
            .collect();

        let identity_palette = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Identity Joints"),
            contents: bytemuck::cast_slice(&[Mat4::IDENTITY]),
            usage: wgpu::BufferUsages::STORAGE,
        });

        let mut items = Vec::new();
        for (handle, node) in &model.nodes {
            let Some(mesh_index) = node.mesh else {
                continue;
            };
            let Some(mesh) = model.meshes.get(mesh_index) else {
                continue;
            };
            if mesh.indices.is_empty() {
                continue;
            }

            let palette = node
                .skin
                .and_then(|skin| joint_buffers.get(skin))
                .unwrap_or(&identity_palette);

            let uniforms = MeshUniforms {
                model: node.transform.world_matrix_as_mat4(),
                base_color: mesh.base_color,
            };
            let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(format!("{} Uniforms", node.name).as_str()),
                contents: bytemuck::bytes_of(&uniforms),
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            });

            let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some(format!("{} BindGroup", node.name).as_str()),
                layout: mesh_layout,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: uniform_buffer.as_entire_binding(),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: palette.as_entire_binding(),
                    },
                ],
            });

            items.push(DrawItem {
                node: handle,
                mesh: mesh_index,
                base_color: mesh.base_color,
                uniform_buffer,
                bind_group,
            });
        }

        log::info!(
            "Uploaded model '{}': {} meshes, {} skeletons, {} draws",
            model.name,
            meshes.len(),
            joint_buffers.len(),
            items.len()
        );

        Self {
            meshes,
            joint_buffers,
            items,
        }
    }

    /// Writes the current world matrices and joint palettes.
    pub fn update(&self, queue: &wgpu::Queue, model: &Model) {
        for item in &self.items {
            let Some(node) = model.get_node(item.node) else {
                continue;
            };
            let uniforms = MeshUniforms {
                model: node.transform.world_matrix_as_mat4(),
                base_color: item.base_color,
            };
            queue.write_buffer(&item.uniform_buffer, 0, bytemuck::bytes_of(&uniforms));
        }

        for (buffer, skeleton) in self.joint_buffers.iter().zip(&model.skeletons) {
            let palette = skeleton.joint_matrices();
            if !palette.is_empty() {
                queue.write_buffer(buffer, 0, bytemuck::cast_slice(palette));
            }
        }
    }

    pub fn draw(&self, pass: &mut wgpu::RenderPass<'_>) {
        for item in &self.items {
            let Some(mesh) = self.meshes.get(item.mesh) else {
                continue;
            };
            pass.set_bind_group(1, &item.bind_group, &[]);
            pass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
            pass.set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
            pass.draw_indexed(0..mesh.index_count, 0, 0..1);
        }
    }

    #[must_use]
    pub fn draw_count(&self) -> usize {
        self.items.len()
    }
}
