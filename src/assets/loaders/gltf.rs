//! glTF 2.0 loader.
//!
//! Turns a `.gltf` / `.glb` file into a [`Model`] (nodes, skinned meshes,
//! skeletons) plus the [`AnimationClip`]s it carries. Textures, cameras and
//! lights in the file are ignored.

use std::collections::HashSet;

use base64::Engine as _;
use glam::{Affine3A, Mat4, Quat, Vec3};

use crate::animation::binding::TargetPath;
use crate::animation::clip::{AnimationClip, Track, TrackData, TrackMeta};
use crate::animation::tracks::{InterpolationMode, KeyframeTrack};
use crate::assets::io::{AssetReaderVariant, parent_dir};
use crate::errors::{AssetError, Result};
use crate::scene::{MeshData, Model, Node, NodeHandle, Skeleton, SkinnedVertex, Transform};

/// Contents of one loaded file.
#[derive(Debug, Default)]
pub struct LoadedAsset {
    /// `None` when the file has no nodes.
    pub model: Option<Model>,
    pub clips: Vec<AnimationClip>,
}

pub struct GltfLoader {
    node_mapping: Vec<NodeHandle>,
    model: Model,
}

impl GltfLoader {
    /// Loads a self-contained file: GLB, or glTF with only data-URI buffers.
    pub fn from_slice(bytes: &[u8], name: &str) -> Result<LoadedAsset> {
        let gltf = gltf::Gltf::from_slice_without_validation(bytes)?;
        let mut buffers = Vec::with_capacity(gltf.buffers().count());
        for buffer in gltf.buffers() {
            buffers.push(match buffer.source() {
                gltf::buffer::Source::Bin => Self::blob(&gltf)?,
                gltf::buffer::Source::Uri(uri) => Self::decode_data_uri(uri)?.ok_or_else(|| {
                    AssetError::MissingBuffer(format!("external buffer '{uri}' needs a reader"))
                })?,
            });
        }
        Self::build(&gltf, &buffers, name)
    }

    /// Reads `uri` through `reader` and resolves external buffers relative
    /// to it.
    pub async fn load(reader: &AssetReaderVariant, uri: &str, name: &str) -> Result<LoadedAsset> {
        let bytes = reader.read_bytes(uri).await?;
        let gltf = gltf::Gltf::from_slice_without_validation(&bytes)?;

        let base = parent_dir(uri);
        let mut buffers = Vec::with_capacity(gltf.buffers().count());
        for buffer in gltf.buffers() {
            let data = match buffer.source() {
                gltf::buffer::Source::Bin => Self::blob(&gltf)?,
                gltf::buffer::Source::Uri(buffer_uri) => match Self::decode_data_uri(buffer_uri)? {
                    Some(data) => data,
                    None => reader.read_bytes(&format!("{base}{buffer_uri}")).await?,
                },
            };
            buffers.push(data);
        }

        Self::build(&gltf, &buffers, name)
    }

    fn blob(gltf: &gltf::Gltf) -> Result<Vec<u8>> {
        gltf.blob
            .clone()
            .ok_or_else(|| AssetError::MissingBuffer("missing GLB binary chunk".into()).into())
    }

    /// Decodes a `data:` URI. Returns `None` for any other URI.
    fn decode_data_uri(uri: &str) -> Result<Option<Vec<u8>>> {
        let Some(rest) = uri.strip_prefix("data:") else {
            return Ok(None);
        };
        let Some((_, payload)) = rest.split_once(";base64,") else {
            return Err(AssetError::DataUri(format!(
                "only base64 data URIs are supported: {}",
                uri.char_indices().nth(48).map_or(uri, |(i, _)| &uri[..i])
            ))
            .into());
        };
        Ok(Some(base64::engine::general_purpose::STANDARD.decode(payload)?))
    }

    /// Rejects index errors and malformed enums that would make the `gltf`
    /// accessors panic. Missing optional data (such as POSITION bounds) is
    /// tolerated.
    fn validate(gltf: &gltf::Gltf) -> Result<()> {
        use gltf::json::validation::{Error as ValidationError, Validate as _};

        let root = gltf.document.as_json();

        // The POSITION check inside json validation indexes accessors directly
        for (m, mesh) in root.meshes.iter().enumerate() {
            for (p, primitive) in mesh.primitives.iter().enumerate() {
                if let Some(bad) = primitive
                    .attributes
                    .values()
                    .find(|accessor| accessor.value() >= root.accessors.len())
                {
                    return Err(AssetError::InvalidData(format!(
                        "meshes[{m}].primitives[{p}]: accessor {bad} out of range"
                    ))
                    .into());
                }
            }
        }

        let mut errors = Vec::new();
        root.validate(root, gltf::json::Path::new, &mut |path, error| {
            if matches!(
                error,
                ValidationError::IndexOutOfBounds | ValidationError::Invalid
            ) {
                errors.push(format!("{}: {error:?}", path()));
            }
        });
        if let Some(first) = errors.first() {
            return Err(AssetError::InvalidData(format!(
                "{first} ({} problem(s) in total)",
                errors.len()
            ))
            .into());
        }

        Self::check_hierarchy(root)
    }

    /// Every node has at most one parent and every node is reachable from a
    /// parentless one.
    fn check_hierarchy(root: &gltf::json::Root) -> Result<()> {
        let count = root.nodes.len();
        let mut parent: Vec<Option<usize>> = vec![None; count];
        for (index, node) in root.nodes.iter().enumerate() {
            for child in node.children.iter().flatten() {
                let child = child.value();
                if let Some(previous) = parent[child] {
                    return Err(AssetError::InvalidData(format!(
                        "node {child} is a child of both node {previous} and node {index}"
                    ))
                    .into());
                }
                parent[child] = Some(index);
            }
        }

        let mut visited = vec![false; count];
        let mut stack: Vec<usize> = (0..count).filter(|&i| parent[i].is_none()).collect();
        while let Some(index) = stack.pop() {
            visited[index] = true;
            stack.extend(root.nodes[index].children.iter().flatten().map(|c| c.value()));
        }
        if let Some(cyclic) = visited.iter().position(|seen| !seen) {
            return Err(AssetError::InvalidData(format!(
                "node {cyclic} is part of a cycle in the node hierarchy"
            ))
            .into());
        }
        Ok(())
    }

    fn build(gltf: &gltf::Gltf, buffers: &[Vec<u8>], name: &str) -> Result<LoadedAsset> {
        Self::validate(gltf)?;
        let clips = Self::load_animations(gltf, buffers)?;

        if gltf.nodes().len() == 0 {
            return Ok(LoadedAsset { model: None, clips });
        }

        let mut loader = Self {
            node_mapping: Vec::with_capacity(gltf.nodes().len()),
            model: Model::new(name),
        };

        for node in gltf.nodes() {
            let handle = loader.create_node(&node);
            loader.node_mapping.push(handle);
        }

        for node in gltf.nodes() {
            let parent = loader.node_mapping[node.index()];
            for child in node.children() {
                loader.model.attach(loader.node_mapping[child.index()], parent);
            }
        }

        loader.collect_roots(gltf);
        loader.load_skins(gltf, buffers)?;
        for node in gltf.nodes() {
            loader.bind_node_mesh_and_skin(&node, buffers)?;
        }

        let mut model = loader.model;
        model.update_world_matrices();
        model.update_skeletons();

        log::debug!(
            "glTF '{name}': {} nodes, {} meshes, {} skins, {} clips",
            model.nodes.len(),
            model.meshes.len(),
            model.skeletons.len(),
            clips.len()
        );

        Ok(LoadedAsset {
            model: Some(model),
            clips,
        })
    }

    fn create_node(&mut self, node: &gltf::Node) -> NodeHandle {
        let name = node
            .name()
            .map_or_else(|| format!("Node_{}", node.index()), str::to_string);
        let (t, r, s) = node.transform().decomposed();
        let transform = Transform::from_trs(
            Vec3::from_array(t),
            Quat::from_array(r).normalize(),
            Vec3::from_array(s),
        );
        self.model.add_node(Node::new(name, transform))
    }

    fn collect_roots(&mut self, gltf: &gltf::Gltf) {
        if let Some(scene) = gltf.default_scene().or_else(|| gltf.scenes().next()) {
            self.model.roots = scene
                .nodes()
                .map(|n| self.node_mapping[n.index()])
                .collect();
            if let Some(scene_name) = scene.name()
                && self.model.name.is_empty()
            {
                scene_name.clone_into(&mut self.model.name);
            }
        }

        if self.model.roots.is_empty() {
            self.model.roots = self
                .node_mapping
                .iter()
                .copied()
                .filter(|h| self.model.get_node(*h).is_some_and(|n| n.parent.is_none()))
                .collect();
        }
    }

    fn load_skins(&mut self, gltf: &gltf::Gltf, buffers: &[Vec<u8>]) -> Result<()> {
        for skin in gltf.skins() {
            let name = skin.name().unwrap_or("Skeleton");
            let joints: Vec<gltf::Node> = skin.joints().collect();

            let reader = skin.reader(|buffer| buffers.get(buffer.index()).map(Vec::as_slice));
            let ibms: Vec<Affine3A> = match reader.read_inverse_bind_matrices() {
                Some(iter) => iter
                    .map(|m| Affine3A::from_mat4(Mat4::from_cols_array_2d(&m)))
                    .collect(),
                None => vec![Affine3A::IDENTITY; joints.len()],
            };
            if ibms.len() != joints.len() {
                return Err(AssetError::InvalidData(format!(
                    "skin '{name}' has {} joints but {} inverse bind matrices",
                    joints.len(),
                    ibms.len()
                ))
                .into());
            }

            let bones: Vec<NodeHandle> = joints
                .iter()
                .map(|node| self.node_mapping[node.index()])
                .collect();

            // A joint that no other joint lists as a child is a root.
            let joint_indices: HashSet<usize> = joints.iter().map(|n| n.index()).collect();
            let child_joints: HashSet<usize> = joints
                .iter()
                .flat_map(|n| n.children())
                .map(|c| c.index())
                .filter(|i| joint_indices.contains(i))
                .collect();

            let root_bone_index = skin
                .skeleton()
                .and_then(|root| joints.iter().position(|n| n.index() == root.index()))
                .or_else(|| {
                    joints
                        .iter()
                        .position(|n| !child_joints.contains(&n.index()))
                })
                .unwrap_or(0);

            self.model
                .skeletons
                .push(Skeleton::new(name, bones, ibms, root_bone_index));
        }
        Ok(())
    }

    fn bind_node_mesh_and_skin(&mut self, node: &gltf::Node, buffers: &[Vec<u8>]) -> Result<()> {
        let handle = self.node_mapping[node.index()];
        let skin = node.skin().map(|s| s.index());

        let Some(mesh) = node.mesh() else {
            return Ok(());
        };
        let primitives: Vec<gltf::Primitive> = mesh.primitives().collect();
        let mesh_name = mesh.name().unwrap_or("Mesh");

        match primitives.as_slice() {
            [] => {}
            [primitive] => {
                let index = self.push_mesh(mesh_name, primitive, buffers, skin.is_some())?;
                if let Some(n) = self.model.get_node_mut(handle) {
                    n.mesh = Some(index);
                    n.skin = skin;
                }
            }
            // One child node per primitive
            _ => {
                for (i, primitive) in primitives.iter().enumerate() {
                    let index = self.push_mesh(mesh_name, primitive, buffers, skin.is_some())?;
                    let mut sub = Node::new(format!("{mesh_name}_{i}"), Transform::new());
                    sub.mesh = Some(index);
                    sub.skin = skin;
                    let sub = self.model.add_node(sub);
                    self.model.attach(sub, handle);
                }
            }
        }
        Ok(())
    }

    fn push_mesh(
        &mut self,
        name: &str,
        primitive: &gltf::Primitive,
        buffers: &[Vec<u8>],
        skinned: bool,
    ) -> Result<usize> {
        let mut mesh = Self::load_primitive(name, primitive, buffers, skinned)?;
        mesh.compute_normals_if_missing();
        self.model.meshes.push(mesh);
        Ok(self.model.meshes.len() - 1)
    }

    fn load_primitive(
        name: &str,
        primitive: &gltf::Primitive,
        buffers: &[Vec<u8>],
        skinned: bool,
    ) -> Result<MeshData> {
        if primitive.mode() != gltf::mesh::Mode::Triangles {
            return Err(AssetError::InvalidData(format!(
                "mesh '{name}': unsupported primitive mode {:?}",
                primitive.mode()
            ))
            .into());
        }

        let reader = primitive.reader(|buffer| buffers.get(buffer.index()).map(Vec::as_slice));

        let positions: Vec<[f32; 3]> = reader
            .read_positions()
            .ok_or_else(|| AssetError::InvalidData(format!("mesh '{name}' has no positions")))?
            .collect();

        let mut vertices: Vec<SkinnedVertex> = positions
            .iter()
            .map(|&p| SkinnedVertex::rigid(p, [0.0; 3]))
            .collect();

        if let Some(normals) = reader.read_normals() {
            for (v, n) in vertices.iter_mut().zip(normals) {
                v.normal = n;
            }
        }

        let joints = reader.read_joints(0).map(|r| r.into_u16());
        let weights = reader.read_weights(0).map(|r| r.into_f32());
        let skinned = match (skinned, joints, weights) {
            (true, Some(joints), Some(weights)) => {
                for ((v, j), w) in vertices.iter_mut().zip(joints).zip(weights) {
                    v.joints = j.map(u32::from);
                    v.weights = w;
                }
                true
            }
            _ => false,
        };

        let indices: Vec<u32> = match reader.read_indices() {
            Some(iter) => iter.into_u32().collect(),
            None => (0..vertices.len() as u32).collect(),
        };
        if let Some(&bad) = indices.iter().find(|&&i| i as usize >= vertices.len()) {
            return Err(AssetError::InvalidData(format!(
                "mesh '{name}': index {bad} out of range ({} vertices)",
                vertices.len()
            ))
            .into());
        }

        let base_color = primitive
            .material()
            .pbr_metallic_roughness()
            .base_color_factor();

        Ok(MeshData {
            name: name.to_string(),
            vertices,
            indices,
            base_color,
            skinned,
        })
    }

    fn load_animations(gltf: &gltf::Gltf, buffers: &[Vec<u8>]) -> Result<Vec<AnimationClip>> {
        use gltf::animation::util::ReadOutputs;

        let mut clips = Vec::new();

        for anim in gltf.animations() {
            let mut tracks = Vec::new();

            for channel in anim.channels() {
                let reader = channel.reader(|buffer| buffers.get(buffer.index()).map(Vec::as_slice));
                let target = channel.target();
                let node = target.node();
                let node_name = node
                    .name()
                    .map_or_else(|| format!("Node_{}", node.index()), str::to_string);

                let (Some(inputs), Some(outputs)) = (reader.read_inputs(), reader.read_outputs())
                else {
                    log::warn!("Animation channel for '{node_name}' has no data, skipped");
                    continue;
                };
                let times: Vec<f32> = inputs.collect();

                let interpolation = match channel.sampler().interpolation() {
                    gltf::animation::Interpolation::Linear => InterpolationMode::Linear,
                    gltf::animation::Interpolation::Step => InterpolationMode::Step,
                    gltf::animation::Interpolation::CubicSpline => InterpolationMode::CubicSpline,
                };

                let (target, data) = match outputs {
                    ReadOutputs::Translations(iter) => (
                        TargetPath::Translation,
                        TrackData::Vector3(KeyframeTrack::new(
                            times,
                            iter.map(Vec3::from_array).collect(),
                            interpolation,
                        )),
                    ),
                    ReadOutputs::Rotations(iter) => (
                        TargetPath::Rotation,
                        TrackData::Quaternion(KeyframeTrack::new(
                            times,
                            iter.into_f32().map(Quat::from_array).collect(),
                            interpolation,
                        )),
                    ),
                    ReadOutputs::Scales(iter) => (
                        TargetPath::Scale,
                        TrackData::Vector3(KeyframeTrack::new(
                            times,
                            iter.map(Vec3::from_array).collect(),
                            interpolation,
                        )),
                    ),
                    // Morph targets are not rendered
                    ReadOutputs::MorphTargetWeights(_) => continue,
                };

                tracks.push(Track {
                    meta: TrackMeta { node_name, target },
                    data,
                });
            }

            clips.push(AnimationClip::new(anim.name().unwrap_or("anim"), tracks));
        }

        Ok(clips)
    }
}
