//! glTF 2.0 (`.gltf` + external buffers, or self-contained `.glb`) parsing.

use std::path::PathBuf;

use anyhow::{Context as _, bail};

use crate::{
    data_structures::{
        animation::{AnimationClip, Keyframes, Track},
        instance::Instance,
        scene_graph::{Geometry, Material, Mesh, ModelVertex, SceneNode},
    },
    resources::{
        AssetParser, LoadProgress, ParsedAsset,
        fetch::{load_binary, resolve_relative},
    },
};

/// Parses glTF assets found under `asset_root`.
#[derive(Clone, Debug)]
pub struct GltfParser {
    asset_root: PathBuf,
}

impl GltfParser {
    pub fn new(asset_root: impl Into<PathBuf>) -> Self {
        Self {
            asset_root: asset_root.into(),
        }
    }

    async fn load_buffers(&self, gltf: &::gltf::Gltf, url: &str) -> anyhow::Result<Vec<Vec<u8>>> {
        let mut buffer_data = Vec::new();
        for buffer in gltf.buffers() {
            match buffer.source() {
                ::gltf::buffer::Source::Bin => match gltf.blob.as_deref() {
                    Some(blob) => buffer_data.push(blob.into()),
                    None => bail!("{url}: buffer {} refers to a missing GLB chunk", buffer.index()),
                },
                ::gltf::buffer::Source::Uri(uri) if uri.starts_with("data:") => {
                    bail!("{url}: embedded data URIs are not supported, use .glb instead")
                }
                ::gltf::buffer::Source::Uri(uri) => {
                    let buffer_url = resolve_relative(url, uri);
                    let bin = load_binary(&self.asset_root, &buffer_url, &mut |_| {})
                        .await
                        .with_context(|| format!("{url}: loading buffer {buffer_url}"))?;
                    if bin.len() < buffer.length() {
                        bail!(
                            "{url}: buffer {buffer_url} holds {} bytes, {} expected",
                            bin.len(),
                            buffer.length()
                        );
                    }
                    buffer_data.push(bin);
                }
            }
        }
        Ok(buffer_data)
    }
}

impl AssetParser for GltfParser {
    async fn parse(
        &self,
        url: &str,
        progress: &mut dyn FnMut(LoadProgress),
    ) -> anyhow::Result<ParsedAsset> {
        let bytes = load_binary(&self.asset_root, url, progress).await?;
        let gltf = ::gltf::Gltf::from_slice(&bytes).with_context(|| format!("{url}: invalid glTF"))?;
        let buffers = self.load_buffers(&gltf, url).await?;

        let scene = to_scene(&gltf.document, &buffers, url);
        let animations = to_animation_clips(&gltf.document, &buffers);
        Ok(ParsedAsset { scene, animations })
    }
}

fn node_name(node: &::gltf::Node) -> String {
    node.name()
        .map(str::to_string)
        .unwrap_or_else(|| format!("node_{}", node.index()))
}

fn to_scene(document: &::gltf::Document, buffers: &[Vec<u8>], url: &str) -> SceneNode {
    let root_name = url
        .rsplit('/')
        .next()
        .and_then(|file| file.split('.').next())
        .filter(|stem| !stem.is_empty())
        .unwrap_or("model");
    let mut root = SceneNode::group(root_name);
    if let Some(scene) = document.default_scene().or_else(|| document.scenes().next()) {
        for node in scene.nodes() {
            root.add_child(to_scene_node(node, buffers));
        }
    }
    root
}

fn to_scene_node(node: ::gltf::Node, buffers: &[Vec<u8>]) -> SceneNode {
    let name = node_name(&node);
    let mut scene_node = match node.mesh() {
        Some(mesh) => {
            let meshes = mesh
                .primitives()
                .map(|primitive| to_mesh(&primitive, buffers))
                .collect();
            SceneNode::mesh(name, meshes)
        }
        None => SceneNode::group(name),
    };
    scene_node.transform = Instance::from(node.transform().decomposed());
    for child in node.children() {
        scene_node.add_child(to_scene_node(child, buffers));
    }
    scene_node
}

fn to_mesh(primitive: &::gltf::Primitive, buffers: &[Vec<u8>]) -> Mesh {
    let reader = primitive.reader(|buffer| buffers.get(buffer.index()).map(Vec::as_slice));

    let mut vertices: Vec<ModelVertex> = reader
        .read_positions()
        .map(|positions| {
            positions
                .map(|position| ModelVertex {
                    position,
                    ..Default::default()
                })
                .collect()
        })
        .unwrap_or_default();
    if let Some(normals) = reader.read_normals() {
        vertices
            .iter_mut()
            .zip(normals)
            .for_each(|(vertex, normal)| vertex.normal = normal);
    }
    if let Some(tex_coords) = reader.read_tex_coords(0).map(|v| v.into_f32()) {
        vertices
            .iter_mut()
            .zip(tex_coords)
            .for_each(|(vertex, tex_coord)| vertex.tex_coords = tex_coord);
    }
    let indices = match reader.read_indices() {
        Some(indices) => indices.into_u32().collect(),
        None => (0..vertices.len() as u32).collect(),
    };

    let material = primitive.material();
    let pbr = material.pbr_metallic_roughness();
    let material = Material::new(
        material.name().unwrap_or("default_material"),
        pbr.base_color_factor(),
    )
    .with_emissive(material.emissive_factor(), 1.0);

    Mesh::new(Geometry::new(vertices, indices), material)
}

/// Cubic spline samplers store `(in-tangent, value, out-tangent)` triples; keep the values.
fn keep_values<T>(values: Vec<T>, cubic: bool) -> Vec<T> {
    if !cubic {
        return values;
    }
    values
        .into_iter()
        .enumerate()
        .filter_map(|(i, value)| (i % 3 == 1).then_some(value))
        .collect()
}

fn to_animation_clips(document: &::gltf::Document, buffers: &[Vec<u8>]) -> Vec<AnimationClip> {
    document
        .animations()
        .map(|animation| {
            let tracks = animation
                .channels()
                .filter_map(|channel| {
                    let reader =
                        channel.reader(|buffer| buffers.get(buffer.index()).map(Vec::as_slice));
                    let cubic = matches!(
                        channel.sampler().interpolation(),
                        ::gltf::animation::Interpolation::CubicSpline
                    );
                    let timestamps: Vec<f32> = match reader.read_inputs() {
                        Some(inputs) => inputs.collect(),
                        None => {
                            log::warn!("No timestamps found in channel {}", channel.index());
                            return None;
                        }
                    };
                    let keyframes = match reader.read_outputs() {
                        Some(::gltf::animation::util::ReadOutputs::Translations(translations)) => {
                            Keyframes::Translation(keep_values(
                                translations.map(cgmath::Vector3::from).collect(),
                                cubic,
                            ))
                        }
                        Some(::gltf::animation::util::ReadOutputs::Rotations(rotations)) => {
                            Keyframes::Rotation(keep_values(
                                rotations
                                    .into_f32()
                                    .map(|[x, y, z, w]| cgmath::Quaternion::new(w, x, y, z))
                                    .collect(),
                                cubic,
                            ))
                        }
                        Some(::gltf::animation::util::ReadOutputs::Scales(scales)) => {
                            Keyframes::Scale(keep_values(
                                scales.map(cgmath::Vector3::from).collect(),
                                cubic,
                            ))
                        }
                        Some(::gltf::animation::util::ReadOutputs::MorphTargetWeights(weights)) => {
                            Keyframes::Weights(weights.into_f32().collect())
                        }
                        None => {
                            log::warn!("No keyframes found in channel {}", channel.index());
                            return None;
                        }
                    };
                    Some(Track {
                        target: node_name(&channel.target().node()),
                        timestamps,
                        keyframes,
                    })
                })
                .collect();
            AnimationClip::new(animation.name().unwrap_or("Default"), tracks)
        })
        .collect()
}
