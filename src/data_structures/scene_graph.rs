//! CPU-side scene graph produced by the asset parser.
//!
//! The loader never interprets geometry; it only walks the tree to flag meshes
//! for shadows and to hand out independent copies. Geometry and materials carry
//! a process-unique [`ResourceId`] so callers can tell whether two scenes share
//! a resource. Cloning always allocates new ids, which is what makes
//! `SceneNode::clone` a deep copy in the sense that matters: disposing a
//! resource of one copy leaves every other copy intact.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::data_structures::instance::Instance;

static NEXT_RESOURCE_ID: AtomicU64 = AtomicU64::new(1);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceId(u64);

impl ResourceId {
    fn next() -> Self {
        Self(NEXT_RESOURCE_ID.fetch_add(1, Ordering::Relaxed))
    }
}

#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ModelVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub tex_coords: [f32; 2],
}

#[derive(Debug)]
pub struct Geometry {
    id: ResourceId,
    pub vertices: Vec<ModelVertex>,
    pub indices: Vec<u32>,
    disposed: bool,
}

impl Geometry {
    pub fn new(vertices: Vec<ModelVertex>, indices: Vec<u32>) -> Self {
        Self {
            id: ResourceId::next(),
            vertices,
            indices,
            disposed: false,
        }
    }

    /// Axis-aligned box centred on the origin, 24 vertices with flat normals.
    pub fn cuboid(width: f32, height: f32, depth: f32) -> Self {
        let (hx, hy, hz) = (width / 2.0, height / 2.0, depth / 2.0);
        // (normal, u axis, v axis) per face
        let faces: [([f32; 3], [f32; 3], [f32; 3]); 6] = [
            ([1.0, 0.0, 0.0], [0.0, 0.0, -1.0], [0.0, 1.0, 0.0]),
            ([-1.0, 0.0, 0.0], [0.0, 0.0, 1.0], [0.0, 1.0, 0.0]),
            ([0.0, 1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, -1.0]),
            ([0.0, -1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 1.0]),
            ([0.0, 0.0, 1.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
            ([0.0, 0.0, -1.0], [-1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
        ];
        let half = [hx, hy, hz];
        let mut vertices = Vec::with_capacity(24);
        let mut indices = Vec::with_capacity(36);
        for (normal, u, v) in faces {
            let base = vertices.len() as u32;
            for (su, sv) in [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)] {
                let mut position = [0.0; 3];
                for axis in 0..3 {
                    position[axis] = (normal[axis] + u[axis] * su + v[axis] * sv) * half[axis];
                }
                vertices.push(ModelVertex {
                    position,
                    normal,
                    tex_coords: [(su + 1.0) / 2.0, (1.0 - sv) / 2.0],
                });
            }
            indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
        }
        Self::new(vertices, indices)
    }

    pub fn id(&self) -> ResourceId {
        self.id
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Drops the CPU buffers. The host is expected to release its GPU copy too.
    pub fn dispose(&mut self) {
        self.vertices = Vec::new();
        self.indices = Vec::new();
        self.disposed = true;
    }

    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.indices)
    }
}

impl Clone for Geometry {
    fn clone(&self) -> Self {
        Self {
            id: ResourceId::next(),
            vertices: self.vertices.clone(),
            indices: self.indices.clone(),
            disposed: self.disposed,
        }
    }
}

/// Topology only: two geometries are equal when they hold the same data.
impl PartialEq for Geometry {
    fn eq(&self, other: &Self) -> bool {
        self.vertices == other.vertices
            && self.indices == other.indices
            && self.disposed == other.disposed
    }
}

#[derive(Debug)]
pub struct Material {
    id: ResourceId,
    pub name: String,
    pub base_color: [f32; 4],
    pub emissive: [f32; 3],
    pub emissive_intensity: f32,
    pub wireframe: bool,
    disposed: bool,
}

impl Material {
    pub fn new(name: impl Into<String>, base_color: [f32; 4]) -> Self {
        Self {
            id: ResourceId::next(),
            name: name.into(),
            base_color,
            emissive: [0.0; 3],
            emissive_intensity: 0.0,
            wireframe: false,
            disposed: false,
        }
    }

    pub fn with_emissive(mut self, emissive: [f32; 3], intensity: f32) -> Self {
        self.emissive = emissive;
        self.emissive_intensity = intensity;
        self
    }

    pub fn with_wireframe(mut self, wireframe: bool) -> Self {
        self.wireframe = wireframe;
        self
    }

    pub fn id(&self) -> ResourceId {
        self.id
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    pub fn dispose(&mut self) {
        self.disposed = true;
    }
}

impl Clone for Material {
    fn clone(&self) -> Self {
        Self {
            id: ResourceId::next(),
            name: self.name.clone(),
            base_color: self.base_color,
            emissive: self.emissive,
            emissive_intensity: self.emissive_intensity,
            wireframe: self.wireframe,
            disposed: self.disposed,
        }
    }
}

impl PartialEq for Material {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.base_color == other.base_color
            && self.emissive == other.emissive
            && self.emissive_intensity == other.emissive_intensity
            && self.wireframe == other.wireframe
            && self.disposed == other.disposed
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Mesh {
    pub geometry: Geometry,
    pub material: Material,
    pub cast_shadow: bool,
    pub receive_shadow: bool,
}

impl Mesh {
    pub fn new(geometry: Geometry, material: Material) -> Self {
        Self {
            geometry,
            material,
            cast_shadow: false,
            receive_shadow: false,
        }
    }

    pub fn dispose(&mut self) {
        self.geometry.dispose();
        self.material.dispose();
    }
}

/// A node is either a plain group or carries the primitives of one glTF mesh.
#[derive(Clone, Debug, PartialEq)]
pub enum NodeKind {
    Group,
    Mesh(Vec<Mesh>),
}

#[derive(Clone, Debug, PartialEq)]
pub struct SceneNode {
    pub name: String,
    pub transform: Instance,
    pub kind: NodeKind,
    pub children: Vec<SceneNode>,
}

impl SceneNode {
    pub fn group(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            transform: Instance::default(),
            kind: NodeKind::Group,
            children: Vec::new(),
        }
    }

    pub fn mesh(name: impl Into<String>, meshes: Vec<Mesh>) -> Self {
        Self {
            name: name.into(),
            transform: Instance::default(),
            kind: NodeKind::Mesh(meshes),
            children: Vec::new(),
        }
    }

    pub fn with_child(mut self, child: SceneNode) -> Self {
        self.children.push(child);
        self
    }

    pub fn add_child(&mut self, child: SceneNode) {
        self.children.push(child);
    }

    pub fn is_mesh(&self) -> bool {
        matches!(self.kind, NodeKind::Mesh(_))
    }

    /// Depth-first pre-order walk.
    pub fn visit(&self, f: &mut dyn FnMut(&SceneNode)) {
        f(self);
        for child in &self.children {
            child.visit(f);
        }
    }

    pub fn visit_mut(&mut self, f: &mut dyn FnMut(&mut SceneNode)) {
        f(self);
        for child in self.children.iter_mut() {
            child.visit_mut(f);
        }
    }

    pub fn meshes(&self) -> Vec<&Mesh> {
        let mut meshes = Vec::new();
        self.collect_meshes(&mut meshes);
        meshes
    }

    fn collect_meshes<'a>(&'a self, out: &mut Vec<&'a Mesh>) {
        if let NodeKind::Mesh(meshes) = &self.kind {
            out.extend(meshes.iter());
        }
        for child in &self.children {
            child.collect_meshes(out);
        }
    }

    pub fn for_each_mesh_mut(&mut self, f: &mut dyn FnMut(&mut Mesh)) {
        self.visit_mut(&mut |node| {
            if let NodeKind::Mesh(meshes) = &mut node.kind {
                meshes.iter_mut().for_each(|mesh| f(mesh));
            }
        });
    }

    pub fn mesh_count(&self) -> usize {
        let mut count = 0;
        self.visit(&mut |node| {
            if let NodeKind::Mesh(meshes) = &node.kind {
                count += meshes.len();
            }
        });
        count
    }

    pub fn find_by_name(&self, name: &str) -> Option<&SceneNode> {
        if self.name == name {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find_by_name(name))
    }

    /// Frees every geometry and material below this node.
    pub fn dispose(&mut self) {
        self.for_each_mesh_mut(&mut Mesh::dispose);
    }

    pub fn set_shadows(&mut self, cast: bool, receive: bool) {
        self.for_each_mesh_mut(&mut |mesh| {
            mesh.cast_shadow = cast;
            mesh.receive_shadow = receive;
        });
    }
}
