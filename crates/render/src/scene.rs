use std::collections::BTreeMap;

use glam::{Mat4, Vec3};

use crate::surface::TextureSurface;

/// Identifier of a node in a [`SceneGraph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u64);

/// Errors from scene graph construction and mutation.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SceneError {
    #[error("node {0:?} not found")]
    UnknownNode(NodeId),
    #[error("node {0:?} cannot hold children")]
    NotAContainer(NodeId),
    #[error("node {0:?} is not a transform")]
    NotATransform(NodeId),
    #[error("node {0:?} cannot be attached to itself")]
    SelfAttach(NodeId),
    #[error("face references {kind} index {index}, but only {len} are defined")]
    FaceIndexOutOfRange {
        kind: &'static str,
        index: usize,
        len: usize,
    },
}

/// Linear RGBA colour.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }
}

/// Directional light attached to a group.
#[derive(Debug, Clone, PartialEq)]
pub struct Light {
    pub direction: Vec3,
    pub ambient: Color,
    pub diffuse: Color,
    pub specular: Color,
}

impl Default for Light {
    fn default() -> Self {
        Self {
            direction: Vec3::new(-1.0, -1.0, -1.0),
            ambient: Color::rgb(0.5, 0.5, 0.5),
            diffuse: Color::rgb(1.0, 1.0, 1.0),
            specular: Color::rgb(0.0, 0.0, 0.0),
        }
    }
}

/// Material and texture binding for a geometry.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderState {
    pub ambient: Color,
    pub diffuse: Color,
    pub specular: Color,
    pub specular_exponent: f32,
    pub texture: Option<TextureSurface>,
}

impl Default for RenderState {
    fn default() -> Self {
        Self {
            ambient: Color::rgb(0.5, 0.5, 0.5),
            diffuse: Color::rgb(1.0, 1.0, 1.0),
            specular: Color::rgb(0.0, 0.0, 0.0),
            specular_exponent: 0.0,
            texture: None,
        }
    }
}

impl RenderState {
    pub fn set_material(&mut self, ambient: Color, diffuse: Color, specular: Color, exponent: f32) {
        self.ambient = ambient;
        self.diffuse = diffuse;
        self.specular = specular;
        self.specular_exponent = exponent;
    }

    pub fn set_texture(&mut self, texture: TextureSurface) {
        self.texture = Some(texture);
    }
}

/// Vertex, UV and normal pools referenced by geometry faces.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VertexArray {
    vertices: Vec<Vec3>,
    uvs: Vec<Vec3>,
    normals: Vec<Vec3>,
}

impl VertexArray {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append_vertex(&mut self, v: Vec3) {
        self.vertices.push(v);
    }

    pub fn append_uv(&mut self, uv: Vec3) {
        self.uvs.push(uv);
    }

    pub fn append_normal(&mut self, n: Vec3) {
        self.normals.push(n);
    }

    pub fn vertices(&self) -> &[Vec3] {
        &self.vertices
    }

    pub fn uvs(&self) -> &[Vec3] {
        &self.uvs
    }

    pub fn normals(&self) -> &[Vec3] {
        &self.normals
    }
}

/// A polygon. Indices are 1-based into the owning geometry's [`VertexArray`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Face {
    pub vertices: Vec<usize>,
    pub uvs: Vec<usize>,
    pub normals: Vec<usize>,
}

/// Drawable mesh: vertex pools, faces and a render state.
#[derive(Debug, Clone, PartialEq)]
pub struct Geometry {
    vertex_array: VertexArray,
    render_state: RenderState,
    faces: Vec<Face>,
}

impl Geometry {
    pub fn new(vertex_array: VertexArray, render_state: RenderState) -> Self {
        Self {
            vertex_array,
            render_state,
            faces: Vec::new(),
        }
    }

    /// Add a face, validating every index against the vertex array.
    pub fn add_face(
        &mut self,
        vertices: &[usize],
        uvs: &[usize],
        normals: &[usize],
    ) -> Result<(), SceneError> {
        check_indices("vertex", vertices, self.vertex_array.vertices.len())?;
        check_indices("uv", uvs, self.vertex_array.uvs.len())?;
        check_indices("normal", normals, self.vertex_array.normals.len())?;
        self.faces.push(Face {
            vertices: vertices.to_vec(),
            uvs: uvs.to_vec(),
            normals: normals.to_vec(),
        });
        Ok(())
    }

    pub fn vertex_array(&self) -> &VertexArray {
        &self.vertex_array
    }

    pub fn render_state(&self) -> &RenderState {
        &self.render_state
    }

    pub fn faces(&self) -> &[Face] {
        &self.faces
    }
}

fn check_indices(kind: &'static str, indices: &[usize], len: usize) -> Result<(), SceneError> {
    match indices.iter().find(|&&i| i == 0 || i > len) {
        Some(&index) => Err(SceneError::FaceIndexOutOfRange { kind, index, len }),
        None => Ok(()),
    }
}

/// What a scene node is.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    /// Plain container.
    Group,
    /// Container whose children are placed by a local transform.
    Transform(Mat4),
    /// Leaf mesh.
    Geometry(Geometry),
}

#[derive(Debug, Clone)]
struct Node {
    kind: NodeKind,
    children: Vec<NodeId>,
    lights: Vec<Light>,
}

/// Node graph owned by the render thread.
///
/// Parents own their children for the lifetime of the graph. Every mutation
/// bumps `revision`, which lets callers check that a code path left the graph
/// untouched.
#[derive(Debug, Clone, Default)]
pub struct SceneGraph {
    nodes: BTreeMap<NodeId, Node>,
    next_id: u64,
    revision: u64,
}

impl SceneGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create_group(&mut self) -> NodeId {
        self.insert(NodeKind::Group)
    }

    pub fn create_transform(&mut self, local: Mat4) -> NodeId {
        self.insert(NodeKind::Transform(local))
    }

    pub fn create_geometry(&mut self, geometry: Geometry) -> NodeId {
        self.insert(NodeKind::Geometry(geometry))
    }

    /// Attach `child` under `parent`.
    pub fn add_node(&mut self, parent: NodeId, child: NodeId) -> Result<(), SceneError> {
        if parent == child {
            return Err(SceneError::SelfAttach(parent));
        }
        if !self.nodes.contains_key(&child) {
            return Err(SceneError::UnknownNode(child));
        }
        let node = self
            .nodes
            .get_mut(&parent)
            .ok_or(SceneError::UnknownNode(parent))?;
        if matches!(node.kind, NodeKind::Geometry(_)) {
            return Err(SceneError::NotAContainer(parent));
        }
        node.children.push(child);
        self.revision += 1;
        Ok(())
    }

    pub fn add_light(&mut self, group: NodeId, light: Light) -> Result<(), SceneError> {
        let node = self
            .nodes
            .get_mut(&group)
            .ok_or(SceneError::UnknownNode(group))?;
        if matches!(node.kind, NodeKind::Geometry(_)) {
            return Err(SceneError::NotAContainer(group));
        }
        node.lights.push(light);
        self.revision += 1;
        Ok(())
    }

    pub fn set_transform(&mut self, id: NodeId, local: Mat4) -> Result<(), SceneError> {
        let node = self.nodes.get_mut(&id).ok_or(SceneError::UnknownNode(id))?;
        match &mut node.kind {
            NodeKind::Transform(m) => {
                *m = local;
                self.revision += 1;
                Ok(())
            }
            _ => Err(SceneError::NotATransform(id)),
        }
    }

    pub fn transform(&self, id: NodeId) -> Option<Mat4> {
        match self.nodes.get(&id).map(|n| &n.kind) {
            Some(NodeKind::Transform(m)) => Some(*m),
            _ => None,
        }
    }

    pub fn kind(&self, id: NodeId) -> Option<&NodeKind> {
        self.nodes.get(&id).map(|n| &n.kind)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes.get(&id).map_or(&[], |n| n.children.as_slice())
    }

    pub fn lights(&self, id: NodeId) -> &[Light] {
        self.nodes.get(&id).map_or(&[], |n| n.lights.as_slice())
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    fn insert(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        self.nodes.insert(
            id,
            Node {
                kind,
                children: Vec::new(),
                lights: Vec::new(),
            },
        );
        self.revision += 1;
        id
    }
}
