//! Model loading: a content-addressed library of named meshes that can be
//! attached under a scene node.
//!
//! Models are identified by content hash and looked up by name. The loader
//! never parses model files; meshes are registered in memory or restored from
//! a JSON library file.

use browserworld_render::{
    Color, Geometry, NodeId, RenderState, SceneError, SceneGraph, VertexArray,
};
use glam::Vec3;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::path::Path;

/// Name under which the built-in controller mesh is registered.
pub const CONTROLLER_MODEL: &str = "vr_controller_daydream.obj";

/// Content-addressed model ID computed from the mesh data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ModelId(pub u64);

/// Triangle mesh with per-vertex normals. Face indices are 1-based.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelMesh {
    pub name: String,
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub faces: Vec<[usize; 3]>,
    pub base_color: [f32; 3],
}

impl ModelMesh {
    /// Axis-aligned box centred on the origin.
    pub fn cuboid(name: &str, half_extents: [f32; 3], base_color: [f32; 3]) -> Self {
        let [x, y, z] = half_extents;
        let positions = vec![
            [-x, -y, z],
            [x, -y, z],
            [x, y, z],
            [-x, y, z],
            [-x, -y, -z],
            [x, -y, -z],
            [x, y, -z],
            [-x, y, -z],
        ];
        let normals = positions
            .iter()
            .map(|p| Vec3::from_array(*p).normalize_or_zero().to_array())
            .collect();
        #[rustfmt::skip]
        let faces = vec![
            [1, 2, 3], [1, 3, 4], // +Z
            [6, 5, 8], [6, 8, 7], // -Z
            [2, 6, 7], [2, 7, 3], // +X
            [5, 1, 4], [5, 4, 8], // -X
            [4, 3, 7], [4, 7, 8], // +Y
            [5, 6, 2], [5, 2, 1], // -Y
        ];
        Self {
            name: name.to_owned(),
            positions,
            normals,
            faces,
            base_color,
        }
    }

    fn to_geometry(&self) -> Result<Geometry, SceneError> {
        let mut array = VertexArray::new();
        for p in &self.positions {
            array.append_vertex(Vec3::from_array(*p));
        }
        for n in &self.normals {
            array.append_normal(Vec3::from_array(*n));
        }
        let [r, g, b] = self.base_color;
        let mut state = RenderState::default();
        state.set_material(
            Color::rgb(r * 0.5, g * 0.5, b * 0.5),
            Color::rgb(r, g, b),
            Color::rgb(0.0, 0.0, 0.0),
            0.0,
        );
        let mut geometry = Geometry::new(array, state);
        let with_normals = !self.normals.is_empty();
        for face in &self.faces {
            let normals: &[usize] = if with_normals { face } else { &[] };
            geometry.add_face(face, &[], normals)?;
        }
        Ok(geometry)
    }
}

/// Errors from model operations.
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("model not found: {0}")]
    NotFound(String),
    #[error("invalid model {name}: {source}")]
    InvalidModel { name: String, source: SceneError },
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Loads a model by name and attaches it under a scene node.
pub trait ModelLoader {
    /// Attach model `name` under `root`; returns the created node.
    fn load_model(
        &mut self,
        scene: &mut SceneGraph,
        root: NodeId,
        name: &str,
    ) -> Result<NodeId, AssetError>;
}

/// Content-addressed model library.
///
/// Models are indexed by their content hash and by name. The library can be
/// persisted to disk as JSON for inspection.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModelLibrary {
    models: BTreeMap<ModelId, ModelMesh>,
    names: BTreeMap<String, ModelId>,
}

impl ModelLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Library holding the controller placeholder under [`CONTROLLER_MODEL`].
    pub fn with_builtin_models() -> Self {
        let mut library = Self::new();
        library.register(ModelMesh::cuboid(
            CONTROLLER_MODEL,
            [0.3, 0.15, 1.0],
            [0.2, 0.2, 0.25],
        ));
        library
    }

    /// Register a mesh and return its model ID. Re-registering a name rebinds it.
    pub fn register(&mut self, mesh: ModelMesh) -> ModelId {
        let id = content_hash(&mesh);
        self.names.insert(mesh.name.clone(), id);
        self.models.insert(id, mesh);
        id
    }

    pub fn get(&self, id: ModelId) -> Option<&ModelMesh> {
        self.models.get(&id)
    }

    pub fn find(&self, name: &str) -> Option<&ModelMesh> {
        self.names.get(name).and_then(|id| self.models.get(id))
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Save the library to a JSON file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), AssetError> {
        let file = std::fs::File::create(path)?;
        serde_json::to_writer_pretty(file, self)?;
        Ok(())
    }

    /// Load a library from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, AssetError> {
        let file = std::fs::File::open(path)?;
        let library: Self = serde_json::from_reader(file)?;
        Ok(library)
    }
}

impl ModelLoader for ModelLibrary {
    fn load_model(
        &mut self,
        scene: &mut SceneGraph,
        root: NodeId,
        name: &str,
    ) -> Result<NodeId, AssetError> {
        let mesh = self
            .find(name)
            .ok_or_else(|| AssetError::NotFound(name.to_owned()))?;
        let invalid = |source: SceneError| AssetError::InvalidModel {
            name: name.to_owned(),
            source,
        };
        let geometry = mesh.to_geometry().map_err(invalid)?;
        let node = scene.create_geometry(geometry);
        scene.add_node(root, node).map_err(invalid)?;
        tracing::debug!(%name, ?node, "model attached");
        Ok(node)
    }
}

fn content_hash(mesh: &ModelMesh) -> ModelId {
    let mut hasher = Sha256::new();
    hasher.update(mesh.name.as_bytes());
    for p in mesh.positions.iter().chain(&mesh.normals) {
        for c in p {
            hasher.update(c.to_le_bytes());
        }
    }
    for f in &mesh.faces {
        for i in f {
            hasher.update((*i as u64).to_le_bytes());
        }
    }
    let result = hasher.finalize();
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&result[..8]);
    ModelId(u64::from_le_bytes(bytes))
}

pub fn crate_info() -> &'static str {
    "browserworld-assets v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;
    use browserworld_render::NodeKind;
    use glam::Mat4;

    #[test]
    fn builtin_controller_is_registered() {
        let library = ModelLibrary::with_builtin_models();
        assert_eq!(library.len(), 1);
        let mesh = library.find(CONTROLLER_MODEL).unwrap();
        assert_eq!(mesh.positions.len(), 8);
        assert_eq!(mesh.faces.len(), 12);
    }

    #[test]
    fn content_addressed_dedup() {
        let mut library = ModelLibrary::new();
        let a = library.register(ModelMesh::cuboid("box", [1.0; 3], [1.0; 3]));
        let b = library.register(ModelMesh::cuboid("box", [1.0; 3], [1.0; 3]));
        assert_eq!(a, b);
        assert_eq!(library.len(), 1);
        assert!(library.get(a).is_some());
    }

    #[test]
    fn load_model_attaches_geometry() {
        let mut library = ModelLibrary::with_builtin_models();
        let mut scene = SceneGraph::new();
        let root = scene.create_transform(Mat4::IDENTITY);

        let node = library
            .load_model(&mut scene, root, CONTROLLER_MODEL)
            .unwrap();

        assert_eq!(scene.children(root), &[node]);
        match scene.kind(node) {
            Some(NodeKind::Geometry(g)) => assert_eq!(g.faces().len(), 12),
            other => panic!("expected geometry, got {other:?}"),
        }
    }

    #[test]
    fn unknown_model_is_not_found() {
        let mut library = ModelLibrary::new();
        let mut scene = SceneGraph::new();
        let root = scene.create_group();
        let err = library.load_model(&mut scene, root, "teapot.obj").unwrap_err();
        assert!(matches!(err, AssetError::NotFound(name) if name == "teapot.obj"));
        assert!(scene.children(root).is_empty());
    }

    #[test]
    fn broken_faces_are_rejected() {
        let mut library = ModelLibrary::new();
        let mut mesh = ModelMesh::cuboid("broken", [1.0; 3], [1.0; 3]);
        mesh.faces.push([1, 2, 99]);
        library.register(mesh);
        let mut scene = SceneGraph::new();
        let root = scene.create_group();
        let err = library.load_model(&mut scene, root, "broken").unwrap_err();
        assert!(matches!(err, AssetError::InvalidModel { .. }));
    }

    #[test]
    fn save_and_load() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        let library = ModelLibrary::with_builtin_models();
        library.save(tmp.path()).unwrap();

        let loaded = ModelLibrary::load(tmp.path()).unwrap();
        assert_eq!(loaded.len(), 1);
        let mesh = loaded.find(CONTROLLER_MODEL).unwrap();
        assert_eq!(mesh.faces, library.find(CONTROLLER_MODEL).unwrap().faces);
    }
}
