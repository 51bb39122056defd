use browserworld_assets::ModelLoader;
use browserworld_render::{
    Color, Geometry, Light, NodeId, RenderState, SceneError, SceneGraph, TextureSurface,
    VertexArray,
};
use glam::{Mat4, Vec3};

use crate::config::WorldConfig;

/// Nodes the frame loop animates.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneHandles {
    pub browser: NodeId,
    pub controller: NodeId,
    /// Geometry attached by the model loader, if the load succeeded.
    pub controller_model: Option<NodeId>,
}

/// Builds the static scene: a light, the textured browser quad and the controller.
#[derive(Debug, Default)]
pub struct SceneAssembler {
    builds: u32,
}

impl SceneAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// How many times [`build`](Self::build) has run.
    pub fn builds(&self) -> u32 {
        self.builds
    }

    pub fn build(
        &mut self,
        scene: &mut SceneGraph,
        root: NodeId,
        surface: &TextureSurface,
        loader: &mut dyn ModelLoader,
        config: &WorldConfig,
    ) -> Result<SceneHandles, SceneError> {
        self.builds += 1;
        scene.add_light(root, Light::default())?;

        let quad = scene.create_geometry(browser_quad(surface, config.browser_half_extent)?);
        let browser = scene.create_transform(Mat4::IDENTITY);
        scene.add_node(browser, quad)?;
        scene.add_node(root, browser)?;

        let controller = scene.create_transform(Mat4::IDENTITY);
        let controller_model = match loader.load_model(scene, controller, &config.controller_model)
        {
            Ok(node) => Some(node),
            Err(e) => {
                tracing::warn!(model = %config.controller_model, "controller model not loaded: {e}");
                None
            }
        };
        scene.add_node(root, controller)?;
        scene.set_transform(
            controller,
            Mat4::from_translation(Vec3::new(0.0, 0.0, config.controller_offset)),
        )?;

        tracing::info!(
            nodes = scene.node_count(),
            surface = surface.name(),
            "static scene built"
        );
        Ok(SceneHandles {
            browser,
            controller,
            controller_model,
        })
    }
}

/// Square in the XY plane textured with `surface`, visible from both sides.
fn browser_quad(surface: &TextureSurface, half_extent: f32) -> Result<Geometry, SceneError> {
    let k = half_extent;
    let mut array = VertexArray::new();
    array.append_vertex(Vec3::new(-k, -k, 0.0)); // bottom left
    array.append_vertex(Vec3::new(k, -k, 0.0)); // bottom right
    array.append_vertex(Vec3::new(k, k, 0.0)); // top right
    array.append_vertex(Vec3::new(-k, k, 0.0)); // top left

    array.append_uv(Vec3::new(0.0, 1.0, 0.0));
    array.append_uv(Vec3::new(1.0, 1.0, 0.0));
    array.append_uv(Vec3::new(1.0, 0.0, 0.0));
    array.append_uv(Vec3::new(0.0, 0.0, 0.0));

    array.append_normal(Vec3::Z);
    array.append_normal(-Vec3::Z);

    let mut state = RenderState::default();
    state.set_texture(surface.clone());
    state.set_material(
        Color::rgb(0.4, 0.4, 0.4),
        Color::rgb(1.0, 1.0, 1.0),
        Color::rgb(0.0, 0.0, 0.0),
        0.0,
    );

    let mut geometry = Geometry::new(array, state);
    geometry.add_face(&[1, 2, 3, 4], &[1, 2, 3, 4], &[1, 1, 1, 1])?;
    // back face, reversed winding
    geometry.add_face(&[1, 4, 3, 2], &[1, 4, 3, 2], &[2, 2, 2, 2])?;
    Ok(geometry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use browserworld_assets::{AssetError, ModelLibrary};
    use browserworld_render::{NodeKind, SurfaceTextureFactory};

    struct NoModels;

    impl ModelLoader for NoModels {
        fn load_model(
            &mut self,
            _scene: &mut SceneGraph,
            _root: NodeId,
            name: &str,
        ) -> Result<NodeId, AssetError> {
            Err(AssetError::NotFound(name.to_owned()))
        }
    }

    fn setup() -> (SceneGraph, NodeId, TextureSurface) {
        let factory = SurfaceTextureFactory::new();
        let surface = TextureSurface::create(&factory, "browser");
        let mut scene = SceneGraph::new();
        let root = scene.create_group();
        (scene, root, surface)
    }

    #[test]
    fn builds_browser_and_controller_under_root() {
        let (mut scene, root, surface) = setup();
        let mut library = ModelLibrary::with_builtin_models();
        let mut assembler = SceneAssembler::new();

        let handles = assembler
            .build(&mut scene, root, &surface, &mut library, &WorldConfig::default())
            .unwrap();

        assert_eq!(scene.children(root), &[handles.browser, handles.controller]);
        assert_eq!(scene.lights(root).len(), 1);
        assert!(handles.controller_model.is_some());
        assert_eq!(
            scene.transform(handles.controller),
            Some(Mat4::from_translation(Vec3::new(0.0, 0.0, 15.5)))
        );
        assert_eq!(assembler.builds(), 1);
    }

    #[test]
    fn browser_quad_is_textured_and_double_sided() {
        let (mut scene, root, surface) = setup();
        let handles = SceneAssembler::new()
            .build(&mut scene, root, &surface, &mut NoModels, &WorldConfig::default())
            .unwrap();

        let quad = scene.children(handles.browser)[0];
        let Some(NodeKind::Geometry(geometry)) = scene.kind(quad) else {
            panic!("browser child is not geometry");
        };
        assert_eq!(geometry.faces().len(), 2);
        assert_eq!(
            geometry.render_state().texture.as_ref().map(|t| t.name()),
            Some("browser")
        );
        assert_eq!(geometry.vertex_array().vertices()[2], Vec3::new(5.0, 5.0, 0.0));
    }

    #[test]
    fn missing_model_still_places_controller() {
        let (mut scene, root, surface) = setup();
        let handles = SceneAssembler::new()
            .build(&mut scene, root, &surface, &mut NoModels, &WorldConfig::default())
            .unwrap();

        assert!(handles.controller_model.is_none());
        assert!(scene.children(handles.controller).is_empty());
        assert!(scene.children(root).contains(&handles.controller));
    }
}
