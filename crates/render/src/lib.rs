//! Graphics engine seam: scene graph primitives, camera, cull/draw pipeline,
//! and the surface texture factory.
//!
//! # Invariants
//! - The scene graph, camera and draw list are touched only by the render thread.
//! - The surface texture factory is the only type shared across threads; its
//!   observer registry never owns the observers.
//!
//! # Workaround
//! `HeadlessContext` stands in for a GL-backed context. The `GraphicsContext`
//! trait is stable; a GPU implementation slots in without changing consumers.

mod camera;
mod context;
mod cull;
mod headless;
mod scene;
mod surface;

pub use camera::{CameraSimple, FOV_DERIVE};
pub use context::{GraphicsContext, RenderError};
pub use cull::{CullVisitor, Drawable, DrawableList};
pub use headless::{ContextStats, HeadlessContext};
pub use scene::{
    Color, Face, Geometry, Light, NodeId, NodeKind, RenderState, SceneError, SceneGraph,
    VertexArray,
};
pub use surface::{SurfaceTextureFactory, SurfaceTextureObserver, TextureSurface};

pub fn crate_info() -> &'static str {
    "browserworld-render v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("render"));
    }
}
