use std::sync::Arc;

use browserworld_common::AssetManagerRef;

use crate::camera::CameraSimple;
use crate::cull::DrawableList;
use crate::scene::SceneError;
use crate::surface::SurfaceTextureFactory;

/// Errors surfaced by the draw step.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RenderError {
    #[error("GL context is not initialized")]
    ContextLost,
    #[error("draw failed: {0}")]
    DrawFailed(String),
    #[error(transparent)]
    Scene(#[from] SceneError),
}

/// Graphics engine context: GL lifecycle, per-frame engine state, draw execution.
///
/// The orchestrator drives a context from the render thread only. The texture
/// factory it exposes is the one part reachable from other threads.
pub trait GraphicsContext {
    /// Give the engine access to the host's asset service.
    fn initialize_platform(&mut self, assets: Option<AssetManagerRef>);

    /// Bring up GL resources. Returns whether the context is usable.
    fn initialize_gl(&mut self) -> bool;

    /// Advance engine-owned per-frame state (resource streaming, clocks).
    fn update(&mut self);

    /// Release GL resources.
    fn shutdown(&mut self);

    fn surface_texture_factory(&self) -> Arc<SurfaceTextureFactory>;

    /// Issue the draw calls for `list` as seen from `camera`.
    fn execute(&mut self, list: &DrawableList, camera: &CameraSimple) -> Result<(), RenderError>;
}
