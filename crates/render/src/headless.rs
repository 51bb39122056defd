use std::fmt::Write as _;
use std::sync::Arc;

use browserworld_common::AssetManagerRef;

use crate::camera::CameraSimple;
use crate::context::{GraphicsContext, RenderError};
use crate::cull::DrawableList;
use crate::surface::SurfaceTextureFactory;

/// Counters kept by [`HeadlessContext`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContextStats {
    pub gl_init_attempts: u32,
    pub updates: u64,
    pub executes: u64,
    pub drawables_drawn: u64,
    pub shutdowns: u32,
}

/// Reference engine without a GPU.
///
/// Behaves like a GL context for lifecycle purposes: registered surfaces are
/// created when GL comes up and destroyed on shutdown. Draws are counted, and
/// GL bring-up or drawing can be made to fail for exercising degraded paths.
#[derive(Debug, Default)]
pub struct HeadlessContext {
    factory: Arc<SurfaceTextureFactory>,
    assets: Option<AssetManagerRef>,
    gl_ready: bool,
    gl_failures_remaining: u32,
    fail_draws: bool,
    stats: ContextStats,
    last_frame: Option<String>,
}

impl HeadlessContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `count` GL initializations fail.
    pub fn with_gl_failures(count: u32) -> Self {
        Self {
            gl_failures_remaining: count,
            ..Self::default()
        }
    }

    pub fn set_draw_failure(&mut self, fail: bool) {
        self.fail_draws = fail;
    }

    pub fn is_gl_ready(&self) -> bool {
        self.gl_ready
    }

    pub fn assets(&self) -> Option<AssetManagerRef> {
        self.assets
    }

    pub fn stats(&self) -> &ContextStats {
        &self.stats
    }

    /// Text description of the most recent successful draw.
    pub fn last_frame(&self) -> Option<&str> {
        self.last_frame.as_deref()
    }

    /// Human-readable description of a draw list as seen from a camera.
    pub fn describe(list: &DrawableList, camera: &CameraSimple) -> String {
        let (w, h) = camera.viewport();
        let (fov_h, fov_v) = camera.resolved_field_of_view();
        let eye = camera.position();
        let mut out = String::new();
        let _ = writeln!(
            out,
            "viewport={w:.0}x{h:.0} fov=({fov_h:.1}, {fov_v:.1}) eye=({:.1}, {:.1}, {:.1})",
            eye.x, eye.y, eye.z
        );
        let _ = writeln!(out, "lights: {} drawables: {}", list.lights().len(), list.len());
        for d in list.drawables() {
            let p = d.world.w_axis;
            let _ = writeln!(
                out,
                "  [{:>3}] origin=({:.2}, {:.2}, {:.2})",
                d.geometry.0, p.x, p.y, p.z
            );
        }
        out
    }
}

impl GraphicsContext for HeadlessContext {
    fn initialize_platform(&mut self, assets: Option<AssetManagerRef>) {
        tracing::debug!(?assets, "headless platform initialized");
        self.assets = assets;
    }

    fn initialize_gl(&mut self) -> bool {
        self.stats.gl_init_attempts += 1;
        if self.gl_ready {
            return true;
        }
        if self.gl_failures_remaining > 0 {
            self.gl_failures_remaining -= 1;
            tracing::warn!(
                remaining = self.gl_failures_remaining,
                "headless GL initialization failed"
            );
            return false;
        }
        self.gl_ready = true;
        self.factory.create_pending();
        true
    }

    fn update(&mut self) {
        self.stats.updates += 1;
    }

    fn shutdown(&mut self) {
        if self.gl_ready {
            self.factory.destroy_all();
        }
        self.gl_ready = false;
        self.stats.shutdowns += 1;
    }

    fn surface_texture_factory(&self) -> Arc<SurfaceTextureFactory> {
        Arc::clone(&self.factory)
    }

    fn execute(&mut self, list: &DrawableList, camera: &CameraSimple) -> Result<(), RenderError> {
        if !self.gl_ready {
            return Err(RenderError::ContextLost);
        }
        if self.fail_draws {
            return Err(RenderError::DrawFailed("injected draw failure".into()));
        }
        self.stats.executes += 1;
        self.stats.drawables_drawn += list.len() as u64;
        self.last_frame = Some(Self::describe(list, camera));
        Ok(())
    }
}
