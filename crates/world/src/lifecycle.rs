use browserworld_render::{CameraSimple, FOV_DERIVE};
use glam::{Mat4, Vec3};
use serde::Serialize;

use crate::config::WorldConfig;
use crate::scene::SceneHandles;

/// Externally visible lifecycle state of a browser world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LifecycleState {
    /// Constructed; no host attached and GL not up.
    Created,
    /// Host environment attached (possibly degraded); GL not up.
    HostAttached,
    /// GL up and frames are drawn.
    GlReady,
    /// GL up but drawing is suspended.
    Paused,
    /// Torn down; requires a fresh initialize before drawing again.
    ShutDown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GlState {
    Uninitialized,
    Ready,
    ShutDown,
}

/// What the next frame may do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FrameGate {
    Skip,
    NeedsGl,
    Draw,
}

/// GL and pause flags. All transitions go through these methods.
#[derive(Debug)]
pub(crate) struct Lifecycle {
    gl: GlState,
    paused: bool,
    host_attached: bool,
}

impl Lifecycle {
    pub(crate) fn new() -> Self {
        Self {
            gl: GlState::Uninitialized,
            paused: true,
            host_attached: false,
        }
    }

    pub(crate) fn state(&self) -> LifecycleState {
        match self.gl {
            GlState::ShutDown => LifecycleState::ShutDown,
            GlState::Ready if self.paused => LifecycleState::Paused,
            GlState::Ready => LifecycleState::GlReady,
            GlState::Uninitialized if self.host_attached => LifecycleState::HostAttached,
            GlState::Uninitialized => LifecycleState::Created,
        }
    }

    pub(crate) fn is_paused(&self) -> bool {
        self.paused
    }

    pub(crate) fn is_gl_ready(&self) -> bool {
        self.gl == GlState::Ready
    }

    pub(crate) fn pause(&mut self) {
        self.paused = true;
    }

    pub(crate) fn resume(&mut self) {
        self.paused = false;
    }

    pub(crate) fn mark_host_attached(&mut self) {
        self.host_attached = true;
    }

    /// Record the outcome of a GL initialization attempt.
    pub(crate) fn record_gl(&mut self, ready: bool) {
        self.gl = if ready {
            GlState::Ready
        } else {
            GlState::Uninitialized
        };
    }

    pub(crate) fn shut_down(&mut self) {
        self.gl = GlState::ShutDown;
        self.paused = true;
        self.host_attached = false;
    }

    pub(crate) fn frame_gate(&self) -> FrameGate {
        match (self.paused, self.gl) {
            (true, _) | (_, GlState::ShutDown) => FrameGate::Skip,
            (false, GlState::Uninitialized) => FrameGate::NeedsGl,
            (false, GlState::Ready) => FrameGate::Draw,
        }
    }
}

/// Guard for the once-per-lifetime static scene build.
#[derive(Debug)]
pub(crate) enum SceneSlot {
    Pending,
    Built(SceneHandles),
    Failed,
}

impl SceneSlot {
    /// Run `build` if nothing has been attempted yet. A failed build is not retried.
    pub(crate) fn ensure<E: std::fmt::Display>(
        &mut self,
        build: impl FnOnce() -> Result<SceneHandles, E>,
    ) {
        if !matches!(self, SceneSlot::Pending) {
            return;
        }
        *self = match build() {
            Ok(handles) => SceneSlot::Built(handles),
            Err(e) => {
                tracing::error!("static scene construction failed: {e}");
                SceneSlot::Failed
            }
        };
    }

    pub(crate) fn handles(&self) -> Option<&SceneHandles> {
        match self {
            SceneSlot::Built(handles) => Some(handles),
            _ => None,
        }
    }
}

/// Point the camera down -Z from the configured eye distance, fixing the
/// field of view on the longer viewport axis and deriving the other.
pub(crate) fn configure_camera(
    camera: &mut CameraSimple,
    width: f32,
    height: f32,
    config: &WorldConfig,
) {
    camera.set_viewport(width, height);
    let fov = config.field_of_view;
    if width > height {
        camera.set_field_of_view(fov, FOV_DERIVE);
    } else {
        camera.set_field_of_view(FOV_DERIVE, fov);
    }
    camera.set_transform(Mat4::from_translation(Vec3::new(
        0.0,
        0.0,
        config.forward_distance,
    )));
}
