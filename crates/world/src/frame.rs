use browserworld_render::{
    CameraSimple, CullVisitor, DrawableList, GraphicsContext, NodeId, SceneGraph,
};
use glam::{Mat4, Vec3};

use crate::config::WorldConfig;
use crate::heading::Heading;
use crate::scene::SceneHandles;

/// Controller pose for `heading`: translation, then a yaw-and-roll wobble.
///
/// The roll about Z is pre-multiplied by the yaw about Y, and that product is
/// post-multiplied onto the translation: `T · (Ry · Rz)`.
pub fn controller_transform(heading: f32, offset: f32) -> Mat4 {
    let roll = Mat4::from_rotation_z(heading);
    let wobble = Mat4::from_rotation_y(heading) * roll;
    Mat4::from_translation(Vec3::new(0.0, 0.0, offset)) * wobble
}

/// Browser quad pose for `heading`: a pure yaw.
pub fn browser_transform(heading: f32) -> Mat4 {
    Mat4::from_rotation_y(heading)
}

/// Per-frame update, cull and draw sequence.
#[derive(Debug, Default)]
pub struct FrameScheduler {
    cull: CullVisitor,
    draw_list: DrawableList,
    heading: Heading,
    frames: u64,
    draw_errors: u64,
}

impl FrameScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn heading(&self) -> Heading {
        self.heading
    }

    /// Frames that ran the full sequence.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn draw_errors(&self) -> u64 {
        self.draw_errors
    }

    pub fn draw_list(&self) -> &DrawableList {
        &self.draw_list
    }

    /// Run one frame. Failures inside a step are logged; the heading always advances.
    pub fn run<C: GraphicsContext>(
        &mut self,
        context: &mut C,
        scene: &mut SceneGraph,
        root: NodeId,
        handles: &SceneHandles,
        camera: &CameraSimple,
        config: &WorldConfig,
    ) {
        context.update();

        let h = self.heading.radians();
        if let Err(e) = scene.set_transform(handles.controller, controller_transform(h, config.controller_offset)) {
            tracing::warn!("controller transform not updated: {e}");
        }
        if let Err(e) = scene.set_transform(handles.browser, browser_transform(h)) {
            tracing::warn!("browser transform not updated: {e}");
        }

        self.draw_list.reset();
        match self.cull.cull(scene, root, &mut self.draw_list) {
            Ok(count) => {
                tracing::trace!(drawables = count, "cull complete");
                if let Err(e) = context.execute(&self.draw_list, camera) {
                    self.draw_errors += 1;
                    tracing::warn!(frame = self.frames, "draw failed: {e}");
                }
            }
            Err(e) => {
                self.draw_errors += 1;
                tracing::warn!(frame = self.frames, "cull failed: {e}");
            }
        }

        self.frames += 1;
        self.heading.advance(config.heading_step);
    }
}
