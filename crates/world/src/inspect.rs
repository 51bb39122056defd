use serde::Serialize;

use crate::lifecycle::LifecycleState;

/// Point-in-time summary of a browser world, for logs and tooling.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorldSummary {
    pub state: LifecycleState,
    pub heading: f32,
    pub frames_drawn: u64,
    pub draw_errors: u64,
    pub scene_builds: u32,
    pub scene_nodes: usize,
    pub host_bound: bool,
    pub surface_events: u64,
    pub callbacks_dispatched: u64,
}

impl std::fmt::Display for WorldSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "World: state={:?} heading={:.4} frames={} draw_errors={} nodes={} host_bound={} surface_events={} dispatched={}",
            self.state,
            self.heading,
            self.frames_drawn,
            self.draw_errors,
            self.scene_nodes,
            self.host_bound,
            self.surface_events,
            self.callbacks_dispatched,
        )
    }
}
