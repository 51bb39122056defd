//! Browser world orchestration: lifecycle, static scene assembly, the
//! per-frame loop and the bridge carrying surface texture events to the host.
//!
//! # Invariants
//! - `draw_frame` on a paused or shut-down world touches nothing.
//! - The static scene is built at most once per world.
//! - The surface bridge never keeps its world alive; events after the world
//!   is gone are discarded.
//! - The heading stays in `[0, 2π)`.

mod bridge;
mod config;
mod frame;
mod heading;
mod inspect;
mod lifecycle;
mod scene;
mod world;

pub use bridge::{SurfaceBridge, WorldShared};
pub use config::{ConfigError, WorldConfig};
pub use frame::{FrameScheduler, browser_transform, controller_transform};
pub use heading::Heading;
pub use inspect::WorldSummary;
pub use lifecycle::LifecycleState;
pub use scene::{SceneAssembler, SceneHandles};
pub use world::BrowserWorld;
