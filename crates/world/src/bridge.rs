use std::sync::Weak;
use std::sync::atomic::{AtomicU64, Ordering};

use browserworld_common::{PlatformSurface, TextureHandle};
use browserworld_host::SurfaceCallback;
use browserworld_render::SurfaceTextureObserver;

/// The part of a browser world reachable from engine threads.
///
/// Holds only the host callback and event counters; scene and frame state
/// stay with the render thread.
#[derive(Debug, Default)]
pub struct WorldShared {
    callback: SurfaceCallback,
    surface_events: AtomicU64,
    dispatched: AtomicU64,
}

impl WorldShared {
    pub fn new(callback: SurfaceCallback) -> Self {
        Self {
            callback,
            ..Self::default()
        }
    }

    pub fn callback(&self) -> &SurfaceCallback {
        &self.callback
    }

    /// Forward a surface change to the host callback.
    pub fn set_surface_texture(&self, name: &str, surface: Option<PlatformSurface>) -> bool {
        self.surface_events.fetch_add(1, Ordering::Relaxed);
        let sent = self.callback.dispatch(name, surface);
        if sent {
            self.dispatched.fetch_add(1, Ordering::Relaxed);
        }
        sent
    }

    /// Surface events that reached this world.
    pub fn surface_events(&self) -> u64 {
        self.surface_events.load(Ordering::Relaxed)
    }

    /// Surface events that produced a host call.
    pub fn dispatched(&self) -> u64 {
        self.dispatched.load(Ordering::Relaxed)
    }
}

/// Texture factory observer that forwards to a world it does not own.
///
/// Events arriving after the world is dropped are discarded.
#[derive(Debug)]
pub struct SurfaceBridge {
    world: Weak<WorldShared>,
}

impl SurfaceBridge {
    pub fn new(world: Weak<WorldShared>) -> Self {
        Self { world }
    }

    /// Whether the world this bridge serves is still alive.
    pub fn is_connected(&self) -> bool {
        self.world.strong_count() > 0
    }

    fn forward(&self, name: &str, surface: Option<PlatformSurface>) {
        match self.world.upgrade() {
            Some(world) => {
                world.set_surface_texture(name, surface);
            }
            None => tracing::trace!(%name, "world gone; surface event dropped"),
        }
    }
}

impl SurfaceTextureObserver for SurfaceBridge {
    fn surface_texture_created(&self, name: &str, _handle: TextureHandle, surface: PlatformSurface) {
        self.forward(name, Some(surface));
    }

    // Handle rebinding is not forwarded to the host.
    fn surface_texture_handle_updated(&self, _name: &str, _handle: TextureHandle) {}

    fn surface_texture_destroyed(&self, name: &str) {
        self.forward(name, None);
    }

    fn surface_texture_creation_error(&self, name: &str, reason: &str) {
        tracing::debug!(%name, %reason, "surface texture creation error ignored");
    }
}
