use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, Weak};

use browserworld_common::{PlatformSurface, TextureHandle};
use parking_lot::Mutex;

/// Receiver of surface texture lifecycle events.
///
/// Events may be delivered on any thread, so implementors must be `Send + Sync`.
pub trait SurfaceTextureObserver: Send + Sync {
    fn surface_texture_created(&self, name: &str, handle: TextureHandle, surface: PlatformSurface);
    fn surface_texture_handle_updated(&self, name: &str, handle: TextureHandle);
    fn surface_texture_destroyed(&self, name: &str);
    fn surface_texture_creation_error(&self, name: &str, reason: &str);
}

/// A texture bound to a logical surface name, attachable to a render state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureSurface {
    name: String,
}

impl TextureSurface {
    /// Create a texture for `name` and register the name with the factory.
    pub fn create(factory: &SurfaceTextureFactory, name: &str) -> Self {
        factory.register_surface(name);
        Self {
            name: name.to_owned(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

#[derive(Debug, Clone, Copy)]
struct LiveSurface {
    handle: TextureHandle,
    surface: PlatformSurface,
}

#[derive(Debug, Default)]
struct FactoryState {
    registered: BTreeSet<String>,
    live: BTreeMap<String, LiveSurface>,
    next_handle: u32,
    next_surface: u64,
}

impl FactoryState {
    fn allocate(&mut self) -> LiveSurface {
        self.next_handle += 1;
        self.next_surface += 1;
        LiveSurface {
            handle: TextureHandle(self.next_handle),
            surface: PlatformSurface(self.next_surface),
        }
    }
}

/// Owner of platform surface textures and the process-wide observer registry.
///
/// The registry stores only `Weak` observers: registering never extends an
/// observer's lifetime, and dead entries are pruned on the next notification.
/// No lock is held while observers run, so an observer may call back into the
/// factory.
#[derive(Default)]
pub struct SurfaceTextureFactory {
    state: Mutex<FactoryState>,
    observers: Mutex<Vec<Weak<dyn SurfaceTextureObserver>>>,
}

impl std::fmt::Debug for SurfaceTextureFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SurfaceTextureFactory")
            .field("state", &*self.state.lock())
            .field("observers", &self.observers.lock().len())
            .finish()
    }
}

impl SurfaceTextureFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_global_observer(&self, observer: Weak<dyn SurfaceTextureObserver>) {
        self.observers.lock().push(observer);
    }

    /// Remove `observer`. Returns whether it was registered.
    pub fn remove_global_observer(&self, observer: &Arc<dyn SurfaceTextureObserver>) -> bool {
        let target = Arc::downgrade(observer);
        let mut observers = self.observers.lock();
        let before = observers.len();
        observers.retain(|o| !Weak::ptr_eq(o, &target));
        observers.len() != before
    }

    /// Number of observers that are still alive.
    pub fn observer_count(&self) -> usize {
        let mut observers = self.observers.lock();
        observers.retain(|o| o.strong_count() > 0);
        observers.len()
    }

    /// Declare a logical surface; it is created by the next [`create_pending`](Self::create_pending).
    pub fn register_surface(&self, name: &str) {
        self.state.lock().registered.insert(name.to_owned());
    }

    /// Allocate every registered surface that is not live yet and notify
    /// observers. Returns how many surfaces were created.
    pub fn create_pending(&self) -> usize {
        let created: Vec<(String, LiveSurface)> = {
            let mut state = self.state.lock();
            let pending: Vec<String> = state
                .registered
                .iter()
                .filter(|name| !state.live.contains_key(*name))
                .cloned()
                .collect();
            pending
                .into_iter()
                .map(|name| {
                    let live = state.allocate();
                    state.live.insert(name.clone(), live);
                    (name, live)
                })
                .collect()
        };

        for (name, live) in &created {
            tracing::debug!(%name, handle = %live.handle, "surface texture created");
            self.notify(|o| o.surface_texture_created(name, live.handle, live.surface));
        }
        created.len()
    }

    /// Rebind a live surface to a fresh texture handle.
    pub fn update_handle(&self, name: &str) -> Option<TextureHandle> {
        let handle = {
            let mut state = self.state.lock();
            state.next_handle += 1;
            let handle = TextureHandle(state.next_handle);
            let live = state.live.get_mut(name)?;
            live.handle = handle;
            handle
        };
        self.notify(|o| o.surface_texture_handle_updated(name, handle));
        Some(handle)
    }

    /// Destroy a live surface. Returns whether it existed.
    pub fn destroy(&self, name: &str) -> bool {
        let removed = self.state.lock().live.remove(name).is_some();
        if removed {
            tracing::debug!(%name, "surface texture destroyed");
            self.notify(|o| o.surface_texture_destroyed(name));
        }
        removed
    }

    /// Destroy every live surface, notifying once per surface.
    pub fn destroy_all(&self) -> usize {
        let names: Vec<String> = std::mem::take(&mut self.state.lock().live)
            .into_keys()
            .collect();
        for name in &names {
            tracing::debug!(%name, "surface texture destroyed");
            self.notify(|o| o.surface_texture_destroyed(name));
        }
        names.len()
    }

    pub fn report_creation_error(&self, name: &str, reason: &str) {
        tracing::warn!(%name, %reason, "surface texture creation failed");
        self.notify(|o| o.surface_texture_creation_error(name, reason));
    }

    /// Current handle and platform surface for `name`, if live.
    pub fn surface(&self, name: &str) -> Option<(TextureHandle, PlatformSurface)> {
        self.state
            .lock()
            .live
            .get(name)
            .map(|l| (l.handle, l.surface))
    }

    fn notify(&self, event: impl Fn(&dyn SurfaceTextureObserver)) {
        let live: Vec<Arc<dyn SurfaceTextureObserver>> = {
            let mut observers = self.observers.lock();
            observers.retain(|o| o.strong_count() > 0);
            observers.iter().filter_map(Weak::upgrade).collect()
        };
        for observer in &live {
            event(observer.as_ref());
        }
    }
}
