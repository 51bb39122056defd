use std::fmt;
use std::sync::Arc;

use browserworld_common::{ActivityRef, PlatformSurface};
use parking_lot::RwLock;

use crate::runtime::{GlobalRef, HostRuntime, HostValue, LocalString, MethodId};

/// Host method receiving surface texture changes.
pub const SET_SURFACE_TEXTURE_METHOD: &str = "setSurfaceTexture";
pub const SET_SURFACE_TEXTURE_SIGNATURE: &str =
    "(Ljava/lang/String;Landroid/graphics/SurfaceTexture;II)V";

/// Logical texture size reported with every surface callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SurfaceDimensions {
    pub width: i32,
    pub height: i32,
}

impl Default for SurfaceDimensions {
    fn default() -> Self {
        Self {
            width: 1024,
            height: 1024,
        }
    }
}

/// Reasons attaching to the host left the callback unset.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AttachError {
    #[error("no host environment handle")]
    MissingEnvironment,
    #[error("no activity reference")]
    MissingActivity,
    #[error("could not create a global reference to the activity")]
    ActivityRefFailed,
    #[error("failed to find host method: {name} {signature}")]
    MethodNotFound {
        name: &'static str,
        signature: &'static str,
    },
}

/// Cached host handles. A callback fires only when all three are present.
#[derive(Clone, Default)]
pub struct HostBinding {
    pub runtime: Option<Arc<dyn HostRuntime>>,
    pub activity: Option<Arc<GlobalRef>>,
    pub method: Option<MethodId>,
}

impl HostBinding {
    pub fn is_complete(&self) -> bool {
        self.runtime.is_some() && self.activity.is_some() && self.method.is_some()
    }
}

impl fmt::Debug for HostBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostBinding")
            .field("runtime", &self.runtime.is_some())
            .field("activity", &self.activity.as_ref().map(|a| a.get()))
            .field("method", &self.method)
            .finish()
    }
}

/// Outbound `setSurfaceTexture` callback.
///
/// The binding is written by `attach`/`release` on the render thread and read
/// by `dispatch` from any thread. `dispatch` copies the handles out before
/// calling into the host, so no lock is held across host code; the activity
/// reference it copied stays valid until that call returns.
#[derive(Debug, Default)]
pub struct SurfaceCallback {
    binding: RwLock<HostBinding>,
    dimensions: SurfaceDimensions,
}

impl SurfaceCallback {
    pub fn new(dimensions: SurfaceDimensions) -> Self {
        Self {
            binding: RwLock::new(HostBinding::default()),
            dimensions,
        }
    }

    pub fn dimensions(&self) -> SurfaceDimensions {
        self.dimensions
    }

    /// Resolve and cache the host callback.
    ///
    /// Whatever resolved before a failure stays cached; `dispatch` treats a
    /// partial binding as a no-op. A previous binding is released first.
    pub fn attach(
        &self,
        runtime: Option<Arc<dyn HostRuntime>>,
        activity: Option<ActivityRef>,
    ) -> Result<(), AttachError> {
        self.release();
        let mut binding = HostBinding {
            runtime: runtime.clone(),
            ..HostBinding::default()
        };
        let result = resolve(&mut binding, runtime, activity);
        *self.binding.write() = binding;
        result
    }

    /// Drop the cached activity and method. Later dispatches are no-ops.
    ///
    /// The activity reference is deleted once no dispatch in flight holds it.
    pub fn release(&self) {
        let old = std::mem::take(&mut *self.binding.write());
        drop(old);
    }

    pub fn is_bound(&self) -> bool {
        self.binding.read().is_complete()
    }

    pub fn binding(&self) -> HostBinding {
        self.binding.read().clone()
    }

    /// Forward a surface change to the host. Returns whether a call was issued.
    pub fn dispatch(&self, name: &str, surface: Option<PlatformSurface>) -> bool {
        let binding = self.binding.read().clone();
        let (Some(runtime), Some(activity), Some(method)) =
            (binding.runtime, binding.activity, binding.method)
        else {
            tracing::trace!(%name, "no host callback bound; surface change dropped");
            return false;
        };

        let Some(host_name) = LocalString::new(runtime.as_ref(), name) else {
            tracing::warn!(%name, "failed to marshal surface name");
            return false;
        };
        let args = [
            HostValue::Str(host_name.local()),
            HostValue::Surface(surface),
            HostValue::Int(self.dimensions.width),
            HostValue::Int(self.dimensions.height),
        ];
        match runtime.call_void_method(activity.get(), method, &args) {
            Ok(()) => {
                tracing::debug!(%name, present = surface.is_some(), "surface texture dispatched");
                true
            }
            Err(e) => {
                tracing::warn!(%name, "surface texture callback failed: {e}");
                false
            }
        }
    }
}

fn resolve(
    binding: &mut HostBinding,
    runtime: Option<Arc<dyn HostRuntime>>,
    activity: Option<ActivityRef>,
) -> Result<(), AttachError> {
    let runtime = runtime.ok_or(AttachError::MissingEnvironment)?;
    let activity = activity.ok_or(AttachError::MissingActivity)?;
    let global = GlobalRef::new(Arc::clone(&runtime), activity)
        .ok_or(AttachError::ActivityRefFailed)?;
    let method = runtime.resolve_method(
        global.get(),
        SET_SURFACE_TEXTURE_METHOD,
        SET_SURFACE_TEXTURE_SIGNATURE,
    );
    binding.activity = Some(Arc::new(global));
    let method = method.ok_or(AttachError::MethodNotFound {
        name: SET_SURFACE_TEXTURE_METHOD,
        signature: SET_SURFACE_TEXTURE_SIGNATURE,
    })?;
    binding.method = Some(method);
    Ok(())
}
