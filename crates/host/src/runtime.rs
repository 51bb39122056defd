use std::fmt;
use std::sync::Arc;

use browserworld_common::{ActivityRef, PlatformSurface};

/// Resolved host method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MethodId(pub u64);

/// Short-lived host object reference (a marshaled string, for instance).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LocalRef(pub u64);

/// Argument passed across the runtime boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostValue {
    Str(LocalRef),
    Surface(Option<PlatformSurface>),
    Int(i32),
}

/// Errors raised by a cross-runtime call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HostError {
    #[error("host call failed: {0}")]
    CallFailed(String),
    #[error("host method raised: {0}")]
    Exception(String),
}

/// Cross-runtime services provided by the host environment.
///
/// Implementations must tolerate calls from any thread; surface texture events
/// reach the host from whichever thread the engine's factory runs on.
pub trait HostRuntime: Send + Sync {
    /// Promote `object` to a reference that outlives the current call.
    fn new_global_ref(&self, object: ActivityRef) -> Option<ActivityRef>;

    fn delete_global_ref(&self, object: ActivityRef);

    /// Look up an instance method on `object`'s class.
    fn resolve_method(&self, object: ActivityRef, name: &str, signature: &str) -> Option<MethodId>;

    /// Marshal `value` into a host-native string.
    fn new_string_utf(&self, value: &str) -> Option<LocalRef>;

    fn delete_local_ref(&self, local: LocalRef);

    fn call_void_method(
        &self,
        object: ActivityRef,
        method: MethodId,
        args: &[HostValue],
    ) -> Result<(), HostError>;
}

/// Host string released when dropped, on every exit path.
pub struct LocalString<'a> {
    runtime: &'a dyn HostRuntime,
    local: LocalRef,
}

impl<'a> LocalString<'a> {
    pub fn new(runtime: &'a dyn HostRuntime, value: &str) -> Option<Self> {
        runtime
            .new_string_utf(value)
            .map(|local| Self { runtime, local })
    }

    pub fn local(&self) -> LocalRef {
        self.local
    }
}

impl Drop for LocalString<'_> {
    fn drop(&mut self) {
        self.runtime.delete_local_ref(self.local);
    }
}

/// Global reference to a host object, deleted when the last holder drops it.
///
/// Shared through an `Arc` so a call in flight keeps the object valid even if
/// the binding that produced it has been released meanwhile.
pub struct GlobalRef {
    runtime: Arc<dyn HostRuntime>,
    object: ActivityRef,
}

impl GlobalRef {
    /// Promote `object`; `None` if the host refuses.
    pub fn new(runtime: Arc<dyn HostRuntime>, object: ActivityRef) -> Option<Self> {
        let object = runtime.new_global_ref(object)?;
        Some(Self { runtime, object })
    }

    pub fn get(&self) -> ActivityRef {
        self.object
    }
}

impl fmt::Debug for GlobalRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("GlobalRef").field(&self.object).finish()
    }
}

impl Drop for GlobalRef {
    fn drop(&mut self) {
        self.runtime.delete_global_ref(self.object);
    }
}
