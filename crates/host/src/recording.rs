use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicBool, Ordering};

use browserworld_common::{ActivityRef, PlatformSurface};
use parking_lot::Mutex;

use crate::callback::{SET_SURFACE_TEXTURE_METHOD, SET_SURFACE_TEXTURE_SIGNATURE};
use crate::runtime::{HostError, HostRuntime, HostValue, LocalRef, MethodId};

/// One `setSurfaceTexture` call as received by the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SurfaceCall {
    pub name: String,
    pub surface: Option<PlatformSurface>,
    pub width: i32,
    pub height: i32,
}

#[derive(Debug, Default)]
struct Recorded {
    next_ref: u64,
    strings: BTreeMap<LocalRef, String>,
    strings_allocated: usize,
    global_refs: BTreeSet<u64>,
    calls: Vec<SurfaceCall>,
}

impl Recorded {
    fn next(&mut self) -> u64 {
        self.next_ref += 1;
        self.next_ref
    }
}

/// In-process host that records every surface callback.
///
/// Tracks live string and global references so leaks are observable, and can
/// be configured to fail each attach step or the call itself.
#[derive(Debug, Default)]
pub struct RecordingHost {
    state: Mutex<Recorded>,
    refuse_global_refs: bool,
    hide_method: bool,
    fail_calls: AtomicBool,
}

impl RecordingHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Refuse to create global references.
    pub fn without_global_refs(mut self) -> Self {
        self.refuse_global_refs = true;
        self
    }

    /// Pretend the activity has no `setSurfaceTexture` method.
    pub fn without_method(mut self) -> Self {
        self.hide_method = true;
        self
    }

    pub fn set_call_failure(&self, fail: bool) {
        self.fail_calls.store(fail, Ordering::SeqCst);
    }

    pub fn calls(&self) -> Vec<SurfaceCall> {
        self.state.lock().calls.clone()
    }

    pub fn live_strings(&self) -> usize {
        self.state.lock().strings.len()
    }

    pub fn strings_allocated(&self) -> usize {
        self.state.lock().strings_allocated
    }

    pub fn live_global_refs(&self) -> usize {
        self.state.lock().global_refs.len()
    }
}

impl HostRuntime for RecordingHost {
    fn new_global_ref(&self, _object: ActivityRef) -> Option<ActivityRef> {
        if self.refuse_global_refs {
            return None;
        }
        let mut state = self.state.lock();
        let id = state.next();
        state.global_refs.insert(id);
        Some(ActivityRef(id))
    }

    fn delete_global_ref(&self, object: ActivityRef) {
        self.state.lock().global_refs.remove(&object.0);
    }

    fn resolve_method(&self, _object: ActivityRef, name: &str, signature: &str) -> Option<MethodId> {
        let known =
            name == SET_SURFACE_TEXTURE_METHOD && signature == SET_SURFACE_TEXTURE_SIGNATURE;
        (known && !self.hide_method).then_some(MethodId(1))
    }

    fn new_string_utf(&self, value: &str) -> Option<LocalRef> {
        let mut state = self.state.lock();
        let local = LocalRef(state.next());
        state.strings.insert(local, value.to_owned());
        state.strings_allocated += 1;
        Some(local)
    }

    fn delete_local_ref(&self, local: LocalRef) {
        self.state.lock().strings.remove(&local);
    }

    fn call_void_method(
        &self,
        object: ActivityRef,
        method: MethodId,
        args: &[HostValue],
    ) -> Result<(), HostError> {
        if self.fail_calls.load(Ordering::SeqCst) {
            return Err(HostError::Exception("injected failure".into()));
        }
        let mut state = self.state.lock();
        if !state.global_refs.contains(&object.0) {
            return Err(HostError::CallFailed(format!("stale reference {object:?}")));
        }
        let call = match args {
            [
                HostValue::Str(name),
                HostValue::Surface(surface),
                HostValue::Int(width),
                HostValue::Int(height),
            ] => {
                let name = state
                    .strings
                    .get(name)
                    .cloned()
                    .ok_or_else(|| HostError::CallFailed(format!("dead string {name:?}")))?;
                SurfaceCall {
                    name,
                    surface: *surface,
                    width: *width,
                    height: *height,
                }
            }
            _ => {
                return Err(HostError::CallFailed(format!(
                    "bad arguments for {method:?}: {args:?}"
                )));
            }
        };
        tracing::info!(
            name = %call.name,
            surface = ?call.surface,
            width = call.width,
            height = call.height,
            "host received setSurfaceTexture"
        );
        state.calls.push(call);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strings_are_tracked() {
        let host = RecordingHost::new();
        let local = host.new_string_utf("browser").unwrap();
        assert_eq!(host.live_strings(), 1);
        host.delete_local_ref(local);
        assert_eq!(host.live_strings(), 0);
        assert_eq!(host.strings_allocated(), 1);
    }

    #[test]
    fn calls_on_deleted_activity_fail() {
        let host = RecordingHost::new();
        let activity = host.new_global_ref(ActivityRef(9)).unwrap();
        host.delete_global_ref(activity);
        let name = host.new_string_utf("browser").unwrap();
        let result = host.call_void_method(
            activity,
            MethodId(1),
            &[
                HostValue::Str(name),
                HostValue::Surface(None),
                HostValue::Int(1),
                HostValue::Int(1),
            ],
        );
        assert!(matches!(result, Err(HostError::CallFailed(_))));
    }

    #[test]
    fn resolve_checks_signature() {
        let host = RecordingHost::new();
        let activity = ActivityRef(1);
        assert!(host
            .resolve_method(activity, SET_SURFACE_TEXTURE_METHOD, SET_SURFACE_TEXTURE_SIGNATURE)
            .is_some());
        assert!(host
            .resolve_method(activity, SET_SURFACE_TEXTURE_METHOD, "()V")
            .is_none());
    }
}
