//! Host environment seam: the cross-runtime surface texture callback.
//!
//! # Invariants
//! - A callback fires only when runtime, activity and method are all resolved.
//! - Marshaled strings are released on every exit path.
//! - Attach failures degrade to "no callback"; they are never fatal.

mod callback;
mod recording;
mod runtime;

pub use callback::{
    AttachError, HostBinding, SET_SURFACE_TEXTURE_METHOD, SET_SURFACE_TEXTURE_SIGNATURE,
    SurfaceCallback, SurfaceDimensions,
};
pub use recording::{RecordingHost, SurfaceCall};
pub use runtime::{GlobalRef, HostError, HostRuntime, HostValue, LocalRef, LocalString, MethodId};
