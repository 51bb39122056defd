//! Shared handle types for the browserworld render loop.
//!
//! # Invariants
//! - Handles are opaque values; ownership of what they name stays with the
//!   engine or host that issued them.

mod types;

pub use types::{ActivityRef, AssetManagerRef, BROWSER_SURFACE, PlatformSurface, TextureHandle};
