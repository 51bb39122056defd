use std::fmt;

/// Logical name of the surface that carries browser content.
pub const BROWSER_SURFACE: &str = "browser";

/// Opaque reference to a platform surface (the object a producer renders into).
///
/// The graphics engine owns the underlying object. Holders only pass the
/// reference through; it is never retained past the event that carried it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PlatformSurface(pub u64);

/// GL texture name backing a surface texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TextureHandle(pub u32);

/// Opaque reference to the host's asset service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AssetManagerRef(pub u64);

/// Opaque reference to a host-side object (the activity receiving callbacks).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ActivityRef(pub u64);

impl fmt::Display for PlatformSurface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "surface#{}", self.0)
    }
}

impl fmt::Display for TextureHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tex#{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handles_compare_by_value() {
        assert_eq!(PlatformSurface(7), PlatformSurface(7));
        assert_ne!(TextureHandle(1), TextureHandle(2));
    }

    #[test]
    fn display_formats() {
        assert_eq!(PlatformSurface(3).to_string(), "surface#3");
        assert_eq!(TextureHandle(9).to_string(), "tex#9");
    }
}
