use std::f32::consts::{PI, TAU};
use std::path::{Path, PathBuf};

use browserworld_assets::CONTROLLER_MODEL;
use browserworld_common::BROWSER_SURFACE;
use browserworld_host::SurfaceDimensions;
use serde::{Deserialize, Serialize};

/// Errors from loading a [`WorldConfig`] file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("unsupported config format: {0}")]
    UnsupportedFormat(PathBuf),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Tunables for a browser world session. Missing fields take their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Camera distance from the origin along +Z.
    pub forward_distance: f32,
    /// Controller distance from the origin along +Z.
    pub controller_offset: f32,
    /// Heading advance per drawn frame, in radians.
    pub heading_step: f32,
    /// Field of view in degrees for the longer viewport axis.
    pub field_of_view: f32,
    /// Half the side length of the browser quad.
    pub browser_half_extent: f32,
    pub browser_surface: String,
    pub controller_model: String,
    /// Logical texture size reported to the host with every surface change.
    pub surface_width: i32,
    pub surface_height: i32,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            forward_distance: 16.0,
            controller_offset: 15.5,
            heading_step: PI / 120.0,
            field_of_view: 60.0,
            browser_half_extent: 5.0,
            browser_surface: BROWSER_SURFACE.to_owned(),
            controller_model: CONTROLLER_MODEL.to_owned(),
            surface_width: 1024,
            surface_height: 1024,
        }
    }
}

impl WorldConfig {
    /// Load from a `.json`, `.yaml` or `.yml` file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or_default();
        let config: Self = match ext {
            "json" => serde_json::from_reader(std::fs::File::open(path)?)?,
            "yaml" | "yml" => serde_yaml::from_reader(std::fs::File::open(path)?)?,
            _ => return Err(ConfigError::UnsupportedFormat(path.to_path_buf())),
        };
        config.validate()?;
        Ok(config)
    }

    /// Check values the frame loop and host callback rely on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.heading_step.is_finite() && self.heading_step > 0.0 && self.heading_step < TAU) {
            return Err(ConfigError::Invalid(format!(
                "heading_step must be in (0, 2π), got {}",
                self.heading_step
            )));
        }
        if self.surface_width <= 0 || self.surface_height <= 0 {
            return Err(ConfigError::Invalid(format!(
                "surface size must be positive, got {}x{}",
                self.surface_width, self.surface_height
            )));
        }
        Ok(())
    }

    pub fn surface_dimensions(&self) -> SurfaceDimensions {
        SurfaceDimensions {
            width: self.surface_width,
            height: self.surface_height,
        }
    }
}
