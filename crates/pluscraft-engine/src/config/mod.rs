//! Static engine configuration.
//!
//! Everything the core needs is a single `EngineConfig` record built at startup.
//! There is no config file; binaries may override individual fields before
//! handing the record to the bootstrap.

mod video;

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::backend::DeviceKind;

pub use video::{VideoMode, WindowMode};

/// Default clear color (linear RGBA).
pub const DEFAULT_CLEAR_COLOR: [f32; 4] = [0.350, 0.350, 0.350, 1.0];

/// Error returned when a configuration value cannot be parsed from text.
#[derive(Debug, Clone, Error, Eq, PartialEq)]
#[error("unknown {what} `{value}`")]
pub struct ParseConfigError {
    pub what: &'static str,
    pub value: String,
}

impl ParseConfigError {
    pub(crate) fn new(what: &'static str, value: &str) -> Self {
        Self {
            what,
            value: value.to_string(),
        }
    }
}

/// Which geometry the frame loop draws.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
pub enum SceneVariant {
    /// Indexed cube, depth tested, back faces culled.
    #[default]
    Cube,
    /// Single non-indexed triangle, no depth test, no culling.
    ///
    /// Not the static vertex-id triangle: vertices come from a buffer and go
    /// through the same constants as the cube, so it rotates too.
    Triangle,
}

impl SceneVariant {
    /// Device kind used when the configuration does not name one.
    pub fn default_device_kind(self) -> DeviceKind {
        match self {
            SceneVariant::Cube if cfg!(windows) => DeviceKind::D3D11,
            SceneVariant::Cube => DeviceKind::Vulkan,
            SceneVariant::Triangle => DeviceKind::OpenGl,
        }
    }
}

impl fmt::Display for SceneVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SceneVariant::Cube => f.write_str("cube"),
            SceneVariant::Triangle => f.write_str("triangle"),
        }
    }
}

impl FromStr for SceneVariant {
    type Err = ParseConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cube" => Ok(SceneVariant::Cube),
            "triangle" => Ok(SceneVariant::Triangle),
            _ => Err(ParseConfigError::new("scene variant", s)),
        }
    }
}

/// Per-variant pipeline and clear settings.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct SceneConfig {
    pub variant: SceneVariant,
    pub depth_test: bool,
    pub cull_back_faces: bool,
    pub clear_color: [f32; 4],
}

impl SceneConfig {
    pub fn for_variant(variant: SceneVariant) -> Self {
        let (depth_test, cull_back_faces) = match variant {
            SceneVariant::Cube => (true, true),
            SceneVariant::Triangle => (false, false),
        };
        Self {
            variant,
            depth_test,
            cull_back_faces,
            clear_color: DEFAULT_CLEAR_COLOR,
        }
    }
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self::for_variant(SceneVariant::default())
    }
}

/// Top-level configuration consumed by [`crate::bootstrap`].
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    pub title: String,
    pub video_mode: VideoMode,
    pub device_kind: DeviceKind,
    pub scene: SceneConfig,
}

impl EngineConfig {
    /// Configuration for `variant` with its default device kind.
    pub fn for_variant(variant: SceneVariant) -> Self {
        Self {
            title: "PlusCraft".to_string(),
            video_mode: VideoMode::default(),
            device_kind: variant.default_device_kind(),
            scene: SceneConfig::for_variant(variant),
        }
    }

    /// Replaces the scene variant, keeping title, video mode and device kind.
    pub fn with_variant(mut self, variant: SceneVariant) -> Self {
        self.scene = SceneConfig::for_variant(variant);
        self
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::for_variant(SceneVariant::default())
    }
}
