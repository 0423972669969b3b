//! Error taxonomy, one enum per lifecycle phase.
//!
//! Every phase error converts into [`EngineError`], which carries the process
//! exit code the binary reports.

use thiserror::Error;

use crate::backend::DeviceKind;
use crate::gfx::GfxError;

/// Window subsystem failures before any GPU work happens.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("failed to initialize the window subsystem: {0}")]
    WindowSubsystem(String),

    #[error("failed to create the main window: {0}")]
    WindowCreation(String),
}

/// Failures while selecting a backend and creating the session.
#[derive(Debug, Error)]
pub enum BackendInitError {
    #[error("device kind {kind} is not supported by this build")]
    UnsupportedDeviceKind { kind: DeviceKind },

    #[error("{kind} cannot render into a {window} window")]
    IncompatibleWindow { kind: DeviceKind, window: &'static str },

    #[error("{kind} requires an OS window, but the target is headless")]
    NoWindow { kind: DeviceKind },

    #[error("swapchain requested before the {kind} device was created")]
    DeviceNotCreated { kind: DeviceKind },

    #[error("{kind} adapter reports backend {found}")]
    BackendMismatch { kind: DeviceKind, found: String },

    #[error("{kind} initialization failed: {message}")]
    Backend { kind: DeviceKind, message: String },
}

impl BackendInitError {
    /// Flattens an `anyhow` chain into a typed backend failure.
    pub(crate) fn backend(kind: DeviceKind, err: anyhow::Error) -> Self {
        BackendInitError::Backend {
            kind,
            message: format!("{err:#}"),
        }
    }
}

/// Failures while building pipelines, bindings and buffers.
#[derive(Debug, Error)]
pub enum ResourceError {
    #[error(transparent)]
    Gfx(#[from] GfxError),

    #[error("shader `{name}` failed to compile: {message}")]
    ShaderCompilation { name: String, message: String },

    #[error("pipeline `{pipeline}` declares no variable named `{name}`")]
    UnknownVariable { pipeline: String, name: String },

    #[error("variable `{name}` of pipeline `{pipeline}` has no buffer bound")]
    UnboundVariable { pipeline: String, name: String },

    #[error("binding was created for another pipeline than `{pipeline}`")]
    StaleBinding { pipeline: String },

    #[error("refusing to upload an empty `{label}` buffer")]
    EmptyUpload { label: String },

    #[error("pipeline is missing its {0} shader")]
    MissingShader(&'static str),
}

/// Failures in the steady-state loop.
#[derive(Debug, Error)]
pub enum FrameError {
    #[error("frame {frame}: {source}")]
    Gfx {
        frame: u64,
        #[source]
        source: GfxError,
    },

    #[error("frame {frame}: {source}")]
    Resource {
        frame: u64,
        #[source]
        source: ResourceError,
    },
}

/// Any failure that ends a run.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Startup(#[from] StartupError),

    #[error(transparent)]
    BackendInit(#[from] BackendInitError),

    #[error(transparent)]
    Resource(#[from] ResourceError),

    #[error(transparent)]
    Frame(#[from] FrameError),
}

impl EngineError {
    /// Process exit code for this failure.
    pub fn exit_code(&self) -> i32 {
        match self {
            EngineError::Startup(StartupError::WindowSubsystem(_)) => -1,
            EngineError::Startup(StartupError::WindowCreation(_)) => -3,
            EngineError::BackendInit(_) => -5,
            EngineError::Resource(_) => -7,
            EngineError::Frame(_) => -9,
        }
    }
}
