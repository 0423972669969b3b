use thiserror::Error;

/// Error returned by calls through the graphics capability interface.
#[derive(Debug, Clone, Error, Eq, PartialEq)]
pub enum GfxError {
    #[error("shader `{name}` failed to compile: {message}")]
    ShaderCompilation { name: String, message: String },

    #[error("failed to create pipeline `{name}`: {message}")]
    PipelineCreation { name: String, message: String },

    #[error("failed to create buffer `{label}`: {message}")]
    BufferCreation { label: String, message: String },

    #[error("buffer `{0}` is not host-writable")]
    NotMappable(String),

    #[error("{resource} was created by the {found} backend but used with {expected}")]
    BackendMismatch {
        resource: &'static str,
        expected: &'static str,
        found: &'static str,
    },

    /// Transient condition; the caller should skip the current frame.
    #[error("frame skipped: {0}")]
    FrameSkipped(String),

    #[error("surface error: {0}")]
    Surface(String),

    #[error("out of GPU memory")]
    OutOfMemory,
}

pub type GfxResult<T> = Result<T, GfxError>;
