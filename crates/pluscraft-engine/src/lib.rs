//! PlusCraft engine crate.
//!
//! Opens a window, brings up one of several interchangeable GPU backends,
//! builds a minimal pipeline and drives the per-frame loop.

pub mod backend;
pub mod bootstrap;
pub mod config;
pub mod error;
pub mod frame;
pub mod geometry;
pub mod gfx;
pub mod logging;
pub mod pipeline;
pub mod session;
pub mod shader;
pub mod time;
pub mod transform;
pub mod window;

pub use bootstrap::{run, run_session};
pub use config::{EngineConfig, SceneConfig, SceneVariant, VideoMode, WindowMode};
pub use error::EngineError;
pub use frame::LoopSummary;
