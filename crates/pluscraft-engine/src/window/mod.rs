//! Main window and platform event pumping.
//!
//! Owns the `winit` event loop and window and feeds [`crate::frame::PlatformEvent`]s
//! to the frame loop.

mod runtime;

pub use runtime::{WindowRuntime, centered_position, closest_video_mode, window_attributes};
