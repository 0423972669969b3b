//! Per-frame loop: event draining, scene recording and presentation.

mod frame_loop;
mod scene;

use std::time::Duration;

pub use frame_loop::{FrameLoop, IDLE_POLL};
pub use scene::{CONSTANTS_VARIABLE, RenderScene};

/// Platform events the frame loop reacts to.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum PlatformEvent {
    Quit,
    /// New drawable size in physical pixels. May be zero while minimized.
    Resized { width: u32, height: u32 },
}

/// Non-blocking source of [`PlatformEvent`]s.
pub trait EventPump {
    /// Appends every pending event to `events`, waiting at most `timeout`
    /// for the first one. `Some(Duration::ZERO)` never waits.
    fn poll_events(&mut self, timeout: Option<Duration>, events: &mut Vec<PlatformEvent>);
}

/// Where the loop is within an iteration.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum FrameState {
    Running,
    ProcessingEvents,
    Rendering,
    Presenting,
    /// Terminal.
    Closed,
}

/// What the caller should do after a [`FrameLoop::step`].
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum FrameControl {
    Continue,
    Exit,
}

/// Counts reported when the loop closes normally.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct LoopSummary {
    pub frames_presented: u64,
    /// Iterations without a present: minimized window or a transient
    /// surface failure.
    pub frames_skipped: u64,
}
