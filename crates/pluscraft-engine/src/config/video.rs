/// How the main window occupies the display.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
pub enum WindowMode {
    /// Decorated, resizable window.
    #[default]
    Windowed,
    /// Exclusive fullscreen at the requested resolution.
    Fullscreen,
    /// Borderless window covering the current monitor.
    Borderless,
}

/// Static video configuration, fixed at window creation.
///
/// The drawable size changes afterwards only through resize events; the record
/// itself is never mutated.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct VideoMode {
    pub width: u32,
    pub height: u32,

    /// Vertical syncs to wait for on present. `0` presents immediately.
    pub sync_interval: u32,

    pub window_mode: WindowMode,
}

impl VideoMode {
    pub const fn new(width: u32, height: u32, sync_interval: u32, window_mode: WindowMode) -> Self {
        Self {
            width,
            height,
            sync_interval,
            window_mode,
        }
    }
}

impl Default for VideoMode {
    fn default() -> Self {
        Self::new(1280, 720, 1, WindowMode::Windowed)
    }
}
