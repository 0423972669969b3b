use std::sync::Arc;

use raw_window_handle::{HandleError, HasWindowHandle, RawWindowHandle};
use winit::window::Window;

/// OS-specific window handle wrapper, one variant per supported platform.
///
/// Pointer-sized handles are stored as integers; they identify the window but
/// are never dereferenced by this crate.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum NativeWindow {
    Win32 { hwnd: isize },
    AppKit { ns_view: usize },
    Xlib { window: u64 },
    Xcb { window: u32 },
    Wayland { surface: usize },
    /// No OS window. Only recording backends accept this.
    Headless,
}

impl NativeWindow {
    /// Wraps a raw handle, or `None` for platforms outside the supported set.
    pub fn from_raw(raw: RawWindowHandle) -> Option<Self> {
        match raw {
            RawWindowHandle::Win32(h) => Some(NativeWindow::Win32 { hwnd: h.hwnd.get() }),
            RawWindowHandle::AppKit(h) => Some(NativeWindow::AppKit {
                ns_view: h.ns_view.as_ptr() as usize,
            }),
            RawWindowHandle::Xlib(h) => Some(NativeWindow::Xlib {
                window: h.window as u64,
            }),
            RawWindowHandle::Xcb(h) => Some(NativeWindow::Xcb {
                window: h.window.get(),
            }),
            RawWindowHandle::Wayland(h) => Some(NativeWindow::Wayland {
                surface: h.surface.as_ptr() as usize,
            }),
            _ => None,
        }
    }

    pub fn platform_name(&self) -> &'static str {
        match self {
            NativeWindow::Win32 { .. } => "Win32",
            NativeWindow::AppKit { .. } => "AppKit",
            NativeWindow::Xlib { .. } => "Xlib",
            NativeWindow::Xcb { .. } => "Xcb",
            NativeWindow::Wayland { .. } => "Wayland",
            NativeWindow::Headless => "headless",
        }
    }

    pub fn is_headless(&self) -> bool {
        matches!(self, NativeWindow::Headless)
    }
}

/// What a backend renders into: the native handle, its drawable size and,
/// for real windows, the `winit` window the surface is created from.
#[derive(Debug, Clone)]
pub struct WindowTarget {
    native: NativeWindow,
    width: u32,
    height: u32,
    window: Option<Arc<Window>>,
}

impl WindowTarget {
    pub fn from_window(window: Arc<Window>) -> Result<Self, HandleError> {
        let raw = window.window_handle()?.as_raw();
        let native = NativeWindow::from_raw(raw).ok_or(HandleError::NotSupported)?;
        let size = window.inner_size();

        Ok(Self {
            native,
            width: size.width,
            height: size.height,
            window: Some(window),
        })
    }

    /// Target with no OS window behind it.
    pub fn headless(width: u32, height: u32) -> Self {
        Self::detached(NativeWindow::Headless, width, height)
    }

    /// Target carrying a native handle but no `winit` window. Only recording
    /// backends can render into it.
    pub fn detached(native: NativeWindow, width: u32, height: u32) -> Self {
        Self {
            native,
            width,
            height,
            window: None,
        }
    }

    pub fn native(&self) -> NativeWindow {
        self.native
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn window(&self) -> Option<&Arc<Window>> {
        self.window.as_ref()
    }
}
