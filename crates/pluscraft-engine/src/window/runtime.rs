use std::sync::Arc;
use std::time::Duration;

use winit::application::ApplicationHandler;
use winit::dpi::{PhysicalPosition, PhysicalSize};
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::monitor::MonitorHandle;
use winit::platform::pump_events::{EventLoopExtPumpEvents, PumpStatus};
use winit::window::{Fullscreen, Window, WindowAttributes, WindowId};

use crate::config::{VideoMode, WindowMode};
use crate::error::StartupError;
use crate::frame::{EventPump, PlatformEvent};

/// Pumps allowed for the platform to deliver `resumed` and create the window.
const CREATE_PUMP_LIMIT: usize = 200;
const CREATE_PUMP_TIMEOUT: Duration = Duration::from_millis(5);

/// Owns the `winit` event loop and the single main window.
///
/// The loop is pumped, never run: the frame loop stays in charge of the
/// thread and drains events once per iteration.
pub struct WindowRuntime {
    event_loop: EventLoop<()>,
    handler: Handler,
    exited: bool,
}

impl WindowRuntime {
    /// Initializes the platform window subsystem.
    pub fn new() -> Result<Self, StartupError> {
        let event_loop =
            EventLoop::new().map_err(|e| StartupError::WindowSubsystem(e.to_string()))?;
        Ok(Self {
            event_loop,
            handler: Handler::default(),
            exited: false,
        })
    }

    /// Creates the main window from `video_mode`, pumping until the platform
    /// has delivered it.
    pub fn create_window(
        &mut self,
        title: &str,
        video_mode: &VideoMode,
    ) -> Result<Arc<Window>, StartupError> {
        if let Some(window) = &self.handler.window {
            return Ok(window.clone());
        }

        self.handler.request = Some(WindowRequest {
            title: title.to_string(),
            video_mode: *video_mode,
        });

        for _ in 0..CREATE_PUMP_LIMIT {
            let status = self
                .event_loop
                .pump_app_events(Some(CREATE_PUMP_TIMEOUT), &mut self.handler);

            if let Some(message) = self.handler.creation_error.take() {
                return Err(StartupError::WindowCreation(message));
            }
            if let Some(window) = &self.handler.window {
                let size = window.inner_size();
                log::info!(
                    "window `{title}` created ({}x{}, {:?})",
                    size.width,
                    size.height,
                    video_mode.window_mode
                );
                return Ok(window.clone());
            }
            if let PumpStatus::Exit(code) = status {
                self.exited = true;
                return Err(StartupError::WindowCreation(format!(
                    "event loop exited with code {code} before the window was created"
                )));
            }
        }

        Err(StartupError::WindowCreation(
            "platform never resumed the application".to_string(),
        ))
    }
}

impl EventPump for WindowRuntime {
    fn poll_events(&mut self, timeout: Option<Duration>, events: &mut Vec<PlatformEvent>) {
        if self.exited {
            events.push(PlatformEvent::Quit);
            return;
        }

        let status = self.event_loop.pump_app_events(timeout, &mut self.handler);
        events.append(&mut self.handler.events);

        if let PumpStatus::Exit(code) = status {
            log::debug!("event loop exited with code {code}");
            self.exited = true;
            events.push(PlatformEvent::Quit);
        }
    }
}

struct WindowRequest {
    title: String,
    video_mode: VideoMode,
}

#[derive(Default)]
struct Handler {
    request: Option<WindowRequest>,
    window: Option<Arc<Window>>,
    creation_error: Option<String>,
    events: Vec<PlatformEvent>,
}

impl ApplicationHandler for Handler {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        let Some(request) = self.request.take() else {
            return;
        };

        let monitor = event_loop
            .primary_monitor()
            .or_else(|| event_loop.available_monitors().next());
        let attrs = window_attributes(&request.title, &request.video_mode, monitor.as_ref());

        match event_loop.create_window(attrs) {
            Ok(window) => self.window = Some(Arc::new(window)),
            Err(e) => self.creation_error = Some(e.to_string()),
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested | WindowEvent::Destroyed => {
                self.events.push(PlatformEvent::Quit);
                event_loop.exit();
            }
            WindowEvent::Resized(size) => self.events.push(PlatformEvent::Resized {
                width: size.width,
                height: size.height,
            }),
            _ => {}
        }
    }
}

/// Window attributes for `video_mode`. `monitor` is the display the window
/// should land on, when the platform reports one.
pub fn window_attributes(
    title: &str,
    video_mode: &VideoMode,
    monitor: Option<&MonitorHandle>,
) -> WindowAttributes {
    let size = PhysicalSize::new(video_mode.width, video_mode.height);
    let attrs = Window::default_attributes()
        .with_title(title)
        .with_inner_size(size);

    match video_mode.window_mode {
        WindowMode::Windowed => {
            let attrs = attrs.with_resizable(true);
            match monitor {
                Some(monitor) => attrs.with_position(centered_position(
                    monitor.position(),
                    monitor.size(),
                    size,
                )),
                None => attrs,
            }
        }
        WindowMode::Borderless => {
            attrs.with_fullscreen(Some(Fullscreen::Borderless(monitor.cloned())))
        }
        WindowMode::Fullscreen => {
            let exclusive = monitor.and_then(|monitor| {
                let modes: Vec<_> = monitor.video_modes().collect();
                let candidates: Vec<_> = modes
                    .iter()
                    .map(|m| (m.size(), m.refresh_rate_millihertz()))
                    .collect();
                closest_video_mode(&candidates, size).map(|i| modes[i].clone())
            });
            match exclusive {
                Some(mode) => attrs.with_fullscreen(Some(Fullscreen::Exclusive(mode))),
                None => {
                    log::warn!(
                        "no exclusive video mode for {}x{}, using borderless fullscreen",
                        size.width,
                        size.height
                    );
                    attrs.with_fullscreen(Some(Fullscreen::Borderless(monitor.cloned())))
                }
            }
        }
    }
}

/// Top-left corner that centers `size` on a monitor.
pub fn centered_position(
    monitor_position: PhysicalPosition<i32>,
    monitor_size: PhysicalSize<u32>,
    size: PhysicalSize<u32>,
) -> PhysicalPosition<i32> {
    let offset = |outer: u32, inner: u32| (i64::from(outer) - i64::from(inner)) / 2;
    PhysicalPosition::new(
        (i64::from(monitor_position.x) + offset(monitor_size.width, size.width)) as i32,
        (i64::from(monitor_position.y) + offset(monitor_size.height, size.height)) as i32,
    )
}

/// Index of the mode closest to `wanted` by pixel area; the highest refresh
/// rate wins among equally close modes.
pub fn closest_video_mode(
    modes: &[(PhysicalSize<u32>, u32)],
    wanted: PhysicalSize<u32>,
) -> Option<usize> {
    let area = |s: PhysicalSize<u32>| u64::from(s.width) * u64::from(s.height);
    let target = area(wanted);

    modes
        .iter()
        .enumerate()
        .min_by(|(_, (a_size, a_hz)), (_, (b_size, b_hz))| {
            area(*a_size)
                .abs_diff(target)
                .cmp(&area(*b_size).abs_diff(target))
                .then(b_hz.cmp(a_hz))
        })
        .map(|(i, _)| i)
}
