//! Process-level startup: window, session, scene, loop.
//!
//! Everything is owned by stack values here, so every exit path drops the
//! session before the window and the window before the event loop.

use crate::backend::{BackendRegistry, WindowTarget};
use crate::config::EngineConfig;
use crate::error::{EngineError, StartupError};
use crate::frame::{EventPump, FrameLoop, LoopSummary, RenderScene};
use crate::session::initialize_graphics_engine;
use crate::window::WindowRuntime;

/// Opens the main window and runs the configured scene until quit.
pub fn run(config: &EngineConfig) -> Result<LoopSummary, EngineError> {
    log::info!(
        "starting `{}`: {} scene on {}",
        config.title,
        config.scene.variant,
        config.device_kind
    );

    let mut runtime = WindowRuntime::new()?;
    let window = runtime.create_window(&config.title, &config.video_mode)?;
    let target = WindowTarget::from_window(window)
        .map_err(|e| StartupError::WindowCreation(format!("no usable window handle: {e}")))?;

    run_session(
        &mut runtime,
        BackendRegistry::with_native_backends(),
        &target,
        config,
    )
}

/// Session setup and frame loop over any event source and backend registry.
pub fn run_session<P>(
    pump: &mut P,
    registry: BackendRegistry,
    target: &WindowTarget,
    config: &EngineConfig,
) -> Result<LoopSummary, EngineError>
where
    P: EventPump + ?Sized,
{
    let mut session =
        initialize_graphics_engine(registry, config.device_kind, &config.video_mode, target)?;
    let scene = RenderScene::build(&session, &config.scene)?;

    let mut frame_loop = FrameLoop::new(scene, config.video_mode.sync_interval);
    let summary = frame_loop.run(&mut session, pump)?;
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::backend::capture::{CaptureFactory, FailurePoint};
    use crate::backend::DeviceKind;
    use crate::frame::PlatformEvent;

    struct QuitImmediately;

    impl EventPump for QuitImmediately {
        fn poll_events(&mut self, _timeout: Option<Duration>, events: &mut Vec<PlatformEvent>) {
            events.push(PlatformEvent::Quit);
        }
    }

    fn registry(factory: CaptureFactory) -> BackendRegistry {
        let mut registry = BackendRegistry::empty();
        registry.register(Box::new(factory));
        registry
    }

    #[test]
    fn unsupported_kind_exits_with_backend_code() {
        let mut config = EngineConfig::default();
        config.device_kind = DeviceKind::D3D12;

        let err = run_session(
            &mut QuitImmediately,
            registry(CaptureFactory::new(DeviceKind::Vulkan)),
            &WindowTarget::headless(1280, 720),
            &config,
        )
        .unwrap_err();

        assert_eq!(err.exit_code(), -5);
    }

    #[test]
    fn device_failure_exits_with_backend_code() {
        let mut config = EngineConfig::default();
        config.device_kind = DeviceKind::Vulkan;
        let factory = CaptureFactory::new(DeviceKind::Vulkan).failing_at(FailurePoint::Device);

        let err = run_session(
            &mut QuitImmediately,
            registry(factory),
            &WindowTarget::headless(1280, 720),
            &config,
        )
        .unwrap_err();

        assert!(matches!(err, EngineError::BackendInit(_)));
        assert_eq!(err.exit_code(), -5);
    }

    #[test]
    fn immediate_quit_presents_one_frame() {
        let mut config = EngineConfig::default();
        config.device_kind = DeviceKind::OpenGl;
        let factory = CaptureFactory::new(DeviceKind::OpenGl);
        let recorder = factory.recorder();

        let summary = run_session(
            &mut QuitImmediately,
            registry(factory),
            &WindowTarget::headless(1280, 720),
            &config,
        )
        .unwrap();

        assert_eq!(summary.frames_presented, 1);
        assert_eq!(recorder.present_count(), 1);
    }
}
