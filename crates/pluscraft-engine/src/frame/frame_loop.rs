use std::time::Duration;

use crate::error::{FrameError, ResourceError};
use crate::gfx::GfxError;
use crate::session::Session;
use crate::time::FrameClock;

use super::{EventPump, FrameControl, FrameState, LoopSummary, PlatformEvent, RenderScene};

/// Poll timeout while the swapchain has no drawable size.
pub const IDLE_POLL: Duration = Duration::from_millis(16);

/// Drives a [`RenderScene`] against a [`Session`], one iteration per
/// [`FrameLoop::step`].
///
/// A quit only takes effect at the top of the following iteration, so the
/// iteration that observed it still renders and presents.
#[derive(Debug)]
pub struct FrameLoop {
    scene: RenderScene,
    clock: FrameClock,
    sync_interval: u32,
    state: FrameState,
    close_requested: bool,
    events: Vec<PlatformEvent>,
    summary: LoopSummary,
}

impl FrameLoop {
    pub fn new(scene: RenderScene, sync_interval: u32) -> Self {
        Self {
            scene,
            clock: FrameClock::new(),
            sync_interval,
            state: FrameState::Running,
            close_requested: false,
            events: Vec::new(),
            summary: LoopSummary::default(),
        }
    }

    pub fn state(&self) -> FrameState {
        self.state
    }

    pub fn summary(&self) -> LoopSummary {
        self.summary
    }

    /// Steps until a quit is observed.
    pub fn run<P>(&mut self, session: &mut Session, pump: &mut P) -> Result<LoopSummary, FrameError>
    where
        P: EventPump + ?Sized,
    {
        log::info!(
            "frame loop started ({} scene, sync interval {})",
            self.scene.config().variant,
            self.sync_interval
        );

        while self.step(session, pump)? == FrameControl::Continue {}

        log::info!(
            "frame loop closed after {} presented, {} skipped",
            self.summary.frames_presented,
            self.summary.frames_skipped
        );
        Ok(self.summary)
    }

    /// One iteration: drain events, render, present.
    pub fn step<P>(&mut self, session: &mut Session, pump: &mut P) -> Result<FrameControl, FrameError>
    where
        P: EventPump + ?Sized,
    {
        if self.close_requested || self.state == FrameState::Closed {
            self.state = FrameState::Closed;
            return Ok(FrameControl::Exit);
        }

        self.state = FrameState::ProcessingEvents;
        let timeout = if session.is_renderable() {
            Duration::ZERO
        } else {
            IDLE_POLL
        };
        pump.poll_events(Some(timeout), &mut self.events);

        for event in self.events.drain(..) {
            match event {
                PlatformEvent::Quit => {
                    log::info!("quit requested");
                    self.close_requested = true;
                }
                PlatformEvent::Resized { width, height } => {
                    log::debug!("resize to {width}x{height}");
                    session.resize(width, height).map_err(|source| FrameError::Gfx {
                        frame: self.clock.frame_index(),
                        source,
                    })?;
                }
            }
        }

        let time = self.clock.tick();

        if !session.is_renderable() {
            self.summary.frames_skipped += 1;
            self.state = FrameState::Running;
            return Ok(FrameControl::Continue);
        }

        self.state = FrameState::Rendering;
        match self.scene.render(session, time.elapsed) {
            Ok(()) => {}
            Err(ResourceError::Gfx(GfxError::FrameSkipped(reason))) => {
                return Ok(self.skip(time.frame_index, &reason));
            }
            Err(ResourceError::Gfx(source)) => {
                return Err(FrameError::Gfx {
                    frame: time.frame_index,
                    source,
                });
            }
            Err(source) => {
                return Err(FrameError::Resource {
                    frame: time.frame_index,
                    source,
                });
            }
        }

        self.state = FrameState::Presenting;
        match session.present(self.sync_interval) {
            Ok(()) => self.summary.frames_presented += 1,
            Err(GfxError::FrameSkipped(reason)) => {
                return Ok(self.skip(time.frame_index, &reason));
            }
            Err(source) => {
                return Err(FrameError::Gfx {
                    frame: time.frame_index,
                    source,
                });
            }
        }

        self.state = FrameState::Running;
        Ok(FrameControl::Continue)
    }

    fn skip(&mut self, frame: u64, reason: &str) -> FrameControl {
        log::debug!("frame {frame} skipped: {reason}");
        self.summary.frames_skipped += 1;
        self.state = FrameState::Running;
        FrameControl::Continue
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;

    use super::*;
    use crate::backend::capture::{CaptureCommand, CaptureFactory, CaptureRecorder};
    use crate::backend::{BackendRegistry, DeviceKind, WindowTarget};
    use crate::config::{SceneConfig, VideoMode, WindowMode};
    use crate::session::initialize_graphics_engine;

    /// Hands out one batch of events per poll; empty once the script runs out.
    #[derive(Default)]
    struct Script {
        batches: VecDeque<Vec<PlatformEvent>>,
        polls: usize,
        timeouts: Vec<Option<Duration>>,
    }

    impl Script {
        fn new(batches: Vec<Vec<PlatformEvent>>) -> Self {
            Self {
                batches: batches.into(),
                ..Default::default()
            }
        }
    }

    impl EventPump for Script {
        fn poll_events(&mut self, timeout: Option<Duration>, events: &mut Vec<PlatformEvent>) {
            self.polls += 1;
            self.timeouts.push(timeout);
            events.extend(self.batches.pop_front().unwrap_or_default());
        }
    }

    fn setup(factory: CaptureFactory) -> (Session, FrameLoop, CaptureRecorder) {
        let recorder = factory.recorder();
        let mut registry = BackendRegistry::empty();
        registry.register(Box::new(factory));
        let session = initialize_graphics_engine(
            registry,
            DeviceKind::Vulkan,
            &VideoMode::new(1280, 720, 1, WindowMode::Windowed),
            &WindowTarget::headless(1280, 720),
        )
        .unwrap();
        let scene = RenderScene::build(&session, &SceneConfig::default()).unwrap();
        (session, FrameLoop::new(scene, 1), recorder)
    }

    #[test]
    fn quit_finishes_the_current_frame() {
        let (mut session, mut frame_loop, recorder) = setup(CaptureFactory::new(DeviceKind::Vulkan));
        let mut pump = Script::new(vec![vec![], vec![], vec![PlatformEvent::Quit]]);

        let summary = frame_loop.run(&mut session, &mut pump).unwrap();

        assert_eq!(summary.frames_presented, 3);
        assert_eq!(recorder.present_count(), 3);
        assert_eq!(pump.polls, 3);
        assert_eq!(frame_loop.state(), FrameState::Closed);
    }

    #[test]
    fn closed_loop_stays_closed() {
        let (mut session, mut frame_loop, recorder) = setup(CaptureFactory::new(DeviceKind::Vulkan));
        let mut pump = Script::new(vec![vec![PlatformEvent::Quit]]);

        assert_eq!(frame_loop.step(&mut session, &mut pump).unwrap(), FrameControl::Continue);
        assert_eq!(frame_loop.step(&mut session, &mut pump).unwrap(), FrameControl::Exit);
        assert_eq!(frame_loop.step(&mut session, &mut pump).unwrap(), FrameControl::Exit);
        assert_eq!(recorder.present_count(), 1);
        assert_eq!(pump.polls, 1);
    }

    #[test]
    fn resize_applies_before_the_same_frame_renders() {
        let (mut session, mut frame_loop, recorder) = setup(CaptureFactory::new(DeviceKind::Vulkan));
        let mut pump = Script::new(vec![
            vec![PlatformEvent::Resized { width: 800, height: 600 }],
            vec![PlatformEvent::Quit],
        ]);

        frame_loop.run(&mut session, &mut pump).unwrap();

        let frames = recorder.frames();
        assert_eq!(frames.len(), 2);
        for frame in &frames {
            assert!(frame.contains(&CaptureCommand::SetRenderTargets {
                color_size: (800, 600),
                depth: true,
            }));
        }
        assert!(matches!(
            frames[0].first(),
            Some(CaptureCommand::Resize { width: 800, height: 600 })
        ));
        assert_eq!(session.projection().aspect(), 800.0 / 600.0);
    }

    #[test]
    fn minimized_window_skips_rendering_and_polls_slowly() {
        let (mut session, mut frame_loop, recorder) = setup(CaptureFactory::new(DeviceKind::Vulkan));
        let mut pump = Script::new(vec![
            vec![PlatformEvent::Resized { width: 0, height: 0 }],
            vec![],
            vec![PlatformEvent::Resized { width: 640, height: 480 }],
            vec![PlatformEvent::Quit],
        ]);

        let summary = frame_loop.run(&mut session, &mut pump).unwrap();

        assert_eq!(summary.frames_skipped, 2);
        assert_eq!(summary.frames_presented, 2);
        assert_eq!(pump.timeouts[1], Some(IDLE_POLL));
        assert_eq!(pump.timeouts[2], Some(IDLE_POLL));
        assert_eq!(recorder.swapchain_size(), Some((640, 480)));
    }

    #[test]
    fn transient_acquire_failure_skips_one_frame() {
        let factory = CaptureFactory::new(DeviceKind::Vulkan).skipping_acquires(&[1]);
        let (mut session, mut frame_loop, recorder) = setup(factory);
        let mut pump = Script::new(vec![vec![], vec![], vec![PlatformEvent::Quit]]);

        let summary = frame_loop.run(&mut session, &mut pump).unwrap();

        assert_eq!(summary.frames_skipped, 1);
        assert_eq!(summary.frames_presented, 2);
        assert_eq!(recorder.draws().len(), 2);
    }

    #[test]
    fn present_failure_is_fatal_with_frame_index() {
        let factory = CaptureFactory::new(DeviceKind::Vulkan).failing_present(1);
        let (mut session, mut frame_loop, _recorder) = setup(factory);
        let mut pump = Script::default();

        let err = frame_loop.run(&mut session, &mut pump).unwrap_err();

        assert!(matches!(err, FrameError::Gfx { frame: 1, source: GfxError::Surface(_) }));
    }
}
