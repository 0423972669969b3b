use crate::backend::{BackendRegistry, DeviceKind, WindowTarget};
use crate::config::VideoMode;
use crate::error::BackendInitError;
use crate::gfx::{
    DeviceContext, GfxResult, GpuTextureView, RenderDevice, Swapchain, SwapchainDesc,
};
use crate::transform::Projection;

/// Preferred back-buffer format; backends fall back to what the surface offers.
pub const PREFERRED_COLOR_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Bgra8UnormSrgb;

/// Swapchain description for a video mode.
pub fn swapchain_desc_for(video_mode: &VideoMode) -> SwapchainDesc {
    SwapchainDesc {
        width: video_mode.width,
        height: video_mode.height,
        color_format: PREFERRED_COLOR_FORMAT,
        depth_format: SwapchainDesc::DEFAULT_DEPTH_FORMAT,
        buffer_count: if cfg!(target_os = "macos") { 3 } else { 2 },
        sync_interval: video_mode.sync_interval,
    }
}

/// Selects the backend for `kind` and creates device, context and swapchain.
///
/// Consumes the registry. On failure nothing is left half-built: the partial
/// objects are dropped before the error returns.
pub fn initialize_graphics_engine(
    registry: BackendRegistry,
    kind: DeviceKind,
    video_mode: &VideoMode,
    target: &WindowTarget,
) -> Result<Session, BackendInitError> {
    let mut factory = registry.select(kind)?;
    let (device, context) = factory.create_device_and_context(target)?;
    let swapchain = factory.create_swapchain(&swapchain_desc_for(video_mode), target)?;

    let desc = swapchain.desc();
    log::info!(
        "{kind} session ready on {} ({}x{}, {:?})",
        device.backend_name(),
        desc.width,
        desc.height,
        desc.color_format
    );

    Ok(Session {
        kind,
        projection: Projection::new(desc.width, desc.height),
        device,
        context,
        swapchain,
    })
}

/// GPU device, its immediate context and the swapchain, owned together.
pub struct Session {
    kind: DeviceKind,
    device: Box<dyn RenderDevice>,
    context: Box<dyn DeviceContext>,
    swapchain: Box<dyn Swapchain>,
    projection: Projection,
}

impl Session {
    pub fn kind(&self) -> DeviceKind {
        self.kind
    }

    pub fn device(&self) -> &dyn RenderDevice {
        self.device.as_ref()
    }

    /// Device and context borrowed together.
    pub fn split_mut(&mut self) -> (&dyn RenderDevice, &mut dyn DeviceContext) {
        (self.device.as_ref(), self.context.as_mut())
    }

    pub fn swapchain_desc(&self) -> &SwapchainDesc {
        self.swapchain.desc()
    }

    pub fn projection(&self) -> &Projection {
        &self.projection
    }

    /// Whether the swapchain currently has a drawable size.
    pub fn is_renderable(&self) -> bool {
        !self.swapchain.desc().is_zero_sized()
    }

    /// Resizes the swapchain and updates the projection aspect.
    pub fn resize(&mut self, width: u32, height: u32) -> GfxResult<()> {
        self.swapchain.resize(width, height)?;
        self.projection.set_size(width, height);
        Ok(())
    }

    pub fn current_back_buffer(&mut self) -> GfxResult<GpuTextureView> {
        self.swapchain.current_back_buffer()
    }

    pub fn depth_buffer(&self) -> GfxResult<GpuTextureView> {
        self.swapchain.depth_buffer()
    }

    /// Flushes the immediate context, then presents.
    pub fn present(&mut self, sync_interval: u32) -> GfxResult<()> {
        self.context.flush()?;
        self.swapchain.present(sync_interval)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::capture::{CaptureFactory, FailurePoint};
    use crate::config::WindowMode;

    fn registry_with(factory: CaptureFactory) -> BackendRegistry {
        let mut registry = BackendRegistry::empty();
        registry.register(Box::new(factory));
        registry
    }

    fn mode(width: u32, height: u32) -> VideoMode {
        VideoMode::new(width, height, 1, WindowMode::Windowed)
    }

    #[test]
    fn every_registered_kind_yields_a_session() {
        for kind in DeviceKind::ALL {
            let registry = registry_with(CaptureFactory::new(kind));
            let session = initialize_graphics_engine(
                registry,
                kind,
                &mode(640, 480),
                &WindowTarget::headless(640, 480),
            )
            .unwrap();
            assert_eq!(session.kind(), kind);
            assert_eq!(session.device().backend_name(), "capture");
            assert_eq!(
                (session.swapchain_desc().width, session.swapchain_desc().height),
                (640, 480)
            );
        }
    }

    #[test]
    fn failing_swapchain_yields_no_session() {
        let factory = CaptureFactory::new(DeviceKind::Vulkan).failing_at(FailurePoint::Swapchain);
        let result = initialize_graphics_engine(
            registry_with(factory),
            DeviceKind::Vulkan,
            &mode(640, 480),
            &WindowTarget::headless(640, 480),
        );
        assert!(matches!(result, Err(BackendInitError::Backend { .. })));
    }

    #[test]
    fn resize_is_idempotent() {
        let mut session = initialize_graphics_engine(
            registry_with(CaptureFactory::new(DeviceKind::OpenGl)),
            DeviceKind::OpenGl,
            &mode(1280, 720),
            &WindowTarget::headless(1280, 720),
        )
        .unwrap();

        session.resize(800, 600).unwrap();
        let first = *session.projection();
        session.resize(800, 600).unwrap();

        let desc = session.swapchain_desc();
        assert_eq!((desc.width, desc.height), (800, 600));
        assert_eq!(*session.projection(), first);
        assert_eq!(first.aspect(), 800.0 / 600.0);
    }

    #[test]
    fn minimized_window_keeps_projection() {
        let mut session = initialize_graphics_engine(
            registry_with(CaptureFactory::new(DeviceKind::Vulkan)),
            DeviceKind::Vulkan,
            &mode(1280, 720),
            &WindowTarget::headless(1280, 720),
        )
        .unwrap();

        session.resize(0, 0).unwrap();
        assert!(!session.is_renderable());
        assert_eq!(session.projection().aspect(), 1280.0 / 720.0);
    }

    #[test]
    fn swapchain_desc_follows_video_mode() {
        let desc = swapchain_desc_for(&VideoMode::new(1920, 1080, 0, WindowMode::Fullscreen));
        assert_eq!((desc.width, desc.height, desc.sync_interval), (1920, 1080, 0));
        assert_eq!(desc.depth_format, wgpu::TextureFormat::Depth32Float);
        let expected_buffers = if cfg!(target_os = "macos") { 3 } else { 2 };
        assert_eq!(desc.buffer_count, expected_buffers);
    }
}
