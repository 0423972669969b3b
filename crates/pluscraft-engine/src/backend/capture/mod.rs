//! Recording backend.
//!
//! Implements the full capability interface without touching a GPU. Every
//! context call lands in a [`CaptureRecorder`], so tests can assert on command
//! order, buffer contents and presented sizes. It accepts any device kind.

mod context;
mod device;
mod recorder;
mod swapchain;

use crate::backend::{BackendFactory, DeviceAndContext, DeviceKind, WindowTarget};
use crate::error::BackendInitError;
use crate::gfx::{Swapchain, SwapchainDesc};

pub use context::CaptureContext;
pub use device::CaptureDevice;
pub use recorder::{CaptureCommand, CaptureRecorder};
pub use swapchain::CaptureSwapchain;

use swapchain::FrameFaults;

pub const BACKEND_NAME: &str = "capture";

/// Creation step at which a [`CaptureFactory`] is told to fail.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum FailurePoint {
    Device,
    Swapchain,
}

/// Factory for the recording backend, impersonating one device kind.
#[derive(Debug)]
pub struct CaptureFactory {
    kind: DeviceKind,
    recorder: CaptureRecorder,
    fail_at: Option<FailurePoint>,
    faults: FrameFaults,
    device_created: bool,
}

impl CaptureFactory {
    pub fn new(kind: DeviceKind) -> Self {
        Self {
            kind,
            recorder: CaptureRecorder::default(),
            fail_at: None,
            faults: FrameFaults::default(),
            device_created: false,
        }
    }

    /// Makes the given creation step fail.
    pub fn failing_at(mut self, point: FailurePoint) -> Self {
        self.fail_at = Some(point);
        self
    }

    /// Makes the given back-buffer acquisitions (0-based) report a transient skip.
    pub fn skipping_acquires(mut self, acquires: &[u64]) -> Self {
        self.faults.skip_acquires = acquires.to_vec();
        self
    }

    /// Makes the given present call (0-based) fail.
    pub fn failing_present(mut self, present: u64) -> Self {
        self.faults.fail_present = Some(present);
        self
    }

    /// Handle onto everything this backend records.
    pub fn recorder(&self) -> CaptureRecorder {
        self.recorder.clone()
    }

    fn injected(&self, point: FailurePoint) -> Result<(), BackendInitError> {
        if self.fail_at == Some(point) {
            return Err(BackendInitError::Backend {
                kind: self.kind,
                message: format!("injected {point:?} failure"),
            });
        }
        Ok(())
    }

    fn check_window(&self, target: &WindowTarget) -> Result<(), BackendInitError> {
        let native = target.native();
        if native.is_headless() || self.kind.accepts(&native) {
            return Ok(());
        }
        Err(BackendInitError::IncompatibleWindow {
            kind: self.kind,
            window: native.platform_name(),
        })
    }
}

impl BackendFactory for CaptureFactory {
    fn kind(&self) -> DeviceKind {
        self.kind
    }

    fn create_device_and_context(
        &mut self,
        target: &WindowTarget,
    ) -> Result<DeviceAndContext, BackendInitError> {
        self.check_window(target)?;
        self.injected(FailurePoint::Device)?;

        self.device_created = true;
        log::info!("capture backend standing in for {}", self.kind);

        Ok((
            Box::new(CaptureDevice::new(self.recorder.clone())),
            Box::new(CaptureContext::new(self.recorder.clone())),
        ))
    }

    fn create_swapchain(
        &mut self,
        desc: &SwapchainDesc,
        target: &WindowTarget,
    ) -> Result<Box<dyn Swapchain>, BackendInitError> {
        if !self.device_created {
            return Err(BackendInitError::DeviceNotCreated { kind: self.kind });
        }
        self.check_window(target)?;
        self.injected(FailurePoint::Swapchain)?;

        Ok(Box::new(CaptureSwapchain::new(
            *desc,
            self.recorder.clone(),
            self.faults.clone(),
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::NativeWindow;
    use crate::gfx::{
        BufferAccess, BufferDesc, BufferUsage, DeviceContext, DrawAttribs, GfxError,
    };

    fn desc(width: u32, height: u32) -> SwapchainDesc {
        SwapchainDesc {
            width,
            height,
            color_format: wgpu::TextureFormat::Bgra8UnormSrgb,
            depth_format: SwapchainDesc::DEFAULT_DEPTH_FORMAT,
            buffer_count: 2,
            sync_interval: 1,
        }
    }

    #[test]
    fn swapchain_before_device_fails() {
        let mut factory = CaptureFactory::new(DeviceKind::Vulkan);
        let err = factory
            .create_swapchain(&desc(8, 8), &WindowTarget::headless(8, 8))
            .err()
            .unwrap();
        assert!(matches!(err, BackendInitError::DeviceNotCreated { .. }));
    }

    #[test]
    fn d3d_rejects_x11_window() {
        let mut factory = CaptureFactory::new(DeviceKind::D3D11);
        let target = WindowTarget::detached(NativeWindow::Xlib { window: 3 }, 8, 8);
        let err = factory.create_device_and_context(&target).err().unwrap();
        assert!(matches!(
            err,
            BackendInitError::IncompatibleWindow {
                kind: DeviceKind::D3D11,
                window: "Xlib"
            }
        ));
    }

    #[test]
    fn injected_device_failure() {
        let mut factory = CaptureFactory::new(DeviceKind::OpenGl).failing_at(FailurePoint::Device);
        assert!(
            factory
                .create_device_and_context(&WindowTarget::headless(8, 8))
                .is_err()
        );
    }

    #[test]
    fn immutable_buffers_are_not_mappable() {
        let mut factory = CaptureFactory::new(DeviceKind::Vulkan);
        let (device, mut context) = factory
            .create_device_and_context(&WindowTarget::headless(8, 8))
            .unwrap();

        let buffer = device
            .create_buffer(
                &BufferDesc {
                    label: "vertices",
                    size: 4,
                    usage: BufferUsage::Vertex,
                    access: BufferAccess::Immutable,
                },
                Some(&[1, 2, 3, 4]),
            )
            .unwrap();

        assert_eq!(
            context.map_write_discard(&buffer),
            Err(GfxError::NotMappable("vertices".to_string()))
        );
    }

    #[test]
    fn unmap_publishes_bytes_to_later_draws() {
        let mut factory = CaptureFactory::new(DeviceKind::Vulkan);
        let recorder = factory.recorder();
        let (device, mut context) = factory
            .create_device_and_context(&WindowTarget::headless(8, 8))
            .unwrap();

        let constants = device
            .create_buffer(
                &BufferDesc {
                    label: "constants",
                    size: 4,
                    usage: BufferUsage::Uniform,
                    access: BufferAccess::Dynamic,
                },
                None,
            )
            .unwrap();
        let id = constants.capture_id().unwrap();

        context.map_write_discard(&constants).unwrap();
        context.unmap(&constants, &[9, 8, 7, 6]);
        context.draw(DrawAttribs::Vertices { num_vertices: 3 });

        assert_eq!(recorder.buffer_contents(id), Some(vec![9, 8, 7, 6]));
        assert_eq!(recorder.draws(), vec![DrawAttribs::Vertices { num_vertices: 3 }]);
    }

    #[test]
    fn zero_sized_swapchain_skips_acquire() {
        let mut factory = CaptureFactory::new(DeviceKind::Vulkan);
        let target = WindowTarget::headless(8, 8);
        factory.create_device_and_context(&target).unwrap();
        let mut swapchain = factory.create_swapchain(&desc(8, 8), &target).unwrap();

        swapchain.resize(0, 0).unwrap();
        assert!(matches!(
            swapchain.current_back_buffer(),
            Err(GfxError::FrameSkipped(_))
        ));
        assert_eq!(factory.recorder().swapchain_size(), Some((8, 8)));
    }
}
