use std::sync::Arc;

use anyhow::{Context, Result};
use winit::window::Window;

use crate::backend::{BackendFactory, DeviceAndContext, DeviceKind, WindowTarget};
use crate::error::BackendInitError;
use crate::gfx::{Swapchain, SwapchainDesc};

use super::context::GpuContext;
use super::device::GpuDevice;
use super::surface;
use super::swapchain::GpuSwapchain;

/// wgpu objects created by `create_device_and_context`, kept until the
/// swapchain takes the surface.
struct GpuState {
    _instance: wgpu::Instance,
    adapter: wgpu::Adapter,
    device: wgpu::Device,
    surface: Option<wgpu::Surface<'static>>,
}

/// Native factory driving one device kind through `wgpu`.
pub struct GpuFactory {
    kind: DeviceKind,
    state: Option<GpuState>,
}

impl GpuFactory {
    pub fn new(kind: DeviceKind) -> Self {
        Self { kind, state: None }
    }
}

/// wgpu has no D3D11 driver; D3D11 is served by DX12.
pub(crate) fn backends_for(kind: DeviceKind) -> wgpu::Backends {
    match kind {
        DeviceKind::OpenGl => wgpu::Backends::GL,
        DeviceKind::Vulkan => wgpu::Backends::VULKAN,
        DeviceKind::D3D11 | DeviceKind::D3D12 => wgpu::Backends::DX12,
    }
}

fn expected_backend(kind: DeviceKind) -> wgpu::Backend {
    match kind {
        DeviceKind::OpenGl => wgpu::Backend::Gl,
        DeviceKind::Vulkan => wgpu::Backend::Vulkan,
        DeviceKind::D3D11 | DeviceKind::D3D12 => wgpu::Backend::Dx12,
    }
}

async fn init_state(kind: DeviceKind, window: Arc<Window>) -> Result<(GpuState, wgpu::Queue)> {
    let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
        backends: backends_for(kind),
        ..Default::default()
    });

    let surface = instance
        .create_surface(window)
        .context("failed to create wgpu surface")?;

    let adapter = instance
        .request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        })
        .await
        .context("failed to find a suitable GPU adapter")?;

    let (device, queue) = adapter
        .request_device(&wgpu::DeviceDescriptor {
            label: Some("pluscraft device"),
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::default(),
            experimental_features: wgpu::ExperimentalFeatures::disabled(),
            memory_hints: wgpu::MemoryHints::Performance,
            trace: wgpu::Trace::Off,
        })
        .await
        .context("failed to create wgpu device/queue")?;

    let state = GpuState {
        _instance: instance,
        adapter,
        device,
        surface: Some(surface),
    };
    Ok((state, queue))
}

fn surface_config(
    surface: &wgpu::Surface<'_>,
    adapter: &wgpu::Adapter,
    desc: &SwapchainDesc,
) -> Result<(wgpu::SurfaceConfiguration, Vec<wgpu::PresentMode>)> {
    let caps = surface.get_capabilities(adapter);
    let format = surface::choose_surface_format(&caps, desc.color_format)
        .context("no supported surface formats")?;

    let config = wgpu::SurfaceConfiguration {
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        format,
        width: desc.width.max(1),
        height: desc.height.max(1),
        present_mode: surface::choose_present_mode(&caps.present_modes, desc.sync_interval),
        alpha_mode: surface::choose_alpha_mode(&caps),
        view_formats: vec![],
        desired_maximum_frame_latency: desc.buffer_count,
    };
    Ok((config, caps.present_modes))
}

impl BackendFactory for GpuFactory {
    fn kind(&self) -> DeviceKind {
        self.kind
    }

    fn create_device_and_context(
        &mut self,
        target: &WindowTarget,
    ) -> Result<DeviceAndContext, BackendInitError> {
        let kind = self.kind;
        let native = target.native();
        if native.is_headless() {
            return Err(BackendInitError::NoWindow { kind });
        }
        if !kind.accepts(&native) {
            return Err(BackendInitError::IncompatibleWindow {
                kind,
                window: native.platform_name(),
            });
        }
        let window = target.window().ok_or(BackendInitError::NoWindow { kind })?;

        if kind == DeviceKind::D3D11 {
            log::warn!("D3D11 requested; rendering through the DX12 backend");
        }

        let (state, queue) = pollster::block_on(init_state(kind, Arc::clone(window)))
            .map_err(|e| BackendInitError::backend(kind, e))?;

        let info = state.adapter.get_info();
        log::info!(
            "using adapter \"{}\" ({:?}, {:?})",
            info.name,
            info.backend,
            info.device_type
        );
        if info.backend != expected_backend(kind) {
            return Err(BackendInitError::BackendMismatch {
                kind,
                found: format!("{:?}", info.backend),
            });
        }

        let device = GpuDevice::new(state.device.clone());
        let context = GpuContext::new(state.device.clone(), queue);
        self.state = Some(state);

        Ok((Box::new(device), Box::new(context)))
    }

    fn create_swapchain(
        &mut self,
        desc: &SwapchainDesc,
        _target: &WindowTarget,
    ) -> Result<Box<dyn Swapchain>, BackendInitError> {
        let kind = self.kind;
        let state = self
            .state
            .as_mut()
            .ok_or(BackendInitError::DeviceNotCreated { kind })?;

        let surface = state
            .surface
            .take()
            .context("surface is already bound to a swapchain")
            .map_err(|e| BackendInitError::backend(kind, e))?;

        let (config, present_modes) = surface_config(&surface, &state.adapter, desc)
            .map_err(|e| BackendInitError::backend(kind, e))?;

        log::info!(
            "swapchain {}x{} {:?}, {} buffers, {:?}",
            config.width,
            config.height,
            config.format,
            desc.buffer_count,
            config.present_mode
        );

        let desc = SwapchainDesc {
            color_format: config.format,
            ..*desc
        };
        Ok(Box::new(GpuSwapchain::new(
            surface,
            state.device.clone(),
            config,
            present_modes,
            desc,
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::NativeWindow;

    #[test]
    fn d3d11_maps_to_dx12() {
        assert_eq!(backends_for(DeviceKind::D3D11), wgpu::Backends::DX12);
        assert_eq!(backends_for(DeviceKind::OpenGl), wgpu::Backends::GL);
        assert_eq!(expected_backend(DeviceKind::Vulkan), wgpu::Backend::Vulkan);
    }

    #[test]
    fn headless_target_is_rejected() {
        let mut factory = GpuFactory::new(DeviceKind::Vulkan);
        let err = factory
            .create_device_and_context(&WindowTarget::headless(8, 8))
            .err()
            .unwrap();
        assert!(matches!(err, BackendInitError::NoWindow { .. }));
    }

    #[test]
    fn detached_handle_without_window_is_rejected() {
        let mut factory = GpuFactory::new(DeviceKind::OpenGl);
        let target = WindowTarget::detached(NativeWindow::Wayland { surface: 1 }, 8, 8);
        let err = factory.create_device_and_context(&target).err().unwrap();
        assert!(matches!(err, BackendInitError::NoWindow { .. }));
    }

    #[test]
    fn swapchain_before_device_fails() {
        let mut factory = GpuFactory::new(DeviceKind::Vulkan);
        let desc = SwapchainDesc {
            width: 8,
            height: 8,
            color_format: wgpu::TextureFormat::Bgra8UnormSrgb,
            depth_format: SwapchainDesc::DEFAULT_DEPTH_FORMAT,
            buffer_count: 2,
            sync_interval: 1,
        };
        let err = factory
            .create_swapchain(&desc, &WindowTarget::headless(8, 8))
            .err()
            .unwrap();
        assert!(matches!(err, BackendInitError::DeviceNotCreated { .. }));
    }
}
