use crate::gfx::{GfxError, GfxResult, GpuTextureView, RawView, Swapchain, SwapchainDesc};

use super::surface;

struct AcquiredFrame {
    texture: wgpu::SurfaceTexture,
    view: wgpu::TextureView,
}

/// Surface plus a depth texture sized to match it.
pub struct GpuSwapchain {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    config: wgpu::SurfaceConfiguration,
    present_modes: Vec<wgpu::PresentMode>,
    desc: SwapchainDesc,
    depth_view: wgpu::TextureView,
    acquired: Option<AcquiredFrame>,
    sync_interval: u32,
    warned_sync: bool,
}

impl GpuSwapchain {
    pub(crate) fn new(
        surface: wgpu::Surface<'static>,
        device: wgpu::Device,
        config: wgpu::SurfaceConfiguration,
        present_modes: Vec<wgpu::PresentMode>,
        desc: SwapchainDesc,
    ) -> Self {
        surface.configure(&device, &config);
        let depth_view = create_depth_view(&device, &desc);

        Self {
            surface,
            device,
            config,
            present_modes,
            depth_view,
            sync_interval: desc.sync_interval,
            desc,
            acquired: None,
            warned_sync: false,
        }
    }

    fn apply_sync_interval(&mut self, sync_interval: u32) {
        if sync_interval > 1 && !self.warned_sync {
            log::warn!("sync interval {sync_interval} is paced as 1");
            self.warned_sync = true;
        }
        if sync_interval == self.sync_interval {
            return;
        }
        self.sync_interval = sync_interval;

        let mode = surface::choose_present_mode(&self.present_modes, sync_interval);
        if mode != self.config.present_mode {
            self.config.present_mode = mode;
            if !self.desc.is_zero_sized() {
                self.surface.configure(&self.device, &self.config);
            }
        }
    }
}

fn create_depth_view(device: &wgpu::Device, desc: &SwapchainDesc) -> wgpu::TextureView {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("pluscraft depth buffer"),
        size: wgpu::Extent3d {
            width: desc.width.max(1),
            height: desc.height.max(1),
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: desc.depth_format,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    texture.create_view(&wgpu::TextureViewDescriptor::default())
}

impl Swapchain for GpuSwapchain {
    fn desc(&self) -> &SwapchainDesc {
        &self.desc
    }

    /// wgpu cannot configure a 0x0 surface; in that case only the recorded
    /// size changes.
    fn resize(&mut self, width: u32, height: u32) -> GfxResult<()> {
        self.acquired = None;
        self.desc.width = width;
        self.desc.height = height;
        if self.desc.is_zero_sized() {
            return Ok(());
        }

        self.config.width = width;
        self.config.height = height;
        self.surface.configure(&self.device, &self.config);
        self.depth_view = create_depth_view(&self.device, &self.desc);
        log::debug!("swapchain resized to {width}x{height}");
        Ok(())
    }

    fn current_back_buffer(&mut self) -> GfxResult<GpuTextureView> {
        if self.desc.is_zero_sized() {
            return Err(GfxError::FrameSkipped("swapchain is zero-sized".to_string()));
        }

        let view = match self.acquired.as_ref().map(|frame| frame.view.clone()) {
            Some(view) => view,
            None => {
                let texture = self.surface.get_current_texture().map_err(|e| {
                    surface::map_surface_error(&self.surface, &self.device, &self.config, e)
                })?;
                let view = texture
                    .texture
                    .create_view(&wgpu::TextureViewDescriptor::default());
                self.acquired = Some(AcquiredFrame {
                    texture,
                    view: view.clone(),
                });
                view
            }
        };

        Ok(GpuTextureView {
            width: self.desc.width,
            height: self.desc.height,
            format: self.config.format,
            raw: RawView::Wgpu(view),
        })
    }

    fn depth_buffer(&self) -> GfxResult<GpuTextureView> {
        Ok(GpuTextureView {
            width: self.desc.width,
            height: self.desc.height,
            format: self.desc.depth_format,
            raw: RawView::Wgpu(self.depth_view.clone()),
        })
    }

    fn present(&mut self, sync_interval: u32) -> GfxResult<()> {
        let frame = self
            .acquired
            .take()
            .ok_or_else(|| GfxError::Surface("present without an acquired back buffer".to_string()))?;
        drop(frame.view);
        frame.texture.present();

        self.apply_sync_interval(sync_interval);
        Ok(())
    }
}
