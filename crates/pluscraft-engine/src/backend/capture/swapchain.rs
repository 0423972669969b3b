use crate::gfx::{GfxError, GfxResult, GpuTextureView, RawView, Swapchain, SwapchainDesc};

use super::recorder::{CaptureCommand, CaptureRecorder};

/// Frame-level faults injected into a capture swapchain.
#[derive(Debug, Clone, Default)]
pub(crate) struct FrameFaults {
    /// Acquire indices (0-based) that report a transient skip.
    pub skip_acquires: Vec<u64>,
    /// Present index (0-based) that fails.
    pub fail_present: Option<u64>,
}

/// Swapchain whose back buffers are identifiers, not images.
#[derive(Debug)]
pub struct CaptureSwapchain {
    desc: SwapchainDesc,
    recorder: CaptureRecorder,
    faults: FrameFaults,
    acquires: u64,
    presents: u64,
    acquired: Option<u64>,
}

impl CaptureSwapchain {
    pub(crate) fn new(desc: SwapchainDesc, recorder: CaptureRecorder, faults: FrameFaults) -> Self {
        recorder.with_state(|s| s.swapchain_size = Some((desc.width, desc.height)));
        Self {
            desc,
            recorder,
            faults,
            acquires: 0,
            presents: 0,
            acquired: None,
        }
    }

    fn view(&self, id: u64, format: wgpu::TextureFormat) -> GpuTextureView {
        GpuTextureView {
            width: self.desc.width,
            height: self.desc.height,
            format,
            raw: RawView::Capture(id),
        }
    }
}

impl Swapchain for CaptureSwapchain {
    fn desc(&self) -> &SwapchainDesc {
        &self.desc
    }

    fn resize(&mut self, width: u32, height: u32) -> GfxResult<()> {
        self.desc.width = width;
        self.desc.height = height;
        self.acquired = None;
        if self.desc.is_zero_sized() {
            return Ok(());
        }

        self.recorder
            .with_state(|s| s.swapchain_size = Some((width, height)));
        self.recorder.record(CaptureCommand::Resize { width, height });
        Ok(())
    }

    fn current_back_buffer(&mut self) -> GfxResult<GpuTextureView> {
        if let Some(id) = self.acquired {
            return Ok(self.view(id, self.desc.color_format));
        }
        if self.desc.is_zero_sized() {
            return Err(GfxError::FrameSkipped("swapchain is zero-sized".to_string()));
        }

        let index = self.acquires;
        self.acquires += 1;
        if self.faults.skip_acquires.contains(&index) {
            return Err(GfxError::FrameSkipped(format!("acquire {index} timed out")));
        }

        let id = self.recorder.with_state(|s| s.next_id()) as u64;
        self.acquired = Some(id);
        Ok(self.view(id, self.desc.color_format))
    }

    fn depth_buffer(&self) -> GfxResult<GpuTextureView> {
        // Depth ids live above the 32-bit back-buffer range.
        Ok(self.view(1 << 32, self.desc.depth_format))
    }

    fn present(&mut self, sync_interval: u32) -> GfxResult<()> {
        let index = self.presents;
        self.presents += 1;
        if self.faults.fail_present == Some(index) {
            return Err(GfxError::Surface(format!("present {index} failed")));
        }
        if self.acquired.take().is_none() {
            return Err(GfxError::Surface("present without an acquired back buffer".to_string()));
        }

        self.recorder.record(CaptureCommand::Present {
            sync_interval,
            size: (self.desc.width, self.desc.height),
        });
        Ok(())
    }
}
