use crate::gfx::{
    BufferAccess, DeviceContext, DrawAttribs, GfxError, GfxResult, GpuBindingSet, GpuBuffer,
    GpuPipeline, GpuTextureView, RawBindingSet, RawBuffer, RawPipeline, RawView,
};

use super::recorder::{CaptureCommand, CaptureRecorder};
use super::BACKEND_NAME;

/// Immediate context that appends every call to the recorder.
#[derive(Debug)]
pub struct CaptureContext {
    recorder: CaptureRecorder,
    committed: Vec<(u32, u32)>,
}

impl CaptureContext {
    pub(crate) fn new(recorder: CaptureRecorder) -> Self {
        Self {
            recorder,
            committed: Vec::new(),
        }
    }

    fn buffer_id(&self, buffer: &GpuBuffer) -> Option<u32> {
        match buffer.raw {
            RawBuffer::Capture(id) => Some(id),
            RawBuffer::Wgpu(_) => {
                log::error!(
                    "capture context ignored buffer `{}` from the {} backend",
                    buffer.label,
                    buffer.backend_name()
                );
                None
            }
        }
    }
}

fn is_capture_view(view: &GpuTextureView) -> bool {
    let ok = matches!(view.raw, RawView::Capture(_));
    if !ok {
        log::error!("capture context ignored a {} texture view", view.backend_name());
    }
    ok
}

impl DeviceContext for CaptureContext {
    fn set_render_targets(&mut self, color: &GpuTextureView, depth: Option<&GpuTextureView>) {
        if !is_capture_view(color) || !depth.is_none_or(is_capture_view) {
            return;
        }
        self.recorder.record(CaptureCommand::SetRenderTargets {
            color_size: color.size(),
            depth: depth.is_some(),
        });
    }

    fn clear_render_target(&mut self, color: &GpuTextureView, rgba: [f32; 4]) {
        if is_capture_view(color) {
            self.recorder.record(CaptureCommand::ClearRenderTarget { rgba });
        }
    }

    fn clear_depth_stencil(&mut self, depth: &GpuTextureView, depth_value: f32) {
        if is_capture_view(depth) {
            self.recorder.record(CaptureCommand::ClearDepthStencil { depth: depth_value });
        }
    }

    fn set_pipeline_state(&mut self, pipeline: &GpuPipeline) {
        match pipeline.raw {
            RawPipeline::Capture(_) => self.recorder.record(CaptureCommand::SetPipeline {
                name: pipeline.name.clone(),
            }),
            RawPipeline::Wgpu { .. } => {
                log::error!("capture context ignored pipeline `{}`", pipeline.name)
            }
        }
    }

    fn set_vertex_buffer(&mut self, slot: u32, buffer: &GpuBuffer) {
        if let Some(id) = self.buffer_id(buffer) {
            self.recorder
                .record(CaptureCommand::SetVertexBuffer { slot, buffer: id });
        }
    }

    fn set_index_buffer(&mut self, buffer: &GpuBuffer, format: wgpu::IndexFormat) {
        if let Some(id) = self.buffer_id(buffer) {
            self.recorder
                .record(CaptureCommand::SetIndexBuffer { buffer: id, format });
        }
    }

    fn map_write_discard(&mut self, buffer: &GpuBuffer) -> GfxResult<()> {
        let RawBuffer::Capture(id) = buffer.raw else {
            return Err(GfxError::BackendMismatch {
                resource: "buffer",
                expected: BACKEND_NAME,
                found: buffer.backend_name(),
            });
        };

        let mappable = self.recorder.with_state(|s| match s.buffers.get_mut(&id) {
            Some(record) if record.access == BufferAccess::Dynamic => {
                record.mapped = true;
                true
            }
            _ => false,
        });
        if !mappable {
            return Err(GfxError::NotMappable(buffer.label.clone()));
        }

        self.recorder.record(CaptureCommand::Map { buffer: id });
        Ok(())
    }

    fn unmap(&mut self, buffer: &GpuBuffer, data: &[u8]) {
        let Some(id) = self.buffer_id(buffer) else {
            return;
        };

        let written = self.recorder.with_state(|s| {
            let record = s.buffers.get_mut(&id)?;
            if !record.mapped {
                return None;
            }
            record.mapped = false;
            let len = data.len().min(record.contents.len());
            record.contents[..len].copy_from_slice(&data[..len]);
            Some(data[..len].to_vec())
        });

        match written {
            Some(bytes) => self.recorder.record(CaptureCommand::Unmap { buffer: id, bytes }),
            None => log::error!("unmap of buffer `{}` without a matching map", buffer.label),
        }
    }

    fn commit_bindings(&mut self, bindings: &GpuBindingSet) {
        match &bindings.raw {
            RawBindingSet::Capture(slots) => {
                self.committed = slots.clone();
                self.recorder.record(CaptureCommand::CommitBindings {
                    slots: slots.clone(),
                });
            }
            RawBindingSet::Wgpu(_) => log::error!("capture context ignored a wgpu binding set"),
        }
    }

    fn draw(&mut self, attribs: DrawAttribs) {
        let bindings = self.recorder.with_state(|s| {
            self.committed
                .iter()
                .filter_map(|&(binding, id)| {
                    s.buffers.get(&id).map(|b| (binding, b.contents.clone()))
                })
                .collect()
        });
        self.recorder.record(CaptureCommand::Draw { attribs, bindings });
    }

    fn flush(&mut self) -> GfxResult<()> {
        self.recorder.record(CaptureCommand::Flush);
        Ok(())
    }
}
