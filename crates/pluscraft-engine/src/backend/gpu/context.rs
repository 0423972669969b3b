use crate::gfx::{
    BufferAccess, DeviceContext, DrawAttribs, GfxError, GfxResult, GpuBindingSet, GpuBuffer,
    GpuPipeline, GpuTextureView, RawBindingSet, RawBuffer, RawPipeline, RawView,
};

use super::BACKEND_NAME;
use super::passes::{PassQueue, PassRecord, PassStep};

#[derive(Debug, Clone)]
enum PassCommand {
    SetPipeline(wgpu::RenderPipeline),
    SetVertexBuffer(u32, wgpu::Buffer),
    SetIndexBuffer(wgpu::Buffer, wgpu::IndexFormat),
    SetBindGroup(wgpu::BindGroup),
    Draw(DrawAttribs),
}

impl PassStep for PassCommand {
    fn is_draw(&self) -> bool {
        matches!(self, PassCommand::Draw(_))
    }
}

/// Immediate context over the `wgpu` queue.
#[derive(Debug)]
pub struct GpuContext {
    device: wgpu::Device,
    queue: wgpu::Queue,
    passes: PassQueue<wgpu::TextureView, PassCommand>,
}

impl GpuContext {
    pub(crate) fn new(device: wgpu::Device, queue: wgpu::Queue) -> Self {
        Self {
            device,
            queue,
            passes: PassQueue::default(),
        }
    }

    fn push(&mut self, command: PassCommand) {
        if !self.passes.push(command) {
            log::warn!("command issued before render targets were set; ignored");
        }
    }

    fn submit(&self, passes: Vec<PassRecord<wgpu::TextureView, PassCommand>>) {
        if passes.is_empty() {
            return;
        }

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("pluscraft frame encoder"),
            });

        for record in &passes {
            let depth_stencil_attachment =
                record
                    .depth
                    .as_ref()
                    .map(|view| wgpu::RenderPassDepthStencilAttachment {
                        view,
                        depth_ops: Some(wgpu::Operations {
                            load: record.depth_load,
                            store: wgpu::StoreOp::Store,
                        }),
                        stencil_ops: None,
                    });

            let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("pluscraft pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &record.color,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: record.color_load,
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment,
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

            for command in &record.commands {
                match command {
                    PassCommand::SetPipeline(p) => rpass.set_pipeline(p),
                    PassCommand::SetVertexBuffer(slot, b) => rpass.set_vertex_buffer(*slot, b.slice(..)),
                    PassCommand::SetIndexBuffer(b, format) => rpass.set_index_buffer(b.slice(..), *format),
                    PassCommand::SetBindGroup(g) => rpass.set_bind_group(0, g, &[]),
                    PassCommand::Draw(DrawAttribs::Vertices { num_vertices }) => {
                        rpass.draw(0..*num_vertices, 0..1)
                    }
                    PassCommand::Draw(DrawAttribs::Indexed { num_indices }) => {
                        rpass.draw_indexed(0..*num_indices, 0, 0..1)
                    }
                }
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
    }
}

fn wgpu_view(view: &GpuTextureView) -> Option<&wgpu::TextureView> {
    match &view.raw {
        RawView::Wgpu(v) => Some(v),
        RawView::Capture(_) => {
            log::error!("wgpu context ignored a {} texture view", view.backend_name());
            None
        }
    }
}

fn wgpu_buffer(buffer: &GpuBuffer) -> Option<&wgpu::Buffer> {
    match &buffer.raw {
        RawBuffer::Wgpu(b) => Some(b),
        RawBuffer::Capture(_) => {
            log::error!("wgpu context ignored buffer `{}` from the capture backend", buffer.label);
            None
        }
    }
}

impl DeviceContext for GpuContext {
    fn set_render_targets(&mut self, color: &GpuTextureView, depth: Option<&GpuTextureView>) {
        let Some(color) = wgpu_view(color) else {
            return;
        };
        let depth = match depth {
            Some(d) => match wgpu_view(d) {
                Some(v) => Some(v.clone()),
                None => return,
            },
            None => None,
        };
        self.passes.begin(color.clone(), depth);
    }

    fn clear_render_target(&mut self, color: &GpuTextureView, rgba: [f32; 4]) {
        if wgpu_view(color).is_none() {
            return;
        }
        let [r, g, b, a] = rgba.map(f64::from);
        match self.passes.clearable() {
            Some(pass) => pass.color_load = wgpu::LoadOp::Clear(wgpu::Color { r, g, b, a }),
            None => log::warn!("clear issued before render targets were set; ignored"),
        }
    }

    fn clear_depth_stencil(&mut self, depth: &GpuTextureView, depth_value: f32) {
        if wgpu_view(depth).is_none() {
            return;
        }
        match self.passes.clearable() {
            Some(pass) if pass.depth.is_some() => pass.depth_load = wgpu::LoadOp::Clear(depth_value),
            _ => log::warn!("depth clear issued without a bound depth target; ignored"),
        }
    }

    fn set_pipeline_state(&mut self, pipeline: &GpuPipeline) {
        match &pipeline.raw {
            RawPipeline::Wgpu { pipeline, .. } => self.push(PassCommand::SetPipeline(pipeline.clone())),
            RawPipeline::Capture(_) => log::error!("wgpu context ignored pipeline `{}`", pipeline.name),
        }
    }

    fn set_vertex_buffer(&mut self, slot: u32, buffer: &GpuBuffer) {
        if let Some(b) = wgpu_buffer(buffer) {
            self.push(PassCommand::SetVertexBuffer(slot, b.clone()));
        }
    }

    fn set_index_buffer(&mut self, buffer: &GpuBuffer, format: wgpu::IndexFormat) {
        if let Some(b) = wgpu_buffer(buffer) {
            self.push(PassCommand::SetIndexBuffer(b.clone(), format));
        }
    }

    fn map_write_discard(&mut self, buffer: &GpuBuffer) -> GfxResult<()> {
        if !matches!(buffer.raw, RawBuffer::Wgpu(_)) {
            return Err(GfxError::BackendMismatch {
                resource: "buffer",
                expected: BACKEND_NAME,
                found: buffer.backend_name(),
            });
        }
        if buffer.access != BufferAccess::Dynamic {
            return Err(GfxError::NotMappable(buffer.label.clone()));
        }

        // Queue writes land ahead of the next submission, so recorded draws go first.
        let batch = self.passes.take_before_write();
        self.submit(batch);
        Ok(())
    }

    fn unmap(&mut self, buffer: &GpuBuffer, data: &[u8]) {
        if let Some(b) = wgpu_buffer(buffer) {
            let len = data.len().min(buffer.size as usize);
            self.queue.write_buffer(b, 0, &data[..len]);
        }
    }

    fn commit_bindings(&mut self, bindings: &GpuBindingSet) {
        match &bindings.raw {
            RawBindingSet::Wgpu(group) => self.push(PassCommand::SetBindGroup(group.clone())),
            RawBindingSet::Capture(_) => log::error!("wgpu context ignored a capture binding set"),
        }
    }

    fn draw(&mut self, attribs: DrawAttribs) {
        self.push(PassCommand::Draw(attribs));
    }

    fn flush(&mut self) -> GfxResult<()> {
        // The frame ends here; nothing continues on its targets.
        let batch = self.passes.take_all();
        self.submit(batch);
        Ok(())
    }
}
