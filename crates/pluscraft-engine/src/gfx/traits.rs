use super::error::GfxResult;
use super::types::{
    BufferDesc, DrawAttribs, GpuBindingSet, GpuBuffer, GpuPipeline, GpuShader, GpuTextureView,
    PipelineStateDesc, ShaderDesc, SwapchainDesc,
};

/// Resource factory for one backend.
///
/// Creation calls are immediate; nothing here records commands.
pub trait RenderDevice {
    /// Short name of the implementing backend, used in diagnostics.
    fn backend_name(&self) -> &'static str;

    fn create_shader(&self, desc: &ShaderDesc<'_>) -> GfxResult<GpuShader>;

    /// Creates a buffer. `contents` is required for immutable buffers and must
    /// be exactly `desc.size` bytes when present.
    fn create_buffer(&self, desc: &BufferDesc<'_>, contents: Option<&[u8]>) -> GfxResult<GpuBuffer>;

    fn create_pipeline_state(&self, desc: &PipelineStateDesc<'_>) -> GfxResult<GpuPipeline>;

    /// Attaches uniform buffers to `pipeline`'s declared slots.
    fn create_binding_set(
        &self,
        pipeline: &GpuPipeline,
        buffers: &[(u32, &GpuBuffer)],
    ) -> GfxResult<GpuBindingSet>;
}

/// Immediate-style command recorder.
///
/// Commands issued between two `flush` calls are submitted in issue order.
/// Binding a handle from another backend is logged and ignored.
pub trait DeviceContext {
    fn set_render_targets(&mut self, color: &GpuTextureView, depth: Option<&GpuTextureView>);
    fn clear_render_target(&mut self, color: &GpuTextureView, rgba: [f32; 4]);
    fn clear_depth_stencil(&mut self, depth: &GpuTextureView, depth_value: f32);

    fn set_pipeline_state(&mut self, pipeline: &GpuPipeline);
    fn set_vertex_buffer(&mut self, slot: u32, buffer: &GpuBuffer);
    fn set_index_buffer(&mut self, buffer: &GpuBuffer, format: wgpu::IndexFormat);

    /// Begins a discard-style write of a dynamic buffer. Previous contents
    /// are undefined until the matching [`DeviceContext::unmap`].
    fn map_write_discard(&mut self, buffer: &GpuBuffer) -> GfxResult<()>;

    /// Ends a write begun with `map_write_discard`, publishing `data`.
    fn unmap(&mut self, buffer: &GpuBuffer, data: &[u8]);

    fn commit_bindings(&mut self, bindings: &GpuBindingSet);
    fn draw(&mut self, attribs: DrawAttribs);

    /// Submits everything recorded so far.
    fn flush(&mut self) -> GfxResult<()>;
}

/// Presentable back buffers plus the matching depth buffer.
pub trait Swapchain {
    fn desc(&self) -> &SwapchainDesc;

    /// Recreates back and depth buffers. Zero-sized requests are remembered but
    /// not applied.
    fn resize(&mut self, width: u32, height: u32) -> GfxResult<()>;

    /// Render-target view for the frame being built, acquiring one if needed.
    fn current_back_buffer(&mut self) -> GfxResult<GpuTextureView>;

    fn depth_buffer(&self) -> GfxResult<GpuTextureView>;

    /// Presents the acquired back buffer, waiting `sync_interval` vertical syncs.
    fn present(&mut self, sync_interval: u32) -> GfxResult<()>;
}
