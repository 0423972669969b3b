//! Backend-neutral descriptors and resource handles.
//!
//! Formats, topology and vertex layouts reuse the `wgpu` enums; every backend
//! (including the capture backend) speaks the same vocabulary.

use std::fmt;

/// Programmable stage a shader is compiled for.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum ShaderStage {
    Vertex,
    Pixel,
}

impl ShaderStage {
    pub fn to_wgpu(self) -> wgpu::ShaderStages {
        match self {
            ShaderStage::Vertex => wgpu::ShaderStages::VERTEX,
            ShaderStage::Pixel => wgpu::ShaderStages::FRAGMENT,
        }
    }
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShaderStage::Vertex => f.write_str("vertex"),
            ShaderStage::Pixel => f.write_str("pixel"),
        }
    }
}

/// Shader creation request: opaque source text plus entry point.
#[derive(Debug, Copy, Clone)]
pub struct ShaderDesc<'a> {
    pub name: &'a str,
    pub source: &'a str,
    pub entry_point: &'a str,
    pub stage: ShaderStage,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum BufferUsage {
    Vertex,
    Index,
    Uniform,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum BufferAccess {
    /// Contents supplied at creation and never written again.
    Immutable,
    /// Rewritten by the host through discard-on-map.
    Dynamic,
}

#[derive(Debug, Copy, Clone)]
pub struct BufferDesc<'a> {
    pub label: &'a str,
    pub size: u64,
    pub usage: BufferUsage,
    pub access: BufferAccess,
}

/// Swapchain parameters. Only `width`/`height` change after creation.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct SwapchainDesc {
    pub width: u32,
    pub height: u32,
    pub color_format: wgpu::TextureFormat,
    pub depth_format: wgpu::TextureFormat,
    pub buffer_count: u32,
    pub sync_interval: u32,
}

impl SwapchainDesc {
    pub const DEFAULT_DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

    pub fn is_zero_sized(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Uniform-buffer variable declared by a pipeline.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct ShaderVariable {
    pub name: String,
    pub binding: u32,
    pub stages: wgpu::ShaderStages,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct DepthState {
    pub format: wgpu::TextureFormat,
    pub test_enabled: bool,
}

/// Declarative pipeline description handed to a device.
#[derive(Debug, Clone)]
pub struct PipelineStateDesc<'a> {
    pub name: &'a str,
    pub vertex_shader: &'a GpuShader,
    pub pixel_shader: &'a GpuShader,
    pub vertex_layout: wgpu::VertexBufferLayout<'a>,
    pub topology: wgpu::PrimitiveTopology,
    pub front_face: wgpu::FrontFace,
    pub cull_mode: Option<wgpu::Face>,
    pub color_format: wgpu::TextureFormat,
    pub depth: DepthState,
    pub variables: &'a [ShaderVariable],
}

/// Parameters of one draw call. Always a single instance.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum DrawAttribs {
    Vertices { num_vertices: u32 },
    Indexed { num_indices: u32 },
}

impl DrawAttribs {
    /// Number of vertices or indices consumed.
    pub fn element_count(&self) -> u32 {
        match *self {
            DrawAttribs::Vertices { num_vertices } => num_vertices,
            DrawAttribs::Indexed { num_indices } => num_indices,
        }
    }
}

// ── handles ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub(crate) enum RawShader {
    Wgpu(wgpu::ShaderModule),
    Capture(u32),
}

#[derive(Debug, Clone)]
pub(crate) enum RawBuffer {
    Wgpu(wgpu::Buffer),
    Capture(u32),
}

#[derive(Debug, Clone)]
pub(crate) enum RawPipeline {
    Wgpu {
        pipeline: wgpu::RenderPipeline,
        bind_group_layout: wgpu::BindGroupLayout,
    },
    Capture(u32),
}

#[derive(Debug, Clone)]
pub(crate) enum RawBindingSet {
    Wgpu(wgpu::BindGroup),
    Capture(Vec<(u32, u32)>),
}

#[derive(Debug, Clone)]
pub(crate) enum RawView {
    Wgpu(wgpu::TextureView),
    Capture(u64),
}

macro_rules! backend_of {
    ($raw:expr, $ty:ident) => {
        match $raw {
            $ty::Wgpu { .. } => crate::backend::gpu::BACKEND_NAME,
            $ty::Capture(..) => crate::backend::capture::BACKEND_NAME,
        }
    };
}

/// Compiled shader stage.
#[derive(Debug, Clone)]
pub struct GpuShader {
    pub(crate) name: String,
    pub(crate) stage: ShaderStage,
    pub(crate) entry_point: String,
    pub(crate) raw: RawShader,
}

impl GpuShader {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn stage(&self) -> ShaderStage {
        self.stage
    }

    pub fn entry_point(&self) -> &str {
        &self.entry_point
    }

    pub fn backend_name(&self) -> &'static str {
        backend_of!(&self.raw, RawShader)
    }
}

/// GPU buffer plus the metadata it was created with.
#[derive(Debug, Clone)]
pub struct GpuBuffer {
    pub(crate) label: String,
    pub(crate) size: u64,
    pub(crate) usage: BufferUsage,
    pub(crate) access: BufferAccess,
    pub(crate) raw: RawBuffer,
}

impl GpuBuffer {
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn usage(&self) -> BufferUsage {
        self.usage
    }

    pub fn access(&self) -> BufferAccess {
        self.access
    }

    pub fn backend_name(&self) -> &'static str {
        backend_of!(&self.raw, RawBuffer)
    }

    /// Identifier assigned by the capture backend, if this buffer came from it.
    pub fn capture_id(&self) -> Option<u32> {
        match self.raw {
            RawBuffer::Capture(id) => Some(id),
            RawBuffer::Wgpu(_) => None,
        }
    }
}

/// Backend pipeline object.
#[derive(Debug, Clone)]
pub struct GpuPipeline {
    pub(crate) name: String,
    pub(crate) raw: RawPipeline,
}

impl GpuPipeline {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn backend_name(&self) -> &'static str {
        backend_of!(&self.raw, RawPipeline)
    }
}

/// Concrete buffers attached to a pipeline's declared slots.
#[derive(Debug, Clone)]
pub struct GpuBindingSet {
    pub(crate) raw: RawBindingSet,
}

impl GpuBindingSet {
    pub fn backend_name(&self) -> &'static str {
        backend_of!(&self.raw, RawBindingSet)
    }
}

/// Render-target or depth-stencil view for the current frame.
#[derive(Debug, Clone)]
pub struct GpuTextureView {
    pub(crate) width: u32,
    pub(crate) height: u32,
    pub(crate) format: wgpu::TextureFormat,
    pub(crate) raw: RawView,
}

impl GpuTextureView {
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn format(&self) -> wgpu::TextureFormat {
        self.format
    }

    pub fn backend_name(&self) -> &'static str {
        backend_of!(&self.raw, RawView)
    }
}
