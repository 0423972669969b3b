//! Backend-neutral graphics capability interface.
//!
//! Three roles, one trait each: [`RenderDevice`] creates resources,
//! [`DeviceContext`] records commands and [`Swapchain`] owns the presentable
//! images. Every backend implements all three.

mod error;
mod traits;
mod types;

pub use error::{GfxError, GfxResult};
pub use traits::{DeviceContext, RenderDevice, Swapchain};
pub use types::{
    BufferAccess, BufferDesc, BufferUsage, DepthState, DrawAttribs, GpuBindingSet, GpuBuffer,
    GpuPipeline, GpuShader, GpuTextureView, PipelineStateDesc, ShaderDesc, ShaderStage,
    ShaderVariable, SwapchainDesc,
};

pub(crate) use types::{RawBindingSet, RawBuffer, RawPipeline, RawShader, RawView};
