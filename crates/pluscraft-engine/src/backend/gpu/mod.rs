//! Native backend on top of `wgpu`.
//!
//! One factory per device kind, each restricted to the matching wgpu backend.

mod context;
mod device;
mod factory;
mod passes;
mod surface;
mod swapchain;

pub use context::GpuContext;
pub use device::GpuDevice;
pub use factory::GpuFactory;
pub use swapchain::GpuSwapchain;

pub const BACKEND_NAME: &str = "wgpu";
