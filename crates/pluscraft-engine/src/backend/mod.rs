//! Backend selection.
//!
//! A [`BackendRegistry`] maps each [`DeviceKind`] to the [`BackendFactory`]
//! able to create it. Selection consumes the registry, so a run picks its
//! backend exactly once.

pub mod capture;
pub mod gpu;
mod native;

use std::fmt;
use std::str::FromStr;

use crate::config::ParseConfigError;
use crate::error::BackendInitError;
use crate::gfx::{DeviceContext, RenderDevice, Swapchain, SwapchainDesc};

pub use native::{NativeWindow, WindowTarget};

/// Graphics API family requested by the configuration.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum DeviceKind {
    OpenGl,
    Vulkan,
    D3D11,
    D3D12,
}

impl DeviceKind {
    pub const ALL: [DeviceKind; 4] = [
        DeviceKind::OpenGl,
        DeviceKind::Vulkan,
        DeviceKind::D3D11,
        DeviceKind::D3D12,
    ];

    /// Whether this build can drive the kind natively.
    pub fn is_compiled(self) -> bool {
        match self {
            DeviceKind::OpenGl => cfg!(feature = "opengl"),
            DeviceKind::Vulkan => cfg!(feature = "vulkan"),
            DeviceKind::D3D11 | DeviceKind::D3D12 => cfg!(all(feature = "d3d", windows)),
        }
    }

    /// Whether a window of this platform can host a swapchain of this kind.
    pub fn accepts(self, window: &NativeWindow) -> bool {
        match (self, window) {
            (_, NativeWindow::Headless) => false,
            (DeviceKind::D3D11 | DeviceKind::D3D12, NativeWindow::Win32 { .. }) => true,
            (DeviceKind::D3D11 | DeviceKind::D3D12, _) => false,
            (DeviceKind::OpenGl | DeviceKind::Vulkan, _) => true,
        }
    }
}

impl fmt::Display for DeviceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DeviceKind::OpenGl => "OpenGL",
            DeviceKind::Vulkan => "Vulkan",
            DeviceKind::D3D11 => "D3D11",
            DeviceKind::D3D12 => "D3D12",
        };
        f.write_str(name)
    }
}

impl FromStr for DeviceKind {
    type Err = ParseConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gl" | "opengl" => Ok(DeviceKind::OpenGl),
            "vk" | "vulkan" => Ok(DeviceKind::Vulkan),
            "d3d11" => Ok(DeviceKind::D3D11),
            "d3d12" => Ok(DeviceKind::D3D12),
            _ => Err(ParseConfigError::new("device kind", s)),
        }
    }
}

/// Device, context and swapchain produced together by a factory.
pub type DeviceAndContext = (Box<dyn RenderDevice>, Box<dyn DeviceContext>);

/// Creation sequence for one device kind.
///
/// `create_device_and_context` must succeed before `create_swapchain`.
pub trait BackendFactory {
    fn kind(&self) -> DeviceKind;

    fn create_device_and_context(
        &mut self,
        target: &WindowTarget,
    ) -> Result<DeviceAndContext, BackendInitError>;

    fn create_swapchain(
        &mut self,
        desc: &SwapchainDesc,
        target: &WindowTarget,
    ) -> Result<Box<dyn Swapchain>, BackendInitError>;
}

/// Factories keyed by device kind.
#[derive(Default)]
pub struct BackendRegistry {
    factories: Vec<Box<dyn BackendFactory>>,
}

impl BackendRegistry {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Registry holding a `wgpu` factory for every kind compiled into this build.
    pub fn with_native_backends() -> Self {
        let mut registry = Self::empty();
        for kind in DeviceKind::ALL.into_iter().filter(|k| k.is_compiled()) {
            registry.register(Box::new(gpu::GpuFactory::new(kind)));
        }
        registry
    }

    /// Adds `factory`, replacing any factory registered for the same kind.
    pub fn register(&mut self, factory: Box<dyn BackendFactory>) {
        let kind = factory.kind();
        self.factories.retain(|f| f.kind() != kind);
        self.factories.push(factory);
    }

    pub fn supported_kinds(&self) -> Vec<DeviceKind> {
        self.factories.iter().map(|f| f.kind()).collect()
    }

    /// Takes the factory for `kind`, dropping the rest.
    pub fn select(self, kind: DeviceKind) -> Result<Box<dyn BackendFactory>, BackendInitError> {
        self.factories
            .into_iter()
            .find(|f| f.kind() == kind)
            .ok_or(BackendInitError::UnsupportedDeviceKind { kind })
    }
}

impl fmt::Debug for BackendRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackendRegistry")
            .field("kinds", &self.supported_kinds())
            .finish()
    }
}
