//! Immutable geometry uploads and the per-frame constants buffer.

mod mesh;

use std::marker::PhantomData;
use std::ops::{Deref, DerefMut};

use bytemuck::{Pod, Zeroable};
use glam::Mat4;

use crate::error::ResourceError;
use crate::gfx::{BufferAccess, BufferDesc, BufferUsage, DeviceContext, GpuBuffer, RenderDevice};

pub use mesh::{CUBE_INDEX_FORMAT, CUBE_INDICES, CUBE_VERTICES, TRIANGLE_VERTICES, Vertex};

/// Creates GPU buffers on one device.
#[derive(Clone, Copy)]
pub struct GeometryStore<'d> {
    device: &'d dyn RenderDevice,
}

impl<'d> GeometryStore<'d> {
    pub fn new(device: &'d dyn RenderDevice) -> Self {
        Self { device }
    }

    /// One-shot upload of read-only vertex or index data.
    pub fn upload_immutable(
        &self,
        label: &str,
        bytes: &[u8],
        usage: BufferUsage,
    ) -> Result<GpuBuffer, ResourceError> {
        if bytes.is_empty() {
            return Err(ResourceError::EmptyUpload {
                label: label.to_string(),
            });
        }

        let desc = BufferDesc {
            label,
            size: bytes.len() as u64,
            usage,
            access: BufferAccess::Immutable,
        };
        let buffer = self.device.create_buffer(&desc, Some(bytes))?;
        log::debug!("uploaded `{label}` ({} bytes, {usage:?})", bytes.len());
        Ok(buffer)
    }

    /// Typed form of [`GeometryStore::upload_immutable`].
    pub fn upload_slice<T: Pod>(
        &self,
        label: &str,
        data: &[T],
        usage: BufferUsage,
    ) -> Result<GpuBuffer, ResourceError> {
        self.upload_immutable(label, bytemuck::cast_slice(data), usage)
    }

    /// Host-writable uniform buffer sized exactly for one `T`.
    pub fn create_dynamic_constants<T: Pod>(
        &self,
        label: &str,
    ) -> Result<ConstantsBuffer<T>, ResourceError> {
        let desc = BufferDesc {
            label,
            size: std::mem::size_of::<T>() as u64,
            usage: BufferUsage::Uniform,
            access: BufferAccess::Dynamic,
        };
        let buffer = self.device.create_buffer(&desc, None)?;
        Ok(ConstantsBuffer {
            buffer,
            _payload: PhantomData,
        })
    }
}

/// Dynamic uniform buffer holding one `T`, rewritten with discard-on-map.
#[derive(Debug)]
pub struct ConstantsBuffer<T> {
    buffer: GpuBuffer,
    _payload: PhantomData<T>,
}

impl<T: Pod> ConstantsBuffer<T> {
    pub fn buffer(&self) -> &GpuBuffer {
        &self.buffer
    }

    /// Maps the buffer for writing. The guard starts zeroed; its value is
    /// published to the GPU buffer when the guard drops.
    pub fn map<'a>(
        &'a self,
        context: &'a mut dyn DeviceContext,
    ) -> Result<MapGuard<'a, T>, ResourceError> {
        context.map_write_discard(&self.buffer)?;
        Ok(MapGuard {
            buffer: &self.buffer,
            context,
            value: T::zeroed(),
        })
    }
}

/// Scoped write access to a mapped [`ConstantsBuffer`].
pub struct MapGuard<'a, T: Pod> {
    buffer: &'a GpuBuffer,
    context: &'a mut dyn DeviceContext,
    value: T,
}

impl<T: Pod> Deref for MapGuard<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.value
    }
}

impl<T: Pod> DerefMut for MapGuard<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.value
    }
}

impl<T: Pod> Drop for MapGuard<'_, T> {
    fn drop(&mut self) {
        self.context
            .unmap(self.buffer, bytemuck::bytes_of(&self.value));
    }
}

/// Per-frame shader constants. Matches `Constants` in the scene vertex shader.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct FrameConstants {
    pub world_view_proj: Mat4,
}

impl ConstantsBuffer<FrameConstants> {
    /// Writes `world_view_proj` transposed.
    pub fn write_transform(
        &self,
        context: &mut dyn DeviceContext,
        world_view_proj: Mat4,
    ) -> Result<(), ResourceError> {
        let mut constants = self.map(context)?;
        constants.world_view_proj = world_view_proj.transpose();
        Ok(())
    }
}
