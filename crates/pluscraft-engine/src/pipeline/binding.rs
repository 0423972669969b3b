use crate::error::ResourceError;
use crate::gfx::{DeviceContext, GpuBindingSet, GpuBuffer, RenderDevice, ShaderVariable};

use super::PipelineState;

/// Buffers assigned to one pipeline's declared variables.
///
/// Tied to the identity of the pipeline it was created from; a rebuilt
/// pipeline needs a new binding.
#[derive(Debug)]
pub struct ShaderResourceBinding {
    pipeline_id: u64,
    pipeline_name: String,
    slots: Vec<(ShaderVariable, Option<GpuBuffer>)>,
    committed: Option<GpuBindingSet>,
}

impl ShaderResourceBinding {
    pub(crate) fn new(pipeline: &PipelineState) -> Self {
        Self {
            pipeline_id: pipeline.id(),
            pipeline_name: pipeline.name().to_string(),
            slots: pipeline
                .variables()
                .iter()
                .map(|v| (v.clone(), None))
                .collect(),
            committed: None,
        }
    }

    /// Binds `buffer` to the variable called `name`.
    pub fn set(&mut self, name: &str, buffer: &GpuBuffer) -> Result<(), ResourceError> {
        let slot = self
            .slots
            .iter_mut()
            .find(|(var, _)| var.name == name)
            .ok_or_else(|| ResourceError::UnknownVariable {
                pipeline: self.pipeline_name.clone(),
                name: name.to_string(),
            })?;
        slot.1 = Some(buffer.clone());
        self.committed = None;
        Ok(())
    }

    /// First declared variable with no buffer, if any.
    pub fn first_unbound(&self) -> Option<&str> {
        self.slots
            .iter()
            .find(|(_, buffer)| buffer.is_none())
            .map(|(var, _)| var.name.as_str())
    }

    /// Makes the bound buffers visible to subsequent draws.
    ///
    /// The backend binding set is created on first commit and reused until a
    /// variable is rebound.
    pub fn commit(
        &mut self,
        pipeline: &PipelineState,
        device: &dyn RenderDevice,
        context: &mut dyn DeviceContext,
    ) -> Result<(), ResourceError> {
        if pipeline.id() != self.pipeline_id {
            return Err(ResourceError::StaleBinding {
                pipeline: pipeline.name().to_string(),
            });
        }

        if self.committed.is_none() {
            let mut buffers = Vec::with_capacity(self.slots.len());
            for (var, buffer) in &self.slots {
                let buffer = buffer.as_ref().ok_or_else(|| ResourceError::UnboundVariable {
                    pipeline: self.pipeline_name.clone(),
                    name: var.name.clone(),
                })?;
                buffers.push((var.binding, buffer));
            }
            self.committed = Some(device.create_binding_set(pipeline.gpu(), &buffers)?);
        }

        if let Some(set) = &self.committed {
            context.commit_bindings(set);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::capture::{CaptureCommand, CaptureFactory};
    use crate::backend::{BackendFactory, DeviceKind, WindowTarget};
    use crate::config::SceneConfig;
    use crate::gfx::{BufferAccess, BufferDesc, BufferUsage, SwapchainDesc};
    use crate::pipeline::PipelineBuilder;

    struct Fixture {
        factory: CaptureFactory,
        device: Box<dyn RenderDevice>,
        context: Box<dyn DeviceContext>,
    }

    fn fixture() -> Fixture {
        let mut factory = CaptureFactory::new(DeviceKind::OpenGl);
        let (device, context) = factory
            .create_device_and_context(&WindowTarget::headless(4, 4))
            .unwrap();
        Fixture {
            factory,
            device,
            context,
        }
    }

    fn build(device: &dyn RenderDevice) -> PipelineState {
        let swapchain = SwapchainDesc {
            width: 4,
            height: 4,
            color_format: wgpu::TextureFormat::Bgra8UnormSrgb,
            depth_format: wgpu::TextureFormat::Depth32Float,
            buffer_count: 2,
            sync_interval: 1,
        };
        PipelineBuilder::for_scene(&SceneConfig::default())
            .build(device, &swapchain)
            .unwrap()
    }

    fn constants(device: &dyn RenderDevice) -> GpuBuffer {
        device
            .create_buffer(
                &BufferDesc {
                    label: "constants",
                    size: 64,
                    usage: BufferUsage::Uniform,
                    access: BufferAccess::Dynamic,
                },
                None,
            )
            .unwrap()
    }

    #[test]
    fn unknown_name_fails_immediately() {
        let f = fixture();
        let pso = build(f.device.as_ref());
        let mut srb = pso.create_binding();

        let err = srb.set("Constants2", &constants(f.device.as_ref())).unwrap_err();
        assert!(matches!(err, ResourceError::UnknownVariable { .. }));
    }

    #[test]
    fn unbound_variable_fails_at_commit() {
        let mut f = fixture();
        let pso = build(f.device.as_ref());
        let mut srb = pso.create_binding();
        assert_eq!(srb.first_unbound(), Some("constants"));

        let err = srb
            .commit(&pso, f.device.as_ref(), f.context.as_mut())
            .unwrap_err();
        assert!(matches!(err, ResourceError::UnboundVariable { ref name, .. } if name == "constants"));
    }

    #[test]
    fn binding_from_rebuilt_pipeline_is_stale() {
        let mut f = fixture();
        let old = build(f.device.as_ref());
        let new = build(f.device.as_ref());

        let mut srb = old.create_binding();
        srb.set("constants", &constants(f.device.as_ref())).unwrap();

        let err = srb
            .commit(&new, f.device.as_ref(), f.context.as_mut())
            .unwrap_err();
        assert!(matches!(err, ResourceError::StaleBinding { .. }));
    }

    #[test]
    fn commit_records_bound_slot() {
        let mut f = fixture();
        let pso = build(f.device.as_ref());
        let buffer = constants(f.device.as_ref());
        let mut srb = pso.create_binding();
        srb.set("constants", &buffer).unwrap();

        srb.commit(&pso, f.device.as_ref(), f.context.as_mut()).unwrap();
        srb.commit(&pso, f.device.as_ref(), f.context.as_mut()).unwrap();

        let expected = CaptureCommand::CommitBindings {
            slots: vec![(0, buffer.capture_id().unwrap())],
        };
        let commits: Vec<_> = f
            .factory
            .recorder()
            .commands()
            .into_iter()
            .filter(|c| matches!(c, CaptureCommand::CommitBindings { .. }))
            .collect();
        assert_eq!(commits, vec![expected.clone(), expected]);
    }
}
