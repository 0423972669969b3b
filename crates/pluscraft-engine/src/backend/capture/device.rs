use crate::gfx::{
    BufferAccess, BufferDesc, BufferUsage, GfxError, GfxResult, GpuBindingSet, GpuBuffer,
    GpuPipeline, GpuShader, PipelineStateDesc, RawBindingSet, RawBuffer, RawPipeline, RawShader,
    RenderDevice, ShaderDesc, ShaderStage,
};

use super::recorder::{BufferRecord, CaptureRecorder, PipelineRecord};
use super::BACKEND_NAME;

/// Resource factory that keeps buffer contents in host memory.
#[derive(Debug)]
pub struct CaptureDevice {
    recorder: CaptureRecorder,
}

impl CaptureDevice {
    pub(crate) fn new(recorder: CaptureRecorder) -> Self {
        Self { recorder }
    }
}

fn mismatch(resource: &'static str, found: &'static str) -> GfxError {
    GfxError::BackendMismatch {
        resource,
        expected: BACKEND_NAME,
        found,
    }
}

impl RenderDevice for CaptureDevice {
    fn backend_name(&self) -> &'static str {
        BACKEND_NAME
    }

    fn create_shader(&self, desc: &ShaderDesc<'_>) -> GfxResult<GpuShader> {
        if desc.entry_point.is_empty() || !desc.source.contains(desc.entry_point) {
            return Err(GfxError::ShaderCompilation {
                name: desc.name.to_string(),
                message: format!("entry point `{}` not found", desc.entry_point),
            });
        }

        let id = self.recorder.with_state(|s| s.next_id());
        log::trace!("capture: shader {:?} ({}) -> #{id}", desc.name, desc.stage);

        Ok(GpuShader {
            name: desc.name.to_string(),
            stage: desc.stage,
            entry_point: desc.entry_point.to_string(),
            raw: RawShader::Capture(id),
        })
    }

    fn create_buffer(&self, desc: &BufferDesc<'_>, contents: Option<&[u8]>) -> GfxResult<GpuBuffer> {
        let fail = |message: String| GfxError::BufferCreation {
            label: desc.label.to_string(),
            message,
        };

        let contents = match (desc.access, contents) {
            (_, Some(bytes)) if bytes.len() as u64 != desc.size => {
                return Err(fail(format!(
                    "{} bytes supplied for a {}-byte buffer",
                    bytes.len(),
                    desc.size
                )));
            }
            (_, Some(bytes)) => bytes.to_vec(),
            (BufferAccess::Immutable, None) => {
                return Err(fail("immutable buffers need initial contents".to_string()));
            }
            (BufferAccess::Dynamic, None) => vec![0; desc.size as usize],
        };

        let id = self.recorder.with_state(|s| {
            let id = s.next_id();
            s.buffers.insert(
                id,
                BufferRecord {
                    access: desc.access,
                    contents,
                    mapped: false,
                },
            );
            id
        });

        Ok(GpuBuffer {
            label: desc.label.to_string(),
            size: desc.size,
            usage: desc.usage,
            access: desc.access,
            raw: RawBuffer::Capture(id),
        })
    }

    fn create_pipeline_state(&self, desc: &PipelineStateDesc<'_>) -> GfxResult<GpuPipeline> {
        for shader in [desc.vertex_shader, desc.pixel_shader] {
            if !matches!(shader.raw, RawShader::Capture(_)) {
                return Err(mismatch("shader", shader.backend_name()));
            }
        }

        let fail = |message: String| GfxError::PipelineCreation {
            name: desc.name.to_string(),
            message,
        };
        if desc.vertex_shader.stage != ShaderStage::Vertex {
            return Err(fail(format!("`{}` is not a vertex shader", desc.vertex_shader.name)));
        }
        if desc.pixel_shader.stage != ShaderStage::Pixel {
            return Err(fail(format!("`{}` is not a pixel shader", desc.pixel_shader.name)));
        }
        if !desc.depth.format.is_depth_stencil_format() {
            return Err(fail(format!("{:?} is not a depth format", desc.depth.format)));
        }

        let id = self.recorder.with_state(|s| {
            let id = s.next_id();
            s.pipelines.insert(
                id,
                PipelineRecord {
                    bindings: desc.variables.iter().map(|v| v.binding).collect(),
                },
            );
            id
        });

        Ok(GpuPipeline {
            name: desc.name.to_string(),
            raw: RawPipeline::Capture(id),
        })
    }

    fn create_binding_set(
        &self,
        pipeline: &GpuPipeline,
        buffers: &[(u32, &GpuBuffer)],
    ) -> GfxResult<GpuBindingSet> {
        let RawPipeline::Capture(pipeline_id) = pipeline.raw else {
            return Err(mismatch("pipeline", pipeline.backend_name()));
        };

        let declared = self
            .recorder
            .with_state(|s| s.pipelines.get(&pipeline_id).map(|p| p.bindings.clone()))
            .unwrap_or_default();

        let mut slots = Vec::with_capacity(buffers.len());
        for &(binding, buffer) in buffers {
            let RawBuffer::Capture(buffer_id) = buffer.raw else {
                return Err(mismatch("buffer", buffer.backend_name()));
            };
            if buffer.usage != BufferUsage::Uniform {
                return Err(GfxError::PipelineCreation {
                    name: pipeline.name.clone(),
                    message: format!("buffer `{}` is not a uniform buffer", buffer.label),
                });
            }
            if !declared.contains(&binding) {
                return Err(GfxError::PipelineCreation {
                    name: pipeline.name.clone(),
                    message: format!("binding {binding} is not declared"),
                });
            }
            slots.push((binding, buffer_id));
        }

        Ok(GpuBindingSet {
            raw: RawBindingSet::Capture(slots),
        })
    }
}
