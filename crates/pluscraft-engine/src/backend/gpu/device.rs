use wgpu::util::DeviceExt;

use crate::gfx::{
    BufferAccess, BufferDesc, BufferUsage, GfxError, GfxResult, GpuBindingSet, GpuBuffer,
    GpuPipeline, GpuShader, PipelineStateDesc, RawBindingSet, RawBuffer, RawPipeline, RawShader,
    RenderDevice, ShaderDesc,
};

use super::BACKEND_NAME;

/// Resource factory over a `wgpu` logical device.
#[derive(Debug)]
pub struct GpuDevice {
    device: wgpu::Device,
}

impl GpuDevice {
    pub(crate) fn new(device: wgpu::Device) -> Self {
        Self { device }
    }
}

fn mismatch(resource: &'static str, found: &'static str) -> GfxError {
    GfxError::BackendMismatch {
        resource,
        expected: BACKEND_NAME,
        found,
    }
}

fn buffer_usages(usage: BufferUsage, access: BufferAccess) -> wgpu::BufferUsages {
    let base = match usage {
        BufferUsage::Vertex => wgpu::BufferUsages::VERTEX,
        BufferUsage::Index => wgpu::BufferUsages::INDEX,
        BufferUsage::Uniform => wgpu::BufferUsages::UNIFORM,
    };
    match access {
        BufferAccess::Immutable => base,
        BufferAccess::Dynamic => base | wgpu::BufferUsages::COPY_DST,
    }
}

impl RenderDevice for GpuDevice {
    fn backend_name(&self) -> &'static str {
        BACKEND_NAME
    }

    fn create_shader(&self, desc: &ShaderDesc<'_>) -> GfxResult<GpuShader> {
        let module = self
            .device
            .create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some(desc.name),
                source: wgpu::ShaderSource::Wgsl(desc.source.into()),
            });

        Ok(GpuShader {
            name: desc.name.to_string(),
            stage: desc.stage,
            entry_point: desc.entry_point.to_string(),
            raw: RawShader::Wgpu(module),
        })
    }

    fn create_buffer(&self, desc: &BufferDesc<'_>, contents: Option<&[u8]>) -> GfxResult<GpuBuffer> {
        let usage = buffer_usages(desc.usage, desc.access);

        let buffer = match (desc.access, contents) {
            (_, Some(bytes)) if bytes.len() as u64 != desc.size => {
                return Err(GfxError::BufferCreation {
                    label: desc.label.to_string(),
                    message: format!("{} bytes supplied for a {}-byte buffer", bytes.len(), desc.size),
                });
            }
            (_, Some(bytes)) => self
                .device
                .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some(desc.label),
                    contents: bytes,
                    usage,
                }),
            (BufferAccess::Immutable, None) => {
                return Err(GfxError::BufferCreation {
                    label: desc.label.to_string(),
                    message: "immutable buffers need initial contents".to_string(),
                });
            }
            (BufferAccess::Dynamic, None) => self.device.create_buffer(&wgpu::BufferDescriptor {
                label: Some(desc.label),
                size: desc.size,
                usage,
                mapped_at_creation: false,
            }),
        };

        Ok(GpuBuffer {
            label: desc.label.to_string(),
            size: desc.size,
            usage: desc.usage,
            access: desc.access,
            raw: RawBuffer::Wgpu(buffer),
        })
    }

    fn create_pipeline_state(&self, desc: &PipelineStateDesc<'_>) -> GfxResult<GpuPipeline> {
        let RawShader::Wgpu(vs_module) = &desc.vertex_shader.raw else {
            return Err(mismatch("shader", desc.vertex_shader.backend_name()));
        };
        let RawShader::Wgpu(ps_module) = &desc.pixel_shader.raw else {
            return Err(mismatch("shader", desc.pixel_shader.backend_name()));
        };

        let layout_entries: Vec<wgpu::BindGroupLayoutEntry> = desc
            .variables
            .iter()
            .map(|v| wgpu::BindGroupLayoutEntry {
                binding: v.binding,
                visibility: v.stages,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            })
            .collect();

        let bind_group_layout = self
            .device
            .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some(desc.name),
                entries: &layout_entries,
            });

        let pipeline_layout = self
            .device
            .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some(desc.name),
                bind_group_layouts: &[&bind_group_layout],
                immediate_size: 0,
            });

        // Depth format is always declared so the pass layout matches the swapchain.
        let depth_stencil = wgpu::DepthStencilState {
            format: desc.depth.format,
            depth_write_enabled: desc.depth.test_enabled,
            depth_compare: if desc.depth.test_enabled {
                wgpu::CompareFunction::Less
            } else {
                wgpu::CompareFunction::Always
            },
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        };

        let pipeline = self
            .device
            .create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(desc.name),
                layout: Some(&pipeline_layout),
                vertex: wgpu::VertexState {
                    module: vs_module,
                    entry_point: Some(desc.vertex_shader.entry_point()),
                    compilation_options: Default::default(),
                    buffers: &[desc.vertex_layout.clone()],
                },
                fragment: Some(wgpu::FragmentState {
                    module: ps_module,
                    entry_point: Some(desc.pixel_shader.entry_point()),
                    compilation_options: Default::default(),
                    targets: &[Some(wgpu::ColorTargetState {
                        format: desc.color_format,
                        blend: Some(wgpu::BlendState::REPLACE),
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                }),
                primitive: wgpu::PrimitiveState {
                    topology: desc.topology,
                    strip_index_format: None,
                    front_face: desc.front_face,
                    cull_mode: desc.cull_mode,
                    polygon_mode: wgpu::PolygonMode::Fill,
                    unclipped_depth: false,
                    conservative: false,
                },
                depth_stencil: Some(depth_stencil),
                multisample: wgpu::MultisampleState::default(),
                multiview_mask: None,
                cache: None,
            });

        log::debug!("created pipeline `{}`", desc.name);
        Ok(GpuPipeline {
            name: desc.name.to_string(),
            raw: RawPipeline::Wgpu {
                pipeline,
                bind_group_layout,
            },
        })
    }

    fn create_binding_set(
        &self,
        pipeline: &GpuPipeline,
        buffers: &[(u32, &GpuBuffer)],
    ) -> GfxResult<GpuBindingSet> {
        let RawPipeline::Wgpu {
            bind_group_layout, ..
        } = &pipeline.raw
        else {
            return Err(mismatch("pipeline", pipeline.backend_name()));
        };

        let mut entries = Vec::with_capacity(buffers.len());
        for &(binding, buffer) in buffers {
            let RawBuffer::Wgpu(raw) = &buffer.raw else {
                return Err(mismatch("buffer", buffer.backend_name()));
            };
            entries.push(wgpu::BindGroupEntry {
                binding,
                resource: raw.as_entire_binding(),
            });
        }

        let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(pipeline.name()),
            layout: bind_group_layout,
            entries: &entries,
        });

        Ok(GpuBindingSet {
            raw: RawBindingSet::Wgpu(bind_group),
        })
    }
}
