use std::sync::atomic::{AtomicU64, Ordering};

use crate::config::SceneConfig;
use crate::error::ResourceError;
use crate::geometry::Vertex;
use crate::gfx::{
    DepthState, GpuPipeline, PipelineStateDesc, RenderDevice, ShaderDesc, ShaderStage,
    ShaderVariable, SwapchainDesc,
};
use crate::shader::{self, SCENE_PS, SCENE_VS};

use super::ShaderResourceBinding;

static NEXT_PIPELINE_ID: AtomicU64 = AtomicU64::new(1);

/// Fluent description of a pipeline, turned into a [`PipelineState`] by
/// [`PipelineBuilder::build`].
///
/// Defaults: the [`Vertex`] layout, triangle list, counter-clockwise front
/// faces, back-face culling and depth testing.
#[derive(Debug, Clone)]
pub struct PipelineBuilder<'a> {
    name: String,
    vertex: Option<ShaderDesc<'a>>,
    pixel: Option<ShaderDesc<'a>>,
    vertex_layout: wgpu::VertexBufferLayout<'a>,
    topology: wgpu::PrimitiveTopology,
    front_face: wgpu::FrontFace,
    cull_mode: Option<wgpu::Face>,
    depth_test: bool,
}

impl<'a> PipelineBuilder<'a> {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            vertex: None,
            pixel: None,
            vertex_layout: Vertex::layout(),
            topology: wgpu::PrimitiveTopology::TriangleList,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: Some(wgpu::Face::Back),
            depth_test: true,
        }
    }

    /// Builder for the built-in scene shaders with `scene`'s raster state.
    pub fn for_scene(scene: &SceneConfig) -> PipelineBuilder<'static> {
        PipelineBuilder::new(format!("{} pipeline", scene.variant))
            .vertex_shader("scene vs", SCENE_VS, "main")
            .pixel_shader("scene ps", SCENE_PS, "main")
            .cull_mode(scene.cull_back_faces.then_some(wgpu::Face::Back))
            .depth_test(scene.depth_test)
    }

    pub fn vertex_shader(mut self, name: &'a str, source: &'a str, entry_point: &'a str) -> Self {
        self.vertex = Some(ShaderDesc {
            name,
            source,
            entry_point,
            stage: ShaderStage::Vertex,
        });
        self
    }

    pub fn pixel_shader(mut self, name: &'a str, source: &'a str, entry_point: &'a str) -> Self {
        self.pixel = Some(ShaderDesc {
            name,
            source,
            entry_point,
            stage: ShaderStage::Pixel,
        });
        self
    }

    pub fn cull_mode(mut self, cull_mode: Option<wgpu::Face>) -> Self {
        self.cull_mode = cull_mode;
        self
    }

    pub fn depth_test(mut self, enabled: bool) -> Self {
        self.depth_test = enabled;
        self
    }

    /// Compiles both stages and creates the pipeline with `swapchain`'s color
    /// and depth formats.
    pub fn build(
        self,
        device: &dyn RenderDevice,
        swapchain: &SwapchainDesc,
    ) -> Result<PipelineState, ResourceError> {
        let vertex_desc = self.vertex.ok_or(ResourceError::MissingShader("vertex"))?;
        let pixel_desc = self.pixel.ok_or(ResourceError::MissingShader("pixel"))?;

        let vs = shader::compile(device, &vertex_desc)?;
        let ps = shader::compile(device, &pixel_desc)?;
        let variables = shader::merge_variables(&self.name, &[&vs.variables, &ps.variables])?;

        let depth = DepthState {
            format: swapchain.depth_format,
            test_enabled: self.depth_test,
        };
        let desc = PipelineStateDesc {
            name: &self.name,
            vertex_shader: &vs.shader,
            pixel_shader: &ps.shader,
            vertex_layout: self.vertex_layout,
            topology: self.topology,
            front_face: self.front_face,
            cull_mode: self.cull_mode,
            color_format: swapchain.color_format,
            depth,
            variables: &variables,
        };
        let pipeline = device.create_pipeline_state(&desc)?;

        let id = NEXT_PIPELINE_ID.fetch_add(1, Ordering::Relaxed);
        log::info!(
            "pipeline `{}` #{id}: {:?}, cull {:?}, depth test {}",
            self.name,
            swapchain.color_format,
            self.cull_mode,
            self.depth_test
        );

        Ok(PipelineState {
            id,
            name: self.name,
            pipeline,
            variables,
            color_format: swapchain.color_format,
            depth,
            cull_mode: self.cull_mode,
        })
    }
}

/// Immutable, built pipeline. Every build gets a fresh identity.
#[derive(Debug)]
pub struct PipelineState {
    id: u64,
    name: String,
    pipeline: GpuPipeline,
    variables: Vec<ShaderVariable>,
    color_format: wgpu::TextureFormat,
    depth: DepthState,
    cull_mode: Option<wgpu::Face>,
}

impl PipelineState {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn gpu(&self) -> &GpuPipeline {
        &self.pipeline
    }

    /// Uniform variables that must be bound before drawing.
    pub fn variables(&self) -> &[ShaderVariable] {
        &self.variables
    }

    pub fn color_format(&self) -> wgpu::TextureFormat {
        self.color_format
    }

    pub fn depth_format(&self) -> wgpu::TextureFormat {
        self.depth.format
    }

    pub fn depth_test(&self) -> bool {
        self.depth.test_enabled
    }

    pub fn cull_mode(&self) -> Option<wgpu::Face> {
        self.cull_mode
    }

    /// Empty binding for this pipeline's variables.
    pub fn create_binding(&self) -> ShaderResourceBinding {
        ShaderResourceBinding::new(self)
    }
}
