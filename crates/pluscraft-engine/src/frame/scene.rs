use crate::config::{SceneConfig, SceneVariant};
use crate::error::ResourceError;
use crate::geometry::{
    CUBE_INDEX_FORMAT, CUBE_INDICES, CUBE_VERTICES, ConstantsBuffer, FrameConstants,
    GeometryStore, TRIANGLE_VERTICES,
};
use crate::gfx::{BufferUsage, DrawAttribs, GpuBuffer};
use crate::pipeline::{PipelineBuilder, PipelineState, ShaderResourceBinding};
use crate::session::Session;
use crate::transform::TransformState;

/// Name of the uniform block written every frame.
pub const CONSTANTS_VARIABLE: &str = "constants";

/// Everything one frame needs besides the session: pipeline, binding,
/// geometry and the constants buffer.
#[derive(Debug)]
pub struct RenderScene {
    config: SceneConfig,
    pipeline: PipelineState,
    binding: ShaderResourceBinding,
    vertices: GpuBuffer,
    indices: Option<GpuBuffer>,
    constants: ConstantsBuffer<FrameConstants>,
    draw: DrawAttribs,
}

impl RenderScene {
    /// Builds the pipeline against the session's swapchain formats and
    /// uploads the geometry for `config.variant`.
    pub fn build(session: &Session, config: &SceneConfig) -> Result<Self, ResourceError> {
        let device = session.device();
        let pipeline = PipelineBuilder::for_scene(config).build(device, session.swapchain_desc())?;

        let store = GeometryStore::new(device);
        let (vertices, indices, draw) = match config.variant {
            SceneVariant::Cube => (
                store.upload_slice("cube vertices", &CUBE_VERTICES, BufferUsage::Vertex)?,
                Some(store.upload_slice("cube indices", &CUBE_INDICES, BufferUsage::Index)?),
                DrawAttribs::Indexed {
                    num_indices: CUBE_INDICES.len() as u32,
                },
            ),
            SceneVariant::Triangle => (
                store.upload_slice("triangle vertices", &TRIANGLE_VERTICES, BufferUsage::Vertex)?,
                None,
                DrawAttribs::Vertices {
                    num_vertices: TRIANGLE_VERTICES.len() as u32,
                },
            ),
        };

        let constants = store.create_dynamic_constants::<FrameConstants>("frame constants")?;
        let mut binding = pipeline.create_binding();
        binding.set(CONSTANTS_VARIABLE, constants.buffer())?;

        Ok(Self {
            config: *config,
            pipeline,
            binding,
            vertices,
            indices,
            constants,
            draw,
        })
    }

    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    pub fn pipeline(&self) -> &PipelineState {
        &self.pipeline
    }

    /// Records one frame into the session's context: targets, clears,
    /// geometry, pipeline, constants for `elapsed` seconds, binding, draw.
    ///
    /// Nothing is presented here.
    pub fn render(&mut self, session: &mut Session, elapsed: f32) -> Result<(), ResourceError> {
        let back_buffer = session.current_back_buffer()?;
        let depth_buffer = session.depth_buffer()?;
        let transform = TransformState::at(elapsed, session.projection());

        let (device, context) = session.split_mut();

        context.set_render_targets(&back_buffer, Some(&depth_buffer));
        context.clear_render_target(&back_buffer, self.config.clear_color);
        context.clear_depth_stencil(&depth_buffer, 1.0);

        context.set_vertex_buffer(0, &self.vertices);
        if let Some(indices) = &self.indices {
            context.set_index_buffer(indices, CUBE_INDEX_FORMAT);
        }
        context.set_pipeline_state(self.pipeline.gpu());

        self.constants
            .write_transform(context, transform.world_view_proj())?;
        self.binding.commit(&self.pipeline, device, context)?;

        context.draw(self.draw);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use glam::Mat4;

    use super::*;
    use crate::backend::capture::{CaptureCommand, CaptureFactory, CaptureRecorder};
    use crate::backend::{BackendRegistry, DeviceKind, WindowTarget};
    use crate::config::{VideoMode, WindowMode};
    use crate::session::initialize_graphics_engine;

    fn session(kind: DeviceKind) -> (Session, CaptureRecorder) {
        let factory = CaptureFactory::new(kind);
        let recorder = factory.recorder();
        let mut registry = BackendRegistry::empty();
        registry.register(Box::new(factory));
        let session = initialize_graphics_engine(
            registry,
            kind,
            &VideoMode::new(640, 480, 1, WindowMode::Windowed),
            &WindowTarget::headless(640, 480),
        )
        .unwrap();
        (session, recorder)
    }

    #[test]
    fn cube_records_one_indexed_draw() {
        let (mut session, recorder) = session(DeviceKind::Vulkan);
        let mut scene =
            RenderScene::build(&session, &SceneConfig::for_variant(SceneVariant::Cube)).unwrap();
        scene.render(&mut session, 0.0).unwrap();

        assert_eq!(recorder.draws(), vec![DrawAttribs::Indexed { num_indices: 36 }]);
        assert!(recorder
            .commands()
            .iter()
            .any(|c| matches!(c, CaptureCommand::SetIndexBuffer { format, .. } if *format == wgpu::IndexFormat::Uint32)));
    }

    #[test]
    fn triangle_records_three_vertices_without_indices() {
        let (mut session, recorder) = session(DeviceKind::OpenGl);
        let mut scene =
            RenderScene::build(&session, &SceneConfig::for_variant(SceneVariant::Triangle)).unwrap();
        scene.render(&mut session, 0.0).unwrap();

        assert_eq!(recorder.draws(), vec![DrawAttribs::Vertices { num_vertices: 3 }]);
        assert!(!recorder
            .commands()
            .iter()
            .any(|c| matches!(c, CaptureCommand::SetIndexBuffer { .. })));
        assert!(!scene.pipeline().depth_test());
        assert_eq!(scene.pipeline().cull_mode(), None);
    }

    #[test]
    fn triangle_reads_vertex_buffer_and_rotates() {
        let (mut session, recorder) = session(DeviceKind::OpenGl);
        let mut scene =
            RenderScene::build(&session, &SceneConfig::for_variant(SceneVariant::Triangle)).unwrap();
        scene.render(&mut session, 0.0).unwrap();
        scene.render(&mut session, 1.0).unwrap();

        let commands = recorder.commands();
        assert!(commands
            .iter()
            .any(|c| matches!(c, CaptureCommand::SetVertexBuffer { slot: 0, .. })));
        let constants: Vec<FrameConstants> = commands
            .into_iter()
            .filter_map(|c| match c {
                CaptureCommand::Draw { bindings, .. } => Some(bytemuck::pod_read_unaligned(&bindings[0].1)),
                _ => None,
            })
            .collect();
        assert_eq!(constants.len(), 2);
        assert_ne!(constants[0].world_view_proj, constants[1].world_view_proj);
    }

    #[test]
    fn commands_follow_targets_clear_draw_order() {
        let (mut session, recorder) = session(DeviceKind::Vulkan);
        let mut scene = RenderScene::build(&session, &SceneConfig::default()).unwrap();
        scene.render(&mut session, 0.5).unwrap();

        let commands = recorder.commands();
        let position = |pred: fn(&CaptureCommand) -> bool| {
            commands.iter().position(pred).unwrap()
        };

        let targets = position(|c| matches!(c, CaptureCommand::SetRenderTargets { depth: true, .. }));
        let clear = position(|c| matches!(c, CaptureCommand::ClearRenderTarget { .. }));
        let clear_depth = position(|c| matches!(c, CaptureCommand::ClearDepthStencil { depth } if *depth == 1.0));
        let unmap = position(|c| matches!(c, CaptureCommand::Unmap { .. }));
        let commit = position(|c| matches!(c, CaptureCommand::CommitBindings { .. }));
        let draw = position(|c| matches!(c, CaptureCommand::Draw { .. }));

        assert!(targets < clear);
        assert!(clear < clear_depth);
        assert!(clear_depth < unmap);
        assert!(unmap < commit);
        assert!(commit < draw);
    }

    #[test]
    fn draw_sees_transposed_world_view_proj() {
        let (mut session, recorder) = session(DeviceKind::Vulkan);
        let mut scene = RenderScene::build(&session, &SceneConfig::default()).unwrap();
        scene.render(&mut session, 1.25).unwrap();

        let expected = TransformState::at(1.25, session.projection()).world_view_proj();
        let bindings = recorder
            .commands()
            .into_iter()
            .find_map(|c| match c {
                CaptureCommand::Draw { bindings, .. } => Some(bindings),
                _ => None,
            })
            .unwrap();

        assert_eq!(bindings.len(), 1);
        assert_eq!(bindings[0].0, 0);
        let stored: FrameConstants = bytemuck::pod_read_unaligned(&bindings[0].1);
        assert_eq!(stored.world_view_proj, expected.transpose());
        assert_ne!(stored.world_view_proj, Mat4::ZERO);
    }

    #[test]
    fn clear_uses_configured_color() {
        let (mut session, recorder) = session(DeviceKind::D3D11);
        let mut config = SceneConfig::default();
        config.clear_color = [0.1, 0.2, 0.3, 1.0];
        let mut scene = RenderScene::build(&session, &config).unwrap();
        scene.render(&mut session, 0.0).unwrap();

        assert!(recorder.commands().contains(&CaptureCommand::ClearRenderTarget {
            rgba: [0.1, 0.2, 0.3, 1.0]
        }));
    }
}
