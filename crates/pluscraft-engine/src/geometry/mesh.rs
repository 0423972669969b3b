use bytemuck::{Pod, Zeroable};

/// Vertex layout shared by every scene pipeline (28 bytes):
///
///  offset  0  pos    [f32; 3]  loc 0
///  offset 12  color  [f32; 4]  loc 1
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub pos: [f32; 3],
    pub color: [f32; 4],
}

impl Vertex {
    const ATTRS: [wgpu::VertexAttribute; 2] =
        wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x4];

    pub const fn new(pos: [f32; 3], color: [f32; 4]) -> Self {
        Self { pos, color }
    }

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRS,
        }
    }
}

// ── cube ──────────────────────────────────────────────────────────────────

pub const CUBE_VERTICES: [Vertex; 8] = [
    Vertex::new([-1.0, -1.0, -1.0], [1.0, 0.0, 0.0, 1.0]),
    Vertex::new([-1.0, 1.0, -1.0], [0.0, 1.0, 0.0, 1.0]),
    Vertex::new([1.0, 1.0, -1.0], [0.0, 0.0, 1.0, 1.0]),
    Vertex::new([1.0, -1.0, -1.0], [1.0, 1.0, 1.0, 1.0]),
    Vertex::new([-1.0, -1.0, 1.0], [1.0, 1.0, 0.0, 1.0]),
    Vertex::new([-1.0, 1.0, 1.0], [0.0, 1.0, 1.0, 1.0]),
    Vertex::new([1.0, 1.0, 1.0], [1.0, 0.0, 1.0, 1.0]),
    Vertex::new([1.0, -1.0, 1.0], [0.2, 0.2, 0.2, 1.0]),
];

/// Counter-clockwise seen from outside, right-handed.
pub const CUBE_INDICES: [u32; 36] = [
    0, 1, 2, 0, 2, 3, // -z
    4, 7, 6, 4, 6, 5, // +z
    0, 4, 5, 0, 5, 1, // -x
    3, 2, 6, 3, 6, 7, // +x
    1, 5, 6, 1, 6, 2, // +y
    0, 3, 7, 0, 7, 4, // -y
];

pub const CUBE_INDEX_FORMAT: wgpu::IndexFormat = wgpu::IndexFormat::Uint32;

// ── triangle ──────────────────────────────────────────────────────────────

pub const TRIANGLE_VERTICES: [Vertex; 3] = [
    Vertex::new([-0.5, -0.5, 0.0], [1.0, 0.0, 0.0, 1.0]),
    Vertex::new([0.5, -0.5, 0.0], [0.0, 1.0, 0.0, 1.0]),
    Vertex::new([0.0, 0.5, 0.0], [0.0, 0.0, 1.0, 1.0]),
];
