//! Vertex format and the built-in quad geometry

use bytemuck::{Pod, Zeroable};

/// Interleaved vertex: position, color and texture coordinate
///
/// Layout is fixed at 32 bytes; the Vulkan input description lives in
/// `backends::vulkan::rendering::vertex_layout`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    /// Position in model space
    pub pos: [f32; 3],
    /// Vertex color
    pub color: [f32; 3],
    /// Texture coordinates
    pub tex_coord: [f32; 2],
}

impl Vertex {
    /// Create a vertex
    pub const fn new(pos: [f32; 3], color: [f32; 3], tex_coord: [f32; 2]) -> Self {
        Self { pos, color, tex_coord }
    }
}

/// Two stacked unit quads, at z = 0 and z = -0.5
pub const QUAD_VERTICES: [Vertex; 8] = [
    Vertex::new([-0.5, -0.5, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0]),
    Vertex::new([0.5, -0.5, 0.0], [0.0, 1.0, 0.0], [1.0, 0.0]),
    Vertex::new([0.5, 0.5, 0.0], [0.0, 0.0, 1.0], [1.0, 1.0]),
    Vertex::new([-0.5, 0.5, 0.0], [1.0, 1.0, 1.0], [0.0, 1.0]),
    Vertex::new([-0.5, -0.5, -0.5], [1.0, 0.0, 0.0], [0.0, 0.0]),
    Vertex::new([0.5, -0.5, -0.5], [0.0, 1.0, 0.0], [1.0, 0.0]),
    Vertex::new([0.5, 0.5, -0.5], [0.0, 0.0, 1.0], [1.0, 1.0]),
    Vertex::new([-0.5, 0.5, -0.5], [1.0, 1.0, 1.0], [0.0, 1.0]),
];

/// Two triangles per quad, counter-clockwise
pub const QUAD_INDICES: [u16; 12] = [0, 1, 2, 2, 3, 0, 4, 5, 6, 6, 7, 4];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vertex_is_tightly_packed() {
        assert_eq!(std::mem::size_of::<Vertex>(), 32);
        let bytes: &[u8] = bytemuck::cast_slice(&QUAD_VERTICES);
        assert_eq!(bytes.len(), 8 * 32);
    }

    #[test]
    fn indices_stay_in_range() {
        assert!(QUAD_INDICES.iter().all(|&i| usize::from(i) < QUAD_VERTICES.len()));
        assert_eq!(&QUAD_INDICES[6..], &[4, 5, 6, 6, 7, 4]);
    }

    #[test]
    fn quads_differ_only_in_depth() {
        let (front, back) = QUAD_VERTICES.split_at(4);
        for (a, b) in front.iter().zip(back) {
            assert_eq!(a.pos[..2], b.pos[..2]);
            assert_eq!(a.tex_coord, b.tex_coord);
            assert_eq!(a.pos[2] - b.pos[2], 0.5);
        }
    }
}
