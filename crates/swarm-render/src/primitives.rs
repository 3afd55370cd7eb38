//! CPU-side mesh primitives

use bytemuck::{Pod, Zeroable};

/// A vertex with position and normal
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

/// Indexed triangle list
#[derive(Clone, Debug)]
pub struct CubeMesh {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u16>,
}

impl CubeMesh {
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

/// Axis-aligned cube centred at the origin
pub fn create_cube_mesh(edge: f32) -> CubeMesh {
    let h = edge / 2.0;

    // 8 corners
    let corners = [
        [-h, -h, -h], // 0: back-bottom-left
        [h, -h, -h],  // 1: back-bottom-right
        [h, h, -h],   // 2: back-top-right
        [-h, h, -h],  // 3: back-top-left
        [-h, -h, h],  // 4: front-bottom-left
        [h, -h, h],   // 5: front-bottom-right
        [h, h, h],    // 6: front-top-right
        [-h, h, h],   // 7: front-top-left
    ];

    // Corner order per face gives CCW winding seen from outside
    let faces: [([usize; 4], [f32; 3]); 6] = [
        ([0, 3, 2, 1], [0.0, 0.0, -1.0]),
        ([4, 5, 6, 7], [0.0, 0.0, 1.0]),
        ([0, 4, 7, 3], [-1.0, 0.0, 0.0]),
        ([5, 1, 2, 6], [1.0, 0.0, 0.0]),
        ([0, 1, 5, 4], [0.0, -1.0, 0.0]),
        ([3, 7, 6, 2], [0.0, 1.0, 0.0]),
    ];

    let mut vertices = Vec::with_capacity(24);
    let mut indices = Vec::with_capacity(36);
    for (corner_ids, normal) in faces {
        let base = vertices.len() as u16;
        vertices.extend(corner_ids.iter().map(|&c| Vertex {
            position: corners[c],
            normal,
        }));
        indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }

    CubeMesh { vertices, indices }
}
