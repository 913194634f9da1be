//! Flat render buffers.

use serde::{Deserialize, Serialize};

use crate::Triangle;

/// Triangle buffers ready for a renderer.
///
/// Every triangle owns its three vertices; nothing is welded, so the
/// index buffer is `0..3n`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RenderMesh {
    /// Vertex positions `[x0, y0, z0, x1, ...]`.
    pub positions: Vec<f32>,
    /// Per-vertex normals, parallel to `positions`.
    pub normals: Vec<f32>,
    /// Triangle indices `[i0, i1, i2, ...]`.
    pub indices: Vec<u32>,
}

impl RenderMesh {
    /// Create an empty mesh.
    pub fn new() -> Self {
        Self::default()
    }

    /// Flatten a soup, giving each triangle its face normal. Degenerate
    /// triangles get a zero normal.
    pub fn from_triangles(triangles: &[Triangle]) -> Self {
        let mut mesh = Self {
            positions: Vec::with_capacity(triangles.len() * 9),
            normals: Vec::with_capacity(triangles.len() * 9),
            indices: Vec::with_capacity(triangles.len() * 3),
        };
        for t in triangles {
            let n = t.normal();
            for p in [t.v0, t.v1, t.v2] {
                mesh.indices.push(mesh.num_vertices() as u32);
                mesh.positions.extend([p.x as f32, p.y as f32, p.z as f32]);
                mesh.normals.extend([n.x as f32, n.y as f32, n.z as f32]);
            }
        }
        mesh
    }

    /// Number of triangles.
    pub fn num_triangles(&self) -> usize {
        self.indices.len() / 3
    }

    /// Number of vertices.
    pub fn num_vertices(&self) -> usize {
        self.positions.len() / 3
    }

    /// Merge another mesh into this one.
    pub fn merge(&mut self, other: &RenderMesh) {
        let offset = self.num_vertices() as u32;
        self.positions.extend_from_slice(&other.positions);
        self.normals.extend_from_slice(&other.normals);
        self.indices.extend(other.indices.iter().map(|&i| i + offset));
    }
}
