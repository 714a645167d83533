use std::rc::Rc;

use anyhow::ensure;
use bytemuck::{Pod, Zeroable};
use umbra_math::Matrix;

use crate::paint::Color;

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct MeshVertex {
    pub position: [f32; 3],
    pub color: [f32; 4],
}

impl MeshVertex {
    const ATTRS: [wgpu::VertexAttribute; 2] = wgpu::vertex_attr_array![
        0 => Float32x3, // position
        1 => Float32x4  // color
    ];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<MeshVertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRS,
        }
    }
}

/// Indexed triangle geometry on the CPU side.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshData {
    vertices: Vec<MeshVertex>,
    indices: Vec<u16>,
}

impl MeshData {
    /// Builds a mesh from parallel position and color arrays.
    ///
    /// Fails if the arrays differ in length, an index is out of range, or the
    /// index count is not a whole number of triangles.
    pub fn new(
        positions: &[[f32; 3]],
        colors: &[[f32; 4]],
        indices: Vec<u16>,
    ) -> anyhow::Result<Self> {
        ensure!(
            positions.len() == colors.len(),
            "mesh has {} positions but {} colors",
            positions.len(),
            colors.len()
        );
        ensure!(
            positions.len() <= usize::from(u16::MAX) + 1,
            "mesh has {} vertices, u16 indices address at most 65536",
            positions.len()
        );
        ensure!(
            indices.len() % 3 == 0,
            "index count {} is not a multiple of 3",
            indices.len()
        );
        if let Some(bad) = indices.iter().find(|i| usize::from(**i) >= positions.len()) {
            anyhow::bail!("index {bad} out of range for {} vertices", positions.len());
        }

        let vertices = positions
            .iter()
            .zip(colors)
            .map(|(p, c)| MeshVertex {
                position: *p,
                color: *c,
            })
            .collect();
        Ok(Self { vertices, indices })
    }

    /// Unit cube centered on the origin, one color per face.
    pub fn cube() -> Self {
        const FACES: [([[f32; 3]; 4], [f32; 4]); 6] = [
            // +z
            (
                [[-0.5, -0.5, 0.5], [0.5, -0.5, 0.5], [0.5, 0.5, 0.5], [-0.5, 0.5, 0.5]],
                [0.90, 0.30, 0.30, 1.0],
            ),
            // -z
            (
                [[0.5, -0.5, -0.5], [-0.5, -0.5, -0.5], [-0.5, 0.5, -0.5], [0.5, 0.5, -0.5]],
                [0.30, 0.90, 0.30, 1.0],
            ),
            // -x
            (
                [[-0.5, -0.5, -0.5], [-0.5, -0.5, 0.5], [-0.5, 0.5, 0.5], [-0.5, 0.5, -0.5]],
                [0.30, 0.30, 0.90, 1.0],
            ),
            // +x
            (
                [[0.5, -0.5, 0.5], [0.5, -0.5, -0.5], [0.5, 0.5, -0.5], [0.5, 0.5, 0.5]],
                [0.90, 0.90, 0.30, 1.0],
            ),
            // +y
            (
                [[-0.5, 0.5, 0.5], [0.5, 0.5, 0.5], [0.5, 0.5, -0.5], [-0.5, 0.5, -0.5]],
                [0.90, 0.30, 0.90, 1.0],
            ),
            // -y
            (
                [[-0.5, -0.5, -0.5], [0.5, -0.5, -0.5], [0.5, -0.5, 0.5], [-0.5, -0.5, 0.5]],
                [0.30, 0.90, 0.90, 1.0],
            ),
        ];

        let mut vertices = Vec::with_capacity(24);
        let mut indices = Vec::with_capacity(36);
        for (corners, color) in FACES {
            let base = vertices.len() as u16;
            vertices.extend(corners.map(|position| MeshVertex { position, color }));
            indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
        }
        Self { vertices, indices }
    }

    pub fn vertices(&self) -> &[MeshVertex] {
        &self.vertices
    }

    pub fn indices(&self) -> &[u16] {
        &self.indices
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

/// One draw request: a shared mesh, its 4×4 transform and a color tint.
#[derive(Debug, Clone)]
pub struct DrawMesh {
    pub mesh: Rc<MeshData>,
    pub transform: Matrix,
    /// Multiplied with the vertex colors.
    pub tint: Color,
}

impl DrawMesh {
    pub fn new(mesh: Rc<MeshData>, transform: impl Into<Matrix>) -> Self {
        Self {
            mesh,
            transform: transform.into(),
            tint: Color::white(),
        }
    }

    pub fn with_tint(mut self, tint: Color) -> Self {
        self.tint = tint;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cube_shape() {
        let cube = MeshData::cube();
        assert_eq!(cube.vertices().len(), 24);
        assert_eq!(cube.indices().len(), 36);
        assert!(cube.indices().iter().all(|i| usize::from(*i) < 24));
        assert!(
            cube.vertices()
                .iter()
                .all(|v| v.position.iter().all(|c| c.abs() == 0.5))
        );
    }

    #[test]
    fn new_validates_lengths() {
        let p = [[0.0; 3]; 3];
        let c = [[1.0; 4]; 2];
        assert!(MeshData::new(&p, &c, vec![0, 1, 2]).is_err());
    }

    #[test]
    fn new_validates_indices() {
        let p = [[0.0; 3]; 3];
        let c = [[1.0; 4]; 3];
        assert!(MeshData::new(&p, &c, vec![0, 1, 3]).is_err());
        assert!(MeshData::new(&p, &c, vec![0, 1]).is_err());
        let tri = MeshData::new(&p, &c, vec![0, 1, 2]).unwrap();
        assert_eq!(tri.vertices()[2].color, [1.0; 4]);
    }

    #[test]
    fn vertex_layout_stride() {
        assert_eq!(MeshVertex::layout().array_stride, 28);
    }

    #[test]
    fn draw_defaults_to_white_tint() {
        let d = DrawMesh::new(Rc::new(MeshData::cube()), Matrix::identity(4));
        assert_eq!(d.tint, Color::white());
        let d = d.with_tint(Color::black());
        assert_eq!(d.tint, Color::black());
    }
}
