use std::borrow::Borrow;

use glam::Vec2;

use crate::paint::VertexKind;

use super::Vertex;

/// Reasons a triangle cannot be handed to the draw core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum MeshError {
    #[error("triangle {triangle}: index {index} out of bounds ({vertex_count} vertices)")]
    IndexOutOfBounds {
        triangle: usize,
        index: u32,
        vertex_count: usize,
    },
    #[error("index count {0} is not a multiple of 3")]
    IncompleteTriangle(usize),
    #[error("triangle {triangle}: vertices disagree on kind/texture")]
    MixedPrimitive { triangle: usize },
}

/// Indexed triangle list.
#[derive(Default, Clone, Debug, PartialEq)]
pub struct Mesh {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

impl Mesh {
    pub const fn empty() -> Self {
        Self {
            vertices: Vec::new(),
            indices: Vec::new(),
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Number of complete triangles in the index list.
    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Axis-aligned quad between `min` and `max`, untextured.
    pub fn new_color_quad(min: Vec2, max: Vec2, kind: VertexKind) -> Self {
        let vertices = vec![
            Vertex::with_color(min, kind),
            Vertex::with_color(Vec2::new(max.x, min.y), kind),
            Vertex::with_color(max, kind),
            Vertex::with_color(Vec2::new(min.x, max.y), kind),
        ];
        Self {
            vertices,
            indices: vec![0, 1, 2, 0, 2, 3],
        }
    }

    /// Axis-aligned quad mapping `uv_min..uv_max` of atlas `layer` onto `min..max`.
    pub fn new_texture_quad(
        min: Vec2,
        max: Vec2,
        layer: u32,
        uv_min: Vec2,
        uv_max: Vec2,
        kind: VertexKind,
    ) -> Self {
        let vertices = vec![
            Vertex::textured(min, kind, layer, uv_min),
            Vertex::textured(Vec2::new(max.x, min.y), kind, layer, Vec2::new(uv_max.x, uv_min.y)),
            Vertex::textured(max, kind, layer, uv_max),
            Vertex::textured(Vec2::new(min.x, max.y), kind, layer, Vec2::new(uv_min.x, uv_max.y)),
        ];
        Self {
            vertices,
            indices: vec![0, 1, 2, 0, 2, 3],
        }
    }

    /// Appends `other`, re-basing its indices past the current vertices.
    pub fn append(&mut self, other: &Mesh) {
        let offset = self.vertices.len() as u32;
        self.vertices.extend_from_slice(&other.vertices);
        self.indices.extend(other.indices.iter().map(|i| i + offset));
    }

    pub fn from_slice<T: Borrow<Mesh>>(meshes: &[T]) -> Self {
        let (vertex_len, index_len) = meshes.iter().fold((0, 0), |(v, i), mesh| {
            let mesh = mesh.borrow();
            (v + mesh.vertices.len(), i + mesh.indices.len())
        });
        let mut out = Mesh {
            vertices: Vec::with_capacity(vertex_len),
            indices: Vec::with_capacity(index_len),
        };
        for mesh in meshes {
            out.append(mesh.borrow());
        }
        out
    }

    pub fn translate(&mut self, delta: Vec2) {
        for v in &mut self.vertices {
            v.position = (v.position() + delta).to_array();
        }
    }

    /// Checks a single triangle. `triangle` indexes into `indices.chunks(3)`.
    pub fn check_triangle(&self, triangle: usize) -> Result<[&Vertex; 3], MeshError> {
        let range = triangle
            .checked_mul(3)
            .and_then(|base| Some(base..base.checked_add(3)?));
        let Some(tri) = range.and_then(|r| self.indices.get(r)) else {
            return Err(MeshError::IncompleteTriangle(self.indices.len()));
        };

        let vertices = &self.vertices;
        let fetch = move |index: u32| {
            vertices.get(index as usize).ok_or(MeshError::IndexOutOfBounds {
                triangle,
                index,
                vertex_count: vertices.len(),
            })
        };
        let (a, b, c) = (fetch(tri[0])?, fetch(tri[1])?, fetch(tri[2])?);

        let uniform = |v: &Vertex| v.kind == a.kind && v.texture == a.texture;
        if !uniform(b) || !uniform(c) {
            return Err(MeshError::MixedPrimitive { triangle });
        }
        Ok([a, b, c])
    }

    /// Validates every triangle. Returns the first problem found.
    pub fn validate(&self) -> Result<(), MeshError> {
        if self.indices.len() % 3 != 0 {
            return Err(MeshError::IncompleteTriangle(self.indices.len()));
        }
        (0..self.triangle_count()).try_for_each(|t| self.check_triangle(t).map(|_| ()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::paint::Color;

    const RED: Color = Color::new(1.0, 0.0, 0.0, 1.0);

    fn quad(x: f32) -> Mesh {
        Mesh::new_color_quad(Vec2::new(x, 0.0), Vec2::new(x + 1.0, 1.0), VertexKind::Color(RED))
    }

    #[test]
    fn huge_triangle_index_is_incomplete_not_overflow() {
        let q = quad(0.0);
        for t in [usize::MAX, usize::MAX / 3, usize::MAX / 3 + 1, 2] {
            assert_eq!(q.check_triangle(t), Err(MeshError::IncompleteTriangle(6)), "triangle {t}");
        }
    }

    #[test]
    fn color_quad_is_two_triangles() {
        let q = quad(0.0);
        assert_eq!(q.vertices.len(), 4);
        assert_eq!(q.triangle_count(), 2);
        assert!(q.validate().is_ok());
    }

    #[test]
    fn append_rebases_indices() {
        let mut m = quad(0.0);
        m.append(&quad(5.0));
        assert_eq!(m.vertices.len(), 8);
        assert_eq!(&m.indices[6..], &[4, 5, 6, 4, 6, 7]);
        assert!(m.validate().is_ok());
    }

    #[test]
    fn from_slice_matches_repeated_append() {
        let parts = [quad(0.0), quad(2.0), quad(4.0)];
        let mut expected = Mesh::empty();
        for p in &parts {
            expected.append(p);
        }
        assert_eq!(Mesh::from_slice(&parts), expected);
    }

    #[test]
    fn translate_moves_positions_only() {
        let mut m = quad(0.0);
        m.translate(Vec2::new(2.0, 3.0));
        assert_eq!(m.vertices[0].position, [2.0, 3.0]);
        assert_eq!(m.vertices[2].position, [3.0, 4.0]);
        assert_eq!(m.vertices[0].kind, 0);
    }

    #[test]
    fn texture_quad_spans_uv_rect() {
        let m = Mesh::new_texture_quad(
            Vec2::ZERO,
            Vec2::splat(8.0),
            2,
            Vec2::new(0.5, 0.0),
            Vec2::new(1.0, 0.5),
            VertexKind::MaskTextureViewport(RED),
        );
        assert_eq!(m.vertices[0].tex_coords, [0.5, 0.0]);
        assert_eq!(m.vertices[2].tex_coords, [1.0, 0.5]);
        assert!(m.vertices.iter().all(|v| v.texture == 2 && v.kind == 4));
    }

    #[test]
    fn validate_rejects_dangling_index() {
        let mut m = quad(0.0);
        m.indices[4] = 9;
        assert_eq!(
            m.validate(),
            Err(MeshError::IndexOutOfBounds { triangle: 1, index: 9, vertex_count: 4 })
        );
    }

    #[test]
    fn validate_rejects_partial_triangle() {
        let mut m = quad(0.0);
        m.indices.push(0);
        assert_eq!(m.validate(), Err(MeshError::IncompleteTriangle(7)));
    }

    #[test]
    fn validate_rejects_mixed_selectors() {
        let mut m = quad(0.0);
        m.vertices[2].kind = 3;
        // vertex 2 is shared by both triangles
        assert_eq!(m.validate(), Err(MeshError::MixedPrimitive { triangle: 0 }));

        let mut m = quad(0.0);
        m.vertices[3].texture = 1;
        assert_eq!(m.validate(), Err(MeshError::MixedPrimitive { triangle: 1 }));
    }
}
