use glam::{Vec2, Vec4};

use crate::mesh::Vertex;
use crate::paint::{Color, Space};

use super::Projections;

/// Projection stage output. Everything but `clip_position` is a copy of the input.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct VertexOutput {
    pub clip_position: Vec4,
    pub color: Color,
    pub kind: u32,
    pub texture: u32,
    pub tex_coords: Vec2,
}

/// Lifts `position` to `(x, y, 0, 1)` and applies the projection selected by
/// the vertex's kind. Unknown kinds take the viewport projection.
pub fn project_vertex(vertex: &Vertex, projections: &Projections) -> VertexOutput {
    let projection = projections.for_space(Space::of_raw(vertex.kind));
    let [x, y] = vertex.position;

    VertexOutput {
        clip_position: *projection * Vec4::new(x, y, 0.0, 1.0),
        color: Color::from_array(vertex.color),
        kind: vertex.kind,
        texture: vertex.texture,
        tex_coords: vertex.tex_coords(),
    }
}

#[cfg(test)]
mod tests {
    use glam::{Mat4, Vec3};

    use super::*;

    fn vertex(kind: u32, x: f32, y: f32) -> Vertex {
        Vertex {
            position: [x, y],
            color: [0.1, 0.2, 0.3, 0.4],
            kind,
            texture: 7,
            tex_coords: [0.25, 0.5],
        }
    }

    fn distinct_projections() -> Projections {
        Projections::new(
            Mat4::from_translation(Vec3::new(100.0, 0.0, 0.0)),
            Mat4::from_scale(Vec3::new(2.0, 2.0, 1.0)),
        )
    }

    #[test]
    fn world_kinds_use_world_projection() {
        let p = distinct_projections();
        for kind in 0..3 {
            let out = project_vertex(&vertex(kind, 1.0, 2.0), &p);
            assert_eq!(out.clip_position, Vec4::new(101.0, 2.0, 0.0, 1.0));
        }
    }

    #[test]
    fn viewport_kinds_use_viewport_projection() {
        let p = distinct_projections();
        for kind in [3, 4, 5, 6, 99, u32::MAX] {
            let out = project_vertex(&vertex(kind, 1.0, 2.0), &p);
            assert_eq!(out.clip_position, Vec4::new(2.0, 4.0, 0.0, 1.0));
        }
    }

    #[test]
    fn paint_attributes_pass_through() {
        let out = project_vertex(&vertex(4, 0.0, 0.0), &distinct_projections());
        assert_eq!(out.color, Color::new(0.1, 0.2, 0.3, 0.4));
        assert_eq!(out.kind, 4);
        assert_eq!(out.texture, 7);
        assert_eq!(out.tex_coords, Vec2::new(0.25, 0.5));
    }

    #[test]
    fn position_is_lifted_with_zero_z_and_unit_w() {
        // A matrix that copies z and w into x and y exposes the lifted components.
        let lift_check = Mat4::from_cols(
            Vec4::ZERO,
            Vec4::ZERO,
            Vec4::new(1.0, 0.0, 0.0, 0.0),
            Vec4::new(0.0, 1.0, 0.0, 0.0),
        );
        let out = project_vertex(&vertex(0, 5.0, 6.0), &Projections::new(lift_check, lift_check));
        assert_eq!(out.clip_position.truncate().truncate(), Vec2::new(0.0, 1.0));
    }
}
