//! Reference rasterizer.
//!
//! Runs a `Mesh` through `project_vertex`, triangle setup, and `resolve_paint`
//! on the CPU. Intended for tests and headless previews, not for speed.
//!
//! Rules that mirror the GPU:
//! - coverage is sampled at pixel centres with a top-left fill rule; both
//!   windings are drawn
//! - `color` and `tex_coords` interpolate with screen-space barycentrics
//! - `kind` and `texture` are flat: taken from the triangle's first vertex
//! - pixel (0, 0) is the top-left; clip-space +Y points up

mod framebuffer;

use glam::{Vec2, Vec4};

use crate::mesh::Mesh;
use crate::paint::Color;
use crate::render::BlendMode;
use crate::shade::{project_vertex, resolve_paint, AtlasSampler, FragmentInput, Projections, VertexOutput};

pub use framebuffer::FrameBuffer;

/// Counters from one `rasterize` call.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct RasterStats {
    pub triangles_drawn: usize,
    pub triangles_skipped: usize,
    pub fragments: usize,
}

/// Draws every valid triangle of `mesh` into `target` in index order.
pub fn rasterize<A: AtlasSampler + ?Sized>(
    mesh: &Mesh,
    projections: &Projections,
    atlases: &A,
    blend: BlendMode,
    target: &mut FrameBuffer,
) -> RasterStats {
    let mut stats = RasterStats::default();

    for t in 0..mesh.triangle_count() {
        let [a, b, c] = match mesh.check_triangle(t) {
            Ok(tri) => tri,
            Err(err) => {
                log::warn!("skipping triangle: {err}");
                stats.triangles_skipped += 1;
                continue;
            }
        };
        let tri = [
            project_vertex(a, projections),
            project_vertex(b, projections),
            project_vertex(c, projections),
        ];
        stats.fragments += draw_triangle(&tri, atlases, blend, target);
        stats.triangles_drawn += 1;
    }

    if mesh.indices.len() % 3 != 0 {
        log::warn!("ignoring {} trailing index(es)", mesh.indices.len() % 3);
    }
    stats
}

fn draw_triangle<A: AtlasSampler + ?Sized>(
    tri: &[VertexOutput; 3],
    atlases: &A,
    blend: BlendMode,
    target: &mut FrameBuffer,
) -> usize {
    let size = Vec2::new(target.width() as f32, target.height() as f32);
    let Some(mut screen) = to_screen(tri, size) else {
        return 0;
    };

    // Normalise winding; the provoking vertex stays in slot 0.
    let mut tri = [&tri[0], &tri[1], &tri[2]];
    let mut area = edge(screen[0], screen[1], screen[2]);
    if area < 0.0 {
        screen.swap(1, 2);
        tri.swap(1, 2);
        area = -area;
    }
    if area == 0.0 || !area.is_finite() {
        return 0;
    }

    let min = screen[0].min(screen[1]).min(screen[2]).max(Vec2::ZERO);
    let max = screen[0].max(screen[1]).max(screen[2]).min(size);
    if min.x >= max.x || min.y >= max.y {
        return 0;
    }

    let owns = [
        is_top_left(screen[2] - screen[1]),
        is_top_left(screen[0] - screen[2]),
        is_top_left(screen[1] - screen[0]),
    ];
    let provoking = tri[0];
    let mut fragments = 0;

    for y in min.y.floor() as u32..max.y.ceil() as u32 {
        for x in min.x.floor() as u32..max.x.ceil() as u32 {
            let p = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
            let w = [
                edge(screen[1], screen[2], p),
                edge(screen[2], screen[0], p),
                edge(screen[0], screen[1], p),
            ];
            let covered = w
                .iter()
                .zip(owns)
                .all(|(&w, owns)| w > 0.0 || (w == 0.0 && owns));
            if !covered {
                continue;
            }
            let w = w.map(|w| w / area);

            let input = FragmentInput {
                color: interpolate_color([tri[0].color, tri[1].color, tri[2].color], w),
                kind: provoking.kind,
                texture: provoking.texture,
                tex_coords: tri[0].tex_coords * w[0] + tri[1].tex_coords * w[1] + tri[2].tex_coords * w[2],
            };
            let src = resolve_paint(&input, atlases);
            if let Some(dst) = target.get_mut(x, y) {
                *dst = blend.apply(src, *dst);
                fragments += 1;
            }
        }
    }
    fragments
}

/// Perspective divide and viewport transform. `None` if any vertex has w <= 0.
fn to_screen(tri: &[VertexOutput; 3], size: Vec2) -> Option<[Vec2; 3]> {
    let map = |clip: Vec4| {
        if clip.w <= 0.0 || !clip.is_finite() {
            return None;
        }
        let ndc = clip.truncate().truncate() / clip.w;
        Some(Vec2::new((ndc.x + 1.0) * 0.5 * size.x, (1.0 - ndc.y) * 0.5 * size.y))
    };
    Some([
        map(tri[0].clip_position)?,
        map(tri[1].clip_position)?,
        map(tri[2].clip_position)?,
    ])
}

/// Twice the signed area of (a, b, p).
#[inline]
fn edge(a: Vec2, b: Vec2, p: Vec2) -> f32 {
    (b.x - a.x) * (p.y - a.y) - (b.y - a.y) * (p.x - a.x)
}

/// Top-left fill rule for an edge of a positively wound triangle (y down).
/// Samples exactly on a shared edge belong to one triangle only.
#[inline]
fn is_top_left(d: Vec2) -> bool {
    (d.y == 0.0 && d.x > 0.0) || d.y < 0.0
}

fn interpolate_color(colors: [Color; 3], w: [f32; 3]) -> Color {
    // Weights need not sum to exactly 1.0; keep uniform colors exact.
    if colors[0] == colors[1] && colors[1] == colors[2] {
        return colors[0];
    }
    let v = Vec4::from_array(colors[0].to_array()) * w[0]
        + Vec4::from_array(colors[1].to_array()) * w[1]
        + Vec4::from_array(colors[2].to_array()) * w[2];
    Color::from_array(v.to_array())
}
