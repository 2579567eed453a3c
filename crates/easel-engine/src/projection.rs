//! Camera state producing the two projection uniforms.
//!
//! Logical pixel convention: origin top-left, +X right, +Y down.
//! World space is mapped into viewport pixels by `world_to_viewport`
//! (pan/zoom), then both spaces share the same orthographic step to clip space.

use glam::{Mat4, Vec2, Vec3};

use crate::shade::Projections;

/// Viewport size in logical pixels.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    #[inline]
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    #[inline]
    pub fn is_valid(self) -> bool {
        self.width > 0.0 && self.height > 0.0 && self.width.is_finite() && self.height.is_finite()
    }

    /// Viewport pixels -> clip space. Degenerate sizes are treated as 1px.
    pub fn ortho(self) -> Mat4 {
        let w = if self.width.is_finite() { self.width.max(1.0) } else { 1.0 };
        let h = if self.height.is_finite() { self.height.max(1.0) } else { 1.0 };
        Mat4::orthographic_rh(0.0, w, h, 0.0, -1.0, 1.0)
    }
}

#[derive(Debug, Clone)]
pub struct Projection {
    needs_rebinding: bool,
    world_to_viewport: Mat4,
    viewport: Viewport,
}

impl Projection {
    pub fn new(viewport: Viewport) -> Self {
        Self {
            needs_rebinding: true,
            world_to_viewport: Mat4::IDENTITY,
            viewport,
        }
    }

    /// True when the uniforms derived from this camera are stale.
    #[inline]
    pub fn needs_rebinding(&self) -> bool {
        self.needs_rebinding
    }

    #[inline]
    pub fn mark_bound(&mut self) {
        self.needs_rebinding = false;
    }

    #[inline]
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Resizes the viewport. Pan and zoom are kept.
    pub fn set_viewport(&mut self, viewport: Viewport) {
        if !viewport.is_valid() {
            log::debug!("ignoring invalid viewport {viewport:?}");
            return;
        }
        self.viewport = viewport;
        self.needs_rebinding = true;
    }

    #[inline]
    pub fn world_to_viewport(&self) -> Mat4 {
        self.world_to_viewport
    }

    /// Current uniform scale factor of world space.
    #[inline]
    pub fn zoom(&self) -> f32 {
        self.world_to_viewport.x_axis.x
    }

    /// Moves the camera by `delta` viewport pixels.
    pub fn pan_by(&mut self, delta: Vec2) {
        if !delta.is_finite() {
            log::warn!("ignoring non-finite pan {delta:?}");
            return;
        }
        self.world_to_viewport = Mat4::from_translation(delta.extend(0.0)) * self.world_to_viewport;
        self.needs_rebinding = true;
    }

    /// Scales by `factor` about `focus` (viewport pixels); the world point under
    /// `focus` stays under `focus`.
    pub fn zoom_at(&mut self, focus: Vec2, factor: f32) {
        if !(factor.is_finite() && factor > 0.0) || !focus.is_finite() {
            log::warn!("ignoring zoom by {factor} at {focus:?}");
            return;
        }
        let focus = focus.extend(0.0);
        let zoom = Mat4::from_translation(focus)
            * Mat4::from_scale(Vec3::new(factor, factor, 1.0))
            * Mat4::from_translation(-focus);
        self.world_to_viewport = zoom * self.world_to_viewport;
        self.needs_rebinding = true;
    }

    pub fn reset(&mut self) {
        self.world_to_viewport = Mat4::IDENTITY;
        self.needs_rebinding = true;
    }

    /// World -> clip: pan/zoom followed by the viewport ortho.
    pub fn world_to_clip(&self) -> Mat4 {
        self.viewport.ortho() * self.world_to_viewport
    }

    /// Viewport -> clip, no pan/zoom.
    pub fn viewport_to_clip(&self) -> Mat4 {
        self.viewport.ortho()
    }

    pub fn projections(&self) -> Projections {
        Projections::new(self.world_to_clip(), self.viewport_to_clip())
    }

    pub fn world_to_viewport_point(&self, p: Vec2) -> Vec2 {
        self.world_to_viewport.transform_point3(p.extend(0.0)).truncate()
    }

    /// Maps a viewport pixel back to world space. `None` if the camera is singular.
    pub fn viewport_to_world(&self, p: Vec2) -> Option<Vec2> {
        let det = self.world_to_viewport.determinant();
        if !det.is_finite() || det == 0.0 {
            return None;
        }
        let world = self.world_to_viewport.inverse().transform_point3(p.extend(0.0));
        world.is_finite().then(|| world.truncate())
    }
}
