//! Primitive classification.
//!
//! The vertex stream carries a single `u32` per vertex. Its value encodes two
//! independent choices:
//!
//! | raw | space    | source       |
//! |-----|----------|--------------|
//! | 0   | world    | flat color   |
//! | 1   | world    | mask atlas   |
//! | 2   | world    | color atlas  |
//! | 3   | viewport | flat color   |
//! | 4   | viewport | mask atlas   |
//! | 5   | viewport | color atlas  |
//!
//! `raw / 3` picks the space, `raw % 3` picks the source. Values above 5 are
//! not errors: they project in viewport space and paint nothing.

use super::Color;

/// Number of paint sources per coordinate space.
const SOURCES_PER_SPACE: u32 = 3;

/// Coordinate space a primitive is authored in.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Space {
    /// Scrolls and zooms with the camera.
    World = 0,
    /// Fixed to the screen (UI overlay). 1:1 with logical pixels.
    Viewport = 1,
}

impl Space {
    /// Space used by the vertex stage for any raw tag, including invalid ones.
    #[inline]
    pub const fn of_raw(raw: u32) -> Self {
        if raw < SOURCES_PER_SPACE { Space::World } else { Space::Viewport }
    }
}

/// Where the fragment color comes from.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum PaintSource {
    /// Vertex color verbatim.
    Flat = 0,
    /// Vertex color with alpha modulated by the mask atlas.
    Mask = 1,
    /// Color atlas sample, vertex color ignored.
    ColorAtlas = 2,
}

/// A decoded, valid kind tag.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Kind {
    pub space: Space,
    pub source: PaintSource,
}

impl Kind {
    pub const ALL: [Kind; 6] = [
        Kind::new(Space::World, PaintSource::Flat),
        Kind::new(Space::World, PaintSource::Mask),
        Kind::new(Space::World, PaintSource::ColorAtlas),
        Kind::new(Space::Viewport, PaintSource::Flat),
        Kind::new(Space::Viewport, PaintSource::Mask),
        Kind::new(Space::Viewport, PaintSource::ColorAtlas),
    ];

    #[inline]
    pub const fn new(space: Space, source: PaintSource) -> Self {
        Self { space, source }
    }

    /// Wire encoding written into `Vertex::kind`.
    #[inline]
    pub const fn raw(self) -> u32 {
        self.space as u32 * SOURCES_PER_SPACE + self.source as u32
    }

    /// Decodes a wire tag. Returns `None` for anything outside `0..=5`.
    pub const fn from_raw(raw: u32) -> Option<Self> {
        let space = match raw / SOURCES_PER_SPACE {
            0 => Space::World,
            1 => Space::Viewport,
            _ => return None,
        };
        let source = match raw % SOURCES_PER_SPACE {
            0 => PaintSource::Flat,
            1 => PaintSource::Mask,
            _ => PaintSource::ColorAtlas,
        };
        Some(Self { space, source })
    }
}

impl TryFrom<u32> for Kind {
    type Error = u32;

    fn try_from(raw: u32) -> Result<Self, u32> {
        Kind::from_raw(raw).ok_or(raw)
    }
}

impl From<Kind> for u32 {
    fn from(kind: Kind) -> u32 {
        kind.raw()
    }
}

/// Vertex classification as built by producers, with the tint attached where
/// the strategy uses one.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum VertexKind {
    // world space
    Color(Color),
    MaskTexture(Color),
    ColorTexture,
    // viewport space
    ColorViewport(Color),
    MaskTextureViewport(Color),
    ColorTextureViewport,
}

impl VertexKind {
    /// Color written for color-atlas vertices. Never read by the fragment stage.
    pub const UNUSED_TINT: Color = Color::WHITE;

    pub const fn kind(&self) -> Kind {
        match self {
            VertexKind::Color(_) => Kind::new(Space::World, PaintSource::Flat),
            VertexKind::MaskTexture(_) => Kind::new(Space::World, PaintSource::Mask),
            VertexKind::ColorTexture => Kind::new(Space::World, PaintSource::ColorAtlas),
            VertexKind::ColorViewport(_) => Kind::new(Space::Viewport, PaintSource::Flat),
            VertexKind::MaskTextureViewport(_) => Kind::new(Space::Viewport, PaintSource::Mask),
            VertexKind::ColorTextureViewport => {
                Kind::new(Space::Viewport, PaintSource::ColorAtlas)
            }
        }
    }

    #[inline]
    pub const fn kind_id(&self) -> u32 {
        self.kind().raw()
    }

    #[inline]
    pub const fn space(&self) -> Space {
        self.kind().space
    }

    pub const fn color(&self) -> Color {
        match self {
            VertexKind::Color(c)
            | VertexKind::MaskTexture(c)
            | VertexKind::ColorViewport(c)
            | VertexKind::MaskTextureViewport(c) => *c,
            VertexKind::ColorTexture | VertexKind::ColorTextureViewport => Self::UNUSED_TINT,
        }
    }

    /// Same paint strategy, retargeted to `space`.
    pub const fn in_space(self, space: Space) -> Self {
        match (self, space) {
            (VertexKind::ColorViewport(c), Space::World) => VertexKind::Color(c),
            (VertexKind::MaskTextureViewport(c), Space::World) => VertexKind::MaskTexture(c),
            (VertexKind::ColorTextureViewport, Space::World) => VertexKind::ColorTexture,
            (VertexKind::Color(c), Space::Viewport) => VertexKind::ColorViewport(c),
            (VertexKind::MaskTexture(c), Space::Viewport) => VertexKind::MaskTextureViewport(c),
            (VertexKind::ColorTexture, Space::Viewport) => VertexKind::ColorTextureViewport,
            (kind, _) => kind,
        }
    }
}
