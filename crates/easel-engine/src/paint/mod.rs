//! Paint model: vertex colors and the primitive kind tag.

mod color;
mod kind;

pub use color::Color;
pub use kind::{Kind, PaintSource, Space, VertexKind};
