//! Vertex stream types shared by the GPU pipeline and the CPU reference.
//!
//! Producers (tessellators, text layout, atlas packers) emit `Mesh` values;
//! the draw core only consumes them.

mod mesh;
mod vertex;

pub use mesh::{Mesh, MeshError};
pub use vertex::Vertex;
