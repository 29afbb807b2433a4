//! WebGPU rendering module
//!
//! The frame is tessellated on the CPU into one triangle list
//! ([`VertexBatch`]) and drawn with a single flat-color pipeline.

pub mod batch;
pub mod pipeline;
pub mod shapes;
pub mod vertex;

pub use batch::VertexBatch;
pub use pipeline::{RenderInitError, RenderState};
pub use vertex::Vertex;
