//! This module contains the GPU resource wrappers: the graphics context
//! abstraction, shader compilation and linking, and interleaved meshes.

pub mod channel;
pub mod context;
pub mod error;
pub mod mesh;
pub mod shader;

#[cfg(test)]
pub(crate) mod recording;

pub use channel::*;
pub use context::*;
pub use error::*;
pub use mesh::*;
pub use shader::*;
