//! Error types for meshes and shaders.
//!
//! Every variant is a construction-time failure: the object being built is
//! never returned in a partial state.

use thiserror::Error;

use super::ShaderStage;

/// Errors raised while building a [`VertexLayout`](super::VertexLayout) or
/// attaching a [`Piece`](super::Piece) to one.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MeshError {
    #[error(
        "malformed vertex data: {len} floats is not a multiple of the {floats_per_vertex} floats per vertex"
    )]
    MalformedVertexData { len: usize, floats_per_vertex: usize },
    #[error("index {index} out of range for a layout of {vertex_count} vertices")]
    IndexOutOfRange { index: u16, vertex_count: usize },
    #[error("graphics backend error: {0}")]
    Backend(String),
}

/// Errors raised while compiling a [`ShaderUnit`](super::ShaderUnit) or linking
/// a [`ShaderProgram`](super::ShaderProgram).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ShaderError {
    #[error("failed to compile {stage} shader: {log}")]
    Compile { stage: ShaderStage, log: String },
    #[error("failed to link shader program: {log}")]
    Link { log: String },
    #[error("graphics backend error: {0}")]
    Backend(String),
}

impl ShaderError {
    pub(crate) fn compile(stage: ShaderStage, log: String) -> Self {
        ShaderError::Compile {
            stage,
            log: non_empty_log(log, "compilation failed, no diagnostic available"),
        }
    }

    pub(crate) fn link(log: String) -> Self {
        ShaderError::Link {
            log: non_empty_log(log, "linking failed, no diagnostic available"),
        }
    }

    /// The driver's diagnostic text, if this is a compile or link failure.
    pub fn log(&self) -> Option<&str> {
        match self {
            ShaderError::Compile { log, .. } | ShaderError::Link { log } => Some(log),
            ShaderError::Backend(_) => None,
        }
    }
}

fn non_empty_log(log: String, fallback: &str) -> String {
    if log.trim().is_empty() {
        fallback.to_string()
    } else {
        log
    }
}
