//! Interleaved vertex-buffer meshes and shader programs over OpenGL.
//!
//! A [`VertexLayout`] owns one attribute buffer holding any combination of
//! positions, normals and two texture coordinate sets, and draws named
//! [`Piece`]s that index into it. [`ShaderUnit`] and [`ShaderProgram`] wrap
//! compilation and linking, with cached uniform lookups.
//!
//! Everything here runs on the thread that owns the GL context. Objects
//! allocate their GPU resources on construction and release them on drop.
//!
//! ```no_run
//! # fn frame(gl: &std::sync::Arc<glow::Context>) -> Result<(), Box<dyn std::error::Error>> {
//! use glmesh::{ShaderProgram, ShaderStage, ShaderUnit, geometry::make_cuboid};
//!
//! let vert = ShaderUnit::new(gl, ShaderStage::Vertex, "...")?;
//! let frag = ShaderUnit::new(gl, ShaderStage::Fragment, "...")?;
//! let program = ShaderProgram::new(gl, &[&vert, &frag])?;
//! let cuboid = make_cuboid(gl, 0.5, 0.5, 0.2)?;
//!
//! program.use_program();
//! program.set_uniform("ink", glam::Vec4::new(0.6, 0.9, 1.0, 1.0));
//! cuboid.draw(None);
//! # Ok(())
//! # }
//! ```

pub mod abs;
pub mod config;
pub mod geometry;
pub mod logging;

pub use abs::*;
pub use config::{AttributeBinding, AttributeBindings, ConfigError};
