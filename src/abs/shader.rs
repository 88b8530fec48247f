//! Shader compilation, linking and uniforms.
//!
//! A [`ShaderUnit`] is one compiled stage and only lives long enough to be
//! linked. A [`ShaderProgram`] links any number of units, optionally pinning
//! the vertex channels to their configured attribute locations first, and
//! afterwards holds no reference to them. Uniforms are looked up by name on
//! first use and the result is remembered per program, found or not, so
//! repeated writes cost one hash lookup. Anything implementing
//! [`UniformValue`] can be written.

use std::{cell::RefCell, fmt, sync::Arc};

use fxhash::FxHashMap;
use glam::{Vec2, Vec3, Vec4};

use super::{AttributeChannel, GraphicsContext, ShaderError};
use crate::config::AttributeBindings;

/// The pipeline stage a [`ShaderUnit`] is compiled for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShaderStage::Vertex => f.write_str("vertex"),
            ShaderStage::Fragment => f.write_str("fragment"),
        }
    }
}

/// Represents an individual compiled OpenGL shader.
pub struct ShaderUnit<G: GraphicsContext = glow::Context> {
    gl: Arc<G>,
    id: G::Shader,
    stage: ShaderStage,
    source: String,
    log: String,
}

impl<G: GraphicsContext> ShaderUnit<G> {
    /// Compiles a new shader from the given source code.
    ///
    /// On failure the shader object is released and the driver's log is returned.
    pub fn new(gl: &Arc<G>, stage: ShaderStage, source: &str) -> Result<Self, ShaderError> {
        let shader = gl.create_shader(stage).map_err(ShaderError::Backend)?;

        if !gl.compile_shader(shader, source) {
            let log = gl.shader_info_log(shader);
            gl.delete_shader(shader);
            return Err(ShaderError::compile(stage, log));
        }

        let log = gl.shader_info_log(shader);
        log::debug!("compiled {stage} shader ({} bytes)", source.len());

        Ok(Self {
            gl: Arc::clone(gl),
            id: shader,
            stage,
            source: source.to_string(),
            log,
        })
    }

    pub fn stage(&self) -> ShaderStage {
        self.stage
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Diagnostics from a successful compile, usually empty or warnings.
    pub fn log(&self) -> &str {
        &self.log
    }

    /// Always `true`, a unit only exists once it has compiled.
    pub fn is_compiled(&self) -> bool {
        true
    }
}

impl<G: GraphicsContext> Drop for ShaderUnit<G> {
    fn drop(&mut self) {
        self.gl.delete_shader(self.id);
    }
}

/// One to four float components, written with the matching `glUniform*f` call.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum UniformData {
    Float1(f32),
    Float2([f32; 2]),
    Float3([f32; 3]),
    Float4([f32; 4]),
}

/// Represents a value a float uniform can be set to.
pub trait UniformValue {
    fn uniform_data(&self) -> UniformData;
}

impl UniformValue for UniformData {
    fn uniform_data(&self) -> UniformData {
        *self
    }
}

impl UniformValue for f32 {
    fn uniform_data(&self) -> UniformData {
        UniformData::Float1(*self)
    }
}

impl UniformValue for [f32; 1] {
    fn uniform_data(&self) -> UniformData {
        UniformData::Float1(self[0])
    }
}

impl UniformValue for [f32; 2] {
    fn uniform_data(&self) -> UniformData {
        UniformData::Float2(*self)
    }
}

impl UniformValue for [f32; 3] {
    fn uniform_data(&self) -> UniformData {
        UniformData::Float3(*self)
    }
}

impl UniformValue for [f32; 4] {
    fn uniform_data(&self) -> UniformData {
        UniformData::Float4(*self)
    }
}

impl UniformValue for Vec2 {
    fn uniform_data(&self) -> UniformData {
        UniformData::Float2(self.to_array())
    }
}

impl UniformValue for Vec3 {
    fn uniform_data(&self) -> UniformData {
        UniformData::Float3(self.to_array())
    }
}

impl UniformValue for Vec4 {
    fn uniform_data(&self) -> UniformData {
        UniformData::Float4(self.to_array())
    }
}

impl<T: UniformValue> UniformValue for &T {
    fn uniform_data(&self) -> UniformData {
        (*self).uniform_data()
    }
}

/// Result of resolving a uniform name. Both outcomes are cached.
#[derive(Clone, Debug)]
enum UniformSlot<L> {
    Found(L),
    Missing,
}

/// Represents an OpenGL shader program linked from [`ShaderUnit`]s.
pub struct ShaderProgram<G: GraphicsContext = glow::Context> {
    gl: Arc<G>,
    id: G::Program,
    uniforms: RefCell<FxHashMap<String, UniformSlot<G::UniformLocation>>>,
}

impl<G: GraphicsContext> ShaderProgram<G> {
    /// Links a new shader program from the given shaders.
    pub fn new(gl: &Arc<G>, shaders: &[&ShaderUnit<G>]) -> Result<Self, ShaderError> {
        Self::link(gl, shaders, None)
    }

    /// Links a new shader program, first binding each channel's attribute
    /// name to its configured location.
    pub fn with_bindings(
        gl: &Arc<G>,
        shaders: &[&ShaderUnit<G>],
        bindings: &AttributeBindings,
    ) -> Result<Self, ShaderError> {
        Self::link(gl, shaders, Some(bindings))
    }

    fn link(
        gl: &Arc<G>,
        shaders: &[&ShaderUnit<G>],
        bindings: Option<&AttributeBindings>,
    ) -> Result<Self, ShaderError> {
        let program = gl.create_program().map_err(ShaderError::Backend)?;

        for shader in shaders {
            gl.attach_shader(program, shader.id);
        }

        if let Some(bindings) = bindings {
            for channel in AttributeChannel::ALL {
                let binding = bindings.get(channel);
                gl.bind_attribute_location(program, binding.location, &binding.name);
            }
        }

        if !gl.link_program(program) {
            let log = gl.program_info_log(program);
            gl.delete_program(program);
            return Err(ShaderError::link(log));
        }

        for shader in shaders {
            gl.detach_shader(program, shader.id);
        }
        log::debug!("linked shader program from {} shaders", shaders.len());

        Ok(Self {
            gl: Arc::clone(gl),
            id: program,
            uniforms: RefCell::new(FxHashMap::default()),
        })
    }

    /// Binds the shader program for use.
    pub fn use_program(&self) {
        self.gl.use_program(Some(self.id));
    }

    /// Sets a float uniform on this program, which must be in use.
    ///
    /// Names the program does not declare are ignored.
    pub fn set_uniform<T: UniformValue>(&self, name: &str, value: T) {
        if let UniformSlot::Found(location) = self.resolve(name) {
            self.gl.set_uniform(&location, value.uniform_data());
        }
    }

    /// Sets several uniforms at once.
    pub fn set_uniforms<'a>(&self, values: impl IntoIterator<Item = (&'a str, UniformData)>) {
        for (name, value) in values {
            self.set_uniform(name, value);
        }
    }

    /// Whether the linked program has an active uniform called `name`.
    pub fn has_uniform(&self, name: &str) -> bool {
        matches!(self.resolve(name), UniformSlot::Found(_))
    }

    /// Number of names looked up so far, found or not.
    pub fn cached_uniforms(&self) -> usize {
        self.uniforms.borrow().len()
    }

    fn resolve(&self, name: &str) -> UniformSlot<G::UniformLocation> {
        if let Some(slot) = self.uniforms.borrow().get(name) {
            return slot.clone();
        }

        let slot = match self.gl.uniform_location(self.id, name) {
            Some(location) => UniformSlot::Found(location),
            None => {
                log::trace!("uniform {name:?} is not active in the program");
                UniformSlot::Missing
            }
        };
        self.uniforms
            .borrow_mut()
            .insert(name.to_string(), slot.clone());
        slot
    }
}

impl<G: GraphicsContext> Drop for ShaderProgram<G> {
    fn drop(&mut self) {
        self.gl.delete_program(self.id);
    }
}
