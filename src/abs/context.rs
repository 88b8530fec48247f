//! The graphics context abstraction.
//!
//! Every GPU object in this crate holds an `Arc` to something implementing
//! [`GraphicsContext`]. The trait covers exactly the entry points the meshes
//! and shaders need, which keeps the global binding state they touch visible
//! in one place. It is implemented for [`glow::Context`]; tests use a
//! recording fake instead.
//!
//! All methods mutate or query the state of the *current* GL context, so they
//! must be called from the thread that owns it. Attribute setup and draws
//! happen with a vertex array object bound, as core profiles require.

use std::fmt::Debug;

use glow::HasContext;

use super::{PrimitiveTopology, ShaderStage, UniformData};

/// The subset of OpenGL used by [`VertexLayout`](super::VertexLayout),
/// [`Piece`](super::Piece), [`ShaderUnit`](super::ShaderUnit) and
/// [`ShaderProgram`](super::ShaderProgram).
pub trait GraphicsContext {
    type Buffer: Copy + Debug + PartialEq;
    type Shader: Copy + Debug + PartialEq;
    type Program: Copy + Debug + PartialEq;
    type UniformLocation: Clone + Debug;
    type VertexArray: Copy + Debug + PartialEq;

    /// Allocates a new buffer object.
    fn create_buffer(&self) -> Result<Self::Buffer, String>;
    /// Releases a buffer object.
    fn delete_buffer(&self, buffer: Self::Buffer);
    /// Binds `buffer` as the array buffer and fills it with static vertex data.
    ///
    /// Writes: current array buffer.
    fn upload_vertex_data(&self, buffer: Self::Buffer, data: &[f32]);
    /// Binds `buffer` as the element buffer and fills it with static indices.
    ///
    /// Writes: current element buffer.
    fn upload_index_data(&self, buffer: Self::Buffer, indices: &[u16]);
    fn create_vertex_array(&self) -> Result<Self::VertexArray, String>;
    fn delete_vertex_array(&self, vertex_array: Self::VertexArray);
    /// Writes: current vertex array. Attribute pointers, enable flags and the
    /// element buffer binding all belong to the bound vertex array.
    fn bind_vertex_array(&self, vertex_array: Option<Self::VertexArray>);
    /// Writes: current array buffer.
    fn bind_array_buffer(&self, buffer: Option<Self::Buffer>);
    /// Points attribute `location` at `components` floats inside the bound
    /// array buffer and enables it.
    ///
    /// Reads: current array buffer. Writes: attribute pointer and enable flag
    /// of the current vertex array.
    fn enable_float_attribute(&self, location: u32, components: i32, stride: i32, offset: i32);
    /// Writes: attribute enable flag of the current vertex array.
    fn disable_attribute(&self, location: u32);
    /// Binds `indices` as the element buffer and draws `count` u16 indices.
    ///
    /// Reads: current vertex array, current program.
    /// Writes: element buffer of the current vertex array.
    fn draw_indexed(&self, indices: Self::Buffer, primitive: PrimitiveTopology, count: i32);

    fn create_shader(&self, stage: ShaderStage) -> Result<Self::Shader, String>;
    /// Compiles `source` into `shader` and reports whether it succeeded.
    fn compile_shader(&self, shader: Self::Shader, source: &str) -> bool;
    fn shader_info_log(&self, shader: Self::Shader) -> String;
    fn delete_shader(&self, shader: Self::Shader);

    fn create_program(&self) -> Result<Self::Program, String>;
    fn attach_shader(&self, program: Self::Program, shader: Self::Shader);
    fn detach_shader(&self, program: Self::Program, shader: Self::Shader);
    /// Only takes effect on the next link.
    fn bind_attribute_location(&self, program: Self::Program, location: u32, name: &str);
    /// Links `program` and reports whether it succeeded.
    fn link_program(&self, program: Self::Program) -> bool;
    fn program_info_log(&self, program: Self::Program) -> String;
    fn delete_program(&self, program: Self::Program);
    /// Writes: current program.
    fn use_program(&self, program: Option<Self::Program>);
    fn uniform_location(&self, program: Self::Program, name: &str)
    -> Option<Self::UniformLocation>;
    /// Reads: current program.
    fn set_uniform(&self, location: &Self::UniformLocation, value: UniformData);
}

/// `GL_QUADS`, compatibility profile only.
const QUADS: u32 = 0x0007;

impl PrimitiveTopology {
    /// The OpenGL enum for this topology.
    pub fn gl_mode(self) -> u32 {
        match self {
            PrimitiveTopology::Points => glow::POINTS,
            PrimitiveTopology::Lines => glow::LINES,
            PrimitiveTopology::LineStrip => glow::LINE_STRIP,
            PrimitiveTopology::LineLoop => glow::LINE_LOOP,
            PrimitiveTopology::Triangles => glow::TRIANGLES,
            PrimitiveTopology::TriangleStrip => glow::TRIANGLE_STRIP,
            PrimitiveTopology::TriangleFan => glow::TRIANGLE_FAN,
            PrimitiveTopology::Quads => QUADS,
        }
    }
}

impl ShaderStage {
    /// The OpenGL enum for this stage.
    pub fn gl_type(self) -> u32 {
        match self {
            ShaderStage::Vertex => glow::VERTEX_SHADER,
            ShaderStage::Fragment => glow::FRAGMENT_SHADER,
        }
    }
}

impl GraphicsContext for glow::Context {
    type Buffer = glow::Buffer;
    type Shader = glow::Shader;
    type Program = glow::Program;
    type UniformLocation = glow::UniformLocation;
    type VertexArray = glow::VertexArray;

    fn create_buffer(&self) -> Result<Self::Buffer, String> {
        unsafe { HasContext::create_buffer(self) }
    }

    fn delete_buffer(&self, buffer: Self::Buffer) {
        unsafe { HasContext::delete_buffer(self, buffer) }
    }

    fn upload_vertex_data(&self, buffer: Self::Buffer, data: &[f32]) {
        unsafe {
            self.bind_buffer(glow::ARRAY_BUFFER, Some(buffer));
            self.buffer_data_u8_slice(
                glow::ARRAY_BUFFER,
                bytemuck::cast_slice(data),
                glow::STATIC_DRAW,
            );
        }
    }

    fn upload_index_data(&self, buffer: Self::Buffer, indices: &[u16]) {
        unsafe {
            self.bind_buffer(glow::ELEMENT_ARRAY_BUFFER, Some(buffer));
            self.buffer_data_u8_slice(
                glow::ELEMENT_ARRAY_BUFFER,
                bytemuck::cast_slice(indices),
                glow::STATIC_DRAW,
            );
        }
    }

    fn create_vertex_array(&self) -> Result<Self::VertexArray, String> {
        unsafe { HasContext::create_vertex_array(self) }
    }

    fn delete_vertex_array(&self, vertex_array: Self::VertexArray) {
        unsafe { HasContext::delete_vertex_array(self, vertex_array) }
    }

    fn bind_vertex_array(&self, vertex_array: Option<Self::VertexArray>) {
        unsafe { HasContext::bind_vertex_array(self, vertex_array) }
    }

    fn bind_array_buffer(&self, buffer: Option<Self::Buffer>) {
        unsafe { self.bind_buffer(glow::ARRAY_BUFFER, buffer) }
    }

    fn enable_float_attribute(&self, location: u32, components: i32, stride: i32, offset: i32) {
        unsafe {
            self.vertex_attrib_pointer_f32(location, components, glow::FLOAT, false, stride, offset);
            self.enable_vertex_attrib_array(location);
        }
    }

    fn disable_attribute(&self, location: u32) {
        unsafe { self.disable_vertex_attrib_array(location) }
    }

    fn draw_indexed(&self, indices: Self::Buffer, primitive: PrimitiveTopology, count: i32) {
        unsafe {
            self.bind_buffer(glow::ELEMENT_ARRAY_BUFFER, Some(indices));
            self.draw_elements(primitive.gl_mode(), count, glow::UNSIGNED_SHORT, 0);
        }
    }

    fn create_shader(&self, stage: ShaderStage) -> Result<Self::Shader, String> {
        unsafe { HasContext::create_shader(self, stage.gl_type()) }
    }

    fn compile_shader(&self, shader: Self::Shader, source: &str) -> bool {
        unsafe {
            self.shader_source(shader, source);
            HasContext::compile_shader(self, shader);
            self.get_shader_compile_status(shader)
        }
    }

    fn shader_info_log(&self, shader: Self::Shader) -> String {
        unsafe { self.get_shader_info_log(shader) }
    }

    fn delete_shader(&self, shader: Self::Shader) {
        unsafe { HasContext::delete_shader(self, shader) }
    }

    fn create_program(&self) -> Result<Self::Program, String> {
        unsafe { HasContext::create_program(self) }
    }

    fn attach_shader(&self, program: Self::Program, shader: Self::Shader) {
        unsafe { HasContext::attach_shader(self, program, shader) }
    }

    fn detach_shader(&self, program: Self::Program, shader: Self::Shader) {
        unsafe { HasContext::detach_shader(self, program, shader) }
    }

    fn bind_attribute_location(&self, program: Self::Program, location: u32, name: &str) {
        unsafe { self.bind_attrib_location(program, location, name) }
    }

    fn link_program(&self, program: Self::Program) -> bool {
        unsafe {
            HasContext::link_program(self, program);
            self.get_program_link_status(program)
        }
    }

    fn program_info_log(&self, program: Self::Program) -> String {
        unsafe { self.get_program_info_log(program) }
    }

    fn delete_program(&self, program: Self::Program) {
        unsafe { HasContext::delete_program(self, program) }
    }

    fn use_program(&self, program: Option<Self::Program>) {
        unsafe { HasContext::use_program(self, program) }
    }

    fn uniform_location(
        &self,
        program: Self::Program,
        name: &str,
    ) -> Option<Self::UniformLocation> {
        unsafe { self.get_uniform_location(program, name) }
    }

    fn set_uniform(&self, location: &Self::UniformLocation, value: UniformData) {
        unsafe {
            match value {
                UniformData::Float1(x) => self.uniform_1_f32(Some(location), x),
                UniformData::Float2([x, y]) => self.uniform_2_f32(Some(location), x, y),
                UniformData::Float3([x, y, z]) => self.uniform_3_f32(Some(location), x, y, z),
                UniformData::Float4([x, y, z, w]) => {
                    self.uniform_4_f32(Some(location), x, y, z, w)
                }
            }
        }
    }
}
