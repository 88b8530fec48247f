//! A fake [`GraphicsContext`] that records every call.
//!
//! Buffer, shader and program ids are handed out from a single counter,
//! vertex arrays from their own. Attribute state is tracked globally rather
//! than per vertex array. Deleting an object that is not alive panics, so a
//! double release fails the test that caused it. Like a core profile, setting
//! attribute pointers or drawing without a bound vertex array panics too.
//! Shader compilation fails when the source contains an `#error` directive,
//! with the rest of that line as the log. Uniforms are discovered from
//! `uniform <type> <name>` declarations in the attached sources at link time.

use std::{
    cell::RefCell,
    collections::{BTreeMap, BTreeSet, HashMap},
};

use super::{GraphicsContext, PrimitiveTopology, ShaderStage, UniformData};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AttribPointer {
    pub components: i32,
    pub stride: i32,
    pub offset: i32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct DrawCall {
    pub index_buffer: u32,
    pub primitive: PrimitiveTopology,
    pub count: i32,
    pub array_buffer: Option<u32>,
    pub vertex_array: Option<u32>,
    pub program: Option<u32>,
    /// Enabled attribute locations with their pointers at the time of the call.
    pub attributes: BTreeMap<u32, AttribPointer>,
}

#[derive(Default)]
struct State {
    next_id: u32,
    buffers: BTreeSet<u32>,
    buffer_sizes: HashMap<u32, usize>,
    deleted_buffers: Vec<u32>,
    array_buffer: Option<u32>,
    array_buffer_binds: usize,
    next_vertex_array: u32,
    vertex_arrays: BTreeSet<u32>,
    deleted_vertex_arrays: Vec<u32>,
    vertex_array: Option<u32>,
    pointers: BTreeMap<u32, AttribPointer>,
    enabled: BTreeSet<u32>,
    disabled_calls: Vec<u32>,
    draws: Vec<DrawCall>,
    shaders: HashMap<u32, (ShaderStage, String)>,
    deleted_shaders: Vec<u32>,
    programs: HashMap<u32, Vec<u32>>,
    deleted_programs: Vec<u32>,
    attribute_locations: Vec<(u32, u32, String)>,
    uniforms: HashMap<u32, Vec<String>>,
    current_program: Option<u32>,
    uniform_lookups: Vec<String>,
    uniform_writes: Vec<(u32, UniformData)>,
    fail_next_link: Option<String>,
}

impl State {
    fn next(&mut self) -> u32 {
        self.next_id += 1;
        self.next_id
    }
}

#[derive(Default)]
pub struct RecordingContext {
    state: RefCell<State>,
}

impl RecordingContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the next link fail with `log`.
    pub fn fail_next_link(&self, log: &str) {
        self.state.borrow_mut().fail_next_link = Some(log.to_string());
    }

    pub fn live_buffers(&self) -> usize {
        self.state.borrow().buffers.len()
    }

    pub fn is_live_buffer(&self, buffer: u32) -> bool {
        self.state.borrow().buffers.contains(&buffer)
    }

    pub fn deleted_buffers(&self) -> Vec<u32> {
        self.state.borrow().deleted_buffers.clone()
    }

    pub fn buffer_size(&self, buffer: u32) -> Option<usize> {
        self.state.borrow().buffer_sizes.get(&buffer).copied()
    }

    pub fn bound_array_buffer(&self) -> Option<u32> {
        self.state.borrow().array_buffer
    }

    pub fn live_vertex_arrays(&self) -> usize {
        self.state.borrow().vertex_arrays.len()
    }

    pub fn deleted_vertex_arrays(&self) -> Vec<u32> {
        self.state.borrow().deleted_vertex_arrays.clone()
    }

    pub fn bound_vertex_array(&self) -> Option<u32> {
        self.state.borrow().vertex_array
    }

    pub fn array_buffer_binds(&self) -> usize {
        self.state.borrow().array_buffer_binds
    }

    pub fn enabled_attributes(&self) -> Vec<u32> {
        self.state.borrow().enabled.iter().copied().collect()
    }

    pub fn disabled_calls(&self) -> Vec<u32> {
        self.state.borrow().disabled_calls.clone()
    }

    pub fn draws(&self) -> Vec<DrawCall> {
        self.state.borrow().draws.clone()
    }

    pub fn live_shaders(&self) -> usize {
        self.state.borrow().shaders.len()
    }

    pub fn deleted_shaders(&self) -> Vec<u32> {
        self.state.borrow().deleted_shaders.clone()
    }

    pub fn live_programs(&self) -> usize {
        self.state.borrow().programs.len()
    }

    pub fn attached_shaders(&self, program: u32) -> Vec<u32> {
        self.state
            .borrow()
            .programs
            .get(&program)
            .cloned()
            .unwrap_or_default()
    }

    pub fn deleted_programs(&self) -> Vec<u32> {
        self.state.borrow().deleted_programs.clone()
    }

    pub fn attribute_locations(&self) -> Vec<(u32, u32, String)> {
        self.state.borrow().attribute_locations.clone()
    }

    pub fn current_program(&self) -> Option<u32> {
        self.state.borrow().current_program
    }

    pub fn uniform_lookups(&self) -> Vec<String> {
        self.state.borrow().uniform_lookups.clone()
    }

    pub fn uniform_writes(&self) -> Vec<(u32, UniformData)> {
        self.state.borrow().uniform_writes.clone()
    }
}

fn declared_uniforms(source: &str) -> impl Iterator<Item = String> {
    source.lines().filter_map(|line| {
        let declaration = line.trim().strip_prefix("uniform ")?;
        let name = declaration.split_whitespace().nth(1)?;
        Some(name.trim_end_matches(';').to_string())
    })
}

impl GraphicsContext for RecordingContext {
    type Buffer = u32;
    type Shader = u32;
    type Program = u32;
    type UniformLocation = u32;
    type VertexArray = u32;

    fn create_buffer(&self) -> Result<u32, String> {
        let mut state = self.state.borrow_mut();
        let id = state.next();
        state.buffers.insert(id);
        Ok(id)
    }

    fn delete_buffer(&self, buffer: u32) {
        let mut state = self.state.borrow_mut();
        assert!(state.buffers.remove(&buffer), "buffer {buffer} released twice");
        state.deleted_buffers.push(buffer);
    }

    fn upload_vertex_data(&self, buffer: u32, data: &[f32]) {
        let mut state = self.state.borrow_mut();
        state.array_buffer = Some(buffer);
        state.buffer_sizes.insert(buffer, size_of_val(data));
    }

    fn upload_index_data(&self, buffer: u32, indices: &[u16]) {
        self.state
            .borrow_mut()
            .buffer_sizes
            .insert(buffer, size_of_val(indices));
    }

    fn create_vertex_array(&self) -> Result<u32, String> {
        let mut state = self.state.borrow_mut();
        state.next_vertex_array += 1;
        let id = state.next_vertex_array;
        state.vertex_arrays.insert(id);
        Ok(id)
    }

    fn delete_vertex_array(&self, vertex_array: u32) {
        let mut state = self.state.borrow_mut();
        assert!(
            state.vertex_arrays.remove(&vertex_array),
            "vertex array {vertex_array} released twice"
        );
        state.deleted_vertex_arrays.push(vertex_array);
        if state.vertex_array == Some(vertex_array) {
            state.vertex_array = None;
        }
    }

    fn bind_vertex_array(&self, vertex_array: Option<u32>) {
        self.state.borrow_mut().vertex_array = vertex_array;
    }

    fn bind_array_buffer(&self, buffer: Option<u32>) {
        let mut state = self.state.borrow_mut();
        if buffer.is_some() {
            state.array_buffer_binds += 1;
        }
        state.array_buffer = buffer;
    }

    fn enable_float_attribute(&self, location: u32, components: i32, stride: i32, offset: i32) {
        let mut state = self.state.borrow_mut();
        assert!(state.vertex_array.is_some(), "attribute {location} set without a vertex array");
        state.pointers.insert(
            location,
            AttribPointer {
                components,
                stride,
                offset,
            },
        );
        state.enabled.insert(location);
    }

    fn disable_attribute(&self, location: u32) {
        let mut state = self.state.borrow_mut();
        state.enabled.remove(&location);
        state.disabled_calls.push(location);
    }

    fn draw_indexed(&self, indices: u32, primitive: PrimitiveTopology, count: i32) {
        let mut state = self.state.borrow_mut();
        assert!(state.buffers.contains(&indices), "drawing released buffer {indices}");
        assert!(state.vertex_array.is_some(), "drawing without a vertex array");
        let attributes = state
            .enabled
            .iter()
            .filter_map(|location| Some((*location, *state.pointers.get(location)?)))
            .collect();
        let call = DrawCall {
            index_buffer: indices,
            primitive,
            count,
            array_buffer: state.array_buffer,
            vertex_array: state.vertex_array,
            program: state.current_program,
            attributes,
        };
        state.draws.push(call);
    }

    fn create_shader(&self, stage: ShaderStage) -> Result<u32, String> {
        let mut state = self.state.borrow_mut();
        let id = state.next();
        state.shaders.insert(id, (stage, String::new()));
        Ok(id)
    }

    fn compile_shader(&self, shader: u32, source: &str) -> bool {
        if let Some(entry) = self.state.borrow_mut().shaders.get_mut(&shader) {
            entry.1 = source.to_string();
        }
        !source.lines().any(|line| line.trim().starts_with("#error"))
    }

    fn shader_info_log(&self, shader: u32) -> String {
        let state = self.state.borrow();
        let Some((_, source)) = state.shaders.get(&shader) else {
            return String::new();
        };
        source
            .lines()
            .find_map(|line| line.trim().strip_prefix("#error"))
            .map(|message| message.trim().to_string())
            .unwrap_or_default()
    }

    fn delete_shader(&self, shader: u32) {
        let mut state = self.state.borrow_mut();
        assert!(state.shaders.remove(&shader).is_some(), "shader {shader} released twice");
        state.deleted_shaders.push(shader);
    }

    fn create_program(&self) -> Result<u32, String> {
        let mut state = self.state.borrow_mut();
        let id = state.next();
        state.programs.insert(id, Vec::new());
        Ok(id)
    }

    fn attach_shader(&self, program: u32, shader: u32) {
        if let Some(attached) = self.state.borrow_mut().programs.get_mut(&program) {
            attached.push(shader);
        }
    }

    fn detach_shader(&self, program: u32, shader: u32) {
        if let Some(attached) = self.state.borrow_mut().programs.get_mut(&program) {
            attached.retain(|&s| s != shader);
        }
    }

    fn bind_attribute_location(&self, program: u32, location: u32, name: &str) {
        self.state
            .borrow_mut()
            .attribute_locations
            .push((program, location, name.to_string()));
    }

    fn link_program(&self, program: u32) -> bool {
        let mut state = self.state.borrow_mut();
        if state.fail_next_link.is_some() {
            return false;
        }
        let uniforms: Vec<String> = state
            .programs
            .get(&program)
            .into_iter()
            .flatten()
            .filter_map(|shader| state.shaders.get(shader))
            .flat_map(|(_, source)| declared_uniforms(source))
            .collect();
        state.uniforms.insert(program, uniforms);
        true
    }

    fn program_info_log(&self, _program: u32) -> String {
        self.state.borrow_mut().fail_next_link.take().unwrap_or_default()
    }

    fn delete_program(&self, program: u32) {
        let mut state = self.state.borrow_mut();
        assert!(state.programs.remove(&program).is_some(), "program {program} released twice");
        state.deleted_programs.push(program);
    }

    fn use_program(&self, program: Option<u32>) {
        self.state.borrow_mut().current_program = program;
    }

    fn uniform_location(&self, program: u32, name: &str) -> Option<u32> {
        let mut state = self.state.borrow_mut();
        state.uniform_lookups.push(name.to_string());
        let position = state.uniforms.get(&program)?.iter().position(|u| u == name)?;
        Some(position as u32)
    }

    fn set_uniform(&self, location: &u32, value: UniformData) {
        self.state.borrow_mut().uniform_writes.push((*location, value));
    }
}
