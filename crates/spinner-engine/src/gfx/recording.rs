//! In-memory [`GraphicsContext`] that records calls instead of touching a GPU.

use std::collections::HashMap;

use super::{
    AttributeLocation, BufferId, GraphicsContext, ProgramId, ShaderId, ShaderStage,
    UniformLocation,
};

/// One recorded graphics call.
#[derive(Debug, Clone, PartialEq)]
pub enum GfxCall {
    CompileShader { stage: ShaderStage, id: ShaderId },
    LinkProgram { id: ProgramId },
    DeleteShader(ShaderId),
    DeleteProgram(ProgramId),
    UseProgram(ProgramId),
    CreateVertexBuffer { id: BufferId, len: usize },
    CreateIndexBuffer { id: BufferId, len: usize },
    DeleteBuffer(BufferId),
    Viewport { x: u32, y: u32, width: u32, height: u32 },
    Clear,
    VertexAttribPointer { location: AttributeLocation, buffer: BufferId, item_size: u32 },
    BindIndexBuffer(BufferId),
    UniformMatrix4 { location: UniformLocation, matrix: [f32; 16] },
    DrawArrays { first: u32, count: u32 },
    DrawElements { count: u32 },
    AbortFrame,
}

/// Fake context for exercising the render core without a device.
///
/// Every linked program exposes the same symbol table, configured up front.
/// Uniform uploads made while no program is active are recorded and also
/// reported through [`misuse`](Self::misuse).
#[derive(Debug)]
pub struct RecordingContext {
    calls: Vec<GfxCall>,
    attributes: HashMap<String, AttributeLocation>,
    uniforms: HashMap<String, UniformLocation>,
    compile_failure: Option<(ShaderStage, String)>,
    link_failure: Option<String>,
    active_program: Option<ProgramId>,
    misuse: Vec<String>,
    next_id: u32,
}

impl RecordingContext {
    /// Symbols: `aVertexPosition`, `aVertexColor`, `uPMatrix`, `uMVMatrix`.
    pub fn new() -> Self {
        let attributes = [("aVertexPosition", 0), ("aVertexColor", 1)]
            .into_iter()
            .map(|(n, l)| (n.to_string(), AttributeLocation::from_raw(l)))
            .collect();
        let uniforms = [("uPMatrix", 0), ("uMVMatrix", 1)]
            .into_iter()
            .map(|(n, l)| (n.to_string(), UniformLocation::from_raw(l)))
            .collect();

        Self {
            calls: Vec::new(),
            attributes,
            uniforms,
            compile_failure: None,
            link_failure: None,
            active_program: None,
            misuse: Vec::new(),
            next_id: 1,
        }
    }

    /// Removes an attribute or uniform from the symbol table.
    pub fn without_symbol(mut self, name: &str) -> Self {
        self.attributes.remove(name);
        self.uniforms.remove(name);
        self
    }

    /// Makes compilation of `stage` fail with `log`.
    pub fn failing_compile(mut self, stage: ShaderStage, log: impl Into<String>) -> Self {
        self.compile_failure = Some((stage, log.into()));
        self
    }

    /// Makes linking fail with `log`.
    pub fn failing_link(mut self, log: impl Into<String>) -> Self {
        self.link_failure = Some(log.into());
        self
    }

    pub fn calls(&self) -> &[GfxCall] {
        &self.calls
    }

    /// Returns and clears the recorded calls.
    pub fn take_calls(&mut self) -> Vec<GfxCall> {
        std::mem::take(&mut self.calls)
    }

    /// All matrix uploads in call order.
    pub fn uniform_uploads(&self) -> Vec<(UniformLocation, [f32; 16])> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                GfxCall::UniformMatrix4 { location, matrix } => Some((*location, *matrix)),
                _ => None,
            })
            .collect()
    }

    /// Descriptions of calls made in an invalid state.
    pub fn misuse(&self) -> &[String] {
        &self.misuse
    }

    fn next(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

impl Default for RecordingContext {
    fn default() -> Self {
        Self::new()
    }
}

impl GraphicsContext for RecordingContext {
    fn compile_shader(&mut self, stage: ShaderStage, _source: &str) -> Result<ShaderId, String> {
        if let Some((failing, log)) = &self.compile_failure {
            if *failing == stage {
                return Err(log.clone());
            }
        }
        let id = ShaderId::from_raw(self.next());
        self.calls.push(GfxCall::CompileShader { stage, id });
        Ok(id)
    }

    fn link_program(&mut self, _vertex: ShaderId, _fragment: ShaderId) -> Result<ProgramId, String> {
        if let Some(log) = &self.link_failure {
            return Err(log.clone());
        }
        let id = ProgramId::from_raw(self.next());
        self.calls.push(GfxCall::LinkProgram { id });
        Ok(id)
    }

    fn delete_shader(&mut self, shader: ShaderId) {
        self.calls.push(GfxCall::DeleteShader(shader));
    }

    fn delete_program(&mut self, program: ProgramId) {
        if self.active_program == Some(program) {
            self.active_program = None;
        }
        self.calls.push(GfxCall::DeleteProgram(program));
    }

    fn attribute_location(&self, _program: ProgramId, name: &str) -> Option<AttributeLocation> {
        self.attributes.get(name).copied()
    }

    fn uniform_location(&self, _program: ProgramId, name: &str) -> Option<UniformLocation> {
        self.uniforms.get(name).copied()
    }

    fn use_program(&mut self, program: ProgramId) {
        self.active_program = Some(program);
        self.calls.push(GfxCall::UseProgram(program));
    }

    fn create_vertex_buffer(&mut self, _label: &str, data: &[f32]) -> BufferId {
        let id = BufferId::from_raw(self.next());
        self.calls.push(GfxCall::CreateVertexBuffer { id, len: data.len() });
        id
    }

    fn create_index_buffer(&mut self, _label: &str, data: &[u16]) -> BufferId {
        let id = BufferId::from_raw(self.next());
        self.calls.push(GfxCall::CreateIndexBuffer { id, len: data.len() });
        id
    }

    fn delete_buffer(&mut self, buffer: BufferId) {
        self.calls.push(GfxCall::DeleteBuffer(buffer));
    }

    fn set_viewport(&mut self, x: u32, y: u32, width: u32, height: u32) {
        self.calls.push(GfxCall::Viewport { x, y, width, height });
    }

    fn clear(&mut self) {
        self.calls.push(GfxCall::Clear);
    }

    fn vertex_attrib_pointer(&mut self, location: AttributeLocation, buffer: BufferId, item_size: u32) {
        self.calls.push(GfxCall::VertexAttribPointer { location, buffer, item_size });
    }

    fn bind_index_buffer(&mut self, buffer: BufferId) {
        self.calls.push(GfxCall::BindIndexBuffer(buffer));
    }

    fn uniform_matrix4(&mut self, location: UniformLocation, matrix: &[f32; 16]) {
        if self.active_program.is_none() {
            self.misuse
                .push(format!("uniform {} uploaded with no active program", location.raw()));
        }
        self.calls.push(GfxCall::UniformMatrix4 { location, matrix: *matrix });
    }

    fn draw_arrays(&mut self, first: u32, count: u32) {
        if self.active_program.is_none() {
            self.misuse.push("draw_arrays with no active program".to_string());
        }
        self.calls.push(GfxCall::DrawArrays { first, count });
    }

    fn draw_elements(&mut self, count: u32) {
        if self.active_program.is_none() {
            self.misuse.push("draw_elements with no active program".to_string());
        }
        self.calls.push(GfxCall::DrawElements { count });
    }

    fn abort_frame(&mut self) {
        self.calls.push(GfxCall::AbortFrame);
    }
}
