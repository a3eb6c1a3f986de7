use super::{
    AttributeLocation, BufferId, GraphicsContext, ProgramId, ShaderId, ShaderStage,
    UniformLocation,
};

const TARGET: &str = "spinner_engine::gfx";

/// Logs every call at `trace` level before forwarding it to `inner`.
///
/// Enable with `RUST_LOG=spinner_engine::gfx=trace`.
pub struct TracingContext<G> {
    inner: G,
}

impl<G: GraphicsContext> TracingContext<G> {
    pub fn new(inner: G) -> Self {
        Self { inner }
    }

    pub fn into_inner(self) -> G {
        self.inner
    }
}

impl<G: GraphicsContext> GraphicsContext for TracingContext<G> {
    fn compile_shader(&mut self, stage: ShaderStage, source: &str) -> Result<ShaderId, String> {
        let result = self.inner.compile_shader(stage, source);
        log::trace!(target: TARGET, "compile_shader({stage}, {} bytes) -> {:?}", source.len(), result.as_ref().map_err(|_| "error"));
        result
    }

    fn link_program(&mut self, vertex: ShaderId, fragment: ShaderId) -> Result<ProgramId, String> {
        let result = self.inner.link_program(vertex, fragment);
        log::trace!(target: TARGET, "link_program({vertex:?}, {fragment:?}) -> {:?}", result.as_ref().map_err(|_| "error"));
        result
    }

    fn delete_shader(&mut self, shader: ShaderId) {
        log::trace!(target: TARGET, "delete_shader({shader:?})");
        self.inner.delete_shader(shader);
    }

    fn delete_program(&mut self, program: ProgramId) {
        log::trace!(target: TARGET, "delete_program({program:?})");
        self.inner.delete_program(program);
    }

    fn attribute_location(&self, program: ProgramId, name: &str) -> Option<AttributeLocation> {
        let loc = self.inner.attribute_location(program, name);
        log::trace!(target: TARGET, "attribute_location({program:?}, {name:?}) -> {loc:?}");
        loc
    }

    fn uniform_location(&self, program: ProgramId, name: &str) -> Option<UniformLocation> {
        let loc = self.inner.uniform_location(program, name);
        log::trace!(target: TARGET, "uniform_location({program:?}, {name:?}) -> {loc:?}");
        loc
    }

    fn use_program(&mut self, program: ProgramId) {
        log::trace!(target: TARGET, "use_program({program:?})");
        self.inner.use_program(program);
    }

    fn create_vertex_buffer(&mut self, label: &str, data: &[f32]) -> BufferId {
        let id = self.inner.create_vertex_buffer(label, data);
        log::trace!(target: TARGET, "create_vertex_buffer({label:?}, {} floats) -> {id:?}", data.len());
        id
    }

    fn create_index_buffer(&mut self, label: &str, data: &[u16]) -> BufferId {
        let id = self.inner.create_index_buffer(label, data);
        log::trace!(target: TARGET, "create_index_buffer({label:?}, {} indices) -> {id:?}", data.len());
        id
    }

    fn delete_buffer(&mut self, buffer: BufferId) {
        log::trace!(target: TARGET, "delete_buffer({buffer:?})");
        self.inner.delete_buffer(buffer);
    }

    fn set_viewport(&mut self, x: u32, y: u32, width: u32, height: u32) {
        log::trace!(target: TARGET, "set_viewport({x}, {y}, {width}, {height})");
        self.inner.set_viewport(x, y, width, height);
    }

    fn clear(&mut self) {
        log::trace!(target: TARGET, "clear()");
        self.inner.clear();
    }

    fn vertex_attrib_pointer(&mut self, location: AttributeLocation, buffer: BufferId, item_size: u32) {
        log::trace!(target: TARGET, "vertex_attrib_pointer({location:?}, {buffer:?}, {item_size})");
        self.inner.vertex_attrib_pointer(location, buffer, item_size);
    }

    fn bind_index_buffer(&mut self, buffer: BufferId) {
        log::trace!(target: TARGET, "bind_index_buffer({buffer:?})");
        self.inner.bind_index_buffer(buffer);
    }

    fn uniform_matrix4(&mut self, location: UniformLocation, matrix: &[f32; 16]) {
        log::trace!(target: TARGET, "uniform_matrix4({location:?}, {matrix:?})");
        self.inner.uniform_matrix4(location, matrix);
    }

    fn draw_arrays(&mut self, first: u32, count: u32) {
        log::trace!(target: TARGET, "draw_arrays({first}, {count})");
        self.inner.draw_arrays(first, count);
    }

    fn draw_elements(&mut self, count: u32) {
        log::trace!(target: TARGET, "draw_elements({count})");
        self.inner.draw_elements(count);
    }

    fn abort_frame(&mut self) {
        log::trace!(target: TARGET, "abort_frame()");
        self.inner.abort_frame();
    }
}
