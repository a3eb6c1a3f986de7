//! Graphics capability used by the render core.
//!
//! The core never touches ambient GPU state. Everything it needs from the
//! device goes through [`GraphicsContext`], which mirrors the small
//! bind-then-operate API surface the renderer relies on:
//! - shader stages and programs are compiled/linked and addressed by handle
//! - vertex attributes and the index buffer are bound explicitly per draw
//! - uniforms are uploaded to the active program before the draw is issued
//!
//! Implementations:
//! - [`wgpu_backend::WgpuContext`] records draws for a wgpu render pass
//! - [`recording::RecordingContext`] records calls for assertions in tests
//! - [`tracing::TracingContext`] wraps either and logs every call

use std::fmt;

pub mod recording;
pub mod tracing;
pub mod wgpu_backend;

/// Pipeline stage a shader source is compiled for.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
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

macro_rules! handle {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
        pub struct $name(u32);

        impl $name {
            #[inline]
            pub const fn from_raw(raw: u32) -> Self {
                Self(raw)
            }

            #[inline]
            pub const fn raw(self) -> u32 {
                self.0
            }
        }
    };
}

handle!(
    /// A compiled shader stage.
    ShaderId
);
handle!(
    /// A linked shader program.
    ProgramId
);
handle!(
    /// A GPU vertex or index buffer.
    BufferId
);
handle!(
    /// Location of a vertex attribute within a linked program.
    AttributeLocation
);
handle!(
    /// Location of a uniform within a linked program.
    UniformLocation
);

/// Device operations required by the render core.
///
/// Calls are issued strictly sequentially from the render loop. Draw calls use
/// whatever attribute bindings, index buffer, program and uniform values were
/// set before them.
pub trait GraphicsContext {
    /// Compiles one shader stage. On failure returns the compiler log.
    fn compile_shader(&mut self, stage: ShaderStage, source: &str) -> Result<ShaderId, String>;

    /// Links a vertex and a fragment stage. On failure returns the link log.
    fn link_program(&mut self, vertex: ShaderId, fragment: ShaderId) -> Result<ProgramId, String>;

    /// Releases a stage that was never linked into a program.
    fn delete_shader(&mut self, shader: ShaderId);

    /// Releases a program and its stages.
    fn delete_program(&mut self, program: ProgramId);

    /// Looks up an active vertex attribute by name.
    fn attribute_location(&self, program: ProgramId, name: &str) -> Option<AttributeLocation>;

    /// Looks up an active uniform by name.
    fn uniform_location(&self, program: ProgramId, name: &str) -> Option<UniformLocation>;

    /// Makes `program` the target of subsequent uniform uploads and draws.
    fn use_program(&mut self, program: ProgramId);

    /// Uploads static `f32` vertex data.
    fn create_vertex_buffer(&mut self, label: &str, data: &[f32]) -> BufferId;

    /// Uploads static `u16` index data.
    fn create_index_buffer(&mut self, label: &str, data: &[u16]) -> BufferId;

    fn delete_buffer(&mut self, buffer: BufferId);

    /// Sets the viewport rectangle in physical pixels.
    fn set_viewport(&mut self, x: u32, y: u32, width: u32, height: u32);

    /// Clears the color and depth attachments.
    fn clear(&mut self);

    /// Sources attribute `location` from `buffer`, `item_size` floats per vertex.
    fn vertex_attrib_pointer(&mut self, location: AttributeLocation, buffer: BufferId, item_size: u32);

    /// Sets the index buffer used by [`draw_elements`](Self::draw_elements).
    fn bind_index_buffer(&mut self, buffer: BufferId);

    /// Uploads a column-major 4×4 matrix to a uniform of the active program.
    fn uniform_matrix4(&mut self, location: UniformLocation, matrix: &[f32; 16]);

    /// Draws a non-indexed triangle list.
    fn draw_arrays(&mut self, first: u32, count: u32);

    /// Draws an indexed triangle list of `count` `u16` indices.
    fn draw_elements(&mut self, count: u32);

    /// Discards the draws issued since the last clear; the frame presents
    /// cleared.
    fn abort_frame(&mut self);
}
