use std::fmt;

use crate::gfx::ShaderStage;

/// Errors raised by the transform/render core.
///
/// Startup errors (`ShaderCompile`, `ShaderLink`, `InvalidGeometry`, a missing
/// required `UnknownSymbol`) keep the renderer from reaching its ready state.
/// Stack errors are logic defects detected while a frame is being recorded;
/// the frame is aborted.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderError {
    /// A shader stage failed to compile.
    ShaderCompile { stage: ShaderStage, log: String },
    /// The compiled stages could not be linked into a program.
    ShaderLink { log: String },
    /// Mesh data violates the geometry invariants.
    InvalidGeometry(String),
    /// `pop` was called with no matching `push`.
    EmptyStack,
    /// A frame finished with snapshots still on the transform stack.
    UnbalancedStack { depth: usize },
    /// The program has no active attribute or uniform with this name.
    UnknownSymbol(String),
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderError::ShaderCompile { stage, log } => {
                write!(f, "{stage} shader failed to compile: {log}")
            }
            RenderError::ShaderLink { log } => write!(f, "shader program failed to link: {log}"),
            RenderError::InvalidGeometry(msg) => write!(f, "invalid geometry: {msg}"),
            RenderError::EmptyStack => write!(f, "invalid pop: transform stack is empty"),
            RenderError::UnbalancedStack { depth } => {
                write!(f, "transform stack unbalanced at end of frame (depth {depth})")
            }
            RenderError::UnknownSymbol(name) => {
                write!(f, "shader program has no active symbol `{name}`")
            }
        }
    }
}

impl std::error::Error for RenderError {}

pub type Result<T> = std::result::Result<T, RenderError>;
