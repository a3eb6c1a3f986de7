//! The two-object scene and the per-frame draw protocol.

pub mod geometry;
pub mod meshes;
pub mod renderer;
pub mod shader;
pub mod stats;
pub mod viewport;

pub use geometry::GeometryBuffer;
pub use renderer::{FrameOutcome, SceneRenderer};
pub use shader::{ProgramSymbols, ShaderProgram, ShaderSources, Symbol};
pub use stats::FrameStats;
pub use viewport::Viewport;
