//! Matrix utilities for the model-view/projection chain.
//!
//! Matrices are `glam::Mat4` (column-major, the layout uploaded to shaders).
//! Transforms post-multiply the current matrix, so the last transform applied
//! is the first one seen by a vertex.

mod projection;
mod transform_stack;

pub use glam::{Mat4, Vec3};
pub use projection::perspective;
pub use transform_stack::TransformStack;
