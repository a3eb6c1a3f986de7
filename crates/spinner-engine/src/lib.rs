//! Spinner engine crate.
//!
//! The render core (`scene`, `math`, `time`) draws through the
//! [`gfx::GraphicsContext`] capability. The platform pieces (`window`,
//! `device`, `core`) host it on winit + wgpu.

pub mod error;
pub mod gfx;
pub mod math;
pub mod scene;
pub mod time;

pub mod core;
pub mod device;
pub mod logging;
pub mod window;

pub use error::{RenderError, Result};
