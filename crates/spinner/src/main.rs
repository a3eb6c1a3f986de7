//! Spinning pyramid and cube.

mod app;

use std::path::Path;

use anyhow::Context;
use spinner_engine::device::GpuInit;
use spinner_engine::logging::{init_logging, LoggingConfig};
use spinner_engine::scene::ShaderSources;
use spinner_engine::window::{Runtime, RuntimeConfig};

use crate::app::Spinner;

/// Directory next to the executable that overrides the built-in shaders.
const SHADER_DIR: &str = "shaders";

const BUILTIN_VERTEX_SHADER: &str = include_str!("../shaders/shader-vs.wgsl");
const BUILTIN_FRAGMENT_SHADER: &str = include_str!("../shaders/shader-fs.wgsl");

fn main() -> anyhow::Result<()> {
    init_logging(LoggingConfig::default());

    let exe_dir = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf));
    let shaders = shader_sources(exe_dir.as_deref()).context("failed to load shaders")?;

    let gpu_init = GpuInit {
        // Vertex colors are written as-is.
        prefer_srgb: false,
        present_mode: wgpu::PresentMode::Fifo,
        ..GpuInit::default()
    };

    Runtime::run(RuntimeConfig::default(), gpu_init, Spinner::new(shaders))
}

/// Reads `shaders/` beside the executable when present, else uses the
/// sources compiled into the binary.
fn shader_sources(exe_dir: Option<&Path>) -> anyhow::Result<ShaderSources> {
    match exe_dir.map(|dir| dir.join(SHADER_DIR)).filter(|dir| dir.is_dir()) {
        Some(dir) => {
            log::info!("using shaders from {}", dir.display());
            ShaderSources::load(dir)
        }
        None => Ok(ShaderSources {
            vertex: BUILTIN_VERTEX_SHADER.to_string(),
            fragment: BUILTIN_FRAGMENT_SHADER.to_string(),
        }),
    }
}
