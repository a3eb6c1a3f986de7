use anyhow::Context;
use winit::event::WindowEvent;
use winit::window::WindowId;

use spinner_engine::core::{App, AppControl, FrameCtx};
use spinner_engine::device::Gpu;
use spinner_engine::gfx::tracing::TracingContext;
use spinner_engine::gfx::wgpu_backend::WgpuBackend;
use spinner_engine::scene::{FrameStats, SceneRenderer, ShaderSources};
use spinner_engine::time::AnimationClock;

/// Frames between debug statistics lines.
const STATS_INTERVAL: u64 = 600;

/// GPU-side state, created once the device exists.
struct Scene {
    backend: WgpuBackend,
    renderer: SceneRenderer,
}

pub struct Spinner {
    shaders: ShaderSources,
    clock: AnimationClock,
    scene: Option<Scene>,
    stats: FrameStats,
}

impl Spinner {
    pub fn new(shaders: ShaderSources) -> Self {
        Self {
            shaders,
            clock: AnimationClock::new(),
            scene: None,
            stats: FrameStats::default(),
        }
    }
}

impl App for Spinner {
    fn on_init(&mut self, gpu: &mut Gpu<'_>) -> anyhow::Result<()> {
        let mut backend = WgpuBackend::new(gpu);
        let renderer = {
            let mut gfx = TracingContext::new(backend.context(gpu));
            SceneRenderer::new(&mut gfx, &self.shaders).context("failed to set up the scene")?
        };
        self.scene = Some(Scene { backend, renderer });
        Ok(())
    }

    fn on_window_event(&mut self, _window_id: WindowId, event: &WindowEvent) -> AppControl {
        if let WindowEvent::Resized(size) = event {
            log::debug!("window resized to {}x{}", size.width, size.height);
        }
        AppControl::Continue
    }

    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl {
        let Some(scene) = self.scene.as_mut() else {
            return AppControl::Continue;
        };

        let state = self.clock.tick(ctx.time.now_millis);
        let viewport = ctx.viewport();
        let stats = &mut self.stats;

        if ctx.time.frame_index > 0 && ctx.time.frame_index % STATS_INTERVAL == 0 {
            log::debug!(
                "frame {}: dt {:.2} ms, pyramid {:.1}°, cube {:.1}°, {:?}",
                ctx.time.frame_index,
                ctx.time.dt * 1000.0,
                state.pyramid_angle,
                state.cube_angle,
                stats
            );
        }

        ctx.render(|gpu, target| {
            let present = {
                let mut gfx = TracingContext::new(scene.backend.context(gpu));
                let result = scene.renderer.render_frame(&mut gfx, viewport, &state);
                stats.settle(&mut gfx, result)
            };
            if present {
                scene.backend.flush(gpu, target);
            }
        })
    }

    fn on_exit(&mut self, gpu: &mut Gpu<'_>) {
        if let Some(Scene { mut backend, renderer }) = self.scene.take() {
            let mut gfx = TracingContext::new(backend.context(gpu));
            renderer.release(&mut gfx);
        }
    }
}
