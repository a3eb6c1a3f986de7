use glam::{Mat4, Vec3};

use crate::error::{RenderError, Result};
use crate::gfx::GraphicsContext;
use crate::math::{perspective, TransformStack};
use crate::time::AnimationState;

use super::geometry::GeometryBuffer;
use super::meshes;
use super::shader::{ProgramSymbols, ShaderProgram, ShaderSources};
use super::viewport::Viewport;

pub const FIELD_OF_VIEW_DEGREES: f32 = 45.0;
pub const NEAR_PLANE: f32 = 0.1;
pub const FAR_PLANE: f32 = 100.0;

/// Where the pyramid sits relative to the camera.
pub const PYRAMID_ORIGIN: Vec3 = Vec3::new(-1.5, 0.0, -8.0);
/// Cube placement, composed onto the un-rotated pyramid frame.
pub const CUBE_OFFSET: Vec3 = Vec3::new(3.0, 0.0, 0.0);
/// Cube spin axis; normalized when the rotation is applied.
pub const CUBE_AXIS: Vec3 = Vec3::ONE;

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum FrameOutcome {
    Drawn { draw_calls: u32 },
    /// Zero-sized viewport; nothing was issued.
    Skipped,
}

/// Owns the program, the two meshes and the transform stack.
///
/// Construction is the transition to the ready state: a value of this type
/// always has a linked program, resolved symbols and uploaded geometry.
#[derive(Debug)]
pub struct SceneRenderer {
    program: ShaderProgram,
    symbols: ProgramSymbols,
    pyramid: GeometryBuffer,
    cube: GeometryBuffer,
    stack: TransformStack,
}

impl SceneRenderer {
    pub fn new(gfx: &mut dyn GraphicsContext, sources: &ShaderSources) -> Result<Self> {
        let program = ShaderProgram::compile(gfx, &sources.vertex, &sources.fragment)?;
        let symbols = ProgramSymbols::resolve(gfx, &program)?;

        let pyramid = GeometryBuffer::create(
            gfx,
            "pyramid",
            &meshes::PYRAMID_POSITIONS,
            &meshes::PYRAMID_COLORS,
            None,
        )?;
        let cube = GeometryBuffer::create(
            gfx,
            "cube",
            &meshes::CUBE_POSITIONS,
            &meshes::cube_colors(),
            Some(&meshes::CUBE_INDICES),
        )?;

        log::info!("scene ready");
        Ok(Self {
            program,
            symbols,
            pyramid,
            cube,
            stack: TransformStack::new(),
        })
    }

    /// Records one frame: clear, then the pyramid and the cube.
    ///
    /// Stack errors abort the frame; whatever was already issued should be
    /// discarded by the caller.
    pub fn render_frame(
        &mut self,
        gfx: &mut dyn GraphicsContext,
        viewport: Viewport,
        state: &AnimationState,
    ) -> Result<FrameOutcome> {
        let Some(aspect) = viewport.aspect() else {
            log::trace!("skipping frame for {}x{} viewport", viewport.width, viewport.height);
            return Ok(FrameOutcome::Skipped);
        };

        if self.stack.depth() != 0 {
            log::warn!("discarding {} transform snapshots left by an aborted frame", self.stack.depth());
            self.stack.clear();
        }

        gfx.set_viewport(0, 0, viewport.width, viewport.height);
        gfx.clear();

        let projection = perspective(FIELD_OF_VIEW_DEGREES, aspect, NEAR_PLANE, FAR_PLANE);
        self.program.activate(gfx);

        self.stack.load_identity();
        self.stack.translate(PYRAMID_ORIGIN);

        self.stack.push();
        self.stack.rotate(degrees(state.pyramid_angle), Vec3::Y);
        self.draw(gfx, &self.pyramid, &projection);
        self.stack.pop()?;

        self.stack.translate(CUBE_OFFSET);

        self.stack.push();
        self.stack.rotate(degrees(state.cube_angle), CUBE_AXIS);
        self.draw(gfx, &self.cube, &projection);
        self.stack.pop()?;

        if self.stack.depth() != 0 {
            return Err(RenderError::UnbalancedStack { depth: self.stack.depth() });
        }

        Ok(FrameOutcome::Drawn { draw_calls: 2 })
    }

    /// Bind geometry, upload both matrices, draw.
    fn draw(&self, gfx: &mut dyn GraphicsContext, geometry: &GeometryBuffer, projection: &Mat4) {
        geometry.bind_for_draw(gfx, self.symbols.position, self.symbols.color);
        self.program
            .set_uniform_matrix4(gfx, self.symbols.projection, projection);
        self.program
            .set_uniform_matrix4(gfx, self.symbols.model_view, &self.stack.current());
        geometry.draw(gfx);
    }

    /// Deletes the program and every buffer.
    pub fn release(self, gfx: &mut dyn GraphicsContext) {
        self.pyramid.release(gfx);
        self.cube.release(gfx);
        self.program.release(gfx);
        log::debug!("scene resources released");
    }
}

/// Angles accumulate without bound; reducing before the narrowing cast keeps
/// f32 precision for long runs.
fn degrees(angle: f64) -> f32 {
    angle.rem_euclid(360.0) as f32
}
