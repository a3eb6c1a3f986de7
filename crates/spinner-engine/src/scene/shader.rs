use std::path::Path;

use anyhow::Context;
use glam::Mat4;

use crate::error::{RenderError, Result};
use crate::gfx::{AttributeLocation, GraphicsContext, ProgramId, ShaderStage, UniformLocation};

pub const VERTEX_SHADER_FILE: &str = "shader-vs.wgsl";
pub const FRAGMENT_SHADER_FILE: &str = "shader-fs.wgsl";

pub const POSITION_ATTRIBUTE: &str = "aVertexPosition";
pub const COLOR_ATTRIBUTE: &str = "aVertexColor";
pub const PROJECTION_UNIFORM: &str = "uPMatrix";
pub const MODEL_VIEW_UNIFORM: &str = "uMVMatrix";

/// Source text of the vertex and fragment stages.
#[derive(Debug, Clone)]
pub struct ShaderSources {
    pub vertex: String,
    pub fragment: String,
}

impl ShaderSources {
    /// Reads `shader-vs.wgsl` and `shader-fs.wgsl` from `dir`.
    pub fn load(dir: impl AsRef<Path>) -> anyhow::Result<Self> {
        let dir = dir.as_ref();
        let read = |file: &str| {
            let path = dir.join(file);
            std::fs::read_to_string(&path).with_context(|| format!("failed to read shader {}", path.display()))
        };
        let sources = Self {
            vertex: read(VERTEX_SHADER_FILE)?,
            fragment: read(FRAGMENT_SHADER_FILE)?,
        };
        log::debug!("loaded shaders from {}", dir.display());
        Ok(sources)
    }
}

/// A named program symbol.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Symbol {
    Attribute(AttributeLocation),
    Uniform(UniformLocation),
}

/// Linked vertex/fragment program.
#[derive(Debug)]
pub struct ShaderProgram {
    program: ProgramId,
}

impl ShaderProgram {
    /// Compiles both stages and links them.
    pub fn compile(gfx: &mut dyn GraphicsContext, vertex_source: &str, fragment_source: &str) -> Result<Self> {
        let vertex = gfx
            .compile_shader(ShaderStage::Vertex, vertex_source)
            .map_err(|log| RenderError::ShaderCompile { stage: ShaderStage::Vertex, log })?;
        let fragment = match gfx.compile_shader(ShaderStage::Fragment, fragment_source) {
            Ok(id) => id,
            Err(log) => {
                gfx.delete_shader(vertex);
                return Err(RenderError::ShaderCompile { stage: ShaderStage::Fragment, log });
            }
        };
        let program = match gfx.link_program(vertex, fragment) {
            Ok(id) => id,
            Err(log) => {
                gfx.delete_shader(vertex);
                gfx.delete_shader(fragment);
                return Err(RenderError::ShaderLink { log });
            }
        };

        log::info!("shader program linked");
        Ok(Self { program })
    }

    #[inline]
    pub fn id(&self) -> ProgramId {
        self.program
    }

    /// Resolves `name`, trying attributes before uniforms.
    pub fn location_of(&self, gfx: &dyn GraphicsContext, name: &str) -> Result<Symbol> {
        if let Some(loc) = gfx.attribute_location(self.program, name) {
            return Ok(Symbol::Attribute(loc));
        }
        if let Some(loc) = gfx.uniform_location(self.program, name) {
            return Ok(Symbol::Uniform(loc));
        }
        Err(RenderError::UnknownSymbol(name.to_string()))
    }

    pub fn attribute(&self, gfx: &dyn GraphicsContext, name: &str) -> Result<AttributeLocation> {
        match self.location_of(gfx, name)? {
            Symbol::Attribute(loc) => Ok(loc),
            Symbol::Uniform(_) => Err(RenderError::UnknownSymbol(name.to_string())),
        }
    }

    pub fn uniform(&self, gfx: &dyn GraphicsContext, name: &str) -> Result<UniformLocation> {
        match gfx.uniform_location(self.program, name) {
            Some(loc) => Ok(loc),
            None => Err(RenderError::UnknownSymbol(name.to_string())),
        }
    }

    pub fn activate(&self, gfx: &mut dyn GraphicsContext) {
        gfx.use_program(self.program);
    }

    /// Uploads `matrix` column-major. The program must be active.
    pub fn set_uniform_matrix4(&self, gfx: &mut dyn GraphicsContext, location: UniformLocation, matrix: &Mat4) {
        gfx.uniform_matrix4(location, &matrix.to_cols_array());
    }

    pub fn release(self, gfx: &mut dyn GraphicsContext) {
        gfx.delete_program(self.program);
    }
}

/// Locations the renderer addresses every frame.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct ProgramSymbols {
    pub position: AttributeLocation,
    /// Meshes are drawn without per-vertex color when absent.
    pub color: Option<AttributeLocation>,
    pub projection: UniformLocation,
    pub model_view: UniformLocation,
}

impl ProgramSymbols {
    /// Looks up all symbols; only the color attribute is optional.
    pub fn resolve(gfx: &dyn GraphicsContext, program: &ShaderProgram) -> Result<Self> {
        let color = match program.attribute(gfx, COLOR_ATTRIBUTE) {
            Ok(loc) => Some(loc),
            Err(RenderError::UnknownSymbol(_)) => {
                log::warn!("program has no `{COLOR_ATTRIBUTE}` attribute; drawing without vertex colors");
                None
            }
            Err(e) => return Err(e),
        };

        Ok(Self {
            position: program.attribute(gfx, POSITION_ATTRIBUTE)?,
            color,
            projection: program.uniform(gfx, PROJECTION_UNIFORM)?,
            model_view: program.uniform(gfx, MODEL_VIEW_UNIFORM)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::recording::{GfxCall, RecordingContext};

    fn compiled(gfx: &mut RecordingContext) -> ShaderProgram {
        ShaderProgram::compile(gfx, "vs", "fs").unwrap()
    }

    // ── compile ───────────────────────────────────────────────────────────

    #[test]
    fn compile_links_both_stages() {
        let mut gfx = RecordingContext::new();
        let program = compiled(&mut gfx);
        let calls = gfx.calls();
        assert!(matches!(calls[0], GfxCall::CompileShader { stage: ShaderStage::Vertex, .. }));
        assert!(matches!(calls[1], GfxCall::CompileShader { stage: ShaderStage::Fragment, .. }));
        assert_eq!(calls[2], GfxCall::LinkProgram { id: program.id() });
    }

    #[test]
    fn compile_failure_names_stage_and_log() {
        let mut gfx = RecordingContext::new().failing_compile(ShaderStage::Fragment, "0:3: syntax error");
        let err = ShaderProgram::compile(&mut gfx, "vs", "fs").unwrap_err();
        assert_eq!(
            err,
            RenderError::ShaderCompile { stage: ShaderStage::Fragment, log: "0:3: syntax error".into() }
        );
        assert!(err.to_string().contains("fragment"));
    }

    #[test]
    fn link_failure_carries_log() {
        let mut gfx = RecordingContext::new().failing_link("varying mismatch");
        let err = ShaderProgram::compile(&mut gfx, "vs", "fs").unwrap_err();
        assert_eq!(err, RenderError::ShaderLink { log: "varying mismatch".into() });
    }

    #[test]
    fn fragment_failure_releases_vertex_stage() {
        let mut gfx = RecordingContext::new().failing_compile(ShaderStage::Fragment, "bad");
        assert!(ShaderProgram::compile(&mut gfx, "vs", "fs").is_err());
        let calls = gfx.calls();
        let GfxCall::CompileShader { id: vertex, .. } = calls[0] else {
            panic!("expected vertex compile, got {calls:?}");
        };
        assert_eq!(calls[1..], [GfxCall::DeleteShader(vertex)]);
    }

    #[test]
    fn link_failure_releases_both_stages() {
        let mut gfx = RecordingContext::new().failing_link("varying mismatch");
        assert!(ShaderProgram::compile(&mut gfx, "vs", "fs").is_err());
        let calls = gfx.calls();
        let (GfxCall::CompileShader { id: vertex, .. }, GfxCall::CompileShader { id: fragment, .. }) =
            (&calls[0], &calls[1])
        else {
            panic!("expected two compiles, got {calls:?}");
        };
        assert_eq!(calls[2..], [GfxCall::DeleteShader(*vertex), GfxCall::DeleteShader(*fragment)]);
    }

    // ── symbols ───────────────────────────────────────────────────────────

    #[test]
    fn location_of_distinguishes_kinds() {
        let mut gfx = RecordingContext::new();
        let program = compiled(&mut gfx);
        assert_eq!(
            program.location_of(&gfx, POSITION_ATTRIBUTE),
            Ok(Symbol::Attribute(AttributeLocation::from_raw(0)))
        );
        assert_eq!(
            program.location_of(&gfx, MODEL_VIEW_UNIFORM),
            Ok(Symbol::Uniform(UniformLocation::from_raw(1)))
        );
        assert_eq!(
            program.location_of(&gfx, "uNormalMatrix"),
            Err(RenderError::UnknownSymbol("uNormalMatrix".into()))
        );
    }

    #[test]
    fn missing_color_attribute_is_optional() {
        let mut gfx = RecordingContext::new().without_symbol(COLOR_ATTRIBUTE);
        let program = compiled(&mut gfx);
        let symbols = ProgramSymbols::resolve(&gfx, &program).unwrap();
        assert_eq!(symbols.color, None);
    }

    #[test]
    fn missing_required_symbols_are_fatal() {
        for name in [POSITION_ATTRIBUTE, PROJECTION_UNIFORM, MODEL_VIEW_UNIFORM] {
            let mut gfx = RecordingContext::new().without_symbol(name);
            let program = compiled(&mut gfx);
            assert_eq!(
                ProgramSymbols::resolve(&gfx, &program),
                Err(RenderError::UnknownSymbol(name.to_string()))
            );
        }
    }

    #[test]
    fn matrix_upload_is_column_major() {
        let mut gfx = RecordingContext::new();
        let program = compiled(&mut gfx);
        program.activate(&mut gfx);
        let m = Mat4::from_translation(glam::Vec3::new(1.0, 2.0, 3.0));
        program.set_uniform_matrix4(&mut gfx, UniformLocation::from_raw(1), &m);

        let (_, uploaded) = gfx.uniform_uploads()[0];
        assert_eq!(&uploaded[12..15], &[1.0, 2.0, 3.0]);
        assert!(gfx.misuse().is_empty());
    }

    // ── ShaderSources ─────────────────────────────────────────────────────

    #[test]
    fn load_reads_both_files() {
        let dir = std::env::temp_dir().join(format!("spinner-shaders-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join(VERTEX_SHADER_FILE), "vertex").unwrap();
        std::fs::write(dir.join(FRAGMENT_SHADER_FILE), "fragment").unwrap();

        let sources = ShaderSources::load(&dir).unwrap();
        assert_eq!(sources.vertex, "vertex");
        assert_eq!(sources.fragment, "fragment");

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn load_reports_missing_file() {
        let dir = std::env::temp_dir().join("spinner-shaders-missing");
        let err = ShaderSources::load(&dir).unwrap_err();
        assert!(format!("{err:#}").contains(VERTEX_SHADER_FILE));
    }
}
