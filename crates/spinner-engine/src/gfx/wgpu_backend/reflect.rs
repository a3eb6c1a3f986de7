//! WGSL front-end checks and interface reflection via naga.
//!
//! wgpu consumes WGSL directly, but a bad module there surfaces as an
//! uncaptured device error. Parsing and validating up front gives a compiler
//! log per stage, and the reflected interface provides the named attribute and
//! uniform slots the render core addresses.

use naga::valid::{Capabilities, ValidationFlags, Validator};
use naga::{AddressSpace, Binding, Handle, Module, ScalarKind, Type, TypeInner};

use crate::gfx::ShaderStage;

/// A user-defined stage input or output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct IoSlot {
    pub name: String,
    pub location: u32,
    /// Number of `f32` components (1..=4).
    pub components: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct UniformMember {
    pub name: String,
    pub offset: u32,
    pub size: u32,
}

/// A `var<uniform>` binding. Non-struct uniforms become a single member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct UniformBlock {
    pub group: u32,
    pub binding: u32,
    pub size: u32,
    pub members: Vec<UniformMember>,
}

#[derive(Debug, Clone)]
pub(crate) struct StageReflection {
    pub entry_point: String,
    pub inputs: Vec<IoSlot>,
    pub outputs: Vec<IoSlot>,
    pub uniforms: Vec<UniformBlock>,
}

/// Interface of a linked program.
#[derive(Debug, Clone)]
pub(crate) struct ProgramLayout {
    pub vertex_entry: String,
    pub fragment_entry: String,
    /// Vertex attributes ordered by location; one vertex buffer slot each.
    pub attributes: Vec<IoSlot>,
    pub uniform_block: Option<UniformBlock>,
}

impl ProgramLayout {
    pub fn uniform_member(&self, index: usize) -> Option<&UniformMember> {
        self.uniform_block.as_ref()?.members.get(index)
    }
}

/// Parses and validates `source` and reflects the entry point for `stage`.
///
/// The module must contain exactly one entry point of that stage.
pub(crate) fn reflect_stage(stage: ShaderStage, source: &str) -> Result<StageReflection, String> {
    let module = naga::front::wgsl::parse_str(source).map_err(|e| e.emit_to_string(source))?;

    Validator::new(ValidationFlags::all(), Capabilities::empty())
        .validate(&module)
        .map_err(|e| e.emit_to_string(source))?;

    let wanted = match stage {
        ShaderStage::Vertex => naga::ShaderStage::Vertex,
        ShaderStage::Fragment => naga::ShaderStage::Fragment,
    };

    let mut entry_points = module.entry_points.iter().filter(|ep| ep.stage == wanted);
    let (Some(ep), None) = (entry_points.next(), entry_points.next()) else {
        return Err(format!("expected exactly one @{stage} entry point"));
    };

    let mut inputs = Vec::new();
    for arg in &ep.function.arguments {
        collect_slots(&module, arg.name.as_deref(), arg.ty, arg.binding.as_ref(), &mut inputs)?;
    }

    let mut outputs = Vec::new();
    if let Some(result) = &ep.function.result {
        collect_slots(&module, None, result.ty, result.binding.as_ref(), &mut outputs)?;
    }

    inputs.sort_by_key(|s| s.location);
    outputs.sort_by_key(|s| s.location);

    Ok(StageReflection {
        entry_point: ep.name.clone(),
        inputs,
        outputs,
        uniforms: collect_uniforms(&module),
    })
}

/// Checks that the stages agree and merges their interfaces.
pub(crate) fn link(vertex: &StageReflection, fragment: &StageReflection) -> Result<ProgramLayout, String> {
    for input in &fragment.inputs {
        let Some(output) = vertex.outputs.iter().find(|o| o.location == input.location) else {
            return Err(format!(
                "fragment input `{}` at location {} is not written by the vertex stage",
                input.name, input.location
            ));
        };
        if output.components != input.components {
            return Err(format!(
                "location {}: vertex stage writes {} components, fragment stage reads {}",
                input.location, output.components, input.components
            ));
        }
    }

    let mut blocks: Vec<UniformBlock> = Vec::new();
    for block in vertex.uniforms.iter().chain(&fragment.uniforms) {
        match blocks.iter().find(|b| b.group == block.group && b.binding == block.binding) {
            Some(existing) if existing != block => {
                return Err(format!(
                    "uniform block @group({}) @binding({}) is declared differently in the two stages",
                    block.group, block.binding
                ));
            }
            Some(_) => {}
            None => blocks.push(block.clone()),
        }
    }

    if blocks.len() > 1 {
        return Err("only a single uniform block is supported".to_string());
    }
    let uniform_block = blocks.pop();
    if let Some(block) = &uniform_block {
        if block.group != 0 {
            return Err(format!("uniform block must use @group(0), found @group({})", block.group));
        }
    }

    Ok(ProgramLayout {
        vertex_entry: vertex.entry_point.clone(),
        fragment_entry: fragment.entry_point.clone(),
        attributes: vertex.inputs.clone(),
        uniform_block,
    })
}

fn collect_slots(
    module: &Module,
    name: Option<&str>,
    ty: Handle<Type>,
    binding: Option<&Binding>,
    out: &mut Vec<IoSlot>,
) -> Result<(), String> {
    let inner = &module.types[ty].inner;
    match binding {
        Some(Binding::Location { location, .. }) => {
            let name = name.unwrap_or_default().to_string();
            let Some(components) = float_components(inner) else {
                return Err(format!("`{name}` at location {location} must be an f32 scalar or vector"));
            };
            out.push(IoSlot { name, location: *location, components });
        }
        Some(Binding::BuiltIn(_)) => {}
        None => {
            if let TypeInner::Struct { members, .. } = inner {
                for m in members {
                    collect_slots(module, m.name.as_deref(), m.ty, m.binding.as_ref(), out)?;
                }
            }
        }
    }
    Ok(())
}

fn collect_uniforms(module: &Module) -> Vec<UniformBlock> {
    let gctx = module.to_ctx();
    let mut blocks = Vec::new();

    for (_, var) in module.global_variables.iter() {
        if var.space != AddressSpace::Uniform {
            continue;
        }
        let Some(rb) = &var.binding else { continue };

        let inner = &module.types[var.ty].inner;
        let size = inner.size(gctx);
        let members = match inner {
            TypeInner::Struct { members, .. } => members
                .iter()
                .map(|m| UniformMember {
                    name: m.name.clone().unwrap_or_default(),
                    offset: m.offset,
                    size: module.types[m.ty].inner.size(gctx),
                })
                .collect(),
            _ => vec![UniformMember {
                name: var.name.clone().unwrap_or_default(),
                offset: 0,
                size,
            }],
        };

        blocks.push(UniformBlock {
            group: rb.group,
            binding: rb.binding,
            size,
            members,
        });
    }

    blocks
}

fn float_components(inner: &TypeInner) -> Option<u32> {
    match inner {
        TypeInner::Scalar(s) if s.kind == ScalarKind::Float && s.width == 4 => Some(1),
        TypeInner::Vector { size, scalar } if scalar.kind == ScalarKind::Float && scalar.width == 4 => {
            Some(*size as u32)
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VS: &str = r#"
struct Matrices {
    uPMatrix: mat4x4<f32>,
    uMVMatrix: mat4x4<f32>,
}
@group(0) @binding(0) var<uniform> matrices: Matrices;

struct VertexInput {
    @location(0) aVertexPosition: vec3<f32>,
    @location(1) aVertexColor: vec4<f32>,
}

struct VertexOutput {
    @builtin(position) position: vec4<f32>,
    @location(0) vColor: vec4<f32>,
}

@vertex
fn vs_main(input: VertexInput) -> VertexOutput {
    var output: VertexOutput;
    output.position = matrices.uPMatrix * matrices.uMVMatrix * vec4<f32>(input.aVertexPosition, 1.0);
    output.vColor = input.aVertexColor;
    return output;
}
"#;

    const FS: &str = r#"
@fragment
fn fs_main(@location(0) vColor: vec4<f32>) -> @location(0) vec4<f32> {
    return vColor;
}
"#;

    // ── reflect_stage ─────────────────────────────────────────────────────

    #[test]
    fn vertex_inputs_are_reflected_by_name() {
        let r = reflect_stage(ShaderStage::Vertex, VS).unwrap();
        assert_eq!(r.entry_point, "vs_main");
        assert_eq!(
            r.inputs,
            vec![
                IoSlot { name: "aVertexPosition".into(), location: 0, components: 3 },
                IoSlot { name: "aVertexColor".into(), location: 1, components: 4 },
            ]
        );
        // Builtins are not part of the user interface.
        assert_eq!(r.outputs.len(), 1);
        assert_eq!(r.outputs[0].location, 0);
    }

    #[test]
    fn uniform_struct_members_have_offsets() {
        let r = reflect_stage(ShaderStage::Vertex, VS).unwrap();
        assert_eq!(r.uniforms.len(), 1);
        let block = &r.uniforms[0];
        assert_eq!((block.group, block.binding, block.size), (0, 0, 128));
        assert_eq!(block.members[0], UniformMember { name: "uPMatrix".into(), offset: 0, size: 64 });
        assert_eq!(block.members[1], UniformMember { name: "uMVMatrix".into(), offset: 64, size: 64 });
    }

    #[test]
    fn syntax_error_yields_compiler_log() {
        let err = reflect_stage(ShaderStage::Vertex, "fn vs_main( {").unwrap_err();
        assert!(!err.is_empty());
    }

    #[test]
    fn missing_entry_point_is_rejected() {
        let err = reflect_stage(ShaderStage::Vertex, FS).unwrap_err();
        assert!(err.contains("vertex"));
    }

    // ── application shaders ───────────────────────────────────────────────

    const APP_VS: &str = include_str!("../../../../spinner/shaders/shader-vs.wgsl");
    const APP_FS: &str = include_str!("../../../../spinner/shaders/shader-fs.wgsl");

    #[test]
    fn application_shaders_expose_scene_symbols() {
        let vs = reflect_stage(ShaderStage::Vertex, APP_VS).unwrap();
        let fs = reflect_stage(ShaderStage::Fragment, APP_FS).unwrap();
        let layout = link(&vs, &fs).unwrap();

        let attributes: Vec<(&str, u32)> = layout
            .attributes
            .iter()
            .map(|a| (a.name.as_str(), a.components))
            .collect();
        assert_eq!(attributes, [("aVertexPosition", 3), ("aVertexColor", 4)]);

        let block = layout.uniform_block.as_ref().unwrap();
        let uniforms: Vec<(&str, u32)> = block.members.iter().map(|m| (m.name.as_str(), m.size)).collect();
        assert_eq!(uniforms, [("uPMatrix", 64), ("uMVMatrix", 64)]);
        assert_eq!(block.group, 0);
    }

    // ── link ──────────────────────────────────────────────────────────────

    #[test]
    fn link_merges_interfaces() {
        let vs = reflect_stage(ShaderStage::Vertex, VS).unwrap();
        let fs = reflect_stage(ShaderStage::Fragment, FS).unwrap();
        let layout = link(&vs, &fs).unwrap();
        assert_eq!(layout.vertex_entry, "vs_main");
        assert_eq!(layout.fragment_entry, "fs_main");
        assert_eq!(layout.attributes.len(), 2);
        assert_eq!(layout.uniform_member(1).unwrap().name, "uMVMatrix");
        assert!(layout.uniform_member(2).is_none());
    }

    #[test]
    fn link_rejects_unwritten_fragment_input() {
        let fs = r#"
@fragment
fn fs_main(@location(3) vNormal: vec3<f32>) -> @location(0) vec4<f32> {
    return vec4<f32>(vNormal, 1.0);
}
"#;
        let vs = reflect_stage(ShaderStage::Vertex, VS).unwrap();
        let fs = reflect_stage(ShaderStage::Fragment, fs).unwrap();
        let err = link(&vs, &fs).unwrap_err();
        assert!(err.contains("vNormal"));
    }

    #[test]
    fn link_rejects_component_mismatch() {
        let fs = r#"
@fragment
fn fs_main(@location(0) vColor: vec3<f32>) -> @location(0) vec4<f32> {
    return vec4<f32>(vColor, 1.0);
}
"#;
        let vs = reflect_stage(ShaderStage::Vertex, VS).unwrap();
        let fs = reflect_stage(ShaderStage::Fragment, fs).unwrap();
        assert!(link(&vs, &fs).is_err());
    }
}
