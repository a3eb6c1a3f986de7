//! wgpu implementation of [`GraphicsContext`].
//!
//! wgpu has no ambient bind state, so the back-end keeps it: attribute
//! bindings, the index buffer and the active program's uniform values are
//! captured into a draw record each time a draw is issued. At the end of the
//! frame [`WgpuBackend::flush`] replays the records into a single render pass.
//!
//! Uniform values of every draw are packed into one dynamic-offset uniform
//! buffer, so successive draws in a frame see the values set before them.

mod frame;
mod reflect;

use std::collections::HashMap;

use wgpu::util::DeviceExt;

use crate::device::Gpu;
use crate::gfx::{
    AttributeLocation, BufferId, GraphicsContext, ProgramId, ShaderId, ShaderStage,
    UniformLocation,
};

use frame::{DepthTarget, DrawCall, DrawKind, FrameRecording, UniformArena};
use reflect::{ProgramLayout, StageReflection};

pub(crate) const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// Target for drawing (encoder + color view).
pub struct RenderTarget<'a> {
    pub encoder: &'a mut wgpu::CommandEncoder,
    pub color_view: &'a wgpu::TextureView,
}

impl<'a> RenderTarget<'a> {
    #[inline]
    pub fn new(encoder: &'a mut wgpu::CommandEncoder, color_view: &'a wgpu::TextureView) -> Self {
        Self { encoder, color_view }
    }
}

struct CompiledStage {
    stage: ShaderStage,
    module: wgpu::ShaderModule,
    reflection: StageReflection,
}

struct Program {
    stages: [ShaderId; 2],
    layout: ProgramLayout,
    pipeline: wgpu::RenderPipeline,
    bind_group_layout: Option<wgpu::BindGroupLayout>,
    /// Bind group over the uniform arena, tagged with the arena generation.
    bind_group: Option<(u64, wgpu::BindGroup)>,
    /// CPU copy of the program's uniform block.
    uniform_values: Vec<u8>,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
enum BufferKind {
    Vertex,
    Index,
}

struct GpuBuffer {
    buffer: wgpu::Buffer,
    kind: BufferKind,
}

#[derive(Default)]
struct BindState {
    program: Option<ProgramId>,
    attributes: HashMap<u32, BufferId>,
    index_buffer: Option<BufferId>,
}

/// Persistent wgpu resources and bind state.
///
/// Owned by the application for the lifetime of the window; borrow it as a
/// [`GraphicsContext`] through [`context`](Self::context).
pub struct WgpuBackend {
    surface_format: wgpu::TextureFormat,
    uniform_alignment: u32,

    shaders: HashMap<ShaderId, CompiledStage>,
    programs: HashMap<ProgramId, Program>,
    buffers: HashMap<BufferId, GpuBuffer>,
    next_id: u32,

    state: BindState,
    frame: FrameRecording,

    depth: Option<DepthTarget>,
    uniform_arena: Option<UniformArena>,
}

impl WgpuBackend {
    pub fn new(gpu: &Gpu<'_>) -> Self {
        Self {
            surface_format: gpu.surface_format(),
            uniform_alignment: gpu.device().limits().min_uniform_buffer_offset_alignment,
            shaders: HashMap::new(),
            programs: HashMap::new(),
            buffers: HashMap::new(),
            next_id: 1,
            state: BindState::default(),
            frame: FrameRecording::default(),
            depth: None,
            uniform_arena: None,
        }
    }

    /// Borrows the back-end as a [`GraphicsContext`] bound to `gpu`.
    pub fn context<'a, 'w>(&'a mut self, gpu: &'a Gpu<'w>) -> WgpuContext<'a, 'w> {
        WgpuContext { gpu, backend: self }
    }

    /// Drops the draws recorded so far this frame.
    ///
    /// The next [`flush`](Self::flush) still clears the target, so an aborted
    /// frame presents as an empty frame rather than stale contents.
    fn abort_frame(&mut self) {
        self.frame.draws.clear();
        self.frame.uniform_bytes.clear();
        self.frame.clear = true;
    }

    fn alloc_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn compile_shader(
        &mut self,
        device: &wgpu::Device,
        stage: ShaderStage,
        source: &str,
    ) -> Result<ShaderId, String> {
        let reflection = reflect::reflect_stage(stage, source)?;

        let label = format!("spinner {stage} shader");
        let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(&label),
            source: wgpu::ShaderSource::Wgsl(source.into()),
        });

        let id = ShaderId::from_raw(self.alloc_id());
        log::debug!(
            "compiled {stage} shader {:?} (entry point `{}`)",
            id,
            reflection.entry_point
        );
        self.shaders.insert(id, CompiledStage { stage, module, reflection });
        Ok(id)
    }

    fn link_program(
        &mut self,
        device: &wgpu::Device,
        vertex: ShaderId,
        fragment: ShaderId,
    ) -> Result<ProgramId, String> {
        let vs = self.stage(vertex, ShaderStage::Vertex)?;
        let fs = self.stage(fragment, ShaderStage::Fragment)?;
        let layout = reflect::link(&vs.reflection, &fs.reflection)?;

        let bind_group_layout = layout.uniform_block.as_ref().map(|block| {
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("spinner uniform bgl"),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: block.binding,
                    visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: true,
                        min_binding_size: wgpu::BufferSize::new(block.size as u64),
                    },
                    count: None,
                }],
            })
        });

        let bind_group_layouts: Vec<&wgpu::BindGroupLayout> = bind_group_layout.iter().collect();
        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("spinner pipeline layout"),
            bind_group_layouts: &bind_group_layouts,
            immediate_size: 0,
        });

        let mut attributes = Vec::with_capacity(layout.attributes.len());
        for slot in &layout.attributes {
            let format = vertex_format(slot.components)
                .ok_or_else(|| format!("attribute `{}` has unsupported width", slot.name))?;
            attributes.push([wgpu::VertexAttribute {
                format,
                offset: 0,
                shader_location: slot.location,
            }]);
        }
        let buffers: Vec<wgpu::VertexBufferLayout<'_>> = attributes
            .iter()
            .zip(&layout.attributes)
            .map(|(attrs, slot)| wgpu::VertexBufferLayout {
                array_stride: (slot.components as u64) * std::mem::size_of::<f32>() as u64,
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes: attrs,
            })
            .collect();

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("spinner pipeline"),
            layout: Some(&pipeline_layout),

            vertex: wgpu::VertexState {
                module: &vs.module,
                entry_point: Some(layout.vertex_entry.as_str()),
                compilation_options: Default::default(),
                buffers: &buffers,
            },

            fragment: Some(wgpu::FragmentState {
                module: &fs.module,
                entry_point: Some(layout.fragment_entry.as_str()),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: self.surface_format,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),

            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },

            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),

            multiview_mask: None,
            cache: None,
        });

        let uniform_len = layout.uniform_block.as_ref().map_or(0, |b| b.size as usize);
        let id = ProgramId::from_raw(self.alloc_id());
        log::info!(
            "linked shader program {:?}: {} attribute(s), {} uniform(s)",
            id,
            layout.attributes.len(),
            layout.uniform_block.as_ref().map_or(0, |b| b.members.len()),
        );

        self.programs.insert(
            id,
            Program {
                stages: [vertex, fragment],
                layout,
                pipeline,
                bind_group_layout,
                bind_group: None,
                uniform_values: vec![0; uniform_len],
            },
        );
        Ok(id)
    }

    fn stage(&self, id: ShaderId, expected: ShaderStage) -> Result<&CompiledStage, String> {
        match self.shaders.get(&id) {
            Some(s) if s.stage == expected => Ok(s),
            Some(s) => Err(format!("shader {:?} is a {} stage, expected {expected}", id, s.stage)),
            None => Err(format!("unknown shader {id:?}")),
        }
    }

    fn create_buffer(&mut self, device: &wgpu::Device, label: &str, contents: &[u8], kind: BufferKind) -> BufferId {
        let usage = match kind {
            BufferKind::Vertex => wgpu::BufferUsages::VERTEX,
            BufferKind::Index => wgpu::BufferUsages::INDEX,
        };
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(label),
            contents,
            usage,
        });

        let id = BufferId::from_raw(self.alloc_id());
        log::debug!("created {kind:?} buffer {id:?} `{label}` ({} bytes)", contents.len());
        self.buffers.insert(id, GpuBuffer { buffer, kind });
        id
    }

    fn buffer_kind(&self, id: BufferId) -> Option<BufferKind> {
        self.buffers.get(&id).map(|b| b.kind)
    }

    fn vertex_attrib_pointer(&mut self, location: AttributeLocation, buffer: BufferId, item_size: u32) {
        if self.buffer_kind(buffer) != Some(BufferKind::Vertex) {
            log::warn!("vertex_attrib_pointer: {buffer:?} is not a vertex buffer");
            return;
        }

        let declared = self
            .state
            .program
            .and_then(|p| self.programs.get(&p))
            .and_then(|p| p.layout.attributes.iter().find(|a| a.location == location.raw()));
        if let Some(slot) = declared {
            if slot.components != item_size {
                log::warn!(
                    "vertex_attrib_pointer: `{}` expects {} components, buffer provides {}",
                    slot.name,
                    slot.components,
                    item_size
                );
                return;
            }
        }

        self.state.attributes.insert(location.raw(), buffer);
    }

    fn uniform_matrix4(&mut self, location: UniformLocation, matrix: &[f32; 16]) {
        let Some(program) = self.state.program.and_then(|p| self.programs.get_mut(&p)) else {
            log::warn!("uniform_matrix4: no active program");
            return;
        };
        let Some(member) = program.layout.uniform_member(location.raw() as usize) else {
            log::warn!("uniform_matrix4: unknown uniform location {}", location.raw());
            return;
        };

        let bytes: &[u8] = bytemuck::cast_slice(matrix.as_slice());
        if (member.size as usize) < bytes.len() {
            log::warn!("uniform_matrix4: `{}` is not a 4x4 matrix", member.name);
            return;
        }
        let start = member.offset as usize;
        program.uniform_values[start..start + bytes.len()].copy_from_slice(bytes);
    }

    fn record_draw(&mut self, kind: DrawKind) {
        let Some(program_id) = self.state.program else {
            log::warn!("draw skipped: no active program");
            return;
        };
        let Some(program) = self.programs.get(&program_id) else {
            log::warn!("draw skipped: program {program_id:?} was deleted");
            return;
        };

        let mut vertex_buffers = Vec::with_capacity(program.layout.attributes.len());
        for slot in &program.layout.attributes {
            match self.state.attributes.get(&slot.location) {
                Some(buffer) => vertex_buffers.push(*buffer),
                None => {
                    log::warn!(
                        "draw skipped: attribute `{}` (location {}) has no buffer",
                        slot.name,
                        slot.location
                    );
                    return;
                }
            }
        }

        let index_buffer = match kind {
            DrawKind::Elements { .. } => match self.state.index_buffer {
                Some(b) => Some(b),
                None => {
                    log::warn!("draw_elements skipped: no index buffer bound");
                    return;
                }
            },
            DrawKind::Arrays { .. } => None,
        };

        let uniform_offset = if program.uniform_values.is_empty() {
            None
        } else {
            Some(self.frame.push_uniforms(&program.uniform_values, self.uniform_alignment))
        };

        self.frame.draws.push(DrawCall {
            program: program_id,
            vertex_buffers,
            index_buffer,
            uniform_offset,
            kind,
        });
    }
}

fn vertex_format(components: u32) -> Option<wgpu::VertexFormat> {
    match components {
        1 => Some(wgpu::VertexFormat::Float32),
        2 => Some(wgpu::VertexFormat::Float32x2),
        3 => Some(wgpu::VertexFormat::Float32x3),
        4 => Some(wgpu::VertexFormat::Float32x4),
        _ => None,
    }
}

/// [`GraphicsContext`] view of a [`WgpuBackend`] for one device.
pub struct WgpuContext<'a, 'w> {
    gpu: &'a Gpu<'w>,
    backend: &'a mut WgpuBackend,
}

impl GraphicsContext for WgpuContext<'_, '_> {
    fn compile_shader(&mut self, stage: ShaderStage, source: &str) -> Result<ShaderId, String> {
        self.backend.compile_shader(self.gpu.device(), stage, source)
    }

    fn link_program(&mut self, vertex: ShaderId, fragment: ShaderId) -> Result<ProgramId, String> {
        self.backend.link_program(self.gpu.device(), vertex, fragment)
    }

    fn delete_shader(&mut self, shader: ShaderId) {
        self.backend.shaders.remove(&shader);
    }

    fn delete_program(&mut self, program: ProgramId) {
        let Some(p) = self.backend.programs.remove(&program) else { return };
        for stage in p.stages {
            self.backend.shaders.remove(&stage);
        }
        if self.backend.state.program == Some(program) {
            self.backend.state.program = None;
        }
    }

    fn attribute_location(&self, program: ProgramId, name: &str) -> Option<AttributeLocation> {
        let p = self.backend.programs.get(&program)?;
        p.layout
            .attributes
            .iter()
            .find(|a| a.name == name)
            .map(|a| AttributeLocation::from_raw(a.location))
    }

    fn uniform_location(&self, program: ProgramId, name: &str) -> Option<UniformLocation> {
        let block = self.backend.programs.get(&program)?.layout.uniform_block.as_ref()?;
        block
            .members
            .iter()
            .position(|m| m.name == name)
            .map(|i| UniformLocation::from_raw(i as u32))
    }

    fn use_program(&mut self, program: ProgramId) {
        if !self.backend.programs.contains_key(&program) {
            log::warn!("use_program: unknown program {program:?}");
            return;
        }
        self.backend.state.program = Some(program);
    }

    fn create_vertex_buffer(&mut self, label: &str, data: &[f32]) -> BufferId {
        self.backend
            .create_buffer(self.gpu.device(), label, bytemuck::cast_slice(data), BufferKind::Vertex)
    }

    fn create_index_buffer(&mut self, label: &str, data: &[u16]) -> BufferId {
        self.backend
            .create_buffer(self.gpu.device(), label, bytemuck::cast_slice(data), BufferKind::Index)
    }

    fn delete_buffer(&mut self, buffer: BufferId) {
        if let Some(b) = self.backend.buffers.remove(&buffer) {
            b.buffer.destroy();
        }
        let state = &mut self.backend.state;
        state.attributes.retain(|_, b| *b != buffer);
        if state.index_buffer == Some(buffer) {
            state.index_buffer = None;
        }
    }

    fn set_viewport(&mut self, x: u32, y: u32, width: u32, height: u32) {
        self.backend.frame.viewport = Some((x, y, width, height));
    }

    fn clear(&mut self) {
        self.backend.frame.clear = true;
    }

    fn vertex_attrib_pointer(&mut self, location: AttributeLocation, buffer: BufferId, item_size: u32) {
        self.backend.vertex_attrib_pointer(location, buffer, item_size);
    }

    fn bind_index_buffer(&mut self, buffer: BufferId) {
        if self.backend.buffer_kind(buffer) != Some(BufferKind::Index) {
            log::warn!("bind_index_buffer: {buffer:?} is not an index buffer");
            return;
        }
        self.backend.state.index_buffer = Some(buffer);
    }

    fn uniform_matrix4(&mut self, location: UniformLocation, matrix: &[f32; 16]) {
        self.backend.uniform_matrix4(location, matrix);
    }

    fn draw_arrays(&mut self, first: u32, count: u32) {
        self.backend.record_draw(DrawKind::Arrays { first, count });
    }

    fn draw_elements(&mut self, count: u32) {
        self.backend.record_draw(DrawKind::Elements { count });
    }

    fn abort_frame(&mut self) {
        self.backend.abort_frame();
    }
}
