use crate::device::Gpu;
use crate::gfx::{BufferId, ProgramId};

use super::{RenderTarget, WgpuBackend, DEPTH_FORMAT};

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub(super) enum DrawKind {
    Arrays { first: u32, count: u32 },
    Elements { count: u32 },
}

/// Bind state captured when a draw was issued.
pub(super) struct DrawCall {
    pub program: ProgramId,
    /// One buffer per program attribute, in vertex buffer slot order.
    pub vertex_buffers: Vec<BufferId>,
    pub index_buffer: Option<BufferId>,
    /// Dynamic offset into the uniform arena.
    pub uniform_offset: Option<u32>,
    pub kind: DrawKind,
}

/// Commands recorded since the last flush.
#[derive(Default)]
pub(super) struct FrameRecording {
    pub viewport: Option<(u32, u32, u32, u32)>,
    pub clear: bool,
    pub draws: Vec<DrawCall>,
    pub uniform_bytes: Vec<u8>,
}

impl FrameRecording {
    /// Appends a uniform snapshot at the next aligned offset and returns it.
    pub fn push_uniforms(&mut self, values: &[u8], alignment: u32) -> u32 {
        let offset = align_up(self.uniform_bytes.len(), alignment.max(1) as usize);
        self.uniform_bytes.resize(offset, 0);
        self.uniform_bytes.extend_from_slice(values);
        offset as u32
    }
}

pub(super) struct DepthTarget {
    size: (u32, u32),
    _texture: wgpu::Texture,
    view: wgpu::TextureView,
}

pub(super) struct UniformArena {
    buffer: wgpu::Buffer,
    capacity: u64,
    generation: u64,
}

fn align_up(value: usize, alignment: usize) -> usize {
    value.div_ceil(alignment) * alignment
}

impl WgpuBackend {
    /// Encodes the recorded frame into `target` and resets the recording.
    ///
    /// Opens one render pass: color is cleared to opaque black and depth to
    /// 1.0 when the frame requested a clear, then every recorded draw is
    /// replayed in order.
    pub fn flush(&mut self, gpu: &Gpu<'_>, target: &mut RenderTarget<'_>) {
        let mut frame = std::mem::take(&mut self.frame);
        let size = gpu.size();
        let (width, height) = (size.width.max(1), size.height.max(1));

        self.ensure_depth(gpu.device(), width, height);

        if !frame.uniform_bytes.is_empty() {
            let padded = align_up(frame.uniform_bytes.len(), wgpu::COPY_BUFFER_ALIGNMENT as usize);
            frame.uniform_bytes.resize(padded, 0);
            self.ensure_uniform_capacity(gpu.device(), padded as u64);
            if let Some(arena) = self.uniform_arena.as_ref() {
                gpu.queue().write_buffer(&arena.buffer, 0, &frame.uniform_bytes);
            }
            self.ensure_bind_groups(gpu.device(), &frame);
        }

        let Some(depth) = self.depth.as_ref() else { return };

        let (color_load, depth_load) = if frame.clear {
            (wgpu::LoadOp::Clear(wgpu::Color::BLACK), wgpu::LoadOp::Clear(1.0))
        } else {
            (wgpu::LoadOp::Load, wgpu::LoadOp::Load)
        };

        let mut rpass = target.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("spinner scene pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target.color_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: color_load,
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &depth.view,
                depth_ops: Some(wgpu::Operations {
                    load: depth_load,
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });

        // The viewport must lie within the attachment.
        let (vx, vy, vw, vh) = frame.viewport.unwrap_or((0, 0, width, height));
        let vx = vx.min(width);
        let vy = vy.min(height);
        let vw = vw.min(width - vx);
        let vh = vh.min(height - vy);
        if vw == 0 || vh == 0 {
            return;
        }
        rpass.set_viewport(vx as f32, vy as f32, vw as f32, vh as f32, 0.0, 1.0);

        for draw in &frame.draws {
            let Some(program) = self.programs.get(&draw.program) else { continue };

            let vertex_buffers: Option<Vec<&wgpu::Buffer>> = draw
                .vertex_buffers
                .iter()
                .map(|id| self.buffers.get(id).map(|b| &b.buffer))
                .collect();
            let Some(vertex_buffers) = vertex_buffers else {
                log::warn!("draw dropped: a vertex buffer was deleted mid-frame");
                continue;
            };

            rpass.set_pipeline(&program.pipeline);
            if let (Some(offset), Some((_, bind_group))) = (draw.uniform_offset, program.bind_group.as_ref()) {
                rpass.set_bind_group(0, bind_group, &[offset]);
            }
            for (slot, buffer) in vertex_buffers.into_iter().enumerate() {
                rpass.set_vertex_buffer(slot as u32, buffer.slice(..));
            }

            match draw.kind {
                DrawKind::Arrays { first, count } => {
                    rpass.draw(first..first + count, 0..1);
                }
                DrawKind::Elements { count } => {
                    let Some(index) = draw.index_buffer.and_then(|id| self.buffers.get(&id)) else {
                        continue;
                    };
                    rpass.set_index_buffer(index.buffer.slice(..), wgpu::IndexFormat::Uint16);
                    rpass.draw_indexed(0..count, 0, 0..1);
                }
            }
        }
    }

    fn ensure_depth(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        if self.depth.as_ref().is_some_and(|d| d.size == (width, height)) {
            return;
        }

        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("spinner depth"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        log::debug!("depth attachment resized to {width}x{height}");
        self.depth = Some(DepthTarget {
            size: (width, height),
            _texture: texture,
            view,
        });
    }

    fn ensure_uniform_capacity(&mut self, device: &wgpu::Device, required: u64) {
        if self.uniform_arena.as_ref().is_some_and(|a| a.capacity >= required) {
            return;
        }

        let capacity = required.next_power_of_two().max(4096);
        let generation = self.uniform_arena.as_ref().map_or(0, |a| a.generation + 1);
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("spinner uniform arena"),
            size: capacity,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        self.uniform_arena = Some(UniformArena {
            buffer,
            capacity,
            generation,
        });
    }

    /// (Re)creates bind groups of the programs drawn this frame whose group
    /// points at an older arena buffer.
    fn ensure_bind_groups(&mut self, device: &wgpu::Device, frame: &FrameRecording) {
        let Some(arena) = self.uniform_arena.as_ref() else { return };

        for draw in &frame.draws {
            let Some(program) = self.programs.get_mut(&draw.program) else { continue };
            if program.bind_group.as_ref().is_some_and(|(g, _)| *g == arena.generation) {
                continue;
            }
            let (Some(layout), Some(block)) =
                (program.bind_group_layout.as_ref(), program.layout.uniform_block.as_ref())
            else {
                continue;
            };

            let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("spinner uniform bind group"),
                layout,
                entries: &[wgpu::BindGroupEntry {
                    binding: block.binding,
                    resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                        buffer: &arena.buffer,
                        offset: 0,
                        size: wgpu::BufferSize::new(block.size as u64),
                    }),
                }],
            });
            program.bind_group = Some((arena.generation, bind_group));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_snapshots_are_aligned() {
        let mut frame = FrameRecording::default();
        assert_eq!(frame.push_uniforms(&[1; 128], 256), 0);
        assert_eq!(frame.push_uniforms(&[2; 128], 256), 256);
        assert_eq!(frame.uniform_bytes.len(), 384);
        assert_eq!(frame.uniform_bytes[255], 0);
        assert_eq!(frame.uniform_bytes[256], 2);
    }

    #[test]
    fn align_up_rounds_to_multiple() {
        assert_eq!(align_up(0, 256), 0);
        assert_eq!(align_up(1, 256), 256);
        assert_eq!(align_up(256, 256), 256);
        assert_eq!(align_up(257, 4), 260);
    }
}
