use crate::error::{RenderError, Result};
use crate::gfx::{AttributeLocation, BufferId, GraphicsContext};

pub const POSITION_ITEM_SIZE: u32 = 3;
pub const COLOR_ITEM_SIZE: u32 = 4;

/// Immutable GPU-resident mesh: positions, parallel colors and optional
/// `u16` indices.
///
/// Invariants checked at creation:
/// - position and color counts are equal and non-zero
/// - every index addresses an existing vertex
/// - the draw count describes whole triangles
#[derive(Debug)]
pub struct GeometryBuffer {
    positions: BufferId,
    colors: BufferId,
    indices: Option<BufferId>,
    vertex_count: u32,
    item_count: u32,
}

impl GeometryBuffer {
    pub fn create(
        gfx: &mut dyn GraphicsContext,
        label: &str,
        positions: &[[f32; 3]],
        colors: &[[f32; 4]],
        indices: Option<&[u16]>,
    ) -> Result<Self> {
        validate(label, positions, colors, indices)?;

        let position_buffer = gfx.create_vertex_buffer(&format!("{label} positions"), positions.as_flattened());
        let color_buffer = gfx.create_vertex_buffer(&format!("{label} colors"), colors.as_flattened());
        let index_buffer = indices.map(|idx| gfx.create_index_buffer(&format!("{label} indices"), idx));

        let vertex_count = positions.len() as u32;
        let item_count = indices.map_or(vertex_count, |idx| idx.len() as u32);

        log::debug!(
            "geometry `{label}`: {vertex_count} vertices, {item_count} items{}",
            if index_buffer.is_some() { " (indexed)" } else { "" }
        );

        Ok(Self {
            positions: position_buffer,
            colors: color_buffer,
            indices: index_buffer,
            vertex_count,
            item_count,
        })
    }

    /// Number of vertices, or of indices when indexed.
    #[inline]
    pub fn item_count(&self) -> u32 {
        self.item_count
    }

    #[inline]
    pub fn vertex_count(&self) -> u32 {
        self.vertex_count
    }

    #[inline]
    pub fn indexed(&self) -> bool {
        self.indices.is_some()
    }

    /// Makes this mesh the active vertex source.
    ///
    /// The color attribute is only bound when the program has one.
    pub fn bind_for_draw(
        &self,
        gfx: &mut dyn GraphicsContext,
        position: AttributeLocation,
        color: Option<AttributeLocation>,
    ) {
        gfx.vertex_attrib_pointer(position, self.positions, POSITION_ITEM_SIZE);
        if let Some(color) = color {
            gfx.vertex_attrib_pointer(color, self.colors, COLOR_ITEM_SIZE);
        }
        if let Some(indices) = self.indices {
            gfx.bind_index_buffer(indices);
        }
    }

    /// Issues the draw call for the whole mesh.
    pub fn draw(&self, gfx: &mut dyn GraphicsContext) {
        if self.indexed() {
            gfx.draw_elements(self.item_count);
        } else {
            gfx.draw_arrays(0, self.item_count);
        }
    }

    pub fn release(self, gfx: &mut dyn GraphicsContext) {
        gfx.delete_buffer(self.positions);
        gfx.delete_buffer(self.colors);
        if let Some(indices) = self.indices {
            gfx.delete_buffer(indices);
        }
    }
}

fn validate(label: &str, positions: &[[f32; 3]], colors: &[[f32; 4]], indices: Option<&[u16]>) -> Result<()> {
    if positions.is_empty() {
        return Err(RenderError::InvalidGeometry(format!("`{label}` has no vertices")));
    }
    if positions.len() != colors.len() {
        return Err(RenderError::InvalidGeometry(format!(
            "`{label}` has {} positions but {} colors",
            positions.len(),
            colors.len()
        )));
    }
    if positions.len() > usize::from(u16::MAX) + 1 {
        return Err(RenderError::InvalidGeometry(format!(
            "`{label}` has {} vertices, more than u16 indices can address",
            positions.len()
        )));
    }

    let item_count = match indices {
        Some(indices) => {
            if let Some(bad) = indices.iter().find(|&&i| usize::from(i) >= positions.len()) {
                return Err(RenderError::InvalidGeometry(format!(
                    "`{label}` index {bad} out of range for {} vertices",
                    positions.len()
                )));
            }
            indices.len()
        }
        None => positions.len(),
    };

    if item_count == 0 || item_count % 3 != 0 {
        return Err(RenderError::InvalidGeometry(format!(
            "`{label}` draw count {item_count} is not a whole number of triangles"
        )));
    }

    Ok(())
}
