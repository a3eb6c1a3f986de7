//! The two hardcoded meshes.

/// Four triangular faces (front, right, back, left) sharing the apex.
pub const PYRAMID_POSITIONS: [[f32; 3]; 12] = [
    // Front face
    [0.0, 1.0, 0.0],
    [-1.0, -1.0, 1.0],
    [1.0, -1.0, 1.0],
    // Right face
    [0.0, 1.0, 0.0],
    [1.0, -1.0, 1.0],
    [1.0, -1.0, -1.0],
    // Back face
    [0.0, 1.0, 0.0],
    [1.0, -1.0, -1.0],
    [-1.0, -1.0, -1.0],
    // Left face
    [0.0, 1.0, 0.0],
    [-1.0, -1.0, -1.0],
    [-1.0, -1.0, 1.0],
];

const RED: [f32; 4] = [1.0, 0.0, 0.0, 1.0];
const GREEN: [f32; 4] = [0.0, 1.0, 0.0, 1.0];
const BLUE: [f32; 4] = [0.0, 0.0, 1.0, 1.0];

/// Red apex; base corners alternate green and blue around the pyramid.
pub const PYRAMID_COLORS: [[f32; 4]; 12] = [
    RED, GREEN, BLUE, // front
    RED, BLUE, GREEN, // right
    RED, GREEN, BLUE, // back
    RED, BLUE, GREEN, // left
];

/// Six quads, four vertices each.
pub const CUBE_POSITIONS: [[f32; 3]; 24] = [
    // Front face
    [-1.0, -1.0, 1.0],
    [1.0, -1.0, 1.0],
    [1.0, 1.0, 1.0],
    [-1.0, 1.0, 1.0],
    // Back face
    [-1.0, -1.0, -1.0],
    [-1.0, 1.0, -1.0],
    [1.0, 1.0, -1.0],
    [1.0, -1.0, -1.0],
    // Top face
    [-1.0, 1.0, -1.0],
    [-1.0, 1.0, 1.0],
    [1.0, 1.0, 1.0],
    [1.0, 1.0, -1.0],
    // Bottom face
    [-1.0, -1.0, -1.0],
    [1.0, -1.0, -1.0],
    [1.0, -1.0, 1.0],
    [-1.0, -1.0, 1.0],
    // Right face
    [1.0, -1.0, -1.0],
    [1.0, 1.0, -1.0],
    [1.0, 1.0, 1.0],
    [1.0, -1.0, 1.0],
    // Left face
    [-1.0, -1.0, -1.0],
    [-1.0, -1.0, 1.0],
    [-1.0, 1.0, 1.0],
    [-1.0, 1.0, -1.0],
];

/// One solid color per cube face, in `CUBE_POSITIONS` face order.
pub const CUBE_FACE_COLORS: [[f32; 4]; 6] = [
    [1.0, 0.0, 0.0, 1.0], // front
    [1.0, 1.0, 0.0, 1.0], // back
    [0.0, 1.0, 0.0, 1.0], // top
    [1.0, 0.5, 0.5, 1.0], // bottom
    [1.0, 0.0, 1.0, 1.0], // right
    [0.0, 0.0, 1.0, 1.0], // left
];

/// Two triangles per face.
pub const CUBE_INDICES: [u16; 36] = [
    0, 1, 2, 0, 2, 3, // front
    4, 5, 6, 4, 6, 7, // back
    8, 9, 10, 8, 10, 11, // top
    12, 13, 14, 12, 14, 15, // bottom
    16, 17, 18, 16, 18, 19, // right
    20, 21, 22, 20, 22, 23, // left
];

/// Per-vertex cube colors: each face color repeated for its four vertices.
pub fn cube_colors() -> Vec<[f32; 4]> {
    CUBE_FACE_COLORS
        .iter()
        .flat_map(|c| std::iter::repeat_n(*c, 4))
        .collect()
}
