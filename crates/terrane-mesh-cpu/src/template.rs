//! Canonical cube template: 4 vertices per face, 6 triangle indices per face.

use terrane_geom::Vec2;
use terrane_grid::Face;

pub const VERTS_PER_FACE: usize = 4;
pub const INDICES_PER_FACE: usize = 6;
pub const VERTEX_COUNT: usize = 6 * VERTS_PER_FACE;
pub const INDEX_COUNT: usize = 6 * INDICES_PER_FACE;

/// Template UV of each face vertex, in face-corner order `[a, b, c, d]`.
pub const FACE_UVS: [Vec2; VERTS_PER_FACE] = [
    Vec2 { x: 0.0, y: 0.0 },
    Vec2 { x: 1.0, y: 0.0 },
    Vec2 { x: 1.0, y: 1.0 },
    Vec2 { x: 0.0, y: 1.0 },
];

/// First template vertex of `face`.
#[inline]
pub fn face_base(face: Face) -> usize {
    face.index() * VERTS_PER_FACE
}

/// Triangle indices `[a, b, c, a, c, d]` of `face` into the 24-vertex template.
#[inline]
pub fn face_triangles(face: Face) -> [u32; INDICES_PER_FACE] {
    let b = face_base(face) as u32;
    [b, b + 1, b + 2, b, b + 2, b + 3]
}

/// Cell corner (0..8) a template vertex is pinned to.
#[inline]
pub fn vertex_corner(vertex: usize) -> usize {
    terrane_grid::face::FACE_CORNERS[vertex / VERTS_PER_FACE][vertex % VERTS_PER_FACE]
}
