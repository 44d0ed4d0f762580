use terrane_geom::{Aabb, Vec2, Vec3};

/// Flat vertex/index buffers of a combined mesh, ready for upload.
///
/// Positions and normals are packed `xyz`, each UV channel is packed `uv`, indices are 32-bit.
#[derive(Clone, Debug)]
pub struct MeshBuild {
    pub pos: Vec<f32>,
    pub norm: Vec<f32>,
    pub uvs: Vec<Vec<f32>>,
    pub idx: Vec<u32>,
    pub bbox: Aabb,
}

impl Default for MeshBuild {
    fn default() -> Self {
        Self::with_channels(1)
    }
}

impl MeshBuild {
    pub fn with_channels(channels: usize) -> Self {
        Self {
            pos: Vec::new(),
            norm: Vec::new(),
            uvs: vec![Vec::new(); channels.max(1)],
            idx: Vec::new(),
            bbox: Aabb::EMPTY,
        }
    }

    /// Pre-reserve capacity for approximately `n_quads` quads worth of data.
    #[inline]
    pub fn reserve_quads(&mut self, n_quads: usize) {
        self.pos.reserve(n_quads * 4 * 3);
        self.norm.reserve(n_quads * 4 * 3);
        for ch in &mut self.uvs {
            ch.reserve(n_quads * 4 * 2);
        }
        self.idx.reserve(n_quads * 6);
    }

    #[inline]
    pub fn channels(&self) -> usize {
        self.uvs.len()
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.pos.len() / 3
    }

    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.idx.len() / 3
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.idx.is_empty()
    }

    /// Appends a quad `[a, b, c, d]` as triangles `[a, b, c]`, `[a, c, d]`.
    ///
    /// `uvs[ch]` holds the four UVs of channel `ch`; missing channels repeat the first. The
    /// quad is flipped when its winding disagrees with `n`.
    pub fn add_quad_uv(&mut self, quad: [Vec3; 4], n: Vec3, uvs: &[[Vec2; 4]]) {
        let base = self.vertex_count() as u32;
        let mut vs = quad;
        let mut order = [0usize, 1, 2, 3];
        let cross = (vs[1] - vs[0]).cross(vs[2] - vs[0]);
        if cross.dot(n) < 0.0 {
            vs.swap(1, 3);
            order.swap(1, 3);
        }
        for (i, v) in vs.iter().enumerate() {
            self.pos.extend_from_slice(&[v.x, v.y, v.z]);
            self.norm.extend_from_slice(&[n.x, n.y, n.z]);
            self.bbox.include(*v);
            for (ch, out) in self.uvs.iter_mut().enumerate() {
                let Some(set) = uvs.get(ch).or_else(|| uvs.first()) else {
                    out.extend_from_slice(&[0.0, 0.0]);
                    continue;
                };
                let uv = set[order[i]];
                out.extend_from_slice(&[uv.x, uv.y]);
            }
        }
        self.idx
            .extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }
}
