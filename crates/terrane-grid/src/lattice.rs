use log::trace;

use crate::config::GeometryKind;
use crate::index::VoxelIndex;
use crate::mapper::{GeometryMapper, layer_count};

/// Radial layers where the angular subdivision changes relative to the layer inside.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ResolutionBoundaries {
    /// Layers whose azimuthal slice count differs from the inner neighbor layer.
    pub azimuth: Vec<u32>,
    /// Shells whose polar band count differs from the inner neighbor shell (spheres).
    pub polar: Vec<u32>,
}

/// Extent of the lattice: which indices a bulk build populates.
#[derive(Clone, Debug, PartialEq)]
pub struct Lattice {
    kind: GeometryKind,
    /// Layer counts along `u`, `v`, `w`. Angular axes are per-layer and stored as zero.
    counts: [u32; 3],
}

impl Lattice {
    pub fn new(mapper: &GeometryMapper) -> Self {
        let s = mapper.voxel_size();
        let e = mapper.extent();
        let counts = match mapper.kind() {
            GeometryKind::Cartesian => [
                layer_count(e.x, s.x),
                layer_count(e.y, s.y),
                layer_count(e.z, s.z),
            ],
            GeometryKind::Cylindrical => [layer_count(e.x, s.x), layer_count(e.y, s.y), 0],
            GeometryKind::Spherical => [layer_count(e.x, s.x), 0, 0],
        };
        trace!("lattice {:?}: counts {:?}", mapper.kind(), counts);
        Self {
            kind: mapper.kind(),
            counts,
        }
    }

    #[inline]
    pub fn kind(&self) -> GeometryKind {
        self.kind
    }

    /// Number of `u` layers (Cartesian columns, rings or shells).
    #[inline]
    pub fn u_count(&self) -> u32 {
        self.counts[0]
    }

    /// Number of `v` layers at shell `u`.
    pub fn v_count(&self, mapper: &GeometryMapper, u: u32) -> u32 {
        match self.kind {
            GeometryKind::Spherical => mapper.band_count(u).unwrap_or(0),
            _ => self.counts[1],
        }
    }

    /// Number of `w` layers at `(u, v)`.
    pub fn w_count(&self, mapper: &GeometryMapper, u: u32, v: u32) -> u32 {
        mapper.slice_count(u, v).unwrap_or(self.counts[2])
    }

    /// Whether `ix` names a well-formed cell, possibly outside the bounding volume.
    /// Angular axes must stay inside the count of their layer; linear axes are unbounded.
    pub fn is_addressable(&self, mapper: &GeometryMapper, ix: VoxelIndex) -> bool {
        match self.kind {
            GeometryKind::Cartesian => true,
            GeometryKind::Cylindrical => mapper.slice_count(ix.u, ix.v).is_some_and(|n| ix.w < n),
            GeometryKind::Spherical => {
                mapper.band_count(ix.u).is_some_and(|n| ix.v < n)
                    && mapper.slice_count(ix.u, ix.v).is_some_and(|n| ix.w < n)
            }
        }
    }

    /// Whether `ix` lies on the outer surface layer: the top layer of a box, the outer ring
    /// of a cylinder or the outer shell of a sphere.
    pub fn is_surface_layer(&self, ix: VoxelIndex) -> bool {
        match self.kind {
            GeometryKind::Cartesian => ix.v + 1 == self.counts[1],
            _ => ix.u + 1 == self.counts[0],
        }
    }

    /// Every index inside the lattice, in `u`, `v`, `w` order.
    pub fn indices(&self, mapper: &GeometryMapper) -> Vec<VoxelIndex> {
        let mut out = Vec::new();
        for u in 0..self.u_count() {
            for v in 0..self.v_count(mapper, u) {
                for w in 0..self.w_count(mapper, u, v) {
                    out.push(VoxelIndex::new(u, v, w));
                }
            }
        }
        out
    }

    pub fn resolution_boundaries(&self, mapper: &GeometryMapper) -> ResolutionBoundaries {
        let mut out = ResolutionBoundaries::default();
        for u in 1..self.u_count() {
            match self.kind {
                GeometryKind::Cartesian => {}
                GeometryKind::Cylindrical => {
                    if mapper.theta_halvings_inner(u) != mapper.theta_halvings(u) {
                        out.azimuth.push(u);
                    }
                }
                GeometryKind::Spherical => {
                    if mapper.theta_halvings_inner(u) != mapper.theta_halvings(u) {
                        out.polar.push(u);
                    }
                    let bands = self.v_count(mapper, u);
                    if (0..bands).any(|v| mapper.phi_halvings_inner(u, v) != mapper.phi_halvings(u, v)) {
                        out.azimuth.push(u);
                    }
                }
            }
        }
        out
    }
}
