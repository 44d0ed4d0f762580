//! Face adjacency across layers with differing angular resolution.
//!
//! Each neighbor is tagged with the face of the source cell it touches. A face that meets a
//! finer layer is covered by several neighbors; a face that meets a coarser layer is covered
//! by one. Linear axes report [`NeighborTarget::Outside`] below index zero. Collapsed faces
//! (the inner face of the innermost ring or shell, sphere faces at a pole) have no neighbors.

use smallvec::SmallVec;

use crate::config::GeometryKind;
use crate::face::Face;
use crate::index::VoxelIndex;
use crate::mapper::GeometryMapper;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum NeighborTarget {
    Cell(VoxelIndex),
    /// Below the lower bound of a linear axis; never occupied.
    Outside,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Neighbor {
    pub face: Face,
    pub target: NeighborTarget,
}

impl Neighbor {
    #[inline]
    pub fn cell(&self) -> Option<VoxelIndex> {
        match self.target {
            NeighborTarget::Cell(ix) => Some(ix),
            NeighborTarget::Outside => None,
        }
    }
}

pub type Neighbors = SmallVec<[Neighbor; 16]>;

/// Integer ratio between two subdivision counts, `round(finer / coarser)`, at least 1.
pub fn resolution_ratio(finer: u32, coarser: u32) -> u32 {
    let r = (finer as f32 / coarser.max(1) as f32).round() as u32;
    r.max(1)
}

/// Indices in a layer of `to` subdivisions overlapping index `i` of a layer of `from`.
fn bridge(i: u32, from: u32, to: u32) -> SmallVec<[u32; 8]> {
    let mut out = SmallVec::new();
    if to == 0 {
        return out;
    }
    if to >= from {
        let r = resolution_ratio(to, from);
        let first = i.saturating_mul(r);
        out.extend((first..first.saturating_add(r)).filter(|j| *j < to));
    } else {
        let r = resolution_ratio(from, to);
        out.push((i / r).min(to - 1));
    }
    out
}

fn push(out: &mut Neighbors, face: Face, ix: VoxelIndex) {
    out.push(Neighbor {
        face,
        target: NeighborTarget::Cell(ix),
    });
}

/// Steps along a linear axis selected by `with`, reporting `Outside` below zero.
fn linear(
    out: &mut Neighbors,
    value: u32,
    pos: Face,
    neg: Face,
    with: impl Fn(u32) -> VoxelIndex,
) {
    match value.checked_add(1) {
        Some(next) => push(out, pos, with(next)),
        None => out.push(Neighbor {
            face: pos,
            target: NeighborTarget::Outside,
        }),
    }
    match value.checked_sub(1) {
        Some(prev) => push(out, neg, with(prev)),
        None => out.push(Neighbor {
            face: neg,
            target: NeighborTarget::Outside,
        }),
    }
}

/// Azimuthal neighbors with wrap-around.
fn wrapping(out: &mut Neighbors, ix: VoxelIndex, count: u32) {
    if count == 0 {
        return;
    }
    let w = ix.w % count;
    push(out, Face::PosZ, ix.with_w((w + 1) % count));
    push(out, Face::NegZ, ix.with_w((w + count - 1) % count));
}

fn cylinder_radial(out: &mut Neighbors, m: &GeometryMapper, ix: VoxelIndex) {
    let slices = |u| m.slice_count(u, ix.v).unwrap_or(0);
    let from = slices(ix.u);
    let mut toward = |u: u32, face: Face| {
        for w in bridge(ix.w, from, slices(u)) {
            push(out, face, VoxelIndex::new(u, ix.v, w));
        }
    };
    if let Some(outer) = ix.u.checked_add(1) {
        toward(outer, Face::PosX);
    }
    if let Some(inner) = ix.u.checked_sub(1) {
        toward(inner, Face::NegX);
    }
}

fn sphere_radial(out: &mut Neighbors, m: &GeometryMapper, ix: VoxelIndex) {
    let bands = |u| m.band_count(u).unwrap_or(0);
    let slices = |u, v| m.slice_count(u, v).unwrap_or(0);
    let from_bands = bands(ix.u);
    let from_slices = slices(ix.u, ix.v);
    let mut toward = |u: u32, face: Face| {
        for v in bridge(ix.v, from_bands, bands(u)) {
            for w in bridge(ix.w, from_slices, slices(u, v)) {
                push(out, face, VoxelIndex::new(u, v, w));
            }
        }
    };
    if let Some(outer) = ix.u.checked_add(1) {
        toward(outer, Face::PosX);
    }
    if let Some(inner) = ix.u.checked_sub(1) {
        toward(inner, Face::NegX);
    }
}

fn sphere_polar(out: &mut Neighbors, m: &GeometryMapper, ix: VoxelIndex) {
    let bands = m.band_count(ix.u).unwrap_or(0);
    let slices = |v| m.slice_count(ix.u, v).unwrap_or(0);
    let from = slices(ix.v);
    let mut toward = |v: u32, face: Face| {
        for w in bridge(ix.w, from, slices(v)) {
            push(out, face, VoxelIndex::new(ix.u, v, w));
        }
    };
    if let Some(next) = ix.v.checked_add(1).filter(|v| *v < bands) {
        toward(next, Face::PosY);
    }
    if let Some(prev) = ix.v.checked_sub(1) {
        toward(prev, Face::NegY);
    }
}

fn step(ix: VoxelIndex, face: Face) -> NeighborTarget {
    let (du, dv, dw) = face.delta();
    match (
        ix.u.checked_add_signed(du),
        ix.v.checked_add_signed(dv),
        ix.w.checked_add_signed(dw),
    ) {
        (Some(u), Some(v), Some(w)) => NeighborTarget::Cell(VoxelIndex::new(u, v, w)),
        _ => NeighborTarget::Outside,
    }
}

/// All face neighbors of `ix`, whether or not they are occupied. `ix` is expected to be
/// addressable; see [`crate::Lattice::is_addressable`].
pub fn neighbors(m: &GeometryMapper, ix: VoxelIndex) -> Neighbors {
    let mut out = Neighbors::new();
    match m.kind() {
        GeometryKind::Cartesian => {
            for face in Face::ALL {
                out.push(Neighbor {
                    face,
                    target: step(ix, face),
                });
            }
        }
        GeometryKind::Cylindrical => {
            cylinder_radial(&mut out, m, ix);
            linear(&mut out, ix.v, Face::PosY, Face::NegY, |v| ix.with_v(v));
            wrapping(&mut out, ix, m.slice_count(ix.u, ix.v).unwrap_or(0));
        }
        GeometryKind::Spherical => {
            sphere_radial(&mut out, m, ix);
            sphere_polar(&mut out, m, ix);
            wrapping(&mut out, ix, m.slice_count(ix.u, ix.v).unwrap_or(0));
        }
    }
    out
}
