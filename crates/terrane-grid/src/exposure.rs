use terrane_geom::Vec3;

use crate::adjacency::{NeighborTarget, neighbors};
use crate::face::{Face, FaceMask};
use crate::index::VoxelIndex;
use crate::mapper::GeometryMapper;

/// Two unit normals closer than this (by cosine) name the same face.
pub const NORMAL_MATCH_COS: f32 = 0.97;

/// Faces of a cell that are not covered by occupied neighbors, with their outward normals.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Exposure {
    faces: FaceMask,
    normals: Vec<Vec3>,
}

impl Exposure {
    /// A face is exposed when any cell covering it is unoccupied or it borders the outside.
    pub fn evaluate(
        m: &GeometryMapper,
        ix: VoxelIndex,
        is_occupied: impl Fn(VoxelIndex) -> bool,
    ) -> Self {
        let mut missing = FaceMask::EMPTY;
        for n in neighbors(m, ix) {
            let open = match n.target {
                NeighborTarget::Outside => true,
                NeighborTarget::Cell(other) => !is_occupied(other),
            };
            if open {
                missing.insert(n.face);
            }
        }
        Self::from_faces(m, ix, missing)
    }

    /// Exposure for an explicit face set. Faces with a collapsed (zero) normal are dropped.
    pub fn from_faces(m: &GeometryMapper, ix: VoxelIndex, faces: FaceMask) -> Self {
        let mut out = Exposure::default();
        for face in faces.iter() {
            let n = m.face_normal(ix, face);
            if n == Vec3::ZERO {
                continue;
            }
            out.faces.insert(face);
            out.normals.push(n);
        }
        out
    }

    #[inline]
    pub fn faces(&self) -> FaceMask {
        self.faces
    }

    /// Outward normals of exposed faces in geometry space, in face order.
    #[inline]
    pub fn normals(&self) -> &[Vec3] {
        &self.normals
    }

    #[inline]
    pub fn is_hidden(&self) -> bool {
        self.faces.is_empty()
    }

    #[inline]
    pub fn is_exposed(&self, face: Face) -> bool {
        self.faces.contains(face)
    }

    /// Whether `normal` matches any exposed face normal.
    pub fn matches(&self, normal: Vec3) -> bool {
        self.normals.iter().any(|n| n.dot(normal) > NORMAL_MATCH_COS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Bounds, GridConfig};
    use terrane_geom::Transform;

    fn mapper(bounds: Bounds, s: Vec3) -> GeometryMapper {
        GeometryMapper::new(&GridConfig::new(bounds, s, Transform::default()).unwrap())
    }

    #[test]
    fn isolated_box_cell_is_fully_exposed() {
        let m = mapper(Bounds::Box { size: Vec3::ONE }, Vec3::ONE);
        let e = Exposure::evaluate(&m, VoxelIndex::new(0, 0, 0), |_| false);
        assert_eq!(e.faces(), FaceMask::ALL);
        assert_eq!(e.normals().len(), 6);
        assert!(e.matches(Vec3::UP));
    }

    #[test]
    fn any_missing_fine_neighbor_exposes_face() {
        // middle of three rows, so both vertical faces are covered
        let m = mapper(Bounds::Capsule { radius: 2.0, height: 3.0 }, Vec3::new(1.0, 1.0, 1.6));
        let ix = VoxelIndex::new(0, 1, 1);
        let gap = VoxelIndex::new(1, 1, 3);
        let e = Exposure::evaluate(&m, ix, |other| other != gap);
        assert_eq!(e.faces().iter().collect::<Vec<_>>(), vec![Face::PosX]);
        let all = Exposure::evaluate(&m, ix, |_| true);
        assert!(all.is_hidden());
    }

    #[test]
    fn axis_face_never_exposed() {
        let m = mapper(Bounds::Capsule { radius: 1.0, height: 1.0 }, Vec3::ONE);
        let e = Exposure::evaluate(&m, VoxelIndex::new(0, 0, 0), |_| false);
        assert!(!e.is_exposed(Face::NegX));
        assert_eq!(e.faces().len(), 5);
    }
}
