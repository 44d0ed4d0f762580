use terrane_geom::Vec3;
use terrane_grid::{GeometryKind, VoxelGrid, VoxelIndex, VoxelState};

/// Collision shape of one voxel in grid-local space.
#[derive(Clone, Debug, PartialEq)]
pub enum Collider {
    /// Axis-aligned box, used for Cartesian cells.
    Box { center: Vec3, size: Vec3 },
    /// Convex hull of the reshaped cell; `points` are offsets from `center`.
    ConvexHull { center: Vec3, points: Vec<Vec3> },
}

impl Collider {
    pub fn center(&self) -> Vec3 {
        match self {
            Collider::Box { center, .. } | Collider::ConvexHull { center, .. } => *center,
        }
    }
}

/// Collider for the voxel at `ix`. Voxels without exposed faces get none.
pub fn build_collider(grid: &VoxelGrid, ix: VoxelIndex) -> Option<Collider> {
    let voxel = grid.get(ix)?;
    if voxel.state() != VoxelState::Exposed {
        return None;
    }
    let mapper = grid.mapper();
    let scale = mapper.scale();
    let center = mapper.cell_center(ix);
    match grid.geometry() {
        GeometryKind::Cartesian => Some(Collider::Box {
            center,
            size: mapper.voxel_size().div_elem(scale),
        }),
        _ => {
            let mut points: Vec<Vec3> = Vec::with_capacity(8);
            for p in mapper.cell_corners(ix) {
                let local = p.div_elem(scale);
                if !points.iter().any(|q| q.approx_eq(local, 1e-6)) {
                    points.push(local);
                }
            }
            Some(Collider::ConvexHull { center, points })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use terrane_geom::Transform;
    use terrane_grid::{Bounds, GridConfig};

    #[test]
    fn scaled_box_collider_uses_local_size() {
        let t = Transform::default().with_scale(Vec3::new(2.0, 1.0, 1.0));
        let cfg = GridConfig::new(Bounds::Box { size: Vec3::ONE }, Vec3::ONE, t).unwrap();
        let grid = VoxelGrid::build(cfg);
        let c = build_collider(&grid, VoxelIndex::new(0, 0, 0)).unwrap();
        match c {
            Collider::Box { size, .. } => assert!(size.approx_eq(Vec3::new(0.5, 1.0, 1.0), 1e-6)),
            other => panic!("expected box, got {:?}", other),
        }
    }

    #[test]
    fn axis_cells_collapse_hull_points() {
        let cfg = GridConfig::new(
            Bounds::Capsule { radius: 1.0, height: 1.0 },
            Vec3::ONE,
            Transform::default(),
        )
        .unwrap();
        let grid = VoxelGrid::build(cfg);
        match build_collider(&grid, VoxelIndex::new(0, 0, 0)).unwrap() {
            Collider::ConvexHull { points, .. } => assert_eq!(points.len(), 6),
            other => panic!("expected hull, got {:?}", other),
        }
    }

    #[test]
    fn hidden_voxels_have_no_collider() {
        let cfg = GridConfig::new(Bounds::Box { size: Vec3::splat(3.0) }, Vec3::ONE, Transform::default()).unwrap();
        let grid = VoxelGrid::build(cfg);
        assert!(build_collider(&grid, VoxelIndex::new(1, 1, 1)).is_none());
        assert!(build_collider(&grid, VoxelIndex::new(0, 1, 1)).is_some());
    }
}
