use proptest::prelude::*;
use terrane_blocks::BlockType;
use terrane_geom::{Transform, Vec3};
use terrane_grid::{Bounds, Face, GridConfig, Neighbor, VoxelGrid, VoxelIndex};

fn bounds_strategy() -> impl Strategy<Value = Bounds> {
    prop_oneof![
        (1.0f32..4.0, 1.0f32..4.0, 1.0f32..4.0).prop_map(|(x, y, z)| Bounds::Box {
            size: Vec3::new(x, y, z)
        }),
        (1.0f32..6.0, 1.0f32..3.0).prop_map(|(radius, height)| Bounds::Capsule { radius, height }),
        (1.0f32..6.0).prop_map(|radius| Bounds::Sphere { radius }),
    ]
}

fn vec3_in(lo: f32, hi: f32) -> impl Strategy<Value = Vec3> {
    (lo..hi, lo..hi, lo..hi).prop_map(|(x, y, z)| Vec3::new(x, y, z))
}

fn config_strategy() -> impl Strategy<Value = GridConfig> {
    (bounds_strategy(), vec3_in(0.3, 1.5), vec3_in(0.5, 1.5)).prop_filter_map(
        "invalid config",
        |(b, s, scale)| GridConfig::new(b, s, Transform::default().with_scale(scale)).ok(),
    )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn neighbors_are_mutual(cfg in config_strategy()) {
        let g = VoxelGrid::build(cfg);
        for a in g.sorted_indices() {
            for n in g.neighbors(a) {
                let Some(b) = n.cell() else { continue };
                if !g.lattice().is_addressable(g.mapper(), b) {
                    continue;
                }
                let back: Vec<VoxelIndex> = g
                    .neighbors(b)
                    .iter()
                    .filter(|m| m.face == n.face.opposite())
                    .filter_map(Neighbor::cell)
                    .collect();
                prop_assert!(back.contains(&a), "{} -> {} via {:?}, back {:?}", a, b, n.face, back);
            }
        }
    }

    #[test]
    fn neighbor_cells_are_addressable(cfg in config_strategy()) {
        let g = VoxelGrid::build(cfg);
        for a in g.sorted_indices() {
            for n in g.neighbors(a) {
                if let Some(b) = n.cell() {
                    prop_assert!(g.lattice().is_addressable(g.mapper(), b) || b.u > a.u);
                }
            }
        }
    }

    #[test]
    fn exposure_matches_missing_neighbors(cfg in config_strategy()) {
        let g = VoxelGrid::build(cfg);
        for ix in g.sorted_indices() {
            let missing = g.neighbors_missing(ix);
            let exposure = g.get(ix).unwrap().exposure();
            for face in exposure.faces().iter() {
                prop_assert!(missing.iter().any(|n| n.face == face));
            }
            for n in &missing {
                let normal = g.mapper().face_normal(ix, n.face);
                prop_assert_eq!(exposure.is_exposed(n.face), normal != Vec3::ZERO);
            }
        }
    }

    #[test]
    fn lone_voxel_exposes_every_open_face(
        cfg in config_strategy(),
        pick_u in any::<prop::sample::Index>(),
        pick_v in any::<prop::sample::Index>(),
        pick_w in any::<prop::sample::Index>(),
    ) {
        let mut g = VoxelGrid::empty(cfg);
        let (m, l) = (g.mapper().clone(), g.lattice().clone());
        prop_assume!(l.u_count() > 0);
        let u = pick_u.index(l.u_count() as usize) as u32;
        let v = pick_v.index(l.v_count(&m, u).max(1) as usize) as u32;
        let w = pick_w.index(l.w_count(&m, u, v).max(1) as usize) as u32;
        let ix = VoxelIndex::new(u, v, w);
        prop_assert!(g.place_voxel(ix, BlockType::Dirt));
        let exposure = g.get(ix).unwrap().exposure().clone();
        for face in Face::ALL {
            let open = g.neighbors(ix).iter().any(|n| n.face == face);
            let normal = m.face_normal(ix, face);
            prop_assert_eq!(exposure.is_exposed(face), open && normal != Vec3::ZERO, "{} {:?}", ix, face);
        }
    }

    #[test]
    fn break_and_replace_round_trips(cfg in config_strategy(), pick in any::<prop::sample::Index>()) {
        let mut g = VoxelGrid::build(cfg);
        let indices = g.sorted_indices();
        prop_assume!(!indices.is_empty());
        let ix = indices[pick.index(indices.len())];
        let block = g.get(ix).unwrap().block();
        let snapshot: Vec<_> = indices.iter().map(|i| g.get(*i).unwrap().exposure().clone()).collect();
        let h = g.handle(ix).unwrap();
        prop_assert!(g.break_voxel(h));
        prop_assert!(g.place_voxel(ix, block));
        let restored: Vec<_> = indices.iter().map(|i| g.get(*i).unwrap().exposure().clone()).collect();
        prop_assert_eq!(snapshot, restored);
    }
}
