use proptest::prelude::*;
use terrane_blocks::{BlockType, TextureAtlas};
use terrane_geom::{Transform, Vec3};
use terrane_grid::exposure::NORMAL_MATCH_COS;
use terrane_grid::{Bounds, GridConfig, VoxelGrid, VoxelIndex};
use terrane_mesh_cpu::VoxelBody;

fn bounds_strategy() -> impl Strategy<Value = Bounds> {
    prop_oneof![
        (1.0f32..3.0, 1.0f32..3.0, 1.0f32..3.0).prop_map(|(x, y, z)| Bounds::Box {
            size: Vec3::new(x, y, z)
        }),
        (1.0f32..5.0, 1.0f32..2.0).prop_map(|(radius, height)| Bounds::Capsule { radius, height }),
        (1.0f32..5.0).prop_map(|radius| Bounds::Sphere { radius }),
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

fn assert_mesh_tracks_exposure(body: &VoxelBody, ix: VoxelIndex) -> Result<(), TestCaseError> {
    let mesh = body.mesh(ix).unwrap();
    let exposure = body.grid().get(ix).unwrap().exposure();
    prop_assert_eq!(mesh.faces, exposure.faces(), "{}", ix);
    for face in mesh.faces.iter() {
        let n = mesh.face_normals[face.index()];
        prop_assert!(exposure.normals().iter().any(|e| e.dot(n) > NORMAL_MATCH_COS));
    }
    prop_assert_eq!(body.collider(ix).is_some(), !exposure.is_hidden());
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn rendered_faces_track_exposure(
        cfg in config_strategy(),
        breaks in prop::collection::vec(any::<prop::sample::Index>(), 0..6),
    ) {
        let mut body = VoxelBody::new(VoxelGrid::build(cfg), TextureAtlas::standard());
        for pick in breaks {
            let indices = body.grid().sorted_indices();
            if indices.is_empty() {
                break;
            }
            let h = body.grid().handle(indices[pick.index(indices.len())]).unwrap();
            prop_assert!(body.break_voxel(h));
        }
        for ix in body.grid().sorted_indices() {
            assert_mesh_tracks_exposure(&body, ix)?;
        }
    }

    #[test]
    fn lone_sphere_voxel_renders_exactly_its_exposed_faces(
        radius in 2.0f32..8.0,
        s in vec3_in(0.3, 1.5),
        pick_u in any::<prop::sample::Index>(),
        pick_v in any::<prop::sample::Index>(),
        pick_w in any::<prop::sample::Index>(),
        at_pole in any::<bool>(),
    ) {
        let cfg = GridConfig::new(Bounds::Sphere { radius }, s, Transform::default()).unwrap();
        let mut body = VoxelBody::new(VoxelGrid::empty(cfg), TextureAtlas::standard());
        let m = body.grid().mapper().clone();
        let shells = body.grid().lattice().u_count();
        prop_assume!(shells > 0);
        let u = pick_u.index(shells as usize) as u32;
        let bands = m.band_count(u).unwrap();
        let v = if at_pole { bands - 1 } else { pick_v.index(bands as usize) as u32 };
        let w = pick_w.index(m.slice_count(u, v).unwrap() as usize) as u32;
        let ix = VoxelIndex::new(u, v, w);
        prop_assert!(body.place_voxel(ix, BlockType::Dirt));
        assert_mesh_tracks_exposure(&body, ix)?;
    }
}
