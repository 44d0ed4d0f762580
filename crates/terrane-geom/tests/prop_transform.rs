use terrane_geom::{Aabb, Quat, Transform, Vec3};
use proptest::prelude::*;

fn approx_abs_rel(a: f32, b: f32, atol: f32, rtol: f32) -> bool {
    let diff = (a - b).abs();
    let scale = a.abs().max(b.abs());
    diff <= atol + rtol * scale
}

fn vapprox_abs_rel(a: Vec3, b: Vec3, atol: f32, rtol: f32) -> bool {
    approx_abs_rel(a.x, b.x, atol, rtol)
        && approx_abs_rel(a.y, b.y, atol, rtol)
        && approx_abs_rel(a.z, b.z, atol, rtol)
}

fn coord() -> impl Strategy<Value = f32> {
    -1_000.0f32..1_000.0
}

fn arb_vec3() -> impl Strategy<Value = Vec3> {
    (coord(), coord(), coord()).prop_map(|(x, y, z)| Vec3::new(x, y, z))
}

fn arb_scale() -> impl Strategy<Value = Vec3> {
    (0.05f32..20.0, 0.05f32..20.0, 0.05f32..20.0).prop_map(|(x, y, z)| Vec3::new(x, y, z))
}

fn arb_axis() -> impl Strategy<Value = Vec3> {
    arb_vec3().prop_filter("axis not tiny", |v| v.length() > 1e-2)
}

proptest! {
    // Rotation preserves length
    #[test]
    fn quat_rotation_preserves_length(axis in arb_axis(), angle in -6.3f32..6.3, v in arb_vec3()) {
        let q = Quat::from_axis_angle(axis, angle);
        let r = q.rotate(v);
        prop_assert!(approx_abs_rel(r.length(), v.length(), 1e-3, 1e-4));
    }

    // Rotating the axis itself is a no-op
    #[test]
    fn quat_fixes_its_axis(axis in arb_axis(), angle in -6.3f32..6.3) {
        let q = Quat::from_axis_angle(axis, angle);
        let n = axis.normalized();
        prop_assert!(vapprox_abs_rel(q.rotate(n), n, 1e-4, 1e-4));
    }

    // Component-wise scale then unscale returns the input
    #[test]
    fn elem_scale_roundtrip(v in arb_vec3(), s in arb_scale()) {
        prop_assert!(vapprox_abs_rel(v.mul_elem(s).div_elem(s), v, 1e-4, 1e-5));
    }

    // Identity rotation: transform is scale + translate
    #[test]
    fn transform_identity_rotation(pos in arb_vec3(), s in arb_scale(), p in arb_vec3()) {
        let t = Transform::from_position(pos).with_scale(s);
        prop_assert!(vapprox_abs_rel(t.transform_point(p), pos + p.mul_elem(s), 1e-3, 1e-5));
    }

    // Box built from points contains every point
    #[test]
    fn aabb_contains_its_points(pts in proptest::collection::vec(arb_vec3(), 1..16)) {
        let bb = Aabb::from_points(pts.iter().copied());
        for p in pts {
            prop_assert!(p.x >= bb.min.x && p.x <= bb.max.x);
            prop_assert!(p.y >= bb.min.y && p.y <= bb.max.y);
            prop_assert!(p.z >= bb.min.z && p.z <= bb.max.z);
        }
    }
}
