//! End-to-end scenarios: unit spheres on the x axis combined under each
//! operator, probed with axis-aligned rays whose expected crossings are
//! known exactly.

use std::sync::Arc;

use approx::assert_relative_eq;

use csgray::{
    geometry::{Ray, Transform},
    math::{Point3f, Vec3f},
    primitives::{BoolOp, Composite, Primitive, Sphere},
    shading::{EyelightShader, FlatShader, Shader, ShaderEnum},
    solids::Solid,
    Float,
};

fn sphere_solid(center: Point3f, color: Vec3f) -> (Solid, Arc<ShaderEnum>) {
    let shader = Arc::new(ShaderEnum::Flat(FlatShader::new(color)));
    let mut solid = Solid::new(center);
    solid.push(Sphere::build(shader.clone(), center, 1.0));
    (solid, shader)
}

fn red_blue_pair(b_center: Point3f) -> (Solid, Arc<ShaderEnum>, Solid, Arc<ShaderEnum>) {
    let (a, a_shader) = sphere_solid(Point3f::ZERO, Vec3f::new(1.0, 0.0, 0.0));
    let (b, b_shader) = sphere_solid(b_center, Vec3f::new(0.0, 0.0, 1.0));
    (a, a_shader, b, b_shader)
}

fn csg(a: &Solid, b: &Solid, op: BoolOp) -> Composite {
    Composite::builder()
        .solid_a(a)
        .solid_b(b)
        .op(op)
        .build()
        .unwrap()
}

fn nearest(c: &Composite, o: Point3f, dir: Vec3f) -> Option<Ray> {
    let mut ray = Ray::new(o, dir);
    c.intersect_nearest(&mut ray).then_some(ray)
}

fn hit_shader(ray: &Ray) -> Arc<ShaderEnum> {
    ray.hit
        .as_ref()
        .expect("ray should hold a hit")
        .read()
        .unwrap()
        .shader()
        .expect("hit primitive should carry a shader")
}

fn hit_normal_dot_dir(ray: &Ray) -> Float {
    let n = ray.hit.as_ref().unwrap().read().unwrap().normal(ray);
    n.dot_v(ray.dir)
}

#[test]
fn e1_union_hits_the_first_surface() {
    let (a, a_shader, b, _) = red_blue_pair(Point3f::new(0.5, 0.0, 0.0));
    let c = csg(&a, &b, BoolOp::Union);

    let ray = nearest(&c, Point3f::new(-5.0, 0.0, 0.0), Vec3f::new(1.0, 0.0, 0.0)).unwrap();
    assert_relative_eq!(ray.t, 4.0, max_relative = 1e-4);
    assert!(Arc::ptr_eq(&hit_shader(&ray), &a_shader));
    assert!(hit_normal_dot_dir(&ray) <= 1e-4);
}

#[test]
fn e2_intersection_starts_at_the_later_entry() {
    let (a, _, b, b_shader) = red_blue_pair(Point3f::new(0.5, 0.0, 0.0));
    let c = csg(&a, &b, BoolOp::Intersection);

    let ray = nearest(&c, Point3f::new(-5.0, 0.0, 0.0), Vec3f::new(1.0, 0.0, 0.0)).unwrap();
    assert_relative_eq!(ray.t, 4.5, max_relative = 1e-4);
    assert!(Arc::ptr_eq(&hit_shader(&ray), &b_shader));
}

#[test]
fn e3_difference_keeps_the_uncarved_entry() {
    let (a, a_shader, b, _) = red_blue_pair(Point3f::new(0.5, 0.0, 0.0));
    let c = csg(&a, &b, BoolOp::Difference);

    let ray = nearest(&c, Point3f::new(-5.0, 0.0, 0.0), Vec3f::new(1.0, 0.0, 0.0)).unwrap();
    assert_relative_eq!(ray.t, 4.0, max_relative = 1e-4);
    assert!(Arc::ptr_eq(&hit_shader(&ray), &a_shader));
    assert!(hit_normal_dot_dir(&ray) <= 1e-4);
}

#[test]
fn e4_difference_shows_the_carved_exit_with_a_flipped_normal() {
    // From +x the first visible surface of A - B is where B's interior
    // carves into A: B's exit at x = -0.5, so t = 5.5, with B's normal
    // reversed to face the ray.
    let (a, _, b, b_shader) = red_blue_pair(Point3f::new(0.5, 0.0, 0.0));
    let c = csg(&a, &b, BoolOp::Difference);

    let ray = nearest(&c, Point3f::new(5.0, 0.0, 0.0), Vec3f::new(-1.0, 0.0, 0.0)).unwrap();
    assert_relative_eq!(ray.t, 5.5, max_relative = 1e-4);
    assert!(Arc::ptr_eq(&hit_shader(&ray), &b_shader));

    // B's outward normal at x = -0.5 points toward -x; the proxy reverses
    // it to face the incoming ray.
    let n = ray.hit.as_ref().unwrap().read().unwrap().normal(&ray);
    assert_relative_eq!(n.x, 1.0, epsilon = 1e-4);
    assert!(n.dot_v(ray.dir) <= 1e-4);
}

#[test]
fn e5_disjoint_intersection_always_misses() {
    let (a, _, b, _) = red_blue_pair(Point3f::new(10.0, 0.0, 0.0));
    let c = csg(&a, &b, BoolOp::Intersection);
    assert!(c.bounds().is_empty());

    for (o, dir) in [
        (Point3f::new(-5.0, 0.0, 0.0), Vec3f::new(1.0, 0.0, 0.0)),
        (Point3f::new(5.0, 0.0, 0.0), Vec3f::new(1.0, 0.0, 0.0)),
        (Point3f::new(0.0, -5.0, 0.0), Vec3f::new(0.0, 1.0, 0.0)),
    ] {
        assert!(nearest(&c, o, dir).is_none());
    }
}

#[test]
fn e6_union_from_inside_exits_at_the_far_boundary() {
    let (a, _, b, b_shader) = red_blue_pair(Point3f::new(0.5, 0.0, 0.0));
    let c = csg(&a, &b, BoolOp::Union);

    // Origin inside both spheres; the union is left through B's exit.
    let ray = nearest(&c, Point3f::new(0.1, 0.0, 0.0), Vec3f::new(1.0, 0.0, 0.0)).unwrap();
    assert_relative_eq!(ray.t, 1.4, max_relative = 1e-4);
    assert!(Arc::ptr_eq(&hit_shader(&ray), &b_shader));
    // An exit surface committed by a nearest query faces the ray.
    assert!(hit_normal_dot_dir(&ray) <= 1e-4);
}

#[test]
fn furthest_mirrors_report_the_far_boundary() {
    let (a, _, b, _) = red_blue_pair(Point3f::new(0.5, 0.0, 0.0));
    let o = Point3f::new(-5.0, 0.0, 0.0);
    let dir = Vec3f::new(1.0, 0.0, 0.0);

    let mut union_far = Ray::new(o, dir);
    assert!(csg(&a, &b, BoolOp::Union).intersect_furthest(&mut union_far));
    assert_relative_eq!(union_far.t, 6.5, max_relative = 1e-4);

    let mut isect_far = Ray::new(o, dir);
    assert!(csg(&a, &b, BoolOp::Intersection).intersect_furthest(&mut isect_far));
    assert_relative_eq!(isect_far.t, 6.0, max_relative = 1e-4);

    let mut diff_far = Ray::new(o, dir);
    assert!(csg(&a, &b, BoolOp::Difference).intersect_furthest(&mut diff_far));
    // A - B ends where B begins carving, at x = -0.5
    assert_relative_eq!(diff_far.t, 4.5, max_relative = 1e-4);
}

#[test]
fn nested_composites_behave_like_leaves() {
    let (a, a_shader, b, _) = red_blue_pair(Point3f::new(0.5, 0.0, 0.0));
    let union = csg(&a, &b, BoolOp::Union);
    let wrapped = Solid::from_primitive(union.into_prim());

    // (A u B) - B leaves exactly the A - B sliver [4.0, 4.5) on this ray.
    let c = csg(&wrapped, &b, BoolOp::Difference);
    let ray = nearest(&c, Point3f::new(-5.0, 0.0, 0.0), Vec3f::new(1.0, 0.0, 0.0)).unwrap();
    assert_relative_eq!(ray.t, 4.0, max_relative = 1e-4);
    assert!(Arc::ptr_eq(&hit_shader(&ray), &a_shader));

    // Deeper nesting: ((A u B) - B) n A still answers both query kinds.
    let wrapped2 = Solid::from_primitive(c.into_prim());
    let c2 = csg(&wrapped2, &a, BoolOp::Intersection);
    let near = nearest(&c2, Point3f::new(-5.0, 0.0, 0.0), Vec3f::new(1.0, 0.0, 0.0)).unwrap();
    assert_relative_eq!(near.t, 4.0, max_relative = 1e-4);
}

#[test]
fn translated_composite_shifts_its_hits() {
    let (a, _, b, _) = red_blue_pair(Point3f::new(0.5, 0.0, 0.0));
    let mut c = csg(&a, &b, BoolOp::Union);

    c.transform(&Transform::translate(Vec3f::new(0.0, 0.0, 3.0)));

    assert!(nearest(&c, Point3f::new(-5.0, 0.0, 0.0), Vec3f::new(1.0, 0.0, 0.0)).is_none());
    let ray = nearest(&c, Point3f::new(-5.0, 0.0, 3.0), Vec3f::new(1.0, 0.0, 0.0)).unwrap();
    assert_relative_eq!(ray.t, 4.0, max_relative = 1e-4);

    // The pivot followed the translation.
    assert_relative_eq!(c.origin().z, 3.0, epsilon = 1e-4);
}

#[test]
fn occluded_composite_leaves_the_ray_alone() {
    let (a, _, b, _) = red_blue_pair(Point3f::new(0.5, 0.0, 0.0));
    let c = csg(&a, &b, BoolOp::Union);

    let committed = nearest(&c, Point3f::new(-5.0, 0.0, 0.0), Vec3f::new(1.0, 0.0, 0.0)).unwrap();

    let mut blocked = Ray::new(Point3f::new(-5.0, 0.0, 0.0), Vec3f::new(1.0, 0.0, 0.0));
    blocked.t = committed.t - 0.5;
    blocked.hit = committed.hit.clone();
    assert!(!c.intersect_nearest(&mut blocked));
    assert_relative_eq!(blocked.t, committed.t - 0.5);
}

#[test]
fn difference_surface_shades_with_the_subtrahend_material() {
    let (a, _) = sphere_solid(Point3f::ZERO, Vec3f::new(1.0, 0.0, 0.0));

    // Give B an eyelight shader so the flipped proxy's shading is
    // observable end to end.
    let eyelight = Arc::new(ShaderEnum::Eyelight(EyelightShader::new(Vec3f::new(
        1.0, 1.0, 1.0,
    ))));
    let mut b = Solid::new(Point3f::new(0.5, 0.0, 0.0));
    b.push(Sphere::build(
        eyelight.clone(),
        Point3f::new(0.5, 0.0, 0.0),
        1.0,
    ));

    let c = csg(&a, &b, BoolOp::Difference);
    let ray = nearest(&c, Point3f::new(5.0, 0.0, 0.0), Vec3f::new(-1.0, 0.0, 0.0)).unwrap();

    let shader = hit_shader(&ray);
    assert!(Arc::ptr_eq(&shader, &eyelight));
    // Head-on hit: |n . dir| = 1, so eyelight shading returns full color.
    let shaded = shader.shade(&ray);
    assert_relative_eq!(shaded.x, 1.0, epsilon = 1e-3);
}
