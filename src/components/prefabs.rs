//! Ready-made actors.
//!
//! Every geometry-specific actor of the course is a plain function returning
//! a configured [`Actor`]. Multi-shape pieces (border, bumpers, spinner) are
//! built by creating the same box several times and then placing each shape
//! by index.

use std::f32::consts::{FRAC_PI_2, FRAC_PI_4, PI};

use rapier3d::na::UnitQuaternion;
use rapier3d::prelude::*;

use crate::components::actor::{Actor, Geometry};
use crate::resources::cooking::{CookingError, DEFAULT_VERTEX_LIMIT, cook_convex, cook_triangle_mesh};

/// Half extents of the default box (also the hole).
pub const DEFAULT_BOX_HALF_EXTENTS: [Real; 3] = [3.0, 0.3, 3.0];

const RECTANGLE_HALF_EXTENTS: [Real; 3] = [0.1, 10.0, 10.0];
const SPINNER_HALF_EXTENTS: [Real; 3] = [0.9, 7.0, 0.5];
const BORDER_HALF_EXTENTS: [Real; 3] = [0.5, 10.0, 60.0];
const CLUB_HALF_EXTENTS: [Real; 3] = [4.0, 15.0, 1.0];

fn rotated(x: Real, y: Real, z: Real, axis_angle: Vector<Real>) -> Isometry<Real> {
    Isometry::new(vector![x, y, z], axis_angle)
}

fn cuboid(half_extents: [Real; 3]) -> Geometry {
    Geometry::cuboid(half_extents[0], half_extents[1], half_extents[2])
}

/// Static plane `normal . p + distance = 0`.
pub fn plane(normal: Vector<Real>, distance: Real) -> Actor {
    let normal = normal.normalize();
    let rotation = UnitQuaternion::rotation_between(&Vector::y(), &normal)
        .unwrap_or_else(|| UnitQuaternion::from_axis_angle(&Vector::x_axis(), PI));
    let pose = Isometry::from_parts((-normal * distance).into(), rotation);

    let mut actor = Actor::new_static(pose);
    actor.create_shape(Geometry::Plane, None);
    actor.set_name("plane");
    actor
}

/// Horizontal ground plane through the origin.
pub fn ground() -> Actor {
    plane(Vector::y(), 0.0)
}

pub fn sphere(pose: Isometry<Real>, radius: Real, density: Real) -> Actor {
    let mut actor = Actor::new_dynamic(pose);
    actor.create_shape(Geometry::Sphere { radius }, Some(density));
    actor
}

pub fn static_box(pose: Isometry<Real>, half_extents: Vector<Real>) -> Actor {
    let mut actor = Actor::new_static(pose);
    actor.create_shape(Geometry::Box { half_extents }, None);
    actor
}

pub fn dynamic_box(pose: Isometry<Real>, half_extents: Vector<Real>, density: Real) -> Actor {
    let mut actor = Actor::new_dynamic(pose);
    actor.create_shape(Geometry::Box { half_extents }, Some(density));
    actor
}

pub fn capsule(pose: Isometry<Real>, radius: Real, half_height: Real, density: Real) -> Actor {
    let mut actor = Actor::new_dynamic(pose);
    actor.create_shape(
        Geometry::Capsule {
            radius,
            half_height,
        },
        Some(density),
    );
    actor
}

/// Dynamic convex hull around `points`. Cooking failures abort construction.
pub fn convex_mesh(points: &[Point<Real>], pose: Isometry<Real>, density: Real) -> Result<Actor, CookingError> {
    let mesh = cook_convex(points, DEFAULT_VERTEX_LIMIT)?;
    let mut actor = Actor::new_dynamic(pose);
    actor.create_shape(Geometry::ConvexMesh(mesh), Some(density));
    Ok(actor)
}

/// Static triangle mesh. `triangles` holds three point indices per face.
pub fn triangle_mesh(points: &[Point<Real>], triangles: &[u32], pose: Isometry<Real>) -> Result<Actor, CookingError> {
    let mesh = cook_triangle_mesh(points, triangles)?;
    let mut actor = Actor::new_static(pose);
    actor.create_shape(Geometry::TriangleMesh(mesh), None);
    Ok(actor)
}

pub const PYRAMID_VERTICES: [[Real; 3]; 5] = [
    [0.0, 1.0, 0.0],
    [1.0, 0.0, 0.0],
    [-1.0, 0.0, 0.0],
    [0.0, 0.0, 1.0],
    [0.0, 0.0, -1.0],
];

pub const PYRAMID_TRIANGLES: [u32; 18] = [1, 4, 0, 3, 1, 0, 2, 3, 0, 4, 2, 0, 3, 2, 1, 2, 4, 1];

fn pyramid_points() -> Vec<Point<Real>> {
    PYRAMID_VERTICES
        .iter()
        .map(|v| point![v[0], v[1], v[2]])
        .collect()
}

/// Dynamic square pyramid as a convex hull.
pub fn pyramid(pose: Isometry<Real>, density: Real) -> Result<Actor, CookingError> {
    convex_mesh(&pyramid_points(), pose, density)
}

/// Static square pyramid as a triangle mesh.
pub fn pyramid_static(pose: Isometry<Real>) -> Result<Actor, CookingError> {
    triangle_mesh(&pyramid_points(), &PYRAMID_TRIANGLES, pose)
}

/// Four thin bumper walls scattered over the course.
pub fn rectangles(pose: Isometry<Real>) -> Actor {
    let mut actor = Actor::new_static(pose);
    for _ in 0..4 {
        actor.create_shape(cuboid(RECTANGLE_HALF_EXTENTS), None);
    }
    actor.set_shape_pose(0, rotated(47.0, 0.0, -32.0, vector![0.0, FRAC_PI_4, 0.0]));
    actor.set_shape_pose(1, rotated(47.0, 0.0, 63.0, vector![0.0, PI / 1.4, 0.0]));
    actor.set_shape_pose(2, Isometry::translation(-30.0, 0.0, 30.0));
    actor.set_shape_pose(3, Isometry::translation(40.0, 0.0, 1.0));
    actor.set_name("rectangles");
    actor
}

/// Two crossed panels forming a rotor.
pub fn spinner(pose: Isometry<Real>) -> Actor {
    let mut actor = Actor::new_dynamic(pose);
    actor.create_shape(cuboid(SPINNER_HALF_EXTENTS), Some(1.0));
    actor.create_shape(cuboid(SPINNER_HALF_EXTENTS), Some(1.0));
    actor.set_shape_pose(0, rotated(2.0, 5.0, 0.0, vector![FRAC_PI_2, 0.0, 0.0]));
    actor.set_shape_pose(1, Isometry::translation(2.0, 5.0, 0.0));
    actor.set_name("spinner");
    actor
}

/// The four walls enclosing the course.
pub fn border(pose: Isometry<Real>) -> Actor {
    let mut actor = Actor::new_static(pose);
    for _ in 0..4 {
        actor.create_shape(cuboid(BORDER_HALF_EXTENTS), None);
    }
    actor.set_shape_pose(0, Isometry::translation(55.0, 0.0, 15.0));
    actor.set_shape_pose(1, Isometry::translation(-55.0, 0.0, 15.0));
    actor.set_shape_pose(2, rotated(0.0, 0.0, 70.0, vector![0.0, FRAC_PI_2, 0.0]));
    actor.set_shape_pose(3, rotated(0.0, 0.0, -40.0, vector![0.0, FRAC_PI_2, 0.0]));
    actor.set_name("border");
    actor
}

/// Long paddle lying flat, swung by a driven hinge.
pub fn club(pose: Isometry<Real>) -> Actor {
    let mut actor = Actor::new_dynamic(pose);
    actor.create_shape(cuboid(CLUB_HALF_EXTENTS), Some(1.0));
    actor.set_shape_pose(0, Isometry::rotation(vector![FRAC_PI_2, 0.0, 0.0]));
    actor.set_name("club");
    actor
}
