//! Composite actors.
//!
//! An [`Actor`] is one rigid body (static or dynamic) built from an ordered
//! list of [`Shape`]s. Each shape has its own local pose, material, trigger
//! flag and filter words. Shapes are only ever appended: the index returned by
//! creation order is how callers address a shape afterwards, so shapes are
//! never reordered or removed.
//!
//! Actors are plain descriptors until they are handed to
//! [`PhysicsWorld::add_actor`](crate::resources::physicsworld::PhysicsWorld::add_actor),
//! which realises the body and its colliders in the engine.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use rapier3d::prelude::*;
use serde::Serialize;
use smallvec::SmallVec;

use crate::components::collision::{FilterAttributes, FilterData, FilterInput};
use crate::components::tint::Tint;
use crate::resources::cooking::CookedMesh;
use crate::resources::material::MaterialId;

/// Density used when a dynamic shape is created without one.
pub const DEFAULT_DENSITY: Real = 1.0;

static NEXT_ACTOR_ID: AtomicU64 = AtomicU64::new(1);

/// Stable identity of an actor, assigned at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ActorId(u64);

impl ActorId {
    fn next() -> Self {
        ActorId(NEXT_ACTOR_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "actor#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum BodyKind {
    Static,
    Dynamic,
}

/// Geometry type tag, used where the cooked data itself is not needed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ShapeKind {
    Plane,
    Sphere,
    Box,
    Capsule,
    ConvexMesh,
    TriangleMesh,
}

/// Geometric primitive of a shape, expressed in the shape's local frame.
#[derive(Debug, Clone)]
pub enum Geometry {
    /// Half-space below the local XZ plane (outward normal +Y).
    Plane,
    Sphere { radius: Real },
    Box { half_extents: Vector<Real> },
    /// Capsule lying along the local X axis.
    Capsule { radius: Real, half_height: Real },
    ConvexMesh(CookedMesh),
    TriangleMesh(CookedMesh),
}

impl Geometry {
    pub fn cuboid(hx: Real, hy: Real, hz: Real) -> Self {
        Geometry::Box {
            half_extents: vector![hx, hy, hz],
        }
    }

    pub fn kind(&self) -> ShapeKind {
        match self {
            Geometry::Plane => ShapeKind::Plane,
            Geometry::Sphere { .. } => ShapeKind::Sphere,
            Geometry::Box { .. } => ShapeKind::Box,
            Geometry::Capsule { .. } => ShapeKind::Capsule,
            Geometry::ConvexMesh(_) => ShapeKind::ConvexMesh,
            Geometry::TriangleMesh(_) => ShapeKind::TriangleMesh,
        }
    }

    /// Engine shape for this geometry.
    pub fn shared_shape(&self) -> SharedShape {
        match self {
            Geometry::Plane => SharedShape::halfspace(Vector::y_axis()),
            Geometry::Sphere { radius } => SharedShape::ball(*radius),
            Geometry::Box { half_extents } => {
                SharedShape::cuboid(half_extents.x, half_extents.y, half_extents.z)
            }
            Geometry::Capsule {
                radius,
                half_height,
            } => SharedShape::capsule_x(*half_height, *radius),
            Geometry::ConvexMesh(mesh) | Geometry::TriangleMesh(mesh) => mesh.shape().clone(),
        }
    }
}

/// One collider of a composite actor.
#[derive(Debug, Clone)]
pub struct Shape {
    geometry: Geometry,
    local_pose: Isometry<Real>,
    material: MaterialId,
    trigger: bool,
    filter: FilterData,
    density: Real,
}

impl Shape {
    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    pub fn kind(&self) -> ShapeKind {
        self.geometry.kind()
    }

    pub fn local_pose(&self) -> &Isometry<Real> {
        &self.local_pose
    }

    pub fn set_local_pose(&mut self, pose: Isometry<Real>) {
        self.local_pose = pose;
    }

    pub fn material(&self) -> MaterialId {
        self.material
    }

    pub fn set_material(&mut self, material: MaterialId) {
        self.material = material;
    }

    pub fn is_trigger(&self) -> bool {
        self.trigger
    }

    pub fn set_trigger(&mut self, trigger: bool) {
        self.trigger = trigger;
    }

    pub fn filter(&self) -> FilterData {
        self.filter
    }

    pub fn set_filter(&mut self, filter: FilterData) {
        self.filter = filter;
    }

    pub fn density(&self) -> Real {
        self.density
    }

    /// What the filter shader sees for this shape on a body of `kind`.
    pub fn filter_input(&self, kind: BodyKind) -> FilterInput {
        let mut attributes = match kind {
            BodyKind::Static => FilterAttributes::STATIC_BODY,
            BodyKind::Dynamic => FilterAttributes::DYNAMIC_BODY,
        };
        if self.trigger {
            attributes |= FilterAttributes::TRIGGER;
        }
        FilterInput::new(attributes, self.filter)
    }
}

/// A static or dynamic body made of one or more shapes.
#[derive(Debug)]
pub struct Actor {
    id: ActorId,
    kind: BodyKind,
    pose: Isometry<Real>,
    shapes: SmallVec<[Shape; 4]>,
    material: MaterialId,
    tint: Tint,
    name: String,
}

impl Actor {
    pub fn new(kind: BodyKind, pose: Isometry<Real>) -> Self {
        let id = ActorId::next();
        Self {
            id,
            kind,
            pose,
            shapes: SmallVec::new(),
            material: MaterialId::DEFAULT,
            tint: Tint::default(),
            name: id.to_string(),
        }
    }

    pub fn new_static(pose: Isometry<Real>) -> Self {
        Self::new(BodyKind::Static, pose)
    }

    pub fn new_dynamic(pose: Isometry<Real>) -> Self {
        Self::new(BodyKind::Dynamic, pose)
    }

    /// Append a shape with an identity local pose.
    ///
    /// `density` feeds mass and inertia of dynamic actors and defaults to
    /// [`DEFAULT_DENSITY`]; static actors ignore it. The new shape starts
    /// with the actor's current material.
    pub fn create_shape(&mut self, geometry: Geometry, density: Option<Real>) {
        let density = match self.kind {
            BodyKind::Dynamic => density.unwrap_or(DEFAULT_DENSITY),
            BodyKind::Static => 0.0,
        };
        self.shapes.push(Shape {
            geometry,
            local_pose: Isometry::identity(),
            material: self.material,
            trigger: false,
            filter: FilterData::default(),
            density,
        });
    }

    pub fn shape(&self, index: usize) -> Option<&Shape> {
        self.shapes.get(index)
    }

    pub fn shape_mut(&mut self, index: usize) -> Option<&mut Shape> {
        self.shapes.get_mut(index)
    }

    pub fn shapes(&self) -> &[Shape] {
        &self.shapes
    }

    pub fn shape_count(&self) -> usize {
        self.shapes.len()
    }

    /// Set the local pose of an existing shape. Returns false for an unknown
    /// index.
    pub fn set_shape_pose(&mut self, index: usize, pose: Isometry<Real>) -> bool {
        match self.shapes.get_mut(index) {
            Some(shape) => {
                shape.set_local_pose(pose);
                true
            }
            None => false,
        }
    }

    pub fn id(&self) -> ActorId {
        self.id
    }

    pub fn kind(&self) -> BodyKind {
        self.kind
    }

    pub fn is_dynamic(&self) -> bool {
        self.kind == BodyKind::Dynamic
    }

    /// Pose the body is created with.
    pub fn pose(&self) -> &Isometry<Real> {
        &self.pose
    }

    pub fn material(&self) -> MaterialId {
        self.material
    }

    /// Assign `material` to the actor and to every shape it already has.
    pub fn set_material(&mut self, material: MaterialId) {
        self.material = material;
        for shape in self.shapes.iter_mut() {
            shape.set_material(material);
        }
    }

    pub fn tint(&self) -> Tint {
        self.tint
    }

    pub fn set_tint(&mut self, tint: Tint) {
        self.tint = tint;
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Flag (or unflag) every shape as a trigger.
    pub fn set_trigger(&mut self, trigger: bool) {
        for shape in self.shapes.iter_mut() {
            shape.set_trigger(trigger);
        }
    }

    /// Write `group` into word0 and `mask` into word1 of every shape.
    pub fn setup_filtering(&mut self, group: u32, mask: u32) {
        for shape in self.shapes.iter_mut() {
            shape.set_filter(FilterData::new(group, mask));
        }
    }

    /// World-space position of a point given in this actor's local frame,
    /// using the construction pose.
    pub fn local_to_world(&self, local: &Point<Real>) -> Point<Real> {
        self.pose * local
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::collision::FilterGroup;

    fn boxed() -> Geometry {
        Geometry::cuboid(0.5, 10.0, 60.0)
    }

    #[test]
    fn test_ids_are_unique() {
        let a = Actor::new_static(Isometry::identity());
        let b = Actor::new_static(Isometry::identity());
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn test_shapes_keep_creation_order() {
        let mut actor = Actor::new_static(Isometry::identity());
        actor.create_shape(boxed(), None);
        actor.create_shape(Geometry::Sphere { radius: 1.0 }, None);
        actor.create_shape(Geometry::Capsule {
            radius: 1.0,
            half_height: 2.0,
        }, None);

        assert_eq!(actor.shape_count(), 3);
        assert_eq!(actor.shape(0).unwrap().kind(), ShapeKind::Box);
        assert_eq!(actor.shape(1).unwrap().kind(), ShapeKind::Sphere);
        assert_eq!(actor.shape(2).unwrap().kind(), ShapeKind::Capsule);
        assert!(actor.shape(3).is_none());
    }

    #[test]
    fn test_post_configure_local_pose_by_index() {
        let mut actor = Actor::new_static(Isometry::identity());
        for _ in 0..4 {
            actor.create_shape(boxed(), None);
        }
        assert!(actor.set_shape_pose(2, Isometry::translation(0.0, 0.0, 70.0)));
        assert!(!actor.set_shape_pose(4, Isometry::identity()));

        let moved = actor.shape(2).unwrap().local_pose().translation.vector;
        assert_eq!(moved, vector![0.0, 0.0, 70.0]);
        assert_eq!(
            actor.shape(1).unwrap().local_pose().translation.vector,
            Vector::zeros()
        );
    }

    #[test]
    fn test_density_defaults_for_dynamic_and_ignored_for_static() {
        let mut dynamic = Actor::new_dynamic(Isometry::identity());
        dynamic.create_shape(boxed(), None);
        dynamic.create_shape(boxed(), Some(4.0));
        assert_eq!(dynamic.shape(0).unwrap().density(), DEFAULT_DENSITY);
        assert_eq!(dynamic.shape(1).unwrap().density(), 4.0);

        let mut fixed = Actor::new_static(Isometry::identity());
        fixed.create_shape(boxed(), Some(4.0));
        assert_eq!(fixed.shape(0).unwrap().density(), 0.0);
    }

    #[test]
    fn test_new_shapes_inherit_actor_material() {
        let mut actor = Actor::new_static(Isometry::identity());
        actor.create_shape(boxed(), None);
        assert_eq!(actor.shape(0).unwrap().material(), MaterialId::DEFAULT);
    }

    #[test]
    fn test_trigger_and_filtering_apply_to_all_shapes() {
        let mut actor = Actor::new_dynamic(Isometry::identity());
        actor.create_shape(boxed(), None);
        actor.create_shape(boxed(), None);
        actor.set_trigger(true);
        actor.setup_filtering(FilterGroup::ACTOR0, FilterGroup::ACTOR1);

        for shape in actor.shapes() {
            assert!(shape.is_trigger());
            assert_eq!(shape.filter(), FilterData::new(1, 2));
            let input = shape.filter_input(actor.kind());
            assert!(input.attributes.contains(FilterAttributes::TRIGGER));
            assert!(input.attributes.contains(FilterAttributes::DYNAMIC_BODY));
        }
    }

    #[test]
    fn test_single_shape_can_become_a_trigger() {
        let mut actor = Actor::new_static(Isometry::identity());
        actor.create_shape(boxed(), None);
        actor.create_shape(boxed(), None);
        actor.shape_mut(1).unwrap().set_trigger(true);
        assert!(actor.shape_mut(2).is_none());

        assert!(!actor.shape(0).unwrap().is_trigger());
        assert!(actor.shape(1).unwrap().is_trigger());
    }

    #[test]
    fn test_local_to_world_uses_pose() {
        let actor = Actor::new_static(Isometry::translation(1.0, 2.0, 3.0));
        let world = actor.local_to_world(&point![1.0, 0.0, 0.0]);
        assert_eq!(world, point![2.0, 2.0, 3.0]);
    }
}
