//! Four-spring trampoline.
//!
//! A static base plate and a dynamic bounce plate joined at their four
//! corners by [`DistanceJoint`]s sharing one stiffness and one damping.
//! The two plates stay with the assembly until [`Trampoline::add_to_world`]
//! hands them to the [`PhysicsWorld`]; the springs stay with the assembly for
//! its whole life.

use log::{info, warn};
use rapier3d::prelude::*;

use crate::components::actor::{Actor, ActorId};
use crate::components::joint::DistanceJoint;
use crate::components::prefabs;
use crate::resources::physicsworld::PhysicsWorld;

/// Half thickness of both plates.
pub const TRAMPOLINE_THICKNESS: Real = 0.1;

const CORNERS: [(Real, Real); 4] = [(1.0, 1.0), (1.0, -1.0), (-1.0, 1.0), (-1.0, -1.0)];

#[derive(Debug)]
pub struct Trampoline {
    bottom_id: ActorId,
    top_id: ActorId,
    pending: Option<(Actor, Actor)>,
    springs: Vec<DistanceJoint>,
}

impl Trampoline {
    /// Build the plates around `pose` with half extents `dimensions` and wire
    /// the four corner springs.
    pub fn new(pose: Isometry<Real>, dimensions: Vector<Real>, stiffness: Real, damping: Real) -> Self {
        let thickness = TRAMPOLINE_THICKNESS;
        let centre = pose.translation.vector;
        let plate = vector![dimensions.x, thickness, dimensions.z];
        let at = |offset: Vector<Real>| Isometry::from_parts((centre + offset).into(), pose.rotation);

        let mut bottom = prefabs::static_box(at(vector![0.0, thickness, 0.0]), plate);
        let mut top = prefabs::dynamic_box(at(vector![0.0, dimensions.y + thickness, 0.0]), plate, 1.0);
        bottom.set_name("trampoline-bottom");
        top.set_name("trampoline-top");

        let springs = CORNERS
            .iter()
            .map(|&(sx, sz)| {
                let frame0 = at(vector![sx * dimensions.x, thickness, sz * dimensions.z]);
                let frame1 = at(vector![sx * dimensions.x, -dimensions.y, sz * dimensions.z]);
                let mut spring = DistanceJoint::new(Some(&bottom), frame0, &top, frame1);
                spring.set_stiffness(stiffness);
                spring.set_damping(damping);
                spring
            })
            .collect();

        Self {
            bottom_id: bottom.id(),
            top_id: top.id(),
            pending: Some((bottom, top)),
            springs,
        }
    }

    pub fn bottom(&self) -> ActorId {
        self.bottom_id
    }

    pub fn top(&self) -> ActorId {
        self.top_id
    }

    /// Base plate descriptor, until the assembly is added to the world.
    pub fn bottom_actor_mut(&mut self) -> Option<&mut Actor> {
        self.pending.as_mut().map(|(bottom, _)| bottom)
    }

    /// Bounce plate descriptor, until the assembly is added to the world.
    pub fn top_actor_mut(&mut self) -> Option<&mut Actor> {
        self.pending.as_mut().map(|(_, top)| top)
    }

    pub fn is_added(&self) -> bool {
        self.pending.is_none()
    }

    /// Move both plates into `physics`. A second call does nothing.
    pub fn add_to_world(&mut self, physics: &mut PhysicsWorld) {
        match self.pending.take() {
            Some((bottom, top)) => {
                physics.add_actor(bottom);
                physics.add_actor(top);
                info!("Trampoline added ({} springs)", self.springs.len());
            }
            None => warn!("Trampoline already added to the world"),
        }
    }

    pub fn springs(&self) -> &[DistanceJoint] {
        &self.springs
    }

    pub fn set_stiffness(&mut self, stiffness: Real) {
        self.springs.iter_mut().for_each(|s| s.set_stiffness(stiffness));
    }

    pub fn set_damping(&mut self, damping: Real) {
        self.springs.iter_mut().for_each(|s| s.set_damping(damping));
    }

    /// Apply every spring for one step.
    pub fn apply_springs(&self, physics: &mut PhysicsWorld, dt: Real) {
        for spring in &self.springs {
            spring.apply(physics, dt);
        }
    }
}
