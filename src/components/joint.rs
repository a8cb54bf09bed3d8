//! Constraints between two actors, or between an actor and the world.
//!
//! A joint never owns bodies. It refers to actors by [`ActorId`] plus one
//! local frame per side; a missing first actor anchors the joint to the
//! immovable world frame.
//!
//! - [`DistanceJoint`] is a damped spring between two anchors, evaluated by
//!   [`DistanceJoint::apply`] once per step before the engine integrates.
//! - [`RevoluteJoint`] is an engine hinge about the X axis of its frames with
//!   an optional velocity drive and an optional angular limit pair.

use log::{debug, trace};
use rapier3d::prelude::*;

use crate::components::actor::{Actor, ActorId};
use crate::error::SceneError;
use crate::resources::physicsworld::PhysicsWorld;

/// Stiffness and damping a fresh distance joint starts with.
pub const DEFAULT_SPRING_STIFFNESS: Real = 1.0;
pub const DEFAULT_SPRING_DAMPING: Real = 1.0;

/// Spring forces below this magnitude do not wake a sleeping body.
const WAKE_FORCE_THRESHOLD: Real = 1.0e-3;
const MIN_SPRING_LENGTH: Real = 1.0e-6;

fn anchor_point(frame: &Isometry<Real>) -> Point<Real> {
    Point::from(frame.translation.vector)
}

/// Spring-enabled distance joint.
#[derive(Debug, Clone, PartialEq)]
pub struct DistanceJoint {
    actor0: Option<ActorId>,
    frame0: Isometry<Real>,
    actor1: ActorId,
    frame1: Isometry<Real>,
    stiffness: Real,
    damping: Real,
    rest_length: Real,
}

impl DistanceJoint {
    /// Join `actor0` (or the world) to `actor1`. The rest length is the
    /// distance between the two anchors with both actors at their
    /// construction poses.
    pub fn new(actor0: Option<&Actor>, frame0: Isometry<Real>, actor1: &Actor, frame1: Isometry<Real>) -> Self {
        let anchor0 = match actor0 {
            Some(actor) => actor.local_to_world(&anchor_point(&frame0)),
            None => anchor_point(&frame0),
        };
        let anchor1 = actor1.local_to_world(&anchor_point(&frame1));

        Self {
            actor0: actor0.map(Actor::id),
            frame0,
            actor1: actor1.id(),
            frame1,
            stiffness: DEFAULT_SPRING_STIFFNESS,
            damping: DEFAULT_SPRING_DAMPING,
            rest_length: (anchor1 - anchor0).norm(),
        }
    }

    pub fn stiffness(&self) -> Real {
        self.stiffness
    }

    pub fn set_stiffness(&mut self, stiffness: Real) {
        self.stiffness = stiffness;
    }

    pub fn damping(&self) -> Real {
        self.damping
    }

    pub fn set_damping(&mut self, damping: Real) {
        self.damping = damping;
    }

    pub fn rest_length(&self) -> Real {
        self.rest_length
    }

    pub fn actors(&self) -> (Option<ActorId>, ActorId) {
        (self.actor0, self.actor1)
    }

    pub fn local_frames(&self) -> (&Isometry<Real>, &Isometry<Real>) {
        (&self.frame0, &self.frame1)
    }

    /// Current world-space anchors, `None` if an actor is not in the world.
    pub fn world_anchors(&self, physics: &PhysicsWorld) -> Option<(Point<Real>, Point<Real>)> {
        let anchor0 = match self.actor0 {
            Some(id) => physics.body(id)?.position() * anchor_point(&self.frame0),
            None => anchor_point(&self.frame0),
        };
        let anchor1 = physics.body(self.actor1)?.position() * anchor_point(&self.frame1);
        Some((anchor0, anchor1))
    }

    pub fn current_length(&self, physics: &PhysicsWorld) -> Option<Real> {
        self.world_anchors(physics).map(|(a, b)| (b - a).norm())
    }

    /// Apply one step worth of spring and damper impulse to both ends.
    ///
    /// Fixed bodies and the world take no impulse. Returns false when either
    /// actor is missing.
    pub fn apply(&self, physics: &mut PhysicsWorld, dt: Real) -> bool {
        let Some((anchor0, anchor1)) = self.world_anchors(physics) else {
            return false;
        };
        let delta = anchor1 - anchor0;
        let length = delta.norm();
        if length < MIN_SPRING_LENGTH {
            return true;
        }
        let axis = delta / length;

        let velocity0 = self
            .actor0
            .and_then(|id| physics.body(id))
            .map(|rb| rb.velocity_at_point(&anchor0))
            .unwrap_or_else(Vector::zeros);
        let velocity1 = physics
            .body(self.actor1)
            .map(|rb| rb.velocity_at_point(&anchor1))
            .unwrap_or_else(Vector::zeros);
        let closing = (velocity1 - velocity0).dot(&axis);

        // Positive pulls the anchors together.
        let force = self.stiffness * (length - self.rest_length) + self.damping * closing;
        let wake = force.abs() > WAKE_FORCE_THRESHOLD;
        let impulse = axis * (force * dt);

        if let Some(id) = self.actor0 {
            push_body(physics, id, impulse, anchor0, wake);
        }
        push_body(physics, self.actor1, -impulse, anchor1, wake);
        true
    }
}

fn push_body(physics: &mut PhysicsWorld, id: ActorId, impulse: Vector<Real>, at: Point<Real>, wake: bool) {
    let Some(rb) = physics.body_mut(id) else {
        return;
    };
    if !rb.is_dynamic() || (rb.is_sleeping() && !wake) {
        return;
    }
    rb.apply_impulse_at_point(impulse, at, true);
}

/// Engine hinge with optional drive and limits.
#[derive(Debug, Clone, PartialEq)]
pub struct RevoluteJoint {
    handle: ImpulseJointHandle,
    actor0: Option<ActorId>,
    actor1: ActorId,
    drive_velocity: Real,
    drive_enabled: bool,
    limits: Option<[Real; 2]>,
}

impl RevoluteJoint {
    /// Hinge `actor1` to `actor0` (or the world). Both actors must already be
    /// in `physics`.
    pub fn new(
        physics: &mut PhysicsWorld,
        actor0: Option<ActorId>,
        frame0: Isometry<Real>,
        actor1: ActorId,
        frame1: Isometry<Real>,
    ) -> Result<Self, SceneError> {
        let body0 = physics.body_handle(actor0)?;
        let body1 = physics.body_handle(Some(actor1))?;

        let joint = GenericJointBuilder::new(JointAxesMask::LOCKED_REVOLUTE_AXES)
            .local_frame1(frame0)
            .local_frame2(frame1)
            .build();
        let handle = physics.impulse_joints_mut().insert(body0, body1, joint, true);
        debug!("Hinged {} to {:?}", actor1, actor0);

        Ok(Self {
            handle,
            actor0,
            actor1,
            drive_velocity: 0.0,
            drive_enabled: false,
            limits: None,
        })
    }

    pub fn actors(&self) -> (Option<ActorId>, ActorId) {
        (self.actor0, self.actor1)
    }

    pub fn drive_velocity(&self) -> Real {
        self.drive_velocity
    }

    pub fn is_drive_enabled(&self) -> bool {
        self.drive_enabled
    }

    pub fn limits(&self) -> Option<[Real; 2]> {
        self.limits
    }

    /// Drive the hinge at `velocity` rad/s.
    ///
    /// Sleeping dynamic actors on either side are woken before the motor is
    /// set, then the drive is enabled.
    pub fn set_drive_velocity(&mut self, physics: &mut PhysicsWorld, velocity: Real) -> Result<(), SceneError> {
        for id in self.actor0.into_iter().chain(Some(self.actor1)) {
            physics.wake_up(id)?;
        }

        let gain = physics.drive_gain();
        let joint = physics
            .impulse_joints_mut()
            .get_mut(self.handle)
            .ok_or(SceneError::UnknownJoint)?;
        joint.data.set_motor_velocity(JointAxis::AngX, velocity, gain);

        self.drive_velocity = velocity;
        self.drive_enabled = true;
        trace!("{} drive velocity {}", self.actor1, velocity);
        Ok(())
    }

    /// Restrict the hinge angle to `[lower, upper]` radians. Drive settings
    /// are left as they are.
    pub fn set_limits(&mut self, physics: &mut PhysicsWorld, lower: Real, upper: Real) -> Result<(), SceneError> {
        let joint = physics
            .impulse_joints_mut()
            .get_mut(self.handle)
            .ok_or(SceneError::UnknownJoint)?;
        joint.data.set_limits(JointAxis::AngX, [lower, upper]);
        self.limits = Some([lower, upper]);
        Ok(())
    }

    /// Motor target currently installed in the engine.
    pub fn engine_motor_velocity(&self, physics: &PhysicsWorld) -> Option<Real> {
        let joint = physics.impulse_joints().get(self.handle)?;
        joint.data.motor(JointAxis::AngX).map(|m| m.target_vel)
    }
}
