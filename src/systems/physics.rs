//! Physics stepping systems.
//!
//! Spring joints are evaluated by [`apply_spring_joints`] right before
//! [`physics_step`] advances the engine by one fixed timestep.
use bevy_ecs::prelude::*;

use crate::game::Course;
use crate::resources::filterpolicy::FilterPolicy;
use crate::resources::physicsworld::PhysicsWorld;

/// Apply the trampoline springs for the coming step.
pub fn apply_spring_joints(course: Option<Res<Course>>, mut physics: ResMut<PhysicsWorld>) {
    let Some(course) = course else {
        return;
    };
    let dt = physics.timestep();
    course.trampoline().apply_springs(&mut physics, dt);
}

/// Advance the engine one step with the installed filter policy.
/// Notifications are queued for dispatch.
pub fn physics_step(mut physics: ResMut<PhysicsWorld>, policy: Option<Res<FilterPolicy>>) {
    if let Some(policy) = policy {
        physics.set_filter_shader(policy.shader);
    }
    physics.step();
}
