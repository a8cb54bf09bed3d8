//! Time update system.
//!
//! Advances the shared [`WorldTime`](crate::resources::worldtime::WorldTime)
//! resource once per simulation step. The driver calls it with the physics
//! world's fixed timestep right before running the step schedule.
use bevy_ecs::prelude::*;

use crate::resources::worldtime::WorldTime;

/// Advance elapsed time by `dt` seconds and count one step.
pub fn update_world_time(world: &mut World, dt: f32) {
    let mut wt = world.resource_mut::<WorldTime>();
    wt.elapsed += dt;
    wt.delta = dt;
    wt.steps += 1;
}
