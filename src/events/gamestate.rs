//! Course input and outcome events.
//!
//! [`PushEvent`] is the input hook: the application triggers it when the
//! player swings, and [`observe_push`] drives the club hinge from the current
//! applied force. [`HoleSunkEvent`] is triggered by the per-step update the
//! moment the win latches.
use bevy_ecs::observer::On;
use bevy_ecs::prelude::*;
use log::{info, warn};

use crate::components::actor::ActorId;
use crate::game::Course;
use crate::resources::gamestate::GameState;
use crate::resources::physicsworld::PhysicsWorld;

/// Swing the club with the current applied force.
#[derive(Event, Debug, Clone, Copy)]
pub struct PushEvent {}

/// The ball reached the hole. Fired once per session.
#[derive(Event, Debug, Clone, Copy)]
pub struct HoleSunkEvent {
    pub ball: ActorId,
    pub step: u64,
}

/// Observer that applies a [`PushEvent`] to the club hinge.
pub fn observe_push(
    _trigger: On<PushEvent>,
    course: Option<ResMut<Course>>,
    physics: Option<ResMut<PhysicsWorld>>,
    state: Res<GameState>,
) {
    let (Some(mut course), Some(mut physics)) = (course, physics) else {
        warn!("PushEvent ignored: course is not set up");
        return;
    };
    if let Err(e) = course.push(&mut physics, &state) {
        warn!("PushEvent failed: {}", e);
    }
}

/// Observer that reports a sunk ball.
pub fn observe_hole_sunk(trigger: On<HoleSunkEvent>) {
    let event = trigger.event();
    info!("Hole sunk by {} at step {}", event.ball, event.step);
}
