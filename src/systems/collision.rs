//! Engine notification dispatch.
//!
//! - [`dispatch_simulation_events`] drains the physics world's collision
//!   channel and wake/sleep transitions, runs each collision pair through the
//!   installed [`FilterPolicy`] and writes the survivors as
//!   [`SimulationEvent`] messages.
//! - [`update_simulation_messages`] advances the message queue so the event
//!   sink can read what was written this step.
use bevy_ecs::prelude::*;
use log::trace;
use rapier3d::prelude::CollisionEvent;

use crate::components::collision::{FilterShader, PairClass};
use crate::events::simulation::{ShapeRef, SimulationEvent, TouchStatus};
use crate::resources::filterpolicy::FilterPolicy;
use crate::resources::physicsworld::{ActivationChange, PhysicsWorld, ShapeRecord};

fn shape_ref(record: &ShapeRecord) -> ShapeRef {
    ShapeRef {
        actor: record.actor,
        index: record.index,
        kind: record.kind,
    }
}

/// Turn one raw collision into a course event, or `None` when the filter
/// does not subscribe the pair to this transition. Pairs involving a shape
/// that is no longer registered are dropped.
pub fn classify_collision(
    physics: &PhysicsWorld,
    shader: FilterShader,
    event: &CollisionEvent,
) -> Option<SimulationEvent> {
    let a = physics.shape_record(event.collider1())?;
    let b = physics.shape_record(event.collider2())?;
    let decision = shader(&a.filter_input(), &b.filter_input());
    let status = if event.started() {
        TouchStatus::Found
    } else {
        TouchStatus::Lost
    };
    let subscribed = match status {
        TouchStatus::Found => decision.notifies_touch_found(),
        TouchStatus::Lost => decision.notifies_touch_lost(),
    };
    if !subscribed {
        return None;
    }

    match decision.class {
        PairClass::Ignore => None,
        PairClass::Trigger => {
            let (trigger, other) = if a.trigger { (a, b) } else { (b, a) };
            Some(SimulationEvent::Trigger {
                trigger: shape_ref(trigger),
                other: shape_ref(other),
                status,
            })
        }
        PairClass::Contact => Some(SimulationEvent::Contact {
            a: shape_ref(a),
            b: shape_ref(b),
            status,
        }),
    }
}

/// Drain the engine queues into [`Messages<SimulationEvent>`].
pub fn dispatch_simulation_events(
    mut physics: ResMut<PhysicsWorld>,
    policy: Res<FilterPolicy>,
    mut writer: MessageWriter<SimulationEvent>,
) {
    let raw = physics.drain_collision_events();
    let activation = physics.drain_activation_changes();
    trace!("dispatching {} collision(s), {} activation change(s)", raw.len(), activation.len());

    writer.write_batch(
        raw.iter()
            .filter_map(|event| classify_collision(&physics, policy.shader, event)),
    );
    writer.write_batch(activation.into_iter().map(|change| match change {
        ActivationChange::Woke(id) => SimulationEvent::Wake(id),
        ActivationChange::FellAsleep(id) => SimulationEvent::Sleep(id),
    }));
}

/// Advance the ECS message queue for [`SimulationEvent`].
pub fn update_simulation_messages(mut msgs: ResMut<Messages<SimulationEvent>>) {
    msgs.update();
}
