//! Simulation notifications in course terms.
//!
//! Raw engine collision events and wake/sleep transitions are classified once
//! per step by [`crate::systems::collision::dispatch_simulation_events`] and
//! written into [`Messages<SimulationEvent>`](bevy_ecs::prelude::Messages).
//! The event sink in [`crate::systems::eventsink`] is the only consumer that
//! touches game state.
use bevy_ecs::prelude::*;
use serde::Serialize;

use crate::components::actor::{ActorId, ShapeKind};

/// One shape of an actor, addressed by creation index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ShapeRef {
    pub actor: ActorId,
    pub index: usize,
    pub kind: ShapeKind,
}

impl ShapeRef {
    pub fn is_plane(&self) -> bool {
        self.kind == ShapeKind::Plane
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TouchStatus {
    Found,
    Lost,
}

#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimulationEvent {
    /// A shape entered or left a trigger shape.
    Trigger {
        trigger: ShapeRef,
        other: ShapeRef,
        status: TouchStatus,
    },
    /// Two subscribed shapes started or stopped touching.
    Contact {
        a: ShapeRef,
        b: ShapeRef,
        status: TouchStatus,
    },
    Wake(ActorId),
    Sleep(ActorId),
    /// A joint exceeded its break force. The engine binding never breaks
    /// joints, so this is only produced by callers.
    ConstraintBreak,
}
