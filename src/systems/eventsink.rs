//! Simulation event sink.
//!
//! The only writer of [`GameState::trigger_active`]. Trigger notifications
//! update it; contact, wake, sleep and constraint-break notifications are
//! observational and only logged.
//!
//! When a course is built, only the course ball entering the course hole
//! counts. Without one, any non-plane body in any trigger does.
use bevy_ecs::prelude::*;
use log::{debug, info};

use crate::components::actor::ActorId;
use crate::events::simulation::{SimulationEvent, TouchStatus};
use crate::game::Course;
use crate::resources::gamestate::GameState;

/// The trigger and the body whose overlap drives the win.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HoleWatch {
    pub hole: ActorId,
    pub ball: ActorId,
}

/// Apply one notification to the game state.
pub fn apply_simulation_event(state: &mut GameState, event: &SimulationEvent, watch: Option<HoleWatch>) {
    match event {
        SimulationEvent::Trigger {
            trigger,
            other,
            status,
        } => {
            // Resting on the ground plane says nothing about the hole.
            if other.is_plane() || trigger.is_plane() {
                return;
            }
            if let Some(watch) = watch {
                // A hole that was moved reports its last lost pair under the
                // old actor, so leaving only checks the ball.
                let relevant = match status {
                    TouchStatus::Found => trigger.actor == watch.hole && other.actor == watch.ball,
                    TouchStatus::Lost => other.actor == watch.ball,
                };
                if !relevant {
                    debug!("Trigger {:?} of {} in {} ignored", status, other.actor, trigger.actor);
                    return;
                }
            }
            match status {
                TouchStatus::Found => {
                    info!("Trigger touch found: {} entered {}", other.actor, trigger.actor);
                    state.set_trigger_active(true);
                }
                TouchStatus::Lost => {
                    info!("Trigger touch lost: {} left {}", other.actor, trigger.actor);
                    state.set_trigger_active(false);
                }
            }
        }
        SimulationEvent::Contact { a, b, status } => match status {
            TouchStatus::Found => debug!("Contact found between {} and {}", a.actor, b.actor),
            TouchStatus::Lost => debug!("Contact lost between {} and {}", a.actor, b.actor),
        },
        SimulationEvent::Wake(id) => debug!("{} woke up", id),
        SimulationEvent::Sleep(id) => debug!("{} fell asleep", id),
        SimulationEvent::ConstraintBreak => debug!("Constraint break ignored"),
    }
}

/// Read every [`SimulationEvent`] of this step into [`GameState`].
pub fn simulation_event_sink(
    mut reader: MessageReader<SimulationEvent>,
    mut state: ResMut<GameState>,
    course: Option<Res<Course>>,
) {
    let watch = course.map(|course| course.hole_watch());
    for event in reader.read() {
        apply_simulation_event(&mut state, event, watch);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::actor::ShapeKind;
    use crate::components::prefabs;
    use crate::events::simulation::ShapeRef;

    fn shape(kind: ShapeKind) -> ShapeRef {
        ShapeRef {
            actor: prefabs::ground().id(),
            index: 0,
            kind,
        }
    }

    fn trigger(other: ShapeKind, status: TouchStatus) -> SimulationEvent {
        SimulationEvent::Trigger {
            trigger: shape(ShapeKind::Box),
            other: shape(other),
            status,
        }
    }

    #[test]
    fn test_trigger_found_then_lost() {
        let mut state = GameState::default();
        apply_simulation_event(&mut state, &trigger(ShapeKind::Sphere, TouchStatus::Found), None);
        assert!(state.trigger_active());
        apply_simulation_event(&mut state, &trigger(ShapeKind::Sphere, TouchStatus::Lost), None);
        assert!(!state.trigger_active());
    }

    #[test]
    fn test_plane_triggers_are_ignored() {
        let mut state = GameState::default();
        apply_simulation_event(&mut state, &trigger(ShapeKind::Plane, TouchStatus::Found), None);
        assert!(!state.trigger_active());
    }

    #[test]
    fn test_observational_events_leave_state_alone() {
        let mut state = GameState::default();
        let before = state.clone();
        let id = shape(ShapeKind::Sphere).actor;
        for event in [
            SimulationEvent::Contact {
                a: shape(ShapeKind::Sphere),
                b: shape(ShapeKind::Box),
                status: TouchStatus::Found,
            },
            SimulationEvent::Wake(id),
            SimulationEvent::Sleep(id),
            SimulationEvent::ConstraintBreak,
        ] {
            apply_simulation_event(&mut state, &event, None);
        }
        assert_eq!(state, before);
    }

    fn watched(hole: ActorId, other: ActorId, status: TouchStatus) -> SimulationEvent {
        SimulationEvent::Trigger {
            trigger: ShapeRef {
                actor: hole,
                index: 0,
                kind: ShapeKind::Box,
            },
            other: ShapeRef {
                actor: other,
                index: 0,
                kind: ShapeKind::Sphere,
            },
            status,
        }
    }

    #[test]
    fn test_only_the_ball_in_the_hole_counts() {
        let watch = HoleWatch {
            hole: prefabs::ground().id(),
            ball: prefabs::ground().id(),
        };
        let spinner = prefabs::ground().id();
        let elsewhere = prefabs::ground().id();
        let mut state = GameState::default();

        apply_simulation_event(&mut state, &watched(watch.hole, spinner, TouchStatus::Found), Some(watch));
        assert!(!state.trigger_active());
        apply_simulation_event(&mut state, &watched(elsewhere, watch.ball, TouchStatus::Found), Some(watch));
        assert!(!state.trigger_active());

        apply_simulation_event(&mut state, &watched(watch.hole, watch.ball, TouchStatus::Found), Some(watch));
        assert!(state.trigger_active());
        apply_simulation_event(&mut state, &watched(watch.hole, spinner, TouchStatus::Lost), Some(watch));
        assert!(state.trigger_active());
    }

    #[test]
    fn test_ball_leaving_a_moved_hole_clears_trigger() {
        let old_hole = prefabs::ground().id();
        let watch = HoleWatch {
            hole: prefabs::ground().id(),
            ball: prefabs::ground().id(),
        };
        let mut state = GameState::default();
        state.set_trigger_active(true);
        apply_simulation_event(&mut state, &watched(old_hole, watch.ball, TouchStatus::Lost), Some(watch));
        assert!(!state.trigger_active());
    }

    #[test]
    fn test_sink_system_reads_messages() {
        let mut world = World::new();
        world.insert_resource(GameState::default());
        world.init_resource::<Messages<SimulationEvent>>();
        world
            .resource_mut::<Messages<SimulationEvent>>()
            .write(trigger(ShapeKind::Sphere, TouchStatus::Found));
        world.resource_mut::<Messages<SimulationEvent>>().update();

        let mut schedule = Schedule::default();
        schedule.add_systems(simulation_event_sink);
        schedule.run(&mut world);
        assert!(world.resource::<GameState>().trigger_active());
    }
}
