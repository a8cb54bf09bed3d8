//! Minigolf course library.
//!
//! Composite rigid-body actors, spring and hinge joints, the collision filter
//! policy and the event-driven course state, built on rapier3d and bevy_ecs.
//! Exposed for the runner binary and integration tests.

pub mod components;
pub mod error;
pub mod events;
pub mod game;
pub mod resources;
pub mod systems;
