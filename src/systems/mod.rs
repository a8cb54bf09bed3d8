//! Course systems.
//!
//! Submodules overview
//! - [`collision`] – classify engine notifications and queue them as messages
//! - [`eventsink`] – fold simulation messages into [`crate::resources::gamestate::GameState`]
//! - [`physics`] – spring evaluation and the engine step
//! - [`time`] – advance [`crate::resources::worldtime::WorldTime`]
//!
//! The per-step order is assembled in [`crate::game::step_schedule`].
pub mod collision;
pub mod eventsink;
pub mod physics;
pub mod time;
