//! Event types and observers used by the course.
//!
//! Submodules:
//! - [`simulation`] – classified engine notifications (trigger, contact,
//!   wake/sleep, constraint break) delivered as ECS messages
//! - [`gamestate`] – the push input hook and the hole-sunk notification
pub mod gamestate;
pub mod simulation;
