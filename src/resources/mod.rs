//! ECS resources made available to systems.
//!
//! Long-lived data injected into the ECS world and accessed by systems
//! during execution.
//!
//! Overview
//! - `cooking` – validation and cooking of convex and triangle meshes
//! - `filterpolicy` – the installed per-pair collision filter
//! - `gameconfig` – course tunables loaded from an INI file
//! - `gamestate` – applied force, trigger status and win latch
//! - `material` – friction/restitution table shared by shapes
//! - `physicsworld` – the rapier world, actor registry and event queue
//! - `worldtime` – simulation time, delta and step count
pub mod cooking;
pub mod filterpolicy;
pub mod gameconfig;
pub mod gamestate;
pub mod material;
pub mod physicsworld;
pub mod worldtime;
