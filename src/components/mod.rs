//! Course building blocks.
//!
//! Submodules overview
//! - [`actor`] – composite actors made of ordered, individually posed shapes
//! - [`collision`] – filter groups, filter words and the per-pair filter shader
//! - [`joint`] – spring distance joints and driven revolute joints
//! - [`prefabs`] – factory functions for every course piece
//! - [`tint`] – display colour and the course palette
//! - [`trampoline`] – the four-spring trampoline assembly
pub mod actor;
pub mod collision;
pub mod joint;
pub mod prefabs;
pub mod tint;
pub mod trampoline;
