//! Installed collision filter.
//!
//! The shader stored here is handed to the engine before every step, where it
//! decides which pairs are tracked and solved, and the dispatch system runs
//! every raw engine collision through it again to pick notifications. The
//! course installs
//! [`course_filter_shader`](crate::components::collision::course_filter_shader).

use bevy_ecs::prelude::Resource;

use crate::components::collision::{FilterShader, course_filter_shader};

#[derive(Resource, Clone, Copy)]
pub struct FilterPolicy {
    pub shader: FilterShader,
}

impl Default for FilterPolicy {
    fn default() -> Self {
        FilterPolicy {
            shader: course_filter_shader,
        }
    }
}
