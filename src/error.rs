//! Scene construction and control errors.

use thiserror::Error;

use crate::components::actor::ActorId;
use crate::resources::cooking::CookingError;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SceneError {
    #[error("mesh cooking failed: {0}")]
    Cooking(#[from] CookingError),
    #[error("{0} is not registered with the physics world")]
    UnknownActor(ActorId),
    #[error("{0} is not a dynamic actor")]
    NotDynamic(ActorId),
    #[error("joint is no longer present in the physics world")]
    UnknownJoint,
}
