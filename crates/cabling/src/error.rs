//! Error types for the cabling systems.
//!
//! Nothing here reaches the frame loop: public operations absorb these and
//! leave state untouched. They exist so the internal steps can use `?`.

use physics::{ColliderHandle, RigidBodyHandle};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CablingError {
    #[error("entity is missing a component: {0}")]
    MissingComponent(#[from] hecs::ComponentError),
    #[error("rigid body {0:?} is not in the physics world")]
    MissingBody(RigidBodyHandle),
    #[error("collider {0:?} is not in the physics world")]
    MissingCollider(ColliderHandle),
}

pub type Result<T> = std::result::Result<T, CablingError>;

/// Errors from loading or saving [`crate::CablingConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not access config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid config: {0}")]
    Parse(#[from] ron::error::SpannedError),
    #[error("could not serialise config: {0}")]
    Serialize(#[from] ron::Error),
}
