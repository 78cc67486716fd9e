//! Core engine types shared by the physics and cabling crates.
//!
//! This crate provides the foundational types used across all systems:
//! - Transform and spatial components
//! - Colour and appearance state for tintable objects

pub mod components;
pub mod transform;

pub use components::*;
pub use transform::*;

// Re-export commonly used types
pub use glam::{EulerRot, Quat, Vec3};
pub use hecs::{Entity, World};
