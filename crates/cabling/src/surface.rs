//! Surfaces that cable segments can be pinned to.
//!
//! Highlighting runs every tick from the held-segment search, so both
//! directions are idempotent: asking for the state a surface is already in
//! changes nothing.

use engine_core::{Appearance, Color, ColorSnapshot, Entity, World};
use physics::ColliderHandle;

use crate::error::Result;

/// Marks an entity as a valid pin target.
#[derive(Debug, Clone)]
pub struct PinnableSurface {
    /// Collider whose boundary segments snap to.
    pub collider: ColliderHandle,
    pub highlight_color: Color,
    is_highlighted: bool,
    original_colors: ColorSnapshot,
}

impl PinnableSurface {
    /// Capture the surface's colours as they are now; they are what
    /// [`unhighlight`] restores.
    pub fn new(collider: ColliderHandle, appearance: &Appearance, highlight_color: Color) -> Self {
        Self {
            collider,
            highlight_color,
            is_highlighted: false,
            original_colors: appearance.snapshot(),
        }
    }

    pub fn is_highlighted(&self) -> bool {
        self.is_highlighted
    }
}

/// Tint the surface with its highlight colour. Returns whether anything changed.
pub fn highlight(world: &World, entity: Entity) -> bool {
    set_highlight(world, entity, true).unwrap_or_else(|e| {
        log::debug!("highlight skipped for {:?}: {}", entity, e);
        false
    })
}

/// Restore the surface's original colours. Returns whether anything changed.
pub fn unhighlight(world: &World, entity: Entity) -> bool {
    set_highlight(world, entity, false).unwrap_or_else(|e| {
        log::debug!("unhighlight skipped for {:?}: {}", entity, e);
        false
    })
}

fn set_highlight(world: &World, entity: Entity, on: bool) -> Result<bool> {
    let mut surface = world.get::<&mut PinnableSurface>(entity)?;
    if surface.is_highlighted == on {
        return Ok(false);
    }
    surface.is_highlighted = on;

    // A surface without an appearance still tracks the flag.
    if let Ok(mut appearance) = world.get::<&mut Appearance>(entity) {
        if on {
            appearance.tint(surface.highlight_color);
        } else {
            appearance.restore(&surface.original_colors);
        }
    }
    Ok(true)
}

/// Whether `entity` is a live surface that is currently highlighted.
pub fn is_highlighted(world: &World, entity: Entity) -> bool {
    world
        .get::<&PinnableSurface>(entity)
        .map(|s| s.is_highlighted)
        .unwrap_or(false)
}
