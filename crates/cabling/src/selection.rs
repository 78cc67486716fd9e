//! Select/deselect for anything the player can look at.

use engine_core::{Appearance, Color, ColorSnapshot, Entity, World};

use crate::error::Result;
use crate::pin_point;

/// Something the holder's selection ray can land on.
#[derive(Debug, Clone)]
pub struct Selectable {
    pub highlight_enabled: bool,
    pub highlight_color: Color,
    is_selected: bool,
    original_colors: ColorSnapshot,
}

impl Selectable {
    pub fn new(appearance: &Appearance, highlight_color: Color) -> Self {
        Self {
            highlight_enabled: true,
            highlight_color,
            is_selected: false,
            original_colors: appearance.snapshot(),
        }
    }

    pub fn is_selected(&self) -> bool {
        self.is_selected
    }

    pub fn original_colors(&self) -> &ColorSnapshot {
        &self.original_colors
    }
}

/// Mark as selected and tint with the selection colour.
pub fn select(world: &World, entity: Entity) {
    if let Err(e) = try_select(world, entity) {
        log::debug!("select skipped for {:?}: {}", entity, e);
    }
}

fn try_select(world: &World, entity: Entity) -> Result<()> {
    let mut selectable = world.get::<&mut Selectable>(entity)?;
    selectable.is_selected = true;
    if selectable.highlight_enabled {
        if let Ok(mut appearance) = world.get::<&mut Appearance>(entity) {
            appearance.tint(selectable.highlight_color);
        }
    }
    Ok(())
}

/// Clear selection and restore original colours. A pinned segment keeps
/// showing its pinned colour instead.
pub fn deselect(world: &World, entity: Entity) {
    if let Err(e) = deselect_base(world, entity) {
        log::debug!("deselect skipped for {:?}: {}", entity, e);
        return;
    }
    if pin_point::is_pinned(world, entity) {
        pin_point::apply_pinned_color(world, entity);
    }
}

fn deselect_base(world: &World, entity: Entity) -> Result<()> {
    let mut selectable = world.get::<&mut Selectable>(entity)?;
    selectable.is_selected = false;
    if let Ok(mut appearance) = world.get::<&mut Appearance>(entity) {
        appearance.restore(&selectable.original_colors);
    }
    Ok(())
}

pub fn is_selected(world: &World, entity: Entity) -> bool {
    world
        .get::<&Selectable>(entity)
        .map(|s| s.is_selected)
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spawn(world: &mut World) -> Entity {
        let appearance = Appearance::single(Color::GREY);
        let selectable = Selectable::new(&appearance, Color::YELLOW);
        world.spawn((appearance, selectable))
    }

    fn color(world: &World, e: Entity) -> Option<Color> {
        world.get::<&Appearance>(e).unwrap().primary_color()
    }

    #[test]
    fn select_tints_and_deselect_restores() {
        let mut world = World::new();
        let e = spawn(&mut world);
        select(&world, e);
        assert!(is_selected(&world, e));
        assert_eq!(color(&world, e), Some(Color::YELLOW));
        deselect(&world, e);
        assert!(!is_selected(&world, e));
        assert_eq!(color(&world, e), Some(Color::GREY));
    }

    #[test]
    fn disabled_highlight_only_sets_flag() {
        let mut world = World::new();
        let e = spawn(&mut world);
        world.get::<&mut Selectable>(e).unwrap().highlight_enabled = false;
        select(&world, e);
        assert!(is_selected(&world, e));
        assert_eq!(color(&world, e), Some(Color::GREY));
    }

    #[test]
    fn entity_without_selectable_is_ignored() {
        let mut world = World::new();
        let e = world.spawn((Appearance::single(Color::GREY),));
        select(&world, e);
        assert!(!is_selected(&world, e));
        assert_eq!(color(&world, e), Some(Color::GREY));
    }
}
