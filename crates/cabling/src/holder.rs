//! The object holder: the player's hands.
//!
//! Each tick the holder reacts to player-mode changes, turns the interact
//! button's rising edge into pick up / drop, re-aims its selection ray, and
//! steers whatever it carries toward the hand.

use engine_core::{EulerRot, Entity, Quat, Transform, World};
use physics::{CollisionLayer, PhysicsWorld};

use crate::config::CablingConfig;
use crate::error::Result;
use crate::liftable::{self, body_handle, Liftable};
use crate::player_mode::{PlayerMode, PlayerModeContext, SubscriberId};
use crate::segment;
use crate::selection::{self, Selectable};

#[derive(Debug, Clone)]
pub struct ObjectHolder {
    /// Origin and aim of the selection ray.
    pub camera: Transform,
    /// Where held objects are pulled toward, and how they are oriented.
    pub hand: Transform,
    /// Layer carried objects (and carried cables) are moved to.
    pub held_layer: CollisionLayer,
    pub holding_force: f32,
    pub select_range: f32,
    /// Pitch limit in radians.
    pub held_clamp_pitch: f32,
    selected: Option<Entity>,
    held: Option<Entity>,
    interacting: bool,
    can_interact: bool,
    subscription: Option<SubscriberId>,
}

impl ObjectHolder {
    pub fn new(config: &CablingConfig, camera: Transform, hand: Transform) -> Self {
        Self {
            camera,
            hand,
            held_layer: CollisionLayer::HeldObject,
            holding_force: config.holding_force,
            select_range: config.select_range,
            held_clamp_pitch: config.held_clamp_pitch_deg.to_radians(),
            selected: None,
            held: None,
            interacting: false,
            can_interact: true,
            subscription: None,
        }
    }

    pub fn selected(&self) -> Option<Entity> {
        self.selected
    }

    pub fn held(&self) -> Option<Entity> {
        self.held
    }

    pub fn interacting(&self) -> bool {
        self.interacting
    }

    pub fn can_interact(&self) -> bool {
        self.can_interact
    }
}

pub fn selected_of(world: &World, holder: Entity) -> Option<Entity> {
    world.get::<&ObjectHolder>(holder).ok().and_then(|h| h.selected)
}

pub fn held_of(world: &World, holder: Entity) -> Option<Entity> {
    world.get::<&ObjectHolder>(holder).ok().and_then(|h| h.held)
}

/// Start listening to player-mode changes and adopt the current mode.
pub fn attach(world: &World, physics: &mut PhysicsWorld, modes: &mut PlayerModeContext, holder: Entity) {
    let Ok(mut h) = world.get::<&mut ObjectHolder>(holder) else {
        return;
    };
    if h.subscription.is_none() {
        h.subscription = Some(modes.subscribe());
    }
    std::mem::drop(h);
    apply_mode(world, physics, holder, modes.current());
}

pub fn detach(world: &World, modes: &mut PlayerModeContext, holder: Entity) {
    if let Ok(mut h) = world.get::<&mut ObjectHolder>(holder) {
        if let Some(id) = h.subscription.take() {
            modes.unsubscribe(id);
        }
    }
}

/// Terminal focus blocks interaction and lets go of anything held.
pub fn apply_mode(world: &World, physics: &mut PhysicsWorld, holder: Entity, mode: PlayerMode) {
    let can_interact = mode == PlayerMode::Roaming;
    match world.get::<&mut ObjectHolder>(holder) {
        Ok(mut h) => h.can_interact = can_interact,
        Err(_) => return,
    }
    if !can_interact {
        force_drop(world, physics, holder);
    }
}

/// One frame of holder logic. `pressed` is the raw state of the interact button.
pub fn update(
    world: &World,
    physics: &mut PhysicsWorld,
    modes: &mut PlayerModeContext,
    holder: Entity,
    pressed: bool,
) {
    let subscription = world
        .get::<&ObjectHolder>(holder)
        .ok()
        .and_then(|h| h.subscription);
    if let Some(id) = subscription {
        for mode in modes.poll(id) {
            apply_mode(world, physics, holder, mode);
        }
    }

    update_input(world, physics, holder, pressed);
    update_selection(world, physics, holder);
    update_held_position(world, physics, holder);
}

/// Edge-detect the interact button; the press edge swaps what is held.
pub fn update_input(world: &World, physics: &mut PhysicsWorld, holder: Entity, pressed: bool) {
    let started = {
        let Ok(mut h) = world.get::<&mut ObjectHolder>(holder) else {
            return;
        };
        let pressed = pressed && h.can_interact;
        let started = pressed && !h.interacting;
        h.interacting = pressed;
        started
    };
    if started {
        change_held_object(world, physics, holder);
    }
}

/// Drop what is held, or pick up what is selected if it can be lifted.
pub fn change_held_object(world: &World, physics: &mut PhysicsWorld, holder: Entity) {
    let Ok((held, selected)) = world
        .get::<&ObjectHolder>(holder)
        .map(|h| (h.held, h.selected))
    else {
        return;
    };
    if held.is_some() {
        force_drop(world, physics, holder);
    } else if let Some(target) = selected {
        if world.get::<&Liftable>(target).is_ok() {
            pick_up_object(world, physics, holder, target);
        }
    }
}

pub fn pick_up_object(world: &World, physics: &mut PhysicsWorld, holder: Entity, target: Entity) -> bool {
    let layer = match world.get::<&mut ObjectHolder>(holder) {
        Ok(mut h) if h.held.is_none() => {
            h.held = Some(target);
            h.held_layer
        }
        Ok(_) => {
            log::warn!("{:?} already holds something", holder);
            return false;
        }
        Err(_) => return false,
    };
    if segment::pick_up(world, physics, target, holder, layer) {
        true
    } else {
        if let Ok(mut h) = world.get::<&mut ObjectHolder>(holder) {
            h.held = None;
        }
        false
    }
}

/// Let go of whatever is held. Also the teleport/terminal escape hatch.
pub fn force_drop(world: &World, physics: &mut PhysicsWorld, holder: Entity) -> bool {
    let held = match world.get::<&mut ObjectHolder>(holder) {
        Ok(mut h) => h.held.take(),
        Err(_) => None,
    };
    match held {
        Some(target) => segment::drop(world, physics, target),
        None => false,
    }
}

/// Move the selection to `target`, deselecting the previous one first.
pub fn set_selected(world: &World, holder: Entity, target: Option<Entity>) {
    let previous = match world.get::<&mut ObjectHolder>(holder) {
        Ok(mut h) => {
            if h.selected == target {
                return;
            }
            std::mem::replace(&mut h.selected, target)
        }
        Err(_) => return,
    };
    if let Some(old) = previous {
        selection::deselect(world, old);
    }
    if let Some(new) = target {
        selection::select(world, new);
    }
}

/// Aim the selection ray from the camera. Blocked interaction clears the selection.
pub fn update_selection(world: &World, physics: &PhysicsWorld, holder: Entity) {
    let Ok((camera, range, held, can_interact)) = world
        .get::<&ObjectHolder>(holder)
        .map(|h| (h.camera, h.select_range, h.held, h.can_interact))
    else {
        return;
    };
    if !can_interact {
        set_selected(world, holder, None);
        return;
    }

    let exclude = held.and_then(|e| body_handle(world, e).ok());
    let found = physics
        .raycast(camera.position, camera.forward(), range, exclude)
        .and_then(|hit| physics.collider_user_data(hit.collider))
        .and_then(physics::entity_from_user_data)
        .filter(|&e| world.get::<&Selectable>(e).is_ok());
    set_selected(world, holder, found);
}

/// Steer the held body toward the hand and orient it like the hand, with
/// pitch clamped and the object's lift offset added.
pub fn update_held_position(world: &World, physics: &mut PhysicsWorld, holder: Entity) {
    if let Err(e) = try_update_held_position(world, physics, holder) {
        log::debug!("held object tracking skipped: {}", e);
    }
}

fn try_update_held_position(world: &World, physics: &mut PhysicsWorld, holder: Entity) -> Result<()> {
    let (hand, force, clamp, held) = {
        let h = world.get::<&ObjectHolder>(holder)?;
        (h.hand, h.holding_force, h.held_clamp_pitch, h.held)
    };
    let Some(held) = held else {
        return Ok(());
    };
    if !liftable::is_lift(world, held) {
        return Ok(());
    }
    let offset = world.get::<&Liftable>(held)?.lift_direction_offset;
    let body = body_handle(world, held)?;
    let Some(position) = physics.body_position(body) else {
        return Ok(());
    };

    physics.set_linear_velocity(body, (hand.position - position) * force);
    let (yaw, pitch, roll) = hand.rotation.to_euler(EulerRot::YXZ);
    let pitch = pitch.clamp(-clamp, clamp);
    let rotation = Quat::from_euler(EulerRot::YXZ, yaw + offset.y, pitch + offset.x, roll + offset.z);
    physics.set_body_pose(body, position, rotation);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pin_point;
    use crate::rig::CableRig;
    use engine_core::Vec3;

    fn looking_at(target: Vec3) -> Transform {
        let mut camera = Transform::from_position(Vec3::new(0.0, 1.0, 5.0));
        camera.look_at(target, Vec3::Y);
        camera
    }

    #[test]
    fn ray_selects_and_deselects() {
        let mut rig = CableRig::new(CablingConfig::default());
        let seg = rig.spawn_pin_point("seg", Vec3::new(0.0, 1.0, 0.0), 0.2);
        let player = rig.spawn_holder("player", looking_at(Vec3::new(0.0, 1.0, 0.0)), Transform::default());
        rig.physics.update_query_pipeline();

        update_selection(&rig.world, &rig.physics, player);
        assert_eq!(selected_of(&rig.world, player), Some(seg));
        assert!(selection::is_selected(&rig.world, seg));

        rig.world.get::<&mut ObjectHolder>(player).unwrap().camera = looking_at(Vec3::new(5.0, 1.0, 0.0));
        update_selection(&rig.world, &rig.physics, player);
        assert_eq!(selected_of(&rig.world, player), None);
        assert!(!selection::is_selected(&rig.world, seg));
    }

    #[test]
    fn press_edge_toggles_hold() {
        let mut rig = CableRig::new(CablingConfig::default());
        let seg = rig.spawn_pin_point("seg", Vec3::new(0.0, 1.0, 0.0), 0.2);
        let player = rig.spawn_holder("player", looking_at(Vec3::new(0.0, 1.0, 0.0)), Transform::default());
        rig.physics.update_query_pipeline();
        update_selection(&rig.world, &rig.physics, player);

        update_input(&rig.world, &mut rig.physics, player, true);
        assert_eq!(held_of(&rig.world, player), Some(seg));
        assert!(liftable::is_lift(&rig.world, seg));

        // Holding the button is not a new edge.
        update_input(&rig.world, &mut rig.physics, player, true);
        assert_eq!(held_of(&rig.world, player), Some(seg));

        update_input(&rig.world, &mut rig.physics, player, false);
        update_input(&rig.world, &mut rig.physics, player, true);
        assert_eq!(held_of(&rig.world, player), None);
        assert!(!liftable::is_lift(&rig.world, seg));
    }

    #[test]
    fn terminal_focus_drops_and_blocks() {
        let mut rig = CableRig::new(CablingConfig::default());
        let seg = rig.spawn_pin_point("seg", Vec3::new(0.0, 1.0, 0.0), 0.2);
        let player = rig.spawn_holder("player", looking_at(Vec3::new(0.0, 1.0, 0.0)), Transform::default());
        rig.physics.update_query_pipeline();
        update_selection(&rig.world, &rig.physics, player);
        assert!(pick_up_object(&rig.world, &mut rig.physics, player, seg));

        rig.modes.set_mode(PlayerMode::TerminalFocus);
        update(&rig.world, &mut rig.physics, &mut rig.modes, player, true);
        assert_eq!(held_of(&rig.world, player), None);
        assert!(!liftable::is_lift(&rig.world, seg));
        assert_eq!(selected_of(&rig.world, player), None);
        assert!(!rig.world.get::<&ObjectHolder>(player).unwrap().interacting());

        rig.modes.set_mode(PlayerMode::Roaming);
        update(&rig.world, &mut rig.physics, &mut rig.modes, player, false);
        assert!(rig.world.get::<&ObjectHolder>(player).unwrap().can_interact());
        assert_eq!(selected_of(&rig.world, player), Some(seg));
    }

    #[test]
    fn detached_holder_ignores_modes() {
        let mut rig = CableRig::new(CablingConfig::default());
        let player = rig.spawn_holder("player", Transform::default(), Transform::default());
        detach(&rig.world, &mut rig.modes, player);
        assert_eq!(rig.modes.subscriber_count(), 0);
        rig.modes.set_mode(PlayerMode::TerminalFocus);
        update(&rig.world, &mut rig.physics, &mut rig.modes, player, false);
        assert!(rig.world.get::<&ObjectHolder>(player).unwrap().can_interact());
    }

    #[test]
    fn held_object_is_pulled_toward_hand_with_clamped_pitch() {
        let mut rig = CableRig::new(CablingConfig::default());
        let seg = rig.spawn_pin_point("seg", Vec3::new(0.0, 1.0, 0.0), 0.2);
        let hand = Transform::from_position_rotation(Vec3::new(0.0, 2.0, 0.0), Quat::from_rotation_x(1.2));
        let player = rig.spawn_holder("player", Transform::default(), hand);
        assert!(pick_up_object(&rig.world, &mut rig.physics, player, seg));

        update_held_position(&rig.world, &mut rig.physics, player);
        let body = body_handle(&rig.world, seg).unwrap();
        let v = rig.physics.linear_velocity(body).unwrap();
        assert!((v - Vec3::new(0.0, 10.0, 0.0)).length() < 1e-4);
        let rot = rig.physics.body_rotation(body).unwrap();
        let (_, pitch, _) = rot.to_euler(EulerRot::YXZ);
        assert!((pitch - 45f32.to_radians()).abs() < 1e-4);
    }

    #[test]
    fn rejected_pick_up_leaves_hands_empty() {
        let mut rig = CableRig::new(CablingConfig::default());
        let other = rig.spawn_holder("other", Transform::default(), Transform::default());
        let player = rig.spawn_holder("player", Transform::default(), Transform::default());
        let seg = rig.spawn_pin_point("seg", Vec3::ZERO, 0.2);
        assert!(pick_up_object(&rig.world, &mut rig.physics, other, seg));
        assert!(!pick_up_object(&rig.world, &mut rig.physics, player, seg));
        assert_eq!(held_of(&rig.world, player), None);
        assert!(!pin_point::is_pinned(&rig.world, seg));
    }
}
