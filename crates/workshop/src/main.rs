//! Workshop - headless cable handling demo.
//!
//! Builds a small room, then scripts a player who pins a cable to a wall,
//! plugs it into a second cable and finally walks up to a terminal with a
//! cable in hand. Every step is reported through the log.

use anyhow::{Context, Result};
use cabling::holder::{self, ObjectHolder};
use cabling::{
    segment, CableRig, CableSpec, CablingConfig, Connector, ConnectorKind, Gender, PlayerMode,
};
use engine_core::{Name, Transform};
use glam::{Quat, Vec3};
use hecs::Entity;
use std::path::PathBuf;

const DT: f32 = 1.0 / 60.0;
const CONFIG_PATH: &str = "config.ron";

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.iter().any(|a| a == "--write-config") {
        CablingConfig::default()
            .save(&PathBuf::from(CONFIG_PATH))
            .with_context(|| format!("writing default config to {}", CONFIG_PATH))?;
        log::info!("Default config written to {}", CONFIG_PATH);
        return Ok(());
    }
    let path = args
        .iter()
        .find(|a| !a.starts_with("--"))
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(CONFIG_PATH));

    let config = CablingConfig::load(&path);
    log::info!("Starting workshop with {:?}", config);

    let mut rig = CableRig::new(config);
    let scene = build_scene(&mut rig);

    settle(&mut rig, 30);
    pin_to_wall(&mut rig, &scene).context("pinning lamp cable")?;
    plug_in(&mut rig, &scene).context("plugging lamp into mains")?;
    terminal_drop(&mut rig, &scene).context("terminal focus")?;
    settle(&mut rig, 60);

    report(&rig, &scene);
    Ok(())
}

struct Scene {
    player: Entity,
    lamp: Vec<Entity>,
    mains: Vec<Entity>,
}

fn build_scene(rig: &mut CableRig) -> Scene {
    rig.spawn_surface("floor", Vec3::new(0.0, -0.1, 0.0), Quat::IDENTITY, Vec3::new(5.0, 0.1, 5.0));
    rig.spawn_surface("wall", Vec3::new(-2.0, 2.0, 0.0), Quat::IDENTITY, Vec3::new(0.1, 2.0, 5.0));
    rig.spawn_prop("crate", Vec3::new(2.5, 0.3, -1.0), 0.5);

    let lamp = rig.spawn_cable(
        CableSpec::new("lamp", Vec3::new(-1.0, 0.1, -2.0), Vec3::new(-1.0, 0.1, 2.0), 6)
            .with_tail(Connector::new(ConnectorKind::Power, Gender::Plug, Vec3::new(0.0, 0.0, -0.05))),
    );
    let mains = rig.spawn_cable(
        CableSpec::new("mains", Vec3::new(1.0, 0.1, -2.0), Vec3::new(1.0, 0.1, 2.0), 4)
            .with_tail(Connector::new(ConnectorKind::Power, Gender::Socket, Vec3::new(0.0, 0.0, -0.05))),
    );

    let player = rig.spawn_holder(
        "player",
        Transform::from_position(Vec3::new(0.0, 1.7, 4.0)),
        Transform::from_position(Vec3::new(0.0, 1.3, 3.4)),
    );

    Scene {
        player,
        lamp: lamp.segments,
        mains: mains.segments,
    }
}

fn settle(rig: &mut CableRig, frames: usize) {
    for _ in 0..frames {
        rig.tick(DT, false);
    }
}

fn with_holder(rig: &CableRig, player: Entity, f: impl FnOnce(&mut ObjectHolder)) -> Result<()> {
    let mut h = rig
        .world
        .get::<&mut ObjectHolder>(player)
        .context("player has no holder")?;
    f(&mut h);
    Ok(())
}

fn position_of(rig: &CableRig, entity: Entity) -> Result<Vec3> {
    Ok(rig
        .world
        .get::<&Transform>(entity)
        .context("segment has no transform")?
        .position)
}

/// Carry a middle segment of the lamp cable to the wall and let go.
fn pin_to_wall(rig: &mut CableRig, scene: &Scene) -> Result<()> {
    let segment = scene.lamp[2];
    if !holder::pick_up_object(&rig.world, &mut rig.physics, scene.player, segment) {
        anyhow::bail!("could not pick up {:?}", segment);
    }
    with_holder(rig, scene.player, |h| {
        h.hand = Transform::from_position(Vec3::new(-1.6, 1.5, -0.4));
    })?;
    settle(rig, 45);

    holder::force_drop(&rig.world, &mut rig.physics, scene.player);
    log::info!(
        "{} is {:?}",
        name_of(rig, segment),
        segment::state(&rig.world, segment)
    );
    Ok(())
}

/// Pick the lamp plug up by looking at it, then release it while looking at
/// the mains socket.
fn plug_in(rig: &mut CableRig, scene: &Scene) -> Result<()> {
    let plug = *scene.lamp.last().context("lamp cable is empty")?;
    let socket = *scene.mains.last().context("mains cable is empty")?;

    let target = position_of(rig, plug)?;
    with_holder(rig, scene.player, |h| {
        h.camera = Transform::from_position(target + Vec3::new(0.0, 1.5, 0.5));
        h.camera.look_at(target, Vec3::Y);
        h.hand = Transform::from_position(Vec3::new(0.0, 0.8, 2.0));
    })?;
    rig.tick(DT, false);
    rig.tick(DT, true);
    settle(rig, 30);

    let target = position_of(rig, socket)?;
    with_holder(rig, scene.player, |h| {
        h.camera = Transform::from_position(target + Vec3::new(0.5, 1.5, 0.5));
        h.camera.look_at(target, Vec3::Y);
    })?;
    rig.tick(DT, false);
    rig.tick(DT, true);

    log::info!(
        "{} is {:?}, {} is {:?}",
        name_of(rig, plug),
        segment::state(&rig.world, plug),
        name_of(rig, socket),
        segment::state(&rig.world, socket)
    );
    Ok(())
}

/// Entering terminal focus while carrying a segment drops it.
fn terminal_drop(rig: &mut CableRig, scene: &Scene) -> Result<()> {
    let segment = scene.mains[1];
    with_holder(rig, scene.player, |h| {
        h.hand = Transform::from_position(Vec3::new(1.0, 1.2, 0.0));
    })?;
    if !holder::pick_up_object(&rig.world, &mut rig.physics, scene.player, segment) {
        anyhow::bail!("could not pick up {:?}", segment);
    }
    settle(rig, 20);

    rig.modes.set_mode(PlayerMode::TerminalFocus);
    rig.tick(DT, false);
    log::info!(
        "terminal focus: holding {:?}, {} is {:?}",
        holder::held_of(&rig.world, scene.player),
        name_of(rig, segment),
        segment::state(&rig.world, segment)
    );
    rig.modes.set_mode(PlayerMode::Roaming);
    Ok(())
}

fn name_of(rig: &CableRig, entity: Entity) -> String {
    rig.world
        .get::<&Name>(entity)
        .map(|n| n.to_string())
        .unwrap_or_else(|_| format!("{:?}", entity))
}

fn report(rig: &CableRig, scene: &Scene) {
    for &segment in scene.lamp.iter().chain(&scene.mains) {
        let position = position_of(rig, segment).unwrap_or(Vec3::ZERO);
        log::info!(
            "{:>10} {:?} at ({:.2}, {:.2}, {:.2})",
            name_of(rig, segment),
            segment::state(&rig.world, segment),
            position.x,
            position.y,
            position.z
        );
    }
}
