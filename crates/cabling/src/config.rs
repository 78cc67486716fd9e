//! Tunables for cable handling. Loaded from a RON file, every field optional.

use crate::error::ConfigError;
use engine_core::Color;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CablingConfig {
    /// Radius around a held pin point searched for pinnable surfaces.
    #[serde(default = "default_pin_search_radius")]
    pub pin_search_radius: f32,
    /// Tint of a pinned segment.
    #[serde(default = "default_pinned_color")]
    pub pinned_color: Color,
    /// Tint of the surface a held segment would be pinned to.
    #[serde(default = "default_surface_highlight_color")]
    pub surface_highlight_color: Color,
    /// Tint of whatever the player is looking at.
    #[serde(default = "default_select_highlight_color")]
    pub select_highlight_color: Color,
    /// How far a rejected plug is pushed out of the socket it was dropped on.
    #[serde(default = "default_connect_out_offset")]
    pub connect_out_offset: f32,
    /// Gain from hand offset to held-body velocity.
    #[serde(default = "default_holding_force")]
    pub holding_force: f32,
    /// Reach of the selection ray.
    #[serde(default = "default_select_range")]
    pub select_range: f32,
    /// Pitch limit (degrees) applied to a held object's orientation.
    #[serde(default = "default_held_clamp_pitch_deg")]
    pub held_clamp_pitch_deg: f32,
    /// Vertical gravity of the physics world.
    #[serde(default = "default_gravity")]
    pub gravity: f32,
}

fn default_pin_search_radius() -> f32 {
    0.8
}
fn default_pinned_color() -> Color {
    Color::rgb(1.0, 0.45, 0.0)
}
fn default_surface_highlight_color() -> Color {
    Color::rgb(0.0, 1.0, 0.4)
}
fn default_select_highlight_color() -> Color {
    Color::YELLOW
}
fn default_connect_out_offset() -> f32 {
    0.2
}
fn default_holding_force() -> f32 {
    10.0
}
fn default_select_range() -> f32 {
    10.0
}
fn default_held_clamp_pitch_deg() -> f32 {
    45.0
}
fn default_gravity() -> f32 {
    -9.81
}

impl Default for CablingConfig {
    fn default() -> Self {
        Self {
            pin_search_radius: default_pin_search_radius(),
            pinned_color: default_pinned_color(),
            surface_highlight_color: default_surface_highlight_color(),
            select_highlight_color: default_select_highlight_color(),
            connect_out_offset: default_connect_out_offset(),
            holding_force: default_holding_force(),
            select_range: default_select_range(),
            held_clamp_pitch_deg: default_held_clamp_pitch_deg(),
            gravity: default_gravity(),
        }
    }
}

impl CablingConfig {
    pub fn from_ron_str(data: &str) -> Result<Self, ConfigError> {
        Ok(ron::from_str(data)?)
    }

    pub fn to_ron_string(&self) -> Result<String, ConfigError> {
        Ok(ron::ser::to_string_pretty(
            self,
            ron::ser::PrettyConfig::default(),
        )?)
    }

    /// Load config from `path`. If the file is missing or invalid, returns default config.
    pub fn load(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(data) => match Self::from_ron_str(&data) {
                Ok(config) => return config,
                Err(e) => log::warn!("Invalid config at {:?}: {}, using defaults", path, e),
            },
            Err(e) => log::info!("No config at {:?} ({}), using defaults", path, e),
        }
        Self::default()
    }

    /// Save current config to `path`.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        std::fs::write(path, self.to_ron_string()?)?;
        Ok(())
    }
}
