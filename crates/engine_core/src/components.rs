//! Common ECS components used across the workspace.

use serde::{Deserialize, Serialize};

/// Linear RGBA colour.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    #[serde(default = "opaque")]
    pub a: f32,
}

fn opaque() -> f32 {
    1.0
}

impl Color {
    pub const WHITE: Color = Color::rgb(1.0, 1.0, 1.0);
    pub const YELLOW: Color = Color::rgb(1.0, 0.92, 0.016);
    pub const GREY: Color = Color::rgb(0.5, 0.5, 0.5);

    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}

/// Tint state of an entity: one list of material slots per renderer.
///
/// A slot holding `None` has no tintable colour property and is skipped by
/// every operation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Appearance {
    pub renderers: Vec<Vec<Option<Color>>>,
}

/// Colours captured from an [`Appearance`], indexed the same way.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColorSnapshot(Vec<Vec<Color>>);

impl Appearance {
    pub fn new(renderers: Vec<Vec<Option<Color>>>) -> Self {
        Self { renderers }
    }

    /// One renderer with one tintable material.
    pub fn single(color: Color) -> Self {
        Self::new(vec![vec![Some(color)]])
    }

    /// Capture current colours. Slots without a colour record white.
    pub fn snapshot(&self) -> ColorSnapshot {
        ColorSnapshot(
            self.renderers
                .iter()
                .map(|slots| slots.iter().map(|s| s.unwrap_or(Color::WHITE)).collect())
                .collect(),
        )
    }

    /// Set every tintable slot to `color`.
    pub fn tint(&mut self, color: Color) {
        for slot in self.renderers.iter_mut().flatten() {
            if let Some(c) = slot {
                *c = color;
            }
        }
    }

    /// Write a snapshot back. Slots added after the snapshot was taken keep their colour.
    pub fn restore(&mut self, snapshot: &ColorSnapshot) {
        for (slots, saved) in self.renderers.iter_mut().zip(snapshot.0.iter()) {
            for (slot, color) in slots.iter_mut().zip(saved.iter()) {
                if let Some(c) = slot {
                    *c = *color;
                }
            }
        }
    }

    /// First tintable colour, if any.
    pub fn primary_color(&self) -> Option<Color> {
        self.renderers.iter().flatten().find_map(|slot| *slot)
    }
}

/// Human-readable label, used in log output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Name(pub String);

impl Name {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }
}

impl std::fmt::Display for Name {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tint_skips_slots_without_color() {
        let mut a = Appearance::new(vec![vec![Some(Color::GREY), None]]);
        a.tint(Color::YELLOW);
        assert_eq!(a.renderers[0][0], Some(Color::YELLOW));
        assert_eq!(a.renderers[0][1], None);
    }

    #[test]
    fn restore_brings_back_snapshot() {
        let mut a = Appearance::new(vec![
            vec![Some(Color::GREY)],
            vec![Some(Color::rgb(0.1, 0.2, 0.3)), None],
        ]);
        let saved = a.snapshot();
        a.tint(Color::YELLOW);
        a.restore(&saved);
        assert_eq!(a.renderers[0][0], Some(Color::GREY));
        assert_eq!(a.renderers[1][0], Some(Color::rgb(0.1, 0.2, 0.3)));
        assert_eq!(a.renderers[1][1], None);
    }

    #[test]
    fn restore_tolerates_grown_material_list() {
        let mut a = Appearance::single(Color::GREY);
        let saved = a.snapshot();
        a.renderers[0].push(Some(Color::YELLOW));
        a.tint(Color::WHITE);
        a.restore(&saved);
        assert_eq!(a.renderers[0][0], Some(Color::GREY));
        assert_eq!(a.renderers[0][1], Some(Color::WHITE));
    }

    #[test]
    fn color_alpha_defaults_to_opaque() {
        let c: Color = ron::from_str("(r: 1.0, g: 0.5, b: 0.0)").unwrap();
        assert_eq!(c.a, 1.0);
    }
}
