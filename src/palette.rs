//! Color palettes for spawned particles.

use glam::Vec4;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Blue, purple and cyan tones, fully opaque.
pub const DREAM_COLORS: [Vec4; 8] = [
    Vec4::new(0.40, 0.55, 1.00, 1.0), // periwinkle
    Vec4::new(0.25, 0.35, 0.95, 1.0), // deep blue
    Vec4::new(0.60, 0.40, 1.00, 1.0), // lavender
    Vec4::new(0.75, 0.30, 0.95, 1.0), // violet
    Vec4::new(0.30, 0.85, 1.00, 1.0), // cyan
    Vec4::new(0.45, 0.95, 0.95, 1.0), // aqua
    Vec4::new(0.85, 0.60, 1.00, 1.0), // orchid
    Vec4::new(0.55, 0.75, 1.00, 1.0), // sky
];

/// Convert 8-bit RGBA to linear 0.0-1.0 components.
pub fn rgba8(r: u8, g: u8, b: u8, a: u8) -> Vec4 {
    Vec4::new(r as f32, g as f32, b as f32, a as f32) / 255.0
}

/// Where emitted particles get their color.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Palette {
    /// Random pick from [`DREAM_COLORS`] (default).
    #[default]
    Dream,
    /// A single fixed color.
    Solid {
        /// RGBA, 0.0-1.0.
        color: Vec4,
    },
}

impl Palette {
    /// Pick a color for one particle.
    pub fn pick<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec4 {
        match *self {
            Palette::Dream => DREAM_COLORS[rng.gen_range(0..DREAM_COLORS.len())],
            Palette::Solid { color } => color,
        }
    }
}
