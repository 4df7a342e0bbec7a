//! The particle record and its per-frame integration step.

use glam::{Vec2, Vec4};
use serde::{Deserialize, Serialize};

/// How a frame's force is folded into velocity.
///
/// Forces are recomputed from scratch every frame and never carried over;
/// only velocity keeps their accumulated effect.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ForceIntegration {
    /// Force is an acceleration: `velocity += force * dt` (default).
    #[default]
    Acceleration,
    /// Force is a per-frame impulse: `velocity += force`.
    Impulse,
}

/// A single short-lived point light.
///
/// Colors are linear RGBA in 0.0-1.0. Positions and sizes are in pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Particle {
    /// Position in pixels, origin top-left.
    pub position: Vec2,
    /// Velocity in pixels per second.
    pub velocity: Vec2,
    /// Base color before lifetime fading.
    pub color: Vec4,
    /// Seconds of life remaining.
    pub lifetime: f32,
    /// Lifetime at spawn.
    pub max_lifetime: f32,
    /// Core radius in pixels.
    pub size: f32,
}

impl Particle {
    /// Create a particle with full remaining life.
    pub fn new(position: Vec2, velocity: Vec2, color: Vec4, lifetime: f32, size: f32) -> Self {
        Self {
            position,
            velocity,
            color,
            lifetime,
            max_lifetime: lifetime,
            size,
        }
    }

    /// Alive iff some lifetime remains.
    #[inline]
    pub fn is_alive(&self) -> bool {
        self.lifetime > 0.0
    }

    /// Remaining fraction of life, 1.0 at spawn and 0.0 at expiry.
    #[inline]
    pub fn life_fraction(&self) -> f32 {
        if self.max_lifetime > 0.0 {
            (self.lifetime / self.max_lifetime).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }

    /// Advance by `dt` seconds under `force`.
    ///
    /// Velocity is updated first, then position, then lifetime.
    pub fn integrate(&mut self, force: Vec2, dt: f32, mode: ForceIntegration) {
        match mode {
            ForceIntegration::Acceleration => self.velocity += force * dt,
            ForceIntegration::Impulse => self.velocity += force,
        }
        self.position += self.velocity * dt;
        self.lifetime -= dt;
    }
}
