//! Particle emitters for per-frame spawning.
//!
//! An emitter fires a fixed number of particles into the pool every frame,
//! all from the same point, in a cone around a shared angle. When the pool is
//! full the extra spawns are simply dropped.
//!
//! # Velocity Control
//!
//! - `angle` - center of the emission cone, radians (0 = +X, y grows downward)
//! - `spread_degrees` - full width of the cone in degrees
//! - `speed` - speed of every emitted particle in pixels per second
//!
//! # Example
//!
//! ```ignore
//! let emitter = Emitter::new(Vec2::new(0.0, 0.0))
//!     .with_angle(std::f32::consts::PI / 8.0)
//!     .with_spread(45.0)
//!     .with_lifetime(30.0);
//! emitter.emit(&mut pool, &mut rng);
//! ```

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::palette::Palette;
use crate::pool::ParticlePool;

/// Emission angle shared by the default scene's emitters.
pub const DEFAULT_ANGLE: f32 = std::f32::consts::PI / 8.0;

/// A point emitter.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Emitter {
    /// Spawn position in pixels.
    pub position: Vec2,
    /// Center of the emission cone in radians.
    pub angle: f32,
    /// Full cone width in degrees.
    pub spread_degrees: f32,
    /// Initial speed in pixels per second.
    pub speed: f32,
    /// Lifetime of each particle in seconds.
    pub lifetime: f32,
    /// Smallest particle size.
    pub size_min: f32,
    /// Largest particle size.
    pub size_max: f32,
    /// Particles emitted per frame.
    pub per_frame: u32,
    /// Color source.
    pub palette: Palette,
}

impl Default for Emitter {
    fn default() -> Self {
        Self {
            position: Vec2::ZERO,
            angle: DEFAULT_ANGLE,
            spread_degrees: 45.0,
            speed: 100.0,
            lifetime: 30.0,
            size_min: 1.0,
            size_max: 3.0,
            per_frame: 5,
            palette: Palette::Dream,
        }
    }
}

impl Emitter {
    /// Create an emitter at `position` with default settings.
    pub fn new(position: Vec2) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// The three emitters of the default scene: top-left corner, top edge
    /// midpoint and left edge midpoint, all aimed at [`DEFAULT_ANGLE`].
    pub fn dream_scene(width: u32, height: u32) -> Vec<Emitter> {
        let (w, h) = (width as f32, height as f32);
        vec![
            Emitter::new(Vec2::ZERO),
            Emitter::new(Vec2::new(w / 2.0, 0.0)),
            Emitter::new(Vec2::new(0.0, h / 2.0)),
        ]
    }

    /// Set the cone center in radians.
    pub fn with_angle(mut self, angle: f32) -> Self {
        self.angle = angle;
        self
    }

    /// Set the cone width in degrees.
    pub fn with_spread(mut self, degrees: f32) -> Self {
        self.spread_degrees = degrees;
        self
    }

    /// Set the initial speed.
    pub fn with_speed(mut self, speed: f32) -> Self {
        self.speed = speed;
        self
    }

    /// Set the particle lifetime.
    pub fn with_lifetime(mut self, seconds: f32) -> Self {
        self.lifetime = seconds;
        self
    }

    /// Set the size range.
    pub fn with_size(mut self, min: f32, max: f32) -> Self {
        self.size_min = min;
        self.size_max = max;
        self
    }

    /// Set particles per frame.
    pub fn with_rate(mut self, per_frame: u32) -> Self {
        self.per_frame = per_frame;
        self
    }

    /// Set the color source.
    pub fn with_palette(mut self, palette: Palette) -> Self {
        self.palette = palette;
        self
    }

    /// Velocity for a cone sample `u` in [0, 1); 0.5 is the cone center.
    pub fn velocity_for(&self, u: f32) -> Vec2 {
        let spread = (u - 0.5) * self.spread_degrees.to_radians();
        let angle = self.angle + spread;
        Vec2::new(angle.cos(), angle.sin()) * self.speed
    }

    /// Spawn this frame's particles. Returns how many the pool accepted.
    pub fn emit<R: Rng + ?Sized>(&self, pool: &mut ParticlePool, rng: &mut R) -> u32 {
        let lo = self.size_min.min(self.size_max);
        let hi = self.size_min.max(self.size_max);

        let mut accepted = 0;
        for _ in 0..self.per_frame {
            let velocity = self.velocity_for(rng.gen::<f32>());
            let size = if hi > lo { rng.gen_range(lo..=hi) } else { lo };
            let color = self.palette.pick(rng);
            if pool.spawn(self.position, velocity, color, self.lifetime, size) {
                accepted += 1;
            }
        }
        accepted
    }
}
