//! Force functions that turn a particle position and simulation time into a
//! 2D force vector.
//!
//! Every function here is pure. The only shared state it reads is the
//! immutable noise table, so forces can be evaluated from any thread.
//!
//! # Force Types
//!
//! | Force | Description |
//! |-------|-------------|
//! | [`ForceField::Curl`] | Divergence-free swirl from curl noise |
//! | [`ForceField::Vortex`] | Pull toward a center plus tangential spin |
//! | [`ForceField::Flow`] | Constant-magnitude push along the noise angle |
//!
//! # Example
//!
//! ```ignore
//! let pool = ParticlePool::new(10_000)
//!     .with_force(ForceField::Curl { strength: 50.0 })
//!     .with_force(ForceField::Vortex {
//!         center: Vec2::new(1280.0, 720.0),
//!         attraction: 400.0,
//!         spiral: 250.0,
//!     });
//! ```

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::noise;

/// Distance below which [`vortex_attraction`] returns zero.
pub const VORTEX_DEAD_ZONE: f32 = 1.0;

/// Attraction toward `center` plus a perpendicular spiral component.
///
/// Both terms fall off as `1 / distance`, not `1 / distance^2`, so the pull
/// stays gentle near the center. Returns [`Vec2::ZERO`] when the particle is
/// within [`VORTEX_DEAD_ZONE`] of the center.
pub fn vortex_attraction(
    particle_pos: Vec2,
    center: Vec2,
    attraction_strength: f32,
    spiral_strength: f32,
) -> Vec2 {
    let direction = center - particle_pos;
    let distance = direction.length();

    if distance.is_nan() || distance < VORTEX_DEAD_ZONE {
        return Vec2::ZERO;
    }

    let normalized = direction / distance;
    let attraction = normalized * (attraction_strength / distance);
    let spiral = normalized.perp() * (spiral_strength / distance);

    attraction + spiral
}

/// Curl-noise force at `pos`. Delegates to [`noise::curl_noise`].
#[inline]
pub fn curl_force(pos: Vec2, time: f32, strength: f32) -> Vec2 {
    noise::curl_noise(pos, time, strength)
}

/// Push of magnitude `strength` along [`noise::flow_direction`].
#[inline]
pub fn flow_force(pos: Vec2, time: f32, scale: f32, strength: f32) -> Vec2 {
    noise::flow_direction(pos, time, scale) * strength
}

/// A force applied to every particle in the pool.
///
/// Variants carry only constants; [`ForceField::evaluate`] is a pure function
/// of position and time.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ForceField {
    /// Curl noise swirl.
    Curl {
        /// Linear multiplier applied after differencing.
        strength: f32,
    },

    /// Vortex attraction with a spiral component.
    Vortex {
        /// Vortex center in world (pixel) space.
        center: Vec2,
        /// Strength of the pull toward `center`.
        attraction: f32,
        /// Strength of the tangential component.
        spiral: f32,
    },

    /// Flow along the noise angle.
    Flow {
        /// World-to-noise scale.
        scale: f32,
        /// Force magnitude.
        strength: f32,
    },
}

impl ForceField {
    /// Force exerted on a particle at `pos` at simulation time `time`.
    pub fn evaluate(&self, pos: Vec2, time: f32) -> Vec2 {
        match *self {
            ForceField::Curl { strength } => curl_force(pos, time, strength),
            ForceField::Vortex {
                center,
                attraction,
                spiral,
            } => vortex_attraction(pos, center, attraction, spiral),
            ForceField::Flow { scale, strength } => flow_force(pos, time, scale, strength),
        }
    }
}

impl Default for ForceField {
    fn default() -> Self {
        ForceField::Curl {
            strength: noise::DEFAULT_CURL_STRENGTH,
        }
    }
}

/// Sum of every field in `fields` at `pos`.
pub fn total_force(fields: &[ForceField], pos: Vec2, time: f32) -> Vec2 {
    fields
        .iter()
        .fold(Vec2::ZERO, |acc, field| acc + field.evaluate(pos, time))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vortex_dead_zone() {
        let center = Vec2::new(100.0, 100.0);
        for offset in [Vec2::ZERO, Vec2::new(0.5, 0.0), Vec2::new(-0.6, 0.7), Vec2::new(0.0, -0.999)] {
            assert_eq!(vortex_attraction(center + offset, center, 500.0, 300.0), Vec2::ZERO);
        }
    }

    #[test]
    fn test_vortex_points_toward_center() {
        let center = Vec2::new(0.0, 0.0);
        for pos in [Vec2::new(10.0, 0.0), Vec2::new(-30.0, 45.0), Vec2::new(2.0, -7.0)] {
            let force = vortex_attraction(pos, center, 100.0, 40.0);
            assert_ne!(force, Vec2::ZERO);
            assert!(force.dot(center - pos) > 0.0, "force {force:?} at {pos:?}");
        }
    }

    #[test]
    fn test_vortex_falls_off_linearly() {
        let center = Vec2::ZERO;
        let near = vortex_attraction(Vec2::new(10.0, 0.0), center, 100.0, 0.0);
        let far = vortex_attraction(Vec2::new(20.0, 0.0), center, 100.0, 0.0);
        assert!((near.length() / far.length() - 2.0).abs() < 1e-5);
    }

    #[test]
    fn test_vortex_spiral_is_perpendicular() {
        let force = vortex_attraction(Vec2::new(10.0, 0.0), Vec2::ZERO, 0.0, 50.0);
        // direction to center is -X, rotated 90 degrees is -Y
        assert!((force - Vec2::new(0.0, -5.0)).length() < 1e-5);
    }

    #[test]
    fn test_curl_force_matches_noise() {
        let pos = Vec2::new(321.0, 654.0);
        assert_eq!(curl_force(pos, 1.5, 50.0), noise::curl_noise(pos, 1.5, 50.0));
    }

    #[test]
    fn test_flow_force_magnitude() {
        let force = flow_force(Vec2::new(77.0, 19.0), 0.3, 0.01, 12.0);
        assert!((force.length() - 12.0).abs() < 1e-4);
    }

    #[test]
    fn test_force_fields_are_pure() {
        let fields = [
            ForceField::default(),
            ForceField::Vortex {
                center: Vec2::new(50.0, 50.0),
                attraction: 10.0,
                spiral: 5.0,
            },
        ];
        let pos = Vec2::new(12.0, 34.0);
        assert_eq!(total_force(&fields, pos, 2.0), total_force(&fields, pos, 2.0));
        assert_eq!(total_force(&[], pos, 2.0), Vec2::ZERO);
    }

    #[test]
    fn test_force_field_serde() {
        let json = r#"{"type":"vortex","center":[640.0,360.0],"attraction":2.0,"spiral":1.0}"#;
        let field: ForceField = serde_json::from_str(json).unwrap();
        assert_eq!(
            field,
            ForceField::Vortex {
                center: Vec2::new(640.0, 360.0),
                attraction: 2.0,
                spiral: 1.0,
            }
        );
    }
}
