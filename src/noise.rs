//! Seeded gradient noise and the 2D flow fields derived from it.
//!
//! Everything here samples Ken Perlin's improved noise through a 512-entry
//! permutation table. The process-wide table is built once from a fixed seed,
//! so every run of the simulator sees the same field.
//!
//! # Available Functions
//!
//! - [`noise3`] - 3D gradient noise in [-1, 1]
//! - [`flow_direction`] - unit 2D direction sampled from the noise angle
//! - [`curl_noise`] - divergence-free 2D vector field (swirls, never converges)
//!
//! # Example
//!
//! ```ignore
//! use reverie::noise;
//! use glam::Vec2;
//!
//! let n = noise::noise3(1.5, 2.25, 0.0);
//! let swirl = noise::curl_noise(Vec2::new(640.0, 360.0), 3.0, 50.0);
//! ```

use glam::Vec2;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::f32::consts::TAU;
use std::sync::OnceLock;

/// Seed of the process-wide permutation table.
pub const DEFAULT_SEED: u32 = 0;

/// Finite-difference step used by [`curl_noise`], in world units.
pub const CURL_EPSILON: f32 = 0.01;

/// World-to-noise scale used by [`curl_noise`].
pub const CURL_SCALE: f32 = 0.005;

/// Default world-to-noise scale for [`flow_direction`].
pub const DEFAULT_FLOW_SCALE: f32 = 0.01;

/// Default multiplier for [`curl_noise`].
pub const DEFAULT_CURL_STRENGTH: f32 = 50.0;

static DEFAULT_TABLE: OnceLock<PermutationTable> = OnceLock::new();

/// Permutation of 0..=255, stored twice so corner hashing never wraps.
#[derive(Clone, PartialEq, Eq)]
pub struct PermutationTable {
    perm: [u8; 512],
}

impl PermutationTable {
    /// Build a table by shuffling the identity permutation with a
    /// [`StdRng`] seeded from `seed`.
    ///
    /// The same seed always yields the same table.
    pub fn with_seed(seed: u32) -> Self {
        let mut base = [0u8; 256];
        for (i, slot) in base.iter_mut().enumerate() {
            *slot = i as u8;
        }

        let mut rng = StdRng::seed_from_u64(u64::from(seed));
        base.shuffle(&mut rng);

        let mut perm = [0u8; 512];
        for (i, slot) in perm.iter_mut().enumerate() {
            *slot = base[i % 256];
        }
        Self { perm }
    }

    /// The full 512-entry table.
    pub fn as_slice(&self) -> &[u8] {
        &self.perm
    }

    #[inline]
    fn p(&self, i: usize) -> usize {
        self.perm[i] as usize
    }

    /// Improved Perlin noise at `(x, y, z)`, clamped to [-1, 1].
    ///
    /// Integer lattice points always return exactly 0.
    pub fn noise3(&self, x: f32, y: f32, z: f32) -> f32 {
        let (xf, yf, zf) = (x.floor(), y.floor(), z.floor());

        let xi = (xf as i32 & 255) as usize;
        let yi = (yf as i32 & 255) as usize;
        let zi = (zf as i32 & 255) as usize;

        let x = x - xf;
        let y = y - yf;
        let z = z - zf;

        let u = fade(x);
        let v = fade(y);
        let w = fade(z);

        let a = self.p(xi) + yi;
        let aa = self.p(a) + zi;
        let ab = self.p(a + 1) + zi;
        let b = self.p(xi + 1) + yi;
        let ba = self.p(b) + zi;
        let bb = self.p(b + 1) + zi;

        let value = lerp(
            w,
            lerp(
                v,
                lerp(u, grad(self.p(aa), x, y, z), grad(self.p(ba), x - 1.0, y, z)),
                lerp(u, grad(self.p(ab), x, y - 1.0, z), grad(self.p(bb), x - 1.0, y - 1.0, z)),
            ),
            lerp(
                v,
                lerp(
                    u,
                    grad(self.p(aa + 1), x, y, z - 1.0),
                    grad(self.p(ba + 1), x - 1.0, y, z - 1.0),
                ),
                lerp(
                    u,
                    grad(self.p(ab + 1), x, y - 1.0, z - 1.0),
                    grad(self.p(bb + 1), x - 1.0, y - 1.0, z - 1.0),
                ),
            ),
        );

        value.clamp(-1.0, 1.0)
    }

    /// Unit direction whose angle is the noise value mapped onto a full turn.
    pub fn flow_direction(&self, position: Vec2, time: f32, scale: f32) -> Vec2 {
        let angle = self.noise3(position.x * scale, position.y * scale, time) * TAU;
        Vec2::new(angle.cos(), angle.sin())
    }

    /// Curl of the scalar noise field, `(dn/dy, -dn/dx) * strength`.
    ///
    /// Both derivatives are central differences over [`CURL_EPSILON`] at
    /// [`CURL_SCALE`]; `strength` is applied after differencing.
    pub fn curl_noise(&self, position: Vec2, time: f32, strength: f32) -> Vec2 {
        let eps = CURL_EPSILON;
        let scale = CURL_SCALE;

        let n1 = self.noise3((position.x + eps) * scale, position.y * scale, time);
        let n2 = self.noise3((position.x - eps) * scale, position.y * scale, time);
        let n3 = self.noise3(position.x * scale, (position.y + eps) * scale, time);
        let n4 = self.noise3(position.x * scale, (position.y - eps) * scale, time);

        let dx = (n3 - n4) / (2.0 * eps);
        let dy = (n2 - n1) / (2.0 * eps);

        Vec2::new(dx, dy) * strength
    }
}

impl Default for PermutationTable {
    fn default() -> Self {
        Self::with_seed(DEFAULT_SEED)
    }
}

impl std::fmt::Debug for PermutationTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PermutationTable")
            .field("head", &&self.perm[..8])
            .finish_non_exhaustive()
    }
}

/// The shared table, built on first use and never mutated.
pub fn permutation_table() -> &'static PermutationTable {
    DEFAULT_TABLE.get_or_init(PermutationTable::default)
}

/// [`PermutationTable::noise3`] on the shared table.
#[inline]
pub fn noise3(x: f32, y: f32, z: f32) -> f32 {
    permutation_table().noise3(x, y, z)
}

/// [`PermutationTable::flow_direction`] on the shared table.
#[inline]
pub fn flow_direction(position: Vec2, time: f32, scale: f32) -> Vec2 {
    permutation_table().flow_direction(position, time, scale)
}

/// [`PermutationTable::curl_noise`] on the shared table.
#[inline]
pub fn curl_noise(position: Vec2, time: f32, strength: f32) -> Vec2 {
    permutation_table().curl_noise(position, time, strength)
}

// 6t^5 - 15t^4 + 10t^3
#[inline]
fn fade(t: f32) -> f32 {
    t * t * t * (t * (t * 6.0 - 15.0) + 10.0)
}

#[inline]
fn lerp(t: f32, a: f32, b: f32) -> f32 {
    a + t * (b - a)
}

#[inline]
fn grad(hash: usize, x: f32, y: f32, z: f32) -> f32 {
    let h = hash & 15;
    let u = if h < 8 { x } else { y };
    let v = if h < 4 {
        y
    } else if h == 12 || h == 14 {
        x
    } else {
        z
    };
    (if h & 1 == 0 { u } else { -u }) + (if h & 2 == 0 { v } else { -v })
}
