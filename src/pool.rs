//! Fixed-capacity particle pool.
//!
//! The pool owns every particle. Storage is a contiguous buffer allocated to
//! full capacity up front and never grown. Expired particles are swap-removed,
//! so iteration order is not stable across frames but no live particle is
//! ever skipped.
//!
//! # Spawn Policy
//!
//! | Request | Outcome |
//! |---------|---------|
//! | Pool has room, inputs valid | Particle appended, `spawn` returns `true` |
//! | Pool full | Dropped silently, counted in [`PoolStats::dropped`] |
//! | Non-finite input, lifetime <= 0 or size <= 0 | Rejected, counted in [`PoolStats::rejected`] |
//!
//! # Example
//!
//! ```ignore
//! let mut pool = ParticlePool::new(10_000).with_force(ForceField::Curl { strength: 50.0 });
//! pool.spawn(Vec2::ZERO, Vec2::new(100.0, 0.0), Vec4::ONE, 30.0, 2.0);
//! pool.update(1.0 / 60.0);
//! for p in pool.particles() {
//!     // draw p
//! }
//! ```

use glam::{Vec2, Vec4};

use crate::forces::{total_force, ForceField};
use crate::particle::{ForceIntegration, Particle};

/// Size used by [`ParticlePool::spawn_default_size`].
pub const DEFAULT_PARTICLE_SIZE: f32 = 2.0;

/// Running counters for diagnostics.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PoolStats {
    /// Particles accepted by `spawn`.
    pub spawned: u64,
    /// Spawns dropped because the pool was full.
    pub dropped: u64,
    /// Spawns rejected for invalid numeric input.
    pub rejected: u64,
    /// Particles removed after their lifetime ran out.
    pub expired: u64,
}

/// Bounded collection of live particles plus the forces acting on them.
#[derive(Clone, Debug)]
pub struct ParticlePool {
    particles: Vec<Particle>,
    capacity: usize,
    forces: Vec<ForceField>,
    integration: ForceIntegration,
    time: f32,
    stats: PoolStats,
}

impl ParticlePool {
    /// Create an empty pool that never holds more than `capacity` particles.
    pub fn new(capacity: usize) -> Self {
        Self {
            particles: Vec::with_capacity(capacity),
            capacity,
            forces: Vec::new(),
            integration: ForceIntegration::default(),
            time: 0.0,
            stats: PoolStats::default(),
        }
    }

    /// Add a force field applied to every particle on update.
    pub fn with_force(mut self, force: ForceField) -> Self {
        self.forces.push(force);
        self
    }

    /// Add several force fields.
    pub fn with_forces<I: IntoIterator<Item = ForceField>>(mut self, forces: I) -> Self {
        self.forces.extend(forces);
        self
    }

    /// Choose how force is folded into velocity.
    pub fn with_integration(mut self, integration: ForceIntegration) -> Self {
        self.integration = integration;
        self
    }

    /// Spawn a particle if there is room.
    ///
    /// Returns `false` when the pool is full or the input is invalid. Neither
    /// case is an error.
    pub fn spawn(
        &mut self,
        position: Vec2,
        velocity: Vec2,
        color: Vec4,
        lifetime: f32,
        size: f32,
    ) -> bool {
        if !valid_spawn(position, velocity, color, lifetime, size) {
            self.stats.rejected += 1;
            tracing::debug!(lifetime, size, "rejected spawn with invalid input");
            return false;
        }

        if self.particles.len() >= self.capacity {
            self.stats.dropped += 1;
            return false;
        }

        self.particles
            .push(Particle::new(position, velocity, color, lifetime, size));
        self.stats.spawned += 1;
        true
    }

    /// [`spawn`](Self::spawn) with [`DEFAULT_PARTICLE_SIZE`].
    pub fn spawn_default_size(
        &mut self,
        position: Vec2,
        velocity: Vec2,
        color: Vec4,
        lifetime: f32,
    ) -> bool {
        self.spawn(position, velocity, color, lifetime, DEFAULT_PARTICLE_SIZE)
    }

    /// Advance every particle by `dt` seconds and drop the ones that expire.
    ///
    /// Forces are sampled at the simulation time before this step. A
    /// non-finite or non-positive `dt` leaves the pool untouched.
    pub fn update(&mut self, dt: f32) {
        if !(dt.is_finite() && dt > 0.0) {
            return;
        }

        let time = self.time;
        let forces = &self.forces;
        let integration = self.integration;

        let mut i = 0;
        while i < self.particles.len() {
            let particle = &mut self.particles[i];
            let force = total_force(forces, particle.position, time);
            particle.integrate(force, dt, integration);

            if particle.is_alive() {
                i += 1;
            } else {
                // The last particle moves into slot i and is evaluated next.
                self.particles.swap_remove(i);
                self.stats.expired += 1;
            }
        }

        self.time += dt;
    }

    /// Live particles, in storage order.
    pub fn particles(&self) -> std::slice::Iter<'_, Particle> {
        self.particles.iter()
    }

    /// Live particles as a slice.
    pub fn as_slice(&self) -> &[Particle] {
        &self.particles
    }

    /// Number of live particles.
    #[inline]
    pub fn len(&self) -> usize {
        self.particles.len()
    }

    /// Whether no particles are alive.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    /// Maximum number of live particles.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Accumulated simulation time in seconds.
    #[inline]
    pub fn time(&self) -> f32 {
        self.time
    }

    /// Configured force fields.
    pub fn forces(&self) -> &[ForceField] {
        &self.forces
    }

    /// Configured force integration mode.
    pub fn integration(&self) -> ForceIntegration {
        self.integration
    }

    /// Diagnostic counters.
    pub fn stats(&self) -> PoolStats {
        self.stats
    }

    /// Remove every particle. Time and counters are kept.
    pub fn clear(&mut self) {
        self.particles.clear();
    }
}

fn valid_spawn(position: Vec2, velocity: Vec2, color: Vec4, lifetime: f32, size: f32) -> bool {
    position.is_finite()
        && velocity.is_finite()
        && color.is_finite()
        && lifetime.is_finite()
        && lifetime > 0.0
        && size.is_finite()
        && size > 0.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spawn_simple(pool: &mut ParticlePool, lifetime: f32) -> bool {
        pool.spawn(Vec2::ZERO, Vec2::ZERO, Vec4::ONE, lifetime, 1.0)
    }

    #[test]
    fn test_capacity_is_enforced() {
        let mut pool = ParticlePool::new(8);
        for _ in 0..8 {
            assert!(spawn_simple(&mut pool, 1.0));
        }
        assert!(!spawn_simple(&mut pool, 1.0));
        assert_eq!(pool.len(), 8);
        assert_eq!(pool.stats().dropped, 1);
    }

    #[test]
    fn test_zero_capacity_pool() {
        let mut pool = ParticlePool::new(0);
        assert!(!spawn_simple(&mut pool, 1.0));
        assert!(pool.is_empty());
        pool.update(0.1);
        assert!(pool.is_empty());
    }

    #[test]
    fn test_invalid_spawns_are_rejected() {
        let mut pool = ParticlePool::new(4);
        assert!(!pool.spawn(Vec2::ZERO, Vec2::ZERO, Vec4::ONE, 0.0, 1.0));
        assert!(!pool.spawn(Vec2::ZERO, Vec2::ZERO, Vec4::ONE, -1.0, 1.0));
        assert!(!pool.spawn(Vec2::ZERO, Vec2::ZERO, Vec4::ONE, 1.0, 0.0));
        assert!(!pool.spawn(Vec2::ZERO, Vec2::ZERO, Vec4::ONE, 1.0, -2.0));
        assert!(!pool.spawn(Vec2::NAN, Vec2::ZERO, Vec4::ONE, 1.0, 1.0));
        assert!(!pool.spawn(Vec2::ZERO, Vec2::ZERO, Vec4::ONE, f32::INFINITY, 1.0));
        assert!(pool.is_empty());
        assert_eq!(pool.stats().rejected, 6);
    }

    #[test]
    fn test_default_size() {
        let mut pool = ParticlePool::new(1);
        assert!(pool.spawn_default_size(Vec2::ZERO, Vec2::ZERO, Vec4::ONE, 1.0));
        assert_eq!(pool.as_slice()[0].size, DEFAULT_PARTICLE_SIZE);
    }

    #[test]
    fn test_update_decrements_lifetime_by_dt() {
        let mut pool = ParticlePool::new(1);
        spawn_simple(&mut pool, 5.0);
        pool.update(0.25);
        assert_eq!(pool.as_slice()[0].lifetime, 4.75);
        assert_eq!(pool.time(), 0.25);
    }

    #[test]
    fn test_invalid_dt_is_ignored() {
        let mut pool = ParticlePool::new(1);
        spawn_simple(&mut pool, 5.0);
        for dt in [0.0, -1.0, f32::NAN, f32::INFINITY] {
            pool.update(dt);
        }
        assert_eq!(pool.as_slice()[0].lifetime, 5.0);
        assert_eq!(pool.time(), 0.0);
    }

    #[test]
    fn test_expired_particles_are_removed_same_update() {
        let mut pool = ParticlePool::new(4);
        spawn_simple(&mut pool, 1.0);
        pool.update(0.5);
        assert_eq!(pool.len(), 1);
        pool.update(0.5);
        assert_eq!(pool.len(), 0);
        assert_eq!(pool.particles().count(), 0);
        assert_eq!(pool.stats().expired, 1);
    }

    #[test]
    fn test_swap_remove_evaluates_moved_particle() {
        let mut pool = ParticlePool::new(4);
        // Slot 0 expires this frame; slot 2 is swapped into it and must still move.
        pool.spawn(Vec2::ZERO, Vec2::ZERO, Vec4::ONE, 0.1, 1.0);
        pool.spawn(Vec2::ZERO, Vec2::new(1.0, 0.0), Vec4::ONE, 5.0, 1.0);
        pool.spawn(Vec2::ZERO, Vec2::new(0.0, 1.0), Vec4::ONE, 5.0, 1.0);

        pool.update(1.0);

        assert_eq!(pool.len(), 2);
        for p in pool.particles() {
            assert_eq!(p.lifetime, 4.0);
            assert_eq!(p.position.length(), 1.0);
        }
    }

    #[test]
    fn test_forces_change_velocity() {
        let center = Vec2::new(100.0, 0.0);
        let mut pool = ParticlePool::new(1).with_force(ForceField::Vortex {
            center,
            attraction: 100.0,
            spiral: 0.0,
        });
        spawn_simple(&mut pool, 10.0);
        pool.update(0.1);
        let p = pool.as_slice()[0];
        assert!(p.velocity.x > 0.0);
        assert!(p.velocity.y.abs() < 1e-6);
    }

    #[test]
    fn test_particles_is_restartable() {
        let mut pool = ParticlePool::new(3);
        for _ in 0..3 {
            spawn_simple(&mut pool, 1.0);
        }
        assert_eq!(pool.particles().count(), 3);
        assert_eq!(pool.particles().count(), 3);
    }

    #[test]
    fn test_clear_keeps_time_and_stats() {
        let mut pool = ParticlePool::new(4);
        spawn_simple(&mut pool, 1.0);
        spawn_simple(&mut pool, 1.0);
        pool.update(0.25);
        pool.clear();
        assert!(pool.is_empty());
        assert_eq!(pool.time(), 0.25);
        assert_eq!(pool.stats().spawned, 2);
        assert!(spawn_simple(&mut pool, 1.0));
    }
}
