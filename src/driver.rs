//! The per-frame update/draw cycle.
//!
//! [`Driver`] owns the pool and the emitters. Each frame the host calls
//! [`step`](Driver::step) with the measured delta, then
//! [`render`](Driver::render). The update for a frame always completes
//! before that frame is drawn, and simulation time only advances by the
//! deltas passed in.
//!
//! ```ignore
//! let mut driver = Driver::from_config(&config);
//! loop {
//!     driver.step(time.tick());
//!     driver.render(&mut pipeline, &mut backend)?;
//! }
//! ```

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::config::ReverieConfig;
use crate::emitter::Emitter;
use crate::error::RenderError;
use crate::pool::ParticlePool;
use crate::render::{RenderBackend, RenderPipeline};

/// Seconds between debug stats lines.
const STATS_INTERVAL: f32 = 1.0;

/// Owns the simulation state and runs one frame at a time.
pub struct Driver {
    pool: ParticlePool,
    emitters: Vec<Emitter>,
    rng: StdRng,
    frames: u64,
    since_stats: f32,
}

impl Driver {
    /// Drive `pool` with `emitters`, seeding emission randomness with `seed`.
    pub fn new(pool: ParticlePool, emitters: Vec<Emitter>, seed: u64) -> Self {
        Self {
            pool,
            emitters,
            rng: StdRng::seed_from_u64(seed),
            frames: 0,
            since_stats: 0.0,
        }
    }

    /// Build the pool and emitters described by `config`.
    pub fn from_config(config: &ReverieConfig) -> Self {
        Self::new(config.build_pool(), config.resolved_emitters(), config.seed)
    }

    /// Advance one frame: emit, then integrate by `dt` seconds.
    pub fn step(&mut self, dt: f32) {
        for emitter in &self.emitters {
            emitter.emit(&mut self.pool, &mut self.rng);
        }
        self.pool.update(dt);
        self.frames += 1;

        if dt.is_finite() && dt > 0.0 {
            self.since_stats += dt;
        }
        if self.since_stats >= STATS_INTERVAL {
            self.since_stats = 0.0;
            let stats = self.pool.stats();
            tracing::debug!(
                frame = self.frames,
                time = self.pool.time(),
                live = self.pool.len(),
                spawned = stats.spawned,
                dropped = stats.dropped,
                rejected = stats.rejected,
                expired = stats.expired,
                "frame stats"
            );
        }
    }

    /// Draw the current particles through `pipeline` and present.
    pub fn render<B: RenderBackend>(
        &self,
        pipeline: &mut RenderPipeline<B>,
        backend: &mut B,
    ) -> Result<(), RenderError> {
        pipeline.render_frame(backend, self.pool.as_slice(), self.pool.time())
    }

    /// The particle pool.
    pub fn pool(&self) -> &ParticlePool {
        &self.pool
    }

    /// Mutable access to the pool, for spawning outside the emitters.
    pub fn pool_mut(&mut self) -> &mut ParticlePool {
        &mut self.pool
    }

    /// Emitters fired at the start of every step.
    pub fn emitters(&self) -> &[Emitter] {
        &self.emitters
    }

    /// Frames stepped so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }
}
