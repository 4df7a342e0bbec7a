//! # Reverie - dreamy particle visual effects
//!
//! Thousands of short-lived glowing particles drift under procedural force
//! fields, then the frame is run through full-screen post-processing passes
//! (a VHS-style degradation filter and a force-field overlay) before it is
//! presented.
//!
//! ## Quick Start
//!
//! ```ignore
//! use reverie::prelude::*;
//!
//! let config = ReverieConfig::default();
//! let mut driver = Driver::from_config(&config);
//! let mut backend = SoftwareBackend::new();
//! let mut pipeline = RenderPipeline::new(config.width, config.height);
//!
//! for _ in 0..60 {
//!     driver.step(1.0 / 60.0);
//! }
//! driver.render(&mut pipeline, &mut backend)?;
//! ```
//!
//! ## Core Concepts
//!
//! ### Particles and the pool
//!
//! A [`ParticlePool`] holds at most `capacity` particles. [`ParticlePool::spawn`]
//! silently drops requests once the pool is full and rejects invalid input.
//! [`ParticlePool::update`] applies every configured [`ForceField`], integrates
//! position and lifetime, and swap-removes whatever expired.
//!
//! ### Forces
//!
//! | Force | Description |
//! |-------|-------------|
//! | [`ForceField::Curl`] | Curl of 3D gradient noise, a divergence-free swirl |
//! | [`ForceField::Vortex`] | `1/d` pull toward a center plus tangential spin |
//! | [`ForceField::Flow`] | Fixed-strength push along the noise angle |
//!
//! ### Rendering
//!
//! A [`RenderPipeline`] draws particles as additive glow into an off-screen
//! target, chains its [`PostPass`]es, and presents the result. Passes whose
//! effect failed to load forward their input unchanged. The pipeline runs on
//! any [`RenderBackend`]: the wgpu [`GpuBackend`] or the CPU
//! [`SoftwareBackend`].
//!
//! ## Binary
//!
//! ```text
//! reverie [config.json] [--snapshot out.png [frames]]
//! ```

pub mod app;
pub mod config;
pub mod driver;
pub mod emitter;
pub mod error;
pub mod forces;
pub mod noise;
pub mod palette;
pub mod particle;
pub mod pool;
pub mod render;
pub mod time;

pub use config::{PassConfig, ReverieConfig};
pub use driver::Driver;
pub use emitter::Emitter;
pub use error::{AppError, ConfigError, EffectError, GpuError, RenderError};
pub use forces::ForceField;
pub use glam::{Vec2, Vec4};
pub use palette::Palette;
pub use particle::{ForceIntegration, Particle};
pub use pool::{ParticlePool, PoolStats};
pub use render::gpu::{GpuBackend, ShaderEffect};
pub use render::software::{Canvas, SoftwareBackend, SoftwareEffect};
pub use render::{
    Effect, ForceFieldSettings, NullEffect, PassSettings, PostPass, RenderBackend, RenderPipeline,
    ShaderParams, VhsSettings,
};
pub use time::Time;

/// Convenient re-exports for common usage.
///
/// ```ignore
/// use reverie::prelude::*;
/// ```
pub mod prelude {
    pub use crate::config::{PassConfig, ReverieConfig};
    pub use crate::driver::Driver;
    pub use crate::emitter::Emitter;
    pub use crate::forces::ForceField;
    pub use crate::palette::Palette;
    pub use crate::particle::{ForceIntegration, Particle};
    pub use crate::pool::ParticlePool;
    pub use crate::render::software::{Canvas, SoftwareBackend, SoftwareEffect};
    pub use crate::render::{
        Effect, ForceFieldSettings, NullEffect, PassSettings, RenderBackend, RenderPipeline,
        ShaderParams, VhsSettings,
    };
    pub use crate::time::Time;
    pub use crate::{Vec2, Vec4};
}
