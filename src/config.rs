//! Scene configuration.
//!
//! Everything the binary needs to build a scene, loadable from JSON. Missing
//! fields take their defaults, so `{}` is a valid file that reproduces the
//! default dream scene.
//!
//! ```json
//! {
//!     "width": 1280,
//!     "height": 720,
//!     "forces": [
//!         { "type": "curl", "strength": 50.0 },
//!         { "type": "vortex", "center": [640.0, 360.0], "attraction": 400.0, "spiral": 250.0 }
//!     ],
//!     "passes": [
//!         { "effect": "vhs", "shader": "assets/shaders/vhs.wgsl", "noise_amount": 0.08 }
//!     ]
//! }
//! ```

use std::path::{Path, PathBuf};

use glam::Vec4;
use serde::{Deserialize, Serialize};

use crate::emitter::Emitter;
use crate::error::ConfigError;
use crate::forces::ForceField;
use crate::palette::rgba8;
use crate::particle::ForceIntegration;
use crate::pool::ParticlePool;
use crate::render::{ForceFieldSettings, PassSettings, VhsSettings};

/// Directory the default pass shaders are loaded from.
pub const SHADER_DIR: &str = "assets/shaders";

/// Largest pool a config may ask for. The pool allocates all of it up front.
pub const MAX_CAPACITY: usize = 1_000_000;

/// One post-processing pass: effect kind, tuning and shader file.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PassConfig {
    #[serde(flatten)]
    pub settings: PassSettings,
    /// Effect body. Defaults to `assets/shaders/<effect>.wgsl`.
    #[serde(default)]
    pub shader: Option<PathBuf>,
}

impl PassConfig {
    /// A pass loading its default shader file.
    pub fn new(settings: PassSettings) -> Self {
        Self {
            settings,
            shader: None,
        }
    }

    /// Load the effect body from `path` instead.
    pub fn with_shader(mut self, path: impl Into<PathBuf>) -> Self {
        self.shader = Some(path.into());
        self
    }

    /// The shader file to load for this pass.
    pub fn shader_path(&self) -> PathBuf {
        self.shader
            .clone()
            .unwrap_or_else(|| Path::new(SHADER_DIR).join(format!("{}.wgsl", self.settings.name())))
    }
}

/// Complete scene description.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReverieConfig {
    /// Window title.
    pub title: String,
    /// Output width in pixels.
    pub width: u32,
    /// Output height in pixels.
    pub height: u32,
    /// Maximum live particles.
    pub capacity: usize,
    /// Particle pass clear color, 8-bit RGBA.
    pub background: [u8; 4],
    /// Force fields applied every update.
    pub forces: Vec<ForceField>,
    /// How forces change velocity.
    pub integration: ForceIntegration,
    /// Emitters. `None` uses [`Emitter::dream_scene`] for the output size.
    pub emitters: Option<Vec<Emitter>>,
    /// Post-processing chain, in order.
    pub passes: Vec<PassConfig>,
    /// Seed for emission randomness.
    pub seed: u64,
}

impl Default for ReverieConfig {
    fn default() -> Self {
        Self {
            title: "Reverie".to_string(),
            width: 2560,
            height: 1440,
            capacity: 10_000,
            background: [10, 10, 20, 255],
            forces: vec![ForceField::default()],
            integration: ForceIntegration::default(),
            emitters: None,
            passes: vec![
                PassConfig::new(PassSettings::Vhs(VhsSettings::default())),
                PassConfig::new(PassSettings::ForceField(ForceFieldSettings::default())),
            ],
            seed: 0,
        }
    }
}

impl ReverieConfig {
    /// Same as [`ReverieConfig::default`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Read and validate a JSON config file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_json(&text)?;
        tracing::info!(path = %path.display(), "loaded config");
        Ok(config)
    }

    /// Parse and validate JSON.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Check values that would make the scene meaningless.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::Invalid(format!(
                "output size must be non-zero, got {}x{}",
                self.width, self.height
            )));
        }
        if self.capacity == 0 || self.capacity > MAX_CAPACITY {
            return Err(ConfigError::Invalid(format!(
                "capacity must be between 1 and {MAX_CAPACITY}, got {}",
                self.capacity
            )));
        }
        if let Some(emitters) = &self.emitters {
            for (i, e) in emitters.iter().enumerate() {
                let valid = e.lifetime > 0.0 && e.size_min.min(e.size_max) > 0.0;
                if !valid {
                    return Err(ConfigError::Invalid(format!(
                        "emitter {i} needs a positive lifetime and size"
                    )));
                }
            }
        }
        Ok(())
    }

    /// Set the window title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Set the output size in pixels.
    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Set the pool capacity.
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Set the clear color as 8-bit RGBA.
    pub fn with_background(mut self, rgba: [u8; 4]) -> Self {
        self.background = rgba;
        self
    }

    /// Replace the force list.
    pub fn with_forces(mut self, forces: Vec<ForceField>) -> Self {
        self.forces = forces;
        self
    }

    /// Set how forces change velocity.
    pub fn with_integration(mut self, integration: ForceIntegration) -> Self {
        self.integration = integration;
        self
    }

    /// Replace the default scene emitters.
    pub fn with_emitters(mut self, emitters: Vec<Emitter>) -> Self {
        self.emitters = Some(emitters);
        self
    }

    /// Replace the post-processing chain.
    pub fn with_passes(mut self, passes: Vec<PassConfig>) -> Self {
        self.passes = passes;
        self
    }

    /// Set the emission seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Background as linear RGBA.
    pub fn background_color(&self) -> Vec4 {
        let [r, g, b, a] = self.background;
        rgba8(r, g, b, a)
    }

    /// The configured emitters, or the default scene's.
    pub fn resolved_emitters(&self) -> Vec<Emitter> {
        self.emitters
            .clone()
            .unwrap_or_else(|| Emitter::dream_scene(self.width, self.height))
    }

    /// An empty pool with the configured capacity, forces and integration.
    pub fn build_pool(&self) -> ParticlePool {
        ParticlePool::new(self.capacity)
            .with_forces(self.forces.iter().copied())
            .with_integration(self.integration)
    }
}
