//! Post-processing effects and the passes that drive them.
//!
//! An [`Effect`] is an opaque full-screen program. The pipeline can only set
//! its named parameters and ask it to draw a source buffer into a target
//! buffer. When an effect could not be loaded, the host installs a
//! [`NullEffect`] in its place and the pipeline forwards the input unchanged.
//!
//! # Effects
//!
//! | Pass | Parameters | Clear color |
//! |------|------------|-------------|
//! | [`PassSettings::Vhs`] | `Time`, `NoiseAmount`, `ScanlineIntensity`, `ChromaticAberration`, `VignetteStrength` | opaque black |
//! | [`PassSettings::ForceField`] | `Time`, `ScreenSize`, `Intensity` | transparent |

use glam::{Vec2, Vec4};
use serde::{Deserialize, Serialize};

use super::params::{ParamValue, ShaderParams};
use super::RenderBackend;
use crate::error::EffectError;

/// A full-screen effect usable with backend `B`.
pub trait Effect<B: RenderBackend> {
    /// Name used in logs.
    fn name(&self) -> &str;

    /// Whether the effect can draw. Unavailable effects are skipped.
    fn is_available(&self) -> bool {
        true
    }

    /// Set one named parameter. Unknown names are ignored.
    fn set_parameter(&mut self, name: &str, value: ParamValue);

    /// Draw `source` through this effect into `target`.
    fn draw(&mut self, backend: &mut B, source: &B::Target, target: &mut B::Target);

    /// Set every parameter in `params`.
    fn set_parameters(&mut self, params: &ShaderParams) {
        for (name, value) in params.iter() {
            self.set_parameter(name, *value);
        }
    }
}

/// Stand-in for an effect that failed to load. Never draws.
#[derive(Clone, Debug)]
pub struct NullEffect {
    name: String,
}

impl NullEffect {
    /// A placeholder for the effect called `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl<B: RenderBackend> Effect<B> for NullEffect {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_available(&self) -> bool {
        false
    }

    fn set_parameter(&mut self, _name: &str, _value: ParamValue) {}

    fn draw(&mut self, _backend: &mut B, _source: &B::Target, _target: &mut B::Target) {}
}

/// Unwrap a loaded effect, or log the failure and stand in a [`NullEffect`].
///
/// The pass keeps its place in the chain and forwards its input.
pub fn effect_or_null<B: RenderBackend>(
    name: &str,
    loaded: Result<Box<dyn Effect<B>>, EffectError>,
) -> Box<dyn Effect<B>> {
    match loaded {
        Ok(effect) => effect,
        Err(err) => {
            tracing::warn!(
                effect = name,
                error = %err,
                "effect unavailable, pass will forward its input"
            );
            Box::new(NullEffect::new(name))
        }
    }
}

/// Tuning constants for the VHS degradation filter.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VhsSettings {
    /// Strength of the per-pixel grain.
    pub noise_amount: f32,
    /// Darkening of the scanline bands.
    pub scanline_intensity: f32,
    /// Horizontal red/blue split in UV units.
    pub chromatic_aberration: f32,
    /// How fast the corners darken.
    pub vignette_strength: f32,
}

impl Default for VhsSettings {
    fn default() -> Self {
        Self {
            noise_amount: 0.05,
            scanline_intensity: 0.02,
            chromatic_aberration: 0.002,
            vignette_strength: 0.4,
        }
    }
}

/// Tuning constants for the force-field visualization.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForceFieldSettings {
    /// Brightness of the overlaid flow lines.
    pub intensity: f32,
}

impl Default for ForceFieldSettings {
    fn default() -> Self {
        Self { intensity: 0.60 }
    }
}

/// Which effect a pass runs, with its tuning constants.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "effect", rename_all = "snake_case")]
pub enum PassSettings {
    Vhs(VhsSettings),
    ForceField(ForceFieldSettings),
}

impl PassSettings {
    /// Short name, also the default shader file stem.
    pub fn name(&self) -> &'static str {
        match self {
            PassSettings::Vhs(_) => "vhs",
            PassSettings::ForceField(_) => "force_field",
        }
    }

    /// Color the pass target is cleared to before drawing.
    pub fn clear_color(&self) -> Vec4 {
        match self {
            PassSettings::Vhs(_) => Vec4::new(0.0, 0.0, 0.0, 1.0),
            PassSettings::ForceField(_) => Vec4::ZERO,
        }
    }

    /// Parameters for this frame.
    pub fn params(&self, time: f32, screen_size: Vec2) -> ShaderParams {
        match self {
            PassSettings::Vhs(vhs) => ShaderParams::new()
                .with("Time", time)
                .with("NoiseAmount", vhs.noise_amount)
                .with("ScanlineIntensity", vhs.scanline_intensity)
                .with("ChromaticAberration", vhs.chromatic_aberration)
                .with("VignetteStrength", vhs.vignette_strength),
            PassSettings::ForceField(ff) => ShaderParams::new()
                .with("Time", time)
                .with("ScreenSize", screen_size)
                .with("Intensity", ff.intensity),
        }
    }
}

/// One post-processing stage: settings plus the effect that realizes them.
pub struct PostPass<B: RenderBackend> {
    /// Effect kind and tuning constants.
    pub settings: PassSettings,
    /// The loaded effect, or a [`NullEffect`].
    pub effect: Box<dyn Effect<B>>,
}

impl<B: RenderBackend> PostPass<B> {
    /// Pair `settings` with the effect that draws them.
    pub fn new(settings: PassSettings, effect: Box<dyn Effect<B>>) -> Self {
        Self { settings, effect }
    }

    /// Whether the pass will draw or pass its input through.
    pub fn is_active(&self) -> bool {
        self.effect.is_available()
    }
}
