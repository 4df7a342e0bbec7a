//! Multi-pass rendering pipeline.
//!
//! A frame goes through three stages, in order:
//!
//! 1. **Particle pass** - a fresh target is cleared to the background color
//!    and every live particle is drawn into it as additive glow sprites.
//! 2. **Post-processing** - each [`PostPass`] allocates its own target, clears
//!    it, sets its effect's parameters and draws the previous buffer through
//!    the effect. Passes whose effect is unavailable forward their input
//!    unchanged.
//! 3. **Present** - the last buffer is copied to the visible surface.
//!
//! The pipeline is generic over a [`RenderBackend`]. [`gpu::GpuBackend`] draws
//! with wgpu into a window surface. [`software::SoftwareBackend`] rasterizes
//! on the CPU and is used for headless snapshots and pixel tests.
//!
//! # Example
//!
//! ```ignore
//! let mut pipeline = RenderPipeline::new(width, height)
//!     .with_pass(PassSettings::Vhs(VhsSettings::default()), Box::new(vhs))
//!     .with_pass(PassSettings::ForceField(ForceFieldSettings::default()), Box::new(ff));
//!
//! pipeline.render_frame(&mut backend, pool.as_slice(), pool.time())?;
//! ```

pub mod effect;
pub mod gpu;
pub mod params;
pub mod software;

use bytemuck::{Pod, Zeroable};
use glam::{Vec2, Vec4};

use crate::error::RenderError;
use crate::palette::rgba8;
use crate::particle::Particle;

pub use effect::{
    effect_or_null, Effect, ForceFieldSettings, NullEffect, PassSettings, PostPass, VhsSettings,
};
pub use params::{ParamValue, ShaderParams};

/// Glow layers drawn per particle, outermost first: (radius scale, brightness).
pub const GLOW_LAYERS: [(f32, f32); 3] = [(4.0, 0.1), (2.0, 0.3), (1.0, 1.0)];

/// Default particle pass clear color, rgb(10, 10, 20).
pub fn default_background() -> Vec4 {
    rgba8(10, 10, 20, 255)
}

/// Drawing primitives a pipeline needs from a backend.
///
/// Targets are plain owned values: the pipeline creates one per stage and
/// drops it once the next stage has consumed it.
pub trait RenderBackend {
    /// An off-screen color buffer.
    type Target;

    /// Allocate a target of the given size.
    fn create_target(&mut self, width: u32, height: u32) -> Self::Target;

    /// Fill `target` with `color`.
    fn clear(&mut self, target: &mut Self::Target, color: Vec4);

    /// Draw sprites into `target` with additive blending.
    fn draw_sprites(&mut self, target: &mut Self::Target, sprites: &[GlowSprite]);

    /// Copy `target` to the visible surface, unscaled and unblended.
    fn present(&mut self, target: &Self::Target) -> Result<(), RenderError>;
}

/// One soft disc, laid out for a GPU instance buffer.
///
/// `color` is premultiplied by the particle's fade and layer brightness.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct GlowSprite {
    /// Center in pixels, y down.
    pub center: [f32; 2],
    /// Outer radius in pixels.
    pub radius: f32,
    /// Keeps `color` 16-byte aligned.
    pub _pad: f32,
    /// Premultiplied RGBA added at full coverage.
    pub color: [f32; 4],
}

impl GlowSprite {
    /// A sprite centered at `center` in pixels.
    pub fn new(center: Vec2, radius: f32, color: Vec4) -> Self {
        Self {
            center: center.to_array(),
            radius,
            _pad: 0.0,
            color: color.to_array(),
        }
    }
}

/// Append the glow layers of every visible particle to `out`.
///
/// Particles that have fully faded produce nothing.
pub fn push_glow_sprites(particles: &[Particle], out: &mut Vec<GlowSprite>) {
    out.reserve(particles.len() * GLOW_LAYERS.len());
    for p in particles {
        let fade = p.life_fraction();
        if fade <= 0.0 || p.size <= 0.0 {
            continue;
        }
        for (scale, brightness) in GLOW_LAYERS {
            out.push(GlowSprite::new(
                p.position,
                p.size * scale,
                p.color * (fade * brightness),
            ));
        }
    }
}

/// Coverage of a soft disc at normalized distance `dist` (0 center, 1 edge).
///
/// Solid out to half the radius, then a smoothstep falloff to zero at the
/// edge. The particle shader computes the same curve.
pub fn disc_coverage(dist: f32) -> f32 {
    if dist >= 1.0 {
        return 0.0;
    }
    let t = ((dist - 0.5) / 0.5).clamp(0.0, 1.0);
    1.0 - t * t * (3.0 - 2.0 * t)
}

/// The per-frame pass sequencer.
pub struct RenderPipeline<B: RenderBackend> {
    width: u32,
    height: u32,
    background: Vec4,
    passes: Vec<PostPass<B>>,
    /// Reused across frames.
    sprites: Vec<GlowSprite>,
}

impl<B: RenderBackend> RenderPipeline<B> {
    /// Create a pipeline with no post-processing at a fixed output size.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width: width.max(1),
            height: height.max(1),
            background: default_background(),
            passes: Vec::new(),
            sprites: Vec::new(),
        }
    }

    /// Set the particle pass clear color.
    pub fn with_background(mut self, color: Vec4) -> Self {
        self.background = color;
        self
    }

    /// Append a post-processing pass.
    pub fn with_pass(mut self, settings: PassSettings, effect: Box<dyn Effect<B>>) -> Self {
        self.passes.push(PostPass::new(settings, effect));
        self
    }

    /// Append a post-processing pass after construction.
    pub fn push_pass(&mut self, pass: PostPass<B>) {
        self.passes.push(pass);
    }

    /// Output size in pixels.
    #[inline]
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Particle pass clear color.
    #[inline]
    pub fn background(&self) -> Vec4 {
        self.background
    }

    /// Post-processing passes in draw order.
    pub fn passes(&self) -> &[PostPass<B>] {
        &self.passes
    }

    /// Render one frame and present it.
    pub fn render_frame(
        &mut self,
        backend: &mut B,
        particles: &[Particle],
        time: f32,
    ) -> Result<(), RenderError> {
        let output = self.render_to_target(backend, particles, time);
        backend.present(&output)
    }

    /// Run the particle pass and post-processing, returning the final buffer
    /// without presenting it.
    pub fn render_to_target(
        &mut self,
        backend: &mut B,
        particles: &[Particle],
        time: f32,
    ) -> B::Target {
        let scene = self.particle_pass(backend, particles);
        self.post_process(backend, scene, time)
    }

    /// Clear a new target to the background and draw every particle into it.
    pub fn particle_pass(&mut self, backend: &mut B, particles: &[Particle]) -> B::Target {
        let mut target = backend.create_target(self.width, self.height);
        backend.clear(&mut target, self.background);

        self.sprites.clear();
        push_glow_sprites(particles, &mut self.sprites);
        if !self.sprites.is_empty() {
            backend.draw_sprites(&mut target, &self.sprites);
        }
        target
    }

    /// Chain every post-processing pass over `input`.
    pub fn post_process(&mut self, backend: &mut B, input: B::Target, time: f32) -> B::Target {
        let screen = Vec2::new(self.width as f32, self.height as f32);
        let mut current = input;

        for pass in &mut self.passes {
            if !pass.effect.is_available() {
                tracing::trace!(effect = pass.effect.name(), "pass-through");
                continue;
            }

            let mut target = backend.create_target(self.width, self.height);
            backend.clear(&mut target, pass.settings.clear_color());
            pass.effect.set_parameters(&pass.settings.params(time, screen));
            pass.effect.draw(backend, &current, &mut target);
            current = target;
        }

        current
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::software::{Canvas, SoftwareBackend, SoftwareEffect};

    fn particle(lifetime: f32, max_lifetime: f32) -> Particle {
        let mut p = Particle::new(
            Vec2::new(8.0, 8.0),
            Vec2::ZERO,
            Vec4::new(1.0, 0.5, 0.25, 1.0),
            max_lifetime,
            2.0,
        );
        p.lifetime = lifetime;
        p
    }

    #[test]
    fn test_glow_layers_per_particle() {
        let mut sprites = Vec::new();
        push_glow_sprites(&[particle(10.0, 10.0)], &mut sprites);
        assert_eq!(sprites.len(), 3);
        assert_eq!(sprites[0].radius, 8.0);
        assert_eq!(sprites[1].radius, 4.0);
        assert_eq!(sprites[2].radius, 2.0);
        assert!((sprites[0].color[0] - 0.1).abs() < 1e-6);
        assert!((sprites[1].color[0] - 0.3).abs() < 1e-6);
        assert_eq!(sprites[2].color, [1.0, 0.5, 0.25, 1.0]);
    }

    #[test]
    fn test_glow_fades_with_lifetime() {
        let mut sprites = Vec::new();
        push_glow_sprites(&[particle(2.5, 10.0)], &mut sprites);
        assert!((sprites[2].color[0] - 0.25).abs() < 1e-6);
        assert!((sprites[2].color[3] - 0.25).abs() < 1e-6);

        sprites.clear();
        push_glow_sprites(&[particle(0.0, 10.0)], &mut sprites);
        assert!(sprites.is_empty());
    }

    #[test]
    fn test_disc_coverage() {
        assert_eq!(disc_coverage(0.0), 1.0);
        assert_eq!(disc_coverage(0.5), 1.0);
        assert!((disc_coverage(0.75) - 0.5).abs() < 1e-6);
        assert_eq!(disc_coverage(1.0), 0.0);
        assert_eq!(disc_coverage(2.0), 0.0);
    }

    #[test]
    fn test_sprite_stride() {
        assert_eq!(std::mem::size_of::<GlowSprite>(), 32);
    }

    #[test]
    fn test_empty_frame_is_background() {
        let mut backend = SoftwareBackend::new();
        let mut pipeline = RenderPipeline::<SoftwareBackend>::new(4, 3);
        pipeline.render_frame(&mut backend, &[], 0.0).unwrap();

        let surface = backend.surface().unwrap();
        assert_eq!(surface.size(), (4, 3));
        assert!(surface.pixels().iter().all(|&px| px == default_background()));
    }

    #[test]
    fn test_passes_run_in_order_with_own_targets() {
        let mut backend = SoftwareBackend::new();
        let add = |amount: f32| {
            SoftwareEffect::new("add", move |src: &Canvas, _: &ShaderParams, dst: &mut Canvas| {
                for (d, s) in dst.pixels_mut().iter_mut().zip(src.pixels()) {
                    *d = *s + Vec4::splat(amount);
                }
            })
        };
        let mut pipeline = RenderPipeline::new(2, 2)
            .with_background(Vec4::ZERO)
            .with_pass(PassSettings::Vhs(VhsSettings::default()), Box::new(add(1.0)))
            .with_pass(
                PassSettings::ForceField(ForceFieldSettings::default()),
                Box::new(add(2.0)),
            );

        pipeline.render_frame(&mut backend, &[], 0.0).unwrap();
        let surface = backend.surface().unwrap();
        assert_eq!(surface.pixel(0, 0), Vec4::splat(3.0));
        // Scene plus one target per pass.
        assert_eq!(backend.targets_created(), 3);
    }

    #[test]
    fn test_effect_receives_time_and_screen_size() {
        use std::sync::{Arc, Mutex};

        let seen = Arc::new(Mutex::new(ShaderParams::new()));
        let sink = Arc::clone(&seen);
        let effect = SoftwareEffect::new("probe", move |src: &Canvas, params: &ShaderParams, dst: &mut Canvas| {
            *sink.lock().unwrap() = params.clone();
            dst.copy_from(src);
        });

        let mut backend = SoftwareBackend::new();
        let mut pipeline = RenderPipeline::new(16, 9).with_pass(
            PassSettings::ForceField(ForceFieldSettings::default()),
            Box::new(effect),
        );
        pipeline.render_frame(&mut backend, &[], 4.5).unwrap();

        let params = seen.lock().unwrap();
        assert_eq!(params.get_f32("Time"), Some(4.5));
        assert_eq!(params.get("ScreenSize"), Some(&ParamValue::Vec2(Vec2::new(16.0, 9.0))));
        assert_eq!(params.get_f32("Intensity"), Some(0.60));
    }

    #[test]
    fn test_null_effect_skips_pass() {
        let mut backend = SoftwareBackend::new();
        let mut pipeline = RenderPipeline::new(8, 8)
            .with_pass(PassSettings::Vhs(VhsSettings::default()), Box::new(NullEffect::new("vhs")));
        assert!(!pipeline.passes()[0].is_active());

        pipeline.render_frame(&mut backend, &[], 0.0).unwrap();
        assert_eq!(backend.targets_created(), 1);
    }
}
