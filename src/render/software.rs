//! CPU render backend.
//!
//! Targets are [`Canvas`]es of linear RGBA floats. Sprites are rasterized at
//! pixel centers with the same soft-disc falloff and additive blending as the
//! GPU particle shader, so a frame rendered here has the same structure as one
//! rendered on the GPU. Effects are plain closures ([`SoftwareEffect`]).
//!
//! Used by the snapshot mode and by every pixel-level test.

use glam::{Vec2, Vec4};
use image::{Rgba, RgbaImage};

use super::effect::Effect;
use super::params::{ParamValue, ShaderParams};
use super::{disc_coverage, GlowSprite, RenderBackend};
use crate::error::RenderError;

/// A linear RGBA float image, row-major, origin top-left.
#[derive(Clone, Debug, PartialEq)]
pub struct Canvas {
    width: u32,
    height: u32,
    pixels: Vec<Vec4>,
}

impl Canvas {
    /// A transparent black canvas.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![Vec4::ZERO; width as usize * height as usize],
        }
    }

    /// Width and height in pixels.
    #[inline]
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Row-major pixels.
    pub fn pixels(&self) -> &[Vec4] {
        &self.pixels
    }

    /// Mutable row-major pixels.
    pub fn pixels_mut(&mut self) -> &mut [Vec4] {
        &mut self.pixels
    }

    /// Pixel at `(x, y)`. Out of range reads return transparent black.
    pub fn pixel(&self, x: u32, y: u32) -> Vec4 {
        if x >= self.width || y >= self.height {
            return Vec4::ZERO;
        }
        self.pixels[self.index(x, y)]
    }

    /// Overwrite one pixel. Out of range writes are ignored.
    pub fn set_pixel(&mut self, x: u32, y: u32, color: Vec4) {
        if x < self.width && y < self.height {
            let idx = self.index(x, y);
            self.pixels[idx] = color;
        }
    }

    /// Set every pixel to `color`.
    pub fn fill(&mut self, color: Vec4) {
        self.pixels.fill(color);
    }

    /// Copy `other` into this canvas, top-left aligned, without scaling.
    pub fn copy_from(&mut self, other: &Canvas) {
        if self.size() == other.size() {
            self.pixels.copy_from_slice(&other.pixels);
            return;
        }
        let w = self.width.min(other.width);
        let h = self.height.min(other.height);
        for y in 0..h {
            for x in 0..w {
                self.set_pixel(x, y, other.pixel(x, y));
            }
        }
    }

    /// Nearest-neighbour sample at normalized `uv`, clamped to the edge.
    pub fn sample(&self, uv: Vec2) -> Vec4 {
        if self.pixels.is_empty() {
            return Vec4::ZERO;
        }
        let x = (uv.x * self.width as f32).floor().clamp(0.0, (self.width - 1) as f32) as u32;
        let y = (uv.y * self.height as f32).floor().clamp(0.0, (self.height - 1) as f32) as u32;
        self.pixel(x, y)
    }

    /// Add `sprite` with additive blending.
    pub fn draw_sprite(&mut self, sprite: &GlowSprite) {
        let radius = sprite.radius;
        if radius <= 0.0 || self.pixels.is_empty() {
            return;
        }
        let center = Vec2::from_array(sprite.center);
        let color = Vec4::from_array(sprite.color);

        let x0 = (center.x - radius).floor().max(0.0) as u32;
        let y0 = (center.y - radius).floor().max(0.0) as u32;
        let x1 = ((center.x + radius).ceil().max(0.0) as u32).min(self.width);
        let y1 = ((center.y + radius).ceil().max(0.0) as u32).min(self.height);

        for y in y0..y1 {
            for x in x0..x1 {
                let p = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
                let coverage = disc_coverage(p.distance(center) / radius);
                if coverage > 0.0 {
                    let idx = self.index(x, y);
                    self.pixels[idx] += color * coverage;
                }
            }
        }
    }

    /// Quantize to 8-bit RGBA, clamping each channel to [0, 1].
    pub fn to_rgba8(&self) -> RgbaImage {
        RgbaImage::from_fn(self.width, self.height, |x, y| {
            let c = self.pixel(x, y).clamp(Vec4::ZERO, Vec4::ONE) * 255.0;
            Rgba([
                c.x.round() as u8,
                c.y.round() as u8,
                c.z.round() as u8,
                c.w.round() as u8,
            ])
        })
    }

    #[inline]
    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }
}

/// CPU backend. The "surface" is the last presented canvas.
#[derive(Debug, Default)]
pub struct SoftwareBackend {
    surface: Option<Canvas>,
    targets_created: usize,
    frames_presented: u64,
}

impl SoftwareBackend {
    /// A backend with nothing presented yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// The last presented frame, if any.
    pub fn surface(&self) -> Option<&Canvas> {
        self.surface.as_ref()
    }

    /// Take ownership of the last presented frame.
    pub fn take_surface(&mut self) -> Option<Canvas> {
        self.surface.take()
    }

    /// Targets allocated since creation.
    pub fn targets_created(&self) -> usize {
        self.targets_created
    }

    /// Frames presented since creation.
    pub fn frames_presented(&self) -> u64 {
        self.frames_presented
    }
}

impl RenderBackend for SoftwareBackend {
    type Target = Canvas;

    fn create_target(&mut self, width: u32, height: u32) -> Canvas {
        self.targets_created += 1;
        Canvas::new(width, height)
    }

    fn clear(&mut self, target: &mut Canvas, color: Vec4) {
        target.fill(color);
    }

    fn draw_sprites(&mut self, target: &mut Canvas, sprites: &[GlowSprite]) {
        for sprite in sprites {
            target.draw_sprite(sprite);
        }
    }

    fn present(&mut self, target: &Canvas) -> Result<(), RenderError> {
        match self.surface.as_mut() {
            Some(surface) if surface.size() == target.size() => surface.copy_from(target),
            _ => self.surface = Some(target.clone()),
        }
        self.frames_presented += 1;
        Ok(())
    }
}

type EffectFn = dyn FnMut(&Canvas, &ShaderParams, &mut Canvas);

/// An effect implemented as a closure over canvases.
///
/// The closure gets the source, the current parameters and the cleared target.
pub struct SoftwareEffect {
    name: String,
    params: ShaderParams,
    apply: Box<EffectFn>,
}

impl SoftwareEffect {
    /// Wrap `apply` as an effect called `name`.
    pub fn new<F>(name: impl Into<String>, apply: F) -> Self
    where
        F: FnMut(&Canvas, &ShaderParams, &mut Canvas) + 'static,
    {
        Self {
            name: name.into(),
            params: ShaderParams::new(),
            apply: Box::new(apply),
        }
    }

    /// An effect that copies its input.
    pub fn identity(name: impl Into<String>) -> Self {
        Self::new(name, |src: &Canvas, _: &ShaderParams, dst: &mut Canvas| dst.copy_from(src))
    }

    /// Parameters set by the last frame.
    pub fn params(&self) -> &ShaderParams {
        &self.params
    }
}

impl Effect<SoftwareBackend> for SoftwareEffect {
    fn name(&self) -> &str {
        &self.name
    }

    fn set_parameter(&mut self, name: &str, value: ParamValue) {
        self.params.set(name, value);
    }

    fn draw(&mut self, _backend: &mut SoftwareBackend, source: &Canvas, target: &mut Canvas) {
        (self.apply)(source, &self.params, target);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canvas_bounds() {
        let mut canvas = Canvas::new(2, 2);
        canvas.set_pixel(5, 5, Vec4::ONE);
        assert_eq!(canvas.pixel(5, 5), Vec4::ZERO);
        canvas.set_pixel(1, 0, Vec4::ONE);
        assert_eq!(canvas.pixels()[1], Vec4::ONE);
    }

    #[test]
    fn test_sprite_is_additive() {
        let mut canvas = Canvas::new(9, 9);
        let sprite = GlowSprite::new(Vec2::new(4.5, 4.5), 4.0, Vec4::new(0.25, 0.25, 0.25, 0.25));
        canvas.draw_sprite(&sprite);
        let once = canvas.pixel(4, 4);
        canvas.draw_sprite(&sprite);
        assert_eq!(canvas.pixel(4, 4), once * 2.0);
        assert_eq!(once, Vec4::splat(0.25));
    }

    #[test]
    fn test_sprite_edge_is_soft_and_bounded() {
        let mut canvas = Canvas::new(20, 20);
        canvas.draw_sprite(&GlowSprite::new(Vec2::new(10.0, 10.0), 8.0, Vec4::ONE));

        // Inside the solid core.
        assert_eq!(canvas.pixel(10, 10), Vec4::ONE);
        // In the falloff band.
        let band = canvas.pixel(16, 10).x;
        assert!(band > 0.0 && band < 1.0);
        // Outside the radius.
        assert_eq!(canvas.pixel(19, 10), Vec4::ZERO);
        assert_eq!(canvas.pixel(0, 0), Vec4::ZERO);
    }

    #[test]
    fn test_sprite_clipped_at_canvas_edge() {
        let mut canvas = Canvas::new(4, 4);
        canvas.draw_sprite(&GlowSprite::new(Vec2::new(-1.0, -1.0), 3.0, Vec4::ONE));
        assert!(canvas.pixel(0, 0).x > 0.0);
        assert_eq!(canvas.pixel(3, 3), Vec4::ZERO);
    }

    #[test]
    fn test_to_rgba8_clamps() {
        let mut canvas = Canvas::new(1, 1);
        canvas.set_pixel(0, 0, Vec4::new(2.0, 0.5, -1.0, 1.0));
        let img = canvas.to_rgba8();
        assert_eq!(img.get_pixel(0, 0), &Rgba([255, 128, 0, 255]));
    }

    #[test]
    fn test_present_keeps_last_frame() {
        let mut backend = SoftwareBackend::new();
        let mut a = backend.create_target(2, 2);
        backend.clear(&mut a, Vec4::ONE);
        backend.present(&a).unwrap();
        let mut b = backend.create_target(2, 2);
        backend.clear(&mut b, Vec4::ZERO);
        backend.present(&b).unwrap();

        assert_eq!(backend.surface(), Some(&b));
        assert_eq!(backend.frames_presented(), 2);
    }

    #[test]
    fn test_effect_sees_parameters() {
        let mut backend = SoftwareBackend::new();
        let mut effect = SoftwareEffect::new("tint", |src: &Canvas, params: &ShaderParams, dst: &mut Canvas| {
            let k = params.get_f32("Intensity").unwrap_or(0.0);
            for (d, s) in dst.pixels_mut().iter_mut().zip(src.pixels()) {
                *d = *s * k;
            }
        });
        effect.set_parameter("Intensity", ParamValue::F32(0.5));

        let mut src = Canvas::new(1, 1);
        src.fill(Vec4::ONE);
        let mut dst = Canvas::new(1, 1);
        effect.draw(&mut backend, &src, &mut dst);
        assert_eq!(dst.pixel(0, 0), Vec4::splat(0.5));
    }
}
