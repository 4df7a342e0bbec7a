//! Window host and headless snapshot runner.
//!
//! [`run`] opens a window, builds the GPU pipeline and steps the driver once
//! per redraw. Escape quits and Space pauses; `[` and `]` halve or double
//! the time scale. The window title shows the frame rate. Effects that fail
//! to load are logged and replaced with [`NullEffect`], so the frame loop
//! keeps going with that pass forwarding its input.
//!
//! [`run_snapshot`] simulates a fixed number of 60 Hz frames without a
//! window and writes the final frame as an image.

use std::path::Path;
use std::sync::Arc;

use glam::Vec2;
use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::{ElementState, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{Key, NamedKey},
    window::{Window, WindowId},
};

use crate::config::{PassConfig, ReverieConfig};
use crate::driver::Driver;
use crate::error::{AppError, EffectError, RenderError};
use crate::render::gpu::{GpuBackend, ShaderEffect};
use crate::render::software::SoftwareBackend;
use crate::render::{
    effect_or_null, Effect, NullEffect, PostPass, RenderBackend, RenderPipeline, ShaderParams,
};
use crate::time::Time;

/// Frame step used by snapshot mode.
pub const SNAPSHOT_DT: f32 = 1.0 / 60.0;

/// Frames between window title refreshes.
const TITLE_INTERVAL: u64 = 30;

/// Factor applied to the time scale by `]` and removed by `[`.
const TIME_SCALE_STEP: f32 = 2.0;

/// Open a window and run `config` until it is closed.
pub fn run(config: ReverieConfig) -> Result<(), AppError> {
    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(config);
    event_loop.run_app(&mut app)?;

    match app.error.take() {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

/// Simulate `frames` frames at 60 Hz and save the presented frame to `path`.
///
/// Rendering uses the CPU backend. Post-processing passes are kept in the
/// chain but forward their input, since their effects need the GPU.
pub fn run_snapshot(config: &ReverieConfig, path: &Path, frames: u32) -> Result<(), AppError> {
    let mut backend = SoftwareBackend::new();
    let mut pipeline = build_pipeline(config, |pass, _| {
        Ok(Box::new(NullEffect::new(pass.settings.name())) as Box<dyn Effect<SoftwareBackend>>)
    });
    if !config.passes.is_empty() {
        tracing::info!(passes = config.passes.len(), "snapshot renders without post-processing");
    }

    let mut driver = Driver::from_config(config);
    for _ in 0..frames {
        driver.step(SNAPSHOT_DT);
    }
    driver.render(&mut pipeline, &mut backend)?;

    let frame = backend
        .take_surface()
        .ok_or_else(|| AppError::Usage("no frame was presented".into()))?;
    frame.to_rgba8().save(path)?;

    tracing::info!(
        path = %path.display(),
        frames,
        live = driver.pool().len(),
        "wrote snapshot"
    );
    Ok(())
}

/// Build the configured pipeline, loading each pass with `load`.
///
/// `load` gets the pass and its default parameters. A pass whose effect fails
/// to load is logged and kept as a [`NullEffect`] pass-through.
pub fn build_pipeline<B, F>(config: &ReverieConfig, mut load: F) -> RenderPipeline<B>
where
    B: RenderBackend,
    F: FnMut(&PassConfig, ShaderParams) -> Result<Box<dyn Effect<B>>, EffectError>,
{
    let screen = Vec2::new(config.width as f32, config.height as f32);
    let mut pipeline = RenderPipeline::new(config.width, config.height)
        .with_background(config.background_color());

    for pass in &config.passes {
        let defaults = pass.settings.params(0.0, screen);
        let effect = effect_or_null(pass.settings.name(), load(pass, defaults));
        pipeline.push_pass(PostPass::new(pass.settings, effect));
    }

    pipeline
}

/// Load every configured pass as a WGSL effect from its shader file.
fn build_gpu_pipeline(backend: &GpuBackend, config: &ReverieConfig) -> RenderPipeline<GpuBackend> {
    build_pipeline(config, |pass, defaults| {
        let effect = ShaderEffect::load(backend, pass.settings.name(), &pass.shader_path(), defaults)?;
        Ok(Box::new(effect) as Box<dyn Effect<GpuBackend>>)
    })
}

const MIN_TIME_SCALE: f32 = 0.125;
const MAX_TIME_SCALE: f32 = 8.0;

/// Window title with the measured frame rate and any time-scale or pause state.
fn window_title(base: &str, time: &Time) -> String {
    let mut title = format!("{base} - {:.0} fps", time.fps());
    if time.time_scale() != 1.0 {
        title.push_str(&format!(" - {}x", time.time_scale()));
    }
    if time.is_paused() {
        title.push_str(" - paused");
    }
    title
}

struct Renderer {
    backend: GpuBackend,
    pipeline: RenderPipeline<GpuBackend>,
}

struct App {
    config: ReverieConfig,
    window: Option<Arc<Window>>,
    renderer: Option<Renderer>,
    driver: Driver,
    time: Time,
    error: Option<AppError>,
}

impl App {
    fn new(config: ReverieConfig) -> Self {
        let driver = Driver::from_config(&config);
        Self {
            config,
            window: None,
            renderer: None,
            driver,
            time: Time::new(),
            error: None,
        }
    }

    fn init(&mut self, event_loop: &ActiveEventLoop) -> Result<(), AppError> {
        let window_attrs = Window::default_attributes()
            .with_title(self.config.title.clone())
            .with_inner_size(PhysicalSize::new(self.config.width, self.config.height));

        let window = Arc::new(event_loop.create_window(window_attrs)?);
        self.window = Some(window.clone());

        let backend = pollster::block_on(GpuBackend::new(window))?;
        let pipeline = build_gpu_pipeline(&backend, &self.config);
        tracing::info!(
            width = self.config.width,
            height = self.config.height,
            capacity = self.config.capacity,
            active_passes = pipeline.passes().iter().filter(|p| p.is_active()).count(),
            "Reverie started"
        );
        self.renderer = Some(Renderer { backend, pipeline });

        // Setup time should not land in the first frame's delta.
        self.time = Time::new();
        Ok(())
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: AppError) {
        tracing::error!(error = %err, "fatal");
        self.error = Some(err);
        event_loop.exit();
    }

    fn scale_time(&mut self, factor: f32) {
        let scale = (self.time.time_scale() * factor).clamp(MIN_TIME_SCALE, MAX_TIME_SCALE);
        self.time.set_time_scale(scale);
        tracing::info!(time_scale = scale, "changed time scale");
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let Some(renderer) = &mut self.renderer else {
            return;
        };

        let dt = self.time.tick();
        if !self.time.is_paused() {
            self.driver.step(dt);
        }

        match self.driver.render(&mut renderer.pipeline, &mut renderer.backend) {
            Ok(()) => {}
            Err(RenderError::Surface(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated)) => {
                tracing::warn!("surface lost, reconfiguring");
                renderer.backend.reconfigure();
            }
            Err(err @ RenderError::Surface(wgpu::SurfaceError::OutOfMemory)) => {
                self.fail(event_loop, err.into());
                return;
            }
            Err(err) => tracing::warn!(error = %err, "frame skipped"),
        }

        if let Some(window) = &self.window {
            if self.time.frame() % TITLE_INTERVAL == 0 {
                window.set_title(&window_title(&self.config.title, &self.time));
            }
            window.request_redraw();
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_none() {
            if let Err(err) = self.init(event_loop) {
                self.fail(event_loop, err);
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::KeyboardInput { event, .. } => {
                if event.state != ElementState::Pressed || event.repeat {
                    return;
                }
                match event.logical_key.as_ref() {
                    Key::Named(NamedKey::Escape) => event_loop.exit(),
                    Key::Named(NamedKey::Space) => {
                        self.time.toggle_pause();
                        tracing::info!(
                            paused = self.time.is_paused(),
                            elapsed = self.time.elapsed(),
                            "toggled pause"
                        );
                    }
                    Key::Character("]") => self.scale_time(TIME_SCALE_STEP),
                    Key::Character("[") => self.scale_time(1.0 / TIME_SCALE_STEP),
                    _ => {}
                }
            }
            WindowEvent::Resized(physical_size) => {
                if let Some(renderer) = &mut self.renderer {
                    renderer
                        .backend
                        .resize(physical_size.width, physical_size.height);
                }
            }
            WindowEvent::RedrawRequested => self.redraw(event_loop),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_title() {
        let mut time = Time::new();
        assert_eq!(window_title("Reverie", &time), "Reverie - 0 fps");

        time.set_time_scale(2.0);
        time.pause();
        assert_eq!(window_title("Reverie", &time), "Reverie - 0 fps - 2x - paused");
    }

    #[test]
    fn test_snapshot_writes_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("frame.png");
        let config = ReverieConfig::default().with_size(96, 54).with_capacity(200);

        run_snapshot(&config, &path, 10).unwrap();

        let img = image::open(&path).unwrap().to_rgba8();
        assert_eq!(img.dimensions(), (96, 54));
        // Far corner is untouched background.
        assert_eq!(img.get_pixel(95, 53).0, [10, 10, 20, 255]);
    }
}
