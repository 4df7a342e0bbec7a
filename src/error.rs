//! Error types for Reverie.
//!
//! The simulation itself never fails: bad spawns are rejected and bad time
//! steps are ignored. Errors only come from the outer layers: GPU setup,
//! effect loading, frame presentation, configuration and the app shell.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur during GPU initialization.
#[derive(Debug, Error)]
pub enum GpuError {
    /// Failed to create a surface for rendering.
    #[error("Failed to create GPU surface: {0}")]
    SurfaceCreation(#[from] wgpu::CreateSurfaceError),
    /// No compatible GPU adapter found.
    #[error("No compatible GPU adapter found. Ensure your system has a GPU with WebGPU/Vulkan/Metal/DX12 support.")]
    NoAdapter,
    /// Failed to create GPU device.
    #[error("Failed to create GPU device: {0}")]
    DeviceCreation(#[from] wgpu::RequestDeviceError),
    /// The surface reports no usable texture format.
    #[error("Surface has no supported texture format")]
    UnsupportedSurface,
}

/// Errors that can occur while loading a post-processing effect.
///
/// The host logs these and falls back to a pass-through.
#[derive(Debug, Error)]
pub enum EffectError {
    #[error("Failed to read effect {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Effect '{name}' failed to compile:\n{message}")]
    Shader { name: String, message: String },
}

/// Errors from rendering a frame.
#[derive(Debug, Error)]
pub enum RenderError {
    /// The surface texture could not be acquired.
    #[error("Surface error: {0}")]
    Surface(#[from] wgpu::SurfaceError),
}

/// Errors from loading or checking a configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Top-level errors for the binary.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Event loop error: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),
    #[error("Failed to create window: {0}")]
    Window(#[from] winit::error::OsError),
    #[error(transparent)]
    Gpu(#[from] GpuError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error("Failed to write image: {0}")]
    Image(#[from] image::ImageError),
    #[error("Invalid arguments: {0}")]
    Usage(String),
}
