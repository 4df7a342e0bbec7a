use std::path::Path;

use wgpu::util::DeviceExt;

use super::shaders::{effect_shader_source, validate_wgsl};
use super::{GpuBackend, GpuTarget, TARGET_FORMAT};
use crate::error::EffectError;
use crate::render::effect::Effect;
use crate::render::params::{ParamValue, ShaderParams};

/// A post-processing effect compiled from a WGSL effect body.
///
/// The parameter layout is fixed when the effect is built from its default
/// values. Later [`set_parameter`](Effect::set_parameter) calls may only
/// change values of existing names.
pub struct ShaderEffect {
    name: String,
    params: ShaderParams,
    pipeline: wgpu::RenderPipeline,
    uniform_buffer: wgpu::Buffer,
}

impl ShaderEffect {
    /// Read and compile an effect body from `path`.
    pub fn load(
        backend: &GpuBackend,
        name: &str,
        path: &Path,
        defaults: ShaderParams,
    ) -> Result<Self, EffectError> {
        let body = std::fs::read_to_string(path).map_err(|source| EffectError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_source(backend, name, &body, defaults)
    }

    /// Compile an effect body already in memory.
    pub fn from_source(
        backend: &GpuBackend,
        name: &str,
        body: &str,
        defaults: ShaderParams,
    ) -> Result<Self, EffectError> {
        let source = effect_shader_source(body, &defaults);
        validate_wgsl(&source).map_err(|message| EffectError::Shader {
            name: name.to_string(),
            message,
        })?;

        let device = backend.device();
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(name),
            source: wgpu::ShaderSource::Wgsl(source.into()),
        });

        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Effect Params"),
            contents: &defaults.to_bytes(),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Effect Pipeline Layout"),
            bind_group_layouts: &[backend.effect_layout()],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(name),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: TARGET_FORMAT,
                    blend: Some(wgpu::BlendState::PREMULTIPLIED_ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                ..Default::default()
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        tracing::info!(effect = name, params = defaults.len(), "loaded effect");

        Ok(Self {
            name: name.to_string(),
            params: defaults,
            pipeline,
            uniform_buffer,
        })
    }

    /// Current parameter values, in uniform layout order.
    pub fn params(&self) -> &ShaderParams {
        &self.params
    }
}

impl Effect<GpuBackend> for ShaderEffect {
    fn name(&self) -> &str {
        &self.name
    }

    fn set_parameter(&mut self, name: &str, value: ParamValue) {
        if !self.params.update(name, value) {
            tracing::trace!(effect = %self.name, param = name, "ignored unknown parameter");
        }
    }

    fn draw(&mut self, backend: &mut GpuBackend, source: &GpuTarget, target: &mut GpuTarget) {
        backend
            .queue()
            .write_buffer(&self.uniform_buffer, 0, &self.params.to_bytes());

        let bind_group = backend
            .device()
            .create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("Effect Bind Group"),
                layout: backend.effect_layout(),
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: wgpu::BindingResource::TextureView(source.view()),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: wgpu::BindingResource::Sampler(backend.sampler()),
                    },
                    wgpu::BindGroupEntry {
                        binding: 2,
                        resource: self.uniform_buffer.as_entire_binding(),
                    },
                ],
            });

        backend.draw_fullscreen(&self.pipeline, &bind_group, target);
    }
}
