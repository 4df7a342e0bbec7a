//! WGSL sources for the GPU backend, and naga validation.
//!
//! Effect files only contain the effect body: a function
//! `fn effect(uv: vec2<f32>) -> vec4<f32>` that may read `scene`,
//! `scene_sampler` and the fields of `params`. [`effect_shader_source`] wraps
//! the body with the bindings, the `Params` struct and the fullscreen
//! vertex stage.
//!
//! ```wgsl
//! fn effect(uv: vec2<f32>) -> vec4<f32> {
//!     let color = textureSample(scene, scene_sampler, uv);
//!     return color * params.Intensity;
//! }
//! ```

use naga::front::wgsl;
use naga::valid::{Capabilities, ValidationFlags, Validator};

use crate::render::params::ShaderParams;

/// Instanced soft-disc sprites, additive. Positions are in pixels, y down.
pub const PARTICLE_SHADER: &str = r#"
struct Globals {
    screen_size: vec2<f32>,
    _pad: vec2<f32>,
};

@group(0) @binding(0)
var<uniform> globals: Globals;

struct SpriteInput {
    @location(0) center: vec2<f32>,
    @location(1) radius: f32,
    @location(2) color: vec4<f32>,
};

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) corner: vec2<f32>,
    @location(1) color: vec4<f32>,
};

@vertex
fn vs_main(@builtin(vertex_index) vertex_index: u32, sprite: SpriteInput) -> VertexOutput {
    var corners = array<vec2<f32>, 6>(
        vec2<f32>(-1.0, -1.0),
        vec2<f32>(1.0, -1.0),
        vec2<f32>(1.0, 1.0),
        vec2<f32>(-1.0, -1.0),
        vec2<f32>(1.0, 1.0),
        vec2<f32>(-1.0, 1.0),
    );
    let corner = corners[vertex_index];
    let pixel = sprite.center + corner * sprite.radius;
    let ndc = vec2<f32>(
        pixel.x / globals.screen_size.x * 2.0 - 1.0,
        1.0 - pixel.y / globals.screen_size.y * 2.0,
    );

    var out: VertexOutput;
    out.clip_position = vec4<f32>(ndc, 0.0, 1.0);
    out.corner = corner;
    out.color = sprite.color;
    return out;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    let dist = length(in.corner);
    if dist >= 1.0 {
        discard;
    }
    let coverage = 1.0 - smoothstep(0.5, 1.0, dist);
    return in.color * coverage;
}
"#;

/// Copies a target to the surface pixel for pixel.
pub const PRESENT_SHADER: &str = r#"
@group(0) @binding(0)
var frame: texture_2d<f32>;

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
};

@vertex
fn vs_main(@builtin(vertex_index) vertex_index: u32) -> VertexOutput {
    var positions = array<vec2<f32>, 3>(
        vec2<f32>(-1.0, -1.0),
        vec2<f32>(3.0, -1.0),
        vec2<f32>(-1.0, 3.0),
    );
    var out: VertexOutput;
    out.clip_position = vec4<f32>(positions[vertex_index], 0.0, 1.0);
    return out;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    return textureLoad(frame, vec2<i32>(in.clip_position.xy), 0);
}
"#;

const EFFECT_PREAMBLE: &str = r#"
struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) uv: vec2<f32>,
};

@group(0) @binding(0)
var scene: texture_2d<f32>;
@group(0) @binding(1)
var scene_sampler: sampler;
@group(0) @binding(2)
var<uniform> params: Params;

@vertex
fn vs_main(@builtin(vertex_index) vertex_index: u32) -> VertexOutput {
    var positions = array<vec2<f32>, 3>(
        vec2<f32>(-1.0, -1.0),
        vec2<f32>(3.0, -1.0),
        vec2<f32>(-1.0, 3.0),
    );
    var uvs = array<vec2<f32>, 3>(
        vec2<f32>(0.0, 1.0),
        vec2<f32>(2.0, 1.0),
        vec2<f32>(0.0, -1.0),
    );

    var out: VertexOutput;
    out.clip_position = vec4<f32>(positions[vertex_index], 0.0, 1.0);
    out.uv = uvs[vertex_index];
    return out;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    return effect(in.uv);
}
"#;

/// Build a complete effect module from an effect body and its parameters.
pub fn effect_shader_source(body: &str, params: &ShaderParams) -> String {
    let fields = if params.is_empty() {
        "    _unused: f32,".to_string()
    } else {
        params.to_wgsl_fields()
    };
    format!("struct Params {{\n{fields}\n}};\n{EFFECT_PREAMBLE}\n{body}\n")
}

/// Parse and validate WGSL, returning a readable error message on failure.
pub fn validate_wgsl(source: &str) -> Result<naga::Module, String> {
    let module = wgsl::parse_str(source).map_err(|err| err.emit_to_string(source))?;

    let mut validator = Validator::new(ValidationFlags::all(), Capabilities::all());
    validator
        .validate(&module)
        .map_err(|err| err.emit_to_string(source))?;

    Ok(module)
}
