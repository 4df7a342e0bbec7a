//! The shipped effect bodies must compile against the parameters the
//! pipeline hands them.

use std::path::PathBuf;

use glam::Vec2;
use reverie::config::PassConfig;
use reverie::render::gpu::shaders::{effect_shader_source, validate_wgsl};
use reverie::{ForceFieldSettings, PassSettings, ReverieConfig, VhsSettings};

fn shipped(pass: &PassConfig) -> String {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join(pass.shader_path());
    std::fs::read_to_string(&path).unwrap_or_else(|e| panic!("{}: {e}", path.display()))
}

#[test]
fn test_default_passes_validate() {
    let config = ReverieConfig::default();
    for pass in &config.passes {
        let params = pass.settings.params(0.0, Vec2::new(2560.0, 1440.0));
        let source = effect_shader_source(&shipped(pass), &params);
        if let Err(message) = validate_wgsl(&source) {
            panic!("{} failed to validate:\n{message}", pass.settings.name());
        }
    }
}

#[test]
fn test_vhs_body_uses_every_parameter() {
    let body = shipped(&PassConfig::new(PassSettings::Vhs(VhsSettings::default())));
    for name in [
        "params.Time",
        "params.NoiseAmount",
        "params.ScanlineIntensity",
        "params.ChromaticAberration",
        "params.VignetteStrength",
    ] {
        assert!(body.contains(name), "vhs.wgsl does not read {name}");
    }
}

#[test]
fn test_force_field_body_uses_every_parameter() {
    let body = shipped(&PassConfig::new(PassSettings::ForceField(ForceFieldSettings::default())));
    for name in ["params.Time", "params.ScreenSize", "params.Intensity"] {
        assert!(body.contains(name), "force_field.wgsl does not read {name}");
    }
}

#[test]
fn test_body_with_wrong_params_fails() {
    // The force-field body reads ScreenSize, which the VHS set lacks.
    let body = shipped(&PassConfig::new(PassSettings::ForceField(ForceFieldSettings::default())));
    let vhs_params = PassSettings::Vhs(VhsSettings::default()).params(0.0, Vec2::ONE);
    assert!(validate_wgsl(&effect_shader_source(&body, &vhs_params)).is_err());
}
