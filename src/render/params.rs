//! Named shader parameters for post-processing effects.
//!
//! An effect is opaque to the pipeline: the only thing the pipeline knows
//! about it is a set of named values to hand over before drawing. On the GPU
//! those names become the fields of the effect's `Params` uniform struct, in
//! insertion order, laid out with WGSL alignment rules.
//!
//! # Example
//!
//! ```ignore
//! let mut params = ShaderParams::new();
//! params.set("Time", 3.5f32);
//! params.set("ScreenSize", Vec2::new(2560.0, 1440.0));
//! effect.set_parameters(&params);
//! ```

use glam::{Vec2, Vec4};
use std::collections::HashMap;

/// Supported parameter value types.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ParamValue {
    F32(f32),
    Vec2(Vec2),
    Vec4(Vec4),
}

impl ParamValue {
    /// WGSL type name for this value.
    pub fn wgsl_type(&self) -> &'static str {
        match self {
            ParamValue::F32(_) => "f32",
            ParamValue::Vec2(_) => "vec2<f32>",
            ParamValue::Vec4(_) => "vec4<f32>",
        }
    }

    /// WGSL alignment in bytes.
    pub fn align(&self) -> usize {
        match self {
            ParamValue::F32(_) => 4,
            ParamValue::Vec2(_) => 8,
            ParamValue::Vec4(_) => 16,
        }
    }

    /// Whether `other` has the same type, so it can replace this value.
    pub fn same_kind(&self, other: &ParamValue) -> bool {
        std::mem::discriminant(self) == std::mem::discriminant(other)
    }

    fn write_bytes(&self, buf: &mut Vec<u8>) {
        match self {
            ParamValue::F32(v) => buf.extend_from_slice(&v.to_le_bytes()),
            ParamValue::Vec2(v) => {
                for c in v.to_array() {
                    buf.extend_from_slice(&c.to_le_bytes());
                }
            }
            ParamValue::Vec4(v) => {
                for c in v.to_array() {
                    buf.extend_from_slice(&c.to_le_bytes());
                }
            }
        }
    }
}

impl From<f32> for ParamValue {
    fn from(v: f32) -> Self {
        ParamValue::F32(v)
    }
}

impl From<Vec2> for ParamValue {
    fn from(v: Vec2) -> Self {
        ParamValue::Vec2(v)
    }
}

impl From<Vec4> for ParamValue {
    fn from(v: Vec4) -> Self {
        ParamValue::Vec4(v)
    }
}

/// Ordered name-to-value map passed to an effect.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ShaderParams {
    /// Order matters for the WGSL struct layout.
    values: Vec<(String, ParamValue)>,
    indices: HashMap<String, usize>,
}

impl ShaderParams {
    /// An empty parameter set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`set`](Self::set).
    pub fn with<V: Into<ParamValue>>(mut self, name: &str, value: V) -> Self {
        self.set(name, value);
        self
    }

    /// Add or overwrite a value.
    pub fn set<V: Into<ParamValue>>(&mut self, name: &str, value: V) {
        let value = value.into();
        if let Some(&idx) = self.indices.get(name) {
            self.values[idx].1 = value;
        } else {
            let idx = self.values.len();
            self.values.push((name.to_string(), value));
            self.indices.insert(name.to_string(), idx);
        }
    }

    /// Overwrite a value only if `name` already exists with the same type.
    ///
    /// Returns whether the value was stored. Used by effects whose parameter
    /// layout is fixed once compiled.
    pub fn update(&mut self, name: &str, value: ParamValue) -> bool {
        match self.indices.get(name) {
            Some(&idx) if self.values[idx].1.same_kind(&value) => {
                self.values[idx].1 = value;
                true
            }
            _ => false,
        }
    }

    /// Look up a value by name.
    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.indices.get(name).map(|&idx| &self.values[idx].1)
    }

    /// Get an `f32` value by name.
    pub fn get_f32(&self, name: &str) -> Option<f32> {
        match self.get(name) {
            Some(ParamValue::F32(v)) => Some(*v),
            _ => None,
        }
    }

    /// Whether no parameters are set.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Number of parameters.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Iterate in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.values.iter().map(|(n, v)| (n.as_str(), v))
    }

    /// WGSL struct fields, one per line.
    pub fn to_wgsl_fields(&self) -> String {
        self.values
            .iter()
            .map(|(name, value)| format!("    {}: {},", name, value.wgsl_type()))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Serialize with WGSL alignment, padded to a multiple of 16 bytes.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        for (_, value) in &self.values {
            let align = value.align();
            while buf.len() % align != 0 {
                buf.push(0);
            }
            value.write_bytes(&mut buf);
        }
        let padded = (buf.len() + 15) & !15;
        buf.resize(padded.max(16), 0);
        buf
    }

    /// Size of [`to_bytes`](Self::to_bytes) output.
    pub fn byte_size(&self) -> usize {
        self.to_bytes().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_and_overwrite_keeps_order() {
        let mut params = ShaderParams::new();
        params.set("Time", 1.0f32);
        params.set("ScreenSize", Vec2::new(4.0, 2.0));
        params.set("Time", 2.0f32);

        let names: Vec<&str> = params.iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["Time", "ScreenSize"]);
        assert_eq!(params.get_f32("Time"), Some(2.0));
        assert_eq!(params.len(), 2);
    }

    #[test]
    fn test_update_requires_existing_same_kind() {
        let mut params = ShaderParams::new().with("Intensity", 0.6f32);
        assert!(params.update("Intensity", ParamValue::F32(0.9)));
        assert!(!params.update("Intensity", ParamValue::Vec2(Vec2::ONE)));
        assert!(!params.update("Missing", ParamValue::F32(1.0)));
        assert_eq!(params.get_f32("Intensity"), Some(0.9));
        assert_eq!(params.len(), 1);
    }

    #[test]
    fn test_layout_follows_wgsl_alignment() {
        let params = ShaderParams::new()
            .with("Time", 1.0f32)
            .with("ScreenSize", Vec2::new(640.0, 480.0))
            .with("Intensity", 0.5f32);
        let bytes = params.to_bytes();

        // f32 at 0, vec2 aligned to 8, f32 at 16, total padded to 32.
        assert_eq!(bytes.len(), 32);
        assert_eq!(f32::from_le_bytes(bytes[0..4].try_into().unwrap()), 1.0);
        assert_eq!(f32::from_le_bytes(bytes[8..12].try_into().unwrap()), 640.0);
        assert_eq!(f32::from_le_bytes(bytes[12..16].try_into().unwrap()), 480.0);
        assert_eq!(f32::from_le_bytes(bytes[16..20].try_into().unwrap()), 0.5);
    }

    #[test]
    fn test_empty_params_still_occupy_a_slot() {
        assert_eq!(ShaderParams::new().byte_size(), 16);
    }

    #[test]
    fn test_wgsl_fields() {
        let params = ShaderParams::new()
            .with("Time", 0.0f32)
            .with("Tint", Vec4::ONE);
        assert_eq!(params.to_wgsl_fields(), "    Time: f32,\n    Tint: vec4<f32>,");
    }
}
