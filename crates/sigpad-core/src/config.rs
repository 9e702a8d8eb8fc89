//! Signing-surface configuration.
//!
//! Loaded from the host page as camelCase JSON. Every field has a default, so
//! `{}` is a valid configuration.

use crate::error::SignError;
use serde::{Deserialize, Serialize};

// ─── Input gate ───────────────────────────────────────────────────────────

/// Which pointing devices may draw on the capture surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum InputGate {
    /// Mouse, pen and finger all draw.
    #[default]
    Any,
    /// Only a stylus draws; palm and mouse contacts are rejected.
    PenOnly,
}

// ─── Config ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SigningConfig {
    /// Width in points of a freshly placed signature.
    pub default_width: f64,
    /// Minimum side during resize, as a fraction of the placement's smaller side.
    pub min_size_fraction: f64,
    /// Absolute lower bound on the minimum side, in points.
    pub min_size_floor: f64,
    /// Transparent margin kept around the ink when trimming, in pixels.
    pub trim_padding: u32,
    /// Stroke width used when the device reports no pressure.
    pub stroke_width: f32,
    /// Stroke width at pressure 0+.
    pub min_stroke_width: f32,
    /// Stroke width at pressure 1.0.
    pub max_stroke_width: f32,
    /// Ink color as `#rrggbb`.
    pub ink_color: String,
    pub input_gate: InputGate,
    /// Defer drag/resize geometry to the next animation frame.
    pub coalesce_moves: bool,
    /// Side of a square resize handle, in pixels.
    pub handle_size: f64,
    /// Side of the square delete button, in pixels.
    pub delete_button_size: f64,
    /// Storage key of the last-used signature.
    pub cache_key: String,
}

impl Default for SigningConfig {
    fn default() -> Self {
        Self {
            default_width: 150.0,
            min_size_fraction: 0.25,
            min_size_floor: 12.0,
            trim_padding: 10,
            stroke_width: 2.5,
            min_stroke_width: 1.0,
            max_stroke_width: 4.5,
            ink_color: "#111827".to_string(),
            input_gate: InputGate::Any,
            coalesce_moves: false,
            handle_size: 14.0,
            delete_button_size: 20.0,
            cache_key: "sigpad.lastSignature".to_string(),
        }
    }
}

impl SigningConfig {
    /// Parse a JSON configuration object; missing fields take defaults.
    pub fn from_json(json: &str) -> Result<Self, SignError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| SignError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), SignError> {
        let positive = |v: f64| v.is_finite() && v > 0.0;
        if !positive(self.default_width) {
            return Err(SignError::Config(format!(
                "defaultWidth must be positive, got {}",
                self.default_width
            )));
        }
        if !positive(self.min_size_floor) {
            return Err(SignError::Config(format!(
                "minSizeFloor must be positive, got {}",
                self.min_size_floor
            )));
        }
        if !(0.0..=1.0).contains(&self.min_size_fraction) {
            return Err(SignError::Config(format!(
                "minSizeFraction must be within 0..=1, got {}",
                self.min_size_fraction
            )));
        }
        if self.min_stroke_width > self.max_stroke_width {
            return Err(SignError::Config(
                "minStrokeWidth exceeds maxStrokeWidth".to_string(),
            ));
        }
        if self.ink_rgb().is_none() {
            return Err(SignError::Config(format!(
                "inkColor must be #rrggbb, got {:?}",
                self.ink_color
            )));
        }
        Ok(())
    }

    /// Ink color as an RGB triple.
    pub fn ink_rgb(&self) -> Option<[u8; 3]> {
        let hex = self.ink_color.strip_prefix('#')?;
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        Some([channel(0)?, channel(2)?, channel(4)?])
    }

    /// Minimum side a placement of `width` x `height` may be resized down to.
    ///
    /// The floor never exceeds the placement's own smaller side, so a thin
    /// signature is never enlarged just by grabbing a handle.
    pub fn min_side_for(&self, width: f64, height: f64) -> f64 {
        let smaller = width.min(height);
        (smaller * self.min_size_fraction)
            .max(self.min_size_floor)
            .min(smaller)
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_is_default() {
        let config = SigningConfig::from_json("{}").unwrap();
        assert_eq!(config, SigningConfig::default());
    }

    #[test]
    fn camel_case_fields() {
        let config =
            SigningConfig::from_json(r#"{"defaultWidth": 200, "inputGate": "penOnly"}"#).unwrap();
        assert_eq!(config.default_width, 200.0);
        assert_eq!(config.input_gate, InputGate::PenOnly);
        assert_eq!(config.trim_padding, 10);
    }

    #[test]
    fn rejects_bad_values() {
        assert!(SigningConfig::from_json(r#"{"defaultWidth": 0}"#).is_err());
        assert!(SigningConfig::from_json(r#"{"minSizeFraction": 2}"#).is_err());
        assert!(SigningConfig::from_json(r#"{"inkColor": "blue"}"#).is_err());
        assert!(SigningConfig::from_json("not json").is_err());
    }

    #[test]
    fn ink_color_parses() {
        let config = SigningConfig::default();
        assert_eq!(config.ink_rgb(), Some([0x11, 0x18, 0x27]));
    }

    #[test]
    fn min_side_has_floor() {
        let config = SigningConfig::default();
        assert_eq!(config.min_side_for(150.0, 100.0), 25.0);
        assert_eq!(config.min_side_for(40.0, 20.0), 12.0);
    }

    #[test]
    fn min_side_capped_by_own_size() {
        let config = SigningConfig::default();
        assert_eq!(config.min_side_for(20.0, 10.0), 10.0);
        assert_eq!(config.min_side_for(150.0, 6.25), 6.25);
    }
}
