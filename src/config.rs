use std::{fs, path::Path};

use serde::Deserialize;
use thiserror::Error;

use crate::palette::{Argb, TrackPalette};


/// Text of `config/switch.toml`, the shipped default.
pub const DEFAULT_CONFIG_TOML: &str = include_str!("../config/switch.toml");

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("parse error: {0}")]
    Parse(String),
    #[error("validation error: {0}")]
    Validation(String),
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct SwitchConfig {
    pub layout: LayoutConfig,
    pub gesture: GestureConfig,
    pub hold: HoldConfig,
    pub spring: SpringConfig,
    pub palette: PaletteConfig,
}

#[derive(Clone, Copy, Debug, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct LayoutConfig {
    pub width_dp: u32,
    pub height_dp: u32,
    /// Gap between track edge and thumb, as a fraction of height.
    pub thumb_offset_percent: f32,
}

#[derive(Clone, Copy, Debug, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct GestureConfig {
    pub touch_slop_dp: f32,
    /// Fraction of width a drag from the unchecked side must pass to flip.
    /// Mirrored (`1 - x`) when dragging from the checked side.
    pub drag_toggle_threshold_percent: f32,
    /// Fraction of width beyond the track edge where a release abandons the drag.
    pub cancel_threshold_percent: f32,
}

#[derive(Clone, Copy, Debug, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct HoldConfig {
    pub delay_ms: u64,
    /// How far the trailing thumb edge stretches during the hold effect.
    pub shift: f32,
}

#[derive(Clone, Copy, Debug, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct SpringConfig {
    pub stiffness: f32,
    pub no_bounce_ratio: f32,
    pub bounce_ratio: f32,
    pub tint_min_visible_change: f32,
}

#[derive(Clone, Copy, Debug, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct PaletteConfig {
    pub track_default: Argb,
    pub track_checked: Argb,
    pub thumb: Argb,
    pub thumb_shadow: Argb,
    pub disabled_alpha: f32,
}

impl PaletteConfig {
    pub fn track(&self) -> TrackPalette {
        TrackPalette {
            default: self.track_default,
            checked: self.track_checked,
        }
    }
}

impl Default for SwitchConfig {
    fn default() -> Self {
        Self {
            layout: LayoutConfig {
                width_dp: 51,
                height_dp: 31,
                thumb_offset_percent: 0.0645,
            },
            gesture: GestureConfig {
                touch_slop_dp: 8.0,
                drag_toggle_threshold_percent: 0.6,
                cancel_threshold_percent: 0.5,
            },
            hold: HoldConfig {
                delay_ms: 60,
                shift: 0.33,
            },
            spring: SpringConfig {
                stiffness: 400.0,
                no_bounce_ratio: 1.0,
                bounce_ratio: 0.75,
                tint_min_visible_change: 1.0 / 256.0,
            },
            palette: PaletteConfig {
                track_default: Argb(0xFFE9_E9EB),
                track_checked: Argb(0xFF34_C759),
                thumb: Argb(0xFFFF_FFFF),
                thumb_shadow: Argb(0x2600_0000),
                disabled_alpha: 0.5,
            },
        }
    }
}

impl SwitchConfig {
    /// Parses and validates a TOML document.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let layout = &self.layout;
        ensure(
            layout.height_dp > 0 && layout.width_dp > layout.height_dp,
            "layout.width_dp must be > layout.height_dp > 0",
        )?;
        ensure(
            (0.0..0.5).contains(&layout.thumb_offset_percent),
            "layout.thumb_offset_percent must be in [0, 0.5)",
        )?;

        let gesture = &self.gesture;
        ensure(
            gesture.touch_slop_dp >= 0.0 && gesture.touch_slop_dp.is_finite(),
            "gesture.touch_slop_dp must be a finite value >= 0",
        )?;
        ensure(
            gesture.drag_toggle_threshold_percent > 0.5
                && gesture.drag_toggle_threshold_percent < 1.0,
            "gesture.drag_toggle_threshold_percent must be in (0.5, 1)",
        )?;
        ensure(
            gesture.cancel_threshold_percent >= 0.0 && gesture.cancel_threshold_percent.is_finite(),
            "gesture.cancel_threshold_percent must be a finite value >= 0",
        )?;

        ensure(
            self.hold.shift > 0.0 && self.hold.shift < 0.5,
            "hold.shift must be in (0, 0.5)",
        )?;

        let spring = &self.spring;
        ensure(
            spring.stiffness > 0.0 && spring.stiffness.is_finite(),
            "spring.stiffness must be positive",
        )?;
        ensure(
            spring.no_bounce_ratio > 0.0 && spring.bounce_ratio > 0.0,
            "spring damping ratios must be positive",
        )?;
        ensure(
            spring.bounce_ratio <= spring.no_bounce_ratio,
            "spring.bounce_ratio must be <= spring.no_bounce_ratio",
        )?;
        ensure(
            spring.tint_min_visible_change > 0.0 && spring.tint_min_visible_change < 1.0,
            "spring.tint_min_visible_change must be in (0, 1)",
        )?;

        ensure(
            (0.0..=1.0).contains(&self.palette.disabled_alpha),
            "palette.disabled_alpha must be in [0, 1]",
        )
    }
}

fn ensure(condition: bool, message: &str) -> Result<(), ConfigError> {
    if condition {
        Ok(())
    } else {
        Err(ConfigError::Validation(message.into()))
    }
}
