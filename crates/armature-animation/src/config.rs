//! Tuning for animation set weight easing and idle entertainment

use armature_core::{ArmatureError, Result};
use serde::{Deserialize, Serialize};

/// Per-set tuning. Every field has a default, so an empty TOML table is a
/// valid config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationSetConfig {
    /// Exponential easing rate for looping weights, per second
    pub blend_speed: f32,
    /// Target used instead of 0 while easing a weight down, so the weight
    /// lands on exactly 0 after clamping
    pub zero_target_bias: f32,
    /// Frame rate assumed for easing when the frame delta is 0 and the host
    /// reports no frame rate
    pub fallback_frame_rate: f32,
    /// Minimum idle seconds before an entertainment animation
    pub min_entertainment_wait: f32,
    /// Random extra seconds added to the minimum wait
    pub entertainment_wait_jitter: f32,
    /// Start looping controllers at a random tick
    pub randomize_loop_start: bool,
    /// Idle plus backwards weight above which the actor counts as idle
    pub idle_threshold: f32,
}

impl Default for AnimationSetConfig {
    fn default() -> Self {
        Self {
            blend_speed: 10.0,
            zero_target_bias: -0.01,
            fallback_frame_rate: 60.0,
            min_entertainment_wait: 5.0,
            entertainment_wait_jitter: 10.0,
            randomize_loop_start: true,
            idle_threshold: 0.999,
        }
    }
}

impl AnimationSetConfig {
    /// Check every field is usable.
    pub fn validate(&self) -> Result<()> {
        check_range("blend_speed", self.blend_speed, f32::MIN_POSITIVE, f32::MAX)?;
        check_range(
            "fallback_frame_rate",
            self.fallback_frame_rate,
            f32::MIN_POSITIVE,
            f32::MAX,
        )?;
        check_range("zero_target_bias", self.zero_target_bias, f32::MIN, 0.0)?;
        check_range(
            "min_entertainment_wait",
            self.min_entertainment_wait,
            0.0,
            f32::MAX,
        )?;
        check_range(
            "entertainment_wait_jitter",
            self.entertainment_wait_jitter,
            0.0,
            f32::MAX,
        )?;
        check_range("idle_threshold", self.idle_threshold, 0.0, 1.0)?;
        Ok(())
    }
}

fn check_range(field: &str, value: f32, min: f32, max: f32) -> Result<()> {
    if value.is_nan() || value < min || value > max {
        return Err(ArmatureError::ValueOutOfRange {
            field: field.to_string(),
            min: min as f64,
            max: max as f64,
            value: value as f64,
        });
    }
    Ok(())
}
