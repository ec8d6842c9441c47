//! Per-bone keyframe tracks sampled at a fixed rate

use crate::source::{to_mat4, TrackSource};
use armature_core::{ArmatureError, Result, KEYFRAME_RATE, TICKS_PER_SECOND};
use glam::Mat4;

/// A bone-to-parent transform stamped with its tick time
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Keyframe {
    pub ticks: i64,
    pub transform: Mat4,
}

/// Keyframes for one bone within one animation.
///
/// Lookups by time are pure step sampling: the keyframe at or before the
/// requested tick, assuming the 30Hz export rate.
#[derive(Debug, Clone)]
pub struct KeyframeTrack {
    bone_name: String,
    duration: i64,
    keyframes: Vec<Keyframe>,
}

impl KeyframeTrack {
    /// Build a track from content. `animation` is used for error messages.
    pub fn from_source(animation: &str, src: &TrackSource) -> Result<Self> {
        if src.samples.is_empty() {
            return Err(ArmatureError::EmptyTrack {
                animation: animation.to_string(),
                bone: src.bone_name.clone(),
            });
        }
        if let Some(times) = &src.times {
            if times.len() != src.samples.len() {
                return Err(ArmatureError::AnimationError(format!(
                    "Animation '{}' track '{}' has {} samples but {} times",
                    animation,
                    src.bone_name,
                    src.samples.len(),
                    times.len()
                )));
            }
            if times.windows(2).any(|w| w[1] < w[0]) {
                return Err(ArmatureError::AnimationError(format!(
                    "Animation '{}' track '{}' has decreasing keyframe times",
                    animation, src.bone_name
                )));
            }
        }

        let keyframes = src
            .samples
            .iter()
            .enumerate()
            .map(|(i, m)| Keyframe {
                ticks: src.time_of(i),
                transform: to_mat4(m),
            })
            .collect();

        Ok(Self {
            bone_name: src.bone_name.clone(),
            duration: src.ticks_duration,
            keyframes,
        })
    }

    pub fn bone_name(&self) -> &str {
        &self.bone_name
    }

    /// Duration in ticks
    pub fn duration(&self) -> i64 {
        self.duration
    }

    pub fn len(&self) -> usize {
        self.keyframes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keyframes.is_empty()
    }

    pub fn keyframes(&self) -> &[Keyframe] {
        &self.keyframes
    }

    /// Index of the keyframe at or before `ticks`, clamped to the track.
    pub fn index_at_time(&self, ticks: i64) -> usize {
        let last = self.keyframes.len().saturating_sub(1) as i64;
        let index = (ticks.saturating_mul(KEYFRAME_RATE)).div_euclid(TICKS_PER_SECOND);
        index.clamp(0, last) as usize
    }

    /// Step-sampled transform at `ticks`
    pub fn transform_at_time(&self, ticks: i64) -> Mat4 {
        self.keyframes[self.index_at_time(ticks)].transform
    }

    /// Locate the keyframes bracketing `ticks` using the stored time stamps.
    ///
    /// Returns the keyframe at or before `ticks` and, when a later keyframe
    /// exists, its index plus the interpolation fraction toward it. Before
    /// the first keyframe and at or past the last one there is nothing to
    /// interpolate.
    pub fn bracket(&self, ticks: i64) -> (usize, Option<(usize, f32)>) {
        let after = self.keyframes.partition_point(|k| k.ticks <= ticks);
        if after == 0 {
            return (0, None);
        }
        let current = after - 1;
        let Some(next) = self.keyframes.get(after) else {
            return (current, None);
        };
        let start = self.keyframes[current].ticks;
        let span = next.ticks - start;
        if span <= 0 {
            return (current, None);
        }
        let t = (ticks - start) as f32 / span as f32;
        (current, Some((after, t)))
    }
}
