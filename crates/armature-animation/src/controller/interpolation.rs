//! Leaf controller interpolating between time-stamped keyframes

use super::playback::Playback;
use crate::blend::InterpolationMode;
use crate::catalog::Animation;
use crate::pose::Pose;
use std::sync::Arc;

/// Plays one animation, blending the two keyframes around the current tick.
///
/// Uses each keyframe's own time stamp instead of the fixed-rate bucket, so
/// it suits sparse keyframes. Before the first and at or past the last
/// keyframe the nearest keyframe is held flat.
#[derive(Debug, Clone)]
pub struct InterpolationController {
    animation: Arc<Animation>,
    playback: Playback,
    weight: f32,
    mode: InterpolationMode,
}

impl InterpolationController {
    pub fn new(animation: Arc<Animation>, mode: InterpolationMode) -> Self {
        let playback = Playback::new(animation.duration());
        Self {
            animation,
            playback,
            weight: 1.0,
            mode,
        }
    }

    pub fn animation(&self) -> &Arc<Animation> {
        &self.animation
    }

    pub fn animation_name(&self) -> &str {
        self.animation.name()
    }

    pub fn mode(&self) -> InterpolationMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: InterpolationMode) {
        self.mode = mode;
    }

    pub fn playback(&self) -> &Playback {
        &self.playback
    }

    pub fn playback_mut(&mut self) -> &mut Playback {
        &mut self.playback
    }

    pub fn weight(&self) -> f32 {
        self.weight
    }

    pub fn set_weight(&mut self, weight: f32) {
        self.weight = weight;
    }

    pub fn current_ticks(&self) -> i64 {
        self.playback.ticks()
    }

    pub fn update(&mut self, delta_ticks: i64) {
        self.playback.advance(delta_ticks);
    }

    pub fn get_transforms(&self, out: &mut Pose) {
        let ticks = self.playback.ticks();
        for (track, bone) in self.animation.bound_tracks() {
            let keys = track.keyframes();
            let transform = match track.bracket(ticks) {
                (current, Some((next, t))) => {
                    self.mode
                        .interpolate(keys[current].transform, keys[next].transform, t)
                }
                (current, None) => keys[current].transform,
            };
            out.set(bone, transform);
        }
    }
}
