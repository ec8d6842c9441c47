//! Looping animation weights derived from movement, and weight easing

use crate::config::AnimationSetConfig;
use armature_core::FrameTime;
use glam::Vec3;
use std::f32::consts::{FRAC_PI_2, PI, TAU};

/// Target weights for the movement-driven looping animations
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoopedWeights {
    pub idle: f32,
    pub forward: f32,
    pub backwards: f32,
    pub left: f32,
    pub right: f32,
}

impl LoopedWeights {
    /// Standing still
    pub const IDLE: Self = Self {
        idle: 1.0,
        forward: 0.0,
        backwards: 0.0,
        left: 0.0,
        right: 0.0,
    };

    pub fn total(&self) -> f32 {
        self.idle + self.forward + self.backwards + self.left + self.right
    }
}

impl Default for LoopedWeights {
    fn default() -> Self {
        Self::IDLE
    }
}

/// Where the actor is and which way it faces. Z is up.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MovementState {
    pub facing: Vec3,
    pub position: Vec3,
    /// Heading around Z in radians
    pub rotation_z: f32,
}

impl Default for MovementState {
    fn default() -> Self {
        Self {
            facing: Vec3::X,
            position: Vec3::ZERO,
            rotation_z: 0.0,
        }
    }
}

/// What the actor is trying to do this frame
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DesiredMovement {
    pub velocity: Option<Vec3>,
    /// Location to move toward; wins over `velocity`
    pub target: Option<Vec3>,
    pub rotation_angle: Option<f32>,
    /// Only the sign is used
    pub rotation_rate: Option<f32>,
}

/// Hermite smoothstep of `x` between the two edges
pub fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Wrap an angle into `[-PI, PI)`
pub fn wrap_angle(angle: f32) -> f32 {
    (angle + PI).rem_euclid(TAU) - PI
}

/// The common mapping from movement to looping weights.
///
/// A desired velocity or target blends forward/left/right by how well the
/// facing lines up with the desired heading. Otherwise a desired rotation
/// blends left/right by how far the actor still has to turn. Each weight is
/// shaped with `smoothstep(0.1, 0.9)`; the set is normalized when it sums
/// above 1, and idle fills the remainder when it does not.
pub fn standard_looped_weights(movement: &MovementState, desired: &DesiredMovement) -> LoopedWeights {
    let mut forward = 0.0;
    let mut left = 0.0;
    let mut right = 0.0;

    if desired.velocity.is_some() || desired.target.is_some() {
        let facing = movement.facing;
        let wanted = match (desired.target, desired.velocity) {
            (Some(target), _) => target - movement.position,
            (None, Some(velocity)) => velocity,
            (None, None) => facing,
        };
        if let Some(wanted) = wanted.try_normalize() {
            forward = wanted.dot(facing).max(0.0);
            let side = facing.cross(Vec3::Z).normalize_or_zero();
            right = side.dot(wanted).max(0.0);
            left = (-side).dot(wanted).max(0.0);
        }
    } else if desired.rotation_angle.is_some() || desired.rotation_rate.is_some() {
        let heading = movement.rotation_z;
        let mut wanted = desired.rotation_angle.unwrap_or(heading);
        if let Some(rate) = desired.rotation_rate {
            let sign = if rate == 0.0 { 0.0 } else { rate.signum() };
            wanted = heading + sign;
        }
        let delta = wrap_angle(heading - wanted);
        if delta > 0.0 {
            right = (delta / FRAC_PI_2).min(1.0);
        } else {
            left = (-delta / FRAC_PI_2).min(1.0);
        }
    }

    forward = smoothstep(0.1, 0.9, forward);
    right = smoothstep(0.1, 0.9, right);
    left = smoothstep(0.1, 0.9, left);

    let total = forward + right + left;
    let mut idle = 0.0;
    if total > 1.0 {
        forward /= total;
        left /= total;
        right /= total;
    } else {
        idle = 1.0 - total;
    }

    LoopedWeights {
        idle,
        forward,
        backwards: 0.0,
        left,
        right,
    }
}

/// Ease `current` toward `target` over one frame.
///
/// Easing toward 0 aims slightly below zero and clamps, so weights reach
/// exactly 0 instead of approaching it forever. A paused frame (delta 0)
/// still eases by one frame at the current frame rate.
pub fn ease_weight(current: f32, target: f32, frame: &FrameTime, config: &AnimationSetConfig) -> f32 {
    let mut secs = frame.delta_seconds;
    if secs == 0.0 {
        let rate = if frame.frame_rate > 0.0 {
            frame.frame_rate
        } else {
            config.fallback_frame_rate
        };
        secs = 1.0 / rate;
    }

    let t = config.blend_speed * secs;
    if t >= 1.0 {
        target
    } else if target == 0.0 {
        lerp(current, config.zero_target_bias, t).max(0.0)
    } else {
        lerp(current, target, t)
    }
}

fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}
