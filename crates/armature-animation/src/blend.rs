//! Transform interpolation utilities for keyframe blending
//!
//! Provides a component-wise matrix lerp and a decomposing interpolation
//! that slerps rotation while lerping scale and translation.

use glam::Mat4;
use serde::{Deserialize, Serialize};

/// How an interpolating controller blends neighbouring keyframes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum InterpolationMode {
    /// Component-wise lerp of all sixteen matrix entries
    #[default]
    Linear,
    /// Decompose, slerp rotation, lerp scale and translation, recompose
    Spherical,
}

impl InterpolationMode {
    pub fn interpolate(self, a: Mat4, b: Mat4, t: f32) -> Mat4 {
        match self {
            Self::Linear => lerp_transform(a, b, t),
            Self::Spherical => slerp_transform(a, b, t),
        }
    }
}

/// Component-wise lerp. `t` of 0.0 = fully `a`, 1.0 = fully `b`.
pub fn lerp_transform(a: Mat4, b: Mat4, t: f32) -> Mat4 {
    a * (1.0 - t) + b * t
}

/// Interpolate two affine transforms through their scale/rotation/translation.
///
/// Rotation uses quaternion slerp (shortest path), the rest is lerped.
pub fn slerp_transform(a: Mat4, b: Mat4, t: f32) -> Mat4 {
    let (sa, ra, ta) = a.to_scale_rotation_translation();
    let (sb, rb, tb) = b.to_scale_rotation_translation();
    Mat4::from_scale_rotation_translation(sa.lerp(sb, t), ra.slerp(rb, t), ta.lerp(tb, t))
}
