//! Content shapes handed over by the model loader
//!
//! These mirror what the content pipeline extracts from a model: a flat
//! parent-indexed bone list, named keyframe tracks per animation and the
//! skinning bind data per mesh. Matrices are column-major `[[f32; 4]; 4]`,
//! the same layout `glam::Mat4::from_cols_array_2d` expects.

use armature_core::{KEYFRAME_RATE, TICKS_PER_SECOND};
use glam::Mat4;
use serde::{Deserialize, Serialize};

/// Column-major 4x4 matrix as stored in content
pub type MatrixSource = [[f32; 4]; 4];

pub const IDENTITY_MATRIX: MatrixSource = [
    [1.0, 0.0, 0.0, 0.0],
    [0.0, 1.0, 0.0, 0.0],
    [0.0, 0.0, 1.0, 0.0],
    [0.0, 0.0, 0.0, 1.0],
];

fn identity_matrix() -> MatrixSource {
    IDENTITY_MATRIX
}

/// Convert a content matrix to a `Mat4`
pub fn to_mat4(m: &MatrixSource) -> Mat4 {
    Mat4::from_cols_array_2d(m)
}

/// One bone from the model's bone collection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoneSource {
    pub name: String,
    /// Index of the parent bone, `None` for roots
    #[serde(default)]
    pub parent: Option<usize>,
    /// Bone-to-parent transform at rest
    #[serde(default = "identity_matrix")]
    pub local_bind: MatrixSource,
}

impl BoneSource {
    pub fn new(name: impl Into<String>, parent: Option<usize>, local_bind: Mat4) -> Self {
        Self {
            name: name.into(),
            parent,
            local_bind: local_bind.to_cols_array_2d(),
        }
    }
}

/// Keyframes for one bone within one animation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackSource {
    pub bone_name: String,
    pub ticks_duration: i64,
    /// Bone-to-parent transform per keyframe
    pub samples: Vec<MatrixSource>,
    /// Tick stamp per sample. When absent, sample `i` sits at `i / 30` seconds.
    #[serde(default)]
    pub times: Option<Vec<i64>>,
}

impl TrackSource {
    /// A fixed-rate track from a list of transforms
    pub fn sampled(
        bone_name: impl Into<String>,
        ticks_duration: i64,
        samples: impl IntoIterator<Item = Mat4>,
    ) -> Self {
        Self {
            bone_name: bone_name.into(),
            ticks_duration,
            samples: samples.into_iter().map(|m| m.to_cols_array_2d()).collect(),
            times: None,
        }
    }

    /// Number of keyframes
    pub fn sample_count(&self) -> usize {
        self.samples.len()
    }

    /// Tick stamp of sample `index`
    pub fn time_of(&self, index: usize) -> i64 {
        match &self.times {
            Some(times) => times.get(index).copied().unwrap_or(self.ticks_duration),
            None => index as i64 * TICKS_PER_SECOND / KEYFRAME_RATE,
        }
    }
}

/// A named animation: a set of tracks sharing one duration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnimationSource {
    pub name: String,
    pub duration_ticks: i64,
    #[serde(default)]
    pub tracks: Vec<TrackSource>,
}

/// One skinning bind entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkinDatumSource {
    pub bone_index: usize,
    /// Name of the bone, checked against the hierarchy when present
    #[serde(default)]
    pub bone_name: Option<String>,
    /// Model-to-bone transform at bind time
    #[serde(default = "identity_matrix")]
    pub inverse_bind: MatrixSource,
    pub palette_slot: usize,
}

/// Everything the animation runtime needs from one model
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RigSource {
    #[serde(default)]
    pub bones: Vec<BoneSource>,
    #[serde(default)]
    pub animations: Vec<AnimationSource>,
    /// Skin bind lists, one per mesh. Only the first may be non-empty.
    #[serde(default)]
    pub skins: Vec<Vec<SkinDatumSource>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_rate_times_follow_keyframe_rate() {
        let track = TrackSource::sampled("root", TICKS_PER_SECOND, vec![Mat4::IDENTITY; 31]);
        assert_eq!(track.time_of(0), 0);
        assert_eq!(track.time_of(15), TICKS_PER_SECOND / 2);
        assert_eq!(track.time_of(30), TICKS_PER_SECOND);
    }

    #[test]
    fn explicit_times_win() {
        let mut track = TrackSource::sampled("root", 100, vec![Mat4::IDENTITY; 2]);
        track.times = Some(vec![0, 80]);
        assert_eq!(track.time_of(1), 80);
    }

    #[test]
    fn matrix_round_trip_keeps_translation() {
        let m = Mat4::from_translation(glam::Vec3::new(1.0, 2.0, 3.0));
        let bone = BoneSource::new("root", None, m);
        assert_eq!(bone.local_bind[3], [1.0, 2.0, 3.0, 1.0]);
        assert_eq!(to_mat4(&bone.local_bind), m);
    }
}
