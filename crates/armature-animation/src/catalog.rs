//! Named animations bound to a skeleton

use crate::pose::Pose;
use crate::skeleton::BoneHierarchy;
use crate::source::AnimationSource;
use crate::track::KeyframeTrack;
use armature_core::{ArmatureError, Result};
use std::collections::HashMap;
use std::sync::Arc;

/// A named set of keyframe tracks bound to one skeleton.
///
/// Binding resolves every track's bone name to an index into the
/// hierarchy, so sampling never looks names up.
#[derive(Debug, Clone)]
pub struct Animation {
    name: String,
    duration: i64,
    tracks: Vec<KeyframeTrack>,
    bone_index_for_track: Vec<usize>,
}

impl Animation {
    /// Build an animation from content and bind it against `hierarchy`.
    pub fn bind(source: &AnimationSource, hierarchy: &BoneHierarchy) -> Result<Self> {
        let mut tracks = Vec::with_capacity(source.tracks.len());
        let mut bone_index_for_track = Vec::with_capacity(source.tracks.len());

        for src in &source.tracks {
            if src.ticks_duration != source.duration_ticks {
                return Err(ArmatureError::InconsistentDuration {
                    animation: source.name.clone(),
                    bone: src.bone_name.clone(),
                    track: src.ticks_duration,
                    expected: source.duration_ticks,
                });
            }
            let bone = hierarchy
                .index_of(&src.bone_name)
                .ok_or_else(|| ArmatureError::UnknownBone {
                    animation: source.name.clone(),
                    bone: src.bone_name.clone(),
                })?;
            tracks.push(KeyframeTrack::from_source(&source.name, src)?);
            bone_index_for_track.push(bone);
        }

        Ok(Self {
            name: source.name.clone(),
            duration: source.duration_ticks.max(0),
            tracks,
            bone_index_for_track,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Duration in ticks
    pub fn duration(&self) -> i64 {
        self.duration
    }

    pub fn tracks(&self) -> &[KeyframeTrack] {
        &self.tracks
    }

    pub fn bone_index_for_track(&self) -> &[usize] {
        &self.bone_index_for_track
    }

    /// Tracks paired with the bone each one drives
    pub fn bound_tracks(&self) -> impl Iterator<Item = (&KeyframeTrack, usize)> {
        self.tracks
            .iter()
            .zip(self.bone_index_for_track.iter().copied())
    }

    /// Write the step-sampled transform of every animated bone into `out`.
    /// Bones without a track are left as they were.
    pub fn sample_into(&self, ticks: i64, out: &mut Pose) {
        for (track, bone) in self.bound_tracks() {
            out.set(bone, track.transform_at_time(ticks));
        }
    }
}

/// All animations of one model, shared read-only between its instances.
#[derive(Debug, Clone, Default)]
pub struct AnimationCatalog {
    animations: Vec<Arc<Animation>>,
    by_name: HashMap<String, usize>,
}

impl AnimationCatalog {
    /// Bind every animation source against `hierarchy`.
    pub fn bind(sources: &[AnimationSource], hierarchy: &BoneHierarchy) -> Result<Self> {
        let mut catalog = Self::default();
        for source in sources {
            catalog.add(Animation::bind(source, hierarchy)?)?;
        }
        Ok(catalog)
    }

    /// Register a bound animation. Names must be unique.
    pub fn add(&mut self, animation: Animation) -> Result<()> {
        if self.by_name.contains_key(animation.name()) {
            return Err(ArmatureError::DuplicateAnimationName(
                animation.name().to_string(),
            ));
        }
        self.by_name
            .insert(animation.name().to_string(), self.animations.len());
        self.animations.push(Arc::new(animation));
        Ok(())
    }

    /// Look up an animation by name.
    pub fn get(&self, name: &str) -> Option<&Arc<Animation>> {
        self.by_name.get(name).map(|&i| &self.animations[i])
    }

    pub fn get_index(&self, index: usize) -> Option<&Arc<Animation>> {
        self.animations.get(index)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    pub fn first(&self) -> Option<&Arc<Animation>> {
        self.animations.first()
    }

    pub fn len(&self) -> usize {
        self.animations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.animations.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<Animation>> {
        self.animations.iter()
    }
}
