//! Shared fixtures for unit tests

use crate::catalog::AnimationCatalog;
use crate::rig::Rig;
use crate::skeleton::BoneHierarchy;
use crate::source::{AnimationSource, BoneSource, RigSource, SkinDatumSource, TrackSource};
use armature_core::{KEYFRAME_RATE, TICKS_PER_SECOND};
use glam::{Mat4, Vec3};
use std::sync::Arc;

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// root -> arm -> hand, each offset from its parent
pub fn three_bones() -> Vec<BoneSource> {
    vec![
        BoneSource::new("root", None, Mat4::from_translation(Vec3::new(0.0, 0.0, 1.0))),
        BoneSource::new("arm", Some(0), Mat4::from_translation(Vec3::new(1.0, 0.0, 0.0))),
        BoneSource::new("hand", Some(1), Mat4::from_translation(Vec3::new(0.0, 1.0, 0.0))),
    ]
}

pub fn three_bone_hierarchy() -> BoneHierarchy {
    BoneHierarchy::from_source(&three_bones()).unwrap()
}

/// An animation holding each listed bone at a fixed transform for its whole
/// duration
pub fn constant_animation(name: &str, duration: i64, bones: &[(&str, Mat4)]) -> AnimationSource {
    let samples = (duration * KEYFRAME_RATE / TICKS_PER_SECOND + 1) as usize;
    AnimationSource {
        name: name.to_string(),
        duration_ticks: duration,
        tracks: bones
            .iter()
            .map(|(bone, m)| TrackSource::sampled(*bone, duration, vec![*m; samples]))
            .collect(),
    }
}

pub fn catalog_with(hierarchy: &BoneHierarchy, animations: Vec<AnimationSource>) -> AnimationCatalog {
    AnimationCatalog::bind(&animations, hierarchy).unwrap()
}

/// Identity inverse-bind skin covering every bone of [`three_bones`]
pub fn identity_skin() -> Vec<Vec<SkinDatumSource>> {
    vec![three_bones()
        .iter()
        .enumerate()
        .map(|(i, bone)| SkinDatumSource {
            bone_index: i,
            bone_name: Some(bone.name.clone()),
            inverse_bind: Mat4::IDENTITY.to_cols_array_2d(),
            palette_slot: i,
        })
        .collect()]
}

pub fn rig_with(animations: Vec<AnimationSource>) -> Arc<Rig> {
    Arc::new(
        Rig::from_source(RigSource {
            bones: three_bones(),
            animations,
            skins: identity_skin(),
        })
        .unwrap(),
    )
}

/// One-second animations for the listed names, each nudging the root
pub fn rig_with_names(names: &[&str]) -> Arc<Rig> {
    rig_with(
        names
            .iter()
            .enumerate()
            .map(|(i, name)| {
                constant_animation(
                    name,
                    TICKS_PER_SECOND,
                    &[("root", Mat4::from_translation(Vec3::new(i as f32, 0.0, 0.0)))],
                )
            })
            .collect(),
    )
}

#[track_caller]
pub fn assert_mat4_near(actual: Mat4, expected: Mat4) {
    assert!(
        actual.abs_diff_eq(expected, 1e-4),
        "matrices differ\n  actual:   {actual:?}\n  expected: {expected:?}"
    );
}
