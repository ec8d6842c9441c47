//! Per-bone transform buffers used while sampling controllers
//!
//! A [`Pose`] pairs one transform per bone with a touched flag recording
//! whether a controller wrote that bone. Blend controllers borrow scratch
//! poses from a [`PosePool`] owned by the animation instance, so sampling
//! never allocates once the pool is warm and no buffer is shared between
//! instances.

use crate::skeleton::BoneHierarchy;
use glam::Mat4;

/// One transform per bone plus a touched flag per bone
#[derive(Debug, Clone, PartialEq)]
pub struct Pose {
    transforms: Vec<Mat4>,
    touched: Vec<bool>,
}

impl Pose {
    /// A zeroed pose with no bone touched
    pub fn new(bone_count: usize) -> Self {
        Self {
            transforms: vec![Mat4::ZERO; bone_count],
            touched: vec![false; bone_count],
        }
    }

    pub fn len(&self) -> usize {
        self.transforms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transforms.is_empty()
    }

    /// Zero every transform and clear every touched flag
    pub fn clear(&mut self) {
        self.transforms.fill(Mat4::ZERO);
        self.touched.fill(false);
    }

    /// Load `transforms` as untouched starting values
    pub fn seed(&mut self, transforms: impl IntoIterator<Item = Mat4>) {
        for (dst, src) in self.transforms.iter_mut().zip(transforms) {
            *dst = src;
        }
        self.touched.fill(false);
    }

    /// Load the rest pose of `hierarchy` as untouched starting values
    pub fn seed_rest(&mut self, hierarchy: &BoneHierarchy) {
        self.seed(hierarchy.default_transforms());
    }

    /// Copy transforms and touched flags from `other`
    pub fn copy_from(&mut self, other: &Pose) {
        self.transforms.copy_from_slice(&other.transforms);
        self.touched.copy_from_slice(&other.touched);
    }

    /// Overwrite a bone and mark it touched
    pub fn set(&mut self, bone: usize, transform: Mat4) {
        self.transforms[bone] = transform;
        self.touched[bone] = true;
    }

    /// Add `transform * weight` to a bone and mark it touched
    pub fn accumulate(&mut self, bone: usize, transform: Mat4, weight: f32) {
        self.transforms[bone] += transform * weight;
        self.touched[bone] = true;
    }

    /// Add `transform * weight` to a bone, leaving its touched flag alone
    pub fn add(&mut self, bone: usize, transform: Mat4, weight: f32) {
        self.transforms[bone] += transform * weight;
    }

    pub fn get(&self, bone: usize) -> Mat4 {
        self.transforms[bone]
    }

    pub fn is_touched(&self, bone: usize) -> bool {
        self.touched[bone]
    }

    pub fn transforms(&self) -> &[Mat4] {
        &self.transforms
    }

    pub fn touched(&self) -> &[bool] {
        &self.touched
    }

    /// Set a bone's touched flag without changing its transform
    pub fn mark(&mut self, bone: usize, touched: bool) {
        self.touched[bone] = touched;
    }
}

/// Free list of scratch poses sized for one skeleton.
///
/// Owned by a single animation instance; `&mut` access makes reentrant
/// use impossible, and nested blends simply take one pose each.
#[derive(Debug, Clone)]
pub struct PosePool {
    bone_count: usize,
    free: Vec<Pose>,
}

impl PosePool {
    pub fn new(bone_count: usize) -> Self {
        Self {
            bone_count,
            free: Vec::new(),
        }
    }

    pub fn bone_count(&self) -> usize {
        self.bone_count
    }

    /// Number of poses waiting for reuse
    pub fn available(&self) -> usize {
        self.free.len()
    }

    /// Borrow a cleared pose
    pub fn take(&mut self) -> Pose {
        match self.free.pop() {
            Some(mut pose) => {
                pose.clear();
                pose
            }
            None => Pose::new(self.bone_count),
        }
    }

    /// Return a pose for reuse
    pub fn give(&mut self, pose: Pose) {
        debug_assert_eq!(pose.len(), self.bone_count);
        self.free.push(pose);
    }
}

/// What a controller may use while producing transforms
pub struct SampleContext<'a> {
    pub hierarchy: &'a BoneHierarchy,
    pub pool: &'a mut PosePool,
}

impl<'a> SampleContext<'a> {
    pub fn new(hierarchy: &'a BoneHierarchy, pool: &'a mut PosePool) -> Self {
        Self { hierarchy, pool }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn new_pose_is_zero_and_untouched() {
        let pose = Pose::new(3);
        assert_eq!(pose.len(), 3);
        assert!(pose.transforms().iter().all(|m| *m == Mat4::ZERO));
        assert!(pose.touched().iter().all(|t| !t));
    }

    #[test]
    fn seed_keeps_bones_untouched() {
        let mut pose = Pose::new(2);
        pose.set(0, Mat4::IDENTITY);
        pose.seed([Mat4::IDENTITY, Mat4::from_translation(Vec3::Y)]);
        assert!(!pose.is_touched(0));
        assert_eq!(pose.get(1), Mat4::from_translation(Vec3::Y));
    }

    #[test]
    fn accumulate_sums_weighted_transforms() {
        let mut pose = Pose::new(1);
        pose.accumulate(0, Mat4::from_translation(Vec3::X), 0.25);
        pose.accumulate(0, Mat4::from_translation(Vec3::Y), 0.75);
        let m = pose.get(0);
        assert!(pose.is_touched(0));
        assert!((m.w_axis.x - 0.25).abs() < 1e-6);
        assert!((m.w_axis.y - 0.75).abs() < 1e-6);
        assert!((m.w_axis.w - 1.0).abs() < 1e-6);
    }

    #[test]
    fn pool_reuses_and_clears_poses() {
        let mut pool = PosePool::new(2);
        let mut pose = pool.take();
        pose.set(1, Mat4::IDENTITY);
        pool.give(pose);
        assert_eq!(pool.available(), 1);

        let pose = pool.take();
        assert_eq!(pool.available(), 0);
        assert!(!pose.is_touched(1));
        assert_eq!(pose.get(1), Mat4::ZERO);
    }
}
