//! Leaf controller playing one animation with step sampling

use super::playback::Playback;
use crate::catalog::{Animation, AnimationCatalog};
use crate::pose::Pose;
use rand::Rng;
use std::sync::Arc;

/// Plays a single bound animation.
#[derive(Debug, Clone)]
pub struct SimpleController {
    animation: Arc<Animation>,
    playback: Playback,
    weight: f32,
}

impl SimpleController {
    /// A looping controller at tick 0 with full weight
    pub fn new(animation: Arc<Animation>) -> Self {
        let playback = Playback::new(animation.duration());
        Self {
            animation,
            playback,
            weight: 1.0,
        }
    }

    /// Controller for `name`, falling back to `backup` when `name` is missing.
    ///
    /// Returns `None` when neither exists.
    pub fn try_make(catalog: &AnimationCatalog, name: &str, backup: Option<&str>) -> Option<Self> {
        catalog
            .get(name)
            .or_else(|| backup.and_then(|b| catalog.get(b)))
            .map(|animation| Self::new(Arc::clone(animation)))
    }

    pub fn animation(&self) -> &Arc<Animation> {
        &self.animation
    }

    pub fn animation_name(&self) -> &str {
        self.animation.name()
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

    pub fn duration(&self) -> i64 {
        self.playback.duration()
    }

    pub fn looping(&self) -> bool {
        self.playback.looping
    }

    pub fn set_looping(&mut self, looping: bool) {
        self.playback.looping = looping;
    }

    pub fn set_one_more_loop(&mut self, one_more_loop: bool) {
        self.playback.one_more_loop = one_more_loop;
    }

    pub fn at_end(&self) -> bool {
        self.playback.at_end()
    }

    pub fn set_to_begin(&mut self) {
        self.playback.set_to_begin();
    }

    pub fn set_to_end(&mut self) {
        self.playback.set_to_end();
    }

    pub fn set_to_random<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.playback.set_to_random(rng);
    }

    pub fn update(&mut self, delta_ticks: i64) {
        self.playback.advance(delta_ticks);
    }

    /// Overwrite every bone this animation drives; other bones keep what the
    /// caller put there.
    pub fn get_transforms(&self, out: &mut Pose) {
        self.animation.sample_into(self.playback.ticks(), out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{catalog_with, constant_animation, three_bone_hierarchy};
    use glam::{Mat4, Vec3};

    #[test]
    fn try_make_falls_back_to_backup() {
        let h = three_bone_hierarchy();
        let catalog = catalog_with(&h, vec![constant_animation("idle", 1000, &[("root", Mat4::IDENTITY)])]);

        let c = SimpleController::try_make(&catalog, "forward", Some("idle")).unwrap();
        assert_eq!(c.animation_name(), "idle");
        assert!(SimpleController::try_make(&catalog, "forward", None).is_none());
        assert!(SimpleController::try_make(&catalog, "forward", Some("run")).is_none());
    }

    #[test]
    fn one_shot_reaches_end_after_duration() {
        let h = three_bone_hierarchy();
        let catalog = catalog_with(&h, vec![constant_animation("jump", 900, &[("root", Mat4::IDENTITY)])]);
        let mut c = SimpleController::try_make(&catalog, "jump", None).unwrap();
        c.set_looping(false);
        c.set_to_begin();

        c.update(400);
        assert!(!c.at_end());
        c.update(500);
        assert!(c.at_end());
        c.update(100);
        assert!(c.at_end());
    }

    #[test]
    fn get_transforms_leaves_untracked_bones() {
        let h = three_bone_hierarchy();
        let moved = Mat4::from_translation(Vec3::X);
        let catalog = catalog_with(&h, vec![constant_animation("wave", 1000, &[("arm", moved)])]);
        let c = SimpleController::try_make(&catalog, "wave", None).unwrap();

        let mut pose = Pose::new(h.len());
        pose.seed_rest(&h);
        c.get_transforms(&mut pose);
        assert!(!pose.is_touched(0));
        assert_eq!(pose.get(0), h.bone(0).unwrap().default_local());
        assert_eq!(pose.get(1), moved);
    }
}
