//! Weighted blend over child controllers

use super::Controller;
use crate::pose::{Pose, SampleContext};

/// Composite controller summing its children's poses by weight.
///
/// The result is a plain weighted sum with no renormalization: callers keep
/// sibling weights summing to 1. A child that does not drive a bone
/// contributes the incoming value of that bone, scaled by its weight.
#[derive(Debug, Clone)]
pub struct BlendController {
    name: String,
    children: Vec<Controller>,
    ticks: i64,
    weight: f32,
}

impl BlendController {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            children: Vec::new(),
            ticks: 0,
            weight: 1.0,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Append a child, returning its index
    pub fn add(&mut self, child: impl Into<Controller>) -> usize {
        self.children.push(child.into());
        self.children.len() - 1
    }

    pub fn child(&self, index: usize) -> Option<&Controller> {
        self.children.get(index)
    }

    pub fn child_mut(&mut self, index: usize) -> Option<&mut Controller> {
        self.children.get_mut(index)
    }

    pub fn children(&self) -> &[Controller] {
        &self.children
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    pub fn weight(&self) -> f32 {
        self.weight
    }

    pub fn set_weight(&mut self, weight: f32) {
        self.weight = weight;
    }

    /// Accumulated time, only meaningful as a change signal
    pub fn current_ticks(&self) -> i64 {
        self.ticks
    }

    pub fn update(&mut self, delta_ticks: i64) {
        for child in &mut self.children {
            child.update(delta_ticks);
        }
        self.ticks = self.ticks.wrapping_add(delta_ticks);
    }

    pub fn get_transforms(&self, ctx: &mut SampleContext<'_>, out: &mut Pose) {
        if !self.children.iter().any(|c| c.weight() > 0.0) {
            return;
        }

        let mut defaults = ctx.pool.take();
        defaults.copy_from(out);
        out.clear();

        let mut scratch = ctx.pool.take();
        for child in self.children.iter().filter(|c| c.weight() > 0.0) {
            let weight = child.weight();
            scratch.seed(defaults.transforms().iter().copied());
            child.get_transforms(ctx, &mut scratch);

            for bone in 0..out.len() {
                if scratch.is_touched(bone) {
                    out.add(bone, scratch.get(bone), weight);
                    out.mark(bone, true);
                } else {
                    out.add(bone, defaults.get(bone), weight);
                }
            }
        }

        for bone in 0..out.len() {
            if defaults.is_touched(bone) {
                out.mark(bone, true);
            }
        }

        ctx.pool.give(scratch);
        ctx.pool.give(defaults);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::SimpleController;
    use crate::pose::PosePool;
    use crate::testing::{assert_mat4_near, catalog_with, constant_animation, three_bone_hierarchy};
    use glam::{Mat4, Vec3};
    use test_case::test_case;

    fn translate(x: f32, y: f32, z: f32) -> Mat4 {
        Mat4::from_translation(Vec3::new(x, y, z))
    }

    #[test]
    fn cross_blend_is_a_pure_weighted_sum() {
        let h = three_bone_hierarchy();
        let catalog = catalog_with(
            &h,
            vec![
                constant_animation("a", 1000, &[("root", translate(1.0, 0.0, 0.0))]),
                constant_animation("b", 1000, &[("root", translate(0.0, 1.0, 0.0))]),
            ],
        );
        let mut blend = BlendController::new("test");
        let mut a = SimpleController::try_make(&catalog, "a", None).unwrap();
        a.set_weight(0.25);
        let mut b = SimpleController::try_make(&catalog, "b", None).unwrap();
        b.set_weight(0.75);
        blend.add(a);
        blend.add(b);

        let mut pool = PosePool::new(h.len());
        let mut ctx = SampleContext::new(&h, &mut pool);
        let mut out = Pose::new(h.len());
        out.seed_rest(&h);
        blend.get_transforms(&mut ctx, &mut out);

        assert_mat4_near(out.get(0), translate(0.25, 0.75, 0.0));
        assert!(out.is_touched(0));
        // Untouched bones come back as their defaults since weights sum to 1
        assert_mat4_near(out.get(1), h.bone(1).unwrap().default_local());
        assert!(!out.is_touched(1));
    }

    // Each child drives one disjoint bone set; every bone must equal the
    // transform of the child driving it whenever that child's weight is 1.
    #[test_case(&[1.0] ; "single child")]
    #[test_case(&[0.5, 0.5] ; "two halves")]
    #[test_case(&[0.3, 0.3, 0.4] ; "three uneven")]
    fn weights_summing_to_one_conserve_the_pose(weights: &[f32]) {
        let h = three_bone_hierarchy();
        let bones = ["root", "arm", "hand"];
        let posed = |i: usize| translate(i as f32 + 1.0, 2.0, 3.0);

        // Child i drives bone i; with weight w_i the bone becomes
        // w_i * posed(i) + (1 - w_i) * rest(i)
        let animations = (0..weights.len())
            .map(|i| constant_animation(&format!("c{i}"), 1000, &[(bones[i], posed(i))]))
            .collect();
        let catalog = catalog_with(&h, animations);

        let mut blend = BlendController::new("table");
        for (i, &w) in weights.iter().enumerate() {
            let mut c = SimpleController::try_make(&catalog, &format!("c{i}"), None).unwrap();
            c.set_weight(w);
            blend.add(c);
        }

        let mut pool = PosePool::new(h.len());
        let mut ctx = SampleContext::new(&h, &mut pool);
        let mut out = Pose::new(h.len());
        out.seed_rest(&h);
        blend.get_transforms(&mut ctx, &mut out);

        for (i, &w) in weights.iter().enumerate() {
            let rest = h.bone(i).unwrap().default_local();
            let expected = posed(i) * w + rest * (1.0 - w);
            assert_mat4_near(out.get(i), expected);
        }
        if weights.len() == 1 {
            assert_mat4_near(out.get(0), posed(0));
        }
    }

    #[test]
    fn all_zero_weights_leave_buffer_alone() {
        let h = three_bone_hierarchy();
        let catalog = catalog_with(&h, vec![constant_animation("a", 1000, &[("root", translate(5.0, 0.0, 0.0))])]);
        let mut blend = BlendController::new("idle");
        let mut a = SimpleController::try_make(&catalog, "a", None).unwrap();
        a.set_weight(0.0);
        blend.add(a);

        let mut pool = PosePool::new(h.len());
        let mut ctx = SampleContext::new(&h, &mut pool);
        let mut out = Pose::new(h.len());
        out.seed_rest(&h);
        let before = out.clone();
        blend.get_transforms(&mut ctx, &mut out);
        assert_eq!(out, before);
    }

    #[test]
    fn nested_blend_sees_real_defaults() {
        let h = three_bone_hierarchy();
        let catalog = catalog_with(&h, vec![constant_animation("a", 1000, &[("root", translate(2.0, 0.0, 0.0))])]);

        let mut inner = BlendController::new("inner");
        inner.add(SimpleController::try_make(&catalog, "a", None).unwrap());
        let mut outer = BlendController::new("outer");
        outer.add(inner);

        let mut pool = PosePool::new(h.len());
        let mut ctx = SampleContext::new(&h, &mut pool);
        let mut out = Pose::new(h.len());
        out.seed_rest(&h);
        outer.get_transforms(&mut ctx, &mut out);

        assert_mat4_near(out.get(0), translate(2.0, 0.0, 0.0));
        assert_mat4_near(out.get(2), h.bone(2).unwrap().default_local());
        // Buffers went back to the pool
        assert_eq!(pool.available(), 4);
    }

    #[test]
    fn update_forwards_time_to_children() {
        let h = three_bone_hierarchy();
        let catalog = catalog_with(&h, vec![constant_animation("a", 1000, &[("root", Mat4::IDENTITY)])]);
        let mut blend = BlendController::new("root");
        let index = blend.add(SimpleController::try_make(&catalog, "a", None).unwrap());

        blend.update(250);
        assert_eq!(blend.current_ticks(), 250);
        assert_eq!(blend.child(index).unwrap().current_ticks(), 250);
        blend.update(1000);
        assert_eq!(blend.current_ticks(), 1250);
        assert_eq!(blend.child(index).unwrap().current_ticks(), 250);
    }
}
