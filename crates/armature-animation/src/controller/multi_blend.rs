//! Weighted blend that fills gaps with each bone's rest transform

use super::Controller;
use crate::pose::{Pose, SampleContext};

/// Composite controller like [`super::BlendController`], except a child that
/// does not drive a bone contributes that bone's rest transform rather than
/// the incoming buffer.
#[derive(Debug, Clone)]
pub struct MultiBlendController {
    name: String,
    children: Vec<Controller>,
    ticks: i64,
    weight: f32,
}

impl MultiBlendController {
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
        out.clear();

        let mut scratch = ctx.pool.take();
        for child in self.children.iter().filter(|c| c.weight() > 0.0) {
            let weight = child.weight();
            scratch.seed_rest(ctx.hierarchy);
            child.get_transforms(ctx, &mut scratch);

            for (bone, rest) in ctx.hierarchy.default_transforms().enumerate() {
                if scratch.is_touched(bone) {
                    out.accumulate(bone, scratch.get(bone), weight);
                } else {
                    out.add(bone, rest, weight);
                }
            }
        }
        ctx.pool.give(scratch);
    }
}
