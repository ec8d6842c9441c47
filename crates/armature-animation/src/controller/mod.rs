//! Animation controllers: playback clocks and blend trees
//!
//! A [`Controller`] is one of four closed variants. Leaves (`Simple`,
//! `Interpolation`) own a playback clock over one animation; composites
//! (`Blend`, `MultiBlend`) own child controllers and sum their poses by
//! weight.

mod blend;
mod interpolation;
mod multi_blend;
mod playback;
mod simple;

pub use blend::BlendController;
pub use interpolation::InterpolationController;
pub use multi_blend::MultiBlendController;
pub use playback::Playback;
pub use simple::SimpleController;

use crate::pose::{Pose, SampleContext};

/// Slack allowed when checking a weight against `[0, 1]`
pub const WEIGHT_TOLERANCE: f32 = 1e-3;

#[derive(Debug, Clone)]
pub enum Controller {
    Simple(SimpleController),
    Blend(BlendController),
    MultiBlend(MultiBlendController),
    Interpolation(InterpolationController),
}

impl Controller {
    /// Advance the clock by `delta_ticks`.
    pub fn update(&mut self, delta_ticks: i64) {
        match self {
            Self::Simple(c) => c.update(delta_ticks),
            Self::Blend(c) => c.update(delta_ticks),
            Self::MultiBlend(c) => c.update(delta_ticks),
            Self::Interpolation(c) => c.update(delta_ticks),
        }
    }

    /// Write this controller's bone-to-parent transforms into `out`.
    ///
    /// Bones the controller drives are marked touched; the rest keep the
    /// values the caller seeded.
    pub fn get_transforms(&self, ctx: &mut SampleContext<'_>, out: &mut Pose) {
        match self {
            Self::Simple(c) => c.get_transforms(out),
            Self::Blend(c) => c.get_transforms(ctx, out),
            Self::MultiBlend(c) => c.get_transforms(ctx, out),
            Self::Interpolation(c) => c.get_transforms(out),
        }
    }

    pub fn current_ticks(&self) -> i64 {
        match self {
            Self::Simple(c) => c.current_ticks(),
            Self::Blend(c) => c.current_ticks(),
            Self::MultiBlend(c) => c.current_ticks(),
            Self::Interpolation(c) => c.current_ticks(),
        }
    }

    pub fn weight(&self) -> f32 {
        match self {
            Self::Simple(c) => c.weight(),
            Self::Blend(c) => c.weight(),
            Self::MultiBlend(c) => c.weight(),
            Self::Interpolation(c) => c.weight(),
        }
    }

    pub fn set_weight(&mut self, weight: f32) {
        debug_assert!(
            (-WEIGHT_TOLERANCE..=1.0 + WEIGHT_TOLERANCE).contains(&weight),
            "weight {weight} outside [0, 1]"
        );
        match self {
            Self::Simple(c) => c.set_weight(weight),
            Self::Blend(c) => c.set_weight(weight),
            Self::MultiBlend(c) => c.set_weight(weight),
            Self::Interpolation(c) => c.set_weight(weight),
        }
    }

    /// Animation name for leaves, blend name for composites
    pub fn name(&self) -> &str {
        match self {
            Self::Simple(c) => c.animation_name(),
            Self::Blend(c) => c.name(),
            Self::MultiBlend(c) => c.name(),
            Self::Interpolation(c) => c.animation_name(),
        }
    }

    pub fn as_simple(&self) -> Option<&SimpleController> {
        match self {
            Self::Simple(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_simple_mut(&mut self) -> Option<&mut SimpleController> {
        match self {
            Self::Simple(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_blend(&self) -> Option<&BlendController> {
        match self {
            Self::Blend(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_blend_mut(&mut self) -> Option<&mut BlendController> {
        match self {
            Self::Blend(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_multi_blend(&self) -> Option<&MultiBlendController> {
        match self {
            Self::MultiBlend(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_interpolation(&self) -> Option<&InterpolationController> {
        match self {
            Self::Interpolation(c) => Some(c),
            _ => None,
        }
    }
}

impl From<SimpleController> for Controller {
    fn from(c: SimpleController) -> Self {
        Self::Simple(c)
    }
}

impl From<BlendController> for Controller {
    fn from(c: BlendController) -> Self {
        Self::Blend(c)
    }
}

impl From<MultiBlendController> for Controller {
    fn from(c: MultiBlendController) -> Self {
        Self::MultiBlend(c)
    }
}

impl From<InterpolationController> for Controller {
    fn from(c: InterpolationController) -> Self {
        Self::Interpolation(c)
    }
}
