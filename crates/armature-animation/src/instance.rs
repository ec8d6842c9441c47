//! Live per-actor bone transforms and skinning palette

use crate::catalog::Animation;
use crate::controller::{Controller, SimpleController};
use crate::pose::{Pose, PosePool, SampleContext};
use crate::rig::Rig;
use glam::Mat4;
use log::trace;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

static NEXT_INSTANCE_ID: AtomicU64 = AtomicU64::new(1);

/// Unique identifier of an [`AnimationInstance`]
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InstanceId(u64);

impl InstanceId {
    fn next() -> Self {
        Self(NEXT_INSTANCE_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "InstanceId({})", self.0)
    }
}

/// One actor's animated skeleton.
///
/// Holds the shared [`Rig`], the active controller and the buffers derived
/// from it. Every accessor resamples lazily: transforms are recomputed only
/// when the controller's tick count differs from the last sampled one.
#[derive(Debug)]
pub struct AnimationInstance {
    id: InstanceId,
    rig: Arc<Rig>,
    controller: Option<Controller>,
    local_to_parent: Pose,
    local_to_world: Vec<Mat4>,
    palette: Vec<Mat4>,
    pool: PosePool,
    last_ticks: Option<i64>,
}

impl AnimationInstance {
    /// An instance in bind pose, or `None` if the model is not animated.
    pub fn try_make(rig: Arc<Rig>) -> Option<Self> {
        if rig.num_bones() == 0 || rig.is_empty() {
            return None;
        }
        let bones = rig.num_bones();
        let mut instance = Self {
            id: InstanceId::next(),
            local_to_parent: Pose::new(bones),
            local_to_world: vec![Mat4::IDENTITY; bones],
            palette: vec![Mat4::IDENTITY; rig.skin().len()],
            pool: PosePool::new(bones),
            controller: None,
            last_ticks: None,
            rig,
        };
        instance.compute_bind_pose();
        Some(instance)
    }

    pub fn id(&self) -> InstanceId {
        self.id
    }

    pub fn rig(&self) -> &Arc<Rig> {
        &self.rig
    }

    /// Install the active controller, returning the previous one.
    pub fn set_controller(&mut self, controller: impl Into<Controller>) -> Option<Controller> {
        self.last_ticks = None;
        self.controller.replace(controller.into())
    }

    pub fn take_controller(&mut self) -> Option<Controller> {
        self.last_ticks = None;
        self.compute_bind_pose();
        self.controller.take()
    }

    pub fn controller(&self) -> Option<&Controller> {
        self.controller.as_ref()
    }

    /// Mutable access to the active controller.
    ///
    /// Weight edits made here show up once the controller's ticks move or
    /// after [`invalidate`](Self::invalidate).
    pub fn controller_mut(&mut self) -> Option<&mut Controller> {
        self.controller.as_mut()
    }

    /// Force the next access to resample.
    pub fn invalidate(&mut self) {
        self.last_ticks = None;
    }

    /// Recompute transforms if the controller moved since the last sample.
    pub fn update(&mut self) {
        let Some(controller) = &self.controller else {
            return;
        };
        let ticks = controller.current_ticks();
        if self.last_ticks == Some(ticks) {
            return;
        }

        let hierarchy = self.rig.hierarchy();
        self.local_to_parent.seed_rest(hierarchy);
        let mut ctx = SampleContext::new(hierarchy, &mut self.pool);
        controller.get_transforms(&mut ctx, &mut self.local_to_parent);

        hierarchy.propagate(self.local_to_parent.transforms(), &mut self.local_to_world);
        self.rig
            .skin()
            .compute_palette(&self.local_to_world, &mut self.palette);
        self.last_ticks = Some(ticks);

        trace!(
            "{:?} resampled '{}' at tick {}",
            self.id,
            controller.name(),
            ticks
        );
    }

    /// Skinning matrices indexed by palette slot
    pub fn palette(&mut self) -> &[Mat4] {
        self.update();
        &self.palette
    }

    /// Bone-to-world transform of one bone
    pub fn world_transform(&mut self, bone: usize) -> Option<Mat4> {
        self.update();
        self.local_to_world.get(bone).copied()
    }

    pub fn world_transform_by_name(&mut self, name: &str) -> Option<Mat4> {
        let bone = self.rig.bone_index(name)?;
        self.world_transform(bone)
    }

    pub fn world_transforms(&mut self) -> &[Mat4] {
        self.update();
        &self.local_to_world
    }

    /// Bone-to-parent transforms from the last sample
    pub fn local_transforms(&mut self) -> &[Mat4] {
        self.update();
        self.local_to_parent.transforms()
    }

    /// A new controller for `name`, or for `backup` when `name` is missing.
    pub fn try_make_controller(&self, name: &str, backup: Option<&str>) -> Option<SimpleController> {
        SimpleController::try_make(self.rig.catalog(), name, backup)
    }

    pub fn bone_index(&self, name: &str) -> Option<usize> {
        self.rig.bone_index(name)
    }

    pub fn find_animation(&self, name: &str) -> Option<&Arc<Animation>> {
        self.rig.find_animation(name)
    }

    pub fn has_animation(&self, name: &str) -> bool {
        self.rig.has_animation(name)
    }

    pub fn num_bones(&self) -> usize {
        self.rig.num_bones()
    }

    pub fn first_animation_name(&self) -> Option<&str> {
        self.rig.first_animation_name()
    }

    pub fn is_empty(&self) -> bool {
        self.rig.is_empty()
    }

    fn compute_bind_pose(&mut self) {
        let hierarchy = self.rig.hierarchy();
        self.local_to_parent.seed_rest(hierarchy);
        hierarchy.propagate(self.local_to_parent.transforms(), &mut self.local_to_world);
        self.rig
            .skin()
            .compute_palette(&self.local_to_world, &mut self.palette);
    }
}
