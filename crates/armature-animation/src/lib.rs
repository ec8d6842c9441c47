//! Skeletal animation runtime for Armature
//!
//! Three layers:
//! - **Content**: bone hierarchies, keyframed animations and skin bind data,
//!   bound once into a shared [`Rig`]
//! - **Playback**: a tree of [`Controller`]s sampled into an
//!   [`AnimationInstance`], producing world transforms and a skinning palette
//! - **Orchestration**: an [`AnimationSet`] per actor that blends movement
//!   loops and arbitrates one-shot animations every frame

pub mod blend;
pub mod catalog;
pub mod config;
pub mod controller;
pub mod instance;
pub mod loader;
pub mod pose;
pub mod rig;
pub mod set;
pub mod skeleton;
pub mod skin;
pub mod source;
pub mod track;
pub mod weights;

#[cfg(test)]
mod testing;

pub use blend::InterpolationMode;
pub use catalog::{Animation, AnimationCatalog};
pub use config::AnimationSetConfig;
pub use controller::{
    BlendController, Controller, InterpolationController, MultiBlendController, Playback,
    SimpleController,
};
pub use instance::{AnimationInstance, InstanceId};
pub use pose::{Pose, PosePool, SampleContext};
pub use rig::Rig;
pub use set::{ActionLoop, AnimationCue, AnimationDrive, AnimationSet, LoopSlot, OneShotKind};
pub use skeleton::{Bone, BoneHierarchy};
pub use skin::{SkinBindData, SkinBindDatum};
pub use weights::{ease_weight, standard_looped_weights, DesiredMovement, LoopedWeights, MovementState};

use armature_core::{ActorId, ArmatureError, FrameTime, Result};
use glam::Mat4;
use log::{debug, info};
use std::collections::HashMap;
use std::sync::Arc;

/// Top-level registry of shared rigs and per-actor animation sets.
///
/// Rigs are registered once by name and shared; every spawned actor gets
/// its own [`AnimationSet`]. The host drives everything through
/// [`update`](Self::update) once per frame.
#[derive(Debug, Default)]
pub struct AnimationSystem {
    rigs: HashMap<String, Arc<Rig>>,
    sets: HashMap<ActorId, AnimationSet>,
}

impl AnimationSystem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a rig, replacing any rig of the same name.
    pub fn add_rig(&mut self, name: impl Into<String>, rig: Rig) -> Arc<Rig> {
        let name = name.into();
        let rig = Arc::new(rig);
        debug!(
            "Registered rig '{}' ({} bones, {} animations)",
            name,
            rig.num_bones(),
            rig.catalog().len()
        );
        self.rigs.insert(name, Arc::clone(&rig));
        rig
    }

    pub fn rig(&self, name: &str) -> Option<&Arc<Rig>> {
        self.rigs.get(name)
    }

    /// Give `actor` an animation set built from a registered rig.
    ///
    /// Returns whether the set is animated; a model without an idle
    /// animation still gets an inert set. Respawning an actor replaces its
    /// set.
    pub fn spawn(
        &mut self,
        actor: ActorId,
        rig_name: &str,
        config: AnimationSetConfig,
    ) -> Result<bool> {
        config.validate()?;
        let rig = self
            .rigs
            .get(rig_name)
            .ok_or_else(|| ArmatureError::AnimationError(format!("Unknown rig '{}'", rig_name)))?;

        let set = AnimationSet::new(Arc::clone(rig), config);
        let active = set.is_active();
        if self.sets.insert(actor, set).is_some() {
            debug!("Replaced animation set of {:?}", actor);
        }
        debug!(
            "Spawned {:?} with rig '{}' ({})",
            actor,
            rig_name,
            if active { "animated" } else { "inert" }
        );
        Ok(active)
    }

    /// Remove an actor's set. Returns false if it had none.
    pub fn despawn(&mut self, actor: ActorId) -> bool {
        self.sets.remove(&actor).is_some()
    }

    pub fn set(&self, actor: ActorId) -> Option<&AnimationSet> {
        self.sets.get(&actor)
    }

    pub fn set_mut(&mut self, actor: ActorId) -> Option<&mut AnimationSet> {
        self.sets.get_mut(&actor)
    }

    /// Advance every set by one frame. Actors without a drive entry stand
    /// idle.
    pub fn update(&mut self, frame: &FrameTime, drives: &HashMap<ActorId, AnimationDrive>) {
        let idle = AnimationDrive::default();
        for (actor, set) in &mut self.sets {
            set.update(frame, drives.get(actor).unwrap_or(&idle));
        }
    }

    /// Current skinning palette of an actor
    pub fn palette(&mut self, actor: ActorId) -> Option<&[Mat4]> {
        self.sets.get_mut(&actor).map(AnimationSet::palette)
    }

    /// Drop every actor's set for a scene transition; rigs stay registered.
    pub fn clear(&mut self) {
        info!("Clearing {} animation sets", self.sets.len());
        self.sets.clear();
    }

    pub fn rig_count(&self) -> usize {
        self.rigs.len()
    }

    pub fn actor_count(&self) -> usize {
        self.sets.len()
    }

    /// Number of sets that actually animate
    pub fn active_count(&self) -> usize {
        self.sets.values().filter(|s| s.is_active()).count()
    }
}
