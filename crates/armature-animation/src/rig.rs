//! Everything one model shares between its animated instances

use crate::catalog::{Animation, AnimationCatalog};
use crate::skeleton::BoneHierarchy;
use crate::skin::SkinBindData;
use crate::source::RigSource;
use armature_core::Result;
use log::debug;
use std::sync::Arc;

/// Bone hierarchy, bound animation catalog and skin bind data of one model.
///
/// Immutable after construction; instances hold it behind an `Arc`.
#[derive(Debug, Clone)]
pub struct Rig {
    hierarchy: BoneHierarchy,
    catalog: AnimationCatalog,
    skin: SkinBindData,
}

impl Rig {
    /// Build the hierarchy, bind every animation against it and validate the
    /// skin data. Any content error fails the whole rig.
    pub fn from_source(source: RigSource) -> Result<Self> {
        let hierarchy = BoneHierarchy::from_source(&source.bones)?;
        let catalog = AnimationCatalog::bind(&source.animations, &hierarchy)?;
        let skin = SkinBindData::from_source(&source.skins, &hierarchy)?;

        debug!(
            "Bound rig: {} bones, {} animations, {} palette entries",
            hierarchy.len(),
            catalog.len(),
            skin.len()
        );

        Ok(Self {
            hierarchy,
            catalog,
            skin,
        })
    }

    pub fn hierarchy(&self) -> &BoneHierarchy {
        &self.hierarchy
    }

    pub fn catalog(&self) -> &AnimationCatalog {
        &self.catalog
    }

    pub fn skin(&self) -> &SkinBindData {
        &self.skin
    }

    pub fn bone_index(&self, name: &str) -> Option<usize> {
        self.hierarchy.index_of(name)
    }

    pub fn find_animation(&self, name: &str) -> Option<&Arc<Animation>> {
        self.catalog.get(name)
    }

    pub fn has_animation(&self, name: &str) -> bool {
        self.catalog.contains(name)
    }

    pub fn num_bones(&self) -> usize {
        self.hierarchy.len()
    }

    pub fn first_animation_name(&self) -> Option<&str> {
        self.catalog.first().map(|a| a.name())
    }

    /// True when the model carries no animations
    pub fn is_empty(&self) -> bool {
        self.catalog.is_empty()
    }
}
