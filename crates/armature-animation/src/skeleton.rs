//! Bone hierarchy with parent links and rest-pose transforms

use crate::source::{to_mat4, BoneSource};
use armature_core::{ArmatureError, Result};
use glam::Mat4;
use std::collections::HashMap;

/// A single bone: its slot in the hierarchy, name and rest transform.
///
/// Parent and children are indices into the owning [`BoneHierarchy`].
#[derive(Debug, Clone)]
pub struct Bone {
    index: usize,
    name: String,
    default_local: Mat4,
    parent: Option<usize>,
    children: Vec<usize>,
}

impl Bone {
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Bone-to-parent transform at rest
    pub fn default_local(&self) -> Mat4 {
        self.default_local
    }

    pub fn parent(&self) -> Option<usize> {
        self.parent
    }

    pub fn children(&self) -> &[usize] {
        &self.children
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }
}

/// Immutable bone tree shared by every instance of a model.
///
/// Bones are stored in topological order: a bone's parent always has a
/// smaller index, so a single forward pass visits parents before children.
#[derive(Debug, Clone)]
pub struct BoneHierarchy {
    bones: Vec<Bone>,
    by_name: HashMap<String, usize>,
}

impl BoneHierarchy {
    /// Build the hierarchy from the model's flat, parent-indexed bone list.
    pub fn from_source(sources: &[BoneSource]) -> Result<Self> {
        if sources.is_empty() {
            return Err(ArmatureError::EmptyHierarchy);
        }

        let mut bones: Vec<Bone> = Vec::with_capacity(sources.len());
        let mut by_name = HashMap::with_capacity(sources.len());

        for (index, src) in sources.iter().enumerate() {
            if let Some(parent) = src.parent {
                if parent >= index {
                    return Err(ArmatureError::NonTopologicalParent {
                        bone: src.name.clone(),
                        index,
                        parent,
                    });
                }
                bones[parent].children.push(index);
            }
            if by_name.insert(src.name.clone(), index).is_some() {
                return Err(ArmatureError::DuplicateBoneName(src.name.clone()));
            }
            bones.push(Bone {
                index,
                name: src.name.clone(),
                default_local: to_mat4(&src.local_bind),
                parent: src.parent,
                children: Vec::new(),
            });
        }

        Ok(Self { bones, by_name })
    }

    pub fn len(&self) -> usize {
        self.bones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bones.is_empty()
    }

    pub fn bone(&self, index: usize) -> Option<&Bone> {
        self.bones.get(index)
    }

    pub fn get(&self, name: &str) -> Option<&Bone> {
        self.by_name.get(name).map(|&i| &self.bones[i])
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.by_name.get(name).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Bone> {
        self.bones.iter()
    }

    pub fn roots(&self) -> impl Iterator<Item = &Bone> {
        self.bones.iter().filter(|b| b.is_root())
    }

    /// Rest-pose bone-to-parent transforms in bone order
    pub fn default_transforms(&self) -> impl Iterator<Item = Mat4> + '_ {
        self.bones.iter().map(|b| b.default_local)
    }

    /// Concatenate bone-to-parent transforms down the tree into bone-to-world.
    ///
    /// `world[i] = world[parent] * local[i]`, roots take their local transform
    /// as is. Both slices must hold at least `len()` entries.
    pub fn propagate(&self, local: &[Mat4], world: &mut [Mat4]) {
        debug_assert!(local.len() >= self.bones.len());
        debug_assert!(world.len() >= self.bones.len());

        for (i, bone) in self.bones.iter().enumerate() {
            world[i] = match bone.parent {
                Some(parent) => world[parent] * local[i],
                None => local[i],
            };
        }
    }
}
