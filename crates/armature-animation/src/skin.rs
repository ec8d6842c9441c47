//! Skinning bind data: which bone feeds which palette slot

use crate::skeleton::BoneHierarchy;
use crate::source::{to_mat4, SkinDatumSource};
use armature_core::{ArmatureError, Result};
use glam::Mat4;

/// One palette entry's binding
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SkinBindDatum {
    pub bone_index: usize,
    pub palette_slot: usize,
    /// Model-to-bone transform at bind time
    pub inverse_bind: Mat4,
}

/// The skin bind list of a model, palette slots dense in `0..len()`
#[derive(Debug, Clone, Default)]
pub struct SkinBindData {
    data: Vec<SkinBindDatum>,
}

impl SkinBindData {
    /// Validate the per-mesh bind lists against `hierarchy`.
    ///
    /// Only the first mesh's list drives the palette; any later list must be
    /// empty.
    pub fn from_source(meshes: &[Vec<SkinDatumSource>], hierarchy: &BoneHierarchy) -> Result<Self> {
        let Some((first, rest)) = meshes.split_first() else {
            return Ok(Self::default());
        };
        if let Some(extra) = rest.iter().position(|m| !m.is_empty()) {
            return Err(ArmatureError::SkinDataError(format!(
                "mesh {} has skin data; only the first mesh may",
                extra + 1
            )));
        }

        let mut slot_seen = vec![false; first.len()];
        let mut data = Vec::with_capacity(first.len());
        for src in first {
            let bone = hierarchy.bone(src.bone_index).ok_or_else(|| {
                ArmatureError::SkinDataError(format!(
                    "bone index {} out of range ({} bones)",
                    src.bone_index,
                    hierarchy.len()
                ))
            })?;
            if let Some(name) = &src.bone_name {
                if name != bone.name() {
                    return Err(ArmatureError::SkinDataError(format!(
                        "bone index {} is '{}', skin data expects '{}'",
                        src.bone_index,
                        bone.name(),
                        name
                    )));
                }
            }
            match slot_seen.get_mut(src.palette_slot) {
                Some(seen) if !*seen => *seen = true,
                _ => {
                    return Err(ArmatureError::SkinDataError(format!(
                        "palette slot {} is duplicated or outside 0..{}",
                        src.palette_slot,
                        first.len()
                    )))
                }
            }
            data.push(SkinBindDatum {
                bone_index: src.bone_index,
                palette_slot: src.palette_slot,
                inverse_bind: to_mat4(&src.inverse_bind),
            });
        }

        Ok(Self { data })
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&SkinBindDatum> {
        self.data.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &SkinBindDatum> {
        self.data.iter()
    }

    /// Fill `palette[slot] = world[bone] * inverse_bind` for every datum.
    pub fn compute_palette(&self, world: &[Mat4], palette: &mut [Mat4]) {
        for datum in &self.data {
            palette[datum.palette_slot] = world[datum.bone_index] * datum.inverse_bind;
        }
    }
}
