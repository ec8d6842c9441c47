//! TOML-based rig and configuration loading

use crate::config::AnimationSetConfig;
use crate::source::RigSource;
use armature_core::{ArmatureError, Result};
use log::debug;
use std::path::Path;

/// Load a rig description from a `.rig.toml` file.
///
/// The file mirrors [`RigSource`]; matrices are column-major:
/// ```toml
/// [[bones]]
/// name = "root"
///
/// [[bones]]
/// name = "arm"
/// parent = 0
/// local_bind = [[1.0, 0.0, 0.0, 0.0], [0.0, 1.0, 0.0, 0.0],
///               [0.0, 0.0, 1.0, 0.0], [1.0, 0.0, 0.0, 1.0]]
///
/// [[animations]]
/// name = "idle"
/// duration_ticks = 10000000
///
/// [[animations.tracks]]
/// bone_name = "arm"
/// ticks_duration = 10000000
/// samples = [...]
/// ```
///
/// Only parsing happens here; binding and validation run in
/// [`crate::Rig::from_source`].
pub fn load_rig_from_file(path: &Path) -> Result<RigSource> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        ArmatureError::AnimationError(format!("Failed to read {}: {}", path.display(), e))
    })?;
    load_rig_from_str(&content).map_err(|e| match e {
        ArmatureError::TomlParseError(msg) => {
            ArmatureError::TomlParseError(format!("{}: {}", path.display(), msg))
        }
        other => other,
    })
}

/// Parse a rig description from a TOML string.
pub fn load_rig_from_str(content: &str) -> Result<RigSource> {
    let source: RigSource = toml::from_str(content)?;
    debug!(
        "Parsed rig source: {} bones, {} animations, {} skin lists",
        source.bones.len(),
        source.animations.len(),
        source.skins.len()
    );
    Ok(source)
}

/// Load and validate an animation set config from a TOML file.
pub fn load_config_from_file(path: &Path) -> Result<AnimationSetConfig> {
    let content = std::fs::read_to_string(path)?;
    load_config_from_str(&content)
}

/// Parse and validate an animation set config from a TOML string.
pub fn load_config_from_str(content: &str) -> Result<AnimationSetConfig> {
    let config: AnimationSetConfig = toml::from_str(content)?;
    config.validate()?;
    debug!("Loaded animation set config: {:?}", config);
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rig::Rig;

    const RIG: &str = r#"
skins = [[{ bone_index = 1, bone_name = "arm", palette_slot = 0 }]]

[[bones]]
name = "root"

[[bones]]
name = "arm"
parent = 0
local_bind = [[1.0, 0.0, 0.0, 0.0], [0.0, 1.0, 0.0, 0.0], [0.0, 0.0, 1.0, 0.0], [1.0, 0.0, 0.0, 1.0]]

[[animations]]
name = "idle"
duration_ticks = 333333

[[animations.tracks]]
bone_name = "arm"
ticks_duration = 333333
samples = [
    [[1.0, 0.0, 0.0, 0.0], [0.0, 1.0, 0.0, 0.0], [0.0, 0.0, 1.0, 0.0], [0.0, 0.0, 0.0, 1.0]],
    [[1.0, 0.0, 0.0, 0.0], [0.0, 1.0, 0.0, 0.0], [0.0, 0.0, 1.0, 0.0], [0.0, 2.0, 0.0, 1.0]],
]
"#;

    #[test]
    fn parse_and_bind_rig() {
        let source = load_rig_from_str(RIG).unwrap();
        assert_eq!(source.bones.len(), 2);
        assert_eq!(source.bones[1].parent, Some(0));
        assert_eq!(source.animations[0].tracks[0].sample_count(), 2);

        let rig = Rig::from_source(source).unwrap();
        assert_eq!(rig.skin().len(), 1);
        assert_eq!(rig.bone_index("arm"), Some(1));
        let arm = rig.hierarchy().bone(1).unwrap().default_local();
        assert_eq!(arm.w_axis.x, 1.0);
    }

    #[test]
    fn reject_malformed_toml() {
        let result = load_rig_from_str("[[bones]]\nname = 3");
        assert!(matches!(result, Err(ArmatureError::TomlParseError(_))));
    }

    #[test]
    fn config_is_validated_on_load() {
        assert!(load_config_from_str("").is_ok());
        assert!(load_config_from_str("blend_speed = -2.0").is_err());
        let config = load_config_from_str("randomize_loop_start = false").unwrap();
        assert!(!config.randomize_loop_start);
    }

    #[test]
    fn missing_file_is_an_error() {
        let path = Path::new("does/not/exist.rig.toml");
        assert!(load_rig_from_file(path).is_err());
        assert!(matches!(
            load_config_from_file(path),
            Err(ArmatureError::IoError(_))
        ));
    }
}
