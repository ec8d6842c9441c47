//! Error types for Armature

use thiserror::Error;

/// The main error type for Armature operations
///
/// Content and binding problems surface here at load time. The per-frame
/// animation path never produces one.
#[derive(Debug, Error)]
pub enum ArmatureError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParseError(String),

    #[error("Empty bone hierarchy")]
    EmptyHierarchy,

    #[error("Bone '{bone}' at index {index} has parent {parent}, which does not precede it")]
    NonTopologicalParent {
        bone: String,
        index: usize,
        parent: usize,
    },

    #[error("Duplicate bone name: {0}")]
    DuplicateBoneName(String),

    #[error("Animation '{animation}' references unknown bone '{bone}'")]
    UnknownBone { animation: String, bone: String },

    #[error("Animation '{animation}' track '{bone}' has duration {track}, expected {expected}")]
    InconsistentDuration {
        animation: String,
        bone: String,
        track: i64,
        expected: i64,
    },

    #[error("Animation '{animation}' track '{bone}' has no keyframes")]
    EmptyTrack { animation: String, bone: String },

    #[error("Duplicate animation name: {0}")]
    DuplicateAnimationName(String),

    #[error("Skin data error: {0}")]
    SkinDataError(String),

    #[error("Value out of range: {field} must be between {min} and {max}, got {value}")]
    ValueOutOfRange {
        field: String,
        min: f64,
        max: f64,
        value: f64,
    },

    #[error("Animation error: {0}")]
    AnimationError(String),
}

/// Result type alias for Armature operations
pub type Result<T> = std::result::Result<T, ArmatureError>;

impl From<toml::de::Error> for ArmatureError {
    fn from(err: toml::de::Error) -> Self {
        ArmatureError::TomlParseError(err.to_string())
    }
}
