//! Armature Core - Foundational types for the Armature animation runtime
//!
//! This crate provides the core types that the animation crates depend on:
//! - `ActorId` - Stable per-actor identifiers
//! - `FrameTime` and tick conversions - the host's per-frame clock
//! - Error types and Result alias

mod error;
mod id;
mod time;

pub use error::{ArmatureError, Result};
pub use id::ActorId;
pub use time::{
    seconds_to_ticks, ticks_to_seconds, FrameTime, KEYFRAME_RATE, TICKS_PER_SECOND,
};
