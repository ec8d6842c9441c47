//! Tick-based animation time
//!
//! Animation clocks count 100ns ticks, so a second is ten million ticks.
//! Keyframes are sampled at a fixed 30Hz when exported.

/// Number of ticks in one second (1 tick = 100ns)
pub const TICKS_PER_SECOND: i64 = 10_000_000;

/// Fixed rate at which keyframe tracks are sampled (samples per second)
pub const KEYFRAME_RATE: i64 = 30;

/// Convert seconds to ticks, truncating toward zero.
pub fn seconds_to_ticks(seconds: f64) -> i64 {
    (seconds * TICKS_PER_SECOND as f64) as i64
}

/// Convert ticks to seconds
pub fn ticks_to_seconds(ticks: i64) -> f64 {
    ticks as f64 / TICKS_PER_SECOND as f64
}

/// The host's clock for one frame.
///
/// Supplied by the game loop every frame; the animation runtime never reads
/// wall-clock time on its own.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameTime {
    /// Time since last frame in seconds (0 while paused)
    pub delta_seconds: f32,
    /// Total elapsed game time in seconds
    pub total_seconds: f64,
    /// Current frame rate, used when the frame delta is 0
    pub frame_rate: f32,
}

impl FrameTime {
    pub fn new(delta_seconds: f32, total_seconds: f64) -> Self {
        Self {
            delta_seconds,
            total_seconds,
            frame_rate: 60.0,
        }
    }

    pub fn with_frame_rate(mut self, frame_rate: f32) -> Self {
        self.frame_rate = frame_rate;
        self
    }

    /// Frame delta converted to ticks
    pub fn delta_ticks(&self) -> i64 {
        seconds_to_ticks(self.delta_seconds as f64)
    }
}

impl Default for FrameTime {
    fn default() -> Self {
        Self::new(0.0, 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_second_is_ten_million_ticks() {
        assert_eq!(seconds_to_ticks(1.0), TICKS_PER_SECOND);
        assert!((ticks_to_seconds(TICKS_PER_SECOND / 2) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn conversion_truncates() {
        // 1.5 ticks worth of seconds
        assert_eq!(seconds_to_ticks(1.5e-7), 1);
        assert_eq!(seconds_to_ticks(-1.5e-7), -1);
    }

    #[test]
    fn frame_delta_ticks() {
        let frame = FrameTime::new(0.25, 10.0);
        assert_eq!(frame.delta_ticks(), 2_500_000);
        assert_eq!(frame.frame_rate, 60.0);
        assert_eq!(frame.with_frame_rate(30.0).frame_rate, 30.0);
    }
}
