//! Playback clock shared by the leaf controllers

use rand::Rng;

/// Current position within one animation plus its loop policy.
///
/// Ticks stay in `[0, duration]` after every operation. Looping wraps with
/// a euclidean modulo; clamp mode halts at either bound.
#[derive(Debug, Clone, PartialEq)]
pub struct Playback {
    ticks: i64,
    duration: i64,
    /// Playback speed multiplier (1.0 = normal, negative = reverse)
    pub speed: f32,
    /// Whether playback wraps at the ends
    pub looping: bool,
    /// Wrap exactly once more, then stop looping
    pub one_more_loop: bool,
}

impl Playback {
    pub fn new(duration: i64) -> Self {
        Self {
            ticks: 0,
            duration: duration.max(0),
            speed: 1.0,
            looping: true,
            one_more_loop: false,
        }
    }

    pub fn ticks(&self) -> i64 {
        self.ticks
    }

    pub fn duration(&self) -> i64 {
        self.duration
    }

    /// Advance by `delta_ticks` scaled by speed, then apply the loop policy.
    pub fn advance(&mut self, delta_ticks: i64) {
        let step = if self.speed == 1.0 {
            delta_ticks
        } else {
            (delta_ticks as f64 * self.speed as f64) as i64
        };
        self.ticks = self.ticks.saturating_add(step);

        if self.duration <= 0 {
            self.ticks = 0;
            return;
        }

        let outside = self.ticks >= self.duration || self.ticks < 0;
        if (self.looping || self.one_more_loop) && outside {
            self.ticks = self.ticks.rem_euclid(self.duration);
            if self.one_more_loop {
                self.one_more_loop = false;
                self.looping = false;
            }
        } else {
            self.ticks = self.ticks.clamp(0, self.duration);
        }
    }

    /// Exactly at the last tick. In clamp mode this is where a finished
    /// one-shot parks.
    pub fn at_end(&self) -> bool {
        self.ticks == self.duration
    }

    pub fn set_to_begin(&mut self) {
        self.ticks = 0;
    }

    pub fn set_to_end(&mut self) {
        self.ticks = self.duration;
    }

    /// Uniform random tick in `[0, duration)`
    pub fn set_to_random<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.ticks = if self.duration > 0 {
            rng.random_range(0..self.duration)
        } else {
            0
        };
    }

    /// Snap down to a multiple of `granularity` ticks
    pub fn align(&mut self, granularity: i64) {
        if granularity > 0 {
            self.ticks -= self.ticks.rem_euclid(granularity);
        }
    }

    /// Jump to `ticks`, clamped into the animation
    pub fn seek(&mut self, ticks: i64) {
        self.ticks = ticks.clamp(0, self.duration);
    }
}
