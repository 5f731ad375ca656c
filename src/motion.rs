//! Idle drift.
//!
//! Every other frame each dot's offset is resampled from 2D simplex noise,
//! one lookup per axis at `(seed_axis, t)`. The time parameter advances
//! slowly so the drift is smooth; per-dot seeds keep dots independent.

use glam::{Vec2, Vec3};

use crate::field::DotField;
use crate::noise::noise2;

/// Peak drift distance per axis, in world units.
pub const DRIFT_AMPLITUDE: f32 = 2.5;
/// Noise time per millisecond of elapsed time.
pub const NOISE_TIME_PER_MS: f32 = 0.0001;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionDriver {
    pub amplitude: f32,
    pub time_per_ms: f32,
}

impl Default for MotionDriver {
    fn default() -> Self {
        Self {
            amplitude: DRIFT_AMPLITUDE,
            time_per_ms: NOISE_TIME_PER_MS,
        }
    }
}

impl MotionDriver {
    /// Noise time for an elapsed duration in seconds.
    #[inline]
    pub fn noise_time(&self, elapsed_secs: f32) -> f32 {
        elapsed_secs * 1000.0 * self.time_per_ms
    }

    /// Drift for one dot at noise time `t`.
    pub fn offset(&self, seed: Vec3, t: f32) -> Vec3 {
        Vec3::new(
            noise2(Vec2::new(seed.x, t)),
            noise2(Vec2::new(seed.y, t)),
            noise2(Vec2::new(seed.z, t)),
        ) * self.amplitude
    }

    /// Refresh offsets on even frames. Returns whether anything was
    /// recomputed; odd frames keep the previous offsets.
    pub fn drive(&self, field: &mut DotField, frame: u64, elapsed_secs: f32) -> bool {
        if frame % 2 != 0 {
            return false;
        }
        let t = self.noise_time(elapsed_secs);
        for dot in field.dots_mut() {
            dot.offset = self.offset(dot.noise_seed, t);
        }
        true
    }
}
