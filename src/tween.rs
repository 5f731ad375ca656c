//! Interpolation utilities.
//!
//! A [`Tween`] maps elapsed time to a value between a start and an end,
//! shaped by an [`Easing`] curve and held at its start for an optional delay.
//! A [`Track`] is one animatable property: it owns the current value and at
//! most one active tween. Starting a new tween on a track replaces the old one
//! and begins from wherever the property currently is.
//!
//! Tracks are advanced cooperatively: the frame loop calls
//! [`Track::advance`] with the current time, nothing runs in the background.
//!
//! ```ignore
//! let mut opacity = Track::new(0.0_f32);
//! opacity.animate_to(now, 1.0, Timing::new(1.2, Easing::Power3Out));
//! // each frame
//! opacity.advance(now);
//! ```

use glam::Vec3;

/// Easing curves, named after the animation presets they reproduce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Easing {
    #[default]
    Linear,
    /// Quartic deceleration.
    Power3Out,
    /// Cubic acceleration then deceleration.
    Power2InOut,
    /// Exponential deceleration.
    ExpoOut,
}

impl Easing {
    /// Apply the curve to a progress fraction. Input is clamped to `[0, 1]`.
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::Power3Out => 1.0 - (1.0 - t).powi(4),
            Easing::Power2InOut => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
                }
            }
            Easing::ExpoOut => {
                if t >= 1.0 {
                    1.0
                } else {
                    1.0 - 2.0_f32.powf(-10.0 * t)
                }
            }
        }
    }
}

/// Values that can be linearly interpolated.
pub trait Lerp: Copy {
    fn lerp_to(self, to: Self, t: f32) -> Self;
}

impl Lerp for f32 {
    #[inline]
    fn lerp_to(self, to: Self, t: f32) -> Self {
        self + (to - self) * t
    }
}

impl Lerp for Vec3 {
    #[inline]
    fn lerp_to(self, to: Self, t: f32) -> Self {
        self.lerp(to, t)
    }
}

/// Duration, delay and curve of a tween, all times in seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Timing {
    pub duration: f32,
    pub delay: f32,
    pub easing: Easing,
}

impl Timing {
    pub const fn new(duration: f32, easing: Easing) -> Self {
        Self {
            duration,
            delay: 0.0,
            easing,
        }
    }

    pub const fn with_delay(mut self, delay: f32) -> Self {
        self.delay = delay;
        self
    }
}

/// A single interpolation from `from` to `to` starting at `start`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tween<T: Lerp> {
    pub from: T,
    pub to: T,
    pub start: f32,
    pub timing: Timing,
}

impl<T: Lerp> Tween<T> {
    pub fn new(from: T, to: T, start: f32, timing: Timing) -> Self {
        Self {
            from,
            to,
            start,
            timing,
        }
    }

    /// Eased progress at time `now`, in `[0, 1]`.
    pub fn progress(&self, now: f32) -> f32 {
        let local = now - self.start - self.timing.delay;
        if local <= 0.0 {
            return 0.0;
        }
        if self.timing.duration <= 0.0 {
            return 1.0;
        }
        self.timing.easing.apply(local / self.timing.duration)
    }

    pub fn value_at(&self, now: f32) -> T {
        self.from.lerp_to(self.to, self.progress(now))
    }

    /// Time at which the tween reaches `to`.
    #[inline]
    pub fn end_time(&self) -> f32 {
        self.start + self.timing.delay + self.timing.duration.max(0.0)
    }

    #[inline]
    pub fn is_finished(&self, now: f32) -> bool {
        now >= self.end_time()
    }
}

/// One animatable property.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Track<T: Lerp> {
    value: T,
    tween: Option<Tween<T>>,
}

impl<T: Lerp> Track<T> {
    pub fn new(value: T) -> Self {
        Self { value, tween: None }
    }

    /// Current value as of the last [`advance`](Self::advance).
    #[inline]
    pub fn value(&self) -> T {
        self.value
    }

    #[inline]
    pub fn is_animating(&self) -> bool {
        self.tween.is_some()
    }

    /// Jump to `value`, dropping any running tween.
    pub fn set(&mut self, value: T) {
        self.value = value;
        self.tween = None;
    }

    /// Start a tween from the current value, replacing any running one.
    pub fn animate_to(&mut self, now: f32, to: T, timing: Timing) {
        self.tween = Some(Tween::new(self.value, to, now, timing));
    }

    /// Move the value along the running tween. Finished tweens snap to their
    /// end value and are dropped.
    pub fn advance(&mut self, now: f32) {
        if let Some(tween) = self.tween {
            if tween.is_finished(now) {
                self.value = tween.to;
                self.tween = None;
            } else {
                self.value = tween.value_at(now);
            }
        }
    }
}
