//! A single dot.
//!
//! Base position, size and opacity are tween [`Track`]s; the idle noise
//! offset is kept separately and only added when rendering.

use glam::Vec3;

use crate::tween::{Timing, Track};

/// Brightness multiplier for dots in the odd shading bucket.
pub const ODD_LAYER_LIGHTEN: f32 = 1.5;

#[derive(Debug, Clone)]
pub struct Dot {
    /// Tweened base position.
    pub position: Track<Vec3>,
    /// Idle drift added on top of `position` at render time.
    pub offset: Vec3,
    /// Formation position (tx, ty, tz).
    pub home: Vec3,
    pub size: Track<f32>,
    pub target_size: f32,
    pub opacity: Track<f32>,
    /// Source pixel color.
    pub color: [u8; 3],
    /// Index into the session catalog.
    pub usecase: usize,
    /// Per-axis noise seeds.
    pub noise_seed: Vec3,
    /// Depth layer this dot belongs to (0 = front).
    pub layer: u32,
    /// Shading bucket, spawn index parity.
    pub parity: u32,
}

impl Dot {
    /// Base position as of the last advance, without drift.
    #[inline]
    pub fn base_position(&self) -> Vec3 {
        self.position.value()
    }

    /// Position to draw at: base plus idle drift.
    #[inline]
    pub fn render_position(&self) -> Vec3 {
        self.position.value() + self.offset
    }

    pub fn advance(&mut self, now: f32) {
        self.position.advance(now);
        self.size.advance(now);
        self.opacity.advance(now);
    }

    /// No property is mid-tween.
    pub fn is_idle(&self) -> bool {
        !(self.position.is_animating() || self.size.is_animating() || self.opacity.is_animating())
    }

    /// Tween position, size and opacity together.
    pub fn animate(&mut self, now: f32, position: Vec3, size: f32, opacity: f32, timing: Timing) {
        self.position.animate_to(now, position, timing);
        self.size.animate_to(now, size, timing);
        self.opacity.animate_to(now, opacity, timing);
    }

    /// RGBA in `[0, 1]`, lightened for the odd bucket, alpha = opacity.
    pub fn shaded_color(&self) -> [f32; 4] {
        let factor = if self.parity % 2 == 0 { 1.0 } else { ODD_LAYER_LIGHTEN };
        let channel = |c: u8| (c as f32 * factor).clamp(0.0, 255.0) / 255.0;
        [
            channel(self.color[0]),
            channel(self.color[1]),
            channel(self.color[2]),
            self.opacity.value().clamp(0.0, 1.0),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tween::Easing;

    fn dot(parity: u32) -> Dot {
        Dot {
            position: Track::new(Vec3::new(100.0, 100.0, 0.0)),
            offset: Vec3::ZERO,
            home: Vec3::ZERO,
            size: Track::new(0.0),
            target_size: 6.0,
            opacity: Track::new(0.0),
            color: [200, 100, 10],
            usecase: 0,
            noise_seed: Vec3::ZERO,
            layer: 0,
            parity,
        }
    }

    #[test]
    fn test_shading_buckets() {
        let mut even = dot(0);
        even.opacity.set(0.5);
        let c = even.shaded_color();
        assert!((c[0] - 200.0 / 255.0).abs() < 1e-6);
        assert_eq!(c[3], 0.5);

        let odd = dot(1);
        let c = odd.shaded_color();
        assert_eq!(c[0], 1.0, "lightened channel clamps at 255");
        assert!((c[1] - 150.0 / 255.0).abs() < 1e-6);
        assert!((c[2] - 15.0 / 255.0).abs() < 1e-6);
    }

    #[test]
    fn test_render_position_adds_offset() {
        let mut d = dot(0);
        d.offset = Vec3::new(1.0, -2.0, 0.5);
        assert_eq!(d.render_position(), Vec3::new(101.0, 98.0, 0.5));
        assert_eq!(d.base_position(), Vec3::new(100.0, 100.0, 0.0));
    }

    #[test]
    fn test_animate_all_tracks() {
        let mut d = dot(0);
        d.animate(0.0, Vec3::ZERO, 6.0, 1.0, Timing::new(1.0, Easing::Power3Out));
        assert!(!d.is_idle());
        d.advance(1.0);
        assert!(d.is_idle());
        assert_eq!(d.base_position(), Vec3::ZERO);
        assert_eq!(d.size.value(), 6.0);
        assert_eq!(d.opacity.value(), 1.0);
    }
}
