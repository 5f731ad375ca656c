//! Pointer-following view rig.
//!
//! World space is y-down with the origin at the viewport centre and one
//! world unit per screen pixel at z = 0 and zoom 100 %. The rig tilts the
//! scene toward the pointer, scales it by the zoom setting and looks at it
//! through a 60° perspective camera placed so the z = 0 plane fills the
//! viewport exactly.

use std::f32::consts::FRAC_PI_3;

use glam::{Mat4, Vec2, Vec3, Vec4Swizzles};

/// Maximum tilt in radians when the pointer sits on a viewport edge.
pub const MAX_TILT: f32 = 0.4;
/// Fraction of the remaining distance covered per frame.
pub const TILT_FOLLOW: f32 = 0.1;
/// Vertical field of view.
pub const FOV_Y: f32 = FRAC_PI_3;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewRig {
    /// Current rotation about x (`.x`) and y (`.y`), radians.
    pub rotation: Vec2,
    /// Rotation the rig is easing toward.
    pub target: Vec2,
    /// Scene scale, 1.0 = 100 %.
    pub zoom: f32,
}

impl ViewRig {
    pub fn new(zoom: f32) -> Self {
        Self {
            rotation: Vec2::ZERO,
            target: Vec2::ZERO,
            zoom,
        }
    }

    /// Aim the tilt at the pointer. Off-centre by a full half-viewport
    /// gives [`MAX_TILT`].
    pub fn follow_pointer(&mut self, pointer: Vec2, viewport: Vec2) {
        let center = viewport * 0.5;
        if center.x <= 0.0 || center.y <= 0.0 {
            return;
        }
        let off = (pointer - center) / center;
        self.target = Vec2::new(off.y, off.x) * MAX_TILT;
    }

    /// Ease the rotation one frame toward its target.
    pub fn step(&mut self) {
        self.rotation = self.rotation.lerp(self.target, TILT_FOLLOW);
    }

    /// Distance from the eye to the z = 0 plane.
    #[inline]
    pub fn eye_distance(viewport: Vec2) -> f32 {
        (viewport.y * 0.5) / (FOV_Y * 0.5).tan()
    }

    /// Scale then tilt, in y-down world space.
    pub fn model(&self) -> Mat4 {
        Mat4::from_scale(Vec3::splat(self.zoom))
            * Mat4::from_rotation_y(self.rotation.y)
            * Mat4::from_rotation_x(self.rotation.x)
    }

    /// Camera looking down -z at the origin, with the y-down world
    /// flipped into a y-up view.
    pub fn view(&self, viewport: Vec2) -> Mat4 {
        let eye = Vec3::new(0.0, 0.0, Self::eye_distance(viewport));
        Mat4::look_at_rh(eye, Vec3::ZERO, Vec3::Y) * Mat4::from_scale(Vec3::new(1.0, -1.0, 1.0))
    }

    pub fn model_view(&self, viewport: Vec2) -> Mat4 {
        self.view(viewport) * self.model()
    }

    pub fn projection(&self, viewport: Vec2) -> Mat4 {
        let d = Self::eye_distance(viewport);
        let aspect = if viewport.y > 0.0 { viewport.x / viewport.y } else { 1.0 };
        Mat4::perspective_rh(FOV_Y, aspect, d / 10.0, d * 10.0)
    }

    /// Screen position in pixels (origin top-left) of a world point, or
    /// `None` when it is behind the eye.
    pub fn project(&self, world: Vec3, viewport: Vec2) -> Option<Vec2> {
        let clip = self.projection(viewport) * self.model_view(viewport) * world.extend(1.0);
        if clip.w <= f32::EPSILON {
            return None;
        }
        let ndc = clip.xy() / clip.w;
        Some(Vec2::new((ndc.x + 1.0) * 0.5 * viewport.x, (1.0 - ndc.y) * 0.5 * viewport.y))
    }
}

impl Default for ViewRig {
    fn default() -> Self {
        Self::new(1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VIEWPORT: Vec2 = Vec2::new(800.0, 600.0);

    fn close(a: Vec2, b: Vec2) -> bool {
        (a - b).length() < 1e-2
    }

    #[test]
    fn test_flat_projection_is_pixel_exact() {
        let rig = ViewRig::new(1.0);
        let p = rig.project(Vec3::new(0.0, 0.0, 0.0), VIEWPORT).unwrap();
        assert!(close(p, Vec2::new(400.0, 300.0)));

        let p = rig.project(Vec3::new(-120.0, 45.0, 0.0), VIEWPORT).unwrap();
        assert!(close(p, Vec2::new(280.0, 345.0)));
    }

    #[test]
    fn test_depth_shrinks_toward_center() {
        let rig = ViewRig::new(1.0);
        let near = rig.project(Vec3::new(100.0, 0.0, 0.0), VIEWPORT).unwrap();
        let far = rig.project(Vec3::new(100.0, 0.0, -120.0), VIEWPORT).unwrap();
        assert!(far.x < near.x);
        assert!(far.x > 400.0);
    }

    #[test]
    fn test_zoom_scales_about_center() {
        let rig = ViewRig::new(0.5);
        let p = rig.project(Vec3::new(100.0, -100.0, 0.0), VIEWPORT).unwrap();
        assert!(close(p, Vec2::new(450.0, 250.0)));
    }

    #[test]
    fn test_behind_eye_is_none() {
        let rig = ViewRig::new(1.0);
        let d = ViewRig::eye_distance(VIEWPORT);
        assert!(rig.project(Vec3::new(0.0, 0.0, d + 10.0), VIEWPORT).is_none());
    }

    #[test]
    fn test_follow_pointer_eases() {
        let mut rig = ViewRig::default();
        rig.follow_pointer(Vec2::new(800.0, 300.0), VIEWPORT);
        assert_eq!(rig.target, Vec2::new(0.0, MAX_TILT));

        rig.step();
        assert!((rig.rotation.y - MAX_TILT * TILT_FOLLOW).abs() < 1e-6);
        for _ in 0..200 {
            rig.step();
        }
        assert!((rig.rotation.y - MAX_TILT).abs() < 1e-4);

        rig.follow_pointer(Vec2::new(400.0, 0.0), VIEWPORT);
        assert_eq!(rig.target, Vec2::new(-MAX_TILT, 0.0));
    }

    #[test]
    fn test_tilt_moves_off_axis_points() {
        let mut rig = ViewRig::new(1.0);
        rig.rotation = Vec2::new(0.0, 0.3);
        let p = rig.project(Vec3::new(200.0, 0.0, 0.0), VIEWPORT).unwrap();
        assert!(!close(p, Vec2::new(600.0, 300.0)));
        // The rotation axis itself stays put.
        let c = rig.project(Vec3::new(0.0, 50.0, 0.0), VIEWPORT).unwrap();
        assert!(close(c, Vec2::new(400.0, 350.0)));
    }
}
