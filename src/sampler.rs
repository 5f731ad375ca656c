//! Image sampling.
//!
//! Scans an RGBA buffer on a regular grid and keeps the pixels that look like
//! foreground: sufficiently opaque and not near-white. Each kept pixel is
//! mapped into a viewport-centred box that fits the image to 80% of the
//! viewport width and 60% of its height.
//!
//! The accept/reject set depends only on the image and the grid step; the
//! viewport affects the mapped coordinates, never which pixels are kept.

use glam::Vec2;
use image::RgbaImage;

use crate::error::SampleError;

/// Pixels must be strictly more opaque than this to become dots.
pub const ALPHA_THRESHOLD: u8 = 200;
/// A pixel whose channels are all at or above this counts as background.
pub const NEAR_WHITE: u8 = 250;
/// Fraction of the viewport width the image may occupy.
pub const FIT_WIDTH: f32 = 0.8;
/// Fraction of the viewport height the image may occupy.
pub const FIT_HEIGHT: f32 = 0.6;

/// Foreground test for a single RGBA pixel.
#[inline]
pub fn accepts([r, g, b, a]: [u8; 4]) -> bool {
    a > ALPHA_THRESHOLD && (r < NEAR_WHITE || g < NEAR_WHITE || b < NEAR_WHITE)
}

/// Uniform scale and centring offset that fit an image into the viewport.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fit {
    pub scale: f32,
    pub offset: Vec2,
}

impl Fit {
    /// Fit `width`×`height` pixels into the viewport, preserving aspect ratio.
    pub fn new(width: u32, height: u32, viewport: Vec2) -> Self {
        if width == 0 || height == 0 {
            return Self {
                scale: 0.0,
                offset: Vec2::ZERO,
            };
        }
        let (w, h) = (width as f32, height as f32);
        let scale = (viewport.x * FIT_WIDTH / w).min(viewport.y * FIT_HEIGHT / h);
        Self {
            scale,
            offset: Vec2::new(-w * scale / 2.0, -h * scale / 2.0),
        }
    }

    /// Map a pixel coordinate to viewport-centred world coordinates.
    #[inline]
    pub fn map(&self, x: u32, y: u32) -> Vec2 {
        Vec2::new(x as f32, y as f32) * self.scale + self.offset
    }

    /// Corners of the scaled image box (`min`, `max`).
    pub fn bounds(&self, width: u32, height: u32) -> (Vec2, Vec2) {
        let size = Vec2::new(width as f32, height as f32) * self.scale;
        (self.offset, self.offset + size)
    }
}

/// A pixel that passed the foreground filter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    /// Source pixel coordinate.
    pub pixel: (u32, u32),
    /// Mapped position in world space (z = 0 plane).
    pub target: Vec2,
    /// Source color, alpha dropped.
    pub color: [u8; 3],
}

/// Result of sampling one image.
#[derive(Debug, Clone)]
pub struct Sampling {
    pub step: u32,
    pub image_size: (u32, u32),
    pub fit: Fit,
    pub candidates: Vec<Candidate>,
}

impl Sampling {
    /// Source pixel coordinates of every accepted candidate, in scan order.
    pub fn accepted_pixels(&self) -> Vec<(u32, u32)> {
        self.candidates.iter().map(|c| c.pixel).collect()
    }
}

/// Scan `image` every `step` pixels in row-major order and fit the result
/// into `viewport`.
pub fn sample(image: &RgbaImage, step: u32, viewport: Vec2) -> Result<Sampling, SampleError> {
    if step == 0 {
        return Err(SampleError::ZeroStep);
    }

    let (width, height) = image.dimensions();
    let fit = Fit::new(width, height, viewport);

    let mut candidates = Vec::new();
    for y in (0..height).step_by(step as usize) {
        for x in (0..width).step_by(step as usize) {
            let rgba = image.get_pixel(x, y).0;
            if accepts(rgba) {
                candidates.push(Candidate {
                    pixel: (x, y),
                    target: fit.map(x, y),
                    color: [rgba[0], rgba[1], rgba[2]],
                });
            }
        }
    }

    log::debug!(
        "sampled {}x{} image at step {}: {} candidates (scale {:.3})",
        width,
        height,
        step,
        candidates.len(),
        fit.scale
    );

    Ok(Sampling {
        step,
        image_size: (width, height),
        fit,
        candidates,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    /// 40x20 white image with an opaque red 20x10 block in the middle and a
    /// translucent black strip along the bottom row.
    fn logo() -> RgbaImage {
        let mut img = RgbaImage::from_pixel(40, 20, Rgba([255, 255, 255, 255]));
        for y in 5..15 {
            for x in 10..30 {
                img.put_pixel(x, y, Rgba([200, 20, 20, 255]));
            }
        }
        for x in 0..40 {
            img.put_pixel(x, 19, Rgba([0, 0, 0, 200]));
        }
        img
    }

    #[test]
    fn test_filter() {
        assert!(accepts([0, 0, 0, 255]));
        assert!(accepts([249, 255, 255, 201]));
        assert!(!accepts([0, 0, 0, 200]), "alpha must exceed the threshold");
        assert!(!accepts([250, 250, 250, 255]), "near-white is background");
        assert!(!accepts([255, 255, 255, 255]));
    }

    #[test]
    fn test_only_foreground_pixels_become_candidates() {
        let img = logo();
        let sampling = sample(&img, 5, Vec2::new(800.0, 600.0)).unwrap();
        assert!(!sampling.candidates.is_empty());
        for c in &sampling.candidates {
            let px = img.get_pixel(c.pixel.0, c.pixel.1).0;
            assert!(accepts(px));
            assert_eq!(c.color, [200, 20, 20]);
            assert_eq!(c.pixel.0 % 5, 0);
            assert_eq!(c.pixel.1 % 5, 0);
        }
        // Grid points inside the block: x in {10,15,20,25}, y in {5,10}
        assert_eq!(sampling.candidates.len(), 8);
    }

    #[test]
    fn test_targets_within_fitted_box() {
        let img = logo();
        let viewport = Vec2::new(1024.0, 768.0);
        let sampling = sample(&img, 3, viewport).unwrap();
        let (min, max) = sampling.fit.bounds(40, 20);

        assert!(max.x - min.x <= viewport.x * FIT_WIDTH + 1e-3);
        assert!(max.y - min.y <= viewport.y * FIT_HEIGHT + 1e-3);
        // Centred on the origin
        assert!((min + max).length() < 1e-3);

        for c in &sampling.candidates {
            assert!(c.target.x >= min.x && c.target.x <= max.x);
            assert!(c.target.y >= min.y && c.target.y <= max.y);
        }
    }

    #[test]
    fn test_viewport_changes_scale_not_selection() {
        let img = logo();
        let small = sample(&img, 2, Vec2::new(320.0, 240.0)).unwrap();
        let large = sample(&img, 2, Vec2::new(1920.0, 1080.0)).unwrap();

        assert_eq!(small.accepted_pixels(), large.accepted_pixels());
        assert!(large.fit.scale > small.fit.scale);
    }

    #[test]
    fn test_aspect_ratio_preserved() {
        // Wide viewport: height is the limiting axis.
        let fit = Fit::new(100, 100, Vec2::new(2000.0, 500.0));
        assert!((fit.scale - 3.0).abs() < 1e-5);
        // Tall viewport: width is the limiting axis.
        let fit = Fit::new(100, 100, Vec2::new(500.0, 2000.0));
        assert!((fit.scale - 4.0).abs() < 1e-5);
    }

    #[test]
    fn test_zero_step_rejected() {
        let img = logo();
        assert_eq!(
            sample(&img, 0, Vec2::new(800.0, 600.0)).unwrap_err(),
            SampleError::ZeroStep
        );
    }

    #[test]
    fn test_empty_image() {
        let img = RgbaImage::new(0, 0);
        let sampling = sample(&img, 10, Vec2::new(800.0, 600.0)).unwrap();
        assert!(sampling.candidates.is_empty());
        assert_eq!(sampling.fit.scale, 0.0);
    }
}
