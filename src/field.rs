//! The dot field.
//!
//! Owns every live [`Dot`]. A field is built in one go from a [`Sampling`]
//! and replaced wholesale when the image, the viewport or a layout setting
//! changes; tweens belong to their dots and die with the old field.

use glam::{Vec2, Vec3};

use crate::catalog::Catalog;
use crate::dot::Dot;
use crate::sampler::Sampling;
use crate::settings::Assignment;
use crate::spawn::SpawnContext;
use crate::tween::{Easing, Timing, Track};

/// Materialize tween: spawn point to formation.
pub const FORMATION: Timing = Timing::new(1.2, Easing::Power3Out);
/// Upper bound of the random per-dot formation delay, in seconds.
pub const FORMATION_STAGGER: f32 = 0.3;

/// Layout inputs for a spawn, resolved from settings and viewport.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpawnParams {
    pub viewport: Vec2,
    pub layer_count: u32,
    pub layer_spacing: f32,
    pub dot_size: f32,
    pub assignment: Assignment,
}

#[derive(Debug, Clone, Default)]
pub struct DotField {
    dots: Vec<Dot>,
}

impl DotField {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Create one dot per candidate per layer and start the formation tween.
    ///
    /// Layers are emitted outermost: every candidate of layer 0 first, then
    /// layer 1, and so on. Dots start invisible (size and opacity 0) at a
    /// random off-screen point.
    pub fn spawn(
        sampling: &Sampling,
        catalog: &Catalog,
        params: &SpawnParams,
        ctx: &mut SpawnContext,
        now: f32,
    ) -> Self {
        let layers = params.layer_count.max(1);
        let mut dots = Vec::with_capacity(sampling.candidates.len() * layers as usize);

        for layer in 0..layers {
            let tz = -(layer as f32) * params.layer_spacing;
            for candidate in &sampling.candidates {
                let index = dots.len();
                let usecase = match params.assignment {
                    Assignment::RoundRobin => index % catalog.len(),
                    Assignment::Random => ctx.random_index(catalog.len()),
                };
                let home = candidate.target.extend(tz);

                let mut dot = Dot {
                    position: Track::new(ctx.off_screen(params.viewport)),
                    offset: Vec3::ZERO,
                    home,
                    size: Track::new(0.0),
                    target_size: params.dot_size,
                    opacity: Track::new(0.0),
                    color: candidate.color,
                    usecase,
                    noise_seed: ctx.noise_seeds(),
                    layer,
                    parity: (index % 2) as u32,
                };
                let delay = ctx.random_range(0.0, FORMATION_STAGGER);
                dot.animate(now, home, params.dot_size, 1.0, FORMATION.with_delay(delay));
                dots.push(dot);
            }
        }

        log::info!(
            "spawned {} dots ({} candidates x {} layers)",
            dots.len(),
            sampling.candidates.len(),
            layers
        );

        Self { dots }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.dots.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.dots.is_empty()
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<&Dot> {
        self.dots.get(index)
    }

    #[inline]
    pub fn dots(&self) -> &[Dot] {
        &self.dots
    }

    #[inline]
    pub fn dots_mut(&mut self) -> &mut [Dot] {
        &mut self.dots
    }

    pub fn iter(&self) -> impl Iterator<Item = &Dot> {
        self.dots.iter()
    }

    /// Step every tween to time `now`.
    pub fn advance(&mut self, now: f32) {
        for dot in &mut self.dots {
            dot.advance(now);
        }
    }

    /// True once no dot has a running tween.
    pub fn is_settled(&self) -> bool {
        self.dots.iter().all(Dot::is_idle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::UseCase;
    use crate::sampler::sample;
    use image::{Rgba, RgbaImage};

    fn checker() -> RgbaImage {
        RgbaImage::from_fn(20, 20, |x, y| {
            if (x / 5 + y / 5) % 2 == 0 {
                Rgba([10, 10, 10, 255])
            } else {
                Rgba([255, 255, 255, 255])
            }
        })
    }

    fn catalog(n: usize) -> Catalog {
        let cases = (0..n)
            .map(|i| UseCase::new(i.to_string(), format!("case {i}"), "", &["t"], ""))
            .collect();
        Catalog::new(cases).unwrap()
    }

    fn params(layers: u32, assignment: Assignment) -> SpawnParams {
        SpawnParams {
            viewport: Vec2::new(800.0, 600.0),
            layer_count: layers,
            layer_spacing: 60.0,
            dot_size: 6.0,
            assignment,
        }
    }

    #[test]
    fn test_spawn_starts_invisible_and_forms() {
        let sampling = sample(&checker(), 5, Vec2::new(800.0, 600.0)).unwrap();
        let mut ctx = SpawnContext::seeded(11);
        let mut field = DotField::spawn(&sampling, &catalog(3), &params(1, Assignment::RoundRobin), &mut ctx, 0.0);

        assert_eq!(field.len(), sampling.candidates.len());
        for dot in field.iter() {
            assert_eq!(dot.size.value(), 0.0);
            assert_eq!(dot.opacity.value(), 0.0);
            assert!(dot.noise_seed.min_element() >= 0.0);
            assert!(dot.noise_seed.max_element() < 1000.0);
        }

        // Halfway there nothing has finished yet.
        field.advance(0.6);
        assert!(!field.is_settled());

        field.advance(FORMATION.duration + FORMATION_STAGGER);
        assert!(field.is_settled());
        for dot in field.iter() {
            assert_eq!(dot.opacity.value(), 1.0);
            assert_eq!(dot.size.value(), 6.0);
            assert_eq!(dot.base_position(), dot.home);
        }
    }

    #[test]
    fn test_layers_duplicate_candidates() {
        let sampling = sample(&checker(), 5, Vec2::new(800.0, 600.0)).unwrap();
        let n = sampling.candidates.len();
        let mut ctx = SpawnContext::seeded(3);
        let field = DotField::spawn(&sampling, &catalog(2), &params(3, Assignment::RoundRobin), &mut ctx, 0.0);

        assert_eq!(field.len(), n * 3);
        for (i, dot) in field.iter().enumerate() {
            let layer = (i / n) as u32;
            assert_eq!(dot.layer, layer);
            assert_eq!(dot.home.z, -(layer as f32) * 60.0);
            assert_eq!(dot.home.truncate(), sampling.candidates[i % n].target);
            assert_eq!(dot.parity, (i % 2) as u32);
        }
    }

    #[test]
    fn test_round_robin_assignment() {
        let sampling = sample(&checker(), 5, Vec2::new(800.0, 600.0)).unwrap();
        let mut ctx = SpawnContext::seeded(5);
        let field = DotField::spawn(&sampling, &catalog(3), &params(2, Assignment::RoundRobin), &mut ctx, 0.0);
        for (i, dot) in field.iter().enumerate() {
            assert_eq!(dot.usecase, i % 3);
        }
    }

    #[test]
    fn test_random_assignment_stays_in_catalog() {
        let sampling = sample(&checker(), 1, Vec2::new(800.0, 600.0)).unwrap();
        let mut ctx = SpawnContext::seeded(9);
        let field = DotField::spawn(&sampling, &catalog(4), &params(1, Assignment::Random), &mut ctx, 0.0);
        assert!(field.iter().all(|d| d.usecase < 4));
        // 200 draws over 4 entries hit every entry.
        for k in 0..4 {
            assert!(field.iter().any(|d| d.usecase == k));
        }
    }

    #[test]
    fn test_empty_sampling_gives_empty_field() {
        let sampling = sample(&RgbaImage::new(0, 0), 5, Vec2::new(800.0, 600.0)).unwrap();
        let mut ctx = SpawnContext::seeded(1);
        let field = DotField::spawn(&sampling, &catalog(1), &params(2, Assignment::RoundRobin), &mut ctx, 0.0);
        assert!(field.is_empty());
        assert!(field.is_settled());
    }
}
