//! Pointer interaction: hit-testing, hover and cluster explosion.
//!
//! Hit-testing works in screen space against the projected base position of
//! each dot (idle drift excluded). The first dot in field order within
//! [`HIT_RADIUS`] pixels wins.
//!
//! In the relational mode a hit explodes the field around the hit dot:
//!
//! ```text
//!   Settled --hit--> Exploded(anchor) --hit--> Exploded(new anchor)
//!                          |
//!                         miss
//!                          v
//!                       Settled
//! ```
//!
//! Dots related to the anchor (sharing a tag) fly out to a ring around the
//! anchor's home; unrelated dots fade. A miss resets everything to formation.

use glam::{Vec2, Vec3};

use crate::catalog::Catalog;
use crate::field::DotField;
use crate::spawn::SpawnContext;
use crate::tween::{Easing, Timing};

/// Pick radius in screen pixels.
pub const HIT_RADIUS: f32 = 10.0;
pub const HIT_RADIUS_SQ: f32 = HIT_RADIUS * HIT_RADIUS;

/// Related dots flying out to the ring.
pub const EXPLODE: Timing = Timing::new(1.2, Easing::ExpoOut);
/// Unrelated dots dimming.
pub const FADE: Timing = Timing::new(1.0, Easing::Power2InOut);
/// Everything returning to formation.
pub const RESET: Timing = Timing::new(1.4, Easing::ExpoOut);

pub const RING_RADIUS: f32 = 150.0;
pub const RING_JITTER: f32 = 50.0;
pub const RING_HEIGHT: f32 = 50.0;
/// Opacity unrelated dots fade to.
pub const FADED_OPACITY: f32 = 0.1;

/// Index of the first point within [`HIT_RADIUS`] of `pointer`.
///
/// `None` entries (points behind the camera) never match.
pub fn hit_test<I>(pointer: Vec2, points: I) -> Option<usize>
where
    I: IntoIterator<Item = Option<Vec2>>,
{
    points
        .into_iter()
        .position(|p| p.is_some_and(|p| p.distance_squared(pointer) < HIT_RADIUS_SQ))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InteractionState {
    #[default]
    Settled,
    Exploded {
        anchor: usize,
    },
}

/// What a press did to the field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PressOutcome {
    /// Miss while settled.
    Ignored,
    Exploded { anchor: usize },
    /// Hit while already exploded; the cluster moved to a new anchor.
    Reanchored { anchor: usize },
    /// Miss while exploded.
    Reset,
}

/// Scatter the anchor's relatives onto a ring and dim everyone else.
///
/// The anchor keeps its position. It and its relatives come back to full
/// opacity so a re-anchor revives dots faded by a previous explosion.
pub fn explode(field: &mut DotField, catalog: &Catalog, anchor: usize, ctx: &mut SpawnContext, now: f32) {
    let Some((home, usecase)) = field.get(anchor).map(|d| (d.home, d.usecase)) else {
        return;
    };
    let mut related = 0usize;

    for (i, dot) in field.dots_mut().iter_mut().enumerate() {
        if i == anchor {
            dot.opacity.animate_to(now, 1.0, EXPLODE);
            continue;
        }
        if catalog.related(usecase, dot.usecase) {
            let target = ctx.on_ring(home, RING_RADIUS, RING_JITTER, RING_HEIGHT);
            dot.position.animate_to(now, target, EXPLODE);
            dot.opacity.animate_to(now, 1.0, EXPLODE);
            related += 1;
        } else {
            dot.opacity.animate_to(now, FADED_OPACITY, FADE);
        }
    }

    log::debug!("exploded around dot {anchor}: {related} related dots");
}

/// Send every dot home at full size and opacity.
pub fn reset(field: &mut DotField, now: f32) {
    for dot in field.dots_mut() {
        let (home, size) = (dot.home, dot.target_size);
        dot.animate(now, home, size, 1.0, RESET);
    }
}

/// Hover and explosion state for one field.
#[derive(Debug, Clone, Default)]
pub struct Interaction {
    state: InteractionState,
    hovered: Option<usize>,
}

impl Interaction {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn state(&self) -> InteractionState {
        self.state
    }

    #[inline]
    pub fn hovered(&self) -> Option<usize> {
        self.hovered
    }

    pub fn is_exploded(&self) -> bool {
        matches!(self.state, InteractionState::Exploded { .. })
    }

    /// Forget everything; used when the field is replaced.
    pub fn clear(&mut self) {
        self.state = InteractionState::Settled;
        self.hovered = None;
    }

    pub fn hover(&mut self, hit: Option<usize>) {
        self.hovered = hit;
    }

    /// Drive the state machine with the result of a click hit-test.
    pub fn press(
        &mut self,
        hit: Option<usize>,
        field: &mut DotField,
        catalog: &Catalog,
        ctx: &mut SpawnContext,
        now: f32,
    ) -> PressOutcome {
        match (hit, self.state) {
            (Some(anchor), InteractionState::Settled) => {
                explode(field, catalog, anchor, ctx, now);
                self.state = InteractionState::Exploded { anchor };
                PressOutcome::Exploded { anchor }
            }
            (Some(anchor), InteractionState::Exploded { .. }) => {
                explode(field, catalog, anchor, ctx, now);
                self.state = InteractionState::Exploded { anchor };
                PressOutcome::Reanchored { anchor }
            }
            (None, InteractionState::Exploded { .. }) => {
                reset(field, now);
                self.state = InteractionState::Settled;
                PressOutcome::Reset
            }
            (None, InteractionState::Settled) => PressOutcome::Ignored,
        }
    }
}

/// Indices of every other dot related to `source`.
pub fn related_dots<'a>(
    field: &'a DotField,
    catalog: &'a Catalog,
    source: usize,
) -> impl Iterator<Item = usize> + 'a {
    let usecase = field.get(source).map(|d| d.usecase);
    field
        .iter()
        .enumerate()
        .filter(move |(i, dot)| *i != source && usecase.is_some_and(|u| catalog.related(u, dot.usecase)))
        .map(|(i, _)| i)
}

/// Line segments from the hovered dot to each of its relatives, at render
/// positions.
pub fn connection_lines(field: &DotField, catalog: &Catalog, source: usize) -> Vec<(Vec3, Vec3)> {
    let Some(from) = field.get(source).map(|d| d.render_position()) else {
        return Vec::new();
    };
    related_dots(field, catalog, source)
        .filter_map(|i| field.get(i))
        .map(|dot| (from, dot.render_position()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::UseCase;
    use crate::field::{SpawnParams, FORMATION, FORMATION_STAGGER};
    use crate::sampler::sample;
    use crate::settings::Assignment;
    use image::{Rgba, RgbaImage};

    fn catalog() -> Catalog {
        Catalog::new(vec![
            UseCase::new("a", "A", "", &["x"], "1"),
            UseCase::new("b", "B", "", &["y"], "2"),
            UseCase::new("c", "C", "", &["x", "z"], "1"),
        ])
        .unwrap()
    }

    /// A settled 4x3 grid of dots with use cases a, b, c, a, b, c, ...
    fn settled_field(catalog: &Catalog) -> DotField {
        let img = RgbaImage::from_pixel(40, 30, Rgba([20, 40, 60, 255]));
        let sampling = sample(&img, 10, Vec2::new(800.0, 600.0)).unwrap();
        let params = SpawnParams {
            viewport: Vec2::new(800.0, 600.0),
            layer_count: 1,
            layer_spacing: 0.0,
            dot_size: 6.0,
            assignment: Assignment::RoundRobin,
        };
        let mut field = DotField::spawn(&sampling, catalog, &params, &mut SpawnContext::seeded(1), 0.0);
        field.advance(FORMATION.duration + FORMATION_STAGGER);
        field
    }

    #[test]
    fn test_hit_test_first_match_wins() {
        let points = [
            Some(Vec2::new(0.0, 0.0)),
            Some(Vec2::new(5.0, 0.0)),
            Some(Vec2::new(6.0, 0.0)),
        ];
        assert_eq!(hit_test(Vec2::new(5.0, 0.0), points), Some(0));
        assert_eq!(hit_test(Vec2::new(14.0, 0.0), points), Some(1));
        assert_eq!(hit_test(Vec2::new(50.0, 50.0), points), None);
    }

    #[test]
    fn test_hit_radius_is_exclusive() {
        let points = [Some(Vec2::ZERO)];
        assert_eq!(hit_test(Vec2::new(10.0, 0.0), points), None);
        assert_eq!(hit_test(Vec2::new(9.99, 0.0), points), Some(0));
        assert_eq!(hit_test(Vec2::ZERO, [None, Some(Vec2::ZERO)]), Some(1));
    }

    #[test]
    fn test_hit_test_translation_symmetric() {
        let points = [Some(Vec2::new(100.0, 40.0)), Some(Vec2::new(-30.0, 12.0))];
        let shift = Vec2::new(37.5, -81.0);
        let shifted = points.map(|p| p.map(|p| p + shift));
        for pointer in [Vec2::new(103.0, 44.0), Vec2::new(-25.0, 8.0), Vec2::new(0.0, 0.0)] {
            assert_eq!(hit_test(pointer, points), hit_test(pointer + shift, shifted));
        }
    }

    #[test]
    fn test_explode_then_reset() {
        let catalog = catalog();
        let mut field = settled_field(&catalog);
        let mut ctx = SpawnContext::seeded(2);
        let mut interaction = Interaction::new();
        let anchor_home = field.get(0).unwrap().home;

        let outcome = interaction.press(Some(0), &mut field, &catalog, &mut ctx, 10.0);
        assert_eq!(outcome, PressOutcome::Exploded { anchor: 0 });
        assert!(interaction.is_exploded());

        field.advance(10.0 + EXPLODE.duration);
        let anchor = field.get(0).unwrap();
        assert_eq!(anchor.base_position(), anchor.home);
        assert_eq!(anchor.opacity.value(), 1.0);

        for dot in field.iter().skip(1) {
            if catalog.related(0, dot.usecase) {
                let planar = (dot.base_position().truncate() - anchor_home.truncate()).length();
                assert!((RING_RADIUS - 1e-2..RING_RADIUS + RING_JITTER + 1e-2).contains(&planar));
                assert!((dot.base_position().z - anchor_home.z).abs() <= RING_HEIGHT);
                assert_eq!(dot.opacity.value(), 1.0);
            } else {
                assert_eq!(dot.base_position(), dot.home);
                assert!((dot.opacity.value() - FADED_OPACITY).abs() < 1e-6);
            }
        }

        let outcome = interaction.press(None, &mut field, &catalog, &mut ctx, 20.0);
        assert_eq!(outcome, PressOutcome::Reset);
        assert_eq!(interaction.state(), InteractionState::Settled);

        field.advance(20.0 + RESET.duration);
        for dot in field.iter() {
            assert_eq!(dot.base_position(), dot.home);
            assert_eq!(dot.opacity.value(), 1.0);
        }
    }

    #[test]
    fn test_reset_restores_formed_size() {
        let catalog = catalog();
        let mut field = settled_field(&catalog);
        for dot in field.dots_mut() {
            dot.size.set(0.5);
        }

        reset(&mut field, 5.0);
        field.advance(5.0 + RESET.duration);
        for dot in field.iter() {
            assert_eq!(dot.size.value(), dot.target_size);
            assert_eq!(dot.size.value(), 6.0);
        }
    }

    #[test]
    fn test_reanchor_and_settled_miss() {
        let catalog = catalog();
        let mut field = settled_field(&catalog);
        let mut ctx = SpawnContext::seeded(3);
        let mut interaction = Interaction::new();

        assert_eq!(
            interaction.press(None, &mut field, &catalog, &mut ctx, 0.0),
            PressOutcome::Ignored
        );
        assert!(field.is_settled());

        interaction.press(Some(0), &mut field, &catalog, &mut ctx, 1.0);
        field.advance(2.0);
        assert!((field.get(1).unwrap().opacity.value() - FADED_OPACITY).abs() < 1e-6);

        let outcome = interaction.press(Some(1), &mut field, &catalog, &mut ctx, 2.0);
        assert_eq!(outcome, PressOutcome::Reanchored { anchor: 1 });
        assert_eq!(interaction.state(), InteractionState::Exploded { anchor: 1 });

        // Dots of use case "a" are unrelated to "b" and fade; the faded
        // anchor and the other "b" dots revive.
        field.advance(2.0 + EXPLODE.duration);
        assert!((field.get(0).unwrap().opacity.value() - FADED_OPACITY).abs() < 1e-6);
        assert_eq!(field.get(1).unwrap().opacity.value(), 1.0);
        assert_eq!(field.get(4).unwrap().opacity.value(), 1.0);
    }

    #[test]
    fn test_connection_lines_follow_tags() {
        let catalog = catalog();
        let field = settled_field(&catalog);

        // Dot 0 is "a" (tag x): related to every "a" and "c" dot.
        let related: Vec<usize> = related_dots(&field, &catalog, 0).collect();
        assert!(!related.contains(&0));
        for i in &related {
            assert_ne!(field.get(*i).unwrap().usecase, 1);
        }
        let expected = field.iter().skip(1).filter(|d| d.usecase != 1).count();
        assert_eq!(related.len(), expected);

        let lines = connection_lines(&field, &catalog, 0);
        assert_eq!(lines.len(), expected);
        assert!(lines.iter().all(|(from, _)| *from == field.get(0).unwrap().render_position()));

        assert!(connection_lines(&field, &catalog, 9999).is_empty());
    }

    #[test]
    fn test_explode_out_of_range_anchor_is_noop() {
        let catalog = catalog();
        let mut field = settled_field(&catalog);
        explode(&mut field, &catalog, 10_000, &mut SpawnContext::seeded(0), 0.0);
        assert!(field.is_settled());
    }
}
