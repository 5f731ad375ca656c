//! Randomness for spawning and scattering dots.
//!
//! All random draws the field makes (spawn positions, noise seeds, stagger
//! delays, use-case draws, explosion ring placement) go through one
//! [`SpawnContext`], so a seeded context makes a whole session reproducible.

use std::f32::consts::TAU;

use glam::{Vec2, Vec3};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// Half-depth of the random spawn volume along z.
pub const SPAWN_DEPTH: f32 = 300.0;
/// Noise seeds are drawn from `[0, NOISE_SEED_RANGE)`.
pub const NOISE_SEED_RANGE: f32 = 1000.0;

#[derive(Debug, Clone)]
pub struct SpawnContext {
    rng: SmallRng,
}

impl SpawnContext {
    /// A context seeded from the clock, different each run.
    pub fn new() -> Self {
        let seed = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(42);
        Self::seeded(seed)
    }

    /// A reproducible context.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    /// Random f32 between 0.0 and 1.0.
    #[inline]
    pub fn random(&mut self) -> f32 {
        self.rng.gen()
    }

    /// Random f32 in `[min, max)`. Returns `min` for an empty range.
    #[inline]
    pub fn random_range(&mut self, min: f32, max: f32) -> f32 {
        if max <= min {
            return min;
        }
        self.rng.gen_range(min..max)
    }

    /// Random index below `len`. `len` must be non-zero.
    #[inline]
    pub fn random_index(&mut self, len: usize) -> usize {
        self.rng.gen_range(0..len)
    }

    /// A point well outside the visible formation: x in `[-w, 2w)`,
    /// y in `[-h, 2h)`, z in `[-300, 300)`.
    pub fn off_screen(&mut self, viewport: Vec2) -> Vec3 {
        Vec3::new(
            self.random_range(-viewport.x, 2.0 * viewport.x),
            self.random_range(-viewport.y, 2.0 * viewport.y),
            self.random_range(-SPAWN_DEPTH, SPAWN_DEPTH),
        )
    }

    /// Independent per-axis noise seeds.
    pub fn noise_seeds(&mut self) -> Vec3 {
        Vec3::new(
            self.random_range(0.0, NOISE_SEED_RANGE),
            self.random_range(0.0, NOISE_SEED_RANGE),
            self.random_range(0.0, NOISE_SEED_RANGE),
        )
    }

    /// A point on a horizontal ring around `center`.
    ///
    /// Radius is `radius + U[0, jitter)`, z is `center.z + U[-height, height)`.
    pub fn on_ring(&mut self, center: Vec3, radius: f32, jitter: f32, height: f32) -> Vec3 {
        let angle = self.random_range(0.0, TAU);
        let r = radius + self.random_range(0.0, jitter);
        Vec3::new(
            center.x + angle.cos() * r,
            center.y + angle.sin() * r,
            center.z + self.random_range(-height, height),
        )
    }
}

impl Default for SpawnContext {
    fn default() -> Self {
        Self::new()
    }
}
