//! Tunable settings.
//!
//! Settings are process-wide for a session, mutated by the controls panel and
//! read on every sampling and render pass. They can also be loaded from a
//! JSON file; missing fields take their defaults.
//!
//! ```json
//! { "grid_step": { "fixed": 8 }, "dot_sides": 6, "layer_count": 3 }
//! ```

use std::path::Path;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::error::SettingsError;

/// Distance in source pixels between sampled grid points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GridStep {
    Fixed(u32),
    /// Derived from the viewport: `max(10, floor(min(w, h) / 90))`.
    Auto,
}

impl GridStep {
    pub fn resolve(self, viewport: Vec2) -> u32 {
        match self {
            GridStep::Fixed(step) => step,
            GridStep::Auto => ((viewport.x.min(viewport.y) / 90.0).floor() as u32).max(10),
        }
    }
}

/// Radius of a fully formed dot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DotSize {
    Fixed(f32),
    /// Proportional to the resolved grid step.
    StepRatio(f32),
}

impl DotSize {
    pub fn resolve(self, step: u32) -> f32 {
        match self {
            DotSize::Fixed(size) => size,
            DotSize::StepRatio(ratio) => step as f32 * ratio,
        }
    }
}

/// How use cases are handed out to newly spawned dots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Assignment {
    /// Spawn index modulo catalog length.
    #[default]
    RoundRobin,
    /// Uniform random draw per dot.
    Random,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub grid_step: GridStep,
    /// Sides of the polygon each dot is drawn as.
    pub dot_sides: u32,
    pub dot_size: DotSize,
    /// Number of stacked copies of the formation along z.
    pub layer_count: u32,
    /// Distance between layers along -z.
    pub layer_spacing: f32,
    /// Scene scale, 100 = world units are screen pixels.
    pub zoom_percent: f32,
    pub assignment: Assignment,
    /// Hover connections and cluster explosions; popup only when off.
    pub relational: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            grid_step: GridStep::Fixed(10),
            dot_sides: 4,
            dot_size: DotSize::Fixed(6.0),
            layer_count: 2,
            layer_spacing: 60.0,
            zoom_percent: 80.0,
            assignment: Assignment::RoundRobin,
            relational: true,
        }
    }
}

pub const STEP_RANGE: (u32, u32) = (1, 200);
pub const SIDES_RANGE: (u32, u32) = (3, 32);
pub const SIZE_RANGE: (f32, f32) = (0.5, 100.0);
pub const LAYER_RANGE: (u32, u32) = (1, 16);
pub const SPACING_RANGE: (f32, f32) = (0.0, 1000.0);
pub const ZOOM_RANGE: (f32, f32) = (1.0, 500.0);

fn check(name: &'static str, value: f32, (lo, hi): (f32, f32), expected: &'static str) -> Result<(), SettingsError> {
    if value.is_finite() && value >= lo && value <= hi {
        Ok(())
    } else {
        Err(SettingsError::OutOfRange {
            name,
            value,
            expected,
        })
    }
}

impl Settings {
    /// Parse settings from JSON and validate them.
    pub fn from_json_str(json: &str) -> Result<Self, SettingsError> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    /// Reject values the sampler or renderer cannot work with.
    pub fn validate(&self) -> Result<(), SettingsError> {
        if let GridStep::Fixed(step) = self.grid_step {
            check("grid_step", step as f32, (STEP_RANGE.0 as f32, STEP_RANGE.1 as f32), "1..=200")?;
        }
        check(
            "dot_sides",
            self.dot_sides as f32,
            (SIDES_RANGE.0 as f32, SIDES_RANGE.1 as f32),
            "3..=32",
        )?;
        match self.dot_size {
            DotSize::Fixed(size) => check("dot_size", size, SIZE_RANGE, "0.5..=100")?,
            DotSize::StepRatio(ratio) => check("dot_size", ratio, (0.01, 10.0), "ratio 0.01..=10")?,
        }
        check(
            "layer_count",
            self.layer_count as f32,
            (LAYER_RANGE.0 as f32, LAYER_RANGE.1 as f32),
            "1..=16",
        )?;
        check("layer_spacing", self.layer_spacing, SPACING_RANGE, "0..=1000")?;
        check("zoom_percent", self.zoom_percent, ZOOM_RANGE, "1..=500")?;
        Ok(())
    }

    /// Grid step for the given viewport.
    #[inline]
    pub fn step(&self, viewport: Vec2) -> u32 {
        self.grid_step.resolve(viewport)
    }

    /// Dot radius for the given viewport.
    #[inline]
    pub fn size(&self, viewport: Vec2) -> f32 {
        self.dot_size.resolve(self.step(viewport))
    }

    #[inline]
    pub fn zoom(&self) -> f32 {
        self.zoom_percent / 100.0
    }
}

/// A single edit from the controls panel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Control {
    GridStep(u32),
    DotSides(u32),
    DotSize(f32),
    LayerCount(u32),
    LayerSpacing(f32),
    Zoom(f32),
}

impl Control {
    /// Whether the edit changes the formation and needs a re-sample.
    pub fn affects_layout(self) -> bool {
        matches!(
            self,
            Control::GridStep(_) | Control::DotSize(_) | Control::LayerCount(_) | Control::LayerSpacing(_)
        )
    }

    /// Apply the edit, clamped into range. Returns true if anything changed.
    pub fn apply(self, settings: &mut Settings) -> bool {
        let before = settings.clone();
        match self {
            Control::GridStep(step) => {
                settings.grid_step = GridStep::Fixed(step.clamp(STEP_RANGE.0, STEP_RANGE.1))
            }
            Control::DotSides(sides) => settings.dot_sides = sides.clamp(SIDES_RANGE.0, SIDES_RANGE.1),
            Control::DotSize(size) => settings.dot_size = DotSize::Fixed(size.clamp(SIZE_RANGE.0, SIZE_RANGE.1)),
            Control::LayerCount(n) => settings.layer_count = n.clamp(LAYER_RANGE.0, LAYER_RANGE.1),
            Control::LayerSpacing(s) => settings.layer_spacing = s.clamp(SPACING_RANGE.0, SPACING_RANGE.1),
            Control::Zoom(z) => settings.zoom_percent = z.clamp(ZOOM_RANGE.0, ZOOM_RANGE.1),
        }
        *settings != before
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let s = Settings::default();
        s.validate().unwrap();
        assert_eq!(s.step(Vec2::new(1920.0, 1080.0)), 10);
        assert_eq!(s.size(Vec2::new(1920.0, 1080.0)), 6.0);
        assert!((s.zoom() - 0.8).abs() < 1e-6);
    }

    #[test]
    fn test_auto_step() {
        assert_eq!(GridStep::Auto.resolve(Vec2::new(800.0, 600.0)), 10);
        assert_eq!(GridStep::Auto.resolve(Vec2::new(2560.0, 1440.0)), 16);
        assert_eq!(GridStep::Auto.resolve(Vec2::new(1440.0, 2560.0)), 16);
        assert!((DotSize::StepRatio(0.65).resolve(16) - 10.4).abs() < 1e-5);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let s = Settings::from_json_str(
            r#"{ "grid_step": "auto", "dot_size": { "step_ratio": 0.65 }, "assignment": "random" }"#,
        )
        .unwrap();
        assert_eq!(s.grid_step, GridStep::Auto);
        assert_eq!(s.dot_size, DotSize::StepRatio(0.65));
        assert_eq!(s.assignment, Assignment::Random);
        assert_eq!(s.dot_sides, 4);
        assert!(s.relational);
    }

    #[test]
    fn test_out_of_range_rejected() {
        let err = Settings::from_json_str(r#"{ "grid_step": { "fixed": 0 } }"#).unwrap_err();
        assert!(matches!(err, SettingsError::OutOfRange { name: "grid_step", .. }));

        let err = Settings::from_json_str(r#"{ "zoom_percent": -5 }"#).unwrap_err();
        assert!(matches!(err, SettingsError::OutOfRange { name: "zoom_percent", .. }));
    }

    #[test]
    fn test_controls() {
        let mut s = Settings::default();
        assert!(Control::GridStep(12).apply(&mut s));
        assert_eq!(s.grid_step, GridStep::Fixed(12));
        assert!(!Control::GridStep(12).apply(&mut s));
        assert!(Control::GridStep(0).apply(&mut s));
        assert_eq!(s.grid_step, GridStep::Fixed(1));

        Control::DotSides(1).apply(&mut s);
        assert_eq!(s.dot_sides, 3);

        assert!(Control::LayerCount(3).affects_layout());
        assert!(Control::DotSize(4.0).affects_layout());
        assert!(!Control::DotSides(5).affects_layout());
        assert!(!Control::Zoom(120.0).affects_layout());
    }
}
