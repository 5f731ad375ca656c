//! Session state.
//!
//! [`Session`] owns everything that changes while the app runs: settings,
//! the dot field, the view rig, interaction and popup state, and the cached
//! source image. The event loop feeds it input and frame ticks; the renderer
//! and overlay only read from it.
//!
//! Image loads are tagged with a generation. Starting a load bumps the
//! generation, and only a result carrying the latest generation is applied,
//! so a slow stale fetch can never overwrite a newer image. A failed load
//! leaves the current field untouched.

use std::sync::Arc;

use glam::{Vec2, Vec3};
use image::RgbaImage;

use crate::catalog::{Catalog, UseCase};
use crate::camera::ViewRig;
use crate::dot::Dot;
use crate::error::LoadError;
use crate::field::{DotField, SpawnParams};
use crate::interaction::{self, hit_test, Interaction, PressOutcome};
use crate::loader::{ImageSource, LoadResult};
use crate::motion::MotionDriver;
use crate::popup::Popup;
use crate::sampler::sample;
use crate::settings::{Control, Settings};
use crate::spawn::SpawnContext;

/// What happened to a finished load.
#[derive(Debug)]
pub enum LoadOutcome {
    /// The image replaced the field.
    Applied { dots: usize },
    /// A newer load was started after this one.
    Stale,
    /// Fetch or decode failed; the field is unchanged.
    Failed(LoadError),
}

pub struct Session {
    settings: Settings,
    catalog: Arc<Catalog>,
    field: DotField,
    motion: MotionDriver,
    rig: ViewRig,
    interaction: Interaction,
    popup: Popup,
    viewport: Vec2,
    rng: SpawnContext,
    image: Option<RgbaImage>,
    source: Option<ImageSource>,
    generation: u64,
    now: f32,
    alert: Option<String>,
}

impl Session {
    /// A session with an empty field. The catalog must already be loaded.
    pub fn new(catalog: Arc<Catalog>, settings: Settings, viewport: Vec2) -> Self {
        let rig = ViewRig::new(settings.zoom());
        Self {
            settings,
            catalog,
            field: DotField::empty(),
            motion: MotionDriver::default(),
            rig,
            interaction: Interaction::new(),
            popup: Popup::default(),
            viewport,
            rng: SpawnContext::new(),
            image: None,
            source: None,
            generation: 0,
            now: 0.0,
            alert: None,
        }
    }

    /// Replace the random source, for reproducible runs.
    pub fn with_rng(mut self, rng: SpawnContext) -> Self {
        self.rng = rng;
        self
    }

    #[inline]
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    #[inline]
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    #[inline]
    pub fn field(&self) -> &DotField {
        &self.field
    }

    #[inline]
    pub fn dots(&self) -> &[Dot] {
        self.field.dots()
    }

    #[inline]
    pub fn rig(&self) -> &ViewRig {
        &self.rig
    }

    #[inline]
    pub fn interaction(&self) -> &Interaction {
        &self.interaction
    }

    #[inline]
    pub fn popup(&self) -> &Popup {
        &self.popup
    }

    #[inline]
    pub fn viewport(&self) -> Vec2 {
        self.viewport
    }

    /// Source of the image currently on screen.
    pub fn source(&self) -> Option<&ImageSource> {
        self.source.as_ref()
    }

    /// Use case shown in the popup, if any.
    pub fn popup_usecase(&self) -> Option<&UseCase> {
        self.popup.usecase().and_then(|i| self.catalog.get(i))
    }

    /// Pending user-facing error message.
    pub fn alert(&self) -> Option<&str> {
        self.alert.as_deref()
    }

    pub fn dismiss_alert(&mut self) {
        self.alert = None;
    }

    pub fn dismiss_popup(&mut self) {
        self.popup.dismiss();
    }

    /// Register a new load and return its generation. Results of any
    /// earlier load are ignored from now on.
    pub fn begin_load(&mut self, source: &ImageSource) -> u64 {
        self.generation += 1;
        log::debug!("load generation {} for {source}", self.generation);
        self.generation
    }

    /// Apply a finished load.
    pub fn apply_load(&mut self, result: LoadResult) -> LoadOutcome {
        if result.generation != self.generation {
            log::warn!(
                "dropping stale image load {} (generation {}, current {})",
                result.source,
                result.generation,
                self.generation
            );
            return LoadOutcome::Stale;
        }
        match result.image {
            Ok(image) => {
                self.image = Some(image);
                self.source = Some(result.source);
                self.alert = None;
                self.resample();
                LoadOutcome::Applied { dots: self.field.len() }
            }
            Err(err) => {
                log::error!("{err}");
                self.alert = Some(format!("Could not load {}: {err}", result.source));
                LoadOutcome::Failed(err)
            }
        }
    }

    /// Rebuild the field from the cached image with the current settings
    /// and viewport. Without an image this does nothing.
    pub fn resample(&mut self) {
        let Some(image) = &self.image else {
            return;
        };
        let step = self.settings.step(self.viewport);
        let sampling = match sample(image, step, self.viewport) {
            Ok(sampling) => sampling,
            Err(err) => {
                log::error!("sampling failed: {err}");
                return;
            }
        };
        let params = SpawnParams {
            viewport: self.viewport,
            layer_count: self.settings.layer_count,
            layer_spacing: self.settings.layer_spacing,
            dot_size: self.settings.size(self.viewport),
            assignment: self.settings.assignment,
        };
        self.field = DotField::spawn(&sampling, &self.catalog, &params, &mut self.rng, self.now);
        self.interaction.clear();
        log::info!(
            "resampled at step {step} for {}x{}: {} dots",
            self.viewport.x,
            self.viewport.y,
            self.field.len()
        );
    }

    /// New viewport size in pixels. Re-samples when it actually changed.
    pub fn resize(&mut self, viewport: Vec2) {
        if viewport.min_element() <= 0.0 || viewport == self.viewport {
            return;
        }
        self.viewport = viewport;
        self.resample();
    }

    /// Apply a controls edit. Layout edits re-sample the cached image.
    pub fn apply_control(&mut self, control: Control) -> bool {
        if !control.apply(&mut self.settings) {
            return false;
        }
        log::debug!("control changed: {control:?}");
        self.rig.zoom = self.settings.zoom();
        if control.affects_layout() {
            self.resample();
        }
        true
    }

    /// Toggle hover lines and explosions. Turning them off resets any
    /// explosion in progress.
    pub fn set_relational(&mut self, on: bool) {
        if self.settings.relational == on {
            return;
        }
        self.settings.relational = on;
        if !on {
            if self.interaction.is_exploded() {
                interaction::reset(&mut self.field, self.now);
            }
            self.interaction.clear();
        }
    }

    /// Screen positions of every dot's base position (drift excluded).
    pub fn projected(&self) -> impl Iterator<Item = Option<Vec2>> + '_ {
        self.field
            .iter()
            .map(move |dot| self.rig.project(dot.base_position(), self.viewport))
    }

    /// First dot under `pointer`.
    pub fn hit(&self, pointer: Vec2) -> Option<usize> {
        hit_test(pointer, self.projected())
    }

    pub fn pointer_moved(&mut self, pointer: Vec2) {
        self.rig.follow_pointer(pointer, self.viewport);
        let hovered = if self.settings.relational { self.hit(pointer) } else { None };
        self.interaction.hover(hovered);
    }

    pub fn pointer_left(&mut self) {
        self.interaction.hover(None);
    }

    /// Canvas click: show the hit dot's use case and, in relational mode,
    /// drive the explosion state machine. Misses never dismiss the popup.
    /// Returns the hit dot.
    pub fn pointer_pressed(&mut self, pointer: Vec2) -> Option<usize> {
        let hit = self.hit(pointer);
        if let Some(dot) = hit.and_then(|i| self.field.get(i)) {
            self.popup.show(dot.usecase, pointer);
        }
        if self.settings.relational {
            let outcome = self
                .interaction
                .press(hit, &mut self.field, &self.catalog, &mut self.rng, self.now);
            if outcome != PressOutcome::Ignored {
                log::debug!("press at {pointer}: {outcome:?}");
            }
        }
        hit
    }

    /// Advance one frame: tilt, tweens, then drift.
    pub fn frame(&mut self, now: f32, frame: u64) {
        self.now = now;
        self.rig.step();
        self.field.advance(now);
        self.motion.drive(&mut self.field, frame, now);
    }

    /// Lines from the hovered dot to its relatives, at render positions.
    pub fn connection_lines(&self) -> Vec<(Vec3, Vec3)> {
        match self.interaction.hovered() {
            Some(source) if self.settings.relational => {
                interaction::connection_lines(&self.field, &self.catalog, source)
            }
            _ => Vec::new(),
        }
    }
}
