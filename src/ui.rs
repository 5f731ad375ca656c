//! Immediate-mode overlay: use-case popup, controls panel, image source box
//! and load-failure alert.
//!
//! Drawing never mutates the session directly. Every edit comes back as a
//! [`UiAction`] for the app to apply, so the session stays the only owner of
//! its state.

use crate::session::Session;
use crate::settings::{self, Control};

/// An edit requested from the overlay.
#[derive(Debug, Clone, PartialEq)]
pub enum UiAction {
    Control(Control),
    SetRelational(bool),
    /// Load an image from a URL or path typed into the source box.
    Load(String),
    DismissPopup,
    DismissAlert,
}

/// Overlay state that is not part of the session.
#[derive(Debug, Default)]
pub struct UiState {
    /// Contents of the image source box.
    pub source_input: String,
    /// Measured frame rate for the status line.
    pub fps: f32,
}

impl UiState {
    pub fn new(source: Option<String>) -> Self {
        Self {
            source_input: source.unwrap_or_default(),
            fps: 0.0,
        }
    }
}

/// Draw the overlay for one frame and collect the requested edits.
pub fn draw(ctx: &egui::Context, session: &Session, state: &mut UiState) -> Vec<UiAction> {
    let mut actions = Vec::new();

    controls_window(ctx, session, state, &mut actions);
    let popup_rect = popup_window(ctx, session, &mut actions);
    alert_window(ctx, session, &mut actions);

    // A press on the overlay but outside the card closes it; presses on
    // the bare canvas never reach here as overlay clicks.
    if let Some(rect) = popup_rect {
        let pressed_at = ctx.input(|i| {
            if i.pointer.any_pressed() {
                i.pointer.interact_pos()
            } else {
                None
            }
        });
        if let Some(pos) = pressed_at {
            if ctx.is_pointer_over_area() && !rect.contains(pos) {
                actions.push(UiAction::DismissPopup);
            }
        }
    }

    actions
}

fn controls_window(ctx: &egui::Context, session: &Session, state: &mut UiState, actions: &mut Vec<UiAction>) {
    let current = session.settings();
    let viewport = session.viewport();

    egui::Window::new("Controls")
        .anchor(egui::Align2::RIGHT_TOP, egui::vec2(-10.0, 10.0))
        .resizable(false)
        .default_open(true)
        .show(ctx, |ui| {
            ui.horizontal(|ui| {
                let edit = ui.add(
                    egui::TextEdit::singleline(&mut state.source_input)
                        .hint_text("Image URL or path")
                        .desired_width(220.0),
                );
                let submitted = edit.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
                if (ui.button("Load").clicked() || submitted) && !state.source_input.trim().is_empty() {
                    actions.push(UiAction::Load(state.source_input.trim().to_string()));
                }
            });

            ui.separator();

            let mut step = current.step(viewport);
            if ui
                .add(egui::Slider::new(&mut step, settings::STEP_RANGE.0..=60).text("Grid step"))
                .changed()
            {
                actions.push(UiAction::Control(Control::GridStep(step)));
            }

            let mut size = current.size(viewport);
            if ui
                .add(egui::Slider::new(&mut size, settings::SIZE_RANGE.0..=30.0).text("Dot size"))
                .changed()
            {
                actions.push(UiAction::Control(Control::DotSize(size)));
            }

            let mut sides = current.dot_sides;
            if ui
                .add(egui::Slider::new(&mut sides, settings::SIDES_RANGE.0..=12).text("Polygon sides"))
                .changed()
            {
                actions.push(UiAction::Control(Control::DotSides(sides)));
            }

            let mut layers = current.layer_count;
            if ui
                .add(egui::Slider::new(&mut layers, settings::LAYER_RANGE.0..=settings::LAYER_RANGE.1).text("Layers"))
                .changed()
            {
                actions.push(UiAction::Control(Control::LayerCount(layers)));
            }

            let mut spacing = current.layer_spacing;
            if ui
                .add(egui::Slider::new(&mut spacing, settings::SPACING_RANGE.0..=300.0).text("Layer spacing"))
                .changed()
            {
                actions.push(UiAction::Control(Control::LayerSpacing(spacing)));
            }

            let mut zoom = current.zoom_percent;
            if ui
                .add(
                    egui::Slider::new(&mut zoom, 10.0..=300.0)
                        .text("Zoom")
                        .suffix("%"),
                )
                .changed()
            {
                actions.push(UiAction::Control(Control::Zoom(zoom)));
            }

            let mut relational = current.relational;
            if ui.checkbox(&mut relational, "Relational clusters").changed() {
                actions.push(UiAction::SetRelational(relational));
            }

            ui.separator();
            ui.label(format!("{} dots, {:.0} fps", session.dots().len(), state.fps));
        });
}

/// The use-case card. Returns its screen rect when shown.
fn popup_window(ctx: &egui::Context, session: &Session, actions: &mut Vec<UiAction>) -> Option<egui::Rect> {
    let usecase = session.popup_usecase()?;
    let anchor = session.popup().anchor()?;
    let ppp = ctx.pixels_per_point();

    let mut open = true;
    let response = egui::Window::new(usecase.title.as_str())
        .id(egui::Id::new("usecase_popup"))
        .fixed_pos(egui::pos2(anchor.x / ppp, anchor.y / ppp))
        .collapsible(false)
        .resizable(false)
        .open(&mut open)
        .show(ctx, |ui| {
            ui.set_max_width(260.0);
            if !usecase.description.is_empty() {
                ui.label(egui::RichText::new(&usecase.description).small());
            }
            if !usecase.tags.is_empty() {
                ui.label(egui::RichText::new(usecase.tags.join(" · ")).weak().small());
            }
            if !usecase.cluster.is_empty() {
                ui.label(egui::RichText::new(format!("Cluster: {}", usecase.cluster)).weak().small());
            }
        });

    if !open {
        actions.push(UiAction::DismissPopup);
    }
    response.map(|r| r.response.rect)
}

fn alert_window(ctx: &egui::Context, session: &Session, actions: &mut Vec<UiAction>) {
    let Some(message) = session.alert() else {
        return;
    };
    egui::Window::new("Image load failed")
        .anchor(egui::Align2::CENTER_CENTER, egui::Vec2::ZERO)
        .collapsible(false)
        .resizable(false)
        .show(ctx, |ui| {
            ui.label(message);
            if ui.button("OK").clicked() {
                actions.push(UiAction::DismissAlert);
            }
        });
}
