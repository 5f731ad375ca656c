//! Pointer and keyboard input.
//!
//! Raw winit window events are folded into the few actions the field reacts
//! to: pointer moves, primary clicks and Escape.

use glam::Vec2;
use winit::event::{ElementState, MouseButton, WindowEvent};
use winit::keyboard::{KeyCode, PhysicalKey};

/// An input the session cares about.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    /// Pointer moved, screen pixels.
    PointerMoved(Vec2),
    /// Primary button went down at the pointer position.
    PointerPressed(Vec2),
    /// Pointer left the window.
    PointerLeft,
    /// Escape pressed (not repeated).
    Escape,
}

/// Tracks the pointer between events.
#[derive(Debug, Default)]
pub struct Input {
    /// Last known pointer position inside the window.
    pointer: Option<Vec2>,
}

impl Input {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process a winit window event.
    pub fn handle_event(&mut self, event: &WindowEvent) -> Option<InputEvent> {
        match event {
            WindowEvent::CursorMoved { position, .. } => {
                Some(self.cursor_moved(Vec2::new(position.x as f32, position.y as f32)))
            }
            WindowEvent::CursorLeft { .. } => Some(self.cursor_left()),
            WindowEvent::MouseInput { state, button, .. } => self.mouse_button(*button, *state),
            WindowEvent::KeyboardInput { event, .. } => {
                self.key(event.physical_key, event.state, event.repeat)
            }
            _ => None,
        }
    }

    pub fn cursor_moved(&mut self, p: Vec2) -> InputEvent {
        self.pointer = Some(p);
        InputEvent::PointerMoved(p)
    }

    pub fn cursor_left(&mut self) -> InputEvent {
        self.pointer = None;
        InputEvent::PointerLeft
    }

    /// Primary presses report where the pointer was last seen; a press
    /// before any move has no position and is dropped.
    pub fn mouse_button(&mut self, button: MouseButton, state: ElementState) -> Option<InputEvent> {
        match (button, state) {
            (MouseButton::Left, ElementState::Pressed) => self.pointer.map(InputEvent::PointerPressed),
            _ => None,
        }
    }

    pub fn key(&mut self, key: PhysicalKey, state: ElementState, repeat: bool) -> Option<InputEvent> {
        (state == ElementState::Pressed && !repeat && key == PhysicalKey::Code(KeyCode::Escape))
            .then_some(InputEvent::Escape)
    }
}
