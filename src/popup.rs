//! Popup state for the use-case card.

use glam::Vec2;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Popup {
    #[default]
    Hidden,
    Shown {
        /// Catalog index of the use case on display.
        usecase: usize,
        /// Pointer position (screen px) the card is pinned to.
        anchor: Vec2,
    },
}

impl Popup {
    /// Show a card, replacing whatever was shown.
    pub fn show(&mut self, usecase: usize, anchor: Vec2) {
        *self = Popup::Shown { usecase, anchor };
    }

    pub fn dismiss(&mut self) {
        *self = Popup::Hidden;
    }

    #[inline]
    pub fn is_shown(&self) -> bool {
        matches!(self, Popup::Shown { .. })
    }

    pub fn usecase(&self) -> Option<usize> {
        match self {
            Popup::Shown { usecase, .. } => Some(*usecase),
            Popup::Hidden => None,
        }
    }

    pub fn anchor(&self) -> Option<Vec2> {
        match self {
            Popup::Shown { anchor, .. } => Some(*anchor),
            Popup::Hidden => None,
        }
    }
}
