//! Popup children.
//!
//! Popups are overlays owned by a presenter but not placed in any of its slots. The owner shows
//! and hides their views itself, since there is no enclosing slot that would render them.

use crate::presenter::PresenterId;
use crate::view::View;
use cgmath::Point2;

/// Where a popup is placed when it is added.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PopupPlacement {
    /// Centered in the viewport, once, when added.
    Centered,
    /// Left wherever the view puts it.
    Unchanged,
    /// Moved to an absolute position, once, when added.
    At(Point2<f64>),
}

impl Default for PopupPlacement {
    fn default() -> Self {
        PopupPlacement::Centered
    }
}

impl From<bool> for PopupPlacement {
    /// `true` means centered.
    fn from(centered: bool) -> Self {
        if centered {
            PopupPlacement::Centered
        } else {
            PopupPlacement::Unchanged
        }
    }
}

impl PopupPlacement {
    pub fn is_centered(&self) -> bool {
        *self == PopupPlacement::Centered
    }

    /// Applies the placement to a popup view.
    pub(crate) fn apply<W>(&self, view: &mut dyn View<W>) {
        match *self {
            PopupPlacement::Centered => view.center(),
            PopupPlacement::Unchanged => (),
            PopupPlacement::At(position) => view.set_position(position),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct PopupEntry {
    pub(crate) id: PresenterId,
    pub(crate) placement: PopupPlacement,
    /// Whether the popup’s view was last told to show.
    pub(crate) shown: bool,
}

/// Popup children of a single presenter, in insertion order.
#[derive(Debug, Default, Clone)]
pub(crate) struct Popups {
    entries: Vec<PopupEntry>,
}

impl Popups {
    pub(crate) fn new() -> Popups {
        Popups::default()
    }

    pub(crate) fn contains(&self, id: PresenterId) -> bool {
        self.entries.iter().any(|entry| entry.id == id)
    }

    pub(crate) fn push(&mut self, id: PresenterId, placement: PopupPlacement) {
        debug_assert!(!self.contains(id), "popup added twice");
        self.entries.push(PopupEntry {
            id,
            placement,
            shown: false,
        });
    }

    /// Removes a popup. Returns its entry if it was there.
    pub(crate) fn remove(&mut self, id: PresenterId) -> Option<PopupEntry> {
        let pos = self.entries.iter().position(|entry| entry.id == id)?;
        Some(self.entries.remove(pos))
    }

    /// Popup ids in insertion order.
    pub(crate) fn snapshot(&self) -> Vec<PresenterId> {
        self.entries.iter().map(|entry| entry.id).collect()
    }

    /// Records whether the popup’s view is shown. Returns true if that changed.
    pub(crate) fn set_shown(&mut self, id: PresenterId, shown: bool) -> bool {
        match self.entries.iter_mut().find(|entry| entry.id == id) {
            Some(entry) if entry.shown != shown => {
                entry.shown = shown;
                true
            }
            _ => false,
        }
    }

    pub(crate) fn placement(&self, id: PresenterId) -> Option<PopupPlacement> {
        self.entries
            .iter()
            .find(|entry| entry.id == id)
            .map(|entry| entry.placement)
    }
}
