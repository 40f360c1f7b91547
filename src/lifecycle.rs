//! Reveal, hide and reset propagation.
//!
//! Each pass snapshots the children it is about to visit, because hooks may rearrange the tree
//! while the pass runs. A child that was moved away from the presenter being visited is skipped,
//! and a reveal pass stops early if something hid the presenter in the meantime (and vice versa).

use crate::presenter::{Behavior, Context, PresenterId};
use crate::tree::{Occupancy, PresenterTree};

/// One of the hooks of [`Behavior`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Hook {
    Bind,
    Reveal,
    Hide,
    Reset,
    Unbind,
}

impl Hook {
    pub(crate) fn dispatch<W: 'static>(
        self,
        behavior: &mut dyn Behavior<W>,
        cx: &mut Context<W>,
    ) {
        match self {
            Hook::Bind => behavior.on_bind(cx),
            Hook::Reveal => behavior.on_reveal(cx),
            Hook::Hide => behavior.on_hide(cx),
            Hook::Reset => behavior.on_reset(cx),
            Hook::Unbind => behavior.on_unbind(cx),
        }
    }
}

impl<W: 'static> PresenterTree<W> {
    /// Makes a presenter and everything attached to it visible.
    ///
    /// Does nothing if the presenter is already visible. Otherwise, if it is a popup, its view is
    /// shown; then `on_reveal` fires, every slot child is revealed (slots in first-use order,
    /// children in insertion order), and finally every popup.
    pub fn reveal(&mut self, id: PresenterId) {
        match self.nodes.get_mut(&id) {
            Some(node) if !node.visible && !node.doomed => node.visible = true,
            _ => return,
        }
        log::trace!("reveal {}", id);
        self.sync_popup_view(id, true);
        self.call_hook(id, Hook::Reveal);

        for child in self.slot_children_of(id) {
            if !self.is_visible(id) {
                return;
            }
            if self.is_slot_child_of(child, id) {
                self.reveal(child);
            }
        }
        for popup in self.popups_of(id) {
            if !self.is_visible(id) {
                return;
            }
            if self.is_popup_of(popup, id) {
                self.reveal(popup);
            }
        }
    }

    /// Hides a presenter and everything attached to it.
    ///
    /// Does nothing if the presenter is already hidden. Otherwise popups are hidden first, then
    /// slot children, and only then does the presenter’s own `on_hide` fire. Last, event
    /// registrations made with `subscribe_while_visible` are dropped and, if the presenter is a
    /// popup, its view is hidden.
    pub fn hide(&mut self, id: PresenterId) {
        match self.nodes.get_mut(&id) {
            Some(node) if node.visible => node.visible = false,
            _ => return,
        }
        log::trace!("hide {}", id);

        // a hook may reveal this presenter again; the rest of the pass is moot then, but the
        // transition to hidden did happen and still gets its hook
        for popup in self.popups_of(id) {
            if self.is_visible(id) {
                break;
            }
            if self.is_popup_of(popup, id) {
                self.hide(popup);
            }
        }
        for child in self.slot_children_of(id) {
            if self.is_visible(id) {
                break;
            }
            if self.is_slot_child_of(child, id) {
                self.hide(child);
            }
        }

        self.call_hook(id, Hook::Hide);
        if self.is_visible(id) {
            return;
        }
        if let Some(node) = self.nodes.get_mut(&id) {
            node.visible_registrations.clear();
        }
        self.sync_popup_view(id, false);
    }

    /// Shows or hides the view of a popup so it matches the popup’s visibility.
    ///
    /// Each popup entry remembers whether its view is shown, so the view never gets two `show`s
    /// or two `hide`s in a row.
    fn sync_popup_view(&mut self, id: PresenterId, shown: bool) {
        let parent = match self.occupancy(id) {
            Some(Occupancy::Popup { parent }) => parent,
            _ => return,
        };
        let changed = self
            .nodes
            .get_mut(&parent)
            .map_or(false, |node| node.popups.set_shown(id, shown));
        if !changed {
            return;
        }
        if let Some(view) = self.view_mut(id) {
            if shown {
                view.show();
            } else {
                view.hide();
            }
        }
    }

    /// Lets a presenter and everything attached to it refresh itself.
    ///
    /// `on_reset` fires parent first, over slot children and then popups, whether or not they
    /// are visible. Visibility is not changed.
    pub fn reset(&mut self, id: PresenterId) {
        if !self.contains(id) {
            return;
        }
        log::trace!("reset {}", id);
        self.call_hook(id, Hook::Reset);

        for child in self.slot_children_of(id) {
            if self.is_slot_child_of(child, id) {
                self.reset(child);
            }
        }
        for popup in self.popups_of(id) {
            if self.is_popup_of(popup, id) {
                self.reset(popup);
            }
        }
    }

    pub(crate) fn bind(&mut self, id: PresenterId) {
        match self.nodes.get_mut(&id) {
            Some(node) if !node.bound => node.bound = true,
            _ => return,
        }
        log::trace!("bind {}", id);
        self.call_hook(id, Hook::Bind);
    }

    pub(crate) fn unbind(&mut self, id: PresenterId) {
        match self.nodes.get(&id) {
            Some(node) if node.bound => (),
            _ => return,
        }
        log::trace!("unbind {}", id);
        self.call_hook(id, Hook::Unbind);

        if let Some(node) = self.nodes.get_mut(&id) {
            node.bound = false;
            node.registrations.clear();
            node.visible_registrations.clear();
        }
    }
}
