use crate::config::Config;
use crate::error::TreeError;
use crate::events::EventBus;
use crate::lifecycle::Hook;
use crate::popup::PopupPlacement;
use crate::presenter::{AsAny, Behavior, Context, Presenter, PresenterId, PresenterNode};
use crate::slot::SlotKey;
use crate::view::View;
use std::collections::HashMap;

/// Where a presenter sits in its parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Occupancy {
    /// In one of the parent’s named slots.
    Slot { parent: PresenterId, key: SlotKey },
    /// In the parent’s popup list.
    Popup { parent: PresenterId },
}

impl Occupancy {
    pub fn parent(&self) -> PresenterId {
        match *self {
            Occupancy::Slot { parent, .. } | Occupancy::Popup { parent } => parent,
        }
    }
}

/// A tree of presenters.
///
/// The tree owns every presenter inserted into it; presenters are addressed by [`PresenterId`].
/// A presenter occupies at most one slot or popup list of at most one parent at a time, and
/// putting it somewhere new always takes it out of where it was first.
#[derive(Debug)]
pub struct PresenterTree<W> {
    config: Config,
    pub(crate) nodes: HashMap<PresenterId, PresenterNode<W>>,
    /// The parent of each attached presenter.
    ///
    /// This is a lookup, not ownership: an entry exists exactly while the child is listed in the
    /// parent’s slots or popups, and is removed in the same step that unlists it.
    pub(crate) parents: HashMap<PresenterId, Occupancy>,
}

impl<W: 'static> Default for PresenterTree<W> {
    fn default() -> Self {
        PresenterTree::new()
    }
}

impl<W: 'static> PresenterTree<W> {
    /// Creates an empty tree with the default (lenient) configuration.
    pub fn new() -> PresenterTree<W> {
        PresenterTree::with_config(Config::default())
    }

    /// Creates an empty tree with the given configuration.
    pub fn with_config(config: Config) -> PresenterTree<W> {
        PresenterTree {
            config,
            nodes: HashMap::new(),
            parents: HashMap::new(),
        }
    }

    /// Returns the configuration the tree was created with.
    pub fn config(&self) -> Config {
        self.config
    }

    /// Adds a presenter to the tree and binds it.
    ///
    /// The new presenter is hidden, has no parent, and its slots and popups are empty.
    pub fn insert(&mut self, presenter: Presenter<W>) -> PresenterId {
        let id = PresenterId::new();
        self.nodes.insert(id, PresenterNode::new(presenter));
        log::debug!("inserted {}", id);
        self.bind(id);
        id
    }

    /// Removes a presenter from the tree.
    ///
    /// The presenter is detached from its parent (and hidden, if it was visible). Its children are
    /// not destroyed: they become hidden, parentless presenters that may be attached elsewhere.
    /// Finally `on_unbind` fires and all of its event registrations are removed.
    ///
    /// A presenter destroyed from inside one of its own hooks stops being part of the tree right
    /// away, but its remaining hooks (including `on_unbind`) run once the running hook returns.
    pub fn destroy(&mut self, id: PresenterId) -> Result<(), TreeError> {
        self.node(id)?;

        if self.parents.contains_key(&id) {
            self.detach(id);
        } else {
            self.hide(id);
        }

        let (children, popups) = match self.nodes.get(&id) {
            Some(node) => (node.slots.snapshot(), node.popups.snapshot()),
            None => return Ok(()),
        };
        for child in children.into_iter().chain(popups) {
            if self.parent(child) == Some(id) {
                self.parents.remove(&child);
                log::debug!("orphaned {}", child);
            }
        }

        self.unbind(id);
        let running = self
            .nodes
            .get(&id)
            .map_or(false, |node| node.behavior.is_none());
        if running {
            if let Some(node) = self.nodes.get_mut(&id) {
                node.doomed = true;
            }
            log::debug!("destroying {} once its running hook returns", id);
        } else {
            self.nodes.remove(&id);
            log::debug!("destroyed {}", id);
        }
        Ok(())
    }

    pub fn contains(&self, id: PresenterId) -> bool {
        self.node(id).is_ok()
    }

    /// Number of presenters in the tree.
    pub fn len(&self) -> usize {
        self.nodes.values().filter(|node| !node.doomed).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub(crate) fn node(&self, id: PresenterId) -> Result<&PresenterNode<W>, TreeError> {
        self.nodes
            .get(&id)
            .filter(|node| !node.doomed)
            .ok_or(TreeError::NoSuchPresenter(id))
    }

    pub(crate) fn node_mut(
        &mut self,
        id: PresenterId,
    ) -> Result<&mut PresenterNode<W>, TreeError> {
        self.nodes
            .get_mut(&id)
            .filter(|node| !node.doomed)
            .ok_or(TreeError::NoSuchPresenter(id))
    }

    /// Whether the presenter is visible. Unknown presenters are not.
    pub fn is_visible(&self, id: PresenterId) -> bool {
        self.nodes.get(&id).map_or(false, |node| node.visible)
    }

    pub fn is_bound(&self, id: PresenterId) -> bool {
        self.nodes.get(&id).map_or(false, |node| node.bound)
    }

    pub fn parent(&self, id: PresenterId) -> Option<PresenterId> {
        self.parents.get(&id).map(Occupancy::parent)
    }

    pub fn occupancy(&self, id: PresenterId) -> Option<Occupancy> {
        self.parents.get(&id).copied()
    }

    /// Returns the topmost ancestor (which is the presenter itself if it has no parent).
    pub fn root_of(&self, id: PresenterId) -> PresenterId {
        let mut current = id;
        while let Some(parent) = self.parent(current) {
            current = parent;
        }
        current
    }

    /// The occupants of a slot, in insertion order. Unknown keys and presenters read as empty.
    pub fn slot_children(&self, id: PresenterId, key: SlotKey) -> Vec<PresenterId> {
        self.nodes
            .get(&id)
            .map_or_else(Vec::new, |node| node.slots.children(key).to_vec())
    }

    /// Every slot key the presenter has used, in first-use order.
    pub fn slot_keys(&self, id: PresenterId) -> Vec<SlotKey> {
        self.nodes
            .get(&id)
            .map_or_else(Vec::new, |node| node.slots.keys())
    }

    /// The presenter’s popups, in insertion order.
    pub fn popup_children(&self, id: PresenterId) -> Vec<PresenterId> {
        self.nodes
            .get(&id)
            .map_or_else(Vec::new, |node| node.popups.snapshot())
    }

    /// The placement a popup was added with.
    pub fn popup_placement(&self, id: PresenterId) -> Option<PopupPlacement> {
        match self.occupancy(id)? {
            Occupancy::Popup { parent } => self.nodes.get(&parent)?.popups.placement(id),
            Occupancy::Slot { .. } => None,
        }
    }

    /// Returns the presenter’s behavior if it is of type `T`.
    ///
    /// Returns `None` while one of the presenter’s own hooks is running.
    pub fn behavior<T: Behavior<W>>(&self, id: PresenterId) -> Option<&T> {
        let behavior = self.nodes.get(&id)?.behavior.as_ref()?;
        AsAny::as_any(&**behavior).downcast_ref()
    }

    pub fn behavior_mut<T: Behavior<W>>(&mut self, id: PresenterId) -> Option<&mut T> {
        let behavior = self.nodes.get_mut(&id)?.behavior.as_mut()?;
        AsAny::as_any_mut(&mut **behavior).downcast_mut()
    }

    pub fn view_mut(&mut self, id: PresenterId) -> Option<&mut (dyn View<W> + 'static)> {
        self.nodes.get_mut(&id)?.view.as_deref_mut()
    }

    /// The event bus the presenter was created with.
    pub fn bus(&self, id: PresenterId) -> Option<&EventBus> {
        self.nodes.get(&id).map(|node| &node.bus)
    }

    fn widget(&self, id: PresenterId) -> Option<W> {
        self.nodes.get(&id)?.view.as_ref().map(|view| view.as_widget())
    }

    pub(crate) fn is_slot_child_of(&self, child: PresenterId, parent: PresenterId) -> bool {
        match self.parents.get(&child) {
            Some(Occupancy::Slot { parent: p, .. }) => *p == parent,
            _ => false,
        }
    }

    pub(crate) fn is_popup_of(&self, child: PresenterId, parent: PresenterId) -> bool {
        self.parents.get(&child) == Some(&Occupancy::Popup { parent })
    }

    pub(crate) fn slot_children_of(&self, parent: PresenterId) -> Vec<PresenterId> {
        let children = match self.nodes.get(&parent) {
            Some(node) => node.slots.snapshot(),
            None => return Vec::new(),
        };
        children
            .into_iter()
            .filter(|child| self.is_slot_child_of(*child, parent))
            .collect()
    }

    pub(crate) fn popups_of(&self, parent: PresenterId) -> Vec<PresenterId> {
        let popups = match self.nodes.get(&parent) {
            Some(node) => node.popups.snapshot(),
            None => return Vec::new(),
        };
        popups
            .into_iter()
            .filter(|popup| self.is_popup_of(*popup, parent))
            .collect()
    }

    /// Checks that `child` may be placed inside `parent`.
    fn check_adoption(&self, parent: PresenterId, child: PresenterId) -> Result<(), TreeError> {
        self.node(parent)?;
        self.node(child)?;
        let mut current = Some(parent);
        while let Some(id) = current {
            if id == child {
                return Err(TreeError::OwnershipViolation(parent, child));
            }
            current = self.parent(id);
        }
        Ok(())
    }

    /// Prepares a presenter for being placed somewhere new: takes it out of wherever it is and
    /// makes sure it is hidden.
    fn release(&mut self, child: PresenterId) {
        if self.parents.contains_key(&child) {
            self.detach(child);
        }
        // a visible root, or a child that one of the hooks above re-attached
        if self.is_visible(child) {
            self.hide(child);
        }
    }

    /// Takes a child out of its parent.
    ///
    /// A visible child is hidden first, so the parent view never holds a widget that still
    /// thinks it is on screen. A popup’s view is hidden along with it.
    pub(crate) fn detach(&mut self, child: PresenterId) {
        let occupancy = match self.occupancy(child) {
            Some(occupancy) => occupancy,
            None => return,
        };

        if self.is_visible(child) {
            self.hide(child);
        }

        // a hook may have moved the child while it was being hidden
        if self.occupancy(child) != Some(occupancy) {
            return;
        }
        self.unlink(child, occupancy);
        log::debug!("detached {} from {}", child, occupancy.parent());

        if let Occupancy::Slot { parent, key } = occupancy {
            if let Some(widget) = self.widget(child) {
                if let Some(view) = self.view_mut(parent) {
                    view.remove_child(key, widget);
                }
            }
        }
    }

    /// Removes a child from its parent’s registries and from the parent index.
    fn unlink(&mut self, child: PresenterId, occupancy: Occupancy) {
        self.parents.remove(&child);
        if let Some(node) = self.nodes.get_mut(&occupancy.parent()) {
            match occupancy {
                Occupancy::Slot { key, .. } => {
                    node.slots.remove(key, child);
                }
                Occupancy::Popup { .. } => {
                    node.popups.remove(child);
                }
            }
        }
    }

    /// Replaces the content of a slot with a single child, or empties it.
    ///
    /// Previous occupants are hidden (if the parent is visible) and detached. If the child
    /// already is the only occupant, nothing happens. Otherwise it is taken out of wherever it
    /// was, put in the slot, and revealed if the parent is visible.
    pub fn set_in_slot(
        &mut self,
        parent: PresenterId,
        key: SlotKey,
        child: Option<PresenterId>,
    ) -> Result<(), TreeError> {
        let child = match child {
            Some(child) => child,
            None => return self.clear_slot(parent, key),
        };
        self.check_adoption(parent, child)?;

        let node = self.node(parent)?;
        if node.slots.is_sole_occupant(key, child) {
            return Ok(());
        }
        if !node.slots.contains(key, child) {
            self.release(child);
        }

        self.evict(parent, key, Some(child));

        // hooks run above may have removed the parent or moved the child
        if !self.contains(parent) {
            return Err(TreeError::NoSuchPresenter(parent));
        }
        match self.occupancy(child) {
            Some(occupancy) if occupancy == (Occupancy::Slot { parent, key }) => (),
            Some(_) => self.release(child),
            None => (),
        }
        self.evict(parent, key, None);

        let widget = self.widget(child);
        self.node_mut(parent)?.slots.push(key, child);
        self.parents
            .insert(child, Occupancy::Slot { parent, key });
        log::debug!("set {} in {} of {}", child, key, parent);

        if let Some(view) = self.view_mut(parent) {
            view.set_single_child(key, widget);
        }
        if self.is_visible(parent) {
            self.reveal(child);
        }
        Ok(())
    }

    /// Like `set_in_slot`, but also resets the whole tree the parent belongs to if the parent is
    /// visible, so that every presenter on screen can refresh itself.
    pub fn set_in_slot_and_reset(
        &mut self,
        parent: PresenterId,
        key: SlotKey,
        child: Option<PresenterId>,
    ) -> Result<(), TreeError> {
        self.set_in_slot(parent, key, child)?;
        if self.is_visible(parent) {
            let root = self.root_of(parent);
            self.reset(root);
        }
        Ok(())
    }

    /// Appends a child to a slot.
    ///
    /// The child is taken out of wherever it was first. Adding a child to the slot it already
    /// occupies does nothing.
    pub fn add_to_slot(
        &mut self,
        parent: PresenterId,
        key: SlotKey,
        child: PresenterId,
    ) -> Result<(), TreeError> {
        self.check_adoption(parent, child)?;
        if self.node(parent)?.slots.contains(key, child) {
            return Ok(());
        }
        self.release(child);

        let widget = self.widget(child);
        self.node_mut(parent)?.slots.push(key, child);
        self.parents
            .insert(child, Occupancy::Slot { parent, key });
        log::debug!("added {} to {} of {}", child, key, parent);

        if let (Some(widget), Some(view)) = (widget, self.view_mut(parent)) {
            view.append_child(key, widget);
        }
        if self.is_visible(parent) {
            self.reveal(child);
        }
        Ok(())
    }

    /// Removes a child from a slot, hiding it first if it is visible.
    pub fn remove_from_slot(
        &mut self,
        parent: PresenterId,
        key: SlotKey,
        child: PresenterId,
    ) -> Result<(), TreeError> {
        self.node(parent)?;
        if self.occupancy(child) != Some(Occupancy::Slot { parent, key }) {
            return self.missing(TreeError::NotInSlot { parent, key, child });
        }
        self.detach(child);
        Ok(())
    }

    /// Empties a slot without touching the view, hiding every occupant except `keep`.
    fn evict(&mut self, parent: PresenterId, key: SlotKey, keep: Option<PresenterId>) {
        let occupants = match self.nodes.get_mut(&parent) {
            Some(node) => node.slots.take(key),
            None => return,
        };
        for occupant in occupants {
            if Some(occupant) == keep {
                continue;
            }
            if self.is_visible(occupant) {
                self.hide(occupant);
            }
            if self.occupancy(occupant) == Some(Occupancy::Slot { parent, key }) {
                self.parents.remove(&occupant);
            }
        }
    }

    /// Removes every occupant of a slot.
    ///
    /// Visible occupants are hidden first. The view is told to empty the slot even if it was
    /// already empty.
    pub fn clear_slot(&mut self, parent: PresenterId, key: SlotKey) -> Result<(), TreeError> {
        self.node(parent)?;
        self.evict(parent, key, None);
        log::debug!("cleared {} of {}", key, parent);

        if let Some(view) = self.view_mut(parent) {
            view.clear_children(key);
        }
        Ok(())
    }

    /// Adds a popup, centered or left where its view puts it.
    pub fn add_to_popup_slot(
        &mut self,
        parent: PresenterId,
        child: PresenterId,
        centered: bool,
    ) -> Result<(), TreeError> {
        self.add_to_popup_slot_with(parent, child, PopupPlacement::from(centered))
    }

    /// Adds a popup.
    ///
    /// The child is taken out of wherever it was first, then placed. If the parent is visible
    /// the popup view is shown and the child revealed; otherwise that happens when the parent is
    /// next revealed. Adding a popup the parent already has does nothing.
    pub fn add_to_popup_slot_with(
        &mut self,
        parent: PresenterId,
        child: PresenterId,
        placement: PopupPlacement,
    ) -> Result<(), TreeError> {
        self.check_adoption(parent, child)?;
        if self.node(parent)?.popups.contains(child) {
            return Ok(());
        }
        self.release(child);

        self.node_mut(parent)?.popups.push(child, placement);
        self.parents.insert(child, Occupancy::Popup { parent });
        log::debug!("added popup {} to {} ({:?})", child, parent, placement);

        if let Some(view) = self.view_mut(child) {
            placement.apply(view);
        }
        if self.is_visible(parent) {
            self.reveal(child);
        }
        Ok(())
    }

    /// Removes a popup, hiding it first if it is visible.
    pub fn remove_from_popup_slot(
        &mut self,
        parent: PresenterId,
        child: PresenterId,
    ) -> Result<(), TreeError> {
        self.node(parent)?;
        if !self.is_popup_of(child, parent) {
            return self.missing(TreeError::NotInPopupSlot { parent, child });
        }
        self.detach(child);
        Ok(())
    }

    /// Handles a popup that closed itself (e.g. auto-hide on an outside click).
    ///
    /// The popup is removed from its parent and its presenters are hidden, but its view is not
    /// told to hide again. Presenters that are not popups are left alone.
    pub fn close_popup(&mut self, child: PresenterId) -> Result<(), TreeError> {
        self.node(child)?;
        let parent = match self.occupancy(child) {
            Some(Occupancy::Popup { parent }) => parent,
            _ => {
                log::debug!("{} closed but is not a popup", child);
                return Ok(());
            }
        };

        // the view is already gone from the screen
        if let Some(node) = self.nodes.get_mut(&parent) {
            node.popups.set_shown(child, false);
        }
        self.hide(child);
        if self.is_popup_of(child, parent) {
            self.unlink(child, Occupancy::Popup { parent });
            log::debug!("popup {} of {} closed", child, parent);
        }
        Ok(())
    }

    /// Takes a presenter out of whatever slot or popup list holds it.
    pub fn remove_from_parent_slot(&mut self, child: PresenterId) -> Result<(), TreeError> {
        self.node(child)?;
        self.detach(child);
        Ok(())
    }

    /// Reports a removal of something that wasn’t there.
    fn missing(&self, err: TreeError) -> Result<(), TreeError> {
        if self.config.strict {
            Err(err)
        } else {
            log::warn!("ignoring removal: {}", err);
            Ok(())
        }
    }

    /// Runs one of a presenter’s hooks.
    ///
    /// If one of its hooks is already running further up the stack, the hook is queued instead
    /// and runs right after that one returns.
    pub(crate) fn call_hook(&mut self, id: PresenterId, hook: Hook) {
        let node = match self.nodes.get_mut(&id) {
            Some(node) => node,
            None => return,
        };
        // check the behavior out so the hook can borrow the tree
        let mut behavior = match node.behavior.take() {
            Some(behavior) => behavior,
            None => {
                node.pending.push_back(hook);
                return;
            }
        };

        let mut next = Some(hook);
        while let Some(hook) = next {
            {
                let mut cx = Context {
                    tree: &mut *self,
                    id,
                };
                hook.dispatch(&mut *behavior, &mut cx);
            }
            next = self
                .nodes
                .get_mut(&id)
                .and_then(|node| node.pending.pop_front());
        }

        let doomed = self.nodes.get(&id).map_or(true, |node| node.doomed);
        if doomed {
            self.nodes.remove(&id);
            log::debug!("destroyed {} after its {:?} hook returned", id, hook);
        } else if let Some(node) = self.nodes.get_mut(&id) {
            node.behavior = Some(behavior);
        }
    }
}
