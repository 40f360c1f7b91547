use crate::error::TreeError;
use crate::events::{EventBus, Registration};
use crate::lifecycle::Hook;
use crate::popup::{PopupPlacement, Popups};
use crate::slot::{SlotKey, Slots};
use crate::tree::PresenterTree;
use crate::view::View;
use core::any::Any;
use core::fmt;
use crossbeam::channel::Receiver;
use std::collections::VecDeque;
use uuid::Uuid;

/// A unique identifier for a presenter.
///
/// (this is just a UUID)
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PresenterId(Uuid);

impl PresenterId {
    pub(crate) fn new() -> PresenterId {
        PresenterId(Uuid::new_v4())
    }
}

impl fmt::Debug for PresenterId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "PresenterId({})", self)
    }
}

impl fmt::Display for PresenterId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let simple = self.0.to_simple().to_string();
        write!(f, "presenter#{}", &simple[..8])
    }
}

/// Downcasting support for behaviors.
pub trait AsAny: Any {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }
    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// What a presenter does when its lifecycle changes.
///
/// Every hook receives a [`Context`] through which it may freely mutate the tree, including the
/// presenter’s own slots. While a hook runs, its behavior object is checked out of the tree, so
/// [`PresenterTree::behavior`] returns `None` for that presenter until the hook returns. Hooks
/// triggered for the same presenter in the meantime (say, it gets hidden from inside its own
/// `on_reveal`) are queued and run, in order, right after the running hook returns.
///
/// - `on_reveal` fires before any descendant’s `on_reveal`
/// - `on_hide` fires after every descendant’s `on_hide`
/// - `on_reset` fires before any descendant’s `on_reset`
pub trait Behavior<W>: AsAny + fmt::Debug {
    /// Called once, when the presenter is inserted into a tree.
    fn on_bind(&mut self, cx: &mut Context<W>) {
        drop(cx);
    }

    /// Called when the presenter becomes visible.
    fn on_reveal(&mut self, cx: &mut Context<W>) {
        drop(cx);
    }

    /// Called when the presenter stops being visible.
    fn on_hide(&mut self, cx: &mut Context<W>) {
        drop(cx);
    }

    /// Called when the tree is refreshed without a visibility change.
    fn on_reset(&mut self, cx: &mut Context<W>) {
        drop(cx);
    }

    /// Called once, when the presenter is destroyed.
    fn on_unbind(&mut self, cx: &mut Context<W>) {
        drop(cx);
    }
}

/// For presenters that only compose other presenters.
impl<W> Behavior<W> for () {}

/// Everything needed to create a presenter.
#[derive(Debug)]
pub struct Presenter<W> {
    pub(crate) view: Option<Box<dyn View<W>>>,
    pub(crate) behavior: Box<dyn Behavior<W>>,
    pub(crate) bus: EventBus,
}

impl<W: 'static> Presenter<W> {
    /// A presenter without a view or hooks, connected to the given event bus.
    pub fn new(bus: &EventBus) -> Presenter<W> {
        Presenter {
            view: None,
            behavior: Box::new(()),
            bus: bus.clone(),
        }
    }

    /// Sets the view the presenter owns.
    pub fn with_view<V: View<W> + 'static>(mut self, view: V) -> Presenter<W> {
        self.view = Some(Box::new(view));
        self
    }

    /// Sets the hooks that run when the presenter’s lifecycle changes.
    pub fn with_behavior<B: Behavior<W>>(mut self, behavior: B) -> Presenter<W> {
        self.behavior = Box::new(behavior);
        self
    }
}

/// A node in the presenter tree.
///
/// The parent relationship is deliberately not stored here; see `PresenterTree::parents`.
#[derive(Debug)]
pub(crate) struct PresenterNode<W> {
    /// The behavior; `None` while one of its hooks is running.
    pub(crate) behavior: Option<Box<dyn Behavior<W>>>,
    pub(crate) view: Option<Box<dyn View<W>>>,
    pub(crate) visible: bool,
    pub(crate) bound: bool,
    pub(crate) slots: Slots,
    pub(crate) popups: Popups,
    pub(crate) bus: EventBus,
    /// Removed when the presenter is destroyed.
    pub(crate) registrations: Vec<Registration>,
    /// Removed when the presenter is hidden.
    pub(crate) visible_registrations: Vec<Registration>,
    /// Hooks that fired while the behavior was checked out.
    pub(crate) pending: VecDeque<Hook>,
    /// Destroyed while one of its hooks was running; removed once that hook returns.
    pub(crate) doomed: bool,
}

impl<W> PresenterNode<W> {
    pub(crate) fn new(presenter: Presenter<W>) -> PresenterNode<W> {
        PresenterNode {
            behavior: Some(presenter.behavior),
            view: presenter.view,
            visible: false,
            bound: false,
            slots: Slots::new(),
            popups: Popups::new(),
            bus: presenter.bus,
            registrations: Vec::new(),
            visible_registrations: Vec::new(),
            pending: VecDeque::new(),
            doomed: false,
        }
    }
}

/// A hook’s handle on the tree.
pub struct Context<'a, W> {
    pub(crate) tree: &'a mut PresenterTree<W>,
    pub(crate) id: PresenterId,
}

impl<'a, W: 'static> Context<'a, W> {
    /// The presenter whose hook is running.
    pub fn id(&self) -> PresenterId {
        self.id
    }

    pub fn tree(&mut self) -> &mut PresenterTree<W> {
        &mut *self.tree
    }

    pub fn is_visible(&self) -> bool {
        self.tree.is_visible(self.id)
    }

    /// The presenter’s own view.
    pub fn view_mut(&mut self) -> Option<&mut (dyn View<W> + 'static)> {
        self.tree.view_mut(self.id)
    }

    /// Publishes an event on the presenter’s bus.
    pub fn fire_event<E: Clone + Send + 'static>(&self, event: E) -> usize {
        self.tree.bus(self.id).map_or(0, |bus| bus.publish(event))
    }

    /// Subscribes to events for as long as the presenter exists.
    pub fn subscribe<E: Clone + Send + 'static>(&mut self) -> Option<Receiver<E>> {
        let node = self.tree.nodes.get_mut(&self.id)?;
        let (receiver, registration) = node.bus.subscribe::<E>().into_parts();
        node.registrations.push(registration);
        Some(receiver)
    }

    /// Subscribes to events until the presenter is next hidden.
    ///
    /// Typically called from `on_reveal`.
    pub fn subscribe_while_visible<E: Clone + Send + 'static>(&mut self) -> Option<Receiver<E>> {
        let node = self.tree.nodes.get_mut(&self.id)?;
        let (receiver, registration) = node.bus.subscribe::<E>().into_parts();
        node.visible_registrations.push(registration);
        Some(receiver)
    }

    pub fn set_in_slot(
        &mut self,
        key: SlotKey,
        child: Option<PresenterId>,
    ) -> Result<(), TreeError> {
        self.tree.set_in_slot(self.id, key, child)
    }

    pub fn add_to_slot(&mut self, key: SlotKey, child: PresenterId) -> Result<(), TreeError> {
        self.tree.add_to_slot(self.id, key, child)
    }

    pub fn remove_from_slot(&mut self, key: SlotKey, child: PresenterId) -> Result<(), TreeError> {
        self.tree.remove_from_slot(self.id, key, child)
    }

    pub fn clear_slot(&mut self, key: SlotKey) -> Result<(), TreeError> {
        self.tree.clear_slot(self.id, key)
    }

    pub fn add_to_popup_slot(
        &mut self,
        child: PresenterId,
        placement: PopupPlacement,
    ) -> Result<(), TreeError> {
        self.tree.add_to_popup_slot_with(self.id, child, placement)
    }

    pub fn remove_from_popup_slot(&mut self, child: PresenterId) -> Result<(), TreeError> {
        self.tree.remove_from_popup_slot(self.id, child)
    }
}
