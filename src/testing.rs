//! Recording views and spy behaviors for tests.

use crate::events::EventBus;
use crate::presenter::{Behavior, Context, Presenter, PresenterId};
use crate::slot::SlotKey;
use crate::tree::PresenterTree;
use crate::view::View;
use cgmath::Point2;
use core::fmt;
use parking_lot::Mutex;
use std::mem;
use std::sync::Arc;

pub type Widget = &'static str;

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// A call received by a [`RecordingView`].
#[derive(Debug, Clone, PartialEq)]
pub enum ViewCall {
    SetSingleChild(SlotKey, Option<Widget>),
    AppendChild(SlotKey, Widget),
    RemoveChild(SlotKey, Widget),
    Show,
    Hide,
    Center,
    SetPosition(Point2<f64>),
}

/// Shared handle on the calls a view received.
#[derive(Debug, Clone, Default)]
pub struct ViewLog(Arc<Mutex<Vec<ViewCall>>>);

impl ViewLog {
    pub fn calls(&self) -> Vec<ViewCall> {
        self.0.lock().clone()
    }

    pub fn count(&self, call: &ViewCall) -> usize {
        self.0.lock().iter().filter(|c| *c == call).count()
    }

    fn push(&self, call: ViewCall) {
        self.0.lock().push(call);
    }
}

/// A view whose widget is its name.
#[derive(Debug)]
pub struct RecordingView {
    name: Widget,
    log: ViewLog,
}

impl RecordingView {
    pub fn new(name: Widget) -> (RecordingView, ViewLog) {
        let log = ViewLog::default();
        (
            RecordingView {
                name,
                log: log.clone(),
            },
            log,
        )
    }
}

impl View<Widget> for RecordingView {
    fn as_widget(&self) -> Widget {
        self.name
    }

    fn set_single_child(&mut self, key: SlotKey, child: Option<Widget>) {
        self.log.push(ViewCall::SetSingleChild(key, child));
    }

    fn append_child(&mut self, key: SlotKey, child: Widget) {
        self.log.push(ViewCall::AppendChild(key, child));
    }

    fn remove_child(&mut self, key: SlotKey, child: Widget) {
        self.log.push(ViewCall::RemoveChild(key, child));
    }

    fn show(&mut self) {
        self.log.push(ViewCall::Show);
    }

    fn hide(&mut self) {
        self.log.push(ViewCall::Hide);
    }

    fn center(&mut self) {
        self.log.push(ViewCall::Center);
    }

    fn set_position(&mut self, position: Point2<f64>) {
        self.log.push(ViewCall::SetPosition(position));
    }
}

/// Hook entries shared between several spies, e.g. `"reveal a"`.
#[derive(Debug, Clone, Default)]
pub struct Journal(Arc<Mutex<Vec<String>>>);

impl Journal {
    pub fn new() -> Journal {
        Journal::default()
    }

    /// Returns the entries so far and clears the journal.
    pub fn take(&self) -> Vec<String> {
        mem::replace(&mut *self.0.lock(), Vec::new())
    }

    fn record(&self, hook: &str, name: &str) {
        self.0.lock().push(format!("{} {}", hook, name));
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SpyCounts {
    pub binds: usize,
    pub reveals: usize,
    pub hides: usize,
    pub resets: usize,
    pub unbinds: usize,
}

type HookFn = Box<dyn FnMut(&mut Context<Widget>)>;

/// A behavior that counts its hooks.
pub struct Spy {
    name: Widget,
    counts: SpyCounts,
    journal: Journal,
    on_reveal: Option<HookFn>,
    on_hide: Option<HookFn>,
}

impl Spy {
    pub fn new(name: Widget) -> Spy {
        Spy {
            name,
            counts: SpyCounts::default(),
            journal: Journal::new(),
            on_reveal: None,
            on_hide: None,
        }
    }

    pub fn journal(mut self, journal: &Journal) -> Spy {
        self.journal = journal.clone();
        self
    }

    pub fn on_reveal(mut self, f: impl FnMut(&mut Context<Widget>) + 'static) -> Spy {
        self.on_reveal = Some(Box::new(f));
        self
    }

    pub fn on_hide(mut self, f: impl FnMut(&mut Context<Widget>) + 'static) -> Spy {
        self.on_hide = Some(Box::new(f));
        self
    }

    pub fn counts(&self) -> SpyCounts {
        self.counts
    }
}

impl fmt::Debug for Spy {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Spy")
            .field("name", &self.name)
            .field("counts", &self.counts)
            .finish()
    }
}

impl Behavior<Widget> for Spy {
    fn on_bind(&mut self, _: &mut Context<Widget>) {
        self.counts.binds += 1;
        self.journal.record("bind", self.name);
    }

    fn on_reveal(&mut self, cx: &mut Context<Widget>) {
        self.counts.reveals += 1;
        self.journal.record("reveal", self.name);
        if let Some(f) = &mut self.on_reveal {
            f(cx);
        }
    }

    fn on_hide(&mut self, cx: &mut Context<Widget>) {
        self.counts.hides += 1;
        self.journal.record("hide", self.name);
        if let Some(f) = &mut self.on_hide {
            f(cx);
        }
    }

    fn on_reset(&mut self, _: &mut Context<Widget>) {
        self.counts.resets += 1;
        self.journal.record("reset", self.name);
    }

    fn on_unbind(&mut self, _: &mut Context<Widget>) {
        self.counts.unbinds += 1;
        self.journal.record("unbind", self.name);
    }
}

/// Inserts a presenter with a recording view and the given spy.
pub fn spawn_spy(
    tree: &mut PresenterTree<Widget>,
    bus: &EventBus,
    spy: Spy,
) -> (PresenterId, ViewLog) {
    let (view, log) = RecordingView::new(spy.name);
    let id = tree.insert(Presenter::new(bus).with_view(view).with_behavior(spy));
    (id, log)
}

/// Inserts a presenter with a recording view and a plain spy.
pub fn spawn(
    tree: &mut PresenterTree<Widget>,
    bus: &EventBus,
    name: Widget,
) -> (PresenterId, ViewLog) {
    spawn_spy(tree, bus, Spy::new(name))
}

/// The hook counts of a presenter spawned with [`spawn`] or [`spawn_spy`].
pub fn spy(tree: &PresenterTree<Widget>, id: PresenterId) -> SpyCounts {
    tree.behavior::<Spy>(id)
        .map(Spy::counts)
        .unwrap_or_else(|| panic!("{} has no spy", id))
}
