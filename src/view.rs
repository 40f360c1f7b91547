use crate::rect::Rect;
use crate::slot::SlotKey;
use cgmath::{Point2, Vector2};
use core::fmt;

/// The rendering side of a presenter.
///
/// A view owns whatever the platform uses to put things on screen. The presenter tree never
/// looks inside it; it only tells the view which child widgets belong in which slot and, for
/// popups, when to show, hide and place itself. `W` is the widget handle type that parents embed
/// (for example a DOM node reference or a retained-mode widget id).
///
/// Call order guarantees:
/// - a detached child is hidden (lifecycle-wise) before its widget is removed from the parent view
/// - a popup view receives `center` (when requested) before its first `show`
/// - a popup view never receives two `show`s without a `hide` in between
pub trait View<W>: fmt::Debug {
    /// Returns the widget handle that a parent view embeds in its slots.
    fn as_widget(&self) -> W;

    /// Replaces the content of a slot with a single widget, or empties it.
    fn set_single_child(&mut self, key: SlotKey, child: Option<W>) {
        drop(key);
        drop(child);
    }

    /// Appends a widget to a slot.
    fn append_child(&mut self, key: SlotKey, child: W) {
        drop(key);
        drop(child);
    }

    /// Removes a widget from a slot.
    fn remove_child(&mut self, key: SlotKey, child: W) {
        drop(key);
        drop(child);
    }

    /// Empties a slot. Defaults to `set_single_child(key, None)`.
    fn clear_children(&mut self, key: SlotKey) {
        self.set_single_child(key, None);
    }

    /// Shows this view as a popup.
    fn show(&mut self) {}

    /// Hides this view as a popup.
    fn hide(&mut self) {}

    /// Centers this view as a popup.
    ///
    /// The default implementation centers the size reported by `placement_bounds` within its
    /// viewport and moves the view there. Views that don’t report bounds are left alone.
    fn center(&mut self) {
        if let Some((viewport, size)) = self.placement_bounds() {
            self.set_position(viewport.centered(size).origin);
        }
    }

    /// Moves this view, as a popup, to an absolute position.
    fn set_position(&mut self, position: Point2<f64>) {
        drop(position);
    }

    /// The viewport a popup is placed in, and the popup’s own size.
    fn placement_bounds(&self) -> Option<(Rect, Vector2<f64>)> {
        None
    }
}

#[test]
fn test_default_center() {
    #[derive(Debug, Default)]
    struct Dialog {
        position: Option<Point2<f64>>,
    }

    impl View<()> for Dialog {
        fn as_widget(&self) {}
        fn set_position(&mut self, position: Point2<f64>) {
            self.position = Some(position);
        }
        fn placement_bounds(&self) -> Option<(Rect, Vector2<f64>)> {
            Some((
                Rect::new(Point2::new(0., 0.), Vector2::new(400., 300.)),
                Vector2::new(100., 50.),
            ))
        }
    }

    #[derive(Debug)]
    struct Unplaced;
    impl View<()> for Unplaced {
        fn as_widget(&self) {}
        fn set_position(&mut self, _: Point2<f64>) {
            panic!("views without bounds should not be moved");
        }
    }

    let mut dialog = Dialog::default();
    dialog.center();
    assert_eq!(dialog.position, Some(Point2::new(150., 125.)));

    Unplaced.center();
}
