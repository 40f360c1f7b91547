use cgmath::{Point2, Vector2};

/// An axis-aligned rectangle, used to place popups in their viewport.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub origin: Point2<f64>,
    pub size: Vector2<f64>,
}

impl Rect {
    pub fn new(origin: Point2<f64>, size: Vector2<f64>) -> Rect {
        Rect { origin, size }
    }

    pub fn center(&self) -> Point2<f64> {
        self.origin + self.size / 2.
    }

    /// Returns a rectangle of the given size centered inside this one.
    ///
    /// On an axis where the size doesn’t fit, the result is pinned to this rectangle’s origin so
    /// the popup’s top left corner stays reachable.
    pub fn centered(&self, size: Vector2<f64>) -> Rect {
        let center = self.center();
        let x = (center.x - size.x / 2.).max(self.origin.x);
        let y = (center.y - size.y / 2.).max(self.origin.y);
        Rect::new(Point2::new(x, y), size)
    }
}

#[test]
fn test_centered() {
    let viewport = Rect::new(Point2::new(0., 0.), Vector2::new(800., 600.));
    let popup = viewport.centered(Vector2::new(200., 100.));
    assert_eq!(popup.origin, Point2::new(300., 250.));
    assert_eq!(popup.center(), viewport.center());

    let offset = Rect::new(Point2::new(100., 50.), Vector2::new(200., 200.));
    assert_eq!(
        offset.centered(Vector2::new(100., 100.)).origin,
        Point2::new(150., 100.)
    );

    // too wide: pinned to the viewport’s left edge
    let pinned = viewport.centered(Vector2::new(1000., 100.));
    assert_eq!(pinned.origin, Point2::new(0., 250.));
}
