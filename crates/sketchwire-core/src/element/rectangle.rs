//! Rectangle element.

use super::{Color, ElementId};
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A stroked rectangle anchored at its top-left corner.
///
/// `width`/`height` are normalized to non-negative values when the gesture
/// finalizes, but a remote peer may still send negative extents; all geometry
/// here goes through [`Rectangle::as_rect`], which takes absolute extents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rectangle {
    pub id: ElementId,
    pub color: Color,
    pub start_x: f64,
    pub start_y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rectangle {
    /// Create a rectangle from two drag corners, normalizing so that
    /// (`start_x`, `start_y`) is the top-left and extents are non-negative
    /// regardless of drag direction.
    pub fn from_corners(anchor: Point, current: Point, color: Color) -> Self {
        Self {
            id: Uuid::new_v4(),
            color,
            start_x: anchor.x.min(current.x),
            start_y: anchor.y.min(current.y),
            width: (current.x - anchor.x).abs(),
            height: (current.y - anchor.y).abs(),
        }
    }

    /// Bounding box by absolute extent, tolerant of negative width/height.
    pub fn as_rect(&self) -> Rect {
        let x1 = self.start_x + self.width;
        let y1 = self.start_y + self.height;
        Rect::new(
            self.start_x.min(x1),
            self.start_y.min(y1),
            self.start_x.max(x1),
            self.start_y.max(y1),
        )
    }

    /// Erase containment check: inclusive bounding-box test.
    pub fn hit_test(&self, point: Point) -> bool {
        let r = self.as_rect();
        point.x >= r.x0 && point.x <= r.x1 && point.y >= r.y0 && point.y <= r.y1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_reverse_drag() {
        let rect = Rectangle::from_corners(Point::new(50.0, 50.0), Point::new(30.0, 20.0), Color::black());
        assert_eq!(rect.start_x, 30.0);
        assert_eq!(rect.start_y, 20.0);
        assert_eq!(rect.width, 20.0);
        assert_eq!(rect.height, 30.0);
    }

    #[test]
    fn hit_test_is_inclusive() {
        let rect = Rectangle::from_corners(Point::new(0.0, 0.0), Point::new(100.0, 50.0), Color::black());
        assert!(rect.hit_test(Point::new(0.0, 0.0)));
        assert!(rect.hit_test(Point::new(100.0, 50.0)));
        assert!(rect.hit_test(Point::new(40.0, 25.0)));
        assert!(!rect.hit_test(Point::new(100.1, 25.0)));
    }

    #[test]
    fn hit_test_handles_negative_extents() {
        // A peer that never normalized: anchor bottom-right, negative extents.
        let rect = Rectangle {
            id: Uuid::new_v4(),
            color: Color::black(),
            start_x: 50.0,
            start_y: 50.0,
            width: -20.0,
            height: -30.0,
        };
        assert!(rect.hit_test(Point::new(40.0, 30.0)));
        assert!(!rect.hit_test(Point::new(60.0, 30.0)));
    }
}
