//! Circle element.

use super::{Color, ElementId};
use kurbo::Point;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A stroked circle centered at (`start_x`, `start_y`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Circle {
    pub id: ElementId,
    pub color: Color,
    pub start_x: f64,
    pub start_y: f64,
    pub radius: f64,
}

impl Circle {
    /// Create a circle from a drag gesture: the anchor is the center and the
    /// radius is the distance to the current pointer position.
    pub fn new(center: Point, current: Point, color: Color) -> Self {
        Self {
            id: Uuid::new_v4(),
            color,
            start_x: center.x,
            start_y: center.y,
            radius: center.distance(current),
        }
    }

    pub fn center(&self) -> Point {
        Point::new(self.start_x, self.start_y)
    }

    /// Erase containment check: Euclidean distance to the center, inclusive.
    pub fn hit_test(&self, point: Point) -> bool {
        self.center().distance(point) <= self.radius
    }
}
