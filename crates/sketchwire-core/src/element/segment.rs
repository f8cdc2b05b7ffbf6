//! Pencil stroke segment.

use super::{Color, ElementId};
use kurbo::Point;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One short segment of a pencil stroke.
///
/// A stroke is a sequence of segments, one per pointer move, each running
/// from the previous pointer position to the current one. Segments, not whole
/// strokes, are the unit of transmission and erasure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Segment {
    pub id: ElementId,
    pub color: Color,
    pub start_x: f64,
    pub start_y: f64,
    pub end_x: f64,
    pub end_y: f64,
}

impl Segment {
    /// Create a segment from the previous pointer position to the current one.
    pub fn new(from: Point, to: Point, color: Color) -> Self {
        Self {
            id: Uuid::new_v4(),
            color,
            start_x: from.x,
            start_y: from.y,
            end_x: to.x,
            end_y: to.y,
        }
    }

    pub fn start(&self) -> Point {
        Point::new(self.start_x, self.start_y)
    }

    pub fn end(&self) -> Point {
        Point::new(self.end_x, self.end_y)
    }

    /// Erase proximity check: the pointer must be within the tolerance of the
    /// segment's start point on both axes. This is origin proximity, not
    /// distance to the line, and the comparison is strict.
    pub fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        (self.start_x - point.x).abs() < tolerance && (self.start_y - point.y).abs() < tolerance
    }
}
