//! Text element.

use super::{Color, ElementId};
use crate::hit_test::TextMetrics;
use kurbo::Point;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A run of text drawn at a baseline position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Text {
    pub id: ElementId,
    pub color: Color,
    /// Left edge of the text.
    pub x: f64,
    /// Baseline of the text.
    pub y: f64,
    pub text: String,
    pub font_size: f64,
}

impl Text {
    pub fn new(position: Point, text: String, color: Color, font_size: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            color,
            x: position.x,
            y: position.y,
            text,
            font_size,
        }
    }

    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Erase containment check: the horizontal extent is the measured width,
    /// the vertical extent runs one font size above the baseline.
    pub fn hit_test(&self, point: Point, metrics: &dyn TextMetrics) -> bool {
        let width = metrics.text_width(&self.text, self.font_size);
        point.x >= self.x
            && point.x <= self.x + width
            && point.y >= self.y - self.font_size
            && point.y <= self.y
    }
}
