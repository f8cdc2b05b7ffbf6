//! Element definitions for the shared board.
//!
//! An element is one atomic drawable record in a board's history. Elements
//! are immutable once created; erasure removes an element from the sequence
//! by id instead of mutating it.

mod circle;
mod rectangle;
mod segment;
mod text;

pub use circle::Circle;
pub use rectangle::Rectangle;
pub use segment::Segment;
pub use text::Text;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for elements.
pub type ElementId = Uuid;

/// RGBA8 color, carried on the wire as a CSS hex string (`#rrggbb` or
/// `#rrggbbaa`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub fn black() -> Self {
        Self::new(0, 0, 0, 255)
    }

    pub fn white() -> Self {
        Self::new(255, 255, 255, 255)
    }

    /// Parse a CSS hex color (`#rgb`, `#rrggbb` or `#rrggbbaa`).
    pub fn parse(s: &str) -> Result<Self, ColorParseError> {
        let hex = s
            .strip_prefix('#')
            .ok_or_else(|| ColorParseError(s.to_string()))?;
        // The slices below are byte-indexed and require ASCII input.
        if !hex.is_ascii() {
            return Err(ColorParseError(s.to_string()));
        }
        let byte = |range: &str| u8::from_str_radix(range, 16);
        match hex.len() {
            3 => {
                let nibble =
                    |i: usize| u8::from_str_radix(&hex[i..i + 1], 16).map(|v| v * 17);
                Ok(Self::new(
                    nibble(0).map_err(|_| ColorParseError(s.to_string()))?,
                    nibble(1).map_err(|_| ColorParseError(s.to_string()))?,
                    nibble(2).map_err(|_| ColorParseError(s.to_string()))?,
                    255,
                ))
            }
            6 | 8 => {
                let r = byte(&hex[0..2]).map_err(|_| ColorParseError(s.to_string()))?;
                let g = byte(&hex[2..4]).map_err(|_| ColorParseError(s.to_string()))?;
                let b = byte(&hex[4..6]).map_err(|_| ColorParseError(s.to_string()))?;
                let a = if hex.len() == 8 {
                    byte(&hex[6..8]).map_err(|_| ColorParseError(s.to_string()))?
                } else {
                    255
                };
                Ok(Self::new(r, g, b, a))
            }
            _ => Err(ColorParseError(s.to_string())),
        }
    }

    /// Format back to a CSS hex string. The alpha suffix is only written when
    /// it carries information, so fully opaque colors round-trip as `#rrggbb`.
    pub fn to_hex(&self) -> String {
        if self.a == 255 {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::black()
    }
}

/// Error for malformed color strings.
#[derive(Debug, Clone, thiserror::Error)]
#[error("invalid color string: {0:?}")]
pub struct ColorParseError(pub String);

impl TryFrom<String> for Color {
    type Error = ColorParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Color::parse(&value)
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_hex()
    }
}

/// The tools a client can select. `Eraser` never appears in an element
/// sequence; erasing produces removal events, not elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ToolKind {
    #[default]
    Pencil,
    Eraser,
    Text,
    Rectangle,
    Circle,
}

/// Enum wrapper over all drawable element variants.
///
/// The wire format is internally tagged on `"tool"` with camelCase field
/// names (`startX`, `fontSize`, ...), matching the board documents the relay
/// persists and rebroadcasts. An event whose payload is missing a required
/// field for its tag fails deserialization and is skipped by the session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "tool", rename_all = "lowercase")]
pub enum Element {
    Pencil(Segment),
    Rectangle(Rectangle),
    Circle(Circle),
    Text(Text),
}

impl Element {
    pub fn id(&self) -> ElementId {
        match self {
            Element::Pencil(e) => e.id,
            Element::Rectangle(e) => e.id,
            Element::Circle(e) => e.id,
            Element::Text(e) => e.id,
        }
    }

    pub fn color(&self) -> Color {
        match self {
            Element::Pencil(e) => e.color,
            Element::Rectangle(e) => e.color,
            Element::Circle(e) => e.color,
            Element::Text(e) => e.color,
        }
    }

    /// The tool that produced this element.
    pub fn tool(&self) -> ToolKind {
        match self {
            Element::Pencil(_) => ToolKind::Pencil,
            Element::Rectangle(_) => ToolKind::Rectangle,
            Element::Circle(_) => ToolKind::Circle,
            Element::Text(_) => ToolKind::Text,
        }
    }

    /// Whether every coordinate is finite and sizes are in range. The render
    /// pipeline skips elements that fail this check instead of panicking.
    pub fn is_well_formed(&self) -> bool {
        match self {
            Element::Pencil(e) => {
                [e.start_x, e.start_y, e.end_x, e.end_y]
                    .iter()
                    .all(|v| v.is_finite())
            }
            Element::Rectangle(e) => {
                [e.start_x, e.start_y, e.width, e.height]
                    .iter()
                    .all(|v| v.is_finite())
            }
            Element::Circle(e) => {
                [e.start_x, e.start_y, e.radius].iter().all(|v| v.is_finite())
                    && e.radius >= 0.0
            }
            Element::Text(e) => {
                [e.x, e.y, e.font_size].iter().all(|v| v.is_finite()) && e.font_size > 0.0
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::Point;

    #[test]
    fn color_parse_and_format() {
        let c = Color::parse("#ff0000").unwrap();
        assert_eq!(c, Color::new(255, 0, 0, 255));
        assert_eq!(c.to_hex(), "#ff0000");

        let short = Color::parse("#f0a").unwrap();
        assert_eq!(short, Color::new(255, 0, 170, 255));

        let alpha = Color::parse("#11223344").unwrap();
        assert_eq!(alpha.a, 0x44);
        assert_eq!(alpha.to_hex(), "#11223344");

        assert!(Color::parse("red").is_err());
        assert!(Color::parse("#12345").is_err());
    }

    #[test]
    fn multibyte_color_string_is_rejected() {
        // 6 bytes but not 6 ASCII digits; must error, not panic on a byte
        // slice landing inside the multibyte char.
        assert!(Color::parse("#aé345").is_err());
        assert!(Color::parse("#éé").is_err());
        assert!(serde_json::from_str::<Color>(r##""#aé345""##).is_err());
    }

    #[test]
    fn segment_wire_format() {
        let seg = Segment::new(
            Point::new(1.0, 2.0),
            Point::new(3.0, 4.0),
            Color::parse("#ff0000").unwrap(),
        );
        let json = serde_json::to_string(&Element::Pencil(seg)).unwrap();
        assert!(json.contains(r#""tool":"pencil""#));
        assert!(json.contains(r#""startX":1.0"#));
        assert!(json.contains(r#""endY":4.0"#));
        assert!(json.contains(r##""color":"#ff0000""##));
    }

    #[test]
    fn text_wire_format() {
        let text = Text::new(Point::new(10.0, 20.0), "hi".to_string(), Color::black(), 20.0);
        let json = serde_json::to_string(&Element::Text(text)).unwrap();
        assert!(json.contains(r#""tool":"text""#));
        assert!(json.contains(r#""fontSize":20.0"#));
    }

    #[test]
    fn element_roundtrip() {
        let el = Element::Circle(Circle::new(
            Point::new(50.0, 60.0),
            Point::new(53.0, 64.0),
            Color::black(),
        ));
        let json = serde_json::to_string(&el).unwrap();
        let back: Element = serde_json::from_str(&json).unwrap();
        assert_eq!(el, back);
    }

    #[test]
    fn missing_field_is_rejected() {
        // A pencil event without endX/endY must fail, not default.
        let json = r##"{"tool":"pencil","id":"7f2c1d34-9c1c-4f8e-a6a1-000000000001",
                       "color":"#000000","startX":1.0,"startY":2.0}"##;
        assert!(serde_json::from_str::<Element>(json).is_err());
    }

    #[test]
    fn unknown_tool_is_rejected() {
        let json = r#"{"tool":"eraser","id":"7f2c1d34-9c1c-4f8e-a6a1-000000000001","x":1.0,"y":2.0}"#;
        assert!(serde_json::from_str::<Element>(json).is_err());
    }

    #[test]
    fn well_formed_check() {
        let mut seg = Segment::new(Point::new(0.0, 0.0), Point::new(1.0, 1.0), Color::black());
        assert!(Element::Pencil(seg.clone()).is_well_formed());
        seg.end_x = f64::NAN;
        assert!(!Element::Pencil(seg).is_well_formed());

        let text = Text::new(Point::new(0.0, 0.0), "x".into(), Color::black(), 0.0);
        assert!(!Element::Text(text).is_well_formed());
    }
}
