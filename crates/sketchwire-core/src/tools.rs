//! Tool selection and the per-gesture input state machine.

use crate::element::{Circle, Color, Element, ElementId, Rectangle, Segment, Text, ToolKind};
use crate::hit_test::{self, TextMetrics};
use kurbo::Point;

/// Style configuration applied to new elements. Element constructors take
/// these values explicitly; nothing in the model layer hardcodes them.
#[derive(Debug, Clone)]
pub struct ToolConfig {
    pub color: Color,
    pub font_size: f64,
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            color: Color::black(),
            font_size: 20.0,
        }
    }
}

/// State of the current gesture.
#[derive(Debug, Clone, Default)]
pub enum GestureState {
    /// No gesture in progress.
    #[default]
    Idle,
    /// A drag gesture is in progress.
    Active {
        /// Pointer-down position (shape anchor).
        anchor: Point,
        /// Last recorded pointer position (pencil segment origin).
        last: Point,
    },
    /// A text gesture is suspended on the user's text prompt. Only this
    /// gesture is blocked; other events keep flowing.
    AwaitingTextInput { position: Point },
}

/// What the host must do after feeding a pointer event to the controller.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEffect {
    /// Nothing to do.
    None,
    /// A finished element: append it locally, paint it incrementally, and
    /// emit it to the relay.
    Commit(Element),
    /// An erase match: remove the element, do a full redraw, and emit the
    /// removal to the relay.
    Erase(ElementId),
    /// An in-progress shape: full redraw of committed elements plus this
    /// transient preview. Never appended to the sequence, never emitted.
    Preview(Element),
    /// A text gesture started: prompt the user, then call
    /// [`ToolController::submit_text`] or [`ToolController::cancel_text`].
    PromptText,
}

/// Translates pointer events into element-creation and erase intents,
/// parameterized by the selected tool. One instance per client.
#[derive(Debug, Clone, Default)]
pub struct ToolController {
    pub tool: ToolKind,
    pub config: ToolConfig,
    state: GestureState,
}

impl ToolController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Select a tool. Takes effect on the next gesture; a gesture in
    /// progress is discarded.
    pub fn set_tool(&mut self, tool: ToolKind) {
        self.tool = tool;
        self.state = GestureState::Idle;
    }

    /// Whether a drag gesture is in progress.
    pub fn is_active(&self) -> bool {
        matches!(self.state, GestureState::Active { .. })
    }

    /// Whether a text prompt is pending.
    pub fn is_awaiting_text(&self) -> bool {
        matches!(self.state, GestureState::AwaitingTextInput { .. })
    }

    /// Discard any pending gesture state (e.g. when leaving a board).
    pub fn cancel(&mut self) {
        self.state = GestureState::Idle;
    }

    /// Handle pointer-down at `point`.
    pub fn pointer_down(
        &mut self,
        point: Point,
        elements: &[Element],
        metrics: &dyn TextMetrics,
    ) -> InputEffect {
        match self.tool {
            ToolKind::Text => {
                self.state = GestureState::AwaitingTextInput { position: point };
                InputEffect::PromptText
            }
            ToolKind::Eraser => {
                // Eraser gestures carry no state; every down hit-tests.
                match hit_test::hit_test(elements, point, metrics) {
                    Some(element) => InputEffect::Erase(element.id()),
                    None => InputEffect::None,
                }
            }
            ToolKind::Pencil | ToolKind::Rectangle | ToolKind::Circle => {
                self.state = GestureState::Active {
                    anchor: point,
                    last: point,
                };
                // The first pencil segment is emitted on the first move.
                InputEffect::None
            }
        }
    }

    /// Handle pointer-move to `point`. A move without a preceding down for
    /// the active gesture is ignored.
    pub fn pointer_move(
        &mut self,
        point: Point,
        elements: &[Element],
        metrics: &dyn TextMetrics,
    ) -> InputEffect {
        if self.tool == ToolKind::Eraser {
            // Hit-tests on every move, active gesture or not.
            return match hit_test::hit_test(elements, point, metrics) {
                Some(element) => InputEffect::Erase(element.id()),
                None => InputEffect::None,
            };
        }

        let GestureState::Active { anchor, last } = &mut self.state else {
            return InputEffect::None;
        };

        match self.tool {
            ToolKind::Pencil => {
                let segment = Segment::new(*last, point, self.config.color);
                *last = point;
                InputEffect::Commit(Element::Pencil(segment))
            }
            ToolKind::Rectangle => {
                *last = point;
                InputEffect::Preview(Element::Rectangle(Rectangle::from_corners(
                    *anchor,
                    point,
                    self.config.color,
                )))
            }
            ToolKind::Circle => {
                *last = point;
                InputEffect::Preview(Element::Circle(Circle::new(
                    *anchor,
                    point,
                    self.config.color,
                )))
            }
            // Text never enters Active; eraser handled above.
            ToolKind::Text | ToolKind::Eraser => InputEffect::None,
        }
    }

    /// Handle pointer-up at `point`. Shape tools finalize here with
    /// normalized extents; pencil needs no finalization since its segments
    /// were emitted incrementally.
    pub fn pointer_up(&mut self, point: Point) -> InputEffect {
        // A pending text prompt outlives the pointer-up of its gesture.
        if self.is_awaiting_text() {
            return InputEffect::None;
        }

        let GestureState::Active { anchor, .. } = self.state else {
            return InputEffect::None;
        };
        self.state = GestureState::Idle;

        match self.tool {
            ToolKind::Rectangle => InputEffect::Commit(Element::Rectangle(
                Rectangle::from_corners(anchor, point, self.config.color),
            )),
            ToolKind::Circle => InputEffect::Commit(Element::Circle(Circle::new(
                anchor,
                point,
                self.config.color,
            ))),
            ToolKind::Pencil | ToolKind::Eraser | ToolKind::Text => InputEffect::None,
        }
    }

    /// Confirm the pending text prompt with the entered content.
    pub fn submit_text(&mut self, content: String) -> InputEffect {
        let GestureState::AwaitingTextInput { position } = self.state else {
            return InputEffect::None;
        };
        self.state = GestureState::Idle;
        InputEffect::Commit(Element::Text(Text::new(
            position,
            content,
            self.config.color,
            self.config.font_size,
        )))
    }

    /// Cancel the pending text prompt; no element is created.
    pub fn cancel_text(&mut self) {
        if self.is_awaiting_text() {
            self.state = GestureState::Idle;
        }
    }
}
