//! Sketchwire Core Library
//!
//! Data model, hit-testing, the input state machine and the relay sync
//! session for the shared drawing board. All state here belongs to a single
//! client and is mutated on one cooperative timeline; cross-client
//! coordination happens only through the relay's event ordering.

pub mod board;
pub mod client;
pub mod element;
pub mod protocol;
pub mod session;
pub mod tools;

pub use board::Board;
pub use client::{ConnectionEvent, ConnectionState, RelayConnection};
pub use element::{Circle, Color, Element, ElementId, Rectangle, Segment, Text, ToolKind};
pub use hit_test::{ERASE_TOLERANCE, HeuristicMetrics, TextMetrics, hit_test};
pub use protocol::{ClientMessage, ServerMessage};
pub use session::{BoardSession, SessionUpdate};
pub use tools::{GestureState, InputEffect, ToolConfig, ToolController};
