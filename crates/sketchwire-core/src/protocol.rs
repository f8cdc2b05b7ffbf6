//! Relay wire protocol.
//!
//! Messages are JSON, tagged on `"type"`:
//!
//! ```json
//! { "type": "join", "board": "board-id" }
//! { "type": "drawing", "board": "board-id", "element": { "tool": "pencil", ... } }
//! { "type": "erase", "board": "board-id", "element": { ... } }
//! { "type": "snapshot", "board": "board-id", "elements": [ ... ] }
//! ```
//!
//! Drawing and erase events are fire-and-forget: the sender has already
//! applied them optimistically and awaits no acknowledgment.

use crate::element::Element;
use serde::{Deserialize, Serialize};

/// Messages sent to the relay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Join a board's room. The relay answers with a snapshot.
    Join { board: String },
    /// Leave the current board's room.
    Leave,
    /// A new element, broadcast to the rest of the room.
    Drawing { board: String, element: Element },
    /// An erased element. The full element is carried; peers consume its id.
    Erase { board: String, element: Element },
}

/// Messages received from the relay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// The board's full element sequence, sent once per join. Always a
    /// wholesale replacement of local state.
    Snapshot { board: String, elements: Vec<Element> },
    /// An element drawn by another room member.
    Drawing { board: String, element: Element },
    /// An element erased by another room member.
    Erase { board: String, element: Element },
    /// Error message.
    Error { message: String },
}
