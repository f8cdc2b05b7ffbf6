//! Board sync session: the authoritative local element sequence and its
//! bridge to the relay's event stream.
//!
//! Local mutations are applied optimistically and queued for the relay;
//! remote events are applied as they arrive. A session is scoped to exactly
//! one board: opening another board means creating a new session, which is
//! what guarantees a single active subscription per board per client.

use crate::board::Board;
use crate::element::{Element, ElementId};
use crate::protocol::{ClientMessage, ServerMessage};

/// What the host must do to the raster after an applied event.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionUpdate {
    /// Nothing changed (mismatched board, duplicate, unknown id).
    None,
    /// An element was appended: paint it incrementally, prior pixels are
    /// untouched.
    PaintElement(Element),
    /// The sequence changed structurally (snapshot or erase): the raster is
    /// not reversible, re-derive it from the sequence.
    Redraw,
}

/// Sync client for one open board.
pub struct BoardSession {
    board: Board,
    outgoing: Vec<ClientMessage>,
    joined: bool,
}

impl BoardSession {
    /// Open a session on a board and queue the join intent. The relay
    /// responds with a snapshot that replaces local state wholesale.
    pub fn new(board_id: impl Into<String>) -> Self {
        let board_id = board_id.into();
        let mut session = Self {
            board: Board::new(board_id, String::new()),
            outgoing: Vec::new(),
            joined: false,
        };
        session.queue(ClientMessage::Join { board: session.board.id.clone() });
        session
    }

    pub fn board_id(&self) -> &str {
        &self.board.id
    }

    /// The current element sequence, in arrival order.
    pub fn elements(&self) -> &[Element] {
        &self.board.elements
    }

    /// Whether a snapshot has been applied since the last join.
    pub fn is_joined(&self) -> bool {
        self.joined
    }

    /// Re-queue the join intent. Safe to call repeatedly: the snapshot reply
    /// always replaces, never merges, so rejoining cannot duplicate elements.
    pub fn rejoin(&mut self) {
        self.joined = false;
        let board = self.board.id.clone();
        self.queue(ClientMessage::Join { board });
    }

    /// Queue the leave intent and drop any unsent traffic for this board.
    /// In-flight events already handed to the transport are not retracted.
    pub fn leave(&mut self) {
        self.outgoing.clear();
        self.joined = false;
        self.queue(ClientMessage::Leave);
    }

    /// Apply a locally created element and queue it for broadcast.
    pub fn commit_local(&mut self, element: Element) {
        if self.board.push(element.clone()) {
            let board = self.board.id.clone();
            self.queue(ClientMessage::Drawing { board, element });
        }
    }

    /// Erase an element locally and queue the removal for broadcast.
    /// Returns the removed element; the caller must redraw on `Some`.
    pub fn erase_local(&mut self, id: ElementId) -> Option<Element> {
        let element = self.board.remove(id)?;
        let board = self.board.id.clone();
        self.queue(ClientMessage::Erase { board, element: element.clone() });
        Some(element)
    }

    /// Apply a relay message. Events for other boards are ignored.
    pub fn handle_message(&mut self, msg: ServerMessage) -> SessionUpdate {
        match msg {
            ServerMessage::Snapshot { board, elements } => {
                if board != self.board.id {
                    return SessionUpdate::None;
                }
                self.board.replace_all(elements);
                self.joined = true;
                SessionUpdate::Redraw
            }
            ServerMessage::Drawing { board, element } => {
                if board != self.board.id {
                    return SessionUpdate::None;
                }
                if !element.is_well_formed() {
                    log::warn!("board {}: dropping malformed remote element", board);
                    return SessionUpdate::None;
                }
                if self.board.push(element.clone()) {
                    SessionUpdate::PaintElement(element)
                } else {
                    SessionUpdate::None
                }
            }
            ServerMessage::Erase { board, element } => {
                if board != self.board.id {
                    return SessionUpdate::None;
                }
                match self.board.remove(element.id()) {
                    Some(_) => SessionUpdate::Redraw,
                    None => SessionUpdate::None,
                }
            }
            ServerMessage::Error { message } => {
                log::warn!("relay error on board {}: {}", self.board.id, message);
                SessionUpdate::None
            }
        }
    }

    /// Parse and apply a raw relay frame. Malformed frames are skipped: one
    /// bad event costs its own effect, never the session.
    pub fn handle_json(&mut self, json: &str) -> SessionUpdate {
        match serde_json::from_str::<ServerMessage>(json) {
            Ok(msg) => self.handle_message(msg),
            Err(err) => {
                log::warn!("board {}: skipping malformed relay frame: {}", self.board.id, err);
                SessionUpdate::None
            }
        }
    }

    /// Take the pending outgoing messages (drains the queue).
    pub fn take_outgoing(&mut self) -> Vec<ClientMessage> {
        std::mem::take(&mut self.outgoing)
    }

    pub fn has_outgoing(&self) -> bool {
        !self.outgoing.is_empty()
    }

    fn queue(&mut self, msg: ClientMessage) {
        self.outgoing.push(msg);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::{Color, Segment};
    use crate::hit_test::{self, HeuristicMetrics};
    use kurbo::Point;

    fn segment(from: (f64, f64), to: (f64, f64), color: &str) -> Element {
        Element::Pencil(Segment::new(
            Point::new(from.0, from.1),
            Point::new(to.0, to.1),
            Color::parse(color).unwrap(),
        ))
    }

    #[test]
    fn new_session_queues_join() {
        let mut session = BoardSession::new("b1");
        assert_eq!(
            session.take_outgoing(),
            vec![ClientMessage::Join { board: "b1".to_string() }]
        );
        assert!(!session.is_joined());
    }

    #[test]
    fn snapshot_replaces_local_state_wholesale() {
        let mut session = BoardSession::new("b1");
        // Elements held before the snapshot arrives are discarded.
        session.commit_local(segment((0.0, 0.0), (1.0, 1.0), "#000000"));

        let snapshot = vec![
            segment((5.0, 5.0), (6.0, 6.0), "#000000"),
            segment((7.0, 7.0), (8.0, 8.0), "#000000"),
        ];
        let update = session.handle_message(ServerMessage::Snapshot {
            board: "b1".to_string(),
            elements: snapshot.clone(),
        });

        assert_eq!(update, SessionUpdate::Redraw);
        assert_eq!(session.elements(), snapshot.as_slice());
        assert!(session.is_joined());

        // Re-applying the same snapshot is idempotent.
        session.handle_message(ServerMessage::Snapshot {
            board: "b1".to_string(),
            elements: snapshot.clone(),
        });
        assert_eq!(session.elements(), snapshot.as_slice());
    }

    #[test]
    fn remote_drawing_appends_at_end() {
        let mut session = BoardSession::new("b1");
        let first = segment((0.0, 0.0), (1.0, 1.0), "#000000");
        session.commit_local(first.clone());

        let remote = segment((9.0, 9.0), (10.0, 10.0), "#00ff00");
        let update = session.handle_message(ServerMessage::Drawing {
            board: "b1".to_string(),
            element: remote.clone(),
        });

        assert_eq!(update, SessionUpdate::PaintElement(remote.clone()));
        assert_eq!(session.elements(), &[first, remote]);
    }

    #[test]
    fn remote_drawing_for_other_board_is_ignored() {
        let mut session = BoardSession::new("b1");
        let update = session.handle_message(ServerMessage::Drawing {
            board: "b2".to_string(),
            element: segment((0.0, 0.0), (1.0, 1.0), "#000000"),
        });
        assert_eq!(update, SessionUpdate::None);
        assert!(session.elements().is_empty());
    }

    #[test]
    fn redelivered_drawing_is_deduplicated() {
        let mut session = BoardSession::new("b1");
        let remote = segment((9.0, 9.0), (10.0, 10.0), "#00ff00");
        let msg = ServerMessage::Drawing { board: "b1".to_string(), element: remote.clone() };

        assert_eq!(session.handle_message(msg.clone()), SessionUpdate::PaintElement(remote));
        // At-least-once transport may redeliver; the second copy is dropped.
        assert_eq!(session.handle_message(msg), SessionUpdate::None);
        assert_eq!(session.elements().len(), 1);
    }

    #[test]
    fn remote_erase_removes_by_id_and_forces_redraw() {
        let mut session = BoardSession::new("b1");
        let (a, b, c) = (
            segment((0.0, 0.0), (1.0, 1.0), "#000000"),
            segment((10.0, 10.0), (11.0, 11.0), "#000000"),
            segment((20.0, 20.0), (21.0, 21.0), "#000000"),
        );
        for e in [&a, &b, &c] {
            session.commit_local(e.clone());
        }

        let update = session.handle_message(ServerMessage::Erase {
            board: "b1".to_string(),
            element: b.clone(),
        });

        assert_eq!(update, SessionUpdate::Redraw);
        assert_eq!(session.elements(), &[a, c]);

        // Erasing an id no longer present is a no-op.
        let update = session.handle_message(ServerMessage::Erase {
            board: "b1".to_string(),
            element: b,
        });
        assert_eq!(update, SessionUpdate::None);
    }

    #[test]
    fn local_erase_queues_removal_event() {
        let mut session = BoardSession::new("b1");
        let element = segment((0.0, 0.0), (1.0, 1.0), "#000000");
        let id = element.id();
        session.commit_local(element.clone());
        session.take_outgoing();

        let removed = session.erase_local(id);
        assert_eq!(removed, Some(element.clone()));
        assert_eq!(
            session.take_outgoing(),
            vec![ClientMessage::Erase { board: "b1".to_string(), element }]
        );
        assert!(session.elements().is_empty());
    }

    #[test]
    fn malformed_frames_are_skipped() {
        let mut session = BoardSession::new("b1");
        assert_eq!(session.handle_json("not json"), SessionUpdate::None);
        assert_eq!(
            session.handle_json(r#"{"type":"drawing","board":"b1"}"#),
            SessionUpdate::None
        );
        // A color string with a multibyte character must be rejected like any
        // other malformed field, never crash the session.
        let bad_color = r##"{"type":"drawing","board":"b1","element":
            {"tool":"pencil","id":"7f2c1d34-9c1c-4f8e-a6a1-000000000001",
             "color":"#aé345","startX":0.0,"startY":0.0,"endX":1.0,"endY":1.0}}"##;
        assert_eq!(session.handle_json(bad_color), SessionUpdate::None);
        assert!(session.elements().is_empty());
        // A later, well-formed frame still applies.
        let element = segment((0.0, 0.0), (1.0, 1.0), "#000000");
        let json = serde_json::to_string(&ServerMessage::Drawing {
            board: "b1".to_string(),
            element: element.clone(),
        })
        .unwrap();
        assert_eq!(session.handle_json(&json), SessionUpdate::PaintElement(element));
    }

    /// Minimal in-test relay: holds the canonical sequence per board, answers
    /// joins with snapshots and routes drawing/erase to the other session.
    struct LoopbackRelay {
        elements: Vec<Element>,
    }

    impl LoopbackRelay {
        fn new() -> Self {
            Self { elements: Vec::new() }
        }

        /// Route one client message; returns what the *other* room member
        /// receives (the relay never echoes to the sender).
        fn route(&mut self, msg: ClientMessage, sender: &mut BoardSession) -> Option<ServerMessage> {
            match msg {
                ClientMessage::Join { board } => {
                    let snapshot = ServerMessage::Snapshot {
                        board,
                        elements: self.elements.clone(),
                    };
                    // The snapshot goes back to the joining client only.
                    sender.handle_message(snapshot);
                    None
                }
                ClientMessage::Leave => None,
                ClientMessage::Drawing { board, element } => {
                    self.elements.push(element.clone());
                    Some(ServerMessage::Drawing { board, element })
                }
                ClientMessage::Erase { board, element } => {
                    self.elements.retain(|e| e.id() != element.id());
                    Some(ServerMessage::Erase { board, element })
                }
            }
        }
    }

    fn pump(relay: &mut LoopbackRelay, from: &mut BoardSession, to: &mut BoardSession) {
        for msg in from.take_outgoing() {
            if let Some(delivery) = relay.route(msg, from) {
                to.handle_message(delivery);
            }
        }
    }

    #[test]
    fn two_clients_converge_through_the_relay() {
        let mut relay = LoopbackRelay::new();
        let mut a = BoardSession::new("team-sync");
        let mut b = BoardSession::new("team-sync");
        pump(&mut relay, &mut a, &mut b);
        pump(&mut relay, &mut b, &mut a);
        assert!(a.is_joined() && b.is_joined());

        // Client A draws a red pencil segment (0,0)-(5,5).
        let stroke = segment((0.0, 0.0), (5.0, 5.0), "#ff0000");
        let stroke_id = stroke.id();
        a.commit_local(stroke.clone());
        pump(&mut relay, &mut a, &mut b);

        assert_eq!(b.elements(), &[stroke]);

        // Client B erases near (2,2); the segment origin is within tolerance.
        let hit = hit_test::hit_test(b.elements(), Point::new(2.0, 2.0), &HeuristicMetrics)
            .expect("segment should be hit");
        assert_eq!(hit.id(), stroke_id);
        b.erase_local(stroke_id);
        pump(&mut relay, &mut b, &mut a);

        assert!(a.elements().is_empty());
        assert!(b.elements().is_empty());
    }
}
