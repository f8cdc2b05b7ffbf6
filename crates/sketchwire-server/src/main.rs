//! Sketchwire relay server.
//!
//! Holds the canonical element sequence of every board and relays drawing
//! and erase events between the members of a board's room.
//!
//! ## Protocol
//!
//! WebSocket messages are JSON, tagged on `"type"`:
//! ```json
//! { "type": "join", "board": "board-id" }
//! { "type": "drawing", "board": "board-id", "element": { "tool": "pencil", ... } }
//! { "type": "erase", "board": "board-id", "element": { ... } }
//! ```
//!
//! Every join is answered with a snapshot of the board's full element
//! sequence. Boards keep their elements when the last member disconnects.

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Path, State,
    },
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use dashmap::DashMap;
use futures_util::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use sketchwire_core::{Board, ClientMessage, Element, ElementId, ServerMessage};
use std::{collections::HashSet, net::SocketAddr, sync::Arc};
use tokio::sync::broadcast;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use uuid::Uuid;

const CHANNEL_CAPACITY: usize = 256;

/// One board's room: the persisted document, the live broadcast channel and
/// the currently connected peers. The document outlives the peers.
struct BoardRoom {
    board: Board,
    tx: broadcast::Sender<(String, ServerMessage)>,
    peers: HashSet<String>,
}

impl BoardRoom {
    fn new(id: &str, name: &str) -> Self {
        let (tx, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self {
            board: Board::new(id, name),
            tx,
            peers: HashSet::new(),
        }
    }
}

/// Shared application state.
struct AppState {
    boards: DashMap<String, BoardRoom>,
}

impl AppState {
    fn new() -> Self {
        Self {
            boards: DashMap::new(),
        }
    }

    /// Subscribe a peer to a board's room, creating the board on first join.
    /// Returns the live channel plus the current element sequence for the
    /// join-time snapshot.
    fn join_board(
        &self,
        board_id: &str,
        peer_id: &str,
    ) -> (broadcast::Receiver<(String, ServerMessage)>, Vec<Element>) {
        let mut room = self
            .boards
            .entry(board_id.to_string())
            .or_insert_with(|| BoardRoom::new(board_id, board_id));
        room.peers.insert(peer_id.to_string());
        (room.tx.subscribe(), room.board.elements.clone())
    }

    /// Drop a peer from a board's room. The board and its elements stay;
    /// rooms are documents, not presence lists.
    fn leave_board(&self, board_id: &str, peer_id: &str) {
        if let Some(mut room) = self.boards.get_mut(board_id) {
            room.peers.remove(peer_id);
        }
    }

    /// Append an element to a board. Duplicate ids are dropped, so redelivered
    /// events cannot grow the sequence. Returns false if nothing changed.
    fn apply_drawing(&self, board_id: &str, element: Element) -> bool {
        match self.boards.get_mut(board_id) {
            Some(mut room) => room.board.push(element),
            None => false,
        }
    }

    /// Remove an element from a board. Erasing an id that is already gone is
    /// a no-op, so concurrent erases of the same element converge.
    fn apply_erase(&self, board_id: &str, id: ElementId) -> bool {
        match self.boards.get_mut(board_id) {
            Some(mut room) => room.board.remove(id).is_some(),
            None => false,
        }
    }

    fn broadcast(&self, board_id: &str, from: &str, msg: ServerMessage) {
        if let Some(room) = self.boards.get(board_id) {
            let _ = room.tx.send((from.to_string(), msg));
        }
    }
}

#[derive(Debug, Serialize)]
struct BoardSummary {
    id: String,
    name: String,
}

#[derive(Debug, Deserialize)]
struct CreateBoard {
    name: String,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sketchwire_server=info,tower_http=info".into()),
        )
        .init();

    let state = Arc::new(AppState::new());

    let app = Router::new()
        .route("/", get(index))
        .route("/ws", get(ws_handler))
        .route("/health", get(health))
        .route("/boards", get(list_boards).post(create_board))
        .route("/boards/{id}", get(get_board))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], 3030));
    info!("Sketchwire relay server listening on {}", addr);
    info!("WebSocket endpoint: ws://localhost:3030/ws");

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!("failed to bind {}: {}", addr, e);
            std::process::exit(1);
        }
    };
    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!("server error: {}", e);
    }
}

async fn index() -> &'static str {
    "Sketchwire Relay Server - Connect via WebSocket at /ws"
}

async fn health() -> &'static str {
    "ok"
}

/// `GET /boards`: summaries of every known board.
async fn list_boards(State(state): State<Arc<AppState>>) -> Json<Vec<BoardSummary>> {
    let mut boards: Vec<BoardSummary> = state
        .boards
        .iter()
        .map(|entry| BoardSummary {
            id: entry.board.id.clone(),
            name: entry.board.name.clone(),
        })
        .collect();
    boards.sort_by(|a, b| a.name.cmp(&b.name));
    Json(boards)
}

/// `POST /boards`: create a new empty board with a generated id.
async fn create_board(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateBoard>,
) -> impl IntoResponse {
    let id = Uuid::new_v4().to_string();
    let room = BoardRoom::new(&id, &req.name);
    let board = room.board.clone();
    state.boards.insert(id.clone(), room);
    info!("Created board {} ({})", id, board.name);
    (StatusCode::CREATED, Json(board))
}

/// `GET /boards/{id}`: the full `{id, name, elements}` document.
async fn get_board(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Board>, StatusCode> {
    match state.boards.get(&id) {
        Some(room) => Ok(Json(room.board.clone())),
        None => Err(StatusCode::NOT_FOUND),
    }
}

async fn ws_handler(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// One connected peer. A peer is a member of at most one board's room at a
/// time; a second join switches rooms.
async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let peer_id = Uuid::new_v4().to_string();
    info!("New connection: {}", peer_id);

    let (mut sender, mut receiver) = socket.split();
    let mut current_board: Option<String> = None;
    let mut room_rx: Option<broadcast::Receiver<(String, ServerMessage)>> = None;

    loop {
        tokio::select! {
            msg = receiver.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        match serde_json::from_str::<ClientMessage>(&text) {
                            Ok(client_msg) => match client_msg {
                                ClientMessage::Join { board } => {
                                    if let Some(ref old) = current_board {
                                        state.leave_board(old, &peer_id);
                                    }
                                    let (rx, elements) = state.join_board(&board, &peer_id);
                                    room_rx = Some(rx);
                                    current_board = Some(board.clone());

                                    let snapshot = ServerMessage::Snapshot {
                                        board: board.clone(),
                                        elements,
                                    };
                                    if send_json(&mut sender, &snapshot).await.is_err() {
                                        break;
                                    }
                                    info!("Peer {} joined board {}", peer_id, board);
                                }
                                ClientMessage::Leave => {
                                    if let Some(ref board) = current_board {
                                        state.leave_board(board, &peer_id);
                                        info!("Peer {} left board {}", peer_id, board);
                                    }
                                    current_board = None;
                                    room_rx = None;
                                }
                                ClientMessage::Drawing { board, element } => {
                                    if current_board.as_deref() != Some(board.as_str()) {
                                        warn!("Peer {} drew on unjoined board {}", peer_id, board);
                                        continue;
                                    }
                                    if state.apply_drawing(&board, element.clone()) {
                                        state.broadcast(&board.clone(), &peer_id, ServerMessage::Drawing {
                                            board,
                                            element,
                                        });
                                    }
                                }
                                ClientMessage::Erase { board, element } => {
                                    if current_board.as_deref() != Some(board.as_str()) {
                                        warn!("Peer {} erased on unjoined board {}", peer_id, board);
                                        continue;
                                    }
                                    if state.apply_erase(&board, element.id()) {
                                        state.broadcast(&board.clone(), &peer_id, ServerMessage::Erase {
                                            board,
                                            element,
                                        });
                                    }
                                }
                            },
                            Err(e) => {
                                warn!("Invalid message from {}: {}", peer_id, e);
                                let err = ServerMessage::Error {
                                    message: format!("Invalid message: {}", e),
                                };
                                let _ = send_json(&mut sender, &err).await;
                            }
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => {
                        break;
                    }
                    Some(Ok(_)) => {} // Ignore ping/pong/binary
                    Some(Err(e)) => {
                        warn!("WebSocket error for {}: {}", peer_id, e);
                        break;
                    }
                }
            }

            msg = async {
                match &mut room_rx {
                    Some(rx) => rx.recv().await.ok(),
                    // No board joined, wait forever.
                    None => std::future::pending().await,
                }
            } => {
                if let Some((from, server_msg)) = msg {
                    // Don't echo back to sender
                    if from != peer_id && send_json(&mut sender, &server_msg).await.is_err() {
                        break;
                    }
                }
            }
        }
    }

    if let Some(ref board) = current_board {
        state.leave_board(board, &peer_id);
    }
    info!("Connection closed: {}", peer_id);
}

async fn send_json<S>(sender: &mut S, msg: &ServerMessage) -> Result<(), ()>
where
    S: SinkExt<Message> + Unpin,
{
    let json = match serde_json::to_string(msg) {
        Ok(json) => json,
        Err(e) => {
            warn!("Failed to serialize message: {}", e);
            return Err(());
        }
    };
    sender.send(Message::Text(json.into())).await.map_err(|_| ())
}
