//! STOMP session state machine.
//!
//! Manages the session layer of the real-time channel: handshake,
//! per-game subscription, snapshot delivery and teardown.
//!
//! # Architecture: Action-Based State Machine
//!
//! The machine follows the action pattern:
//! - Socket lifecycle events and received text chunks come in as method
//!   calls
//! - Methods return `Vec<SessionAction>` describing intended effects
//! - Driver code executes actions (send frames, close the socket, deliver
//!   snapshots and errors to the UI)
//!
//! This keeps the protocol logic free of I/O so it can be tested against a
//! fake socket, and makes every mutation of the connection state a defined
//! transition rather than an ad hoc field write.
//!
//! # State Machine
//!
//! ```text
//! ┌──────────────┐ connect ┌────────────┐ CONNECTED ┌───────────┐
//! │ Disconnected │────────>│ Connecting │──────────>│ Connected │
//! └──────────────┘         └────────────┘           └───────────┘
//!        ▲                       │                        │
//!        │ socket closed         │ socket error     ERROR │ frame /
//!        │ (from any state)      ▼                        ▼ socket error
//!        │                  ┌─────────┐ connect ┌──────────────┐
//!        └──────────────────│  Error  │────────>│  Connecting  │
//!                           └─────────┘         └──────────────┘
//! ```
//!
//! There is no automatic reconnect: a dropped connection parks the session
//! in `Error` or `Disconnected` and a fresh `connect` is the caller's call.

use lexiwire_proto::{Command, Frame, FrameBuffer, GameState, is_heartbeat};
use tracing::{debug, warn};

use crate::error::SessionError;

/// Transport lifecycle phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No socket, no session.
    Disconnected,
    /// Socket opening / CONNECT sent, waiting for CONNECTED.
    Connecting,
    /// Handshake done, subscribed to the game topic.
    Connected,
    /// Socket or protocol failure; a fresh connect may be attempted.
    Error,
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Disconnected => "disconnected",
            Self::Connecting => "connecting",
            Self::Connected => "connected",
            Self::Error => "error",
        };
        f.write_str(s)
    }
}

/// Actions returned by the session state machine.
///
/// The driver executes these:
/// - `SendFrame`: encode and send over the socket, best-effort
/// - `CloseSocket`: close and release the socket
/// - `Snapshot` / `ProtocolError`: deliver to the UI event stream
#[derive(Debug, Clone, PartialEq)]
pub enum SessionAction {
    /// Send this STOMP frame to the server.
    SendFrame(Frame),
    /// Close the underlying socket.
    CloseSocket,
    /// A decoded game-state snapshot, superseding any cached state.
    Snapshot(Box<GameState>),
    /// Non-fatal, user-visible transport error.
    ProtocolError(String),
}

/// STOMP session over a single game topic.
///
/// Owns the connection state, the subscription id and the receive buffer.
/// Holds no socket; the driver owns I/O and feeds events in.
#[derive(Debug, Default)]
pub struct StompSession {
    state: SessionState,
    game_id: Option<String>,
    subscription_id: Option<String>,
    buffer: FrameBuffer,
}

impl Default for SessionState {
    fn default() -> Self {
        Self::Disconnected
    }
}

impl StompSession {
    /// New session in `Disconnected`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current lifecycle phase.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Active subscription id, if subscribed.
    pub fn subscription_id(&self) -> Option<&str> {
        self.subscription_id.as_deref()
    }

    /// Topic for a game's broadcasts.
    pub fn topic(game_id: &str) -> String {
        format!("/topic/game/{game_id}")
    }

    /// Begin connecting for a game.
    ///
    /// Legal from `Disconnected` and `Error` only. Transition only; the
    /// driver opens the WebSocket (with the STOMP sub-protocols) and calls
    /// [`Self::socket_opened`] once it is up.
    ///
    /// # Errors
    /// `InvalidState` when a connect is already in progress or established.
    pub fn connect(&mut self, game_id: &str) -> Result<Vec<SessionAction>, SessionError> {
        match self.state {
            SessionState::Disconnected | SessionState::Error => {
                debug!(game_id, "session connecting");
                self.state = SessionState::Connecting;
                self.game_id = Some(game_id.to_string());
                self.buffer.clear();
                Ok(vec![])
            },
            state => Err(SessionError::InvalidState { state, operation: "connect" }),
        }
    }

    /// Socket is open: send the CONNECT handshake frame.
    pub fn socket_opened(&mut self) -> Vec<SessionAction> {
        if self.state != SessionState::Connecting {
            warn!(state = %self.state, "socket opened outside of connect");
            return vec![];
        }
        vec![SessionAction::SendFrame(Frame::connect())]
    }

    /// Process one received WebSocket text payload.
    ///
    /// Heartbeat payloads are no-ops. Everything else goes through the
    /// receive buffer, which drains every complete frame in the chunk in
    /// delivery order, keeping a trailing partial for the next call.
    pub fn handle_chunk(&mut self, chunk: &str) -> Vec<SessionAction> {
        if is_heartbeat(chunk) {
            return vec![];
        }

        let mut actions = Vec::new();
        for frame in self.buffer.push(chunk) {
            actions.extend(self.handle_frame(frame));
        }
        actions
    }

    fn handle_frame(&mut self, frame: Frame) -> Vec<SessionAction> {
        match frame.command {
            Command::Connected => self.on_connected(),
            Command::Message => self.on_message(&frame.body),
            Command::Error => {
                let detail = if frame.body.is_empty() {
                    "STOMP error".to_string()
                } else {
                    frame.body
                };
                warn!(%detail, "server ERROR frame");
                self.state = SessionState::Error;
                vec![SessionAction::ProtocolError(detail)]
            },
            other => {
                debug!(command = %other, "dropping unhandled frame");
                vec![]
            },
        }
    }

    fn on_connected(&mut self) -> Vec<SessionAction> {
        if self.state != SessionState::Connecting {
            warn!(state = %self.state, "CONNECTED frame outside handshake");
            return vec![];
        }
        let Some(game_id) = self.game_id.clone() else {
            return vec![];
        };

        self.state = SessionState::Connected;
        let sub_id = format!("sub-{game_id}");
        debug!(%sub_id, "session connected, subscribing");
        self.subscription_id = Some(sub_id.clone());
        vec![SessionAction::SendFrame(Frame::subscribe(&sub_id, &Self::topic(&game_id)))]
    }

    /// A MESSAGE body is a snapshot. A body that fails to parse must not
    /// kill the session: it surfaces as a non-fatal protocol error.
    fn on_message(&mut self, body: &str) -> Vec<SessionAction> {
        if body.is_empty() {
            return vec![];
        }
        match GameState::from_json(body) {
            Ok(state) => vec![SessionAction::Snapshot(Box::new(state))],
            Err(err) => {
                warn!(%err, "dropping malformed snapshot");
                vec![SessionAction::ProtocolError("Malformed game update".to_string())]
            },
        }
    }

    /// Socket-level failure. The session parks in `Error` until the caller
    /// retries; a close event usually follows and moves it to
    /// `Disconnected`.
    pub fn socket_error(&mut self) -> Vec<SessionAction> {
        warn!(state = %self.state, "socket error");
        self.state = SessionState::Error;
        self.subscription_id = None;
        self.buffer.clear();
        vec![SessionAction::ProtocolError("WebSocket error".to_string())]
    }

    /// Socket closed, for any reason and from any state. Local session
    /// fields reset; the driver releases the socket reference.
    pub fn socket_closed(&mut self) -> Vec<SessionAction> {
        debug!(state = %self.state, "socket closed");
        self.state = SessionState::Disconnected;
        self.subscription_id = None;
        self.game_id = None;
        self.buffer.clear();
        vec![]
    }

    /// Graceful shutdown.
    ///
    /// When connected, emits best-effort UNSUBSCRIBE and DISCONNECT frames
    /// before the close; the driver swallows send failures. Local fields
    /// are cleared unconditionally, even if the graceful frames never make
    /// it out.
    pub fn disconnect(&mut self) -> Vec<SessionAction> {
        let mut actions = Vec::new();
        if self.state == SessionState::Connected {
            if let Some(sub_id) = self.subscription_id.take() {
                actions.push(SessionAction::SendFrame(Frame::unsubscribe(&sub_id)));
            }
            actions.push(SessionAction::SendFrame(Frame::disconnect()));
        }
        actions.push(SessionAction::CloseSocket);

        self.state = SessionState::Disconnected;
        self.subscription_id = None;
        self.game_id = None;
        self.buffer.clear();
        actions
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn connected_frame() -> String {
        "CONNECTED\nversion:1.2\n\n\0".to_string()
    }

    fn snapshot_json() -> String {
        r#"{
            "gameId": "g1",
            "board": [[{"row": 0, "col": 0, "isOccupied": false}]],
            "players": [{"id": "p1", "name": "Ada", "score": 0}],
            "currentPlayerId": "p1",
            "gamePhase": "playing"
        }"#
        .to_string()
    }

    fn handshake(session: &mut StompSession) {
        session.connect("g1").unwrap();
        let actions = session.socket_opened();
        assert!(
            matches!(&actions[0], SessionAction::SendFrame(f) if f.command == Command::Connect)
        );
        session.handle_chunk(&connected_frame());
    }

    #[test]
    fn session_lifecycle() {
        let mut session = StompSession::new();
        assert_eq!(session.state(), SessionState::Disconnected);

        session.connect("g1").unwrap();
        assert_eq!(session.state(), SessionState::Connecting);

        let actions = session.socket_opened();
        assert_eq!(actions, vec![SessionAction::SendFrame(Frame::connect())]);

        let actions = session.handle_chunk(&connected_frame());
        assert_eq!(session.state(), SessionState::Connected);
        assert_eq!(session.subscription_id(), Some("sub-g1"));
        assert_eq!(
            actions,
            vec![SessionAction::SendFrame(Frame::subscribe("sub-g1", "/topic/game/g1"))]
        );
    }

    #[test]
    fn connect_is_rejected_while_active() {
        let mut session = StompSession::new();
        session.connect("g1").unwrap();
        let err = session.connect("g1").unwrap_err();
        assert_eq!(
            err,
            SessionError::InvalidState {
                state: SessionState::Connecting,
                operation: "connect"
            }
        );
    }

    #[test]
    fn connect_is_allowed_from_error_state() {
        let mut session = StompSession::new();
        handshake(&mut session);
        session.socket_error();
        assert_eq!(session.state(), SessionState::Error);
        session.connect("g1").unwrap();
        assert_eq!(session.state(), SessionState::Connecting);
    }

    #[test]
    fn message_frame_delivers_snapshot() {
        let mut session = StompSession::new();
        handshake(&mut session);

        let chunk = format!("MESSAGE\ndestination:/topic/game/g1\n\n{}\0", snapshot_json());
        let actions = session.handle_chunk(&chunk);
        assert_eq!(actions.len(), 1);
        match &actions[0] {
            SessionAction::Snapshot(state) => assert_eq!(state.game_id, "g1"),
            other => panic!("expected snapshot, got {other:?}"),
        }
    }

    #[test]
    fn malformed_snapshot_is_non_fatal() {
        let mut session = StompSession::new();
        handshake(&mut session);

        let actions = session.handle_chunk("MESSAGE\n\nnot json\0");
        assert_eq!(
            actions,
            vec![SessionAction::ProtocolError("Malformed game update".to_string())]
        );
        // Session survives and keeps delivering.
        assert_eq!(session.state(), SessionState::Connected);
        let chunk = format!("MESSAGE\n\n{}\0", snapshot_json());
        assert_eq!(session.handle_chunk(&chunk).len(), 1);
    }

    #[test]
    fn error_frame_parks_session_in_error() {
        let mut session = StompSession::new();
        handshake(&mut session);

        let actions = session.handle_chunk("ERROR\nmessage:bad\n\nsomething broke\0");
        assert_eq!(
            actions,
            vec![SessionAction::ProtocolError("something broke".to_string())]
        );
        assert_eq!(session.state(), SessionState::Error);
    }

    #[test]
    fn coalesced_frames_are_all_processed() {
        let mut session = StompSession::new();
        session.connect("g1").unwrap();
        session.socket_opened();

        // CONNECTED and a MESSAGE arriving in one WebSocket payload.
        let chunk = format!("{}MESSAGE\n\n{}\0", connected_frame(), snapshot_json());
        let actions = session.handle_chunk(&chunk);
        assert_eq!(actions.len(), 2);
        assert!(matches!(&actions[0], SessionAction::SendFrame(f) if f.command == Command::Subscribe));
        assert!(matches!(&actions[1], SessionAction::Snapshot(_)));
    }

    #[test]
    fn heartbeats_are_ignored() {
        let mut session = StompSession::new();
        handshake(&mut session);
        assert!(session.handle_chunk("").is_empty());
        assert!(session.handle_chunk("\n").is_empty());
        assert!(session.handle_chunk("\r\n").is_empty());
    }

    #[test]
    fn socket_close_resets_session_fields() {
        let mut session = StompSession::new();
        handshake(&mut session);
        assert!(session.subscription_id().is_some());

        session.socket_closed();
        assert_eq!(session.state(), SessionState::Disconnected);
        assert_eq!(session.subscription_id(), None);
    }

    #[test]
    fn disconnect_sends_graceful_frames_then_closes() {
        let mut session = StompSession::new();
        handshake(&mut session);

        let actions = session.disconnect();
        assert_eq!(
            actions,
            vec![
                SessionAction::SendFrame(Frame::unsubscribe("sub-g1")),
                SessionAction::SendFrame(Frame::disconnect()),
                SessionAction::CloseSocket,
            ]
        );
        assert_eq!(session.state(), SessionState::Disconnected);
        assert_eq!(session.subscription_id(), None);
    }

    #[test]
    fn disconnect_before_handshake_just_closes() {
        let mut session = StompSession::new();
        session.connect("g1").unwrap();
        let actions = session.disconnect();
        assert_eq!(actions, vec![SessionAction::CloseSocket]);
        assert_eq!(session.state(), SessionState::Disconnected);
    }
}
