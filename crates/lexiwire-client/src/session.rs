//! Session driver: executes the pure session state machine over a socket.
//!
//! One tokio task owns the socket and the [`StompSession`]. Socket events
//! and disconnect commands are multiplexed with `select!`; every batch of
//! [`SessionAction`]s the machine returns is executed in order, and the
//! connection state is published through a `watch` channel after each
//! batch. Snapshots and protocol errors stream out over an `mpsc` channel
//! in delivery order, so a later snapshot always supersedes an earlier one.
//!
//! There is no reconnect logic here: when the task ends the handle's status
//! parks at the machine's terminal state and the caller decides whether to
//! spawn a fresh session.

use lexiwire_core::{SessionAction, SessionError, SessionState, StompSession};
use lexiwire_proto::GameState;
use tokio::{
    sync::{mpsc, watch},
    task::JoinHandle,
};
use tracing::warn;

use crate::socket::{GameSocket, SocketEvent};

/// Events delivered to the UI layer.
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    /// Authoritative game state; replaces anything cached.
    Snapshot(Box<GameState>),
    /// Non-fatal, user-visible transport error.
    ProtocolError(String),
}

enum SessionCommand {
    Disconnect,
}

/// Handle to a running session task.
///
/// Dropping the handle aborts the task and synchronously releases the
/// socket; [`SessionHandle::disconnect`] shuts down gracefully with the
/// UNSUBSCRIBE/DISCONNECT frames first.
pub struct SessionHandle {
    status: watch::Receiver<SessionState>,
    events: mpsc::Receiver<GameEvent>,
    commands: mpsc::Sender<SessionCommand>,
    task: Option<JoinHandle<()>>,
}

impl SessionHandle {
    /// Connection state right now.
    pub fn state(&self) -> SessionState {
        *self.status.borrow()
    }

    /// Watchable connection status signal.
    pub fn status(&self) -> watch::Receiver<SessionState> {
        self.status.clone()
    }

    /// Next snapshot or protocol error; `None` once the session task ends.
    pub async fn next_event(&mut self) -> Option<GameEvent> {
        self.events.recv().await
    }

    /// Graceful shutdown: best-effort UNSUBSCRIBE and DISCONNECT, close,
    /// and wait for the task to finish.
    pub async fn disconnect(mut self) {
        let _ = self.commands.send(SessionCommand::Disconnect).await;
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }
}

impl Drop for SessionHandle {
    fn drop(&mut self) {
        if let Some(task) = &self.task {
            task.abort();
        }
    }
}

/// Start a session over an already-open socket for a game topic.
///
/// # Errors
/// Propagates [`SessionError`] from the state machine; a fresh session
/// cannot actually refuse a connect.
pub fn spawn_session<S>(socket: S, game_id: &str) -> Result<SessionHandle, SessionError>
where
    S: GameSocket + 'static,
{
    let mut session = StompSession::new();
    session.connect(game_id)?;

    let (status_tx, status_rx) = watch::channel(session.state());
    let (events_tx, events_rx) = mpsc::channel(32);
    let (commands_tx, commands_rx) = mpsc::channel(4);

    let task = tokio::spawn(run(socket, session, status_tx, events_tx, commands_rx));

    Ok(SessionHandle {
        status: status_rx,
        events: events_rx,
        commands: commands_tx,
        task: Some(task),
    })
}

async fn run<S: GameSocket>(
    mut socket: S,
    mut session: StompSession,
    status: watch::Sender<SessionState>,
    events: mpsc::Sender<GameEvent>,
    mut commands: mpsc::Receiver<SessionCommand>,
) {
    // The socket handed to us is already open.
    let actions = session.socket_opened();
    execute(&mut socket, &events, actions).await;
    status.send_replace(session.state());

    loop {
        tokio::select! {
            // Disconnect command, or every handle dropped.
            cmd = commands.recv() => {
                let _ = cmd;
                let actions = session.disconnect();
                execute(&mut socket, &events, actions).await;
                status.send_replace(session.state());
                break;
            },
            event = socket.recv() => {
                let closed = matches!(event, Some(SocketEvent::Closed) | None);
                let actions = match event {
                    Some(SocketEvent::Text(text)) => session.handle_chunk(&text),
                    Some(SocketEvent::Failed(_)) => session.socket_error(),
                    Some(SocketEvent::Closed) | None => session.socket_closed(),
                };
                execute(&mut socket, &events, actions).await;
                status.send_replace(session.state());
                if closed {
                    break;
                }
            },
        }
    }
}

async fn execute<S: GameSocket>(
    socket: &mut S,
    events: &mpsc::Sender<GameEvent>,
    actions: Vec<SessionAction>,
) {
    for action in actions {
        match action {
            SessionAction::SendFrame(frame) => {
                // Best-effort: a failed send will also surface through the
                // socket event stream.
                if let Err(err) = socket.send(frame.to_wire()).await {
                    warn!(%err, "frame send failed");
                }
            },
            SessionAction::CloseSocket => socket.close().await,
            SessionAction::Snapshot(state) => {
                let _ = events.send(GameEvent::Snapshot(state)).await;
            },
            SessionAction::ProtocolError(detail) => {
                let _ = events.send(GameEvent::ProtocolError(detail)).await;
            },
        }
    }
}
