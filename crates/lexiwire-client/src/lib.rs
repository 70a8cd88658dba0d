//! Async I/O layer for the Lexiwire client.
//!
//! Everything decision-shaped lives in `lexiwire-core`; this crate only
//! executes it. The session driver owns a WebSocket, feeds lifecycle events
//! and text chunks into the pure [`lexiwire_core::StompSession`], and
//! carries out the actions it returns. The move gateway issues the REST
//! commands (join, submit, exchange, pass) that are the only way a move
//! leaves the client.
//!
//! Sockets are injected behind the [`GameSocket`] trait so the whole
//! session flow can be tested against a scripted fake without a network.

mod error;
mod gateway;
mod session;
mod socket;

pub use error::GatewayError;
pub use gateway::{JoinResponse, MoveGateway};
pub use session::{GameEvent, SessionHandle, spawn_session};
pub use socket::{GameSocket, STOMP_SUBPROTOCOLS, SocketEvent, WsSocket};
