//! Wire format for the Lexiwire real-time channel.
//!
//! The game server pushes state over STOMP-on-WebSocket, and this crate
//! implements the handful of the protocol we actually speak: text frames
//! consisting of a command line, `key:value` header lines, a blank line,
//! and a NUL-terminated body. No STOMP library is involved; the frames the
//! client sends are all bodyless control frames, and the frames it receives
//! carry JSON game-state snapshots.
//!
//! Decoding is pure and stateless. A malformed or partial frame decodes to
//! `None` rather than an error, because the session layer must tolerate
//! silent drops. Servers and proxies may coalesce several frames into one
//! WebSocket message, so [`codec::FrameBuffer`] drains every complete frame
//! from a chunk and keeps any trailing partial for the next one.

pub mod codec;
pub mod frame;
pub mod snapshot;

pub use codec::{FrameBuffer, decode_first, is_heartbeat};
pub use frame::{Command, Frame};
pub use snapshot::{GamePhase, GameState, Player, SnapshotError, Square, Tile};
