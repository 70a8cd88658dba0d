//! Lexiwire client core logic
//!
//! Pure state machine logic for the game client, completely decoupled from
//! I/O. This enables deterministic testing against fake sockets and scripted
//! input streams.
//!
//! # Architecture
//!
//! The two machines in this crate are isolated from sockets, HTTP, time and
//! rendering. All external inputs (socket lifecycle events, received text
//! chunks, keystrokes, board snapshots) are supplied explicitly by the
//! caller.
//!
//! State transitions produce declarative actions or errors that describe
//! intended effects rather than executing them directly. A runtime (the
//! async driver in `lexiwire-client`) is responsible for interpreting and
//! executing them.
//!
//! # Components
//!
//! - [`session`]: STOMP session state machine (handshake, subscribe,
//!   snapshot/error delivery, teardown)
//! - [`placement`]: move composition from raw square clicks and keystrokes
//! - [`error`]: session and placement error types

pub mod error;
pub mod placement;
pub mod session;

pub use error::{PlacementError, SessionError};
pub use placement::{Direction, PendingPlacement, PlacementEngine, Position, select_exchange_tiles};
pub use session::{SessionAction, SessionState, StompSession};
