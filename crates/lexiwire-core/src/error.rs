//! Error types for the core state machines.
//!
//! Placement errors double as the user-facing warning text: the UI shows
//! them as transient, auto-expiring banners. None of them mutate engine
//! state when returned.

use thiserror::Error;

use crate::session::SessionState;

/// Session state machine misuse.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    /// Operation not valid in the current state.
    #[error("cannot {operation} while {state}")]
    InvalidState {
        /// State the session was in.
        state: SessionState,
        /// Operation that was attempted.
        operation: &'static str,
    },
}

/// Rejected placement-engine input.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PlacementError {
    /// Acting player is not the turn-holder.
    #[error("Invalid Turn: It is not your turn.")]
    NotYourTurn,

    /// No anchor square has been chosen yet.
    #[error("Missing Starting Point: Click a starting square first.")]
    NoAnchor,

    /// No unused rack tile matches the requested letter.
    #[error("Invalid Tile: You do not have that tile in your rack.")]
    TileNotInRack,

    /// The scan from the anchor ran off the board edge.
    #[error("Word Off Board: No more space in this direction.")]
    NoSpace,
}
