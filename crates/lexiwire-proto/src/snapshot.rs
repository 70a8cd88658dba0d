//! Server-pushed game state snapshots.
//!
//! The snapshot is the authoritative representation of the full game at a
//! point in time, broadcast as the JSON body of a STOMP MESSAGE frame. The
//! schema is explicit: a payload missing required structure is rejected as a
//! non-fatal transport error instead of flowing through the client untyped.
//! Word validity, scoring and turn arbitration all happen server-side; the
//! client only reads this state.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Snapshot rejection reasons.
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// Body was not valid JSON or missed required fields.
    #[error("malformed game snapshot: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Premium square kind, as spelled by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Premium {
    /// Letter score doubled.
    #[serde(rename = "double-letter")]
    DoubleLetter,
    /// Letter score tripled.
    #[serde(rename = "triple-letter")]
    TripleLetter,
    /// Word score doubled.
    #[serde(rename = "double-word")]
    DoubleWord,
    /// Word score tripled.
    #[serde(rename = "triple-word")]
    TripleWord,
    /// Center starting square.
    #[serde(rename = "center")]
    Center,
}

/// A letter tile. Identity is `id`; `letter` and `value` never change once
/// drawn. A blank tile carries no intrinsic letter until a placement assigns
/// one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tile {
    /// Printed letter ('?'-like placeholder for blanks is server-defined).
    pub letter: char,
    /// Point value.
    pub value: i32,
    /// Unique tile id.
    pub id: String,
    /// Whether this is a blank tile.
    #[serde(default)]
    pub is_blank: bool,
    /// Letter assigned to a played blank, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blank_letter: Option<char>,
}

/// One board square with occupancy and premium metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Square {
    /// Zero-based row.
    pub row: usize,
    /// Zero-based column.
    pub col: usize,
    /// Tile on the square, if played.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tile: Option<Tile>,
    /// Premium effect, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub premium_type: Option<Premium>,
    /// Whether a tile occupies the square.
    pub is_occupied: bool,
}

/// A player as seen by every client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    /// Player id.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Rack tiles.
    #[serde(default)]
    pub rack: Vec<Tile>,
    /// Current score.
    pub score: i32,
    /// Whether the seat is a bot.
    #[serde(default)]
    pub is_bot: bool,
}

/// Game lifecycle phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GamePhase {
    /// Waiting for players.
    Waiting,
    /// In play.
    Playing,
    /// Over.
    Finished,
}

/// The last scored move, for scoreboard display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LastMove {
    /// Player who made the move.
    pub player_id: String,
    /// Tiles played.
    #[serde(default)]
    pub tiles: Vec<Tile>,
    /// Score earned.
    pub score: i32,
}

/// Full game state at a point in time.
///
/// A newly delivered snapshot always supersedes the locally cached one;
/// there is no client-side merge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameState {
    /// Game id, also the topic discriminator.
    pub game_id: String,
    /// Board grid, row-major. Dimensions are defined here, never hard-coded.
    pub board: Vec<Vec<Square>>,
    /// All seated players.
    pub players: Vec<Player>,
    /// Id of the player whose turn it is.
    pub current_player_id: String,
    /// Lifecycle phase.
    pub game_phase: GamePhase,
    /// Per-player scores.
    #[serde(default)]
    pub scores: HashMap<String, i32>,
    /// Most recent scored move, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_move: Option<LastMove>,
    /// Seconds left on the active player's clock.
    #[serde(default)]
    pub time_remaining: u64,
}

impl GameState {
    /// Parse a STOMP MESSAGE body into a snapshot.
    pub fn from_json(body: &str) -> Result<Self, SnapshotError> {
        Ok(serde_json::from_str(body)?)
    }

    /// Board row count.
    pub fn rows(&self) -> usize {
        self.board.len()
    }

    /// Board column count.
    pub fn cols(&self) -> usize {
        self.board.first().map_or(0, Vec::len)
    }

    /// Whether a square holds a committed tile. Out-of-bounds reads as
    /// occupied so placement scans stop at the edge.
    pub fn is_occupied(&self, row: usize, col: usize) -> bool {
        self.board.get(row).and_then(|r| r.get(col)).is_none_or(|sq| sq.is_occupied)
    }

    /// Look up a player by id.
    pub fn player(&self, id: &str) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    /// Rack of the active turn-holder.
    pub fn current_rack(&self) -> &[Tile] {
        self.player(&self.current_player_id).map_or(&[], |p| p.rack.as_slice())
    }
}
