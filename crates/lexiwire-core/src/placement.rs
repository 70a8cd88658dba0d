//! Move composition from raw input events.
//!
//! The placement engine turns a stream of square clicks and keystrokes into
//! an ordered, validated buffer of tentative tile placements, before a move
//! is ever submitted. It knows nothing about word legality or scoring;
//! those are the server's problem. What it guarantees:
//!
//! - no two pending placements share a coordinate
//! - no rack tile appears in more than one pending placement
//! - every pending placement sits on a square the last snapshot showed as
//!   unoccupied
//! - nothing mutates unless it is the acting player's turn
//!
//! The buffer lives until the move is submitted or cancelled; rejected
//! inputs surface as [`PlacementError`] values carrying the user-facing
//! warning text and never change engine state.

use lexiwire_proto::{GameState, Tile};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::PlacementError;

/// Zero-based board coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    /// Row index.
    pub row: usize,
    /// Column index.
    pub col: usize,
}

impl Position {
    /// Construct from row/col.
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

/// Typing direction from the anchor square.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Direction {
    /// Left to right.
    #[default]
    Horizontal,
    /// Top to bottom.
    Vertical,
}

impl Direction {
    /// The other direction.
    pub fn toggled(self) -> Self {
        match self {
            Self::Horizontal => Self::Vertical,
            Self::Vertical => Self::Horizontal,
        }
    }
}

/// A tile tentatively placed but not yet submitted.
///
/// `letter` is set only when `tile_id` refers to a blank tile, recording the
/// letter assigned for this placement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingPlacement {
    /// Zero-based row.
    pub row: usize,
    /// Zero-based column.
    pub col: usize,
    /// Rack tile id.
    pub tile_id: String,
    /// Assigned letter, blanks only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub letter: Option<char>,
}

/// Single-player-perspective move composition state.
#[derive(Debug, Default)]
pub struct PlacementEngine {
    anchor: Option<Position>,
    direction: Direction,
    placements: Vec<PendingPlacement>,
}

impl PlacementEngine {
    /// Fresh engine: no anchor, horizontal, empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Square where the current word began, if a word is in progress.
    pub fn anchor(&self) -> Option<Position> {
        self.anchor
    }

    /// Current typing direction. Meaningful only while an anchor exists.
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Buffered placements, in placement order.
    pub fn placements(&self) -> &[PendingPlacement] {
        &self.placements
    }

    /// Whether a rack tile is already claimed by a pending placement.
    pub fn is_tile_used(&self, tile_id: &str) -> bool {
        self.placements.iter().any(|p| p.tile_id == tile_id)
    }

    /// Handle a square click.
    ///
    /// No anchor yet: the square becomes the anchor. Clicking the anchor
    /// again toggles direction. Any other square moves the anchor; pending
    /// placements are kept, only the anchor/direction cursor moves.
    pub fn activate_square(&mut self, square: Position, my_turn: bool) -> Result<(), PlacementError> {
        if !my_turn {
            return Err(PlacementError::NotYourTurn);
        }
        match self.anchor {
            None => self.anchor = Some(square),
            Some(anchor) if anchor == square => {
                self.direction = self.direction.toggled();
                debug!(direction = ?self.direction, "direction toggled");
            },
            Some(_) => self.anchor = Some(square),
        }
        Ok(())
    }

    /// Select an unused rack tile for a typed letter.
    ///
    /// With `prefer_blank`, an unused blank wins outright. Otherwise a
    /// case-insensitive exact letter match among unused tiles is preferred,
    /// falling back to an unused blank. `None` means the keystroke must be
    /// rejected with a tile-not-in-rack warning.
    pub fn resolve_letter<'a>(
        &self,
        rack: &'a [Tile],
        letter: char,
        prefer_blank: bool,
    ) -> Option<&'a Tile> {
        let unused = |t: &&Tile| !self.is_tile_used(&t.id);

        if prefer_blank {
            if let Some(blank) = rack.iter().filter(unused).find(|t| t.is_blank) {
                return Some(blank);
            }
        }
        rack.iter()
            .filter(unused)
            .find(|t| t.letter.eq_ignore_ascii_case(&letter))
            .or_else(|| rack.iter().filter(unused).find(|t| t.is_blank))
    }

    /// Resolve a keystroke to a tile and append its placement.
    ///
    /// The target square is the next unoccupied square scanning from the
    /// anchor along the current direction, skipping squares occupied on the
    /// board or already claimed this move. The anchor square itself is
    /// eligible only for the very first placement of the move. The anchor
    /// does not move on success.
    pub fn place_letter(
        &mut self,
        letter: char,
        prefer_blank: bool,
        rack: &[Tile],
        board: &GameState,
        my_turn: bool,
    ) -> Result<PendingPlacement, PlacementError> {
        if !my_turn {
            return Err(PlacementError::NotYourTurn);
        }
        let anchor = self.anchor.ok_or(PlacementError::NoAnchor)?;
        let tile = self
            .resolve_letter(rack, letter, prefer_blank)
            .ok_or(PlacementError::TileNotInRack)?;

        let spot = self.next_open_square(anchor, board).ok_or(PlacementError::NoSpace)?;

        let placement = PendingPlacement {
            row: spot.row,
            col: spot.col,
            tile_id: tile.id.clone(),
            letter: tile.is_blank.then_some(letter.to_ascii_uppercase()),
        };
        debug!(row = spot.row, col = spot.col, tile_id = %placement.tile_id, "tile placed");
        self.placements.push(placement.clone());
        Ok(placement)
    }

    /// First unoccupied square from the anchor along the current direction.
    fn next_open_square(&self, anchor: Position, board: &GameState) -> Option<Position> {
        let (rows, cols) = (board.rows(), board.cols());
        let mut pos = anchor;
        let mut first = true;

        while pos.row < rows && pos.col < cols {
            let claimed = board.is_occupied(pos.row, pos.col)
                || self.placements.iter().any(|p| p.row == pos.row && p.col == pos.col);
            if !claimed && (!first || self.placements.is_empty()) {
                return Some(pos);
            }
            first = false;
            match self.direction {
                Direction::Horizontal => pos.col += 1,
                Direction::Vertical => pos.row += 1,
            }
        }
        None
    }

    /// Delete the pending placement at a square. Idempotent no-op when no
    /// placement is there.
    pub fn remove_placement(
        &mut self,
        square: Position,
        my_turn: bool,
    ) -> Result<bool, PlacementError> {
        if !my_turn {
            return Err(PlacementError::NotYourTurn);
        }
        let before = self.placements.len();
        self.placements.retain(|p| !(p.row == square.row && p.col == square.col));
        Ok(self.placements.len() != before)
    }

    /// Clear anchor, direction (back to horizontal) and all placements.
    /// Invoked after successful submission or explicit cancel. Idempotent.
    pub fn reset(&mut self) {
        self.anchor = None;
        self.direction = Direction::Horizontal;
        self.placements.clear();
    }
}

/// Map typed letters to unused rack tile ids for an exchange request.
///
/// Each letter claims one tile: an exact (case-insensitive) match, or a
/// blank that has no assigned letter yet. Letters with no matching tile are
/// skipped; an empty result means none of them were in the rack.
pub fn select_exchange_tiles(rack: &[Tile], letters: &str) -> Vec<String> {
    let mut ids: Vec<String> = Vec::new();
    for letter in letters.chars().filter(|c| c.is_ascii_alphabetic()) {
        let found = rack.iter().find(|t| {
            !ids.contains(&t.id)
                && (t.letter.eq_ignore_ascii_case(&letter)
                    || (t.is_blank && t.blank_letter.is_none()))
        });
        if let Some(tile) = found {
            ids.push(tile.id.clone());
        }
    }
    ids
}

#[cfg(test)]
mod tests {
    use lexiwire_proto::{GamePhase, Player, Square};

    use super::*;

    fn tile(id: &str, letter: char, value: i32) -> Tile {
        Tile { letter, value, id: id.to_string(), is_blank: false, blank_letter: None }
    }

    fn blank(id: &str) -> Tile {
        Tile { letter: '?', value: 0, id: id.to_string(), is_blank: true, blank_letter: None }
    }

    fn empty_board(rows: usize, cols: usize) -> GameState {
        let board = (0..rows)
            .map(|row| {
                (0..cols)
                    .map(|col| Square {
                        row,
                        col,
                        tile: None,
                        premium_type: None,
                        is_occupied: false,
                    })
                    .collect()
            })
            .collect();
        GameState {
            game_id: "g1".to_string(),
            board,
            players: vec![Player {
                id: "p1".to_string(),
                name: "Ada".to_string(),
                rack: Vec::new(),
                score: 0,
                is_bot: false,
            }],
            current_player_id: "p1".to_string(),
            game_phase: GamePhase::Playing,
            scores: std::collections::HashMap::new(),
            last_move: None,
            time_remaining: 0,
        }
    }

    fn cat_rack() -> Vec<Tile> {
        vec![tile("t-c", 'C', 3), tile("t-a", 'A', 1), tile("t-t", 'T', 1)]
    }

    #[test]
    fn cat_lands_on_consecutive_squares() {
        let board = empty_board(15, 15);
        let rack = cat_rack();
        let mut engine = PlacementEngine::new();
        engine.activate_square(Position::new(7, 7), true).unwrap();

        for letter in ['C', 'A', 'T'] {
            engine.place_letter(letter, false, &rack, &board, true).unwrap();
        }

        let placed: Vec<_> =
            engine.placements().iter().map(|p| (p.row, p.col, p.tile_id.clone())).collect();
        assert_eq!(
            placed,
            vec![
                (7, 7, "t-c".to_string()),
                (7, 8, "t-a".to_string()),
                (7, 9, "t-t".to_string()),
            ]
        );
    }

    #[test]
    fn occupied_board_square_is_skipped() {
        let mut board = empty_board(15, 15);
        board.board[7][8].is_occupied = true;
        let rack = cat_rack();
        let mut engine = PlacementEngine::new();
        engine.activate_square(Position::new(7, 7), true).unwrap();

        engine.place_letter('C', false, &rack, &board, true).unwrap();
        let second = engine.place_letter('A', false, &rack, &board, true).unwrap();
        assert_eq!((second.row, second.col), (7, 9));
    }

    #[test]
    fn clicking_anchor_toggles_direction() {
        let board = empty_board(15, 15);
        let rack = cat_rack();
        let mut engine = PlacementEngine::new();
        engine.activate_square(Position::new(7, 7), true).unwrap();
        assert_eq!(engine.direction(), Direction::Horizontal);

        engine.activate_square(Position::new(7, 7), true).unwrap();
        assert_eq!(engine.direction(), Direction::Vertical);

        engine.place_letter('C', false, &rack, &board, true).unwrap();
        let second = engine.place_letter('A', false, &rack, &board, true).unwrap();
        assert_eq!((second.row, second.col), (8, 7));
    }

    #[test]
    fn moving_anchor_keeps_pending_placements() {
        let board = empty_board(15, 15);
        let rack = cat_rack();
        let mut engine = PlacementEngine::new();
        engine.activate_square(Position::new(7, 7), true).unwrap();
        engine.place_letter('C', false, &rack, &board, true).unwrap();

        engine.activate_square(Position::new(3, 3), true).unwrap();
        assert_eq!(engine.anchor(), Some(Position::new(3, 3)));
        assert_eq!(engine.placements().len(), 1);
    }

    #[test]
    fn shift_letter_prefers_blank_even_with_exact_match() {
        let board = empty_board(15, 15);
        let rack = vec![tile("t-a", 'A', 1), blank("t-blank")];
        let mut engine = PlacementEngine::new();
        engine.activate_square(Position::new(7, 7), true).unwrap();

        let placed = engine.place_letter('A', true, &rack, &board, true).unwrap();
        assert_eq!(placed.tile_id, "t-blank");
        assert_eq!(placed.letter, Some('A'));
    }

    #[test]
    fn missing_exact_match_falls_back_to_blank() {
        let board = empty_board(15, 15);
        let rack = vec![tile("t-a", 'A', 1), blank("t-blank")];
        let mut engine = PlacementEngine::new();
        engine.activate_square(Position::new(7, 7), true).unwrap();

        let placed = engine.place_letter('Z', false, &rack, &board, true).unwrap();
        assert_eq!(placed.tile_id, "t-blank");
        assert_eq!(placed.letter, Some('Z'));
    }

    #[test]
    fn unknown_letter_without_blank_is_rejected() {
        let board = empty_board(15, 15);
        let rack = vec![tile("t-a", 'A', 1)];
        let mut engine = PlacementEngine::new();
        engine.activate_square(Position::new(7, 7), true).unwrap();

        let err = engine.place_letter('Z', false, &rack, &board, true).unwrap_err();
        assert_eq!(err, PlacementError::TileNotInRack);
        assert!(engine.placements().is_empty());
    }

    #[test]
    fn each_tile_is_claimed_once() {
        let board = empty_board(15, 15);
        let rack = vec![tile("t-a", 'A', 1)];
        let mut engine = PlacementEngine::new();
        engine.activate_square(Position::new(7, 7), true).unwrap();

        engine.place_letter('A', false, &rack, &board, true).unwrap();
        let err = engine.place_letter('A', false, &rack, &board, true).unwrap_err();
        assert_eq!(err, PlacementError::TileNotInRack);
    }

    #[test]
    fn letter_without_anchor_is_rejected() {
        let board = empty_board(15, 15);
        let mut engine = PlacementEngine::new();
        let err = engine.place_letter('A', false, &cat_rack(), &board, true).unwrap_err();
        assert_eq!(err, PlacementError::NoAnchor);
    }

    #[test]
    fn running_off_the_edge_is_no_space() {
        let board = empty_board(1, 1);
        let rack = cat_rack();
        let mut engine = PlacementEngine::new();
        engine.activate_square(Position::new(0, 0), true).unwrap();

        engine.place_letter('C', false, &rack, &board, true).unwrap();
        let err = engine.place_letter('A', false, &rack, &board, true).unwrap_err();
        assert_eq!(err, PlacementError::NoSpace);
        assert_eq!(engine.placements().len(), 1);
    }

    #[test]
    fn every_mutation_is_turn_gated() {
        let board = empty_board(15, 15);
        let rack = cat_rack();
        let mut engine = PlacementEngine::new();

        assert_eq!(
            engine.activate_square(Position::new(7, 7), false),
            Err(PlacementError::NotYourTurn)
        );
        assert_eq!(
            engine.place_letter('C', false, &rack, &board, false),
            Err(PlacementError::NotYourTurn)
        );
        assert_eq!(
            engine.remove_placement(Position::new(7, 7), false),
            Err(PlacementError::NotYourTurn)
        );

        assert_eq!(engine.anchor(), None);
        assert!(engine.placements().is_empty());
    }

    #[test]
    fn remove_is_idempotent() {
        let board = empty_board(15, 15);
        let rack = cat_rack();
        let mut engine = PlacementEngine::new();
        engine.activate_square(Position::new(7, 7), true).unwrap();
        engine.place_letter('C', false, &rack, &board, true).unwrap();

        assert_eq!(engine.remove_placement(Position::new(7, 7), true), Ok(true));
        assert_eq!(engine.remove_placement(Position::new(7, 7), true), Ok(false));
        assert!(engine.placements().is_empty());
    }

    #[test]
    fn reset_is_idempotent() {
        let board = empty_board(15, 15);
        let rack = cat_rack();
        let mut engine = PlacementEngine::new();
        engine.activate_square(Position::new(7, 7), true).unwrap();
        engine.place_letter('C', false, &rack, &board, true).unwrap();

        engine.reset();
        assert_eq!(engine.anchor(), None);
        assert_eq!(engine.direction(), Direction::Horizontal);
        assert!(engine.placements().is_empty());

        engine.reset();
        assert_eq!(engine.anchor(), None);
        assert_eq!(engine.direction(), Direction::Horizontal);
        assert!(engine.placements().is_empty());
    }

    #[test]
    fn exchange_selection_maps_letters_to_tile_ids() {
        let rack = vec![tile("t-a", 'A', 1), tile("t-e", 'E', 1), blank("t-blank")];

        let ids = select_exchange_tiles(&rack, "AEZ");
        assert_eq!(ids, vec!["t-a".to_string(), "t-e".to_string(), "t-blank".to_string()]);

        assert!(select_exchange_tiles(&[tile("t-q", 'Q', 10)], "AEI").is_empty());
    }

    #[test]
    fn exchange_selection_ignores_non_letters() {
        let rack = vec![tile("t-a", 'A', 1)];
        assert_eq!(select_exchange_tiles(&rack, "a!1 "), vec!["t-a".to_string()]);
    }
}
