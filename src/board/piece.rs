//! Players, pieces, and board coordinates.
//!
//! Each player starts with one piece per column on their home row. Pieces
//! carry a stable id assigned at engine construction; a captured piece
//! keeps its id but is tombstoned out of play, so ids remain valid keys
//! for the evaluator's caches across the whole game.

use std::fmt;

use serde::Serialize;

/// One of the two sides. Player one opens the game from row 3, player two
/// from row 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Player {
    One,
    Two,
}

impl Player {
    /// Returns the other side.
    pub const fn opponent(self) -> Player {
        match self {
            Player::One => Player::Two,
            Player::Two => Player::One,
        }
    }

    /// The row this player's pieces start on.
    pub const fn initial_row(self) -> u8 {
        match self {
            Player::One => 3,
            Player::Two => 0,
        }
    }

    /// The row this player's pieces race toward: the opponent's home row.
    /// Entry is restricted and single-use per piece.
    pub const fn last_row(self) -> u8 {
        match self {
            Player::One => 0,
            Player::Two => 3,
        }
    }

    /// Zero-based index for per-player arrays.
    pub const fn index(self) -> usize {
        match self {
            Player::One => 0,
            Player::Two => 1,
        }
    }
}

/// A cell coordinate on the 4-row board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Square {
    pub row: u8,
    pub col: u8,
}

impl Square {
    pub const fn new(row: u8, col: u8) -> Square {
        Square { row, col }
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// Stable identifier for a piece, assigned at engine construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PieceId(pub u8);

/// A piece on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Piece {
    pub id: PieceId,
    pub player: Player,
    pub square: Square,
    /// False until the piece's first move, which requires a roll of 1.
    pub has_moved: bool,
    /// Set once the piece first occupies its player's last row; never unset.
    pub has_reached_end: bool,
    /// Tombstone: captured pieces stay in the engine's vector but are out
    /// of play everywhere else.
    pub captured: bool,
}

impl Piece {
    pub(crate) fn new(id: PieceId, player: Player, square: Square) -> Piece {
        Piece {
            id,
            player,
            square,
            has_moved: false,
            has_reached_end: false,
            captured: false,
        }
    }
}
