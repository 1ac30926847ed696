//! Move selection for the computer opponent.
//!
//! Enumerates the side to move's legal (piece, destination) pairs and
//! picks one under a difficulty tier: easy plays uniformly at random,
//! medium maximizes the immediate present-value heuristic, and hard adds
//! probability-weighted risk/threat estimates on top. Hint mode runs the
//! hard tier and also reports why the move was chosen.
//!
//! Everything here reads the engine through its public query surface and
//! never mutates it; executing the chosen move is the caller's job.

pub(crate) mod heuristic;

use std::fmt;

use rand::Rng;

use crate::board::piece::{PieceId, Square};
use crate::engine::TabEngine;

/// Difficulty tier for the computer opponent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    /// Parses a tier from its lowercase name.
    pub fn from_name(name: &str) -> Option<Difficulty> {
        match name {
            "easy" => Some(Difficulty::Easy),
            "medium" => Some(Difficulty::Medium),
            "hard" => Some(Difficulty::Hard),
            _ => None,
        }
    }

    /// The lowercase name used in CLI arguments and summaries.
    pub const fn name(self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }
}

/// A move: the origin square of a piece and its destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Move {
    pub from: Square,
    pub to: Square,
}

/// Why the evaluator favored a move. Rendered through `Display` as the
/// hint text shown to a player.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reason {
    Capture,
    ClearInitialRow,
    Deploy,
    Unblock,
    Shuffle,
    Advance,
    EnterLastRowStuck,
    EnterLastRowSafe,
    FleeDanger,
    SaferSquare,
    NewThreat,
    Pressure,
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Reason::Capture => "capture an opposing piece",
            Reason::ClearInitialRow => "move the last piece off the starting row",
            Reason::Deploy => "bring a new piece into play",
            Reason::Unblock => "free an unmoved piece on the starting row",
            Reason::Shuffle => "reposition along the starting row",
            Reason::Advance => "advance a piece already in play",
            Reason::EnterLastRowStuck => "enter the final row, though it will be stuck there",
            Reason::EnterLastRowSafe => "enter the final row safely",
            Reason::FleeDanger => "flee a dangerous square",
            Reason::SaferSquare => "move to a safer square",
            Reason::NewThreat => "create a fresh capture threat",
            Reason::Pressure => "keep up the pressure on the opponent",
        };
        f.write_str(text)
    }
}

/// A suggested move with its score and justification.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hint {
    pub mv: Move,
    pub score: f64,
    pub reason: Reason,
}

/// A candidate produced by enumeration; carries the piece id so the hard
/// tier can key its origin risk/threat caches.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Candidate {
    pub piece: PieceId,
    pub from: Square,
    pub to: Square,
}

impl Candidate {
    pub(crate) fn mv(&self) -> Move {
        Move {
            from: self.from,
            to: self.to,
        }
    }
}

/// Collects every legal (piece, destination) pair for the side to move
/// under the pending die, in board order.
fn enumerate(engine: &TabEngine) -> Vec<Candidate> {
    let mut candidates = Vec::new();
    for piece in engine.selectable_pieces() {
        for to in engine.legal_destinations(piece.square) {
            candidates.push(Candidate {
                piece: piece.id,
                from: piece.square,
                to,
            });
        }
    }
    candidates
}

/// Chooses a move for the side to move, or `None` when no legal move
/// exists and the caller must pass instead.
pub fn choose_move(engine: &TabEngine, level: Difficulty, rng: &mut impl Rng) -> Option<Move> {
    let candidates = enumerate(engine);
    if candidates.is_empty() {
        return None;
    }
    match level {
        Difficulty::Easy => Some(candidates[rng.gen_range(0..candidates.len())].mv()),
        Difficulty::Medium => {
            heuristic::best_by_present_value(engine, &candidates, rng).map(|h| h.mv)
        }
        Difficulty::Hard => {
            heuristic::best_by_full_heuristic(engine, &candidates, rng).map(|h| h.mv)
        }
    }
}

/// Suggests the hard tier's best move together with its justification,
/// without executing anything. `None` when no legal move exists.
pub fn suggest_move(engine: &TabEngine, rng: &mut impl Rng) -> Option<Hint> {
    let candidates = enumerate(engine);
    if candidates.is_empty() {
        return None;
    }
    heuristic::best_by_full_heuristic(engine, &candidates, rng)
}
