//! Board representation and track topology.
//!
//! Contains the core data types for players, pieces, squares, the stick
//! die, and the fixed one-way track the pieces race along.

pub mod dice;
pub mod path;
pub mod piece;

pub use dice::{grants_extra_turn, probability, DIE_VALUES};
pub use path::{direction, successors, Step, ROWS};
pub use piece::{Piece, PieceId, Player, Square};
