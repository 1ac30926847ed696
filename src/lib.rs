//! Tâb engine library.
//!
//! Exposes the board representation, rules engine, move evaluator, and
//! self-play driver for use by integration tests and the binary entry
//! point.

pub mod board;
pub mod engine;
pub mod eval;
pub mod selfplay;
