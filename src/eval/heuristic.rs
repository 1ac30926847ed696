//! Heuristic move scoring for the medium and hard tiers.
//!
//! Medium scores each candidate by its immediate "present value". Hard
//! layers two probability-weighted estimates on top: the risk of the
//! moving piece being captured on the opponent's next turn and the threat
//! of capturing on its own next turn, both derived from the engine's pure
//! hypothetical-move queries. A posture factor leans the scoring
//! defensive when behind on pieces and aggressive when ahead.
//!
//! Design: origin risk/threat are computed once per movable piece and
//! cached by piece id; destination values are computed per candidate
//! against the current board, never a simulated one.

use std::collections::HashMap;

use rand::Rng;

use crate::board::dice::{probability, DIE_VALUES};
use crate::board::piece::{PieceId, Player, Square};
use crate::engine::TabEngine;

use super::{Candidate, Hint, Reason};

/// Score for capturing; doubles as the threshold above which capture is
/// the justification no matter what else fired.
const CAPTURE_SCORE: f64 = 100.0;

/// Scale for the capture-probability differential. Slightly heavier than
/// the threat scale so the evaluator prefers not trading one-for-one.
const RISK_MULTIPLIER: f64 = -110.0;
const THREAT_MULTIPLIER: f64 = 100.0;

/// Net risk/threat magnitude that earns the "safer square" / "more
/// pressure" justification on its own.
const CALLOUT_THRESHOLD: f64 = 20.0;

/// Posture factor applied when more than one piece ahead or behind.
const POSTURE_FACTOR: f64 = 1.5;

/// Immediate value of a candidate move with its justification, before any
/// lookahead. Shared by the medium and hard tiers.
pub(crate) fn present_value(engine: &TabEngine, cand: &Candidate) -> (f64, Reason) {
    let player = engine.current_player();
    let initial = player.initial_row();
    let last = player.last_row();

    let mover = match engine.piece_at(cand.from) {
        Some(p) => p,
        None => return (0.0, Reason::Advance),
    };

    let mut score = 0.0;
    let mut reason = Reason::Advance;

    let capture = matches!(engine.piece_at(cand.to), Some(p) if p.player != player);
    if capture {
        score += CAPTURE_SCORE;
        reason = Reason::Capture;
    }

    let from_initial = cand.from.row == initial;
    let to_initial = cand.to.row == initial;
    if from_initial && !to_initial {
        if last_piece_on_initial_row(engine, player) {
            score += 75.0;
            reason = Reason::ClearInitialRow;
        } else {
            score += 25.0;
            reason = Reason::Deploy;
        }
    } else if from_initial && to_initial {
        if !mover.has_moved {
            score += 30.0;
            reason = Reason::Unblock;
        } else {
            score += 10.0;
            reason = Reason::Shuffle;
        }
    } else {
        score += 5.0;
        reason = Reason::Advance;
    }

    // Non-capture arrival on the last row: a liability while the initial
    // row still holds pieces (the arrival is frozen there), a bonus once
    // it is clear.
    if cand.to.row == last && score < CAPTURE_SCORE {
        if engine.has_pieces_on_initial_row(player) {
            score -= 10.0;
            reason = Reason::EnterLastRowStuck;
        } else {
            score += 15.0;
            reason = Reason::EnterLastRowSafe;
        }
    }

    (score, reason)
}

/// Medium tier: present value plus a small jitter, best first.
pub(crate) fn best_by_present_value(
    engine: &TabEngine,
    candidates: &[Candidate],
    rng: &mut impl Rng,
) -> Option<Hint> {
    let mut best: Option<Hint> = None;
    for cand in candidates {
        let (base, reason) = present_value(engine, cand);
        let score = base + jitter(rng);
        if best.map_or(true, |b| score > b.score) {
            best = Some(Hint {
                mv: cand.mv(),
                score,
                reason,
            });
        }
    }
    best
}

/// Hard tier: present value plus posture-adjusted net risk and net
/// threat, best first.
pub(crate) fn best_by_full_heuristic(
    engine: &TabEngine,
    candidates: &[Candidate],
    rng: &mut impl Rng,
) -> Option<Hint> {
    let player = engine.current_player();
    let opponent = player.opponent();

    let my_count = engine.piece_count(player) as i32;
    let opp_count = engine.piece_count(opponent) as i32;
    let mut aggression = 1.0;
    let mut defensiveness = 1.0;
    if my_count < opp_count - 1 {
        defensiveness = POSTURE_FACTOR;
    } else if my_count > opp_count + 1 {
        aggression = POSTURE_FACTOR;
    }

    let opponent_squares: Vec<Square> = engine.pieces(opponent).map(|p| p.square).collect();

    // Risk/threat of every movable piece where it stands now, keyed by id.
    let mut origin_risk: HashMap<PieceId, f64> = HashMap::new();
    let mut origin_threat: HashMap<PieceId, f64> = HashMap::new();
    for cand in candidates {
        if origin_risk.contains_key(&cand.piece) {
            continue;
        }
        origin_risk.insert(
            cand.piece,
            RISK_MULTIPLIER * capture_chance_at(engine, cand.from, opponent, &opponent_squares),
        );
        origin_threat.insert(
            cand.piece,
            THREAT_MULTIPLIER * strike_chance_from(engine, cand.from, player),
        );
    }

    let mut best: Option<Hint> = None;
    for cand in candidates {
        let (present, base_reason) = present_value(engine, cand);
        let mut reason = base_reason;

        let risk_of_destination =
            RISK_MULTIPLIER * capture_chance_at(engine, cand.to, opponent, &opponent_squares);
        let mut net_risk =
            risk_of_destination - origin_risk.get(&cand.piece).copied().unwrap_or(0.0);
        if net_risk > 0.0 && defensiveness > 1.0 {
            net_risk *= defensiveness;
            reason = Reason::FleeDanger;
        } else if net_risk > CALLOUT_THRESHOLD {
            reason = Reason::SaferSquare;
        }

        let threat_of_destination =
            THREAT_MULTIPLIER * strike_chance_from(engine, cand.to, player);
        let mut net_threat =
            threat_of_destination - origin_threat.get(&cand.piece).copied().unwrap_or(0.0);
        if net_threat > 0.0 && aggression > 1.0 {
            net_threat *= aggression;
            reason = Reason::NewThreat;
        } else if net_threat > CALLOUT_THRESHOLD {
            reason = Reason::Pressure;
        }

        // A capture is always the stated justification.
        if present >= CAPTURE_SCORE {
            reason = Reason::Capture;
        }

        let score = present + net_risk + net_threat + jitter(rng);
        if best.map_or(true, |b| score > b.score) {
            best = Some(Hint {
                mv: cand.mv(),
                score,
                reason,
            });
        }
    }
    best
}

/// Probability that the opponent's next roll lets some piece of theirs
/// land on `square`: the summed probability of every die value for which
/// at least one opponent piece has a hypothetical move ending there.
fn capture_chance_at(
    engine: &TabEngine,
    square: Square,
    opponent: Player,
    opponent_squares: &[Square],
) -> f64 {
    let mut chance = 0.0;
    for &die in DIE_VALUES.iter() {
        let reachable = opponent_squares
            .iter()
            .any(|&from| engine.hypothetical_moves(from, die, opponent).contains(&square));
        if reachable {
            chance += probability(die);
        }
    }
    chance
}

/// Probability that a piece of `player` standing on `square` could
/// capture on its next roll: the summed probability of every die value
/// whose hypothetical moves from there end on an opponent piece.
fn strike_chance_from(engine: &TabEngine, square: Square, player: Player) -> f64 {
    let opponent = player.opponent();
    let mut chance = 0.0;
    for &die in DIE_VALUES.iter() {
        let hits = engine
            .hypothetical_moves(square, die, player)
            .iter()
            .any(|&to| matches!(engine.piece_at(to), Some(p) if p.player == opponent));
        if hits {
            chance += probability(die);
        }
    }
    chance
}

fn last_piece_on_initial_row(engine: &TabEngine, player: Player) -> bool {
    let row = player.initial_row();
    engine
        .pieces(player)
        .filter(|p| p.square.row == row)
        .count()
        == 1
}

fn jitter(rng: &mut impl Rng) -> f64 {
    rng.gen::<f64>() * 2.0
}
