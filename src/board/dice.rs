//! The four-stick die.
//!
//! A roll throws four two-sided sticks; the count of light faces up gives
//! the move value, except that zero light faces counts as 6. A value of 5
//! is therefore unreachable, and the outcome distribution is the binomial
//! stick count: {6: 1/16, 1: 4/16, 2: 6/16, 3: 4/16, 4: 1/16}.

use rand::Rng;

/// Every value the die can produce.
pub const DIE_VALUES: [u8; 5] = [1, 2, 3, 4, 6];

/// Probability of a value under the stick model. Zero for anything the
/// die cannot produce.
pub fn probability(value: u8) -> f64 {
    match value {
        1 | 3 => 0.25,
        2 => 0.375,
        4 | 6 => 0.0625,
        _ => 0.0,
    }
}

/// Whether a rolled value grants the roller another turn.
pub const fn grants_extra_turn(value: u8) -> bool {
    matches!(value, 1 | 4 | 6)
}

/// Rolls the stick die by mapping a uniform sample through the cumulative
/// outcome thresholds.
pub fn roll(rng: &mut impl Rng) -> u8 {
    let r: f64 = rng.gen();
    if r < 0.0625 {
        6
    } else if r < 0.3125 {
        1
    } else if r < 0.6875 {
        2
    } else if r < 0.9375 {
        3
    } else {
        4
    }
}
