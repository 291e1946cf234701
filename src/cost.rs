//! Fixed-point probability constants and the bit-cost table.
//!
//! Model probabilities are 11-bit fixed point: a probability `p` out of
//! [`PROB_SCALE`] (2048). The cost of coding an event with probability `p`
//! is `-log2(p / 2048)` bits, stored as [`BitCost`] fixed point with 24
//! fractional bits so the match-finder above can add and compare costs
//! with plain integer arithmetic.

use std::sync::LazyLock;

/// Number of bits in a model probability.
pub const PROB_BITS: u32 = 11;

/// Probability scale (`1 << PROB_BITS`).
pub const PROB_SCALE: u32 = 1 << PROB_BITS;

/// Half of [`PROB_SCALE`]; the probability of a fresh adaptive bit model.
pub const PROB_HALF_SCALE: u32 = 1 << (PROB_BITS - 1);

/// Geometric decay shift applied on every adaptive bit model update.
pub const PROB_MOVE_BITS: u32 = 5;

/// Fixed-point bit cost. One whole bit costs [`BIT_COST_ONE`].
pub type BitCost = u64;

/// Fractional shift of [`BitCost`] values.
pub const BIT_COST_SCALE_SHIFT: u32 = 24;

/// Cost of exactly one bit.
pub const BIT_COST_ONE: BitCost = 1 << BIT_COST_SCALE_SHIFT;

/// Process-wide probability-to-cost table. Initialized on first use,
/// read-only afterwards, safe to share across concurrent sessions.
static PROB_COST: LazyLock<[u32; PROB_SCALE as usize]> = LazyLock::new(|| {
    let mut table = [0u32; PROB_SCALE as usize];
    for (p, entry) in table.iter_mut().enumerate().skip(1) {
        let prob = p as f64 / f64::from(PROB_SCALE);
        *entry = (-prob.log2() * f64::from(1u32 << BIT_COST_SCALE_SHIFT)).round() as u32;
    }
    // Probability 0 never occurs in a live model; price it like 1/2048.
    table[0] = table[1];
    table
});

/// Cost in fixed-point bits of an event with probability `prob` out of
/// [`PROB_SCALE`].
#[inline]
pub fn prob_cost(prob: u32) -> BitCost {
    debug_assert!(prob < PROB_SCALE);
    BitCost::from(PROB_COST[prob as usize])
}
