//! Pure early-bird staking-power multiplier.
//!
//! Qualifying deposits made at or before a pool's grace height score at the
//! pool's full multiplier. Past the grace height the bonus halves every
//! `halving_period` blocks, with the divisor interpolated linearly *between*
//! halving points:
//!
//! ```text
//! multiplier(h) = 1 + (max - 1) / (2^idx × (1 + rem/period))
//!   where idx = (h - grace) / period, rem = (h - grace) % period
//! ```
//!
//! All values are fixed point at [`PRECISION`]. The closed integer form below
//! keeps the interpolation exact (one truncating division at the end), and
//! once `2^idx` outgrows the numerator the bonus term truncates to zero — the
//! multiplier flatlines at exactly `PRECISION` rather than overflowing.

/// Fixed-point scaling factor.
///
/// Shared by the early-bird multiplier and the per-score reward accumulator.
/// 10^12 gives 12 decimal places of precision, comfortably wide for the
/// divisor interpolation while leaving headroom in i128 products.
pub const PRECISION: i128 = 1_000_000_000_000;

/// Halvings after which the bonus is unconditionally flat. `2^100` dwarfs any
/// representable numerator, so this is a shift guard, not a behavior change.
const MAX_HALVINGS: i128 = 100;

/// The multiplier applied to a qualifying deposit at height `h`, scaled by
/// [`PRECISION`].
///
/// `max_multiplier` is the raw (unscaled) pool maximum, `≥ 1`;
/// `halving_period` must be positive.
pub fn multiplier_at(max_multiplier: i128, grace_height: u32, halving_period: u32, h: u32) -> i128 {
    if max_multiplier <= 1 {
        return PRECISION;
    }
    if h <= grace_height {
        return max_multiplier * PRECISION;
    }

    let period = halving_period as i128;
    let offset = (h - grace_height) as i128;
    let idx = offset / period;
    let rem = offset % period;

    if idx >= MAX_HALVINGS {
        return PRECISION;
    }

    // 1 + (max-1)·period / (2^idx · (period + rem)), truncated once.
    let numerator = (max_multiplier - 1) * PRECISION * period;
    let divisor = match (1i128 << idx).checked_mul(period + rem) {
        Some(d) => d,
        None => return PRECISION,
    };
    PRECISION + numerator / divisor
}

// ── Unit tests ──────────────────────────────────────────────────────────────
// Pure-math tests with no Soroban environment dependency.
