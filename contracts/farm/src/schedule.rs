//! Pure emission scheduling: the declining bonus multiplier applied to the
//! base rate, and the declining dev-fee divisor.
//!
//! Both schedules partition their window into four equal quarters (integer
//! division; the last quarter absorbs the remainder). The emission multiplier
//! is integrated block by block over a height range, so ranges that straddle
//! a stage boundary are split per sub-range and summed — never averaged. The
//! dev-fee divisor, by contrast, is sampled once at the settlement height and
//! applied to the whole settled amount.

/// Emission multiplier per bonus stage, first quarter to last.
pub const STAGE_MULTIPLIERS: [i128; 4] = [20, 15, 10, 5];

/// Emission multiplier once the bonus window has ended.
pub const POST_BONUS_MULTIPLIER: i128 = 1;

/// Dev-fee divisors per dev-bonus stage, first quarter to last. Hand-chosen
/// constants with no generating formula; kept as a lookup table.
pub const DEV_FEE_DIVISORS: [i128; 4] = [10, 12, 16, 25];

/// Dev-fee divisor once the dev-bonus window has ended.
pub const DEV_FEE_TAIL_DIVISOR: i128 = 50;

/// Bonus-weighted block count over `[from, to)`.
///
/// Each block contributes the multiplier of the stage it falls in; blocks
/// below `start` contribute nothing. Multiplying the result by the base rate
/// (and the pool's weight share) yields the reward for the range.
pub fn emission_between(start: u32, bonus_end: u32, from: u32, to: u32) -> i128 {
    if to <= from {
        return 0;
    }
    let from = from.max(start);
    if to <= from {
        return 0;
    }

    let quarter = bonus_end.saturating_sub(start) / 4;

    let mut total: i128 = 0;
    let mut stage_start = start;
    for (i, multiplier) in STAGE_MULTIPLIERS.iter().enumerate() {
        // The last stage runs to `bonus_end` so a span not divisible by four
        // still covers the whole window.
        let stage_end = if i == 3 {
            bonus_end
        } else {
            start + quarter * (i as u32 + 1)
        };
        total += multiplier * overlap(from, to, stage_start, stage_end);
        stage_start = stage_end;
    }
    total + POST_BONUS_MULTIPLIER * overlap(from, to, bonus_end, u32::MAX)
}

/// Dev-fee divisor in effect at height `h`.
///
/// `dev_share = settled_amount / divisor`. The divisor declines through the
/// quarters of `[start, dev_bonus_end)` and settles at
/// [`DEV_FEE_TAIL_DIVISOR`] from `dev_bonus_end` on.
pub fn dev_fee_divisor(start: u32, dev_bonus_end: u32, h: u32) -> i128 {
    if h >= dev_bonus_end {
        return DEV_FEE_TAIL_DIVISOR;
    }
    let quarter = dev_bonus_end.saturating_sub(start) / 4;
    if h < start + quarter {
        DEV_FEE_DIVISORS[0]
    } else if h < start + 2 * quarter {
        DEV_FEE_DIVISORS[1]
    } else if h < start + 3 * quarter {
        DEV_FEE_DIVISORS[2]
    } else {
        DEV_FEE_DIVISORS[3]
    }
}

/// Heights at which the emission (or dev-fee) stage changes, for a window
/// `[start, end)`: the second, third, and fourth stage starts.
pub fn stage_boundaries(start: u32, end: u32) -> [u32; 3] {
    let quarter = end.saturating_sub(start) / 4;
    [start + quarter, start + 2 * quarter, start + 3 * quarter]
}

fn overlap(from: u32, to: u32, lo: u32, hi: u32) -> i128 {
    let a = from.max(lo);
    let b = to.min(hi);
    if b > a {
        (b - a) as i128
    } else {
        0
    }
}

// ── Unit tests ──────────────────────────────────────────────────────────────
// Pure-math tests with no Soroban environment dependency.
