//! "Nice number" tick step calculation
//!
//! Time is non-metric, so the step ladder is tiered: seconds roll into
//! minutes at x60, hours into days at x24, days recycle at x10. The
//! calculator walks the ladder from a 1-second floor and returns the first
//! step at least as large as the requested minimum.

const MS_PER_SECOND: i64 = 1_000;
const MS_PER_HOUR: i64 = 60 * 60 * MS_PER_SECOND;
const MS_PER_DAY: i64 = 24 * MS_PER_HOUR;

/// Minimum tick step (1 second)
pub const MINIMUM_STEP_MS: i64 = MS_PER_SECOND;

/// Iteration cap; the ladder multiplies by at least x10 per tier cycle, so
/// anything representable in i64 is reached long before this
const MAX_ITERATIONS: usize = 256;

/// One rung family of the ladder, active for steps at or above `floor_ms`
struct Tier {
    floor_ms: i64,
    multipliers: &'static [i64],
    rollover: i64,
}

const TIERS: [Tier; 4] = [
    Tier {
        floor_ms: 0,
        multipliers: &[1, 2, 5],
        rollover: 10,
    },
    Tier {
        floor_ms: MS_PER_SECOND,
        multipliers: &[1, 2, 5, 15, 20, 30],
        rollover: 60,
    },
    Tier {
        floor_ms: MS_PER_HOUR,
        multipliers: &[1, 2, 3, 6, 9, 12],
        rollover: 24,
    },
    Tier {
        floor_ms: MS_PER_DAY,
        multipliers: &[1, 2, 5],
        rollover: 10,
    },
];

fn tier_for(step_ms: i64) -> &'static Tier {
    TIERS
        .iter()
        .rev()
        .find(|tier| step_ms >= tier.floor_ms)
        .unwrap_or(&TIERS[0])
}

/// Adaptive tick step calculator for the time axis
pub struct TickStepCalculator;

impl TickStepCalculator {
    /// Return the smallest ladder step `>= min_step_ms`, or 0 if no valid
    /// step exists (non-positive/non-finite input, or i64 overflow)
    pub fn next_step(min_step_ms: f64) -> i64 {
        if !min_step_ms.is_finite() || min_step_ms <= 0.0 {
            return 0;
        }

        let mut step = MINIMUM_STEP_MS;
        let mut multiplier_index = 0;
        for _ in 0..MAX_ITERATIONS {
            let tier = tier_for(step);
            match tier.multipliers.get(multiplier_index) {
                Some(&multiplier) => {
                    let Some(candidate) = step.checked_mul(multiplier) else {
                        log::error!("tick step out of range for min step {min_step_ms}ms");
                        return 0;
                    };
                    if candidate as f64 >= min_step_ms {
                        return candidate;
                    }
                    multiplier_index += 1;
                }
                None => {
                    multiplier_index = 0;
                    match step.checked_mul(tier.rollover) {
                        Some(next) => step = next,
                        None => {
                            log::error!("tick step out of range for min step {min_step_ms}ms");
                            return 0;
                        }
                    }
                }
            }
        }
        log::error!("tick step search did not terminate for min step {min_step_ms}ms");
        0
    }

    /// Step for a minimum pixel spacing at the given scale (px/ms)
    pub fn ticks_step(min_pixel_spacing_px: f64, scale: f64) -> i64 {
        if !scale.is_finite() || scale <= 0.0 {
            return 0;
        }
        Self::next_step(min_pixel_spacing_px / scale)
    }
}
