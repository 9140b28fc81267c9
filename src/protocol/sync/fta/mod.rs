//! Fault-tolerant averaging (FTA) of the deviations collected in one round.
//!
//! With three or more samples the single highest and lowest readings are
//! discarded and the rest averaged, which bounds the influence of one faulty
//! or noisy peer. One or two samples are too few to discard anything, so a
//! plain mean is used instead. All divisions truncate toward zero.
use crate::protocol::sync::accumulator::ErrorAccumulator;

/// Minimum number of samples before outliers are discarded.
pub const FTA_MIN_SAMPLES: u16 = 3;

/// Correction the current accumulator state would yield, without consuming it.
pub fn estimate(accumulator: &ErrorAccumulator) -> i32 {
    let sum = accumulator.error_accumulator();
    let average = match accumulator.slots_accumulated() {
        0 => 0,
        count if count < FTA_MIN_SAMPLES => sum / count as i64,
        count => {
            // With sentinels still present the intermediate terms exceed the
            // i32 range.
            let trimmed =
                sum - accumulator.lower_outlier() as i64 - accumulator.upper_outlier() as i64;
            trimmed / (count as i64 - 2)
        }
    };
    average.clamp(i32::MIN as i64, i32::MAX as i64) as i32
}

/// Compute the correction and reset the accumulator. Each round is consumed
/// exactly once.
pub fn evaluate(accumulator: &mut ErrorAccumulator) -> i32 {
    let correction = estimate(accumulator);
    accumulator.reset();
    correction
}
