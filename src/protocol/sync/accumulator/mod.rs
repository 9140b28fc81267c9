//! Windowed statistic of per-round clock deviations.
//!
//! Only the sum, the count and the two extremes are kept, which is all the
//! fault-tolerant average needs to discard the highest and lowest reading
//! without storing the individual measurements.

/// Value of the lower outlier while no deviation has been recorded.
///
/// Any real deviation is `<=` this, so the first `accumulate` always replaces it.
pub const LOWER_OUTLIER_UNSET: i32 = i32::MAX;

/// Value of the upper outlier while no deviation has been recorded.
pub const UPPER_OUTLIER_UNSET: i32 = i32::MIN;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
/// Running sum, count, minimum and maximum of the deviations of one round.
pub struct ErrorAccumulator {
    /// Wider than one sample: a full round of extreme deviations fits.
    error_accumulator: i64,
    slots_accumulated: u16,
    lower_outlier: i32,
    upper_outlier: i32,
}

impl Default for ErrorAccumulator {
    fn default() -> Self {
        Self::new()
    }
}

impl ErrorAccumulator {
    /// Empty accumulator with both outliers at their sentinels.
    pub const fn new() -> Self {
        Self {
            error_accumulator: 0,
            slots_accumulated: 0,
            lower_outlier: LOWER_OUTLIER_UNSET,
            upper_outlier: UPPER_OUTLIER_UNSET,
        }
    }

    /// Rebuild an accumulator from raw fields, sentinels included.
    ///
    /// Nothing ties the fields together: a state with three or more slots and
    /// unset outliers evaluates through the sentinel arithmetic unchanged.
    pub const fn from_parts(
        error_accumulator: i64,
        slots_accumulated: u16,
        lower_outlier: i32,
        upper_outlier: i32,
    ) -> Self {
        Self {
            error_accumulator,
            slots_accumulated,
            lower_outlier,
            upper_outlier,
        }
    }

    /// Record one deviation. Once the sample count is saturated further
    /// deviations are dropped so that sum and count stay consistent.
    pub fn accumulate(&mut self, deviation: i32) {
        let Some(count) = self.slots_accumulated.checked_add(1) else {
            return;
        };
        self.slots_accumulated = count;
        self.error_accumulator += deviation as i64;
        self.lower_outlier = self.lower_outlier.min(deviation);
        self.upper_outlier = self.upper_outlier.max(deviation);
    }

    /// Back to the empty state.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Sum of the recorded deviations.
    pub const fn error_accumulator(&self) -> i64 {
        self.error_accumulator
    }

    /// Number of deviations recorded this round.
    pub const fn slots_accumulated(&self) -> u16 {
        self.slots_accumulated
    }

    /// Smallest deviation, or [`LOWER_OUTLIER_UNSET`].
    pub const fn lower_outlier(&self) -> i32 {
        self.lower_outlier
    }

    /// Largest deviation, or [`UPPER_OUTLIER_UNSET`].
    pub const fn upper_outlier(&self) -> i32 {
        self.upper_outlier
    }

    pub const fn is_empty(&self) -> bool {
        self.slots_accumulated == 0
    }
}
