//! Distributed clock synchronisation: deviation accumulation, fault-tolerant
//! averaging, and the resulting correction.
pub mod accumulator;
pub mod fta;

use accumulator::ErrorAccumulator;

/// Synchronisation state of one node: the current round of deviations, the
/// last computed correction, and the part of it not yet applied to a timer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ClockSync {
    accumulator: ErrorAccumulator,
    correction: i32,
    pending_correction: i32,
}

impl ClockSync {
    pub const fn new() -> Self {
        Self {
            accumulator: ErrorAccumulator::new(),
            correction: 0,
            pending_correction: 0,
        }
    }

    /// Record the deviation measured on one reference frame.
    pub fn accumulate(&mut self, deviation: i32) {
        self.accumulator.accumulate(deviation);
    }

    /// Close the round: compute the FTA correction, remember it, and reset
    /// the accumulator.
    pub fn evaluate(&mut self) -> i32 {
        let correction = fta::evaluate(&mut self.accumulator);
        #[cfg(feature = "defmt")]
        defmt::debug!("FTA correction: {} ticks", correction);
        self.correction = correction;
        self.pending_correction = correction;
        correction
    }

    /// Current round of deviations.
    pub const fn accumulator(&self) -> &ErrorAccumulator {
        &self.accumulator
    }

    /// Mutable access to the current round, for hosts restoring saved state.
    pub fn accumulator_mut(&mut self) -> &mut ErrorAccumulator {
        &mut self.accumulator
    }

    /// Last correction produced by [`evaluate`](Self::evaluate). A value
    /// trending away from zero signals a drifting or misbehaving network.
    pub const fn correction(&self) -> i32 {
        self.correction
    }

    /// Correction not yet folded into a timer, cleared by this call.
    pub fn take_pending_correction(&mut self) -> i32 {
        core::mem::take(&mut self.pending_correction)
    }
}
