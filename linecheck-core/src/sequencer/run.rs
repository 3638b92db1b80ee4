//! Per-run state
//!
//! Everything a run accumulates lives in [`RunContext`]. Starting a run
//! replaces the whole value, so no field can survive from the previous run.

use crate::roster::LineLevels;

/// Precheck outcomes, informational only
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Prechecks {
    pub all_high: bool,
    pub all_low: bool,
}

/// State owned by one test run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RunContext {
    /// Next roster position expected to rise
    cursor: usize,
    /// Lines currently observed high, one bit per roster position
    seen_high: u32,
    prechecks: Prechecks,
    /// Run start is waiting for its reset pulse to finish
    reset_pending: bool,
}

impl RunContext {
    /// Fresh context for a run whose reset pulse is in flight
    pub fn starting(reset_pending: bool) -> Self {
        Self {
            reset_pending,
            ..Self::default()
        }
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn prechecks(&self) -> Prechecks {
        self.prechecks
    }

    pub(crate) fn prechecks_mut(&mut self) -> &mut Prechecks {
        &mut self.prechecks
    }

    pub(crate) fn advance(&mut self) -> usize {
        self.cursor += 1;
        self.cursor
    }

    pub fn was_high(&self, index: usize) -> bool {
        index < 32 && self.seen_high & (1 << index) != 0
    }

    pub(crate) fn mark_high(&mut self, index: usize) {
        if index < 32 {
            self.seen_high |= 1 << index;
        }
    }

    /// Forget lines that now read low; lines still high keep their mark
    pub(crate) fn clear_low(&mut self, levels: &LineLevels) {
        self.seen_high &= levels.high_mask();
    }

    pub fn reset_pending(&self) -> bool {
        self.reset_pending
    }

    pub(crate) fn reset_done(&mut self) {
        self.reset_pending = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starting_is_clean() {
        let run = RunContext::starting(true);
        assert_eq!(run.cursor(), 0);
        assert!(run.reset_pending());
        assert_eq!(run.prechecks(), Prechecks::default());
        assert!(!(0..32).any(|i| run.was_high(i)));
    }

    #[test]
    fn test_replacement_clears_everything() {
        let mut run = RunContext::starting(false);
        run.advance();
        run.mark_high(0);
        run.prechecks_mut().all_high = true;

        run = RunContext::starting(false);
        assert_eq!(run, RunContext::default());
    }

    #[test]
    fn test_clear_low_keeps_high_marks() {
        let mut run = RunContext::default();
        run.mark_high(1);
        run.mark_high(3);
        run.clear_low(&LineLevels::from_high_mask(4, 0b1000));
        assert!(!run.was_high(1));
        assert!(run.was_high(3));
    }
}
