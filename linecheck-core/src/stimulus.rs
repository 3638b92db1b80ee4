//! Stimulus script (Target role)
//!
//! The Target runs a fixed script once per power cycle:
//!
//! 1. every line high, hold
//! 2. every line low, hold
//! 3. each line in roster order: high, hold, low, hold
//!
//! with a marker around each stage. [`StimulusScript`] yields the script as
//! a flat list of steps; the firmware performs holds with a timer and hands
//! the rest to [`StimulusOutputs`]. Output-only steps cannot fail, so there
//! is no error path.

use linecheck_hal::{Level, OutputPin};
use linecheck_protocol::{Marker, StageName};

use crate::config::StimulusTiming;
use crate::roster::RosterError;

/// One scripted action
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StimulusStep {
    /// Send a status line
    Emit(Marker),
    /// Drive every roster line
    DriveAll(Level),
    /// Drive one roster line
    Drive { line: usize, level: Level },
    /// Status indicator on/off
    Indicator(bool),
    /// Wait, outputs unchanged
    Hold(u32),
}

/// Steps before the pulse sequence: prelude (2) + two stages (5 each)
const SEQUENCE_BASE: usize = 12;

/// Steps per line in the pulse sequence
const STEPS_PER_LINE: usize = 4;

/// Iterator over the Target's scripted steps
#[derive(Debug, Clone)]
pub struct StimulusScript {
    timing: StimulusTiming,
    lines: usize,
    next: usize,
}

impl StimulusScript {
    pub fn new(timing: StimulusTiming, lines: usize) -> Self {
        Self {
            timing,
            lines,
            next: 0,
        }
    }

    /// Total number of steps
    pub fn step_count(&self) -> usize {
        SEQUENCE_BASE + 1 + STEPS_PER_LINE * self.lines + 1
    }

    fn step(&self, k: usize) -> Option<StimulusStep> {
        use StimulusStep::*;

        let t = &self.timing;
        let step = match k {
            0 => Emit(Marker::Ready),
            1 => DriveAll(Level::Low),

            2 => Emit(Marker::Begin(StageName::AllHigh)),
            3 => DriveAll(Level::High),
            4 => Indicator(true),
            5 => Hold(t.hold_all_high_ms),
            6 => Emit(Marker::StageOk(StageName::AllHigh)),

            7 => Emit(Marker::Begin(StageName::AllLow)),
            8 => DriveAll(Level::Low),
            9 => Indicator(false),
            10 => Hold(t.hold_all_low_ms),
            11 => Emit(Marker::StageOk(StageName::AllLow)),

            12 => Emit(Marker::Begin(StageName::Sequence)),
            k if k < self.step_count() - 1 => {
                let offset = k - SEQUENCE_BASE - 1;
                let line = offset / STEPS_PER_LINE;
                match offset % STEPS_PER_LINE {
                    0 => Drive {
                        line,
                        level: Level::High,
                    },
                    1 => Hold(t.pulse_high_ms),
                    2 => Drive {
                        line,
                        level: Level::Low,
                    },
                    _ => Hold(t.pulse_low_ms),
                }
            }
            k if k == self.step_count() - 1 => Emit(Marker::AllOk),
            _ => return None,
        };
        Some(step)
    }
}

impl Iterator for StimulusScript {
    type Item = StimulusStep;

    fn next(&mut self) -> Option<StimulusStep> {
        let step = self.step(self.next)?;
        self.next += 1;
        Some(step)
    }
}

/// Target-side outputs driven by the script
pub struct StimulusOutputs<P, L, const N: usize> {
    lines: [P; N],
    indicator: L,
}

impl<P: OutputPin, L: OutputPin, const N: usize> StimulusOutputs<P, L, N> {
    /// Take the roster outputs (already configured low) and the indicator
    pub fn new(lines: [P; N], indicator: L, roster_len: usize) -> Result<Self, RosterError> {
        if roster_len != N {
            return Err(RosterError::LengthMismatch {
                pins: N,
                labels: roster_len,
            });
        }
        Ok(Self { lines, indicator })
    }

    /// Apply an output step; `Emit` and `Hold` are left to the caller
    pub fn apply(&mut self, step: &StimulusStep) {
        match *step {
            StimulusStep::DriveAll(level) => {
                for pin in self.lines.iter_mut() {
                    pin.set_level(level);
                }
            }
            StimulusStep::Drive { line, level } => {
                if let Some(pin) = self.lines.get_mut(line) {
                    pin.set_level(level);
                }
            }
            StimulusStep::Indicator(on) => self.indicator.set_level(Level::from_high(on)),
            StimulusStep::Emit(_) | StimulusStep::Hold(_) => {}
        }
    }

    /// Levels currently driven, in roster order
    pub fn driven(&self) -> impl Iterator<Item = Level> + '_ {
        self.lines.iter().map(|p| Level::from_high(p.is_set_high()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::vec::Vec;

    #[derive(Default)]
    struct Pin(bool);

    impl OutputPin for Pin {
        fn set_high(&mut self) {
            self.0 = true;
        }
        fn set_low(&mut self) {
            self.0 = false;
        }
        fn is_set_high(&self) -> bool {
            self.0
        }
    }

    fn markers(script: StimulusScript) -> Vec<Marker> {
        script
            .filter_map(|s| match s {
                StimulusStep::Emit(m) => Some(m),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_marker_order() {
        let script = StimulusScript::new(StimulusTiming::default(), 3);
        assert_eq!(
            markers(script),
            [
                Marker::Ready,
                Marker::Begin(StageName::AllHigh),
                Marker::StageOk(StageName::AllHigh),
                Marker::Begin(StageName::AllLow),
                Marker::StageOk(StageName::AllLow),
                Marker::Begin(StageName::Sequence),
                Marker::AllOk,
            ]
        );
    }

    #[test]
    fn test_step_count_matches_iteration() {
        for n in 1..=32 {
            let script = StimulusScript::new(StimulusTiming::default(), n);
            let expected = script.step_count();
            assert_eq!(script.count(), expected);
        }
    }

    #[test]
    fn test_total_hold_time() {
        let timing = StimulusTiming::default();
        let held: u32 = StimulusScript::new(timing, 19)
            .filter_map(|s| match s {
                StimulusStep::Hold(ms) => Some(ms),
                _ => None,
            })
            .sum();
        assert_eq!(held, timing.script_duration_ms(19));
    }

    #[test]
    fn test_pulses_in_roster_order() {
        let script = StimulusScript::new(StimulusTiming::default(), 4);
        let rises: Vec<usize> = script
            .filter_map(|s| match s {
                StimulusStep::Drive {
                    line,
                    level: Level::High,
                } => Some(line),
                _ => None,
            })
            .collect();
        assert_eq!(rises, [0, 1, 2, 3]);
    }

    #[test]
    fn test_outputs_follow_script() {
        let mut outputs: StimulusOutputs<Pin, Pin, 3> =
            StimulusOutputs::new(Default::default(), Pin::default(), 3).unwrap();
        let mut script = StimulusScript::new(StimulusTiming::default(), 3);

        // Through the all-high stage hold
        for step in script.by_ref().take(6) {
            outputs.apply(&step);
        }
        assert!(outputs.driven().all(|l| l == Level::High));
        assert!(outputs.indicator.is_set_high());

        // Through the all-low stage and the first rise
        for step in script.by_ref().take(7) {
            outputs.apply(&step);
        }
        assert!(outputs.driven().all(|l| l == Level::Low));
        assert!(!outputs.indicator.is_set_high());

        outputs.apply(&script.next().unwrap());
        let driven: Vec<Level> = outputs.driven().collect();
        assert_eq!(driven, [Level::High, Level::Low, Level::Low]);
    }

    #[test]
    fn test_outputs_length_mismatch() {
        let outputs: Result<StimulusOutputs<Pin, Pin, 2>, _> =
            StimulusOutputs::new(Default::default(), Pin::default(), 3);
        assert!(outputs.is_err());
    }
}
