//! Line sampler
//!
//! Reads the roster lines in roster order. Reads have no side effects.
//!
//! The sequencer decides from one [`LineSampler::snapshot`] per poll, so
//! every check in a poll sees the same levels. [`LineSampler::all_match`]
//! and [`LineSampler::names_at_level`] read the pins live and are for
//! diagnostics only; they never drive a control decision.

use linecheck_hal::{InputPin, Level};
use linecheck_protocol::{Label, LabelList};

use crate::roster::{LineLevels, Roster, RosterError};

/// Roster-ordered reader over the Controller's test inputs
pub struct LineSampler<P, const N: usize> {
    pins: [P; N],
    roster: Roster,
}

impl<P: InputPin, const N: usize> LineSampler<P, N> {
    /// Pair input pins with the roster; lengths must agree
    pub fn new(pins: [P; N], roster: Roster) -> Result<Self, RosterError> {
        if roster.len() != N {
            return Err(RosterError::LengthMismatch {
                pins: N,
                labels: roster.len(),
            });
        }
        Ok(Self { pins, roster })
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    /// Instantaneous level of the line at roster position `index`
    pub fn sample(&self, index: usize) -> Option<Level> {
        self.pins.get(index).map(InputPin::level)
    }

    /// True iff every line currently reads `level`
    ///
    /// Stops reading at the first mismatch.
    pub fn all_match(&self, level: Level) -> bool {
        self.pins.iter().all(|pin| pin.level() == level)
    }

    /// Labels of lines currently at `level`, in roster order
    pub fn names_at_level(&self, level: Level) -> LabelList {
        self.snapshot().labels_at(&self.roster, level)
    }

    /// Read every line once
    pub fn snapshot(&self) -> LineLevels {
        LineLevels::from_fn(N, |i| self.pins[i].level())
    }

    /// Label of the line at roster position `index`
    pub fn label(&self, index: usize) -> Option<Label> {
        self.roster.label(index)
    }
}
