//! Line roster and per-tick level snapshots
//!
//! The roster is the ordered list of test lines wired 1:1 between the two
//! boards. Position 0 is the power-control/power-sense line, tested like any
//! other. Both firmwares are generated from the same build-time roster, so
//! positions mean the same thing on each side.

use linecheck_hal::Level;
use linecheck_protocol::{Label, LabelList, MAX_LABEL_LEN, MAX_LINES};

/// Errors building a roster
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RosterError {
    /// No lines
    Empty,
    /// More than [`MAX_LINES`] lines
    TooManyLines,
    /// A label longer than [`MAX_LABEL_LEN`]
    LabelTooLong,
    /// Pin count does not match the roster
    LengthMismatch { pins: usize, labels: usize },
}

/// Ordered, labelled list of test lines
#[derive(Debug, Clone, Copy)]
pub struct Roster {
    labels: &'static [Label],
}

impl Roster {
    /// Create a roster from its labels, in wiring order
    pub fn new(labels: &'static [Label]) -> Result<Self, RosterError> {
        if labels.is_empty() {
            return Err(RosterError::Empty);
        }
        if labels.len() > MAX_LINES {
            return Err(RosterError::TooManyLines);
        }
        if labels.iter().any(|l| l.len() > MAX_LABEL_LEN) {
            return Err(RosterError::LabelTooLong);
        }
        Ok(Self { labels })
    }

    /// Number of lines (N)
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Always false; an empty roster is rejected at construction
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Label at a roster position
    pub fn label(&self, index: usize) -> Option<Label> {
        self.labels.get(index).copied()
    }

    pub fn labels(&self) -> &'static [Label] {
        self.labels
    }
}

/// Levels of every roster line at one instant
///
/// One bit per roster position, bit set = high.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LineLevels {
    high: u32,
    len: u8,
}

impl LineLevels {
    /// All `len` lines low
    pub fn all_low(len: usize) -> Self {
        Self {
            high: 0,
            len: len.min(MAX_LINES) as u8,
        }
    }

    /// All `len` lines high
    pub fn all_high(len: usize) -> Self {
        Self::from_high_mask(len, u32::MAX)
    }

    /// From a bitmask of high lines; bits past `len` are ignored
    pub fn from_high_mask(len: usize, mask: u32) -> Self {
        let len = len.min(MAX_LINES);
        Self {
            high: mask & Self::mask_for(len),
            len: len as u8,
        }
    }

    /// Build by querying each position in roster order
    pub fn from_fn<F: FnMut(usize) -> Level>(len: usize, mut level_of: F) -> Self {
        let mut levels = Self::all_low(len);
        for i in 0..levels.len() {
            levels.set(i, level_of(i));
        }
        levels
    }

    fn mask_for(len: usize) -> u32 {
        if len >= 32 {
            u32::MAX
        } else {
            (1u32 << len) - 1
        }
    }

    pub fn len(&self) -> usize {
        self.len as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Bitmask of high lines
    pub fn high_mask(&self) -> u32 {
        self.high
    }

    /// Level at a roster position; positions past the end read low
    pub fn level(&self, index: usize) -> Level {
        Level::from_high(index < self.len() && self.high & (1 << index) != 0)
    }

    pub fn set(&mut self, index: usize, level: Level) {
        if index >= self.len() {
            return;
        }
        match level {
            Level::High => self.high |= 1 << index,
            Level::Low => self.high &= !(1 << index),
        }
    }

    /// True iff every line reads `level`
    pub fn all_match(&self, level: Level) -> bool {
        match level {
            Level::High => self.high == Self::mask_for(self.len()),
            Level::Low => self.high == 0,
        }
    }

    /// Number of lines at `level`
    pub fn count_at(&self, level: Level) -> usize {
        let high = self.high.count_ones() as usize;
        match level {
            Level::High => high,
            Level::Low => self.len() - high,
        }
    }

    /// Roster positions at `level`, in roster order
    pub fn positions_at(&self, level: Level) -> impl Iterator<Item = usize> + '_ {
        (0..self.len()).filter(move |&i| self.level(i) == level)
    }

    /// Labels of lines at `level`, in roster order
    pub fn labels_at(&self, roster: &Roster, level: Level) -> LabelList {
        let mut out = LabelList::new();
        for i in self.positions_at(level) {
            if let Some(label) = roster.label(i) {
                // Capacity equals MAX_LINES, never exceeded
                let _ = out.push(label);
            }
        }
        out
    }
}
