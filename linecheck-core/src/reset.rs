//! Reset pulse generator
//!
//! Drives the Target's reset line low for a fixed time. The double pattern
//! (pulse, gap, pulse) asks the Target bootloader for update mode. The
//! generator is polled from the main loop and reports the edges to drive;
//! it never blocks.

use linecheck_hal::{Level, OutputPin};

/// Default low time of one pulse
pub const DEFAULT_PULSE_MS: u32 = 100;

/// Default gap between the pulses of a double pattern
pub const DEFAULT_GAP_MS: u32 = 200;

/// Pulse timing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ResetTiming {
    pub pulse_ms: u32,
    pub gap_ms: u32,
}

impl Default for ResetTiming {
    fn default() -> Self {
        Self {
            pulse_ms: DEFAULT_PULSE_MS,
            gap_ms: DEFAULT_GAP_MS,
        }
    }
}

/// Pulse patterns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PulsePattern {
    /// Plain reset
    Single,
    /// Enter firmware update mode
    Double,
}

impl PulsePattern {
    pub fn pulses(self) -> u8 {
        match self {
            PulsePattern::Single => 1,
            PulsePattern::Double => 2,
        }
    }
}

/// Edge to apply to the reset line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ResetEdge {
    /// Drive the line low (reset asserted)
    Assert,
    /// Return the line to its idle high level
    Release,
}

impl ResetEdge {
    /// Level the reset line takes on this edge
    pub fn level(self) -> Level {
        match self {
            ResetEdge::Assert => Level::Low,
            ResetEdge::Release => Level::High,
        }
    }

    /// Drive a reset output to this edge's level
    pub fn apply<P: OutputPin>(self, pin: &mut P) {
        pin.set_level(self.level());
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
enum Phase {
    Idle,
    Asserted,
    Gap,
}

/// Non-blocking pulse sequencer for the reset line
#[derive(Debug, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ResetPulser {
    timing: ResetTiming,
    phase: Phase,
    /// Pulses still to start after the current one
    queued: u8,
    since_ms: u32,
}

impl ResetPulser {
    pub fn new(timing: ResetTiming) -> Self {
        Self {
            timing,
            phase: Phase::Idle,
            queued: 0,
            since_ms: 0,
        }
    }

    /// A pattern is in flight
    pub fn is_busy(&self) -> bool {
        self.phase != Phase::Idle
    }

    /// Start a pattern
    ///
    /// Returns the edge to apply now when idle. While busy the pulses are
    /// appended to the pattern in flight and `None` is returned.
    pub fn trigger(&mut self, pattern: PulsePattern, now_ms: u32) -> Option<ResetEdge> {
        if self.is_busy() {
            self.queued = self.queued.saturating_add(pattern.pulses());
            return None;
        }
        self.queued = pattern.pulses() - 1;
        self.phase = Phase::Asserted;
        self.since_ms = now_ms;
        Some(ResetEdge::Assert)
    }

    /// Advance the pattern; returns the edge due at `now_ms`, if any
    pub fn poll(&mut self, now_ms: u32) -> Option<ResetEdge> {
        let elapsed = now_ms.wrapping_sub(self.since_ms);
        match self.phase {
            Phase::Idle => None,
            Phase::Asserted if elapsed >= self.timing.pulse_ms => {
                self.since_ms = now_ms;
                self.phase = if self.queued > 0 { Phase::Gap } else { Phase::Idle };
                Some(ResetEdge::Release)
            }
            Phase::Gap if elapsed >= self.timing.gap_ms => {
                self.queued -= 1;
                self.since_ms = now_ms;
                self.phase = Phase::Asserted;
                Some(ResetEdge::Assert)
            }
            _ => None,
        }
    }
}
