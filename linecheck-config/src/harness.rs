//! `harness.toml` model
//!
//! ```toml
//! [controller]
//! button = "P1_02"
//! reset = "P1_01"
//! status_led = "P0_15"
//! sequence_timeout_ms = 15000
//!
//! [target]
//! status_led = "P0_15"
//!
//! [[line]]
//! label = "P1_07(VCC)"
//! controller = "P1_07"
//! target = "P0_13"
//! ```
//!
//! `[[line]]` order is roster order. Both `[controller]` and `[target]` are
//! optional; every key in them defaults to the nominal board wiring and
//! protocol timing.

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use linecheck_core::config::{SequencerConfig, StimulusTiming};
use linecheck_core::reset::ResetTiming;
use linecheck_core::Level;
use linecheck_protocol::{MAX_LABEL_LEN, MAX_LINES};
use serde::Deserialize;

use crate::error::{ConfigError, Side};
use crate::pin::{Pin, PinAllocator};

/// One roster line: where it lands on each board
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LineConfig {
    pub label: String,
    pub controller: Pin,
    pub target: Pin,
}

/// `[controller]` section
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ControllerConfig {
    /// Start button, pull-up, pressed = low
    pub button: Pin,
    /// Target reset output, idle high
    pub reset: Pin,
    pub status_led: Pin,
    pub precheck_timeout_ms: u32,
    pub low_stage_timeout_ms: u32,
    pub sequence_timeout_ms: u32,
    pub debounce_ms: u32,
    pub idle_marker_ms: u32,
    pub fail_blink_ms: u32,
    pub reset_pulse_ms: u32,
    pub flash_gap_ms: u32,
    /// Sequencer poll period
    pub poll_interval_ms: u32,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        let seq = SequencerConfig::default();
        Self {
            button: Pin::new(1, 2),
            reset: Pin::new(1, 1),
            status_led: Pin::new(0, 15),
            precheck_timeout_ms: seq.precheck_timeout_ms,
            low_stage_timeout_ms: seq.low_stage_timeout_ms,
            sequence_timeout_ms: seq.sequence_timeout_ms,
            debounce_ms: seq.debounce_ms,
            idle_marker_ms: seq.idle_marker_ms,
            fail_blink_ms: seq.fail_blink_ms,
            reset_pulse_ms: seq.reset.pulse_ms,
            flash_gap_ms: seq.reset.gap_ms,
            poll_interval_ms: 1,
        }
    }
}

impl ControllerConfig {
    /// Sequencer timing described by this section
    pub fn sequencer_config(&self) -> SequencerConfig {
        SequencerConfig {
            precheck_timeout_ms: self.precheck_timeout_ms,
            low_stage_timeout_ms: self.low_stage_timeout_ms,
            sequence_timeout_ms: self.sequence_timeout_ms,
            debounce_ms: self.debounce_ms,
            button_pressed: Level::Low,
            idle_marker_ms: self.idle_marker_ms,
            fail_blink_ms: self.fail_blink_ms,
            reset: ResetTiming {
                pulse_ms: self.reset_pulse_ms,
                gap_ms: self.flash_gap_ms,
            },
        }
    }

    fn timings(&self) -> [(&'static str, u32); 9] {
        [
            ("controller.precheck_timeout_ms", self.precheck_timeout_ms),
            ("controller.low_stage_timeout_ms", self.low_stage_timeout_ms),
            ("controller.sequence_timeout_ms", self.sequence_timeout_ms),
            ("controller.debounce_ms", self.debounce_ms),
            ("controller.idle_marker_ms", self.idle_marker_ms),
            ("controller.fail_blink_ms", self.fail_blink_ms),
            ("controller.reset_pulse_ms", self.reset_pulse_ms),
            ("controller.flash_gap_ms", self.flash_gap_ms),
            ("controller.poll_interval_ms", self.poll_interval_ms),
        ]
    }
}

/// `[target]` section
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TargetConfig {
    /// On while every line is driven high
    pub status_led: Pin,
    pub hold_all_high_ms: u32,
    pub hold_all_low_ms: u32,
    pub pulse_high_ms: u32,
    pub pulse_low_ms: u32,
    pub heartbeat_ms: u32,
}

impl Default for TargetConfig {
    fn default() -> Self {
        let t = StimulusTiming::default();
        Self {
            status_led: Pin::new(0, 15),
            hold_all_high_ms: t.hold_all_high_ms,
            hold_all_low_ms: t.hold_all_low_ms,
            pulse_high_ms: t.pulse_high_ms,
            pulse_low_ms: t.pulse_low_ms,
            heartbeat_ms: t.heartbeat_ms,
        }
    }
}

impl TargetConfig {
    pub fn stimulus_timing(&self) -> StimulusTiming {
        StimulusTiming {
            hold_all_high_ms: self.hold_all_high_ms,
            hold_all_low_ms: self.hold_all_low_ms,
            pulse_high_ms: self.pulse_high_ms,
            pulse_low_ms: self.pulse_low_ms,
            heartbeat_ms: self.heartbeat_ms,
        }
    }

    fn timings(&self) -> [(&'static str, u32); 5] {
        [
            ("target.hold_all_high_ms", self.hold_all_high_ms),
            ("target.hold_all_low_ms", self.hold_all_low_ms),
            ("target.pulse_high_ms", self.pulse_high_ms),
            ("target.pulse_low_ms", self.pulse_low_ms),
            ("target.heartbeat_ms", self.heartbeat_ms),
        ]
    }
}

/// The whole harness description
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HarnessConfig {
    #[serde(default)]
    pub controller: ControllerConfig,
    #[serde(default)]
    pub target: TargetConfig,
    #[serde(rename = "line", default)]
    pub lines: Vec<LineConfig>,
}

impl HarnessConfig {
    /// Parse and validate
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: HarnessConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().map(|l| l.label.as_str())
    }

    /// Check everything the firmware relies on
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_roster()?;
        self.validate_pins()?;
        self.validate_timing()
    }

    fn validate_roster(&self) -> Result<(), ConfigError> {
        if self.lines.is_empty() {
            return Err(ConfigError::EmptyRoster);
        }
        if self.lines.len() > MAX_LINES {
            return Err(ConfigError::TooManyLines(self.lines.len()));
        }

        let mut seen = BTreeSet::new();
        for (index, line) in self.lines.iter().enumerate() {
            let label = &line.label;
            if label.is_empty() || label.len() > MAX_LABEL_LEN {
                return Err(ConfigError::LabelLength {
                    index,
                    label: label.clone(),
                });
            }
            if !label.bytes().all(|b| b.is_ascii_graphic() || b == b' ') || label.contains(',') {
                return Err(ConfigError::LabelCharacters {
                    index,
                    label: label.clone(),
                });
            }
            if !seen.insert(label.as_str()) {
                return Err(ConfigError::DuplicateLabel(label.clone()));
            }
        }
        Ok(())
    }

    fn validate_pins(&self) -> Result<(), ConfigError> {
        let c = &self.controller;
        let controller_pins = [
            (c.button, "button".to_string()),
            (c.reset, "reset".to_string()),
            (c.status_led, "status_led".to_string()),
        ]
        .into_iter()
        .chain(
            self.lines
                .iter()
                .map(|l| (l.controller, format!("line {}", l.label))),
        );
        claim_all(Side::Controller, controller_pins)?;

        let target_pins = [(self.target.status_led, "status_led".to_string())]
            .into_iter()
            .chain(
                self.lines
                    .iter()
                    .map(|l| (l.target, format!("line {}", l.label))),
            );
        claim_all(Side::Target, target_pins)
    }

    fn validate_timing(&self) -> Result<(), ConfigError> {
        let zero = self
            .controller
            .timings()
            .into_iter()
            .chain(self.target.timings())
            .find(|(_, ms)| *ms == 0);
        if let Some((key, _)) = zero {
            return Err(ConfigError::ZeroTiming(key));
        }

        // u64 so that no u32 timing combination can overflow
        let t = &self.target;
        let per_line = u64::from(t.pulse_high_ms) + u64::from(t.pulse_low_ms);
        let needed_ms = u64::from(t.hold_all_low_ms) + per_line * self.lines.len() as u64;
        let timeout_ms = self.controller.sequence_timeout_ms;
        if needed_ms >= u64::from(timeout_ms) {
            return Err(ConfigError::SequenceTooLong {
                needed_ms,
                timeout_ms,
            });
        }
        Ok(())
    }
}

fn claim_all(
    side: Side,
    pins: impl Iterator<Item = (Pin, String)>,
) -> Result<(), ConfigError> {
    let mut alloc = PinAllocator::new();
    for (pin, owner) in pins {
        if pin.is_reserved() {
            return Err(ConfigError::ReservedPin { side, pin, owner });
        }
        alloc
            .allocate(pin, &owner)
            .map_err(|first| ConfigError::PinConflict {
                side,
                pin,
                first,
                second: owner.clone(),
            })?;
    }
    Ok(())
}
