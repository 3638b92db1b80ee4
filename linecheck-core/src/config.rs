//! Timing configuration
//!
//! Defaults are the nominal protocol timings. The firmware builds these from
//! the constants generated out of `harness.toml`.

use linecheck_hal::Level;

use crate::debounce::DEFAULT_SETTLE_MS;
use crate::reset::ResetTiming;

/// Controller-side timing and input polarity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SequencerConfig {
    /// Budget for every line to read high (AwaitAllHigh)
    pub precheck_timeout_ms: u32,
    /// Budget for every line to read low (AwaitAllLow)
    pub low_stage_timeout_ms: u32,
    /// Budget for the whole pulse sequence
    pub sequence_timeout_ms: u32,
    /// Button settle window
    pub debounce_ms: u32,
    /// Raw button level meaning "pressed"
    pub button_pressed: Level,
    /// Idle marker / indicator toggle cadence while awaiting activation
    pub idle_marker_ms: u32,
    /// Indicator toggle cadence in Fail
    pub fail_blink_ms: u32,
    pub reset: ResetTiming,
}

impl Default for SequencerConfig {
    fn default() -> Self {
        Self {
            precheck_timeout_ms: 3000,
            low_stage_timeout_ms: 3000,
            sequence_timeout_ms: 15_000,
            debounce_ms: DEFAULT_SETTLE_MS,
            // Pull-up input, button shorts to ground
            button_pressed: Level::Low,
            idle_marker_ms: 500,
            fail_blink_ms: 150,
            reset: ResetTiming::default(),
        }
    }
}

/// Target-side stimulus timing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StimulusTiming {
    /// Hold with every line high
    pub hold_all_high_ms: u32,
    /// Hold with every line low
    pub hold_all_low_ms: u32,
    /// High time of each line's pulse
    pub pulse_high_ms: u32,
    /// Low time after each line's pulse
    pub pulse_low_ms: u32,
    /// Idle heartbeat cadence once the script is done
    pub heartbeat_ms: u32,
}

impl Default for StimulusTiming {
    fn default() -> Self {
        Self {
            hold_all_high_ms: 1000,
            hold_all_low_ms: 1000,
            pulse_high_ms: 150,
            pulse_low_ms: 150,
            heartbeat_ms: 500,
        }
    }
}

impl StimulusTiming {
    /// Wall time of the scripted part for `lines` lines, saturating
    pub fn script_duration_ms(&self, lines: usize) -> u32 {
        let per_line = self.pulse_high_ms.saturating_add(self.pulse_low_ms);
        self.hold_all_high_ms
            .saturating_add(self.hold_all_low_ms)
            .saturating_add(per_line.saturating_mul(lines as u32))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nominal_defaults() {
        let cfg = SequencerConfig::default();
        assert_eq!(cfg.precheck_timeout_ms, 3000);
        assert_eq!(cfg.sequence_timeout_ms, 15_000);
        assert_eq!(cfg.debounce_ms, 50);
        assert_eq!(cfg.reset.pulse_ms, 100);
    }

    #[test]
    fn test_full_roster_fits_sequence_budget() {
        let stim = StimulusTiming::default();
        let seq = SequencerConfig::default();
        let pulses = (stim.pulse_high_ms + stim.pulse_low_ms) * 32;
        assert!(pulses < seq.sequence_timeout_ms);
        assert_eq!(stim.script_duration_ms(19), 2000 + 300 * 19);

        let long = StimulusTiming {
            pulse_high_ms: u32::MAX,
            ..StimulusTiming::default()
        };
        assert_eq!(long.script_duration_ms(19), u32::MAX);
    }
}
