//! Roster source generation for the firmware build scripts
//!
//! Each firmware `include!`s the generated file at its crate root. The file
//! holds the label table, the timing constants and `macro_rules!` that move
//! the roster pins out of `embassy_nrf::Peripherals` in roster order, so
//! both boards are wired from the same `[[line]]` list.

use std::fmt::{self, Write};

use linecheck_core::config::{SequencerConfig, StimulusTiming};
use linecheck_core::Level;

use crate::harness::HarnessConfig;
use crate::pin::Pin;

const HEADER: &str = "// @generated by linecheck-config from harness.toml, do not edit\n";

/// Controller `roster.rs`
pub fn write_controller<W: Write>(config: &HarnessConfig, out: &mut W) -> fmt::Result {
    out.write_str(HEADER)?;
    write_labels(config, out)?;
    write_sequencer_config(&config.controller.sequencer_config(), out)?;
    writeln!(out)?;
    writeln!(out, "/// Sequencer poll period")?;
    writeln!(
        out,
        "pub const POLL_INTERVAL_MS: u64 = {};",
        config.controller.poll_interval_ms
    )?;
    writeln!(out)?;

    writeln!(out, "/// Roster inputs, in roster order")?;
    writeln!(out, "macro_rules! roster_inputs {{")?;
    writeln!(out, "    ($p:ident) => {{")?;
    writeln!(out, "        [")?;
    for line in &config.lines {
        writeln!(
            out,
            "            ::embassy_nrf::gpio::Input::new($p.{}, ::embassy_nrf::gpio::Pull::None),",
            line.controller.peripheral_ident()
        )?;
    }
    writeln!(out, "        ]")?;
    writeln!(out, "    }};")?;
    writeln!(out, "}}")?;
    writeln!(out)?;

    let c = &config.controller;
    write_pin_macro("button_pin", c.button, out)?;
    write_pin_macro("reset_pin", c.reset, out)?;
    write_pin_macro("status_led_pin", c.status_led, out)
}

/// Target `roster.rs`
pub fn write_target<W: Write>(config: &HarnessConfig, out: &mut W) -> fmt::Result {
    out.write_str(HEADER)?;
    write_labels(config, out)?;
    write_stimulus_timing(&config.target.stimulus_timing(), out)?;
    writeln!(out)?;

    writeln!(out, "/// Roster outputs, driven low, in roster order")?;
    writeln!(out, "macro_rules! roster_outputs {{")?;
    writeln!(out, "    ($p:ident) => {{")?;
    writeln!(out, "        [")?;
    for line in &config.lines {
        writeln!(
            out,
            "            ::embassy_nrf::gpio::Output::new($p.{}, ::embassy_nrf::gpio::Level::Low, \
             ::embassy_nrf::gpio::OutputDrive::Standard),",
            line.target.peripheral_ident()
        )?;
    }
    writeln!(out, "        ]")?;
    writeln!(out, "    }};")?;
    writeln!(out, "}}")?;
    writeln!(out)?;

    write_pin_macro("status_led_pin", config.target.status_led, out)
}

fn write_labels<W: Write>(config: &HarnessConfig, out: &mut W) -> fmt::Result {
    let n = config.lines.len();
    writeln!(out)?;
    writeln!(out, "/// Number of roster lines")?;
    writeln!(out, "pub const LINE_COUNT: usize = {n};")?;
    writeln!(out)?;
    writeln!(out, "/// Line labels, in roster order")?;
    writeln!(out, "pub static LABELS: [::linecheck_core::Label; {n}] = [")?;
    for label in config.labels() {
        // Validation limits labels to printable ASCII, so Debug is a valid literal
        writeln!(out, "    {label:?},")?;
    }
    writeln!(out, "];")?;
    writeln!(out)
}

fn write_sequencer_config<W: Write>(cfg: &SequencerConfig, out: &mut W) -> fmt::Result {
    let pressed = match cfg.button_pressed {
        Level::Low => "Low",
        Level::High => "High",
    };
    writeln!(out, "/// Sequencer timing from `[controller]`")?;
    writeln!(
        out,
        "pub const SEQUENCER_CONFIG: ::linecheck_core::config::SequencerConfig = \
         ::linecheck_core::config::SequencerConfig {{"
    )?;
    writeln!(out, "    precheck_timeout_ms: {},", cfg.precheck_timeout_ms)?;
    writeln!(out, "    low_stage_timeout_ms: {},", cfg.low_stage_timeout_ms)?;
    writeln!(out, "    sequence_timeout_ms: {},", cfg.sequence_timeout_ms)?;
    writeln!(out, "    debounce_ms: {},", cfg.debounce_ms)?;
    writeln!(out, "    button_pressed: ::linecheck_core::Level::{pressed},")?;
    writeln!(out, "    idle_marker_ms: {},", cfg.idle_marker_ms)?;
    writeln!(out, "    fail_blink_ms: {},", cfg.fail_blink_ms)?;
    writeln!(out, "    reset: ::linecheck_core::reset::ResetTiming {{")?;
    writeln!(out, "        pulse_ms: {},", cfg.reset.pulse_ms)?;
    writeln!(out, "        gap_ms: {},", cfg.reset.gap_ms)?;
    writeln!(out, "    }},")?;
    writeln!(out, "}};")
}

fn write_stimulus_timing<W: Write>(t: &StimulusTiming, out: &mut W) -> fmt::Result {
    writeln!(out, "/// Stimulus timing from `[target]`")?;
    writeln!(
        out,
        "pub const STIMULUS_TIMING: ::linecheck_core::config::StimulusTiming = \
         ::linecheck_core::config::StimulusTiming {{"
    )?;
    writeln!(out, "    hold_all_high_ms: {},", t.hold_all_high_ms)?;
    writeln!(out, "    hold_all_low_ms: {},", t.hold_all_low_ms)?;
    writeln!(out, "    pulse_high_ms: {},", t.pulse_high_ms)?;
    writeln!(out, "    pulse_low_ms: {},", t.pulse_low_ms)?;
    writeln!(out, "    heartbeat_ms: {},", t.heartbeat_ms)?;
    writeln!(out, "}};")
}

fn write_pin_macro<W: Write>(name: &str, pin: Pin, out: &mut W) -> fmt::Result {
    writeln!(out, "macro_rules! {name} {{")?;
    writeln!(out, "    ($p:ident) => {{")?;
    writeln!(out, "        $p.{}", pin.peripheral_ident())?;
    writeln!(out, "    }};")?;
    writeln!(out, "}}")?;
    writeln!(out)
}
