//! Board-agnostic core logic for the continuity test harness
//!
//! This crate contains all test logic that does not depend on specific
//! hardware implementations:
//!
//! - Line roster and level snapshots
//! - Line sampler (roster-ordered reads and diagnostics)
//! - Debounced button input with release guard
//! - Start-request latch for host commands
//! - Non-blocking reset pulse generator
//! - Test sequencer (the Controller's state machine)
//! - Stimulus script (the Target's fixed drive sequence)
//! - Timing configuration types

#![no_std]
#![deny(unsafe_code)]

#[cfg(test)]
extern crate std;

pub mod command;
pub mod config;
pub mod debounce;
pub mod reset;
pub mod roster;
pub mod sampler;
pub mod sequencer;
pub mod stimulus;

pub use linecheck_hal::Level;
pub use linecheck_protocol::{Command, Label, LabelList, Marker, StageName, MAX_LINES};
