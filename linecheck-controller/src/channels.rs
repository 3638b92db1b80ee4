//! Inter-task communication channels
//!
//! The sequencer task produces markers and consumes commands; the serial
//! tasks sit on the other ends.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use embassy_sync::signal::Signal;

use linecheck_core::{Command, Marker};

/// Status lines queued for the host
const MARKER_CHANNEL_SIZE: usize = 16;

/// Host commands queued for the sequencer
const COMMAND_CHANNEL_SIZE: usize = 4;

/// Markers waiting to be written to USB serial
pub static MARKERS: Channel<CriticalSectionRawMutex, Marker, MARKER_CHANNEL_SIZE> =
    Channel::new();

/// Parsed host commands
pub static COMMANDS: Channel<CriticalSectionRawMutex, Command, COMMAND_CHANNEL_SIZE> =
    Channel::new();

/// Serial TX has finished waiting for the host
pub static SERIAL_READY: Signal<CriticalSectionRawMutex, ()> = Signal::new();
