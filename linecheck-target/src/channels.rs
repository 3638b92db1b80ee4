//! Inter-task communication channels

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use embassy_sync::signal::Signal;

use linecheck_core::Marker;

/// Status lines queued for the host
const MARKER_CHANNEL_SIZE: usize = 8;

/// Markers waiting to be written to USB serial
pub static MARKERS: Channel<CriticalSectionRawMutex, Marker, MARKER_CHANNEL_SIZE> =
    Channel::new();

/// Serial TX has finished waiting for the host
pub static SERIAL_READY: Signal<CriticalSectionRawMutex, ()> = Signal::new();
