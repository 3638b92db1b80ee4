//! Linecheck Target firmware
//!
//! The board under test. After reset it drives a fixed stimulus onto the
//! roster lines (all high, all low, then each line in turn) and reports
//! each stage over USB serial, then idles with a heartbeat.

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_nrf::config::{Config, HfclkSource};
use embassy_nrf::gpio::{Level, Output, OutputDrive};
use embassy_time::{Duration, Ticker};
use {defmt_rtt as _, panic_probe as _};

use linecheck_core::stimulus::StimulusOutputs;
use linecheck_hal_nrf52840::usb::{self, UsbIdentity};
use linecheck_hal_nrf52840::NrfOutput;

// Generated from harness.toml by build.rs: LABELS, LINE_COUNT, timings and
// the pin macros used below
include!(concat!(env!("OUT_DIR"), "/roster.rs"));

mod channels;
mod tasks;

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Linecheck target starting...");

    // USB needs the external crystal
    let mut config = Config::default();
    config.hfclk_source = HfclkSource::ExternalXtal;
    let p = embassy_nrf::init(config);
    info!("Peripherals initialized");

    // Every roster line starts low until the script runs
    let led = NrfOutput::from(Output::new(
        status_led_pin!(p),
        Level::Low,
        OutputDrive::Standard,
    ));
    let outputs = unwrap!(StimulusOutputs::new(
        roster_outputs!(p).map(NrfOutput::from),
        led,
        LINE_COUNT
    ));
    info!("Roster: {} lines, first {}", LINE_COUNT, LABELS[0]);

    let (device, class) = usb::init(
        p.USBD,
        UsbIdentity {
            product: "Linecheck Target",
            serial_number: "target",
        },
    );
    // Target takes no commands; the receive half is unused
    let (sender, _receiver) = class.split();

    spawner.spawn(usb::usb_task(device)).unwrap();
    spawner.spawn(tasks::serial_tx_task(sender)).unwrap();
    spawner.spawn(tasks::stimulus_task(outputs)).unwrap();

    info!("All tasks spawned");

    // Main loop - heartbeat
    let mut ticker = Ticker::every(Duration::from_secs(10));
    loop {
        ticker.next().await;
        trace!("Heartbeat");
    }
}
