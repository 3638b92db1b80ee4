//! Linecheck Controller firmware
//!
//! Orchestrates a two-board continuity test: resets the Target, watches the
//! roster lines it drives and reports every stage over USB serial. Runs are
//! started with the board button or a `START` line from the host.

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_nrf::config::{Config, HfclkSource};
use embassy_nrf::gpio::{Input, Level, Output, OutputDrive, Pull};
use embassy_time::{Duration, Ticker};
use {defmt_rtt as _, panic_probe as _};

use linecheck_core::roster::Roster;
use linecheck_core::sampler::LineSampler;
use linecheck_core::Marker;
use linecheck_hal_nrf52840::usb::{self, UsbIdentity};
use linecheck_hal_nrf52840::{NrfInput, NrfOutput};

// Generated from harness.toml by build.rs: LABELS, LINE_COUNT, timings and
// the pin macros used below
include!(concat!(env!("OUT_DIR"), "/roster.rs"));

mod channels;
mod tasks;

use channels::{MARKERS, SERIAL_READY};

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Linecheck controller starting...");

    // USB needs the external crystal
    let mut config = Config::default();
    config.hfclk_source = HfclkSource::ExternalXtal;
    let p = embassy_nrf::init(config);
    info!("Peripherals initialized");

    let (device, class) = usb::init(
        p.USBD,
        UsbIdentity {
            product: "Linecheck Controller",
            serial_number: "controller",
        },
    );
    let (sender, receiver) = class.split();

    spawner.spawn(usb::usb_task(device)).unwrap();
    spawner.spawn(tasks::serial_tx_task(sender)).unwrap();
    spawner.spawn(tasks::serial_rx_task(receiver)).unwrap();

    // Host gets READY once it has the port open (or the wait times out)
    SERIAL_READY.wait().await;
    MARKERS.send(Marker::Ready).await;

    let roster = unwrap!(Roster::new(&LABELS));
    let lines = unwrap!(LineSampler::new(
        roster_inputs!(p).map(NrfInput::from),
        roster
    ));
    info!("Roster: {} lines", LINE_COUNT);

    let button = NrfInput::from(Input::new(button_pin!(p), Pull::Up));
    // Reset is active low; idle high keeps the Target running
    let reset = NrfOutput::from(Output::new(reset_pin!(p), Level::High, OutputDrive::Standard));
    let led = NrfOutput::from(Output::new(
        status_led_pin!(p),
        Level::Low,
        OutputDrive::Standard,
    ));

    spawner
        .spawn(tasks::sequencer_task(lines, button, reset, led))
        .unwrap();

    info!("All tasks spawned");

    // Main loop - heartbeat
    let mut ticker = Ticker::every(Duration::from_secs(10));
    loop {
        ticker.next().await;
        trace!("Heartbeat");
    }
}
