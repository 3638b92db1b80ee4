//! USB serial transmit task
//!
//! Writes queued markers to the host, one line each.

use defmt::*;
use linecheck_core::Marker;
use linecheck_hal_nrf52840::usb::{self, SerialSender, HOST_WAIT};
use linecheck_protocol::Role;

use crate::channels::{MARKERS, SERIAL_READY};

/// Serial TX task - drains the marker channel to USB
#[embassy_executor::task]
pub async fn serial_tx_task(mut sender: SerialSender) {
    info!("Serial TX task started");

    if usb::wait_for_host(&mut sender, HOST_WAIT).await {
        info!("Host connected");
    } else {
        warn!("No host after {} ms, continuing", HOST_WAIT.as_millis());
    }
    SERIAL_READY.signal(());

    loop {
        let marker: Marker = MARKERS.receive().await;
        trace!("TX: {:?}", marker);

        if let Err(e) = usb::write_marker(&mut sender, Role::Target, &marker).await {
            // Nobody listening; the marker is dropped
            debug!("Marker not sent: {:?}", e);
        }
    }
}
