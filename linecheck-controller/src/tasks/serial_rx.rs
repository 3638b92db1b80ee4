//! USB serial receive task
//!
//! Splits host input into lines and forwards recognised commands in
//! arrival order.

use defmt::*;
use linecheck_hal_nrf52840::usb::{SerialReceiver, MAX_PACKET_SIZE};
use linecheck_protocol::{LineParser, MAX_PACKET_COMMANDS};

use crate::channels::COMMANDS;

// A full packet's commands always fit one batch
const _: () = core::assert!(MAX_PACKET_SIZE as usize <= MAX_PACKET_COMMANDS);

/// Serial RX task - parses host lines into commands
#[embassy_executor::task]
pub async fn serial_rx_task(mut receiver: SerialReceiver) {
    info!("Serial RX task started");

    let mut parser = LineParser::new();
    let mut buf = [0u8; MAX_PACKET_SIZE as usize];

    loop {
        receiver.wait_connection().await;
        debug!("Serial RX connected");

        loop {
            match receiver.read_packet(&mut buf).await {
                Ok(n) => {
                    trace!("RX: {} bytes", n);
                    let (commands, overflows) = parser.feed_packet(&buf[..n]);
                    if overflows > 0 {
                        warn!("Discarded {} over-long line(s)", overflows);
                    }
                    // Waits for the sequencer when the channel is full; no
                    // command is dropped
                    for cmd in commands {
                        debug!("Command: {:?}", cmd);
                        COMMANDS.send(cmd).await;
                    }
                }
                Err(e) => {
                    debug!("Serial RX disconnected: {:?}", e);
                    break;
                }
            }
        }

        // A partial line from the last session must not prefix the next one
        parser.reset();
    }
}
