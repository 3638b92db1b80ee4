//! Stimulus task
//!
//! Plays the stimulus script once, then sends an idle marker every
//! heartbeat period until the next reset.

use defmt::*;
use embassy_time::{Duration, Ticker, Timer};

use linecheck_core::stimulus::{StimulusOutputs, StimulusScript, StimulusStep};
use linecheck_core::Marker;
use linecheck_hal_nrf52840::NrfOutput;

use crate::channels::{MARKERS, SERIAL_READY};
use crate::{LINE_COUNT, STIMULUS_TIMING};

/// Roster outputs plus the status LED
pub type Outputs = StimulusOutputs<NrfOutput<'static>, NrfOutput<'static>, LINE_COUNT>;

/// Stimulus task - drives the roster lines through the script
#[embassy_executor::task]
pub async fn stimulus_task(mut outputs: Outputs) {
    info!("Stimulus task started");

    // Give the host a chance to open the port so it sees READY
    SERIAL_READY.wait().await;

    let script = StimulusScript::new(STIMULUS_TIMING, LINE_COUNT);
    debug!("Script: {} steps", script.step_count());

    for step in script {
        match step {
            StimulusStep::Emit(marker) => MARKERS.send(marker).await,
            StimulusStep::Hold(ms) => Timer::after_millis(ms as u64).await,
            other => {
                trace!("Step: {:?}", other);
                outputs.apply(&other);
            }
        }
    }
    info!("Script complete");

    let mut ticker = Ticker::every(Duration::from_millis(STIMULUS_TIMING.heartbeat_ms as u64));
    loop {
        ticker.next().await;
        MARKERS.send(Marker::Idle).await;
    }
}
