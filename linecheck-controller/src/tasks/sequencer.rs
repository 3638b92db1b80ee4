//! Test sequencer task
//!
//! Polls the sequencer at a fixed rate with a fresh line snapshot and the
//! raw button level. Host commands are handled at the start of each tick.

use defmt::*;
use embassy_time::{Duration, Instant, Ticker};

use linecheck_core::sampler::LineSampler;
use linecheck_core::sequencer::{Sequencer, SequencerIo, Stage};
use linecheck_core::{Level, Marker};
use linecheck_hal::{InputPin, OutputPin};
use linecheck_hal_nrf52840::{NrfInput, NrfOutput};

use crate::channels::{COMMANDS, MARKERS};
use crate::{LINE_COUNT, POLL_INTERVAL_MS, SEQUENCER_CONFIG};

/// Roster inputs in roster order
pub type Lines = LineSampler<NrfInput<'static>, LINE_COUNT>;

/// Board side of the sequencer's effects
struct ControllerIo {
    reset: NrfOutput<'static>,
    led: NrfOutput<'static>,
}

impl SequencerIo for ControllerIo {
    fn marker(&mut self, marker: Marker) {
        if let Err(e) = MARKERS.try_send(marker) {
            warn!("Marker channel full, dropping {:?}", e);
        }
    }

    fn reset_line(&mut self, level: Level) {
        debug!("Reset line {:?}", level);
        self.reset.set_level(level);
    }

    fn indicator(&mut self, on: bool) {
        self.led.set_level(Level::from_high(on));
    }
}

/// Wrapping millisecond clock for the sequencer
fn now_ms() -> u32 {
    Instant::now().as_millis() as u32
}

/// Sequencer task - runs the test state machine
#[embassy_executor::task]
pub async fn sequencer_task(
    lines: Lines,
    button: NrfInput<'static>,
    reset: NrfOutput<'static>,
    led: NrfOutput<'static>,
) {
    info!("Sequencer task started");

    let mut io = ControllerIo { reset, led };
    let mut sequencer = Sequencer::new(*lines.roster(), SEQUENCER_CONFIG, now_ms());
    let mut last_stage = sequencer.stage();

    let mut ticker = Ticker::every(Duration::from_millis(POLL_INTERVAL_MS));

    loop {
        ticker.next().await;
        let now = now_ms();

        while let Ok(cmd) = COMMANDS.try_receive() {
            sequencer.command(cmd, now, &mut io);
        }

        sequencer.poll(now, &lines.snapshot(), button.level(), &mut io);

        let stage = sequencer.stage();
        if stage != last_stage {
            info!("Stage: {:?} -> {:?}", last_stage, stage);
            if last_stage.is_running() && !stage.is_running() {
                info!("Prechecks: {:?}", sequencer.run().prechecks());
            }
            if stage == Stage::Fail && !lines.all_match(Level::Low) {
                debug!("Lines high at fail: {:?}", lines.names_at_level(Level::High));
            }
            last_stage = stage;
        }
    }
}
