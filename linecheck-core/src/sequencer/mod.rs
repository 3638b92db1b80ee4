//! Test sequencer (Controller role)
//!
//! Drives one pass/fail run: reset the Target, wait for every line high,
//! every line low, then check that the lines rise one at a time in roster
//! order. Every poll does a bounded amount of work and returns; timeouts
//! compare the poll timestamp against the stage entry time.
//!
//! The sequencer owns all mutable test state. Hardware effects go out
//! through [`SequencerIo`], so the machine runs unchanged under host tests.

pub mod run;
pub mod stage;

use core::cmp::Ordering;

use linecheck_hal::Level;
use linecheck_protocol::{Command, Label, Marker, StageName};

use crate::command::StartLatch;
use crate::config::SequencerConfig;
use crate::debounce::ButtonActivation;
use crate::reset::{PulsePattern, ResetEdge, ResetPulser};
use crate::roster::{LineLevels, Roster};

pub use run::{Prechecks, RunContext};
pub use stage::Stage;

/// Effects the sequencer asks the board to perform
pub trait SequencerIo {
    /// Send a status line to the host
    fn marker(&mut self, marker: Marker);

    /// Drive the Target reset line
    fn reset_line(&mut self, level: Level);

    /// Status indicator on/off
    fn indicator(&mut self, on: bool);
}

/// The Controller's test state machine
pub struct Sequencer {
    roster: Roster,
    config: SequencerConfig,
    stage: Stage,
    entered_ms: u32,
    /// Begin marker for the current stage already sent
    announced: bool,
    run: RunContext,
    start: StartLatch,
    button: ButtonActivation,
    reset: ResetPulser,
    indicator_on: bool,
    last_blink_ms: u32,
}

impl Sequencer {
    /// Power-up state: awaiting activation, indicator off
    pub fn new(roster: Roster, config: SequencerConfig, now_ms: u32) -> Self {
        Self {
            roster,
            config,
            stage: Stage::AwaitActivation,
            entered_ms: now_ms,
            announced: false,
            run: RunContext::default(),
            start: StartLatch::new(),
            button: ButtonActivation::new(config.button_pressed, config.debounce_ms, now_ms),
            reset: ResetPulser::new(config.reset),
            indicator_on: false,
            last_blink_ms: now_ms,
        }
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn run(&self) -> &RunContext {
        &self.run
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    pub fn config(&self) -> &SequencerConfig {
        &self.config
    }

    pub fn start_latched(&self) -> bool {
        self.start.is_latched()
    }

    pub fn reset_busy(&self) -> bool {
        self.reset.is_busy()
    }

    pub fn indicator_on(&self) -> bool {
        self.indicator_on
    }

    /// Time spent in the current stage
    pub fn stage_elapsed_ms(&self, now_ms: u32) -> u32 {
        now_ms.wrapping_sub(self.entered_ms)
    }

    /// Handle one host command
    ///
    /// `Start` is latched for the next stage that accepts it. `Flash` sends
    /// the double reset pulse right away and leaves the stage alone.
    pub fn command<Io: SequencerIo>(&mut self, command: Command, now_ms: u32, io: &mut Io) {
        match command {
            Command::Start => {
                io.marker(Marker::StartCommandReceived);
                self.start.request();
            }
            Command::Flash => {
                io.marker(Marker::FlashCommandReceived);
                self.pulse_reset(PulsePattern::Double, now_ms, io);
            }
        }
    }

    /// One pass of the state machine
    ///
    /// `lines` is this tick's roster snapshot, `button` the raw button level.
    pub fn poll<Io: SequencerIo>(
        &mut self,
        now_ms: u32,
        lines: &LineLevels,
        button: Level,
        io: &mut Io,
    ) {
        let activated = self.button.poll(button, now_ms);

        if let Some(edge) = self.reset.poll(now_ms) {
            self.drive_reset(edge, io);
        }

        // The AllHigh window opens when the Target is released from reset
        if self.run.reset_pending() {
            if self.reset.is_busy() {
                return;
            }
            self.run.reset_done();
            self.entered_ms = now_ms;
        }

        let stage = self.stage;
        match stage {
            Stage::AwaitActivation => self.await_activation(now_ms, io),
            Stage::AwaitAllHigh => self.precheck(now_ms, lines, Level::High, io),
            Stage::AwaitAllLow => self.precheck(now_ms, lines, Level::Low, io),
            Stage::Sequence => self.sequence(now_ms, lines, io),
            Stage::Success => {
                io.marker(Marker::Success);
                self.enter(Stage::AwaitActivation, now_ms);
            }
            Stage::Fail => self.fail(now_ms, io),
        }

        // Judged on the stage this poll started in, so Success always
        // spends one poll in AwaitActivation before a latched START runs
        if stage.accepts_activation() && (activated || self.start.is_latched()) {
            self.begin_run(now_ms, io);
        }
    }

    fn await_activation<Io: SequencerIo>(&mut self, now_ms: u32, io: &mut Io) {
        if now_ms.wrapping_sub(self.last_blink_ms) >= self.config.idle_marker_ms {
            io.marker(Marker::Idle);
            self.last_blink_ms = now_ms;
            self.set_indicator(!self.indicator_on, io);
        }
    }

    fn fail<Io: SequencerIo>(&mut self, now_ms: u32, io: &mut Io) {
        self.announce(Marker::Fail, io);
        if now_ms.wrapping_sub(self.last_blink_ms) >= self.config.fail_blink_ms {
            self.last_blink_ms = now_ms;
            self.set_indicator(!self.indicator_on, io);
        }
    }

    fn begin_run<Io: SequencerIo>(&mut self, now_ms: u32, io: &mut Io) {
        self.start.take();
        io.marker(Marker::Start);
        self.pulse_reset(PulsePattern::Single, now_ms, io);
        self.run = RunContext::starting(self.reset.is_busy());
        self.set_indicator(false, io);
        self.enter(Stage::AwaitAllHigh, now_ms);
    }

    /// AwaitAllHigh / AwaitAllLow
    ///
    /// A timeout is reported and the run moves on regardless.
    fn precheck<Io: SequencerIo>(
        &mut self,
        now_ms: u32,
        lines: &LineLevels,
        expected: Level,
        io: &mut Io,
    ) {
        let (name, timeout_ms, next) = match expected {
            Level::High => (
                StageName::AllHigh,
                self.config.precheck_timeout_ms,
                Stage::AwaitAllLow,
            ),
            Level::Low => (
                StageName::AllLow,
                self.config.low_stage_timeout_ms,
                Stage::Sequence,
            ),
        };

        self.announce(Marker::Begin(name), io);

        if lines.all_match(expected) {
            io.marker(Marker::StageOk(name));
            let prechecks = self.run.prechecks_mut();
            match expected {
                Level::High => prechecks.all_high = true,
                Level::Low => prechecks.all_low = true,
            }
            self.enter(next, now_ms);
        } else if self.stage_elapsed_ms(now_ms) > timeout_ms {
            io.marker(Marker::PrecheckFailed {
                stage: name,
                labels: lines.labels_at(&self.roster, !expected),
            });
            self.enter(next, now_ms);
        }
    }

    fn sequence<Io: SequencerIo>(&mut self, now_ms: u32, lines: &LineLevels, io: &mut Io) {
        self.announce(Marker::Begin(StageName::Sequence), io);

        match lines.count_at(Level::High) {
            0 => self.run.clear_low(lines),
            1 => {
                if let Some(index) = lines.positions_at(Level::High).next() {
                    if self.check_rise(index, now_ms, io) {
                        return;
                    }
                }
            }
            _ => {
                io.marker(Marker::MultipleHigh(
                    lines.labels_at(&self.roster, Level::High),
                ));
                self.enter(Stage::Fail, now_ms);
                return;
            }
        }

        if self.stage_elapsed_ms(now_ms) > self.config.sequence_timeout_ms {
            io.marker(Marker::Timeout {
                expected: self.roster.label(self.run.cursor()),
            });
            self.enter(Stage::Fail, now_ms);
        }
    }

    /// Judge a lone high line; returns true when the stage changed
    fn check_rise<Io: SequencerIo>(&mut self, index: usize, now_ms: u32, io: &mut Io) -> bool {
        if self.run.was_high(index) {
            return false;
        }
        self.run.mark_high(index);

        let received = self.label(index);
        io.marker(Marker::LineOk(received));

        let cursor = self.run.cursor();
        match index.cmp(&cursor) {
            Ordering::Equal => {
                if self.run.advance() == self.roster.len() {
                    io.marker(Marker::AllOk);
                    self.set_indicator(true, io);
                    self.enter(Stage::Success, now_ms);
                    return true;
                }
                false
            }
            Ordering::Greater => {
                io.marker(Marker::OrderViolated {
                    expected: self.label(cursor),
                    received,
                });
                self.enter(Stage::Fail, now_ms);
                true
            }
            Ordering::Less => {
                io.marker(Marker::RepeatedRaise(received));
                self.enter(Stage::Fail, now_ms);
                true
            }
        }
    }

    fn pulse_reset<Io: SequencerIo>(&mut self, pattern: PulsePattern, now_ms: u32, io: &mut Io) {
        if let Some(edge) = self.reset.trigger(pattern, now_ms) {
            self.drive_reset(edge, io);
        }
    }

    fn drive_reset<Io: SequencerIo>(&mut self, edge: ResetEdge, io: &mut Io) {
        if edge == ResetEdge::Assert {
            io.marker(Marker::ResetSent);
        }
        io.reset_line(edge.level());
    }

    fn set_indicator<Io: SequencerIo>(&mut self, on: bool, io: &mut Io) {
        self.indicator_on = on;
        io.indicator(on);
    }

    fn announce<Io: SequencerIo>(&mut self, marker: Marker, io: &mut Io) {
        if !self.announced {
            self.announced = true;
            io.marker(marker);
        }
    }

    fn enter(&mut self, stage: Stage, now_ms: u32) {
        self.stage = stage;
        self.entered_ms = now_ms;
        self.announced = false;
    }

    fn label(&self, index: usize) -> Label {
        self.roster.label(index).unwrap_or("?")
    }
}
