//! Controller against a simulated Target on a shared virtual clock
//!
//! The simulated Target runs the real stimulus script from its reset
//! release, optionally through a miswired harness (lines swapped, open or
//! shorted), and the sequencer samples what the harness presents.

use linecheck_core::config::{SequencerConfig, StimulusTiming};
use linecheck_core::roster::{LineLevels, Roster};
use linecheck_core::sequencer::{Sequencer, SequencerIo, Stage};
use linecheck_core::stimulus::{StimulusScript, StimulusStep};
use linecheck_core::{Command, Label, LabelList, Level, Marker, StageName};
use proptest::prelude::*;

static LABELS: [Label; 32] = [
    "P1_07(VCC)", "P0_31", "P0_29", "P0_02", "P1_15", "P1_13", "P1_11", "P0_10",
    "P0_09", "P1_06", "P1_04", "P0_11", "P1_00", "P0_24", "P0_22", "P0_20",
    "P0_17", "P0_08", "P0_06", "P0_04", "P0_05", "P0_07", "P0_12", "P0_14",
    "P0_16", "P0_19", "P0_21", "P0_23", "P0_25", "P0_26", "P0_27", "P0_28",
];

/// Hard stop for a single run
const RUN_LIMIT_MS: u32 = 40_000;

struct TargetSim {
    lines: usize,
    /// Harness wiring: the k-th driven output lands on Controller line `order[k]`
    order: Vec<usize>,
    boot_ms: u32,
    script: Option<StimulusScript>,
    resume_at: u32,
    driven: LineLevels,
    open_mask: u32,
    shorts: Vec<(usize, usize)>,
}

impl TargetSim {
    fn new(lines: usize) -> Self {
        Self {
            lines,
            order: (0..lines).collect(),
            boot_ms: 0,
            script: None,
            resume_at: 0,
            driven: LineLevels::all_low(lines),
            open_mask: 0,
            shorts: Vec::new(),
        }
    }

    fn hold_reset(&mut self) {
        self.script = None;
        self.driven = LineLevels::all_low(self.lines);
    }

    fn release(&mut self, now: u32) {
        self.script = Some(StimulusScript::new(StimulusTiming::default(), self.lines));
        self.resume_at = now + self.boot_ms;
    }

    fn advance(&mut self, now: u32) {
        while let Some(script) = self.script.as_mut() {
            if now < self.resume_at {
                return;
            }
            match script.next() {
                Some(StimulusStep::DriveAll(Level::High)) => {
                    self.driven = LineLevels::all_high(self.lines)
                }
                Some(StimulusStep::DriveAll(Level::Low)) => {
                    self.driven = LineLevels::all_low(self.lines)
                }
                Some(StimulusStep::Drive { line, level }) => {
                    self.driven.set(self.order[line], level)
                }
                Some(StimulusStep::Hold(ms)) => self.resume_at += ms,
                Some(_) => {}
                None => self.script = None,
            }
        }
    }

    /// What the Controller reads through the harness
    fn observed(&self) -> LineLevels {
        let mut levels = self.driven;
        for &(a, b) in &self.shorts {
            if levels.level(a) == Level::High || levels.level(b) == Level::High {
                levels.set(a, Level::High);
                levels.set(b, Level::High);
            }
        }
        LineLevels::from_high_mask(self.lines, levels.high_mask() & !self.open_mask)
    }
}

struct Rig {
    now: u32,
    target: TargetSim,
    markers: Vec<Marker>,
}

impl SequencerIo for Rig {
    fn marker(&mut self, marker: Marker) {
        self.markers.push(marker);
    }

    fn reset_line(&mut self, level: Level) {
        match level {
            Level::Low => self.target.hold_reset(),
            Level::High => self.target.release(self.now),
        }
    }

    fn indicator(&mut self, _on: bool) {}
}

/// Send START and poll until the run passes or fails
fn run_once(target: TargetSim, tick: u32) -> (Sequencer, Vec<Marker>) {
    let roster = Roster::new(&LABELS[..target.lines]).unwrap();
    let mut seq = Sequencer::new(roster, SequencerConfig::default(), 0);
    let mut rig = Rig {
        now: 0,
        target,
        markers: Vec::new(),
    };

    seq.command(Command::Start, 0, &mut rig);

    let mut failed_at = None;
    while rig.now < RUN_LIMIT_MS {
        rig.now += tick;
        rig.target.advance(rig.now);
        let lines = rig.target.observed();
        seq.poll(rig.now, &lines, Level::High, &mut rig);

        if rig.markers.contains(&Marker::Success) {
            break;
        }
        // One more poll so the FAIL line goes out
        match (seq.stage(), failed_at) {
            (Stage::Fail, None) => failed_at = Some(rig.now),
            (Stage::Fail, Some(_)) => break,
            _ => {}
        }
    }
    (seq, rig.markers)
}

fn first_rise_error(markers: &[Marker]) -> Option<&Marker> {
    markers.iter().find(|m| {
        matches!(
            m,
            Marker::MultipleHigh(_)
                | Marker::OrderViolated { .. }
                | Marker::RepeatedRaise(_)
                | Marker::Timeout { .. }
        )
    })
}

proptest! {
    #[test]
    fn correct_harness_passes(lines in 1usize..=32, tick in 1u32..=20, boot in 0u32..=1000) {
        let mut target = TargetSim::new(lines);
        target.boot_ms = boot;
        let (seq, markers) = run_once(target, tick);

        prop_assert_eq!(markers.iter().filter(|m| **m == Marker::Success).count(), 1);
        prop_assert!(markers.iter().all(|m| !m.is_error()), "{:?}", markers);
        prop_assert_eq!(seq.run().cursor(), lines);
        prop_assert!(seq.run().prechecks().all_high);
        prop_assert!(seq.run().prechecks().all_low);
    }

    #[test]
    fn swapped_lines_name_first_deviation(
        order in (2usize..=24).prop_flat_map(|n| Just((0..n).collect::<Vec<_>>()).prop_shuffle()),
        tick in 1u32..=20,
    ) {
        let lines = order.len();
        let deviation = order.iter().enumerate().position(|(k, &line)| k != line);
        let mut target = TargetSim::new(lines);
        target.order = order.clone();
        let (_, markers) = run_once(target, tick);

        match deviation {
            None => prop_assert!(markers.contains(&Marker::Success)),
            Some(k) => {
                let expected = Marker::OrderViolated {
                    expected: LABELS[k],
                    received: LABELS[order[k]],
                };
                prop_assert_eq!(first_rise_error(&markers), Some(&expected));
                prop_assert_eq!(markers.last(), Some(&Marker::Fail));
                prop_assert!(!markers.contains(&Marker::Success));
            }
        }
    }
}

#[test]
fn shorted_pair_fails_on_multiple_high() {
    let mut target = TargetSim::new(19);
    target.shorts.push((5, 6));
    let (seq, markers) = run_once(target, 5);

    // Prechecks cannot see a short
    assert!(seq.run().prechecks().all_high);
    assert!(seq.run().prechecks().all_low);

    let mut both = LabelList::new();
    both.extend_from_slice(&[LABELS[5], LABELS[6]]).unwrap();
    assert_eq!(first_rise_error(&markers), Some(&Marker::MultipleHigh(both)));
    assert_eq!(seq.run().cursor(), 5);
    assert_eq!(markers.last(), Some(&Marker::Fail));
}

#[test]
fn open_line_reported_by_all_high_precheck() {
    let mut target = TargetSim::new(19);
    target.open_mask = 1 << 3;
    // Slow boot keeps the Target in its all-high hold when the precheck expires
    target.boot_ms = 2500;
    let (seq, markers) = run_once(target, 10);

    let mut open = LabelList::new();
    open.push(LABELS[3]).unwrap();
    assert!(markers.contains(&Marker::PrecheckFailed {
        stage: StageName::AllHigh,
        labels: open,
    }));
    assert!(!seq.run().prechecks().all_high);

    // The run carries on and trips over the missing rise
    assert_eq!(
        first_rise_error(&markers),
        Some(&Marker::OrderViolated {
            expected: LABELS[3],
            received: LABELS[4],
        })
    );
    assert!(!markers.contains(&Marker::Success));
    assert_eq!(seq.stage(), Stage::Fail);
}

#[test]
fn target_never_boots_times_out_everywhere() {
    let mut target = TargetSim::new(4);
    target.boot_ms = RUN_LIMIT_MS;
    let (seq, markers) = run_once(target, 10);

    let stages: Vec<StageName> = markers
        .iter()
        .filter_map(|m| match m {
            Marker::PrecheckFailed { stage, .. } => Some(*stage),
            _ => None,
        })
        .collect();
    // All-low trivially holds with an idle Target
    assert_eq!(stages, [StageName::AllHigh]);
    assert!(markers.contains(&Marker::Timeout {
        expected: Some(LABELS[0])
    }));
    assert_eq!(seq.stage(), Stage::Fail);
}
