//! Status markers emitted by both boards
//!
//! A marker is one status line. The host collaborator keys off substrings
//! (`ALL_HIGH`, `BEGIN`, `ERROR`, `SUCCESS`, ...) and pulls `P<port>_<pin>`
//! labels out of error lines, so the text below is part of the interface.

use core::fmt::{self, Write};

use heapless::{String, Vec};

/// Most lines a roster may hold (one bit per line in a `u32` snapshot)
pub const MAX_LINES: usize = 32;

/// Longest label accepted for a roster line
pub const MAX_LABEL_LEN: usize = 16;

/// Worst case rendered line: prefix, stage text, and every label listed
pub const MAX_MARKER_LEN: usize = 96 + MAX_LINES * (MAX_LABEL_LEN + 2);

/// Human-readable name of a roster line
pub type Label = &'static str;

/// Ordered list of labels carried by diagnostic markers
pub type LabelList = Vec<Label, MAX_LINES>;

/// Which board is speaking
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Role {
    /// Test orchestrator
    Controller,
    /// Device under test
    Target,
}

impl Role {
    /// Line prefix the host uses to validate the port it is reading
    pub fn prefix(self) -> &'static str {
        match self {
            Role::Controller => "Master",
            Role::Target => "Target",
        }
    }
}

/// Test stages that carry begin/ok/error markers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StageName {
    AllHigh,
    AllLow,
    Sequence,
}

impl StageName {
    pub fn as_str(self) -> &'static str {
        match self {
            StageName::AllHigh => "ALL_HIGH",
            StageName::AllLow => "ALL_LOW",
            StageName::Sequence => "SEQUENCE",
        }
    }
}

/// One status line
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Marker {
    /// Board finished bring-up
    Ready,
    /// Periodic idle marker / heartbeat
    Idle,
    /// `START` arrived over serial
    StartCommandReceived,
    /// A test run is starting
    Start,
    /// A reset pulse is being driven
    ResetSent,
    /// `FLASH`/`DFU` arrived over serial
    FlashCommandReceived,
    /// Stage entered
    Begin(StageName),
    /// Stage condition met
    StageOk(StageName),
    /// Precheck timed out; `labels` are the lines at the wrong level
    ///
    /// AllHigh lists lines still low, AllLow lists lines still high.
    PrecheckFailed { stage: StageName, labels: LabelList },
    /// A line rose in the sequence stage
    LineOk(Label),
    /// Every line rose in order (sequence stage)
    AllOk,
    /// More than one line high at once
    MultipleHigh(LabelList),
    /// A line rose ahead of the one expected
    OrderViolated { expected: Label, received: Label },
    /// A line already seen rose again
    RepeatedRaise(Label),
    /// Sequence ran out of time; `None` once every line was seen
    Timeout { expected: Option<Label> },
    /// Run passed
    Success,
    /// Run failed
    Fail,
}

impl Marker {
    /// Whether the host treats this line as an error report
    pub fn is_error(&self) -> bool {
        matches!(
            self,
            Marker::PrecheckFailed { .. }
                | Marker::MultipleHigh(_)
                | Marker::OrderViolated { .. }
                | Marker::RepeatedRaise(_)
                | Marker::Timeout { .. }
        )
    }

    /// Write the marker text (without terminator) for `role`
    pub fn write_to<W: Write>(&self, role: Role, out: &mut W) -> fmt::Result {
        write!(out, "{}: ", role.prefix())?;
        match self {
            Marker::Ready => out.write_str("READY"),
            Marker::Idle => out.write_str("STAGE — IDLE: OK"),
            Marker::StartCommandReceived => out.write_str("START command received."),
            Marker::Start => out.write_str("START"),
            Marker::ResetSent => out.write_str("SENT RESET"),
            Marker::FlashCommandReceived => out.write_str("FLASH command received."),
            Marker::Begin(stage) => write!(out, "STAGE — {}: BEGIN", stage.as_str()),
            Marker::StageOk(stage) => write!(out, "STAGE — {}: OK", stage.as_str()),
            Marker::PrecheckFailed { stage, labels } => {
                let listed = match stage {
                    StageName::AllHigh => "LOW_PINS",
                    _ => "HIGH_PINS",
                };
                write!(out, "STAGE — {}: ERROR. {}: ", stage.as_str(), listed)?;
                write_labels(out, labels)
            }
            Marker::LineOk(label) => write!(out, "STAGE — SEQUENCE: OK — {}", label),
            Marker::AllOk => out.write_str("STAGE — SEQUENCE: ALL OK"),
            Marker::MultipleHigh(labels) => {
                out.write_str("STAGE — SEQUENCE: ERROR. FAIL_PINS: ")?;
                write_labels(out, labels)
            }
            Marker::OrderViolated { expected, received } => write!(
                out,
                "STAGE — SEQUENCE: ERROR. THE ORDER OF SEQUENCE IS VIOLATED. EXPECTED: {}, RECEIVED {}",
                expected, received
            ),
            Marker::RepeatedRaise(label) => {
                write!(out, "STAGE — SEQUENCE: ERROR. REPEATED/EARLIER RAISE {}", label)
            }
            Marker::Timeout { expected } => write!(
                out,
                "STAGE — SEQUENCE: ERROR. TIMEOUT. EXPECTED: {}",
                expected.unwrap_or("end")
            ),
            Marker::Success => out.write_str("STAGE — SUCCESS: OK"),
            Marker::Fail => out.write_str("FAIL"),
        }
    }

    /// Render the marker as a `\r\n` terminated line
    pub fn render(&self, role: Role) -> Result<String<MAX_MARKER_LEN>, fmt::Error> {
        let mut line = String::new();
        self.write_to(role, &mut line)?;
        line.push_str("\r\n").map_err(|_| fmt::Error)?;
        Ok(line)
    }
}

fn write_labels<W: Write>(out: &mut W, labels: &[Label]) -> fmt::Result {
    for (i, label) in labels.iter().enumerate() {
        if i > 0 {
            out.write_str(", ")?;
        }
        out.write_str(label)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(marker: Marker, role: Role) -> std::string::String {
        let line = marker.render(role).unwrap();
        assert!(line.ends_with("\r\n"));
        std::string::String::from(line.trim_end())
    }

    fn labels(items: &[Label]) -> LabelList {
        Vec::from_slice(items).unwrap()
    }

    #[test]
    fn test_role_prefixes() {
        assert_eq!(text(Marker::Ready, Role::Controller), "Master: READY");
        assert_eq!(text(Marker::Ready, Role::Target), "Target: READY");
    }

    #[test]
    fn test_stage_markers() {
        assert_eq!(
            text(Marker::Begin(StageName::AllHigh), Role::Controller),
            "Master: STAGE — ALL_HIGH: BEGIN"
        );
        assert_eq!(
            text(Marker::StageOk(StageName::AllLow), Role::Target),
            "Target: STAGE — ALL_LOW: OK"
        );
        assert_eq!(
            text(Marker::Idle, Role::Target),
            "Target: STAGE — IDLE: OK"
        );
        assert_eq!(
            text(Marker::Success, Role::Controller),
            "Master: STAGE — SUCCESS: OK"
        );
    }

    #[test]
    fn test_precheck_lists_wrong_level() {
        let high = Marker::PrecheckFailed {
            stage: StageName::AllHigh,
            labels: labels(&["P1_07(VCC)", "P0_31", "P0_06"]),
        };
        assert_eq!(
            text(high, Role::Controller),
            "Master: STAGE — ALL_HIGH: ERROR. LOW_PINS: P1_07(VCC), P0_31, P0_06"
        );

        let low = Marker::PrecheckFailed {
            stage: StageName::AllLow,
            labels: labels(&["P0_02"]),
        };
        assert_eq!(
            text(low, Role::Controller),
            "Master: STAGE — ALL_LOW: ERROR. HIGH_PINS: P0_02"
        );
    }

    #[test]
    fn test_sequence_errors() {
        assert_eq!(
            text(
                Marker::OrderViolated {
                    expected: "P0_29",
                    received: "P0_02"
                },
                Role::Controller
            ),
            "Master: STAGE — SEQUENCE: ERROR. THE ORDER OF SEQUENCE IS VIOLATED. EXPECTED: P0_29, RECEIVED P0_02"
        );
        assert_eq!(
            text(Marker::RepeatedRaise("P0_31"), Role::Controller),
            "Master: STAGE — SEQUENCE: ERROR. REPEATED/EARLIER RAISE P0_31"
        );
        assert_eq!(
            text(Marker::MultipleHigh(labels(&["P0_31", "P0_29"])), Role::Controller),
            "Master: STAGE — SEQUENCE: ERROR. FAIL_PINS: P0_31, P0_29"
        );
    }

    #[test]
    fn test_timeout_names_expected_or_end() {
        assert_eq!(
            text(Marker::Timeout { expected: Some("P1_15") }, Role::Controller),
            "Master: STAGE — SEQUENCE: ERROR. TIMEOUT. EXPECTED: P1_15"
        );
        assert_eq!(
            text(Marker::Timeout { expected: None }, Role::Controller),
            "Master: STAGE — SEQUENCE: ERROR. TIMEOUT. EXPECTED: end"
        );
    }

    #[test]
    fn test_line_ok() {
        assert_eq!(
            text(Marker::LineOk("P0_10"), Role::Controller),
            "Master: STAGE — SEQUENCE: OK — P0_10"
        );
    }

    #[test]
    fn test_error_classification() {
        assert!(Marker::RepeatedRaise("x").is_error());
        assert!(Marker::Timeout { expected: None }.is_error());
        assert!(!Marker::Fail.is_error());
        assert!(!Marker::LineOk("x").is_error());
    }

    #[test]
    fn test_full_roster_fits() {
        let mut all = LabelList::new();
        for _ in 0..MAX_LINES {
            all.push("P0_31(XXXXXXXXX)").unwrap();
        }
        let marker = Marker::PrecheckFailed {
            stage: StageName::AllLow,
            labels: all,
        };
        assert!(marker.render(Role::Controller).is_ok());
    }
}
