//! Configuration errors
//!
//! Everything a bad `harness.toml` can do wrong, with enough context in the
//! message to fix it from a build log.

use std::path::PathBuf;

use linecheck_protocol::{MAX_LABEL_LEN, MAX_LINES};
use thiserror::Error;

use crate::pin::Pin;

/// Malformed pin name
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PinParseError {
    #[error("invalid pin name {0:?}, expected P<port>_<pin> such as P0_13")]
    Syntax(String),

    #[error("no GPIO port {0} on nRF52840")]
    NoSuchPort(u8),

    #[error("pin P{port}_{pin:02} out of range, port {port} has {width} pins")]
    OutOfRange { port: u8, pin: u8, width: u8 },
}

/// Which board a pin belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Controller,
    Target,
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Side::Controller => "controller",
            Side::Target => "target",
        })
    }
}

/// Top-level error for loading `harness.toml`
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid harness.toml: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("roster is empty, add at least one [[line]]")]
    EmptyRoster,

    #[error("roster has {0} lines, at most {max} are supported", max = MAX_LINES)]
    TooManyLines(usize),

    #[error("line {index}: label {label:?} is empty or longer than {max} bytes", max = MAX_LABEL_LEN)]
    LabelLength { index: usize, label: String },

    #[error("line {index}: label {label:?} must be printable ASCII without commas")]
    LabelCharacters { index: usize, label: String },

    #[error("label {0:?} is used by more than one line")]
    DuplicateLabel(String),

    #[error("{side} pin {pin} assigned to both {first} and {second}")]
    PinConflict {
        side: Side,
        pin: Pin,
        first: String,
        second: String,
    },

    #[error("{side} pin {pin} ({owner}) is reserved on this board")]
    ReservedPin { side: Side, pin: Pin, owner: String },

    #[error("timing {0} must be greater than zero")]
    ZeroTiming(&'static str),

    #[error(
        "target pulse sequence takes {needed_ms} ms, longer than the \
         controller's sequence_timeout_ms ({timeout_ms} ms)"
    )]
    SequenceTooLong { needed_ms: u64, timeout_ms: u32 },
}
