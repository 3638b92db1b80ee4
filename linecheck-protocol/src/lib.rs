//! Linecheck Status-Line Protocol
//!
//! This crate defines the text protocol spoken over USB CDC between the two
//! boards and the host application. It is deliberately human readable:
//! the host only substring-matches lines, and a person with a terminal can
//! drive a test by hand.
//!
//! # Protocol Overview
//!
//! Board → host: one newline-terminated status line per event, prefixed
//! with the speaking board's role:
//! ```text
//! Master: STAGE — ALL_HIGH: BEGIN
//! Master: STAGE — ALL_HIGH: ERROR. LOW_PINS: P0_31, P0_29
//! Target: STAGE — SEQUENCE: ALL OK
//! ```
//!
//! Host → controller: one command per line, case-insensitive, whitespace
//! trimmed (`START`, `FLASH`, `DFU`). Anything else is ignored.

#![no_std]
#![deny(unsafe_code)]

#[cfg(test)]
extern crate std;

pub mod command;
pub mod marker;

pub use command::{
    parse_command, Command, CommandBatch, LineError, LineParser, MAX_COMMAND_LEN,
    MAX_PACKET_COMMANDS,
};
pub use marker::{
    Label, LabelList, Marker, Role, StageName, MAX_LABEL_LEN, MAX_LINES, MAX_MARKER_LEN,
};
