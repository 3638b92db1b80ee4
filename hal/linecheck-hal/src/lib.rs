//! Linecheck Hardware Abstraction Layer
//!
//! This crate defines hardware abstraction traits that are implemented
//! by chip-specific HALs. The board-agnostic core only ever sees these
//! traits, so the test sequencer and stimulus script run unchanged on the
//! host under test doubles.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │  Firmware (linecheck-controller / -target)   │
//! └──────────────────────────────────────────────┘
//!                       │
//!          ┌────────────┴────────────┐
//!          ▼                         ▼
//! ┌─────────────────┐     ┌──────────────────────┐
//! │ linecheck-core  │────▶│ linecheck-hal        │
//! └─────────────────┘     │ (this crate - traits)│
//!                         └──────────────────────┘
//!                                    ▲
//!                         ┌──────────┴───────────┐
//!                         │linecheck-hal-nrf52840│
//!                         └──────────────────────┘
//! ```
//!
//! # Traits
//!
//! - [`gpio::OutputPin`], [`gpio::InputPin`] - Digital I/O

#![no_std]
#![deny(unsafe_code)]

pub mod gpio;

// Re-export key items at crate root for convenience
pub use gpio::{InputPin, Level, OutputPin};
