//! nRF52840-specific HAL for the continuity test harness
//!
//! This crate provides nRF52840 implementations of the shared
//! `linecheck-hal` traits, plus the board bring-up both firmwares share:
//!
//! - GPIO wrappers over `embassy-nrf` inputs and outputs
//! - USB CDC-ACM serial (device setup, host wait, line writer)

#![no_std]

pub mod gpio;
pub mod usb;

pub use gpio::{NrfInput, NrfOutput};
pub use usb::{SerialError, UsbDriver};
