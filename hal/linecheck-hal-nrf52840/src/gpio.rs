//! GPIO trait implementations
//!
//! Thin wrappers so the core's sampler, reset pulser and stimulus outputs
//! can drive `embassy-nrf` pins through the `linecheck-hal` traits.

use embassy_nrf::gpio::{Input, Output};
use linecheck_hal::{InputPin, OutputPin};

/// Roster input or button
pub struct NrfInput<'d> {
    pin: Input<'d>,
}

impl<'d> NrfInput<'d> {
    pub fn new(pin: Input<'d>) -> Self {
        Self { pin }
    }

    pub fn into_inner(self) -> Input<'d> {
        self.pin
    }
}

impl<'d> From<Input<'d>> for NrfInput<'d> {
    fn from(pin: Input<'d>) -> Self {
        Self::new(pin)
    }
}

impl InputPin for NrfInput<'_> {
    fn is_high(&self) -> bool {
        self.pin.is_high()
    }
}

/// Roster output, reset line or LED
pub struct NrfOutput<'d> {
    pin: Output<'d>,
}

impl<'d> NrfOutput<'d> {
    pub fn new(pin: Output<'d>) -> Self {
        Self { pin }
    }

    pub fn into_inner(self) -> Output<'d> {
        self.pin
    }
}

impl<'d> From<Output<'d>> for NrfOutput<'d> {
    fn from(pin: Output<'d>) -> Self {
        Self::new(pin)
    }
}

impl OutputPin for NrfOutput<'_> {
    fn set_high(&mut self) {
        self.pin.set_high();
    }

    fn set_low(&mut self) {
        self.pin.set_low();
    }

    // Hardware toggle, no read-back
    fn toggle(&mut self) {
        self.pin.toggle();
    }

    fn is_set_high(&self) -> bool {
        self.pin.is_set_high()
    }
}
