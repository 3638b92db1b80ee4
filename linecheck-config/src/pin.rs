//! nRF52840 pin names and allocation
//!
//! Pins are written the way the board silkscreen and `embassy-nrf` name
//! them: `P0_13`, `P1_07`. Port 0 has 32 pins, port 1 has 16.

use std::collections::BTreeMap;
use std::fmt;

use serde::Deserialize;

use crate::error::PinParseError;

/// Pins per GPIO port
pub const PORT_WIDTH: [u8; 2] = [32, 16];

/// Pins the nice!nano does not bring out as GPIO (32 kHz crystal, nRESET)
pub const RESERVED: [Pin; 3] = [Pin::new(0, 0), Pin::new(0, 1), Pin::new(0, 18)];

/// One GPIO pin
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
#[serde(try_from = "String")]
pub struct Pin {
    port: u8,
    pin: u8,
}

impl Pin {
    pub const fn new(port: u8, pin: u8) -> Self {
        Self { port, pin }
    }

    pub fn port(&self) -> u8 {
        self.port
    }

    pub fn pin(&self) -> u8 {
        self.pin
    }

    pub fn is_reserved(&self) -> bool {
        RESERVED.contains(self)
    }

    /// Field name of this pin on `embassy_nrf::Peripherals`
    pub fn peripheral_ident(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Pin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P{}_{:02}", self.port, self.pin)
    }
}

/// Parse a pin name from config
///
/// Accepts `P<port>_<pin>` with a one- or two-digit pin number, any case:
/// - "P0_13" -> port 0, pin 13
/// - "p1_7"  -> port 1, pin 7
pub fn parse_pin_string(s: &str) -> Result<Pin, PinParseError> {
    let trimmed = s.trim();
    let invalid = || PinParseError::Syntax(trimmed.to_string());

    let rest = trimmed
        .strip_prefix('P')
        .or_else(|| trimmed.strip_prefix('p'))
        .ok_or_else(invalid)?;
    let (port, pin) = rest.split_once('_').ok_or_else(invalid)?;

    if pin.is_empty() || pin.len() > 2 || !pin.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    let port: u8 = port.parse().map_err(|_| invalid())?;
    let pin: u8 = pin.parse().map_err(|_| invalid())?;

    let width = *PORT_WIDTH
        .get(port as usize)
        .ok_or(PinParseError::NoSuchPort(port))?;
    if pin >= width {
        return Err(PinParseError::OutOfRange { port, pin, width });
    }
    Ok(Pin::new(port, pin))
}

impl TryFrom<String> for Pin {
    type Error = PinParseError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        parse_pin_string(&s)
    }
}

/// Tracks which pins one board already uses, and for what
#[derive(Debug, Default)]
pub struct PinAllocator {
    owners: BTreeMap<Pin, String>,
}

impl PinAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim a pin for `owner`
    ///
    /// Returns the previous owner's name if the pin is already taken.
    pub fn allocate(&mut self, pin: Pin, owner: &str) -> Result<(), String> {
        if let Some(previous) = self.owners.get(&pin) {
            return Err(previous.clone());
        }
        self.owners.insert(pin, owner.to_string());
        Ok(())
    }

    pub fn is_allocated(&self, pin: Pin) -> bool {
        self.owners.contains_key(&pin)
    }

    pub fn allocated_count(&self) -> usize {
        self.owners.len()
    }
}
