//! GPIO pin abstractions
//!
//! The core reads and drives lines only through these traits; chip HALs
//! implement them over their own pin types.

use core::ops::Not;

/// Logic level of a digital line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Level {
    Low,
    High,
}

impl Level {
    /// Level from a boolean, `true` meaning high
    pub fn from_high(high: bool) -> Self {
        if high {
            Level::High
        } else {
            Level::Low
        }
    }

    pub fn is_high(self) -> bool {
        self == Level::High
    }

    pub fn is_low(self) -> bool {
        self == Level::Low
    }
}

impl Not for Level {
    type Output = Level;

    fn not(self) -> Level {
        match self {
            Level::Low => Level::High,
            Level::High => Level::Low,
        }
    }
}

/// Digital output pin
///
/// Roster outputs, the reset line and indicator LEDs all go through this.
pub trait OutputPin {
    /// Set the pin high (logic 1)
    fn set_high(&mut self);

    /// Set the pin low (logic 0)
    fn set_low(&mut self);

    /// Toggle the pin state
    fn toggle(&mut self) {
        if self.is_set_high() {
            self.set_low();
        } else {
            self.set_high();
        }
    }

    /// Drive the pin to a specific level
    fn set_level(&mut self, level: Level) {
        match level {
            Level::High => self.set_high(),
            Level::Low => self.set_low(),
        }
    }

    /// Check if the pin is currently set high
    fn is_set_high(&self) -> bool;

    /// Check if the pin is currently set low
    fn is_set_low(&self) -> bool {
        !self.is_set_high()
    }
}

/// Digital input pin
pub trait InputPin {
    /// Check if the pin reads high (logic 1)
    fn is_high(&self) -> bool;

    /// Check if the pin reads low (logic 0)
    fn is_low(&self) -> bool {
        !self.is_high()
    }

    /// Instantaneous logic level
    fn level(&self) -> Level {
        Level::from_high(self.is_high())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FakeOutput {
        high: bool,
    }

    impl OutputPin for FakeOutput {
        fn set_high(&mut self) {
            self.high = true;
        }

        fn set_low(&mut self) {
            self.high = false;
        }

        fn is_set_high(&self) -> bool {
            self.high
        }
    }

    struct FakeInput(bool);

    impl InputPin for FakeInput {
        fn is_high(&self) -> bool {
            self.0
        }
    }

    #[test]
    fn test_level_not() {
        assert_eq!(!Level::High, Level::Low);
        assert_eq!(!Level::Low, Level::High);
    }

    #[test]
    fn test_default_toggle() {
        let mut pin = FakeOutput { high: false };
        pin.toggle();
        assert!(pin.is_set_high());
        pin.toggle();
        assert!(pin.is_set_low());
    }

    #[test]
    fn test_set_level() {
        let mut pin = FakeOutput { high: false };
        pin.set_level(Level::High);
        assert!(pin.is_set_high());
        pin.set_level(Level::Low);
        assert!(!pin.is_set_high());
    }

    #[test]
    fn test_input_level() {
        assert_eq!(FakeInput(true).level(), Level::High);
        assert_eq!(FakeInput(false).level(), Level::Low);
        assert!(FakeInput(false).is_low());
    }
}
