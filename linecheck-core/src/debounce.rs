//! Debounced button input
//!
//! [`DebouncedInput`] is a level filter: it reports "active" while the raw
//! input has sat at the pressed level for longer than the settle window.
//! [`ButtonActivation`] turns that level into a one-shot activation that
//! fires when the held button is released, so a long press cannot re-trigger
//! while held. The release wait is a sub-state checked on every poll; nothing
//! here blocks.

use linecheck_hal::Level;

/// Default settle window
pub const DEFAULT_SETTLE_MS: u32 = 50;

/// Settle-window filter over a single raw input
#[derive(Debug, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DebouncedInput {
    /// Raw level that means "pressed" (low for a pull-up button)
    pressed: Level,
    settle_ms: u32,
    last_raw: Level,
    last_change_ms: u32,
}

impl DebouncedInput {
    /// Create a filter starting in the released state
    pub fn new(pressed: Level, settle_ms: u32, now_ms: u32) -> Self {
        Self {
            pressed,
            settle_ms,
            last_raw: !pressed,
            last_change_ms: now_ms,
        }
    }

    /// Record the raw level seen this poll
    ///
    /// A level change only restarts the settle window; it is not a decision.
    pub fn update(&mut self, raw: Level, now_ms: u32) {
        if raw != self.last_raw {
            self.last_raw = raw;
            self.last_change_ms = now_ms;
        }
    }

    /// Pressed and stable for longer than the settle window
    pub fn is_active(&self, now_ms: u32) -> bool {
        self.last_raw == self.pressed
            && now_ms.wrapping_sub(self.last_change_ms) > self.settle_ms
    }

    /// Raw level is at the released polarity
    pub fn is_released(&self) -> bool {
        self.last_raw != self.pressed
    }
}

/// Press-then-release activation guard
#[derive(Debug, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ButtonActivation {
    input: DebouncedInput,
    /// Debounced press seen, waiting for release
    held: bool,
}

impl ButtonActivation {
    pub fn new(pressed: Level, settle_ms: u32, now_ms: u32) -> Self {
        Self {
            input: DebouncedInput::new(pressed, settle_ms, now_ms),
            held: false,
        }
    }

    /// Feed the raw level; returns true once per press, on release
    pub fn poll(&mut self, raw: Level, now_ms: u32) -> bool {
        self.input.update(raw, now_ms);

        if self.held {
            if self.input.is_released() {
                self.held = false;
                return true;
            }
            return false;
        }

        if self.input.is_active(now_ms) {
            self.held = true;
        }
        false
    }

    /// Waiting for the button to be released
    pub fn is_held(&self) -> bool {
        self.held
    }
}
