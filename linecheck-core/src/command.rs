//! Start-request latch
//!
//! A `START` from the host is latched and consumed by the next stage that
//! accepts an activation, so a request is never dropped even when it lands
//! mid-run. Repeating `START` while latched changes nothing.

/// One-shot start latch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StartLatch {
    latched: bool,
}

impl StartLatch {
    pub const fn new() -> Self {
        Self { latched: false }
    }

    /// Latch a start request (idempotent)
    pub fn request(&mut self) {
        self.latched = true;
    }

    pub fn is_latched(&self) -> bool {
        self.latched
    }

    /// Consume the latch, returning whether it was set
    pub fn take(&mut self) -> bool {
        core::mem::take(&mut self.latched)
    }
}
