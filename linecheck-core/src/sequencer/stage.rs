//! Test stages

/// Sequencer stage; exactly one is active at a time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Stage {
    /// Idle, waiting for the button or a `START`
    AwaitActivation,
    /// Waiting for every line to read high
    AwaitAllHigh,
    /// Waiting for every line to read low
    AwaitAllLow,
    /// Checking the one-at-a-time pulse order
    Sequence,
    /// Run passed; reported once, then back to idle
    Success,
    /// Run failed; held until the next activation
    Fail,
}

impl Stage {
    /// Stages that start a run on activation
    pub fn accepts_activation(&self) -> bool {
        matches!(self, Stage::AwaitActivation | Stage::Fail)
    }

    /// Stages that are part of a run in progress
    pub fn is_running(&self) -> bool {
        matches!(
            self,
            Stage::AwaitAllHigh | Stage::AwaitAllLow | Stage::Sequence
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_activation_stages() {
        assert!(Stage::AwaitActivation.accepts_activation());
        assert!(Stage::Fail.accepts_activation());
        assert!(!Stage::Sequence.accepts_activation());
        assert!(!Stage::Success.accepts_activation());
    }

    #[test]
    fn test_running_stages() {
        assert!(Stage::AwaitAllHigh.is_running());
        assert!(Stage::Sequence.is_running());
        assert!(!Stage::Fail.is_running());
        assert!(!Stage::AwaitActivation.is_running());
    }
}
