//! Embassy tasks

pub mod serial_tx;
pub mod stimulus;

pub use serial_tx::serial_tx_task;
pub use stimulus::stimulus_task;
