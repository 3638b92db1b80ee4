//! Embassy tasks

pub mod sequencer;
pub mod serial_rx;
pub mod serial_tx;

pub use sequencer::sequencer_task;
pub use serial_rx::serial_rx_task;
pub use serial_tx::serial_tx_task;
