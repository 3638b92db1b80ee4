//! Build-time harness configuration
//!
//! Both firmware build scripts load the workspace `harness.toml` through
//! this crate, reject anything the boards cannot run, and generate the
//! roster source each firmware compiles in. Generating both boards from one
//! file is what keeps the Controller's and Target's rosters in the same
//! order and length.

pub mod codegen;
pub mod error;
pub mod harness;
pub mod pin;
pub mod report;

pub use error::{ConfigError, PinParseError, Side};
pub use harness::{ControllerConfig, HarnessConfig, LineConfig, TargetConfig};
pub use pin::{parse_pin_string, Pin, PinAllocator};

/// Workspace-relative name of the harness description
pub const HARNESS_FILE: &str = "harness.toml";
