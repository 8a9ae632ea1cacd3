//! Logger bootstrap. Library code logs through the `log` facade only.

mod init;

pub use init::{LoggingConfig, init_logging};
