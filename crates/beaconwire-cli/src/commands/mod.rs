//! Command implementations for the CLI.

mod config;
mod encode;
mod opcodes;
mod record;

pub use config::cmd_config;
pub use encode::{cmd_encode, encode_operation};
pub use opcodes::cmd_opcodes;
pub use record::{RecordArgs, cmd_record};
