//! Platform-agnostic protocol types for module-addressed beacon peripherals.
//!
//! This crate provides the wire-level vocabulary shared by the engine
//! (beaconwire-core) and any alternative transport implementation.
//!
//! # Features
//!
//! - [`ByteCommand`]: the `[module, register, payload...]` frame
//! - [`protocol`]: the fixed opcode table, one row per named operation
//! - [`Signal`] and [`DataToken`]: peripheral-side data sources
//! - GATT UUID constants
//! - Error types for wire parsing
//!
//! # Example
//!
//! ```
//! use beaconwire_types::{ByteCommand, protocol::{self, Operation}};
//!
//! let row = protocol::lookup(Operation::IBeaconSetMajor);
//! let cmd = ByteCommand::new(row.module, row.register, 78u16.to_le_bytes().to_vec());
//! assert_eq!(cmd.to_vec(), vec![0x07, 0x03, 0x4e, 0x00]);
//! ```

pub mod command;
pub mod error;
pub mod protocol;
pub mod signal;
pub mod uuid;

pub use command::ByteCommand;
pub use error::{ParseError, ParseResult};
pub use protocol::{OPCODES, Opcode, Operation, PayloadSchema};
pub use signal::{Axis, DataToken, Signal, SignalSource};
pub use uuid as uuids;

#[cfg(all(test, feature = "serde"))]
mod serde_tests {
    use super::*;

    #[test]
    fn test_byte_command_json() {
        let cmd = ByteCommand::new(0x07, 0x01, vec![0x01]);
        let json = serde_json::to_string(&cmd).unwrap();
        let back: ByteCommand = serde_json::from_str(&json).unwrap();
        assert_eq!(back, cmd);
    }

    #[test]
    fn test_signal_json() {
        let signal = Signal::processor(3, 2);
        let json = serde_json::to_value(signal).unwrap();
        assert_eq!(json["source"]["data_id"], 3);
        assert_eq!(json["length"], 2);
    }

    #[test]
    fn test_operation_json_name() {
        let json = serde_json::to_string(&Operation::IBeaconSetRxPower).unwrap();
        assert_eq!(json, "\"i_beacon_set_rx_power\"");
    }
}

/// Property-based tests for frame parsing.
///
/// # Running Tests
///
/// ```bash
/// cargo test -p beaconwire-types proptests
/// ```
#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Parsing random bytes should never panic.
        #[test]
        fn parse_frame_never_panics(data: Vec<u8>) {
            let _ = ByteCommand::from_bytes(&data);
        }

        /// Any frame of at least two bytes serializes back unchanged.
        #[test]
        fn parsed_frame_serializes_back(data in proptest::collection::vec(any::<u8>(), 2..=20)) {
            let cmd = ByteCommand::from_bytes(&data).unwrap();
            prop_assert_eq!(cmd.to_vec(), data);
        }
    }
}
