//! Peripheral-side data signals.

use core::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{ParseError, ParseResult};
use crate::protocol::{NO_DATA_ID, data_processor, magnetometer, module, switch};

/// Address of a data source on the peripheral.
///
/// The `data_id` is assigned by the peripheral when a data processor is
/// created. Fixed module sources (the switch, sensors) report
/// [`NO_DATA_ID`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SignalSource {
    /// Module producing the data.
    pub module: u8,
    /// Register the data is reported on.
    pub register: u8,
    /// Processor id, or [`NO_DATA_ID`].
    pub data_id: u8,
}

impl SignalSource {
    /// Serialize as `[module, register, data_id]`.
    #[must_use]
    pub fn to_bytes(&self) -> [u8; 3] {
        [self.module, self.register, self.data_id]
    }
}

/// Axis of a three-axis sensor reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[repr(u8)]
pub enum Axis {
    X = 0,
    Y = 1,
    Z = 2,
}

/// A data source the peripheral can react to.
///
/// # Examples
///
/// ```
/// use beaconwire_types::Signal;
///
/// let switch = Signal::switch_state();
/// assert_eq!(switch.source.to_bytes(), [0x01, 0x01, 0xff]);
/// assert_eq!(switch.length, 1);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Signal {
    /// Where the data comes from.
    pub source: SignalSource,
    /// Width in bytes of the emitted value (1-4).
    pub length: u8,
    /// Byte offset of the value inside the data frame.
    pub offset: u8,
}

impl Signal {
    /// Largest value width a signal can carry.
    pub const MAX_LENGTH: u8 = 4;

    /// The switch module's button state.
    #[must_use]
    pub const fn switch_state() -> Self {
        Self {
            source: SignalSource {
                module: module::SWITCH,
                register: switch::STATE,
                data_id: NO_DATA_ID,
            },
            length: 1,
            offset: 0,
        }
    }

    /// One axis of the magnetometer's B-field reading.
    ///
    /// The data frame carries x, y and z as consecutive 2-byte values.
    #[must_use]
    pub const fn b_field(axis: Axis) -> Self {
        Self {
            source: SignalSource {
                module: module::MAGNETOMETER,
                register: magnetometer::MAG_DATA,
                data_id: NO_DATA_ID,
            },
            length: 2,
            offset: (axis as u8) * 2,
        }
    }

    /// Output of the data processor the peripheral assigned `id` to.
    #[must_use]
    pub const fn processor(id: u8, length: u8) -> Self {
        Self {
            source: SignalSource {
                module: module::DATA_PROCESSOR,
                register: data_processor::NOTIFY,
                data_id: id,
            },
            length,
            offset: 0,
        }
    }

    /// The peripheral-assigned id.
    #[must_use]
    pub fn id(&self) -> u8 {
        self.source.data_id
    }

    /// Whether the signal carries a processor id.
    #[must_use]
    pub fn has_id(&self) -> bool {
        self.source.data_id != NO_DATA_ID
    }

    /// Upstream descriptor byte used when feeding a processor:
    /// `((length - 1) << 5) | offset`.
    #[must_use]
    pub fn source_config(&self) -> u8 {
        (self.length.saturating_sub(1) << 5) | (self.offset & 0x1f)
    }

    /// Token that feeds this signal's value into a command operand.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::InvalidValue`] if the length or offset do not fit
    /// the token's bit fields.
    pub fn data_token(&self, dest_offset: u8) -> ParseResult<DataToken> {
        DataToken::new(self.length, self.offset, dest_offset)
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02x}:{:02x}:{:02x} ({} bytes)",
            self.source.module, self.source.register, self.source.data_id, self.length
        )
    }
}

/// Instructs the peripheral to take a command operand from signal data.
///
/// Encoded as `[0x01 | (length << 1) | (offset << 4), dest_offset]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DataToken {
    length: u8,
    offset: u8,
    dest_offset: u8,
}

impl DataToken {
    /// Encoded size of a token.
    pub const LEN: usize = 2;

    /// Build a token copying `length` bytes at `offset` into the operand at
    /// `dest_offset`.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::InvalidValue`] when `length` is outside 1-4 or
    /// `offset` does not fit in four bits.
    pub fn new(length: u8, offset: u8, dest_offset: u8) -> ParseResult<Self> {
        if !(1..=Signal::MAX_LENGTH).contains(&length) {
            return Err(ParseError::InvalidValue(format!(
                "data token length {} outside 1-{}",
                length,
                Signal::MAX_LENGTH
            )));
        }
        if offset > 0x0f {
            return Err(ParseError::InvalidValue(format!(
                "data token offset {} exceeds 15",
                offset
            )));
        }
        Ok(Self {
            length,
            offset,
            dest_offset,
        })
    }

    /// Number of bytes copied from the signal.
    #[must_use]
    pub fn length(&self) -> u8 {
        self.length
    }

    /// Encode as two bytes.
    #[must_use]
    pub fn to_bytes(&self) -> [u8; 2] {
        [
            0x01 | (self.length << 1) | (self.offset << 4),
            self.dest_offset,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_switch_state_signal() {
        let switch = Signal::switch_state();
        assert!(!switch.has_id());
        assert_eq!(switch.source_config(), 0x00);
    }

    #[test]
    fn test_processor_signal() {
        let counter = Signal::processor(0, 4);
        assert!(counter.has_id());
        assert_eq!(counter.id(), 0);
        assert_eq!(counter.source.to_bytes(), [0x09, 0x03, 0x00]);
        assert_eq!(counter.source_config(), 0x60);
    }

    #[test]
    fn test_b_field_axis_signals() {
        let x = Signal::b_field(Axis::X);
        assert!(!x.has_id());
        assert_eq!(x.source.to_bytes(), [0x15, 0x05, 0xff]);
        assert_eq!(x.source_config(), 0x20);
        assert_eq!(Signal::b_field(Axis::Y).source_config(), 0x22);
        assert_eq!(Signal::b_field(Axis::Z).offset, 4);
        assert_eq!(
            Signal::b_field(Axis::Z).data_token(0).unwrap().to_bytes(),
            [0x45, 0x00]
        );
    }

    #[test]
    fn test_data_token_encoding() {
        let token = Signal::processor(0, 4).data_token(0).unwrap();
        assert_eq!(token.to_bytes(), [0x09, 0x00]);

        let token = DataToken::new(2, 1, 3).unwrap();
        assert_eq!(token.to_bytes(), [0x15, 0x03]);
    }

    #[test]
    fn test_data_token_rejects_bad_fields() {
        assert!(DataToken::new(0, 0, 0).is_err());
        assert!(DataToken::new(5, 0, 0).is_err());
        assert!(DataToken::new(1, 16, 0).is_err());
    }

    #[test]
    fn test_signal_display() {
        assert_eq!(
            Signal::processor(7, 2).to_string(),
            "09:03:07 (2 bytes)"
        );
    }
}
