//! The module-addressed command frame.

use core::fmt;

use bytes::{BufMut, Bytes, BytesMut};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{ParseError, ParseResult};

/// A single command frame addressed to a firmware module register.
///
/// On the wire a command is serialized as `[module, register, payload...]`.
/// Commands are immutable once built; cloning is cheap because the payload
/// is reference counted.
///
/// # Examples
///
/// ```
/// use beaconwire_types::ByteCommand;
///
/// let cmd = ByteCommand::new(0x07, 0x03, vec![0x4e, 0x00]);
/// assert_eq!(cmd.to_vec(), vec![0x07, 0x03, 0x4e, 0x00]);
/// ```
#[derive(Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ByteCommand {
    module: u8,
    register: u8,
    payload: Bytes,
}

impl ByteCommand {
    /// Minimum length of a serialized frame (module and register bytes).
    pub const HEADER_LEN: usize = 2;

    /// Create a command from its address and payload.
    pub fn new(module: u8, register: u8, payload: impl Into<Bytes>) -> Self {
        Self {
            module,
            register,
            payload: payload.into(),
        }
    }

    /// Parse a frame received from the wire.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::InsufficientBytes`] if the frame is shorter than
    /// the two address bytes.
    pub fn from_bytes(data: &[u8]) -> ParseResult<Self> {
        if data.len() < Self::HEADER_LEN {
            return Err(ParseError::InsufficientBytes {
                expected: Self::HEADER_LEN,
                actual: data.len(),
            });
        }
        Ok(Self::new(
            data[0],
            data[1],
            Bytes::copy_from_slice(&data[Self::HEADER_LEN..]),
        ))
    }

    /// Target firmware module.
    #[must_use]
    pub fn module(&self) -> u8 {
        self.module
    }

    /// Register within the module.
    #[must_use]
    pub fn register(&self) -> u8 {
        self.register
    }

    /// Operand bytes.
    #[must_use]
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Length of the serialized frame.
    #[must_use]
    pub fn len(&self) -> usize {
        Self::HEADER_LEN + self.payload.len()
    }

    /// Always false: a frame carries at least its address.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Serialize into a shared buffer.
    #[must_use]
    pub fn to_bytes(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(self.len());
        buf.put_u8(self.module);
        buf.put_u8(self.register);
        buf.put_slice(&self.payload);
        buf.freeze()
    }

    /// Serialize into an owned vector.
    #[must_use]
    pub fn to_vec(&self) -> Vec<u8> {
        self.to_bytes().to_vec()
    }

    /// Format the frame as space separated hex, e.g. `07 03 4e 00`.
    #[must_use]
    pub fn to_hex(&self) -> String {
        self.to_bytes()
            .iter()
            .map(|b| format!("{:02x}", b))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl fmt::Debug for ByteCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ByteCommand[{}]", self.to_hex())
    }
}

impl fmt::Display for ByteCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl From<ByteCommand> for Vec<u8> {
    fn from(cmd: ByteCommand) -> Self {
        cmd.to_vec()
    }
}
