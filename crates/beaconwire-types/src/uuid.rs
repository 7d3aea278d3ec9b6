//! Bluetooth UUIDs for the peripheral's GATT profile.
//!
//! The command channel is a single write characteristic; replies (including
//! assigned processor ids) arrive on the notify characteristic.

use uuid::{Uuid, uuid};

// --- Vendor Service UUIDs ---

/// Vendor service exposing the command channel.
pub const COMMAND_SERVICE: Uuid = uuid!("326a9000-85cb-9195-d9dd-464cfbbae75a");

/// Command characteristic (write without response).
pub const COMMAND: Uuid = uuid!("326a9001-85cb-9195-d9dd-464cfbbae75a");

/// Reply characteristic (notify).
pub const NOTIFY: Uuid = uuid!("326a9006-85cb-9195-d9dd-464cfbbae75a");

// --- Standard BLE Service UUIDs ---

/// Device Information service.
pub const DEVICE_INFO_SERVICE: Uuid = uuid!("0000180a-0000-1000-8000-00805f9b34fb");

/// Battery service.
pub const BATTERY_SERVICE: Uuid = uuid!("0000180f-0000-1000-8000-00805f9b34fb");

/// Battery level characteristic.
pub const BATTERY_LEVEL: Uuid = uuid!("00002a19-0000-1000-8000-00805f9b34fb");

/// Byte order the iBeacon module expects for its advertising UUID.
///
/// The module stores the UUID least significant byte first, the reverse of
/// [`Uuid::as_bytes`]. The encoder never reorders bytes itself, so callers
/// holding a [`Uuid`] use this to produce the wire order.
#[must_use]
pub fn ad_uuid_bytes(uuid: &Uuid) -> [u8; 16] {
    let mut bytes = *uuid.as_bytes();
    bytes.reverse();
    bytes
}
