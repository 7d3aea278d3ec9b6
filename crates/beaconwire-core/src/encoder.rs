//! Pure encoders from configuration operations to command frames.
//!
//! Every function here is deterministic and touches no state: the same
//! arguments always produce the same [`ByteCommand`]. Addresses come from the
//! opcode table in [`beaconwire_types::protocol`]; only payload layout lives
//! in this module.
//!
//! The only failure mode is [`Error::InvalidArgument`] for values that do not
//! fit their register.

use bytes::{BufMut, BytesMut};

use beaconwire_types::protocol::{self, Operation, data_processor as dp};
use beaconwire_types::{ByteCommand, DataToken, Signal};

use crate::error::{Error, Result};

/// Build a command for a table operation.
fn command(operation: Operation, payload: BytesMut) -> ByteCommand {
    let row = protocol::lookup(operation);
    debug_assert!(
        row.schema.width().is_none_or(|w| w == payload.len()),
        "{} payload is {} bytes, schema says {:?}",
        row.name,
        payload.len(),
        row.schema
    );
    ByteCommand::new(row.module, row.register, payload.freeze())
}

fn flag(value: bool) -> BytesMut {
    let mut buf = BytesMut::with_capacity(1);
    buf.put_u8(u8::from(value));
    buf
}

fn u16_le(value: u16) -> BytesMut {
    let mut buf = BytesMut::with_capacity(2);
    buf.put_u16_le(value);
    buf
}

fn i8_byte(value: i8) -> BytesMut {
    let mut buf = BytesMut::with_capacity(1);
    buf.put_i8(value);
    buf
}

fn pair(first: u8, second: u8) -> BytesMut {
    let mut buf = BytesMut::with_capacity(2);
    buf.put_u8(first);
    buf.put_u8(second);
    buf
}

/// iBeacon advertiser settings.
pub mod ibeacon {
    use super::*;

    /// Width of the advertising UUID.
    pub const UUID_LEN: usize = 16;

    /// Start advertising: `[0x07, 0x01, 0x01]`.
    pub fn enable() -> ByteCommand {
        command(Operation::IBeaconEnable, flag(true))
    }

    /// Stop advertising: `[0x07, 0x01, 0x00]`.
    pub fn disable() -> ByteCommand {
        command(Operation::IBeaconEnable, flag(false))
    }

    /// Set the major value.
    pub fn set_major(major: u16) -> ByteCommand {
        command(Operation::IBeaconSetMajor, u16_le(major))
    }

    /// Set the minor value.
    pub fn set_minor(minor: u16) -> ByteCommand {
        command(Operation::IBeaconSetMinor, u16_le(minor))
    }

    /// Set the advertising period in milliseconds.
    pub fn set_period(period_ms: u16) -> ByteCommand {
        command(Operation::IBeaconSetPeriod, u16_le(period_ms))
    }

    /// Set the receiving power in dBm.
    pub fn set_rx_power(power: i8) -> ByteCommand {
        command(Operation::IBeaconSetRxPower, i8_byte(power))
    }

    /// Set the transmitting power in dBm.
    pub fn set_tx_power(power: i8) -> ByteCommand {
        command(Operation::IBeaconSetTxPower, i8_byte(power))
    }

    /// Set the advertising UUID.
    ///
    /// The bytes are sent exactly as given; see
    /// [`ad_uuid_bytes`](beaconwire_types::uuid::ad_uuid_bytes) for the byte
    /// order the module expects.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] unless `uuid` is 16 bytes long.
    pub fn set_uuid(uuid: &[u8]) -> Result<ByteCommand> {
        if uuid.len() != UUID_LEN {
            return Err(Error::invalid_argument(format!(
                "ad UUID must be {} bytes, got {}",
                UUID_LEN,
                uuid.len()
            )));
        }
        Ok(command(Operation::IBeaconSetUuid, BytesMut::from(uuid)))
    }
}

/// Data processor creation.
pub mod data_processor {
    use super::*;

    /// Create a counter fed by `upstream` that outputs `size` bytes.
    ///
    /// Layout: `[0x09, 0x02, up.module, up.register, up.data_id,
    /// up.source_config, 0x02, (size - 1) | (up.length - 1) << 2 | 0x10]`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if `size` is outside 1-4.
    pub fn create_counter(upstream: &Signal, size: u8) -> Result<ByteCommand> {
        if !(1..=Signal::MAX_LENGTH).contains(&size) {
            return Err(Error::invalid_argument(format!(
                "counter size {} outside 1-{}",
                size,
                Signal::MAX_LENGTH
            )));
        }
        if !(1..=Signal::MAX_LENGTH).contains(&upstream.length) {
            return Err(Error::invalid_argument(format!(
                "upstream signal length {} outside 1-{}",
                upstream.length,
                Signal::MAX_LENGTH
            )));
        }

        let config = (size - 1) | ((upstream.length - 1) << 2) | dp::COUNTER_MODE;

        let mut buf = BytesMut::with_capacity(6);
        buf.put_slice(&upstream.source.to_bytes());
        buf.put_u8(upstream.source_config());
        buf.put_u8(dp::TYPE_ACCUMULATOR);
        buf.put_u8(config);
        Ok(command(Operation::CreateCounter, buf))
    }
}

/// Event module framing used while recording.
pub mod event {
    use super::*;

    /// Rewrite `cmd` into an entry bound to `trigger`.
    ///
    /// Layout: `[0x0a, 0x02, trigger.module, trigger.register, trigger.id,
    /// cmd.module, cmd.register, len, operand...]` where `len` is the width of
    /// the captured payload and the operand is either that payload or, when
    /// fed by a signal, the 2-byte data token.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if the payload is too long for the
    /// length byte.
    pub fn entry(
        trigger: &Signal,
        cmd: &ByteCommand,
        token: Option<&DataToken>,
    ) -> Result<ByteCommand> {
        let len = u8::try_from(cmd.payload().len()).map_err(|_| {
            Error::invalid_argument(format!(
                "captured payload of {} bytes exceeds 255",
                cmd.payload().len()
            ))
        })?;

        let operand_len = token.map_or(cmd.payload().len(), |_| DataToken::LEN);
        let mut buf = BytesMut::with_capacity(6 + operand_len);
        buf.put_slice(&trigger.source.to_bytes());
        buf.put_u8(cmd.module());
        buf.put_u8(cmd.register());
        buf.put_u8(len);
        match token {
            Some(token) => buf.put_slice(&token.to_bytes()),
            None => buf.put_slice(cmd.payload()),
        }
        Ok(command(Operation::EventEntry, buf))
    }

    /// Close the recording window of `trigger`: `[0x0a, 0x03, id, 0x00]`.
    pub fn terminate(trigger: &Signal) -> ByteCommand {
        command(Operation::EventTerminate, pair(trigger.id(), 0x00))
    }
}

/// BMM150 magnetometer settings.
pub mod magnetometer {
    use super::*;
    use crate::magnetometer::OutputDataRate;

    /// Largest XY repetition count the sensor accepts.
    pub const MAX_XY_REPETITIONS: u16 = 511;
    /// Largest Z repetition count the sensor accepts.
    pub const MAX_Z_REPETITIONS: u16 = 256;

    /// Switch the sensor on (`true`) or off.
    pub fn power(on: bool) -> ByteCommand {
        command(Operation::MagnetometerPower, flag(on))
    }

    /// Enable (`[1, 0]`) or disable (`[0, 1]`) B-field data interrupts.
    pub fn data_interrupt(enable: bool) -> ByteCommand {
        let payload = if enable { pair(1, 0) } else { pair(0, 1) };
        command(Operation::MagnetometerDataInterrupt, payload)
    }

    /// Set the output data rate.
    pub fn data_rate(odr: OutputDataRate) -> ByteCommand {
        let mut buf = BytesMut::with_capacity(1);
        buf.put_u8(odr as u8);
        command(Operation::MagnetometerDataRate, buf)
    }

    /// Set the XY and Z repetitions: `[(xy - 1) / 2, z - 1]`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if `xy_reps` is outside 1-511 or
    /// `z_reps` is outside 1-256.
    pub fn data_repetitions(xy_reps: u16, z_reps: u16) -> Result<ByteCommand> {
        if !(1..=MAX_XY_REPETITIONS).contains(&xy_reps) {
            return Err(Error::invalid_argument(format!(
                "xy repetitions {} outside 1-{}",
                xy_reps, MAX_XY_REPETITIONS
            )));
        }
        if !(1..=MAX_Z_REPETITIONS).contains(&z_reps) {
            return Err(Error::invalid_argument(format!(
                "z repetitions {} outside 1-{}",
                z_reps, MAX_Z_REPETITIONS
            )));
        }
        // Both fit in a byte after the range checks above
        let xy = ((xy_reps - 1) / 2) as u8;
        let z = (z_reps - 1) as u8;
        Ok(command(Operation::MagnetometerDataRepetitions, pair(xy, z)))
    }
}

/// Sensor fusion settings.
pub mod sensor_fusion {
    use super::*;
    use crate::sensor_fusion::{AccRange, FusionMode, GyroRange};

    /// Disable mask that clears every data kind.
    pub const CLEAR_ALL_OUTPUTS: u8 = 0x7f;

    /// Run (`true`) or halt the algorithm.
    pub fn enable(run: bool) -> ByteCommand {
        command(Operation::SensorFusionEnable, flag(run))
    }

    /// Write the mode and sensor ranges.
    pub fn mode(mode: FusionMode, acc: AccRange, gyro: GyroRange) -> ByteCommand {
        let ranges = (acc as u8) | (((gyro as u8) + 1) << 4);
        command(Operation::SensorFusionMode, pair(mode as u8, ranges))
    }

    /// Enable the data kinds set in `mask`.
    pub fn output_enable(mask: u8) -> ByteCommand {
        command(Operation::SensorFusionOutputEnable, pair(mask, 0x00))
    }

    /// Disable every data kind.
    pub fn output_clear() -> ByteCommand {
        command(
            Operation::SensorFusionOutputEnable,
            pair(0x00, CLEAR_ALL_OUTPUTS),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::magnetometer::OutputDataRate;
    use crate::sensor_fusion::{AccRange, FusionMode, GyroRange};

    #[test]
    fn test_ibeacon_vectors() {
        assert_eq!(ibeacon::enable().to_vec(), vec![0x07, 0x01, 0x01]);
        assert_eq!(ibeacon::disable().to_vec(), vec![0x07, 0x01, 0x00]);
        assert_eq!(ibeacon::set_major(78).to_vec(), vec![0x07, 0x03, 0x4e, 0x00]);
        assert_eq!(
            ibeacon::set_minor(7453).to_vec(),
            vec![0x07, 0x04, 0x1d, 0x1d]
        );
        assert_eq!(
            ibeacon::set_period(15027).to_vec(),
            vec![0x07, 0x07, 0xb3, 0x3a]
        );
        assert_eq!(ibeacon::set_rx_power(-55).to_vec(), vec![0x07, 0x05, 0xc9]);
        assert_eq!(ibeacon::set_tx_power(-12).to_vec(), vec![0x07, 0x06, 0xf4]);
    }

    #[test]
    fn test_enable_is_repeatable() {
        assert_eq!(ibeacon::enable(), ibeacon::enable());
    }

    #[test]
    fn test_set_uuid_preserves_order() {
        let raw: Vec<u8> = (0u8..16).collect();
        let cmd = ibeacon::set_uuid(&raw).unwrap();
        assert_eq!(cmd.payload(), raw.as_slice());
        assert_eq!((cmd.module(), cmd.register()), (0x07, 0x02));
    }

    #[test]
    fn test_set_uuid_wrong_length() {
        let err = ibeacon::set_uuid(&[0u8; 15]).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }

    #[test]
    fn test_create_counter_from_switch() {
        let cmd = data_processor::create_counter(&Signal::switch_state(), 4).unwrap();
        assert_eq!(
            cmd.to_vec(),
            vec![0x09, 0x02, 0x01, 0x01, 0xff, 0x00, 0x02, 0x13]
        );
    }

    #[test]
    fn test_create_counter_sizes() {
        let switch = Signal::switch_state();
        let one = data_processor::create_counter(&switch, 1).unwrap();
        assert_eq!(one.payload()[5], 0x10);

        let from_counter = data_processor::create_counter(&Signal::processor(2, 4), 2).unwrap();
        assert_eq!(
            from_counter.payload(),
            &[0x09, 0x03, 0x02, 0x60, 0x02, 0x1d]
        );
    }

    #[test]
    fn test_create_counter_invalid_size() {
        let switch = Signal::switch_state();
        for size in [0, 5, 255] {
            let err = data_processor::create_counter(&switch, size).unwrap_err();
            assert!(matches!(err, Error::InvalidArgument(_)), "size {}", size);
        }
    }

    #[test]
    fn test_event_entry_literal() {
        let trigger = Signal::processor(0, 4);
        let entry = event::entry(&trigger, &ibeacon::set_major(78), None).unwrap();
        assert_eq!(
            entry.to_vec(),
            vec![0x0a, 0x02, 0x09, 0x03, 0x00, 0x07, 0x03, 0x02, 0x4e, 0x00]
        );
    }

    #[test]
    fn test_event_entry_with_token() {
        let trigger = Signal::processor(0, 4);
        let token = trigger.data_token(0).unwrap();
        let entry = event::entry(&trigger, &ibeacon::set_major(0), Some(&token)).unwrap();
        assert_eq!(
            entry.to_vec(),
            vec![0x0a, 0x02, 0x09, 0x03, 0x00, 0x07, 0x03, 0x02, 0x09, 0x00]
        );
    }

    #[test]
    fn test_event_terminate() {
        assert_eq!(
            event::terminate(&Signal::processor(5, 1)).to_vec(),
            vec![0x0a, 0x03, 0x05, 0x00]
        );
    }

    #[test]
    fn test_magnetometer_vectors() {
        assert_eq!(magnetometer::power(true).to_vec(), vec![0x15, 0x01, 0x01]);
        assert_eq!(magnetometer::power(false).to_vec(), vec![0x15, 0x01, 0x00]);
        assert_eq!(
            magnetometer::data_interrupt(true).to_vec(),
            vec![0x15, 0x02, 0x01, 0x00]
        );
        assert_eq!(
            magnetometer::data_interrupt(false).to_vec(),
            vec![0x15, 0x02, 0x00, 0x01]
        );
        assert_eq!(
            magnetometer::data_rate(OutputDataRate::Hz20).to_vec(),
            vec![0x15, 0x03, 0x05]
        );
        assert_eq!(
            magnetometer::data_repetitions(9, 15).unwrap().to_vec(),
            vec![0x15, 0x04, 0x04, 0x0e]
        );
        assert_eq!(
            magnetometer::data_repetitions(511, 256).unwrap().to_vec(),
            vec![0x15, 0x04, 0xff, 0xff]
        );
    }

    #[test]
    fn test_magnetometer_repetitions_out_of_range() {
        assert!(magnetometer::data_repetitions(0, 1).is_err());
        assert!(magnetometer::data_repetitions(512, 1).is_err());
        assert!(magnetometer::data_repetitions(1, 0).is_err());
        assert!(magnetometer::data_repetitions(1, 257).is_err());
    }

    #[test]
    fn test_sensor_fusion_vectors() {
        assert_eq!(
            sensor_fusion::mode(FusionMode::Ndof, AccRange::G16, GyroRange::Dps2000).to_vec(),
            vec![0x19, 0x02, 0x01, 0x13]
        );
        assert_eq!(
            sensor_fusion::output_enable(0b0001_0000).to_vec(),
            vec![0x19, 0x03, 0x10, 0x00]
        );
        assert_eq!(
            sensor_fusion::output_clear().to_vec(),
            vec![0x19, 0x03, 0x00, 0x7f]
        );
        assert_eq!(sensor_fusion::enable(true).to_vec(), vec![0x19, 0x01, 0x01]);
    }
}

/// Property-based tests for the encoders.
///
/// # Running Tests
///
/// ```bash
/// cargo test -p beaconwire-core encoder::proptests
/// ```
#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Decoding a u16 field reproduces the argument.
        #[test]
        fn major_round_trips(value: u16) {
            let cmd = ibeacon::set_major(value);
            let payload = cmd.payload();
            prop_assert_eq!(u16::from_le_bytes([payload[0], payload[1]]), value);
        }

        /// Decoding an i8 field reproduces the argument.
        #[test]
        fn tx_power_round_trips(value: i8) {
            let cmd = ibeacon::set_tx_power(value);
            prop_assert_eq!(cmd.payload()[0] as i8, value);
        }

        /// Encoding is a pure function of its arguments.
        #[test]
        fn encoding_is_deterministic(value: u16) {
            prop_assert_eq!(ibeacon::set_period(value), ibeacon::set_period(value));
        }

        /// Entries start with the trigger address followed by the captured address.
        #[test]
        fn entry_payload_prefix(id in 0u8..0xff, major: u16) {
            let trigger = Signal::processor(id, 4);
            let captured = ibeacon::set_major(major);
            let entry = event::entry(&trigger, &captured, None).unwrap();
            let payload = entry.payload();
            prop_assert_eq!(&payload[..3], &trigger.source.to_bytes()[..]);
            prop_assert_eq!(payload[2], id);
            prop_assert_eq!(payload[3], captured.module());
            prop_assert_eq!(payload[4], captured.register());
            prop_assert_eq!(&payload[6..], captured.payload());
        }

        /// Counter creation never panics, whatever the size.
        #[test]
        fn create_counter_never_panics(size: u8, length in 0u8..8) {
            let upstream = Signal { length, ..Signal::switch_state() };
            let _ = data_processor::create_counter(&upstream, size);
        }
    }
}
