//! Fixed protocol constants for the peripheral's command channel.
//!
//! Every command the engine emits is addressed by a `(module, register)`
//! pair. The [`OPCODES`] table lists each named operation with its address
//! and payload schema; encoders consult it instead of scattering magic
//! numbers.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Firmware module identifiers.
pub mod module {
    /// Push-button switch.
    pub const SWITCH: u8 = 0x01;
    /// iBeacon advertiser.
    pub const IBEACON: u8 = 0x07;
    /// On-board data processors (counters, accumulators, ...).
    pub const DATA_PROCESSOR: u8 = 0x09;
    /// Event module: binds commands to signals.
    pub const EVENT: u8 = 0x0a;
    /// BMM150 magnetometer.
    pub const MAGNETOMETER: u8 = 0x15;
    /// Sensor fusion algorithm.
    pub const SENSOR_FUSION: u8 = 0x19;
}

/// Switch module registers.
pub mod switch {
    /// Button state; a 1-byte data source.
    pub const STATE: u8 = 0x01;
}

/// iBeacon module registers.
pub mod ibeacon {
    /// Enable (`0x01`) or disable (`0x00`) advertising.
    pub const ENABLE: u8 = 0x01;
    /// 16-byte advertising UUID.
    pub const AD_UUID: u8 = 0x02;
    /// Major value, u16 little-endian.
    pub const MAJOR: u8 = 0x03;
    /// Minor value, u16 little-endian.
    pub const MINOR: u8 = 0x04;
    /// Receiving power, i8.
    pub const RX_POWER: u8 = 0x05;
    /// Transmitting power, i8.
    pub const TX_POWER: u8 = 0x06;
    /// Advertising period in milliseconds, u16 little-endian.
    pub const AD_PERIOD: u8 = 0x07;
}

/// Data processor module registers.
pub mod data_processor {
    /// Create a processor. The peripheral replies with the assigned id.
    pub const ADD: u8 = 0x02;
    /// Processor output; the data source of processor signals.
    pub const NOTIFY: u8 = 0x03;
    /// Processor type code of the accumulator family (counters included).
    pub const TYPE_ACCUMULATOR: u8 = 0x02;
    /// Accumulator config bit selecting counter mode.
    pub const COUNTER_MODE: u8 = 0x10;
}

/// Event module registers.
pub mod event {
    /// Store a command to run when a signal fires.
    pub const ENTRY: u8 = 0x02;
    /// Close the recording window of a trigger.
    pub const TERMINATE: u8 = 0x03;
}

/// Magnetometer module registers.
pub mod magnetometer {
    /// Power mode: `0x01` start, `0x00` stop.
    pub const POWER_MODE: u8 = 0x01;
    /// B-field data interrupt: `[enable, disable]` bit masks.
    pub const DATA_INTERRUPT_ENABLE: u8 = 0x02;
    /// Output data rate code.
    pub const DATA_RATE: u8 = 0x03;
    /// XY and Z repetitions.
    pub const DATA_REPETITIONS: u8 = 0x04;
    /// B-field data; the data source of magnetometer signals.
    pub const MAG_DATA: u8 = 0x05;
}

/// Sensor fusion module registers.
pub mod sensor_fusion {
    /// Run (`0x01`) or halt (`0x00`) the algorithm.
    pub const ENABLE: u8 = 0x01;
    /// `[mode, acc_range | (gyro_range + 1) << 4]`.
    pub const MODE: u8 = 0x02;
    /// `[enable mask, disable mask]` of produced data kinds.
    pub const OUTPUT_ENABLE: u8 = 0x03;
}

/// Data id reported by signals that carry no processor id.
pub const NO_DATA_ID: u8 = 0xff;

/// Payload layout of a register.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum PayloadSchema {
    /// One byte, `0x01` or `0x00`.
    Bool,
    /// One unsigned byte.
    U8,
    /// Two unsigned bytes.
    Pair,
    /// Unsigned 16-bit, little-endian.
    U16Le,
    /// Signed 8-bit, two's complement.
    I8,
    /// Fixed-width raw byte array, order preserved.
    Bytes(usize),
    /// Layout computed from runtime values.
    Dynamic,
}

impl PayloadSchema {
    /// Payload width in bytes, or `None` for dynamic layouts.
    #[must_use]
    pub const fn width(&self) -> Option<usize> {
        match self {
            PayloadSchema::Bool | PayloadSchema::U8 | PayloadSchema::I8 => Some(1),
            PayloadSchema::Pair | PayloadSchema::U16Le => Some(2),
            PayloadSchema::Bytes(n) => Some(*n),
            PayloadSchema::Dynamic => None,
        }
    }
}

/// Named operations of the caller-facing surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[non_exhaustive]
pub enum Operation {
    IBeaconEnable,
    IBeaconSetUuid,
    IBeaconSetMajor,
    IBeaconSetMinor,
    IBeaconSetRxPower,
    IBeaconSetTxPower,
    IBeaconSetPeriod,
    CreateCounter,
    EventEntry,
    EventTerminate,
    MagnetometerPower,
    MagnetometerDataInterrupt,
    MagnetometerDataRate,
    MagnetometerDataRepetitions,
    SensorFusionEnable,
    SensorFusionMode,
    SensorFusionOutputEnable,
}

impl Operation {
    /// Every operation, in table order.
    pub const ALL: [Operation; 17] = [
        Operation::IBeaconEnable,
        Operation::IBeaconSetUuid,
        Operation::IBeaconSetMajor,
        Operation::IBeaconSetMinor,
        Operation::IBeaconSetRxPower,
        Operation::IBeaconSetTxPower,
        Operation::IBeaconSetPeriod,
        Operation::CreateCounter,
        Operation::EventEntry,
        Operation::EventTerminate,
        Operation::MagnetometerPower,
        Operation::MagnetometerDataInterrupt,
        Operation::MagnetometerDataRate,
        Operation::MagnetometerDataRepetitions,
        Operation::SensorFusionEnable,
        Operation::SensorFusionMode,
        Operation::SensorFusionOutputEnable,
    ];

    /// Short kebab-case name, as used by the CLI.
    #[must_use]
    pub fn name(&self) -> &'static str {
        lookup(*self).name
    }

    /// Find an operation by its kebab-case name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        OPCODES.iter().find(|op| op.name == name).map(|op| op.operation)
    }
}

/// One row of the opcode table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Opcode {
    /// The operation this row describes.
    pub operation: Operation,
    /// Kebab-case name.
    pub name: &'static str,
    /// Target module.
    pub module: u8,
    /// Target register.
    pub register: u8,
    /// Payload layout.
    pub schema: PayloadSchema,
}

/// The protocol's opcode table.
pub static OPCODES: &[Opcode] = &[
    Opcode {
        operation: Operation::IBeaconEnable,
        name: "ibeacon-enable",
        module: module::IBEACON,
        register: ibeacon::ENABLE,
        schema: PayloadSchema::Bool,
    },
    Opcode {
        operation: Operation::IBeaconSetUuid,
        name: "set-uuid",
        module: module::IBEACON,
        register: ibeacon::AD_UUID,
        schema: PayloadSchema::Bytes(16),
    },
    Opcode {
        operation: Operation::IBeaconSetMajor,
        name: "set-major",
        module: module::IBEACON,
        register: ibeacon::MAJOR,
        schema: PayloadSchema::U16Le,
    },
    Opcode {
        operation: Operation::IBeaconSetMinor,
        name: "set-minor",
        module: module::IBEACON,
        register: ibeacon::MINOR,
        schema: PayloadSchema::U16Le,
    },
    Opcode {
        operation: Operation::IBeaconSetRxPower,
        name: "set-rx-power",
        module: module::IBEACON,
        register: ibeacon::RX_POWER,
        schema: PayloadSchema::I8,
    },
    Opcode {
        operation: Operation::IBeaconSetTxPower,
        name: "set-tx-power",
        module: module::IBEACON,
        register: ibeacon::TX_POWER,
        schema: PayloadSchema::I8,
    },
    Opcode {
        operation: Operation::IBeaconSetPeriod,
        name: "set-period",
        module: module::IBEACON,
        register: ibeacon::AD_PERIOD,
        schema: PayloadSchema::U16Le,
    },
    Opcode {
        operation: Operation::CreateCounter,
        name: "create-counter",
        module: module::DATA_PROCESSOR,
        register: data_processor::ADD,
        schema: PayloadSchema::Dynamic,
    },
    Opcode {
        operation: Operation::EventEntry,
        name: "event-entry",
        module: module::EVENT,
        register: event::ENTRY,
        schema: PayloadSchema::Dynamic,
    },
    Opcode {
        operation: Operation::EventTerminate,
        name: "event-terminate",
        module: module::EVENT,
        register: event::TERMINATE,
        schema: PayloadSchema::Pair,
    },
    Opcode {
        operation: Operation::MagnetometerPower,
        name: "mag-power",
        module: module::MAGNETOMETER,
        register: magnetometer::POWER_MODE,
        schema: PayloadSchema::Bool,
    },
    Opcode {
        operation: Operation::MagnetometerDataInterrupt,
        name: "mag-data-interrupt",
        module: module::MAGNETOMETER,
        register: magnetometer::DATA_INTERRUPT_ENABLE,
        schema: PayloadSchema::Pair,
    },
    Opcode {
        operation: Operation::MagnetometerDataRate,
        name: "mag-data-rate",
        module: module::MAGNETOMETER,
        register: magnetometer::DATA_RATE,
        schema: PayloadSchema::U8,
    },
    Opcode {
        operation: Operation::MagnetometerDataRepetitions,
        name: "mag-data-repetitions",
        module: module::MAGNETOMETER,
        register: magnetometer::DATA_REPETITIONS,
        schema: PayloadSchema::Pair,
    },
    Opcode {
        operation: Operation::SensorFusionEnable,
        name: "fusion-enable",
        module: module::SENSOR_FUSION,
        register: sensor_fusion::ENABLE,
        schema: PayloadSchema::Bool,
    },
    Opcode {
        operation: Operation::SensorFusionMode,
        name: "fusion-mode",
        module: module::SENSOR_FUSION,
        register: sensor_fusion::MODE,
        schema: PayloadSchema::Pair,
    },
    Opcode {
        operation: Operation::SensorFusionOutputEnable,
        name: "fusion-output-enable",
        module: module::SENSOR_FUSION,
        register: sensor_fusion::OUTPUT_ENABLE,
        schema: PayloadSchema::Pair,
    },
];

/// Look up the table row of an operation.
///
/// Every [`Operation`] variant has exactly one row, so this never fails.
#[must_use]
pub fn lookup(operation: Operation) -> &'static Opcode {
    // Rows are stored in `Operation::ALL` order.
    let index = match operation {
        Operation::IBeaconEnable => 0,
        Operation::IBeaconSetUuid => 1,
        Operation::IBeaconSetMajor => 2,
        Operation::IBeaconSetMinor => 3,
        Operation::IBeaconSetRxPower => 4,
        Operation::IBeaconSetTxPower => 5,
        Operation::IBeaconSetPeriod => 6,
        Operation::CreateCounter => 7,
        Operation::EventEntry => 8,
        Operation::EventTerminate => 9,
        Operation::MagnetometerPower => 10,
        Operation::MagnetometerDataInterrupt => 11,
        Operation::MagnetometerDataRate => 12,
        Operation::MagnetometerDataRepetitions => 13,
        Operation::SensorFusionEnable => 14,
        Operation::SensorFusionMode => 15,
        Operation::SensorFusionOutputEnable => 16,
    };
    &OPCODES[index]
}

/// Find the row addressed by `(module, register)`, if any.
#[must_use]
pub fn find(module: u8, register: u8) -> Option<&'static Opcode> {
    OPCODES
        .iter()
        .find(|op| op.module == module && op.register == register)
}
