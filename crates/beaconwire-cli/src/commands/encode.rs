//! Encode command implementation.

use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, Result, anyhow, bail};
use beaconwire_core::encoder;
use beaconwire_core::{
    AccRange, ByteCommand, FusionData, FusionMode, GyroRange, Operation, OutputDataRate, Signal,
};
use uuid::Uuid;

use crate::cli::OutputFormat;
use crate::format::{FormatOptions, FrameView, format_frame_text, format_frames_csv};
use crate::util::write_output;

pub fn cmd_encode(
    operation: &str,
    args: &[String],
    format: OutputFormat,
    output: Option<&PathBuf>,
    opts: &FormatOptions,
) -> Result<()> {
    let op = Operation::from_name(operation).ok_or_else(|| {
        anyhow!(
            "Unknown operation '{}'. Run 'beaconwire opcodes' to list them",
            operation
        )
    })?;
    let cmd = encode_operation(op, args)?;
    tracing::debug!("Encoded {} as {}", operation, cmd.to_hex());

    let content = match format {
        OutputFormat::Json => opts.as_json(&FrameView::from(&cmd))?,
        OutputFormat::Text => format_frame_text(&cmd, opts),
        OutputFormat::Csv => format_frames_csv(std::slice::from_ref(&cmd)),
    };
    write_output(output, &content)
}

/// Build the frame for `op` from its command-line arguments.
pub fn encode_operation(op: Operation, args: &[String]) -> Result<ByteCommand> {
    let name = op.name();
    let cmd = match op {
        Operation::IBeaconEnable => {
            let on = optional_flag(name, args)?;
            if on {
                encoder::ibeacon::enable()
            } else {
                encoder::ibeacon::disable()
            }
        }
        Operation::IBeaconSetUuid => {
            let [value] = exact::<1>(name, args, "<uuid>")?;
            let uuid = Uuid::parse_str(value)
                .with_context(|| format!("Invalid UUID '{}'", value))?;
            encoder::ibeacon::set_uuid(&beaconwire_core::uuids::ad_uuid_bytes(&uuid))?
        }
        Operation::IBeaconSetMajor => {
            let [value] = exact::<1>(name, args, "<major>")?;
            encoder::ibeacon::set_major(number(value, "major")?)
        }
        Operation::IBeaconSetMinor => {
            let [value] = exact::<1>(name, args, "<minor>")?;
            encoder::ibeacon::set_minor(number(value, "minor")?)
        }
        Operation::IBeaconSetRxPower => {
            let [value] = exact::<1>(name, args, "<dbm>")?;
            encoder::ibeacon::set_rx_power(number(value, "rx power")?)
        }
        Operation::IBeaconSetTxPower => {
            let [value] = exact::<1>(name, args, "<dbm>")?;
            encoder::ibeacon::set_tx_power(number(value, "tx power")?)
        }
        Operation::IBeaconSetPeriod => {
            let [value] = exact::<1>(name, args, "<ms>")?;
            encoder::ibeacon::set_period(number(value, "period")?)
        }
        Operation::CreateCounter => {
            let (size, upstream) = match args {
                [size] => (size, Signal::switch_state()),
                [size, id, length] => (
                    size,
                    Signal::processor(number(id, "processor id")?, number(length, "length")?),
                ),
                _ => bail!("Usage: {} <size> [<processor-id> <length>]", name),
            };
            encoder::data_processor::create_counter(&upstream, number(size, "counter size")?)?
        }
        Operation::EventEntry => {
            bail!("Event entries are produced while recording; use 'beaconwire record'")
        }
        Operation::EventTerminate => {
            let [value] = exact::<1>(name, args, "<processor-id>")?;
            encoder::event::terminate(&Signal::processor(number(value, "processor id")?, 1))
        }
        Operation::MagnetometerPower => encoder::magnetometer::power(optional_flag(name, args)?),
        Operation::MagnetometerDataInterrupt => {
            encoder::magnetometer::data_interrupt(optional_flag(name, args)?)
        }
        Operation::MagnetometerDataRate => {
            let [value] = exact::<1>(name, args, "<hz>")?;
            let hz: u8 = number(value, "data rate")?;
            let odr = OutputDataRate::from_hz(hz).ok_or_else(|| {
                anyhow!(
                    "Unsupported data rate {} Hz. Expected 2, 6, 8, 10, 15, 20, 25 or 30",
                    hz
                )
            })?;
            encoder::magnetometer::data_rate(odr)
        }
        Operation::MagnetometerDataRepetitions => {
            let [xy, z] = exact::<2>(name, args, "<xy-reps> <z-reps>")?;
            encoder::magnetometer::data_repetitions(
                number(xy, "xy repetitions")?,
                number(z, "z repetitions")?,
            )?
        }
        Operation::SensorFusionEnable => encoder::sensor_fusion::enable(optional_flag(name, args)?),
        Operation::SensorFusionMode => {
            let (mode, acc, gyro) = match args {
                [mode] => (mode, AccRange::default(), GyroRange::default()),
                [mode, acc, gyro] => (mode, acc_range(acc)?, gyro_range(gyro)?),
                _ => bail!("Usage: {} <mode> [<acc-g> <gyro-dps>]", name),
            };
            encoder::sensor_fusion::mode(fusion_mode(mode)?, acc, gyro)
        }
        Operation::SensorFusionOutputEnable => match args {
            [] => bail!("Usage: {} <kind>... | clear", name),
            [only] if only == "clear" => encoder::sensor_fusion::output_clear(),
            kinds => {
                let mut mask = 0u8;
                for kind in kinds {
                    mask |= fusion_data(kind)?.mask();
                }
                encoder::sensor_fusion::output_enable(mask)
            }
        },
        _ => bail!("Operation '{}' is not supported by this version", name),
    };
    Ok(cmd)
}

fn exact<'a, const N: usize>(name: &str, args: &'a [String], usage: &str) -> Result<[&'a str; N]> {
    if args.len() != N {
        bail!("Usage: {} {}", name, usage);
    }
    Ok(std::array::from_fn(|i| args[i].as_str()))
}

fn number<T: FromStr>(value: &str, what: &str) -> Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    value
        .parse()
        .with_context(|| format!("Invalid {} '{}'", what, value))
}

/// Parse an optional on/off argument, defaulting to on.
fn optional_flag(name: &str, args: &[String]) -> Result<bool> {
    match args {
        [] => Ok(true),
        [value] => match value.to_lowercase().as_str() {
            "on" | "true" | "1" | "enable" => Ok(true),
            "off" | "false" | "0" | "disable" => Ok(false),
            _ => bail!("Invalid switch '{}'. Expected on or off", value),
        },
        _ => bail!("Usage: {} [on|off]", name),
    }
}

fn fusion_mode(value: &str) -> Result<FusionMode> {
    match value.to_lowercase().as_str() {
        "sleep" => Ok(FusionMode::Sleep),
        "ndof" => Ok(FusionMode::Ndof),
        "imu-plus" | "imuplus" => Ok(FusionMode::ImuPlus),
        "compass" => Ok(FusionMode::Compass),
        "m4g" => Ok(FusionMode::M4g),
        _ => bail!(
            "Invalid fusion mode '{}'. Expected sleep, ndof, imu-plus, compass or m4g",
            value
        ),
    }
}

fn acc_range(value: &str) -> Result<AccRange> {
    match value.trim_end_matches(['g', 'G']) {
        "2" => Ok(AccRange::G2),
        "4" => Ok(AccRange::G4),
        "8" => Ok(AccRange::G8),
        "16" => Ok(AccRange::G16),
        _ => bail!("Invalid accelerometer range '{}'. Expected 2, 4, 8 or 16", value),
    }
}

fn gyro_range(value: &str) -> Result<GyroRange> {
    match value {
        "2000" => Ok(GyroRange::Dps2000),
        "1000" => Ok(GyroRange::Dps1000),
        "500" => Ok(GyroRange::Dps500),
        "250" => Ok(GyroRange::Dps250),
        _ => bail!(
            "Invalid gyroscope range '{}'. Expected 2000, 1000, 500 or 250",
            value
        ),
    }
}

fn fusion_data(value: &str) -> Result<FusionData> {
    match value.to_lowercase().as_str() {
        "corrected-acc" => Ok(FusionData::CorrectedAcc),
        "corrected-gyro" => Ok(FusionData::CorrectedGyro),
        "corrected-mag" => Ok(FusionData::CorrectedMag),
        "quaternion" => Ok(FusionData::Quaternion),
        "euler-angle" => Ok(FusionData::EulerAngle),
        "gravity-vector" => Ok(FusionData::GravityVector),
        "linear-acc" => Ok(FusionData::LinearAcc),
        _ => bail!("Invalid fusion output '{}'", value),
    }
}
