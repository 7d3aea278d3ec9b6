//! BMM150 magnetometer control.
//!
//! This module provides the sensor's configuration enums and the
//! [`Magnetometer`] accessor. Like every other module operation, these
//! commands are recorded while a recording is active.

use serde::{Deserialize, Serialize};
use tracing::info;

use beaconwire_types::{Axis, Signal};

use crate::board::Board;
use crate::encoder;
use crate::error::Result;

/// Output data rate options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum OutputDataRate {
    /// 10 Hz.
    Hz10 = 0,
    /// 2 Hz.
    Hz2 = 1,
    /// 6 Hz.
    Hz6 = 2,
    /// 8 Hz.
    Hz8 = 3,
    /// 15 Hz.
    Hz15 = 4,
    /// 20 Hz.
    Hz20 = 5,
    /// 25 Hz.
    Hz25 = 6,
    /// 30 Hz.
    Hz30 = 7,
}

impl OutputDataRate {
    /// Rate in hertz.
    pub fn as_hz(&self) -> u8 {
        match self {
            OutputDataRate::Hz10 => 10,
            OutputDataRate::Hz2 => 2,
            OutputDataRate::Hz6 => 6,
            OutputDataRate::Hz8 => 8,
            OutputDataRate::Hz15 => 15,
            OutputDataRate::Hz20 => 20,
            OutputDataRate::Hz25 => 25,
            OutputDataRate::Hz30 => 30,
        }
    }

    /// Try to create from a rate in hertz.
    pub fn from_hz(hz: u8) -> Option<Self> {
        match hz {
            10 => Some(OutputDataRate::Hz10),
            2 => Some(OutputDataRate::Hz2),
            6 => Some(OutputDataRate::Hz6),
            8 => Some(OutputDataRate::Hz8),
            15 => Some(OutputDataRate::Hz15),
            20 => Some(OutputDataRate::Hz20),
            25 => Some(OutputDataRate::Hz25),
            30 => Some(OutputDataRate::Hz30),
            _ => None,
        }
    }
}

/// Recommended sensor configurations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Preset {
    /// 3 XY / 3 Z repetitions at 10 Hz.
    LowPower,
    /// 9 XY / 15 Z repetitions at 10 Hz.
    Regular,
    /// 15 XY / 27 Z repetitions at 10 Hz.
    EnhancedRegular,
    /// 47 XY / 83 Z repetitions at 20 Hz.
    HighAccuracy,
}

impl Preset {
    /// `(xy_reps, z_reps, odr)` for this preset.
    pub fn settings(&self) -> (u16, u16, OutputDataRate) {
        match self {
            Preset::LowPower => (3, 3, OutputDataRate::Hz10),
            Preset::Regular => (9, 15, OutputDataRate::Hz10),
            Preset::EnhancedRegular => (15, 27, OutputDataRate::Hz10),
            Preset::HighAccuracy => (47, 83, OutputDataRate::Hz20),
        }
    }
}

/// Magnetometer module of one board.
#[derive(Debug, Clone, Copy)]
pub struct Magnetometer<'a> {
    board: &'a Board,
}

impl Board {
    /// Access the BMM150 magnetometer.
    pub fn magnetometer(&self) -> Magnetometer<'_> {
        Magnetometer { board: self }
    }
}

impl Magnetometer<'_> {
    /// B-field value on `axis`, usable as a processor upstream or trigger.
    pub fn b_field_signal(&self, axis: Axis) -> Signal {
        Signal::b_field(axis)
    }

    /// Set repetitions and data rate.
    ///
    /// Sends the repetitions command followed by the data rate command, with
    /// no other frame in between.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`](crate::Error::InvalidArgument) for
    /// repetitions the sensor cannot represent; nothing is sent.
    pub async fn configure(&self, xy_reps: u16, z_reps: u16, odr: OutputDataRate) -> Result<()> {
        let repetitions = encoder::magnetometer::data_repetitions(xy_reps, z_reps)?;
        info!(
            board = %self.board.name(),
            "Configuring magnetometer: {} xy, {} z, {} Hz",
            xy_reps,
            z_reps,
            odr.as_hz()
        );
        self.board
            .dispatcher()
            .dispatch_all(vec![repetitions, encoder::magnetometer::data_rate(odr)])
            .await?;
        Ok(())
    }

    /// Apply a recommended configuration.
    pub async fn set_preset(&self, preset: Preset) -> Result<()> {
        let (xy, z, odr) = preset.settings();
        self.configure(xy, z, odr).await
    }

    /// Enable B-field data interrupts.
    pub async fn enable_b_field_sampling(&self) -> Result<()> {
        self.board
            .dispatcher()
            .dispatch(encoder::magnetometer::data_interrupt(true))
            .await?;
        Ok(())
    }

    /// Disable B-field data interrupts.
    pub async fn disable_b_field_sampling(&self) -> Result<()> {
        self.board
            .dispatcher()
            .dispatch(encoder::magnetometer::data_interrupt(false))
            .await?;
        Ok(())
    }

    /// Switch the sensor to active mode.
    pub async fn start(&self) -> Result<()> {
        self.board
            .dispatcher()
            .dispatch(encoder::magnetometer::power(true))
            .await?;
        Ok(())
    }

    /// Put the sensor to sleep.
    pub async fn stop(&self) -> Result<()> {
        self.board
            .dispatcher()
            .dispatch(encoder::magnetometer::power(false))
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::mock::MockTransport;

    #[test]
    fn test_odr_round_trip_hz() {
        for odr in [
            OutputDataRate::Hz10,
            OutputDataRate::Hz2,
            OutputDataRate::Hz6,
            OutputDataRate::Hz8,
            OutputDataRate::Hz15,
            OutputDataRate::Hz20,
            OutputDataRate::Hz25,
            OutputDataRate::Hz30,
        ] {
            assert_eq!(OutputDataRate::from_hz(odr.as_hz()), Some(odr));
        }
        assert_eq!(OutputDataRate::from_hz(12), None);
    }

    #[test]
    fn test_preset_settings() {
        assert_eq!(Preset::Regular.settings(), (9, 15, OutputDataRate::Hz10));
        assert_eq!(
            Preset::HighAccuracy.settings(),
            (47, 83, OutputDataRate::Hz20)
        );
    }

    #[tokio::test]
    async fn test_counter_fed_by_b_field_axis() {
        let transport = Arc::new(MockTransport::new());
        let board = Board::new("mag", transport.clone());
        let x = board.magnetometer().b_field_signal(Axis::X);
        let y = board.magnetometer().b_field_signal(Axis::Y);

        board.create_counter(&x, 4).await.unwrap();
        board.create_counter(&y, 1).await.unwrap();

        let history = transport.history().await;
        assert_eq!(history[0], vec![0x09, 0x02, 0x15, 0x05, 0xff, 0x20, 0x02, 0x17]);
        assert_eq!(history[1], vec![0x09, 0x02, 0x15, 0x05, 0xff, 0x22, 0x02, 0x14]);
        assert_eq!(board.dispatcher().pending_count().await, 2);
    }
}
