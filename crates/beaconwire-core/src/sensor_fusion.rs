//! Sensor fusion control.
//!
//! Mode, ranges and the output mask are cached on the board and only sent
//! when [`SensorFusion::write_config`] or [`SensorFusion::start`] is called.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::board::Board;
use crate::encoder;
use crate::error::Result;

/// Fusion algorithm mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[repr(u8)]
pub enum FusionMode {
    /// Algorithm off.
    #[default]
    Sleep = 0,
    /// Nine degrees of freedom.
    Ndof = 1,
    /// Accelerometer and gyroscope only.
    ImuPlus = 2,
    /// Accelerometer and magnetometer.
    Compass = 3,
    /// Magnetometer used as a gyroscope substitute.
    M4g = 4,
}

/// Accelerometer range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[repr(u8)]
pub enum AccRange {
    /// ±2 g.
    G2 = 0,
    /// ±4 g.
    G4 = 1,
    /// ±8 g.
    G8 = 2,
    /// ±16 g.
    #[default]
    G16 = 3,
}

/// Gyroscope range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[repr(u8)]
pub enum GyroRange {
    /// ±2000 °/s.
    #[default]
    Dps2000 = 0,
    /// ±1000 °/s.
    Dps1000 = 1,
    /// ±500 °/s.
    Dps500 = 2,
    /// ±250 °/s.
    Dps250 = 3,
}

/// Data kinds the algorithm can output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum FusionData {
    CorrectedAcc = 0,
    CorrectedGyro = 1,
    CorrectedMag = 2,
    Quaternion = 3,
    EulerAngle = 4,
    GravityVector = 5,
    LinearAcc = 6,
}

impl FusionData {
    /// Bit of this kind in the output mask.
    pub fn mask(&self) -> u8 {
        1 << (*self as u8)
    }
}

/// Locally cached fusion settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FusionConfig {
    pub mode: FusionMode,
    pub acc_range: AccRange,
    pub gyro_range: GyroRange,
    /// Output kinds [`SensorFusion::start`] enables.
    pub enabled_mask: u8,
}

/// Sensor fusion module of one board.
#[derive(Debug, Clone, Copy)]
pub struct SensorFusion<'a> {
    board: &'a Board,
}

impl Board {
    /// Access the sensor fusion module.
    pub fn sensor_fusion(&self) -> SensorFusion<'_> {
        SensorFusion { board: self }
    }
}

impl SensorFusion<'_> {
    /// Cached settings.
    pub async fn config(&self) -> FusionConfig {
        *self.board.fusion.lock().await
    }

    /// Set the mode. Not sent until [`SensorFusion::write_config`].
    pub async fn set_mode(&self, mode: FusionMode) {
        self.board.fusion.lock().await.mode = mode;
    }

    /// Set the accelerometer range. Not sent until [`SensorFusion::write_config`].
    pub async fn set_acc_range(&self, range: AccRange) {
        self.board.fusion.lock().await.acc_range = range;
    }

    /// Set the gyroscope range. Not sent until [`SensorFusion::write_config`].
    pub async fn set_gyro_range(&self, range: GyroRange) {
        self.board.fusion.lock().await.gyro_range = range;
    }

    /// Send the cached mode and ranges.
    pub async fn write_config(&self) -> Result<()> {
        let config = self.config().await;
        info!(board = %self.board.name(), "Writing sensor fusion config {:?}", config);
        let cmd = encoder::sensor_fusion::mode(config.mode, config.acc_range, config.gyro_range);
        self.board.dispatcher().dispatch(cmd).await?;
        Ok(())
    }

    /// Add `data` to the outputs enabled on start.
    pub async fn enable_data(&self, data: FusionData) {
        self.board.fusion.lock().await.enabled_mask |= data.mask();
    }

    /// Clear the outputs enabled on start.
    pub async fn clear_enabled_mask(&self) {
        self.board.fusion.lock().await.enabled_mask = 0;
    }

    /// Enable the selected outputs, then start the algorithm.
    pub async fn start(&self) -> Result<()> {
        let mask = self.config().await.enabled_mask;
        self.board
            .dispatcher()
            .dispatch_all(vec![
                encoder::sensor_fusion::output_enable(mask),
                encoder::sensor_fusion::enable(true),
            ])
            .await?;
        Ok(())
    }

    /// Stop the algorithm, then disable every output.
    pub async fn stop(&self) -> Result<()> {
        self.board
            .dispatcher()
            .dispatch_all(vec![
                encoder::sensor_fusion::enable(false),
                encoder::sensor_fusion::output_clear(),
            ])
            .await?;
        Ok(())
    }
}
