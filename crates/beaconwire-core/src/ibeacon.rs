//! iBeacon advertising operations.
//!
//! Every setter is routed through the board: sent immediately when idle, or
//! captured as an event entry while a recording is active. The `*_signal`
//! variants take their value from a signal when the trigger fires and are
//! only valid inside a recording.

use tracing::info;

use beaconwire_types::Signal;

use crate::board::Board;
use crate::encoder;
use crate::error::Result;

/// iBeacon module of one board.
#[derive(Debug, Clone, Copy)]
pub struct IBeacon<'a> {
    board: &'a Board,
}

impl Board {
    /// Access the iBeacon module.
    pub fn ibeacon(&self) -> IBeacon<'_> {
        IBeacon { board: self }
    }
}

impl IBeacon<'_> {
    /// Start advertising.
    pub async fn enable(&self) -> Result<()> {
        info!(board = %self.board.name(), "Enabling iBeacon");
        self.board
            .dispatcher()
            .dispatch(encoder::ibeacon::enable())
            .await?;
        Ok(())
    }

    /// Stop advertising.
    pub async fn disable(&self) -> Result<()> {
        info!(board = %self.board.name(), "Disabling iBeacon");
        self.board
            .dispatcher()
            .dispatch(encoder::ibeacon::disable())
            .await?;
        Ok(())
    }

    /// Set the advertised major number.
    pub async fn set_major(&self, major: u16) -> Result<()> {
        self.board
            .dispatcher()
            .dispatch(encoder::ibeacon::set_major(major))
            .await?;
        Ok(())
    }

    /// Set the advertised minor number.
    pub async fn set_minor(&self, minor: u16) -> Result<()> {
        self.board
            .dispatcher()
            .dispatch(encoder::ibeacon::set_minor(minor))
            .await?;
        Ok(())
    }

    /// Set the advertising period in milliseconds.
    pub async fn set_period(&self, period_ms: u16) -> Result<()> {
        self.board
            .dispatcher()
            .dispatch(encoder::ibeacon::set_period(period_ms))
            .await?;
        Ok(())
    }

    /// Set the calibrated receive power at 1 m, in dBm.
    pub async fn set_rx_power(&self, power: i8) -> Result<()> {
        self.board
            .dispatcher()
            .dispatch(encoder::ibeacon::set_rx_power(power))
            .await?;
        Ok(())
    }

    /// Set the transmit power, in dBm.
    pub async fn set_tx_power(&self, power: i8) -> Result<()> {
        self.board
            .dispatcher()
            .dispatch(encoder::ibeacon::set_tx_power(power))
            .await?;
        Ok(())
    }

    /// Set the advertised UUID, given in wire order.
    ///
    /// See [`ad_uuid_bytes`](beaconwire_types::uuids::ad_uuid_bytes) for
    /// converting a parsed UUID.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`](crate::Error::InvalidArgument)
    /// unless `uuid` is exactly 16 bytes; nothing is sent.
    pub async fn set_uuid(&self, uuid: &[u8]) -> Result<()> {
        let cmd = encoder::ibeacon::set_uuid(uuid)?;
        self.board.dispatcher().dispatch(cmd).await?;
        Ok(())
    }

    /// Set the major number from `signal` each time the trigger fires.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotRecording`](crate::Error::NotRecording) outside a
    /// recording.
    pub async fn set_major_signal(&self, signal: &Signal) -> Result<()> {
        let token = signal.data_token(0)?;
        self.board
            .dispatcher()
            .dispatch_fed(encoder::ibeacon::set_major(0), token)
            .await
    }

    /// Set the minor number from `signal` each time the trigger fires.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotRecording`](crate::Error::NotRecording) outside a
    /// recording.
    pub async fn set_minor_signal(&self, signal: &Signal) -> Result<()> {
        let token = signal.data_token(0)?;
        self.board
            .dispatcher()
            .dispatch_fed(encoder::ibeacon::set_minor(0), token)
            .await
    }
}
