//! Trait abstraction for the peripheral's command channel.
//!
//! This module provides the [`Transport`] trait that abstracts over a real
//! BLE characteristic write and the [`MockTransport`](crate::MockTransport)
//! used for testing.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::Result;

/// Ordered, byte-exact delivery of command frames to one peripheral.
///
/// Implementations must deliver frames in the order `write` is called and
/// must not alter them. Errors are passed through to the caller unchanged;
/// the engine never retries.
///
/// Replies from the peripheral travel the other way and are fed to
/// [`Board::handle_response`](crate::Board::handle_response) or
/// [`Board::listen`](crate::Board::listen).
///
/// # Example
///
/// ```ignore
/// use beaconwire_core::{Result, Transport};
///
/// struct Characteristic { /* ... */ }
///
/// #[async_trait::async_trait]
/// impl Transport for Characteristic {
///     async fn write(&self, frame: &[u8]) -> Result<()> {
///         self.peripheral.write(&self.command, frame).await.map_err(beaconwire_core::Error::transport)
///     }
/// }
/// ```
#[async_trait]
pub trait Transport: Send + Sync {
    /// Write one complete frame.
    async fn write(&self, frame: &[u8]) -> Result<()>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn write(&self, frame: &[u8]) -> Result<()> {
        (**self).write(frame).await
    }
}
