//! Mock transport implementation for testing.
//!
//! This module provides a mock transport that can be used for unit testing
//! without requiring a peripheral.
//!
//! The [`MockTransport`] implements the [`Transport`] trait, so a
//! [`Board`](crate::Board) can be driven exactly as it would be over BLE.
//!
//! # Features
//!
//! - **Command history**: Every delivered frame is recorded in order
//! - **Failure injection**: Set the transport to fail permanently or for the next N writes
//! - **Latency simulation**: Add artificial delays to simulate slow BLE writes
//! - **Auto-reply**: Answer processor creations with sequential ids, like the firmware does

use std::sync::Mutex as StdMutex;
use std::sync::atomic::{AtomicBool, AtomicU8, AtomicU32, AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{RwLock, mpsc};

use beaconwire_types::protocol::{data_processor, module};

use crate::error::{Error, Result};
use crate::transport::Transport;

/// A mock command channel for testing.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use beaconwire_core::{Board, MockTransport};
///
/// #[tokio::main]
/// async fn main() {
///     let transport = Arc::new(MockTransport::new());
///     let board = Board::new("mock", transport.clone());
///
///     board.ibeacon().set_major(78).await.unwrap();
///     assert_eq!(transport.history().await, vec![vec![0x07, 0x03, 0x4e, 0x00]]);
/// }
/// ```
pub struct MockTransport {
    address: String,
    history: RwLock<Vec<Vec<u8>>>,
    write_count: AtomicU32,
    should_fail: AtomicBool,
    fail_message: RwLock<String>,
    /// Simulated write latency in milliseconds (0 = no delay).
    write_latency_ms: AtomicU64,
    /// Number of writes to fail before succeeding.
    fail_count: AtomicU32,
    /// Current count of failures (decremented on each failure).
    remaining_failures: AtomicU32,
    auto_reply: AtomicBool,
    next_processor_id: AtomicU8,
    reply_tx: mpsc::UnboundedSender<Vec<u8>>,
    reply_rx: StdMutex<Option<mpsc::UnboundedReceiver<Vec<u8>>>>,
}

impl std::fmt::Debug for MockTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockTransport")
            .field("address", &self.address)
            .field("write_count", &self.write_count.load(Ordering::Relaxed))
            .field("auto_reply", &self.auto_reply.load(Ordering::Relaxed))
            .finish()
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl MockTransport {
    /// Create a new mock transport that accepts every write.
    pub fn new() -> Self {
        MockTransportBuilder::new().build()
    }

    /// Get the mock address.
    pub fn address(&self) -> &str {
        &self.address
    }

    /// Every frame delivered so far, in order.
    pub async fn history(&self) -> Vec<Vec<u8>> {
        self.history.read().await.clone()
    }

    /// Forget delivered frames.
    pub async fn clear_history(&self) {
        self.history.write().await.clear();
    }

    /// Take the receiving end of the reply channel.
    ///
    /// Hand it to [`Board::listen`](crate::Board::listen). Returns `None`
    /// after the first call.
    pub fn take_replies(&self) -> Option<mpsc::UnboundedReceiver<Vec<u8>>> {
        self.reply_rx
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take()
    }

    /// Queue an arbitrary frame on the reply channel.
    pub fn push_reply(&self, frame: Vec<u8>) {
        // Nobody listening is not an error for a mock
        let _ = self.reply_tx.send(frame);
    }

    /// Make every following write fail.
    pub async fn set_should_fail(&self, fail: bool, message: Option<&str>) {
        self.should_fail.store(fail, Ordering::Relaxed);
        if let Some(msg) = message {
            *self.fail_message.write().await = msg.to_string();
        }
    }

    /// Configure transient failures.
    ///
    /// The transport will fail the next `count` writes, then succeed.
    pub fn set_transient_failures(&self, count: u32) {
        self.fail_count.store(count, Ordering::Relaxed);
        self.remaining_failures.store(count, Ordering::Relaxed);
    }

    /// Reset transient failure counter.
    pub fn reset_transient_failures(&self) {
        self.remaining_failures
            .store(self.fail_count.load(Ordering::Relaxed), Ordering::Relaxed);
    }

    /// Set simulated write latency.
    ///
    /// Set to `Duration::ZERO` to disable latency simulation.
    pub fn set_write_latency(&self, latency: Duration) {
        self.write_latency_ms
            .store(latency.as_millis() as u64, Ordering::Relaxed);
    }

    /// Answer processor creations automatically.
    pub fn set_auto_reply(&self, enabled: bool) {
        self.auto_reply.store(enabled, Ordering::Relaxed);
    }

    /// Get the number of write attempts, including failed ones.
    pub fn write_count(&self) -> u32 {
        self.write_count.load(Ordering::Relaxed)
    }

    async fn check_should_fail(&self) -> Result<()> {
        let latency = self.write_latency_ms.load(Ordering::Relaxed);
        if latency > 0 {
            tokio::time::sleep(Duration::from_millis(latency)).await;
        }

        // Check for transient failures first
        if self.remaining_failures.load(Ordering::Relaxed) > 0 {
            self.remaining_failures.fetch_sub(1, Ordering::Relaxed);
            return Err(Error::transport(self.fail_message.read().await.clone()));
        }

        if self.should_fail.load(Ordering::Relaxed) {
            Err(Error::transport(self.fail_message.read().await.clone()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn write(&self, frame: &[u8]) -> Result<()> {
        self.write_count.fetch_add(1, Ordering::Relaxed);
        self.check_should_fail().await?;

        self.history.write().await.push(frame.to_vec());

        let creates_processor = frame.len() > 2
            && frame[0] == module::DATA_PROCESSOR
            && frame[1] == data_processor::ADD;
        if creates_processor && self.auto_reply.load(Ordering::Relaxed) {
            let id = self.next_processor_id.fetch_add(1, Ordering::Relaxed);
            self.push_reply(vec![module::DATA_PROCESSOR, data_processor::ADD, id]);
        }
        Ok(())
    }
}

/// Builder for creating mock transports with custom settings.
#[derive(Debug)]
pub struct MockTransportBuilder {
    auto_reply: bool,
    first_processor_id: u8,
    write_latency: Duration,
    transient_failures: u32,
    fail_message: String,
}

impl Default for MockTransportBuilder {
    fn default() -> Self {
        Self {
            auto_reply: false,
            first_processor_id: 0,
            write_latency: Duration::ZERO,
            transient_failures: 0,
            fail_message: "Mock failure".to_string(),
        }
    }
}

impl MockTransportBuilder {
    /// Create a new builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer processor creations with sequential ids.
    #[must_use]
    pub fn auto_reply(mut self, enabled: bool) -> Self {
        self.auto_reply = enabled;
        self
    }

    /// First id handed out by auto-reply.
    #[must_use]
    pub fn first_processor_id(mut self, id: u8) -> Self {
        self.first_processor_id = id;
        self
    }

    /// Simulated latency of every write.
    #[must_use]
    pub fn write_latency(mut self, latency: Duration) -> Self {
        self.write_latency = latency;
        self
    }

    /// Fail the first `count` writes.
    #[must_use]
    pub fn transient_failures(mut self, count: u32) -> Self {
        self.transient_failures = count;
        self
    }

    /// Message carried by injected failures.
    #[must_use]
    pub fn fail_message(mut self, message: &str) -> Self {
        self.fail_message = message.to_string();
        self
    }

    /// Build the mock transport.
    #[must_use]
    pub fn build(self) -> MockTransport {
        let (reply_tx, reply_rx) = mpsc::unbounded_channel();
        MockTransport {
            address: format!("MOCK-{:06X}", rand::random::<u32>() % 0xFFFFFF),
            history: RwLock::new(Vec::new()),
            write_count: AtomicU32::new(0),
            should_fail: AtomicBool::new(false),
            fail_message: RwLock::new(self.fail_message),
            write_latency_ms: AtomicU64::new(self.write_latency.as_millis() as u64),
            fail_count: AtomicU32::new(self.transient_failures),
            remaining_failures: AtomicU32::new(self.transient_failures),
            auto_reply: AtomicBool::new(self.auto_reply),
            next_processor_id: AtomicU8::new(self.first_processor_id),
            reply_tx,
            reply_rx: StdMutex::new(Some(reply_rx)),
        }
    }
}

/// Unit tests for MockTransport and MockTransportBuilder.
///
/// # Running Tests
///
/// ```bash
/// cargo test -p beaconwire-core mock::tests
/// ```
#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_history_in_order() {
        let transport = MockTransport::new();
        transport.write(&[0x07, 0x01, 0x01]).await.unwrap();
        transport.write(&[0x07, 0x01, 0x00]).await.unwrap();
        assert_eq!(
            transport.history().await,
            vec![vec![0x07, 0x01, 0x01], vec![0x07, 0x01, 0x00]]
        );
        assert_eq!(transport.write_count(), 2);

        transport.clear_history().await;
        assert!(transport.history().await.is_empty());
    }

    #[tokio::test]
    async fn test_fail() {
        let transport = MockTransport::new();
        transport.set_should_fail(true, Some("link lost")).await;

        let err = transport.write(&[0x07, 0x01, 0x01]).await.unwrap_err();
        assert!(matches!(err, Error::Transport(_)));
        assert!(err.to_string().contains("link lost"));
        assert!(transport.history().await.is_empty());
    }

    #[tokio::test]
    async fn test_transient_failures() {
        let transport = MockTransportBuilder::new().transient_failures(2).build();

        assert!(transport.write(&[0x07, 0x01, 0x01]).await.is_err());
        assert!(transport.write(&[0x07, 0x01, 0x01]).await.is_err());
        assert!(transport.write(&[0x07, 0x01, 0x01]).await.is_ok());
        assert_eq!(transport.write_count(), 3);

        transport.reset_transient_failures();
        assert!(transport.write(&[0x07, 0x01, 0x01]).await.is_err());
    }

    #[tokio::test]
    async fn test_auto_reply_sequential_ids() {
        let transport = MockTransportBuilder::new()
            .auto_reply(true)
            .first_processor_id(4)
            .build();
        let mut replies = transport.take_replies().unwrap();
        assert!(transport.take_replies().is_none());

        let create = [0x09, 0x02, 0x01, 0x01, 0xff, 0x00, 0x02, 0x13];
        transport.write(&create).await.unwrap();
        transport.write(&[0x07, 0x01, 0x01]).await.unwrap();
        transport.write(&create).await.unwrap();

        assert_eq!(replies.recv().await.unwrap(), vec![0x09, 0x02, 0x04]);
        assert_eq!(replies.recv().await.unwrap(), vec![0x09, 0x02, 0x05]);
        assert!(replies.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_write_latency() {
        let transport = MockTransportBuilder::new()
            .write_latency(Duration::from_millis(200))
            .build();
        let start = tokio::time::Instant::now();
        transport.write(&[0x07, 0x01, 0x01]).await.unwrap();
        assert!(start.elapsed() >= Duration::from_millis(200));
    }

    #[test]
    fn test_builder_defaults() {
        let transport = MockTransportBuilder::new().build();
        assert!(transport.address().starts_with("MOCK-"));
        assert_eq!(transport.write_count(), 0);
    }
}
