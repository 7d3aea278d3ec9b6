//! Command encoding and event recording engine for beacon peripherals.
//!
//! This crate turns high-level operations (set the iBeacon major number,
//! create a counter, configure the magnetometer) into the byte commands a
//! module-addressed BLE peripheral executes, and can record those commands
//! as event entries the peripheral replays whenever a trigger signal fires.
//!
//! # Features
//!
//! - **Encoding**: every operation maps to one row of a fixed opcode table
//! - **Recording**: per-board macro recording bound to a trigger signal
//! - **Signals**: data processors whose ids the peripheral assigns asynchronously
//! - **Multi-board support**: independent boards, driven concurrently
//! - **Testing**: a mock transport with failure injection and auto-reply
//!
//! # Board Model
//!
//! A [`Board`] owns one [`Transport`]. All of a board's writes and state
//! transitions are serialized, so the order operations are issued in is the
//! order frames reach the peripheral. Replies from the peripheral are fed
//! back through [`Board::handle_response`] or [`Board::listen`].
//!
//! # Quick Start
//!
//! ```
//! use std::sync::Arc;
//! use beaconwire_core::{Board, MockTransportBuilder};
//!
//! #[tokio::main]
//! async fn main() -> beaconwire_core::Result<()> {
//!     let transport = Arc::new(MockTransportBuilder::new().auto_reply(true).build());
//!     let board = Arc::new(Board::new("demo", transport.clone()));
//!     if let Some(replies) = transport.take_replies() {
//!         board.listen(replies);
//!     }
//!
//!     // Count switch presses and advertise the count as the major number
//!     let counter = board.create_counter_resolved(&board.switch_state_signal(), 4).await?;
//!     board.begin_recording(&counter).await?;
//!     board.ibeacon().set_major_signal(&counter).await?;
//!     let summary = board.end_recording().await?;
//!
//!     assert_eq!(summary.entries.len(), 1);
//!     assert_eq!(transport.history().await.len(), 3);
//!     Ok(())
//! }
//! ```

pub mod board;
pub mod dispatcher;
pub mod encoder;
pub mod error;
pub mod events;
pub mod ibeacon;
pub mod magnetometer;
pub mod manager;
pub mod mock;
pub mod recorder;
pub mod registry;
pub mod sensor_fusion;
pub mod transport;

// Core exports
pub use board::{Board, BoardConfig};
pub use dispatcher::{Dispatcher, Route};
pub use error::{Error, ProtocolError, Result};
pub use recorder::{Recorder, RecorderState, RecordingSummary};
pub use registry::{CorrelationId, PendingSignal, ProcessorKind, SignalRegistry};
pub use transport::Transport;

/// Type alias for a shared board reference.
///
/// [`Board::listen`] and [`BoardManager`] hand boards around as `Arc`s.
pub type SharedBoard = std::sync::Arc<Board>;

// Module exports
pub use events::{BoardEvent, EventDispatcher, EventReceiver, EventSender};
pub use ibeacon::IBeacon;
pub use magnetometer::{Magnetometer, OutputDataRate, Preset};
pub use manager::BoardManager;
pub use mock::{MockTransport, MockTransportBuilder};
pub use sensor_fusion::{AccRange, FusionConfig, FusionData, FusionMode, GyroRange, SensorFusion};

// Re-export from beaconwire-types
pub use beaconwire_types::uuid as uuids;
pub use beaconwire_types::{Axis, ByteCommand, DataToken, Operation, Signal, SignalSource};
