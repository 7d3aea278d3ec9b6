//! Board event system for command and recording notifications.
//!
//! This module provides an event-based system for observing what a board
//! sends to its peripheral, which signals it learns about, and where its
//! recordings start and end.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use beaconwire_types::{ByteCommand, Signal};

/// Events that can be emitted by boards.
///
/// All events are serializable for logging, persistence, and IPC.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new event types
/// in future versions without breaking downstream code.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
#[non_exhaustive]
pub enum BoardEvent {
    /// A frame was delivered to the transport.
    CommandWritten {
        board: String,
        frame: ByteCommand,
        /// Whether the frame is an event entry of an active recording.
        recorded: bool,
    },
    /// The peripheral assigned an id to a pending signal.
    SignalCreated { board: String, signal: Signal },
    /// A recording started.
    RecordingStarted { board: String, trigger: Signal },
    /// A recording was terminated.
    RecordingEnded {
        board: String,
        trigger: Signal,
        entries: usize,
    },
    /// The peripheral broke the reply contract; the session has diverged.
    ProtocolViolation { board: String, error: String },
}

impl BoardEvent {
    /// Name of the board the event originated from.
    pub fn board(&self) -> &str {
        match self {
            BoardEvent::CommandWritten { board, .. }
            | BoardEvent::SignalCreated { board, .. }
            | BoardEvent::RecordingStarted { board, .. }
            | BoardEvent::RecordingEnded { board, .. }
            | BoardEvent::ProtocolViolation { board, .. } => board,
        }
    }
}

/// Sender for board events.
pub type EventSender = broadcast::Sender<BoardEvent>;

/// Receiver for board events.
pub type EventReceiver = broadcast::Receiver<BoardEvent>;

/// Default channel capacity.
pub const DEFAULT_EVENT_CAPACITY: usize = 100;

/// Event dispatcher for sending events to multiple receivers.
#[derive(Debug, Clone)]
pub struct EventDispatcher {
    sender: EventSender,
}

impl EventDispatcher {
    /// Create a new event dispatcher.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Subscribe to events.
    pub fn subscribe(&self) -> EventReceiver {
        self.sender.subscribe()
    }

    /// Send an event.
    pub fn send(&self, event: BoardEvent) {
        // Ignore error if no receivers
        let _ = self.sender.send(event);
    }

    /// Get the number of active receivers.
    pub fn receiver_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventDispatcher {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_CAPACITY)
    }
}
