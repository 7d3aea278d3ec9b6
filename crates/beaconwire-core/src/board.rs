//! Board context.
//!
//! A [`Board`] is one peripheral session: its transport, recorder, signal
//! registry and sensor fusion settings. Module operations are reached through
//! accessors ([`Board::ibeacon`], [`Board::magnetometer`],
//! [`Board::sensor_fusion`]), all of which route through the board's
//! [`Dispatcher`].

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use beaconwire_types::protocol::{data_processor, module};
use beaconwire_types::{ByteCommand, Signal};

use crate::dispatcher::Dispatcher;
use crate::error::{ProtocolError, Result};
use crate::events::{DEFAULT_EVENT_CAPACITY, EventDispatcher, EventReceiver};
use crate::recorder::{RecorderState, RecordingSummary};
use crate::registry::{PendingSignal, ProcessorKind};
use crate::sensor_fusion::FusionConfig;
use crate::transport::Transport;

/// Default timeout for a single frame write.
const DEFAULT_WRITE_TIMEOUT: Duration = Duration::from_secs(10);

/// Default time to wait for the peripheral to assign a processor id.
const DEFAULT_RESPONSE_TIMEOUT: Duration = Duration::from_secs(10);

/// Configuration for board timeouts and event buffering.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use beaconwire_core::BoardConfig;
///
/// let config = BoardConfig::default()
///     .write_timeout(Duration::from_secs(2))
///     .event_capacity(16);
/// assert_eq!(config.event_capacity, 16);
/// ```
#[derive(Debug, Clone)]
pub struct BoardConfig {
    /// Timeout for one transport write.
    pub write_timeout: Duration,
    /// Timeout used by [`Board::create_counter_resolved`].
    pub response_timeout: Duration,
    /// Capacity of the board's event channel.
    pub event_capacity: usize,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            write_timeout: DEFAULT_WRITE_TIMEOUT,
            response_timeout: DEFAULT_RESPONSE_TIMEOUT,
            event_capacity: DEFAULT_EVENT_CAPACITY,
        }
    }
}

impl BoardConfig {
    /// Create a new board config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the write timeout.
    #[must_use]
    pub fn write_timeout(mut self, timeout: Duration) -> Self {
        self.write_timeout = timeout;
        self
    }

    /// Set the response timeout.
    #[must_use]
    pub fn response_timeout(mut self, timeout: Duration) -> Self {
        self.response_timeout = timeout;
        self
    }

    /// Set the event channel capacity.
    #[must_use]
    pub fn event_capacity(mut self, capacity: usize) -> Self {
        self.event_capacity = capacity;
        self
    }
}

/// One peripheral session.
///
/// Boards are independent: each has its own recorder and registry, and
/// nothing is shared between two boards.
pub struct Board {
    name: String,
    dispatcher: Dispatcher,
    pub(crate) fusion: Mutex<FusionConfig>,
    events: EventDispatcher,
    config: BoardConfig,
}

impl std::fmt::Debug for Board {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Board")
            .field("name", &self.name)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Board {
    /// Create a board with default configuration.
    pub fn new(name: impl Into<String>, transport: Arc<dyn Transport>) -> Self {
        Self::with_config(name, transport, BoardConfig::default())
    }

    /// Create a board with custom configuration.
    pub fn with_config(
        name: impl Into<String>,
        transport: Arc<dyn Transport>,
        config: BoardConfig,
    ) -> Self {
        let name = name.into();
        let events = EventDispatcher::new(config.event_capacity);
        let dispatcher = Dispatcher::new(
            name.clone(),
            transport,
            config.write_timeout,
            events.clone(),
        );
        Self {
            name,
            dispatcher,
            fusion: Mutex::new(FusionConfig::default()),
            events,
            config,
        }
    }

    /// Board name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Board configuration.
    pub fn config(&self) -> &BoardConfig {
        &self.config
    }

    /// The board's command router.
    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Subscribe to this board's events.
    pub fn subscribe(&self) -> EventReceiver {
        self.events.subscribe()
    }

    /// The on-board switch state, usable as a trigger or upstream source.
    pub fn switch_state_signal(&self) -> Signal {
        Signal::switch_state()
    }

    /// Create a counter fed by `upstream`, emitting `size` bytes.
    ///
    /// The creation command is sent immediately, even while recording.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`](crate::Error::InvalidArgument) if
    /// `size` is outside 1-4, without sending anything.
    #[tracing::instrument(level = "debug", skip(self, upstream), fields(board = %self.name))]
    pub async fn create_counter(&self, upstream: &Signal, size: u8) -> Result<PendingSignal> {
        let pending = self
            .dispatcher
            .create_signal(ProcessorKind::Counter { size }, upstream)
            .await?;
        info!("Counter requested from {} ({} bytes)", upstream, size);
        Ok(pending)
    }

    /// Create a counter and wait for its id, up to the configured response timeout.
    ///
    /// # Errors
    ///
    /// As [`Board::create_counter`] and [`PendingSignal::wait_timeout`].
    pub async fn create_counter_resolved(&self, upstream: &Signal, size: u8) -> Result<Signal> {
        self.create_counter(upstream, size)
            .await?
            .wait_timeout(self.config.response_timeout)
            .await
    }

    /// Start recording commands bound to `trigger`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AlreadyRecording`](crate::Error::AlreadyRecording)
    /// if a recording is active.
    pub async fn begin_recording(&self, trigger: &Signal) -> Result<()> {
        self.dispatcher.begin_recording(*trigger).await
    }

    /// Terminate the active recording.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotRecording`](crate::Error::NotRecording) when idle.
    pub async fn end_recording(&self) -> Result<RecordingSummary> {
        self.dispatcher.end_recording().await
    }

    /// Whether a recording is active.
    pub async fn is_recording(&self) -> bool {
        self.dispatcher.recorder_state().await == RecorderState::Recording
    }

    /// Feed one frame received on the notify characteristic.
    ///
    /// Processor creation replies (`[0x09, 0x02, id]`) resolve the oldest
    /// pending signal and return it. Other notifications are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Protocol`](crate::Error::Protocol) for malformed
    /// frames and for replies that break the reply contract.
    pub async fn handle_response(&self, frame: &[u8]) -> Result<Option<Signal>> {
        let reply = ByteCommand::from_bytes(frame)?;
        if (reply.module(), reply.register()) != (module::DATA_PROCESSOR, data_processor::ADD) {
            debug!(board = %self.name, "Ignoring notification {}", reply);
            return Ok(None);
        }

        match reply.payload().first() {
            Some(&id) => self.dispatcher.resolve_next(id).await.map(Some),
            None => Err(self
                .dispatcher
                .abort(ProtocolError::UnexpectedReply(
                    "processor reply without an id".to_string(),
                ))
                .await),
        }
    }

    /// Spawn a task feeding every frame from `replies` to
    /// [`Board::handle_response`].
    ///
    /// The task ends when the sending side is dropped.
    pub fn listen(self: &Arc<Self>, mut replies: mpsc::UnboundedReceiver<Vec<u8>>) -> JoinHandle<()> {
        let board = Arc::clone(self);
        tokio::spawn(async move {
            while let Some(frame) = replies.recv().await {
                if let Err(e) = board.handle_response(&frame).await {
                    warn!(board = %board.name, "Failed to handle reply: {}", e);
                }
            }
            debug!(board = %board.name, "Reply channel closed");
        })
    }
}
