//! Per-board command routing.
//!
//! The [`Dispatcher`] owns the transport, the [`Recorder`] and the
//! [`SignalRegistry`] of one board. All state transitions and the writes
//! they cause happen under a single lock, so a command issued concurrently
//! with `begin_recording` is either fully recorded or fully sent directly,
//! and the frames of a multi-command operation are never interleaved with
//! another task's frames.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tracing::{debug, warn};

use beaconwire_types::{ByteCommand, DataToken, Signal};

use crate::error::{Error, ProtocolError, Result};
use crate::events::{BoardEvent, EventDispatcher};
use crate::recorder::{Recorder, RecorderState, RecordingSummary};
use crate::registry::{CorrelationId, PendingSignal, ProcessorKind, SignalRegistry};
use crate::transport::Transport;

/// How a command reached the peripheral.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// Sent unchanged for immediate execution.
    Direct,
    /// Sent as an event entry of the active recording.
    Recorded,
}

#[derive(Debug, Default)]
struct Session {
    recorder: Recorder,
    registry: SignalRegistry,
}

/// Routes one board's commands to its transport.
pub struct Dispatcher {
    board: String,
    transport: Arc<dyn Transport>,
    session: Mutex<Session>,
    events: EventDispatcher,
    write_timeout: Duration,
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("board", &self.board)
            .field("write_timeout", &self.write_timeout)
            .finish_non_exhaustive()
    }
}

impl Dispatcher {
    /// Create a dispatcher writing to `transport`.
    pub fn new(
        board: impl Into<String>,
        transport: Arc<dyn Transport>,
        write_timeout: Duration,
        events: EventDispatcher,
    ) -> Self {
        Self {
            board: board.into(),
            transport,
            session: Mutex::new(Session::default()),
            events,
            write_timeout,
        }
    }

    async fn write(&self, cmd: &ByteCommand, recorded: bool) -> Result<()> {
        debug!(board = %self.board, recorded, "-> {}", cmd);
        let frame = cmd.to_vec();
        match tokio::time::timeout(self.write_timeout, self.transport.write(&frame)).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                warn!(board = %self.board, "Write of {} failed: {}", cmd, e);
                return Err(e);
            }
            Err(_) => {
                warn!(board = %self.board, "Write of {} timed out", cmd);
                return Err(Error::timeout(format!("write {}", cmd), self.write_timeout));
            }
        }
        self.events.send(BoardEvent::CommandWritten {
            board: self.board.clone(),
            frame: cmd.clone(),
            recorded,
        });
        Ok(())
    }

    async fn route(
        &self,
        session: &mut Session,
        cmd: &ByteCommand,
        token: Option<&DataToken>,
    ) -> Result<Route> {
        match session.recorder.rewrite(cmd, token)? {
            Some(entry) => {
                self.write(&entry, true).await?;
                session.recorder.record(entry);
                Ok(Route::Recorded)
            }
            None => {
                self.write(cmd, false).await?;
                Ok(Route::Direct)
            }
        }
    }

    /// Send `cmd`, rewritten into an event entry if a recording is active.
    ///
    /// # Errors
    ///
    /// Returns transport errors unchanged.
    pub async fn dispatch(&self, cmd: ByteCommand) -> Result<Route> {
        let mut session = self.session.lock().await;
        self.route(&mut session, &cmd, None).await
    }

    /// Send several commands as one uninterrupted operation.
    ///
    /// Every command takes the same route. If a write fails the remaining
    /// commands are not sent.
    ///
    /// # Errors
    ///
    /// Returns the first transport error.
    pub async fn dispatch_all(&self, cmds: Vec<ByteCommand>) -> Result<Route> {
        let mut session = self.session.lock().await;
        let mut route = if session.recorder.is_recording() {
            Route::Recorded
        } else {
            Route::Direct
        };
        for cmd in &cmds {
            route = self.route(&mut session, cmd, None).await?;
        }
        Ok(route)
    }

    /// Record `cmd` with its operand taken from a signal at run time.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotRecording`] when no recording is active.
    pub async fn dispatch_fed(&self, cmd: ByteCommand, token: DataToken) -> Result<()> {
        let mut session = self.session.lock().await;
        self.route(&mut session, &cmd, Some(&token)).await.map(|_| ())
    }

    /// Start recording commands bound to `trigger`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AlreadyRecording`] if a recording is active.
    pub async fn begin_recording(&self, trigger: Signal) -> Result<()> {
        self.session.lock().await.recorder.begin(trigger)?;
        self.events.send(BoardEvent::RecordingStarted {
            board: self.board.clone(),
            trigger,
        });
        Ok(())
    }

    /// Send the terminator and return to idle.
    ///
    /// If the terminator cannot be written the recording stays active so the
    /// caller may end it again.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotRecording`] when idle, or the transport error.
    pub async fn end_recording(&self) -> Result<RecordingSummary> {
        let mut session = self.session.lock().await;
        let terminator = session.recorder.terminator()?;
        self.write(&terminator, true).await?;
        let summary = session.recorder.end()?;
        self.events.send(BoardEvent::RecordingEnded {
            board: self.board.clone(),
            trigger: summary.trigger,
            entries: summary.entries.len(),
        });
        Ok(summary)
    }

    /// Current recorder state.
    pub async fn recorder_state(&self) -> RecorderState {
        self.session.lock().await.recorder.state()
    }

    /// Entries delivered so far in the active recording.
    pub async fn captured(&self) -> Vec<ByteCommand> {
        self.session.lock().await.recorder.captured().to_vec()
    }

    /// Create a data processor fed by `upstream`.
    ///
    /// The creation command is always sent directly, even while recording.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] before anything is sent, the
    /// transport error if the command could not be written, or
    /// [`Error::Protocol`] once the session has diverged. After
    /// [`Error::Timeout`] the creation stays pending: the next reply still
    /// resolves it, keeping later creations aligned with their replies.
    pub async fn create_signal(
        &self,
        kind: ProcessorKind,
        upstream: &Signal,
    ) -> Result<PendingSignal> {
        let mut session = self.session.lock().await;
        let (cmd, pending) = session.registry.create(kind, upstream)?;
        if let Err(e) = self.write(&cmd, false).await {
            // A timed-out frame may still reach the peripheral; its reply
            // resolves this slot
            if matches!(e, Error::Transport(_)) {
                session.registry.cancel(pending.id());
            } else {
                debug!(board = %self.board, "Keeping pending signal {} after {}", pending.id(), e);
            }
            return Err(e);
        }
        Ok(pending)
    }

    fn violation(&self, error: &ProtocolError) {
        warn!(board = %self.board, "Protocol violation: {}", error);
        self.events.send(BoardEvent::ProtocolViolation {
            board: self.board.clone(),
            error: error.to_string(),
        });
    }

    fn report(&self, result: Result<Signal>) -> Result<Signal> {
        match &result {
            Ok(signal) => self.events.send(BoardEvent::SignalCreated {
                board: self.board.clone(),
                signal: *signal,
            }),
            Err(Error::Protocol(e)) => self.violation(e),
            Err(_) => {}
        }
        result
    }

    /// Resolve the oldest pending signal with a peripheral-assigned id.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Protocol`] if nothing is pending.
    pub async fn resolve_next(&self, assigned: u8) -> Result<Signal> {
        let result = self.session.lock().await.registry.resolve_next(assigned);
        self.report(result)
    }

    /// Resolve a specific pending signal.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Protocol`] for unknown or already resolved ids.
    pub async fn resolve(&self, pending: CorrelationId, assigned: u8) -> Result<Signal> {
        let result = self.session.lock().await.registry.resolve(pending, assigned);
        self.report(result)
    }

    /// Record a reply-contract violation detected outside the registry.
    pub async fn abort(&self, error: ProtocolError) -> Error {
        self.violation(&error);
        self.session.lock().await.registry.abort(error)
    }

    /// Look up a resolved signal.
    pub async fn signal(&self, id: u8) -> Option<Signal> {
        self.session.lock().await.registry.get(id).copied()
    }

    /// All resolved signals, ordered by id.
    pub async fn signals(&self) -> Vec<Signal> {
        self.session.lock().await.registry.signals().copied().collect()
    }

    /// Number of creations awaiting a reply.
    pub async fn pending_count(&self) -> usize {
        self.session.lock().await.registry.pending_count()
    }

    /// Whether a protocol violation ended this session.
    pub async fn is_diverged(&self) -> bool {
        self.session.lock().await.registry.is_diverged()
    }
}
