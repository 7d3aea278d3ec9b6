//! Data-processor signal registry.
//!
//! Processor ids are assigned by the peripheral, not by this crate. Creating
//! a signal therefore yields a [`PendingSignal`] that completes once the
//! peripheral's reply arrives and is fed to [`SignalRegistry::resolve`] (or
//! [`SignalRegistry::resolve_next`] on the in-order reply path).

use std::collections::{BTreeMap, VecDeque};
use std::time::Duration;

use tokio::sync::oneshot;
use tracing::{debug, info, warn};

use beaconwire_types::{ByteCommand, Signal};

use crate::encoder;
use crate::error::{Error, ProtocolError, Result};

/// Locally generated id correlating a creation command with its reply.
pub type CorrelationId = u32;

/// Kinds of data processor this engine can create.
///
/// This enum is marked `#[non_exhaustive]`; only the counter is supported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ProcessorKind {
    /// Counts upstream events, emitting `size` bytes (1-4).
    Counter {
        /// Output width in bytes.
        size: u8,
    },
}

impl ProcessorKind {
    /// Width of the value the created signal emits.
    #[must_use]
    pub fn output_length(&self) -> u8 {
        match self {
            ProcessorKind::Counter { size } => *size,
        }
    }

    /// Encode the creation command for this kind.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if the configuration cannot be encoded.
    pub fn encode(&self, upstream: &Signal) -> Result<ByteCommand> {
        match self {
            ProcessorKind::Counter { size } => encoder::data_processor::create_counter(upstream, *size),
        }
    }
}

/// A signal whose id the peripheral has not assigned yet.
///
/// Await [`PendingSignal::wait`] to obtain the concrete [`Signal`]. Dropping a
/// pending signal does not cancel the creation on the peripheral.
#[derive(Debug)]
pub struct PendingSignal {
    id: CorrelationId,
    kind: ProcessorKind,
    receiver: oneshot::Receiver<Result<Signal>>,
}

impl PendingSignal {
    /// Correlation id of this creation.
    #[must_use]
    pub fn id(&self) -> CorrelationId {
        self.id
    }

    /// The processor being created.
    #[must_use]
    pub fn kind(&self) -> ProcessorKind {
        self.kind
    }

    /// Wait for the peripheral to assign an id.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Protocol`] if the board session diverged before the
    /// reply arrived, or [`Error::Cancelled`] if the registry was dropped.
    pub async fn wait(self) -> Result<Signal> {
        self.receiver.await.map_err(|_| Error::Cancelled)?
    }

    /// Wait for the peripheral to assign an id, giving up after `duration`.
    ///
    /// # Errors
    ///
    /// As [`PendingSignal::wait`], plus [`Error::Timeout`].
    pub async fn wait_timeout(self, duration: Duration) -> Result<Signal> {
        let id = self.id;
        tokio::time::timeout(duration, self.wait())
            .await
            .map_err(|_| Error::timeout(format!("resolve pending signal {}", id), duration))?
    }
}

struct PendingEntry {
    id: CorrelationId,
    kind: ProcessorKind,
    sender: oneshot::Sender<Result<Signal>>,
}

/// Tracks the data-processor signals of one board session.
#[derive(Default)]
pub struct SignalRegistry {
    next_id: CorrelationId,
    pending: VecDeque<PendingEntry>,
    signals: BTreeMap<u8, Signal>,
    diverged: bool,
}

impl std::fmt::Debug for SignalRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignalRegistry")
            .field("pending", &self.pending.len())
            .field("signals", &self.signals.len())
            .field("diverged", &self.diverged)
            .finish()
    }
}

impl SignalRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new processor fed by `upstream`.
    ///
    /// Returns the creation command, which must be written to the transport
    /// directly (creation is never recorded), and the pending handle.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] for an unencodable configuration and
    /// [`Error::Protocol`] once the session has diverged.
    pub fn create(
        &mut self,
        kind: ProcessorKind,
        upstream: &Signal,
    ) -> Result<(ByteCommand, PendingSignal)> {
        if self.diverged {
            return Err(ProtocolError::Diverged.into());
        }
        let command = kind.encode(upstream)?;

        let id = self.next_id;
        self.next_id = self.next_id.wrapping_add(1);

        let (sender, receiver) = oneshot::channel();
        self.pending.push_back(PendingEntry { id, kind, sender });
        debug!("Registered pending signal {} ({:?})", id, kind);

        Ok((command, PendingSignal { id, kind, receiver }))
    }

    /// Forget a pending creation whose command never reached the peripheral.
    pub fn cancel(&mut self, id: CorrelationId) {
        self.pending.retain(|entry| entry.id != id);
    }

    /// Resolve pending signal `id` with the peripheral-assigned id.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::DuplicateResolution`] for an issued id that
    /// is no longer pending, or [`ProtocolError::UnknownPending`] for an id
    /// never issued; either leaves the session diverged.
    pub fn resolve(&mut self, id: CorrelationId, assigned: u8) -> Result<Signal> {
        if self.diverged {
            return Err(ProtocolError::Diverged.into());
        }
        match self.pending.iter().position(|entry| entry.id == id) {
            Some(index) => {
                // Position was just found, so removal succeeds
                let entry = self
                    .pending
                    .remove(index)
                    .ok_or(ProtocolError::UnknownPending(id))?;
                Ok(self.complete(entry, assigned))
            }
            // Issued ids are sequential; one no longer pending was settled
            None if id < self.next_id => {
                Err(self.abort(ProtocolError::DuplicateResolution(id)))
            }
            None => Err(self.abort(ProtocolError::UnknownPending(id))),
        }
    }

    /// Resolve the oldest pending signal.
    ///
    /// Replies arrive in the order creations were sent, so this is the path
    /// used by the inbound reply handler.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::UnexpectedReply`] if nothing is pending; the
    /// session is left diverged.
    pub fn resolve_next(&mut self, assigned: u8) -> Result<Signal> {
        if self.diverged {
            return Err(ProtocolError::Diverged.into());
        }
        match self.pending.pop_front() {
            Some(entry) => Ok(self.complete(entry, assigned)),
            None => Err(self.abort(ProtocolError::UnexpectedReply(format!(
                "processor id {} assigned with no creation pending",
                assigned
            )))),
        }
    }

    fn complete(&mut self, entry: PendingEntry, assigned: u8) -> Signal {
        let signal = Signal::processor(assigned, entry.kind.output_length());
        if self.signals.insert(assigned, signal).is_some() {
            warn!("Peripheral reassigned processor id {}", assigned);
        }
        info!("Pending signal {} resolved as {}", entry.id, signal);

        // The caller may have dropped the handle; the signal stays registered
        let _ = entry.sender.send(Ok(signal));
        signal
    }

    /// Mark the session diverged and fail every outstanding pending signal.
    ///
    /// Returns the error to surface on the path that detected the violation.
    pub fn abort(&mut self, error: ProtocolError) -> Error {
        warn!("Signal registry diverged: {}", error);
        self.diverged = true;
        for entry in self.pending.drain(..) {
            let _ = entry.sender.send(Err(Error::Protocol(error.clone())));
        }
        Error::Protocol(error)
    }

    /// Look up a resolved signal by its peripheral-assigned id.
    #[must_use]
    pub fn get(&self, id: u8) -> Option<&Signal> {
        self.signals.get(&id)
    }

    /// All resolved signals, ordered by id.
    pub fn signals(&self) -> impl Iterator<Item = &Signal> {
        self.signals.values()
    }

    /// Number of resolved signals.
    #[must_use]
    pub fn len(&self) -> usize {
        self.signals.len()
    }

    /// Whether no signal has been resolved yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.signals.is_empty()
    }

    /// Number of creations awaiting a reply.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Whether a protocol violation ended this session.
    #[must_use]
    pub fn is_diverged(&self) -> bool {
        self.diverged
    }
}
