//! Macro recording.
//!
//! While a recording is active every command sent to the board is rewritten
//! into an event entry bound to the trigger signal, so the peripheral runs it
//! whenever the trigger fires instead of once.
//!
//! The [`Recorder`] itself is pure: it decides what goes on the wire. The
//! [`Dispatcher`](crate::dispatcher::Dispatcher) performs the writes and only
//! [`record`](Recorder::record)s an entry once its write succeeded.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use beaconwire_types::{ByteCommand, DataToken, Signal};

use crate::encoder;
use crate::error::{Error, Result};

/// Recorder state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecorderState {
    /// Commands pass through unchanged.
    Idle,
    /// Commands are rewritten into event entries.
    Recording,
}

/// What a finished recording sent to the peripheral.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordingSummary {
    /// The signal the entries are bound to.
    pub trigger: Signal,
    /// Event entries, in send order.
    pub entries: Vec<ByteCommand>,
    /// The terminator that closed the recording.
    pub terminator: ByteCommand,
}

#[derive(Debug, Clone)]
struct Session {
    trigger: Signal,
    captured: Vec<ByteCommand>,
}

/// Per-board recording state machine.
#[derive(Debug, Default)]
pub struct Recorder {
    session: Option<Session>,
}

impl Recorder {
    /// Create an idle recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> RecorderState {
        if self.session.is_some() {
            RecorderState::Recording
        } else {
            RecorderState::Idle
        }
    }

    /// Whether a recording is active.
    #[must_use]
    pub fn is_recording(&self) -> bool {
        self.session.is_some()
    }

    /// Trigger of the active recording.
    #[must_use]
    pub fn trigger(&self) -> Option<&Signal> {
        self.session.as_ref().map(|s| &s.trigger)
    }

    /// Entries captured so far in the active recording.
    #[must_use]
    pub fn captured(&self) -> &[ByteCommand] {
        self.session.as_ref().map_or(&[], |s| s.captured.as_slice())
    }

    /// Start capturing commands bound to `trigger`.
    ///
    /// Nothing is sent to the peripheral.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AlreadyRecording`] if a recording is active; the
    /// existing recording is left untouched.
    pub fn begin(&mut self, trigger: Signal) -> Result<()> {
        if self.session.is_some() {
            return Err(Error::AlreadyRecording);
        }
        info!("Recording started on trigger {}", trigger);
        self.session = Some(Session {
            trigger,
            captured: Vec::new(),
        });
        Ok(())
    }

    /// Decide what to send for `cmd` without changing state.
    ///
    /// Returns `None` when idle and no token is given (send `cmd` as is), or
    /// the event entry to send instead while recording.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotRecording`] if `token` is given while idle; a
    /// signal-fed operand only exists inside a recording.
    pub fn rewrite(
        &self,
        cmd: &ByteCommand,
        token: Option<&DataToken>,
    ) -> Result<Option<ByteCommand>> {
        match &self.session {
            Some(session) => encoder::event::entry(&session.trigger, cmd, token).map(Some),
            None if token.is_some() => Err(Error::NotRecording),
            None => Ok(None),
        }
    }

    /// Append an entry that has been delivered.
    pub fn record(&mut self, entry: ByteCommand) {
        if let Some(session) = self.session.as_mut() {
            debug!("Captured entry {}", entry);
            session.captured.push(entry);
        }
    }

    /// Rewrite and record `cmd` in one step.
    ///
    /// # Errors
    ///
    /// As [`Recorder::rewrite`].
    pub fn capture(
        &mut self,
        cmd: &ByteCommand,
        token: Option<&DataToken>,
    ) -> Result<Option<ByteCommand>> {
        let entry = self.rewrite(cmd, token)?;
        if let Some(entry) = &entry {
            self.record(entry.clone());
        }
        Ok(entry)
    }

    /// The terminator the active recording would end with.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotRecording`] when idle.
    pub fn terminator(&self) -> Result<ByteCommand> {
        self.session
            .as_ref()
            .map(|s| encoder::event::terminate(&s.trigger))
            .ok_or(Error::NotRecording)
    }

    /// Close the active recording and return to idle.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotRecording`] when idle.
    pub fn end(&mut self) -> Result<RecordingSummary> {
        let session = self.session.take().ok_or(Error::NotRecording)?;
        let terminator = encoder::event::terminate(&session.trigger);
        info!(
            "Recording on trigger {} ended with {} entries",
            session.trigger,
            session.captured.len()
        );
        Ok(RecordingSummary {
            trigger: session.trigger,
            entries: session.captured,
            terminator,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trigger() -> Signal {
        Signal::processor(0, 4)
    }

    #[test]
    fn test_idle_passthrough() {
        let mut recorder = Recorder::new();
        let cmd = encoder::ibeacon::set_major(78);
        assert_eq!(recorder.capture(&cmd, None).unwrap(), None);
        assert_eq!(recorder.state(), RecorderState::Idle);
    }

    #[test]
    fn test_token_while_idle_rejected() {
        let mut recorder = Recorder::new();
        let cmd = encoder::ibeacon::set_major(0);
        let token = trigger().data_token(0).unwrap();
        let err = recorder.capture(&cmd, Some(&token)).unwrap_err();
        assert!(matches!(err, Error::NotRecording));
    }

    #[test]
    fn test_begin_twice_keeps_first() {
        let mut recorder = Recorder::new();
        recorder.begin(trigger()).unwrap();
        let err = recorder.begin(Signal::processor(1, 1)).unwrap_err();
        assert!(matches!(err, Error::AlreadyRecording));
        assert_eq!(recorder.trigger(), Some(&trigger()));
    }

    #[test]
    fn test_end_while_idle() {
        let mut recorder = Recorder::new();
        assert!(matches!(recorder.end(), Err(Error::NotRecording)));
        assert!(matches!(recorder.terminator(), Err(Error::NotRecording)));
    }

    #[test]
    fn test_recording_rewrites_and_summarizes() {
        let mut recorder = Recorder::new();
        recorder.begin(trigger()).unwrap();

        let entry = recorder
            .capture(&encoder::ibeacon::set_minor(7453), None)
            .unwrap()
            .unwrap();
        assert_eq!(
            entry.to_vec(),
            vec![0x0a, 0x02, 0x09, 0x03, 0x00, 0x07, 0x04, 0x02, 0x1d, 0x1d]
        );
        assert_eq!(recorder.captured().len(), 1);

        let summary = recorder.end().unwrap();
        assert_eq!(summary.entries, vec![entry]);
        assert_eq!(summary.terminator.to_vec(), vec![0x0a, 0x03, 0x00, 0x00]);
        assert!(!recorder.is_recording());
    }

    #[test]
    fn test_rewrite_does_not_record() {
        let mut recorder = Recorder::new();
        recorder.begin(trigger()).unwrap();
        let entry = recorder.rewrite(&encoder::ibeacon::enable(), None).unwrap();
        assert!(entry.is_some());
        assert!(recorder.captured().is_empty());
    }

    #[test]
    fn test_empty_recording_still_terminates() {
        let mut recorder = Recorder::new();
        recorder.begin(trigger()).unwrap();
        let summary = recorder.end().unwrap();
        assert!(summary.entries.is_empty());
        assert_eq!(summary.terminator.to_vec(), vec![0x0a, 0x03, 0x00, 0x00]);
    }
}
