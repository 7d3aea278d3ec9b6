//! Record command implementation.
//!
//! Drives a simulated board through the switch counter macro: create a
//! counter fed by the switch, then record an iBeacon update that advertises
//! the count whenever the counter fires.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use beaconwire_core::{Board, ByteCommand, MockTransportBuilder, RecordingSummary};

use crate::cli::OutputFormat;
use crate::format::{FormatOptions, RecordingView, format_frames_csv, format_recording_text};
use crate::util::write_output;

/// Arguments for the record command.
#[derive(Debug, Clone)]
pub struct RecordArgs {
    pub board: String,
    pub counter_size: u8,
    /// Feed the minor number instead of the major.
    pub minor: bool,
}

/// Run the macro and return its summary with every frame the board sent.
pub async fn run_recording(args: &RecordArgs) -> Result<(RecordingSummary, Vec<ByteCommand>)> {
    let transport = Arc::new(MockTransportBuilder::new().auto_reply(true).build());
    let board = Arc::new(Board::new(args.board.clone(), transport.clone()));
    let listener = transport.take_replies().map(|replies| board.listen(replies));

    let counter = board
        .create_counter_resolved(&board.switch_state_signal(), args.counter_size)
        .await
        .context("Failed to create counter")?;

    board.begin_recording(&counter).await?;
    if args.minor {
        board.ibeacon().set_minor_signal(&counter).await?;
    } else {
        board.ibeacon().set_major_signal(&counter).await?;
    }
    let summary = board.end_recording().await?;

    if let Some(listener) = listener {
        listener.abort();
    }

    let frames = transport
        .history()
        .await
        .iter()
        .map(|frame| ByteCommand::from_bytes(frame))
        .collect::<Result<Vec<_>, _>>()
        .context("Board sent a malformed frame")?;
    Ok((summary, frames))
}

pub async fn cmd_record(
    args: RecordArgs,
    format: OutputFormat,
    output: Option<&PathBuf>,
    opts: &FormatOptions,
) -> Result<()> {
    let (summary, frames) = run_recording(&args).await?;
    tracing::info!(
        "Recorded {} entries on {} bound to {}",
        summary.entries.len(),
        args.board,
        summary.trigger
    );

    let content = match format {
        OutputFormat::Json => opts.as_json(&RecordingView::new(&args.board, &summary, &frames))?,
        OutputFormat::Text => format_recording_text(&args.board, &summary, &frames, opts),
        OutputFormat::Csv => format_frames_csv(&frames),
    };
    write_output(output, &content)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(counter_size: u8, minor: bool) -> RecordArgs {
        RecordArgs {
            board: "test".to_string(),
            counter_size,
            minor,
        }
    }

    #[tokio::test]
    async fn test_record_major_macro() {
        let (summary, frames) = run_recording(&args(4, false)).await.unwrap();
        let frames: Vec<Vec<u8>> = frames.iter().map(ByteCommand::to_vec).collect();
        assert_eq!(
            frames,
            vec![
                vec![0x09, 0x02, 0x01, 0x01, 0xff, 0x00, 0x02, 0x13],
                vec![0x0a, 0x02, 0x09, 0x03, 0x00, 0x07, 0x03, 0x02, 0x09, 0x00],
                vec![0x0a, 0x03, 0x00, 0x00],
            ]
        );
        assert_eq!(summary.entries.len(), 1);
        assert_eq!(summary.trigger.id(), 0);
    }

    #[tokio::test]
    async fn test_record_minor_macro() {
        let (_, frames) = run_recording(&args(2, true)).await.unwrap();
        assert_eq!(
            frames[1].to_vec(),
            vec![0x0a, 0x02, 0x09, 0x03, 0x00, 0x07, 0x04, 0x02, 0x05, 0x00]
        );
    }

    #[tokio::test]
    async fn test_record_rejects_bad_counter_size() {
        assert!(run_recording(&args(5, false)).await.is_err());
    }
}
