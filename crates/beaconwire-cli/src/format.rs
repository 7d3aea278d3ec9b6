//! Output formatting utilities for text, JSON, and CSV output.

use anyhow::Result;
use owo_colors::OwoColorize;
use serde::Serialize;

use beaconwire_core::{ByteCommand, RecordingSummary, Signal};
use beaconwire_types::protocol::{self, Opcode, PayloadSchema};

/// Formatting options for output.
#[derive(Debug, Clone, Copy, Default)]
pub struct FormatOptions {
    /// Disable colored output.
    pub no_color: bool,
    /// Use compact JSON output (no pretty-printing).
    pub compact: bool,
}

impl FormatOptions {
    pub fn new(no_color: bool, compact: bool) -> Self {
        Self { no_color, compact }
    }

    /// Serialize value to JSON string, respecting compact option.
    pub fn as_json<T: Serialize>(&self, value: &T) -> Result<String> {
        let json = if self.compact {
            serde_json::to_string(value)?
        } else {
            serde_json::to_string_pretty(value)?
        };
        Ok(json + "\n")
    }
}

/// Escape a value for CSV output.
///
/// Wraps the value in quotes if it contains commas, quotes, or newlines.
#[must_use]
pub fn csv_escape(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') || s.contains('\r') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

/// Human-readable payload layout.
#[must_use]
pub fn schema_label(schema: PayloadSchema) -> String {
    match schema {
        PayloadSchema::Bool => "bool".to_string(),
        PayloadSchema::U8 => "u8".to_string(),
        PayloadSchema::Pair => "u8 u8".to_string(),
        PayloadSchema::U16Le => "u16 le".to_string(),
        PayloadSchema::I8 => "i8".to_string(),
        PayloadSchema::Bytes(n) => format!("{} bytes", n),
        PayloadSchema::Dynamic => "dynamic".to_string(),
    }
}

/// JSON view of one encoded frame.
#[derive(Debug, Serialize)]
pub struct FrameView {
    pub operation: Option<&'static str>,
    pub module: u8,
    pub register: u8,
    pub hex: String,
    pub bytes: Vec<u8>,
}

impl From<&ByteCommand> for FrameView {
    fn from(cmd: &ByteCommand) -> Self {
        Self {
            operation: protocol::find(cmd.module(), cmd.register()).map(|row| row.name),
            module: cmd.module(),
            register: cmd.register(),
            hex: cmd.to_hex(),
            bytes: cmd.to_vec(),
        }
    }
}

/// JSON view of one opcode table row.
#[derive(Debug, Serialize)]
pub struct OpcodeView {
    pub name: &'static str,
    pub module: u8,
    pub register: u8,
    pub payload: String,
}

impl From<&Opcode> for OpcodeView {
    fn from(row: &Opcode) -> Self {
        Self {
            name: row.name,
            module: row.module,
            register: row.register,
            payload: schema_label(row.schema),
        }
    }
}

/// JSON view of a recording session.
#[derive(Debug, Serialize)]
pub struct RecordingView {
    pub board: String,
    pub counter: Signal,
    pub frames: Vec<FrameView>,
    pub entries: usize,
}

impl RecordingView {
    pub fn new(board: &str, summary: &RecordingSummary, frames: &[ByteCommand]) -> Self {
        Self {
            board: board.to_string(),
            counter: summary.trigger,
            frames: frames.iter().map(FrameView::from).collect(),
            entries: summary.entries.len(),
        }
    }
}

// --- Frames ---

#[must_use]
pub fn format_frame_text(cmd: &ByteCommand, opts: &FormatOptions) -> String {
    let name = protocol::find(cmd.module(), cmd.register()).map_or("unknown", |row| row.name);
    if opts.no_color {
        format!("{:<22} {}\n", name, cmd.to_hex())
    } else {
        format!("{:<22} {}\n", name.bold(), cmd.to_hex().cyan())
    }
}

#[must_use]
pub fn format_frames_csv(frames: &[ByteCommand]) -> String {
    let mut out = String::from("operation,module,register,hex\n");
    for cmd in frames {
        let name = protocol::find(cmd.module(), cmd.register()).map_or("unknown", |row| row.name);
        out.push_str(&format!(
            "{},0x{:02x},0x{:02x},{}\n",
            csv_escape(name),
            cmd.module(),
            cmd.register(),
            cmd.to_hex()
        ));
    }
    out
}

// --- Opcode table ---

#[must_use]
pub fn format_opcodes_text(rows: &[Opcode], opts: &FormatOptions) -> String {
    let mut out = format!(
        "{:<22} {:<6} {:<8} {}\n",
        "OPERATION", "MODULE", "REGISTER", "PAYLOAD"
    );
    for row in rows {
        let name = if opts.no_color {
            row.name.to_string()
        } else {
            row.name.bold().to_string()
        };
        // Pad before styling so escape codes do not skew the columns
        let padding = " ".repeat(22usize.saturating_sub(row.name.len()));
        out.push_str(&format!(
            "{}{} 0x{:02x}   0x{:02x}     {}\n",
            name,
            padding,
            row.module,
            row.register,
            schema_label(row.schema)
        ));
    }
    out
}

#[must_use]
pub fn format_opcodes_csv(rows: &[Opcode]) -> String {
    let mut out = String::from("operation,module,register,payload\n");
    for row in rows {
        out.push_str(&format!(
            "{},0x{:02x},0x{:02x},{}\n",
            csv_escape(row.name),
            row.module,
            row.register,
            csv_escape(&schema_label(row.schema))
        ));
    }
    out
}

// --- Recording ---

#[must_use]
pub fn format_recording_text(
    board: &str,
    summary: &RecordingSummary,
    frames: &[ByteCommand],
    opts: &FormatOptions,
) -> String {
    let mut out = format!("Board:    {}\n", board);
    out.push_str(&format!("Counter:  {}\n", summary.trigger));
    out.push_str(&format!("Entries:  {}\n\n", summary.entries.len()));
    for cmd in frames {
        out.push_str("  ");
        out.push_str(&format_frame_text(cmd, opts));
    }
    out
}
