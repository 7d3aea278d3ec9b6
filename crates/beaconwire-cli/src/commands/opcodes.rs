//! Opcodes command implementation.

use std::path::PathBuf;

use anyhow::Result;
use beaconwire_types::OPCODES;

use crate::cli::OutputFormat;
use crate::format::{FormatOptions, OpcodeView, format_opcodes_csv, format_opcodes_text};
use crate::util::write_output;

pub fn cmd_opcodes(
    format: OutputFormat,
    output: Option<&PathBuf>,
    opts: &FormatOptions,
) -> Result<()> {
    let content = match format {
        OutputFormat::Json => {
            let rows: Vec<OpcodeView> = OPCODES.iter().map(OpcodeView::from).collect();
            opts.as_json(&rows)?
        }
        OutputFormat::Text => format_opcodes_text(OPCODES, opts),
        OutputFormat::Csv => format_opcodes_csv(OPCODES),
    };
    write_output(output, &content)
}
