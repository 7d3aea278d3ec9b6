mod cli;
mod commands;
mod config;
mod format;
mod util;

use std::io;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Commands};
use crate::commands::{RecordArgs, cmd_config, cmd_encode, cmd_opcodes, cmd_record};
use crate::config::{Config, resolve_board, resolve_counter_size, resolve_format};
use crate::format::FormatOptions;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Handle completions command early (before tracing init)
    if let Commands::Completions { shell } = cli.command {
        let mut cmd = Cli::command();
        clap_complete::generate(shell, &mut cmd, "beaconwire", &mut io::stdout());
        return Ok(());
    }

    // When quiet mode is enabled, suppress info-level logging
    let filter = if cli.quiet {
        EnvFilter::new("warn")
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let config = Config::load();
    let output = cli.output.as_ref();
    if let Some(path) = output {
        tracing::debug!("Output will be written to: {}", path.display());
    }

    match cli.command {
        Commands::Encode {
            operation,
            args,
            output: out,
        } => {
            let format = resolve_format(out.format, &config);
            let opts = FormatOptions::new(cli.no_color, out.compact);
            cmd_encode(&operation, &args, format, output, &opts)?;
        }
        Commands::Opcodes { output: out } => {
            let format = resolve_format(out.format, &config);
            let opts = FormatOptions::new(cli.no_color, out.compact);
            cmd_opcodes(format, output, &opts)?;
        }
        Commands::Record {
            counter_size,
            minor,
            board,
            output: out,
        } => {
            let format = resolve_format(out.format, &config);
            let opts = FormatOptions::new(cli.no_color, out.compact);
            let args = RecordArgs {
                board: resolve_board(board, &config),
                counter_size: resolve_counter_size(counter_size, &config),
                minor,
            };
            cmd_record(args, format, output, &opts).await?;
        }
        Commands::Config { action } => {
            cmd_config(action, cli.quiet)?;
        }
        Commands::Completions { .. } => {
            // Already handled above
            unreachable!()
        }
    }

    Ok(())
}
