//! CLI argument definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Output format for commands
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    Csv,
}

impl OutputFormat {
    /// Parse a format name as stored in the config file.
    pub fn from_config(name: &str) -> Option<Self> {
        <Self as ValueEnum>::from_str(name, true).ok()
    }
}

#[derive(Debug, Parser)]
#[command(name = "beaconwire")]
#[command(author, version, about = "Encode and record commands for beacon peripherals", long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write output to file instead of stdout
    #[arg(short, long, global = true)]
    pub output: Option<PathBuf>,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Reusable output format arguments
#[derive(Debug, Clone, Args)]
pub struct OutputArgs {
    /// Output format (defaults to the config file's format, then text)
    #[arg(short, long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Use compact JSON output
    #[arg(long)]
    pub compact: bool,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Encode one operation and print its frame
    Encode {
        /// Operation name, as listed by `beaconwire opcodes`
        operation: String,

        /// Operation arguments
        #[arg(allow_negative_numbers = true)]
        args: Vec<String>,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// List the opcode table
    Opcodes {
        #[command(flatten)]
        output: OutputArgs,
    },

    /// Record a counter-driven iBeacon macro on a simulated board
    Record {
        /// Counter width in bytes (1-4)
        #[arg(short = 's', long)]
        counter_size: Option<u8>,

        /// Feed the counter into the minor number instead of the major
        #[arg(long)]
        minor: bool,

        /// Board name shown in events
        #[arg(short, long)]
        board: Option<String>,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Manage CLI configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Print the config file path
    Path,
    /// Show the current configuration
    Show,
    /// Set a configuration value
    Set {
        /// Key (format, board, counter_size)
        key: String,
        /// Value
        value: String,
    },
    /// Reset a configuration value to its default
    Unset {
        /// Key (format, board, counter_size)
        key: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_encode_accepts_negative_values() {
        let cli = Cli::try_parse_from(["beaconwire", "encode", "set-rx-power", "-55"]).unwrap();
        match cli.command {
            Commands::Encode {
                operation, args, ..
            } => {
                assert_eq!(operation, "set-rx-power");
                assert_eq!(args, vec!["-55"]);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_format_from_config() {
        assert_eq!(OutputFormat::from_config("json"), Some(OutputFormat::Json));
        assert_eq!(OutputFormat::from_config("TEXT"), Some(OutputFormat::Text));
        assert_eq!(OutputFormat::from_config("yaml"), None);
    }
}
