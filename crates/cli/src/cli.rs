//! CLI argument definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};

/// Channel Writer - resilient message publishing over a broker channel
#[derive(Parser, Debug)]
#[command(
    name = "channel-writer",
    author,
    version,
    about = "Resilient message publisher",
    long_about = "Publishes messages through a lazily acquired broker channel.\n\n\
                  A failed publish discards the channel; the next write acquires \n\
                  a fresh one. Closing the writer is permanent."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace), overriding
    /// observability.log_level
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "CHANNEL_WRITER_VERBOSE")]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format (overrides observability.log_format)
    #[arg(long, value_enum, global = true, env = "CHANNEL_WRITER_LOG_FORMAT")]
    pub log_format: Option<LogFormat>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Publish dispatches through a channel writer
    Publish(PublishArgs),

    /// Validate configuration file without publishing
    Validate(ValidateArgs),

    /// Fetch a JSON document from the configured document service
    Fetch(FetchArgs),
}

impl Commands {
    /// Configuration file the command reads
    pub fn config_path(&self) -> &Path {
        match self {
            Self::Publish(args) => &args.config,
            Self::Validate(args) => &args.config,
            Self::Fetch(args) => &args.config,
        }
    }
}

/// Arguments for the `publish` command
#[derive(Parser, Debug, Clone)]
pub struct PublishArgs {
    /// Path to configuration file (TOML or JSON)
    #[arg(
        short,
        long,
        default_value = "config.toml",
        env = "CHANNEL_WRITER_CONFIG"
    )]
    pub config: PathBuf,

    /// JSON Lines file of dispatches (one per line)
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Number of generated dispatches when no input file is given
    #[arg(long, default_value = "10", env = "CHANNEL_WRITER_COUNT")]
    pub count: u64,

    /// Destination for generated dispatches
    #[arg(long, default_value = "events")]
    pub destination: String,
}

/// Arguments for the `validate` command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Path to configuration file to validate
    #[arg(short, long, default_value = "config.toml")]
    pub config: PathBuf,

    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `fetch` command
#[derive(Parser, Debug)]
pub struct FetchArgs {
    /// Path to configuration file
    #[arg(
        short,
        long,
        default_value = "config.toml",
        env = "CHANNEL_WRITER_CONFIG"
    )]
    pub config: PathBuf,

    /// Document path, relative to documents.base_url
    pub path: String,
}

/// Log output format
#[derive(ValueEnum, Clone, Debug)]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable pretty format
    Pretty,
    /// Compact single-line format
    Compact,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_publish_defaults() {
        let cli = Cli::try_parse_from(["channel-writer", "publish", "-c", "writer.toml"]).unwrap();

        match cli.command {
            Commands::Publish(args) => {
                assert_eq!(args.config, PathBuf::from("writer.toml"));
                assert!(args.input.is_none());
                assert_eq!(args.count, 10);
                assert_eq!(args.destination, "events");
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_fetch_path() {
        let cli = Cli::try_parse_from([
            "channel-writer",
            "--log-format",
            "json",
            "fetch",
            "-c",
            "writer.toml",
            "/projections/42",
        ])
        .unwrap();

        assert!(matches!(cli.log_format, Some(LogFormat::Json)));
        assert_eq!(cli.command.config_path(), Path::new("writer.toml"));
        match cli.command {
            Commands::Fetch(args) => assert_eq!(args.path, "/projections/42"),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_quiet_conflicts_with_verbose() {
        let result = Cli::try_parse_from(["channel-writer", "-q", "-v", "validate"]);
        assert!(result.is_err());
    }
}
