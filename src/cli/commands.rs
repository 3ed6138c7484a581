//! CLI commands and argument parsing

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Generic REST collector CLI
#[derive(Parser, Debug)]
#[command(name = "rest-collector")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Collector settings file (YAML or JSON)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Inline collector settings (JSON)
    #[arg(long, global = true)]
    pub config_json: Option<String>,

    /// Output format for validate and discover
    #[arg(short, long, global = true, default_value = "json")]
    pub format: OutputFormat,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Validate collector settings
    Validate,

    /// Run discovery and print one item per line
    Discover,

    /// Run discovery and collect every item
    Collect {
        /// Items collected at the same time
        #[arg(long, default_value = "4")]
        concurrency: usize,

        /// Write collected bytes to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Lower time bound (epoch seconds or RFC 3339)
        #[arg(long)]
        earliest: Option<String>,

        /// Upper time bound (epoch seconds or RFC 3339)
        #[arg(long)]
        latest: Option<String>,
    },
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output (one message per line)
    Json,
    /// Human-readable output
    Pretty,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_collect() {
        let cli = Cli::try_parse_from([
            "rest-collector",
            "-c",
            "collector.yaml",
            "collect",
            "--concurrency",
            "8",
            "--earliest",
            "1700000000",
            "-v",
        ])
        .unwrap();

        assert!(cli.verbose);
        assert_eq!(cli.config, Some(PathBuf::from("collector.yaml")));
        match cli.command {
            Commands::Collect {
                concurrency,
                earliest,
                output,
                ..
            } => {
                assert_eq!(concurrency, 8);
                assert_eq!(earliest.as_deref(), Some("1700000000"));
                assert!(output.is_none());
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_parse_inline_settings() {
        let cli = Cli::try_parse_from([
            "rest-collector",
            "--config-json",
            r#"{"collect_url": "https://x"}"#,
            "--format",
            "pretty",
            "validate",
        ])
        .unwrap();

        assert!(cli.config_json.is_some());
        assert_eq!(cli.format, OutputFormat::Pretty);
        assert!(matches!(cli.command, Commands::Validate));
    }
}
