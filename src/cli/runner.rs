//! CLI runner - executes commands

use crate::cli::commands::{Cli, Commands, OutputFormat};
use crate::config::CollectorConfig;
use crate::engine::RestCollector;
use crate::error::{Error, Result};
use crate::job::MemoryJob;
use crate::loader::{load_definition, load_definition_from_str, CollectorDefinition};
use crate::types::parse_time_bound;
use serde_json::{json, Value};
use std::path::Path;
use std::sync::Arc;
use tokio::io::AsyncWriteExt;

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        match &self.cli.command {
            Commands::Validate => self.validate(),
            Commands::Discover => self.discover().await,
            Commands::Collect {
                concurrency,
                output,
                earliest,
                latest,
            } => {
                self.collect(
                    *concurrency,
                    output.as_deref(),
                    earliest.as_deref(),
                    latest.as_deref(),
                )
                .await
            }
        }
    }

    /// Load collector settings
    fn load_definition(&self) -> Result<CollectorDefinition> {
        // Inline settings take precedence
        if let Some(text) = &self.cli.config_json {
            return load_definition_from_str(text);
        }
        let path = self.cli.config.as_ref().ok_or_else(|| {
            Error::config("Collector settings not specified (use -c or --config-json)")
        })?;
        load_definition(path)
    }

    /// Load and validate settings
    fn load_config(&self) -> Result<CollectorConfig> {
        CollectorConfig::from_definition(&self.load_definition()?)
    }

    /// Validate settings and print a summary
    fn validate(&self) -> Result<()> {
        let config = self.load_config()?;
        self.output_message(&summary(&config));
        Ok(())
    }

    /// Run discovery and print the items
    async fn discover(&self) -> Result<()> {
        let collector = RestCollector::new(self.load_config()?)?;
        let job = MemoryJob::new("cli-discover");
        collector.discover(&job).await?;

        for item in job.take_items() {
            self.output_message(&item.to_value());
        }
        Ok(())
    }

    /// Run a whole collection job
    async fn collect(
        &self,
        concurrency: usize,
        output: Option<&Path>,
        earliest: Option<&str>,
        latest: Option<&str>,
    ) -> Result<()> {
        let mut config = self.load_config()?;
        if let Some(earliest) = earliest {
            config.time_range.earliest = Some(
                parse_time_bound(earliest).map_err(|m| Error::invalid_value("earliest", m))?,
            );
        }
        if let Some(latest) = latest {
            config.time_range.latest =
                Some(parse_time_bound(latest).map_err(|m| Error::invalid_value("latest", m))?);
        }

        let collector = RestCollector::new(config)?;
        let job = Arc::new(MemoryJob::new("cli-collect"));

        let stats = match output {
            Some(path) => {
                let mut file = tokio::fs::File::create(path).await?;
                let stats = collector.run(job.clone(), concurrency, &mut file).await?;
                file.flush().await?;
                stats
            }
            None => {
                let mut stdout = tokio::io::stdout();
                collector.run(job.clone(), concurrency, &mut stdout).await?
            }
        };

        for (message, severity) in job.error_messages() {
            eprintln!("[{severity}] {message}");
        }
        eprintln!("{stats}");

        if stats.errors > 0 {
            return Err(Error::Other(format!(
                "{} error(s) reported during collection",
                stats.errors
            )));
        }
        Ok(())
    }

    /// Output a message
    fn output_message(&self, msg: &Value) {
        match self.cli.format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string(msg).unwrap_or_default());
            }
            OutputFormat::Pretty => {
                println!("{}", serde_json::to_string_pretty(msg).unwrap_or_default());
            }
        }
    }
}

/// Summary of a validated config
fn summary(config: &CollectorConfig) -> Value {
    json!({
        "valid": true,
        "authentication": config.auth.kind(),
        "discovery": config.discovery.kind.name(),
        "collect_url": config.collect.url,
        "pagination": config.pagination.kind(),
        "max_pages": config.pagination.max_pages(),
        "filter": config.filter.source(),
        "batch_size": config.batch_size,
        "timeout_secs": config.timeout.as_secs(),
        "earliest": config.time_range.earliest_epoch(),
        "latest": config.time_range.latest_epoch(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_summary() {
        let def = load_definition_from_str(
            r"
collect_url: https://api.example.com/events
authentication: basicSecret
username: u
password: p
pagination:
  type: response_header
  attribute: x-next
  max_pages: 5
",
        )
        .unwrap();
        let config = CollectorConfig::from_definition(&def).unwrap();

        let value = summary(&config);
        assert_eq!(value["authentication"], "basic");
        assert_eq!(value["discovery"], "none");
        assert_eq!(value["pagination"], "response_header");
        assert_eq!(value["max_pages"], 5);
        assert_eq!(value["batch_size"], 10);
    }

    #[tokio::test]
    async fn test_runner_requires_settings() {
        let cli = Cli::try_parse_from(["rest-collector", "validate"]).unwrap();
        let err = Runner::new(cli).run().await.unwrap_err();
        assert!(err.is_config());
    }
}
