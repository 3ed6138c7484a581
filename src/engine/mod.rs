//! Execution engine module
//!
//! Collector facade and job driver.
//!
//! # Overview
//!
//! The engine module provides:
//! - `RestCollector` - Wires config, executor and authenticator together
//! - `RunStats` - Statistics for a whole collection run

mod types;

pub use types::RunStats;

use crate::auth::Authenticator;
use crate::collect::{self, CollectStream};
use crate::config::CollectorConfig;
use crate::discovery;
use crate::error::{Error, Result};
use crate::http::{HttpClient, HttpExecutor};
use crate::job::{Job, MemoryJob, Severity};
use crate::loader::CollectorDefinition;
use crate::types::Collectible;
use async_trait::async_trait;
use futures::{stream, StreamExt};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tracing::{info, warn};

/// A configured REST collector
///
/// Discovery and collect share one authenticator, so a login happens at
/// most once however many items are collected.
pub struct RestCollector {
    config: Arc<CollectorConfig>,
    executor: Arc<dyn HttpExecutor>,
    auth: Arc<Authenticator>,
}

impl RestCollector {
    /// Create a collector backed by a reqwest client
    pub fn new(config: CollectorConfig) -> Result<Self> {
        let client = HttpClient::with_config(config.http.clone())?;
        Ok(Self::with_executor(config, Arc::new(client)))
    }

    /// Validate settings and create a collector
    pub fn from_definition(def: &CollectorDefinition) -> Result<Self> {
        Self::new(CollectorConfig::from_definition(def)?)
    }

    /// Create a collector sending requests through `executor`
    pub fn with_executor(config: CollectorConfig, executor: Arc<dyn HttpExecutor>) -> Self {
        let auth = Authenticator::new(config.auth.clone(), executor.clone(), config.timeout);
        Self {
            config: Arc::new(config),
            executor,
            auth: Arc::new(auth),
        }
    }

    /// The validated configuration
    pub fn config(&self) -> &CollectorConfig {
        &self.config
    }

    /// The shared authenticator
    pub fn authenticator(&self) -> &Authenticator {
        &self.auth
    }

    /// Run discovery, handing items to `job`
    pub async fn discover(&self, job: &dyn Job) -> Result<()> {
        discovery::discover(&self.auth, self.executor.as_ref(), &self.config, job).await
    }

    /// Start collecting one item
    pub async fn collect(&self, item: Collectible, job: Arc<dyn Job>) -> Result<CollectStream> {
        collect::collect(&self.auth, self.executor.as_ref(), &self.config, item, job).await
    }

    /// Run a whole job: discover, then collect up to `concurrency` items at
    /// a time, writing every body to `writer` in completion order
    ///
    /// Discovery failures are reported to `job` and abort the run. Collect
    /// failures are reported by the collect executor and counted.
    pub async fn run<W>(&self, job: Arc<dyn Job>, concurrency: usize, writer: &mut W) -> Result<RunStats>
    where
        W: AsyncWrite + Unpin + Send,
    {
        let start = Instant::now();
        let counting = Arc::new(CountingJob::new(job));
        let mut stats = RunStats::new();

        let discovered = MemoryJob::new(counting.id());
        if let Err(e) = self.discover(&discovered).await {
            if let Err(report_err) = counting.report_error(e.report_copy(), Severity::JobFatal).await {
                warn!(error = %report_err, "failed to report discovery error");
            }
            return Err(e);
        }
        let items = discovered.take_items();
        stats.items_discovered = items.len();
        info!(job = counting.id(), items = items.len(), concurrency, "collecting");

        let sink: Arc<dyn Job> = counting.clone();
        let mut bodies = stream::iter(items)
            .map(|item| {
                let job = sink.clone();
                async move {
                    let stream = self.collect(item, job).await?;
                    Ok::<_, Error>(stream.read_all().await)
                }
            })
            .buffer_unordered(concurrency.max(1));

        while let Some(result) = bodies.next().await {
            // Failures were already reported by the collect executor
            let Ok(body) = result else { continue };
            writer.write_all(&body).await?;
            stats.add_collected(body.len());
        }
        writer.flush().await?;

        stats.errors = counting.errors();
        stats.set_duration(start.elapsed().as_millis() as u64);
        info!(job = counting.id(), stats = %stats, "run complete");
        Ok(stats)
    }
}

impl std::fmt::Debug for RestCollector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RestCollector")
            .field("config", &self.config)
            .field("auth", &self.auth)
            .finish_non_exhaustive()
    }
}

/// Forwards to a job, counting reported errors
struct CountingJob {
    inner: Arc<dyn Job>,
    errors: AtomicUsize,
}

impl CountingJob {
    fn new(inner: Arc<dyn Job>) -> Self {
        Self {
            inner,
            errors: AtomicUsize::new(0),
        }
    }

    fn errors(&self) -> usize {
        self.errors.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl Job for CountingJob {
    fn id(&self) -> &str {
        self.inner.id()
    }

    async fn add_result(&self, item: Collectible) -> Result<()> {
        self.inner.add_result(item).await
    }

    async fn add_results(&self, items: Vec<Collectible>) -> Result<()> {
        self.inner.add_results(items).await
    }

    async fn report_error(&self, error: Error, severity: Severity) -> Result<()> {
        self.errors.fetch_add(1, Ordering::Relaxed);
        self.inner.report_error(error, severity).await
    }
}
