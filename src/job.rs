//! Job contract between the collector and its host
//!
//! Discovery hands work items to a [`Job`] in batches; collect reports errors
//! to it. [`MemoryJob`] keeps everything in memory for tests and the CLI.

use crate::error::{Error, Result};
use crate::types::Collectible;
use async_trait::async_trait;
use std::fmt;
use std::sync::Mutex;

/// How badly a reported error affects the job
///
/// The collector itself only reports [`Severity::JobFatal`]: status and
/// transport errors fail the job even when earlier pages already reached the
/// consumer, since the collected output is incomplete. `Recoverable` is for
/// hosts that report their own non-fatal conditions through the same channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// The job can carry on
    Recoverable,
    /// The job should be marked failed
    JobFatal,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Recoverable => f.write_str("recoverable"),
            Severity::JobFatal => f.write_str("job_fatal"),
        }
    }
}

/// Sink for discovered items and error channel for one collection job
#[async_trait]
pub trait Job: Send + Sync {
    /// Job identifier used in log lines
    fn id(&self) -> &str;

    /// Accept a single discovered item
    async fn add_result(&self, item: Collectible) -> Result<()>;

    /// Accept a batch of discovered items
    async fn add_results(&self, items: Vec<Collectible>) -> Result<()>;

    /// Record an error
    async fn report_error(&self, error: Error, severity: Severity) -> Result<()>;
}

/// An error as recorded by [`MemoryJob`]
#[derive(Debug)]
pub struct ReportedError {
    /// The error
    pub error: Error,
    /// Its severity
    pub severity: Severity,
}

/// In-memory [`Job`]
#[derive(Debug, Default)]
pub struct MemoryJob {
    id: String,
    batches: Mutex<Vec<Vec<Collectible>>>,
    errors: Mutex<Vec<ReportedError>>,
}

impl MemoryJob {
    /// Create an empty job
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    /// Batch sizes in arrival order; single items count as a batch of one
    pub fn batch_sizes(&self) -> Vec<usize> {
        lock(&self.batches).iter().map(Vec::len).collect()
    }

    /// Every item received, flattened in arrival order
    pub fn items(&self) -> Vec<Collectible> {
        lock(&self.batches).iter().flatten().cloned().collect()
    }

    /// Take all received items, leaving the job empty
    pub fn take_items(&self) -> Vec<Collectible> {
        std::mem::take(&mut *lock(&self.batches))
            .into_iter()
            .flatten()
            .collect()
    }

    /// Number of reported errors
    pub fn error_count(&self) -> usize {
        lock(&self.errors).len()
    }

    /// Rendered messages of reported errors with their severity
    pub fn error_messages(&self) -> Vec<(String, Severity)> {
        lock(&self.errors)
            .iter()
            .map(|r| (r.error.to_string(), r.severity))
            .collect()
    }

    /// Take all reported errors
    pub fn take_errors(&self) -> Vec<ReportedError> {
        std::mem::take(&mut *lock(&self.errors))
    }
}

/// Lock a mutex, recovering the data if a holder panicked
fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex
        .lock()
        .unwrap_or_else(std::sync::PoisonError::into_inner)
}

#[async_trait]
impl Job for MemoryJob {
    fn id(&self) -> &str {
        &self.id
    }

    async fn add_result(&self, item: Collectible) -> Result<()> {
        lock(&self.batches).push(vec![item]);
        Ok(())
    }

    async fn add_results(&self, items: Vec<Collectible>) -> Result<()> {
        if !items.is_empty() {
            lock(&self.batches).push(items);
        }
        Ok(())
    }

    async fn report_error(&self, error: Error, severity: Severity) -> Result<()> {
        lock(&self.errors).push(ReportedError { error, severity });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_memory_job_batches() {
        let job = MemoryJob::new("job-1");
        job.add_results(vec![
            Collectible::from_value(json!("a")),
            Collectible::from_value(json!("b")),
        ])
        .await
        .unwrap();
        job.add_results(Vec::new()).await.unwrap();
        job.add_result(Collectible::from_value(json!("c"))).await.unwrap();

        assert_eq!(job.id(), "job-1");
        assert_eq!(job.batch_sizes(), vec![2, 1]);
        assert_eq!(job.items().len(), 3);
        assert_eq!(job.take_items().len(), 3);
        assert!(job.items().is_empty());
    }

    #[tokio::test]
    async fn test_memory_job_errors() {
        let job = MemoryJob::new("job-2");
        tokio_test::assert_ok!(
            job.report_error(Error::parse("bad payload"), Severity::JobFatal)
                .await
        );

        assert_eq!(job.error_count(), 1);
        let (message, severity) = &job.error_messages()[0];
        assert!(message.contains("bad payload"));
        assert_eq!(*severity, Severity::JobFatal);
        assert_eq!(job.take_errors().len(), 1);
        assert_eq!(job.error_count(), 0);
    }
}
