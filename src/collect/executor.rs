//! Per-item collect request

use super::stream::CollectStream;
use crate::auth::Authenticator;
use crate::config::CollectorConfig;
use crate::error::{Error, Result};
use crate::http::{ActivePagination, HttpExecutor, HttpResponse, RequestDescriptor};
use crate::job::{Job, Severity};
use crate::pagination::PageCounter;
use crate::template::TemplateContext;
use crate::types::{Collectible, PAGE_NUM_FIELD};
use futures::StreamExt;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Chunks buffered between the monitor and the consumer
const COLLECT_CHANNEL_CAPACITY: usize = 32;

/// Start collecting one work item
///
/// Failures before a response exists are reported to `job` and returned.
/// Once a response is in hand the stream is returned straight away; the
/// monitor reports a failed page or a non-2xx first response to `job`, while
/// the body bytes of that response still reach the consumer. Every report is
/// [`Severity::JobFatal`].
///
/// `item` is taken by value. Its page counter starts at `__pageNum` (1 when
/// unset) and is not written back to the caller's item; read the current page
/// through [`CollectStream::page_num`].
pub async fn collect(
    auth: &Authenticator,
    executor: &dyn HttpExecutor,
    config: &CollectorConfig,
    mut item: Collectible,
    job: Arc<dyn Job>,
) -> Result<CollectStream> {
    let page = *item.page_num.get_or_insert(1);
    let counter = PageCounter::new(page);

    let response = match start(auth, executor, config, &item, &counter).await {
        Ok(response) => response,
        Err(e) => {
            report(job.as_ref(), e.report_copy()).await;
            return Err(e);
        }
    };

    let status = response.status();
    info!(job = job.id(), status, request = %response.target(), "collect started");

    let failure = (!response.is_success()).then(|| response.status_error());
    let (tx, rx) = mpsc::channel(COLLECT_CHANNEL_CAPACITY);
    let monitor = tokio::spawn(async move {
        let mut body = response.into_stream();
        let mut bytes = 0usize;
        while let Some(chunk) = body.next().await {
            match chunk {
                Ok(chunk) => {
                    bytes += chunk.len();
                    if tx.send(chunk).await.is_err() {
                        debug!("collect consumer went away");
                        break;
                    }
                }
                Err(e) => {
                    report(job.as_ref(), e).await;
                    break;
                }
            }
        }
        if let Some(failure) = failure {
            report(job.as_ref(), failure).await;
        }
        debug!(job = job.id(), bytes, "collect finished");
    });

    Ok(CollectStream::new(rx, counter, monitor))
}

/// Authenticate, render and send the first request
async fn start(
    auth: &Authenticator,
    executor: &dyn HttpExecutor,
    config: &CollectorConfig,
    item: &Collectible,
    counter: &PageCounter,
) -> Result<HttpResponse> {
    auth.authenticate().await?;

    let mut ctx = TemplateContext::from_fields(&item.fields);
    ctx.insert(PAGE_NUM_FIELD, counter.get())
        .set_time_range(&config.time_range);

    let mut request = config.collect.render(&ctx, config.timeout)?;
    if let Some(url) = item.url_override() {
        request.url = url.to_string();
    }
    auth.apply(&mut request).await?;
    attach_pagination(&mut request, config, counter);
    request.stream = true;

    debug!(url = %request.url, params = ?request.params, "collect request");
    executor.execute(request).await
}

fn attach_pagination(request: &mut RequestDescriptor, config: &CollectorConfig, counter: &PageCounter) {
    if !config.pagination.is_none() {
        request.pagination = Some(ActivePagination {
            config: config.pagination.clone(),
            counter: counter.clone(),
        });
    }
}

/// Hand an error to the job; a job that refuses it is only logged
async fn report(job: &dyn Job, error: Error) {
    let message = error.to_string();
    if let Err(e) = job.report_error(error, Severity::JobFatal).await {
        warn!(job = job.id(), error = %message, reason = %e, "failed to report collect error");
    } else {
        debug!(job = job.id(), error = %message, "reported collect error");
    }
}
