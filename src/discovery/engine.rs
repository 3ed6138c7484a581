//! One discovery pass

use super::types::{DiscoveryKind, ITEM_LIST_FIELD};
use crate::auth::Authenticator;
use crate::config::CollectorConfig;
use crate::decode::{decode_payload, extract_path};
use crate::error::Result;
use crate::expr::is_truthy;
use crate::http::{preview, HttpExecutor};
use crate::job::Job;
use crate::template::TemplateContext;
use crate::types::{Collectible, JsonValue};
use serde_json::json;
use tracing::{debug, error, info};

/// Raw discovery payload and where it came from
struct Payload {
    body: String,
    content_type: Option<String>,
    source: Option<String>,
}

/// Run discovery and hand the resulting items to `job`
///
/// Items are sent with [`Job::add_results`] in batches of the configured
/// size, flushed once more at the end. A payload holding a single value is
/// sent with [`Job::add_result`] unless it is falsy (`null`, `0`, `""`,
/// `false`). Errors are logged and returned.
pub async fn discover(
    auth: &Authenticator,
    executor: &dyn HttpExecutor,
    config: &CollectorConfig,
    job: &dyn Job,
) -> Result<()> {
    let result = run(auth, executor, config, job).await;
    if let Err(ref e) = result {
        error!(job = job.id(), error = %e, "discovery failed");
    }
    result
}

async fn run(
    auth: &Authenticator,
    executor: &dyn HttpExecutor,
    config: &CollectorConfig,
    job: &dyn Job,
) -> Result<()> {
    auth.authenticate().await?;

    let discovery = &config.discovery;
    info!(job = job.id(), kind = discovery.kind.name(), "starting discovery");

    let payload = match &discovery.kind {
        DiscoveryKind::None => {
            return job.add_result(Collectible::fake_discover()).await;
        }
        DiscoveryKind::Http(template) => {
            let mut ctx = TemplateContext::new();
            ctx.set_time_range(&config.time_range);
            let mut request = template.render(&ctx, config.timeout)?;
            auth.apply(&mut request).await?;
            let url = request.url.clone();

            let response = executor.execute(request).await?;
            if !response.is_success() {
                return Err(response.status_error());
            }
            let content_type = response.content_type().map(str::to_string);
            Payload {
                body: response.text().await?,
                content_type,
                source: Some(url),
            }
        }
        DiscoveryKind::InlineJson(body) => Payload {
            body: body.clone(),
            content_type: None,
            source: discovery.source_url.clone(),
        },
        DiscoveryKind::InlineList(items) => {
            let records: Vec<JsonValue> = items.iter().map(|id| json!({ "id": id })).collect();
            Payload {
                body: json!({ ITEM_LIST_FIELD: records }).to_string(),
                content_type: Some("application/json".to_string()),
                source: discovery.source_url.clone(),
            }
        }
    };

    debug!(payload = %preview(payload.body.as_bytes(), 350), "discovery payload");
    let decoded = decode_payload(&payload.body, payload.content_type.as_deref())?;
    let data = match discovery.data_field.as_deref() {
        Some(field) => extract_path(&decoded, field)?,
        None => Some(decoded),
    };

    match data.filter(is_truthy) {
        Some(JsonValue::Array(records)) => {
            emit_batches(config, job, records, payload.source.as_deref()).await
        }
        None => {
            info!(job = job.id(), "discovery found nothing");
            Ok(())
        }
        Some(value) => {
            let mut item = Collectible::from_value(value);
            if let Some(source) = payload.source.as_deref() {
                item.set_default_source(source);
            }
            info!(job = job.id(), items = 1, "discovery complete");
            job.add_result(item).await
        }
    }
}

/// Filter records and flush them to the job in batches
async fn emit_batches(
    config: &CollectorConfig,
    job: &dyn Job,
    records: Vec<JsonValue>,
    source: Option<&str>,
) -> Result<()> {
    let strict = |name: &str| config.discovery.is_strict_field(name);
    let batch_size = config.batch_size.max(1);
    let mut batch = Vec::with_capacity(batch_size);
    let mut emitted = 0usize;
    let mut dropped = 0usize;

    for record in records {
        let mut item = Collectible::from_value(record);
        let keep = match config.filter.matches(&item.fields, &strict) {
            Ok(keep) => keep,
            Err(e) => {
                debug!(error = %e, "filter failed, dropping record");
                false
            }
        };
        if !keep {
            dropped += 1;
            continue;
        }

        if let Some(source) = source {
            item.set_default_source(source);
        }
        batch.push(item);
        emitted += 1;

        if batch.len() >= batch_size {
            job.add_results(std::mem::replace(
                &mut batch,
                Vec::with_capacity(batch_size),
            ))
            .await?;
        }
    }

    if !batch.is_empty() {
        job.add_results(batch).await?;
    }

    info!(job = job.id(), items = emitted, dropped, "discovery complete");
    Ok(())
}
