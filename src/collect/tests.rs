//! Tests for the collect module

use super::*;
use crate::auth::{AuthConfig, Authenticator};
use crate::config::CollectorConfig;
use crate::error::Error;
use crate::http::{HttpClient, HttpExecutor, RequestTemplate};
use crate::job::{MemoryJob, Severity};
use crate::pagination::PaginationConfig;
use crate::types::{Collectible, Method, RequestMethod, TimeRange};
use futures::StreamExt;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{header_exists, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

struct Harness {
    auth: Authenticator,
    executor: Arc<dyn HttpExecutor>,
    job: Arc<MemoryJob>,
}

impl Harness {
    fn new(config: &CollectorConfig) -> Self {
        let executor: Arc<dyn HttpExecutor> = Arc::new(HttpClient::new().unwrap());
        Self {
            auth: Authenticator::new(config.auth.clone(), executor.clone(), config.timeout),
            executor,
            job: Arc::new(MemoryJob::new("collect-test")),
        }
    }

    async fn collect(
        &self,
        config: &CollectorConfig,
        item: Collectible,
    ) -> crate::error::Result<CollectStream> {
        collect(&self.auth, self.executor.as_ref(), config, item, self.job.clone()).await
    }
}

fn config_for(url: String) -> CollectorConfig {
    CollectorConfig::new(RequestTemplate::new(url, RequestMethod::Get))
        .with_timeout(Duration::from_secs(5))
}

#[tokio::test]
async fn test_collect_renders_item_fields_and_time_range() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/hosts/web-1/events"))
        .and(query_param("from", "100"))
        .and(query_param("to", "200"))
        .respond_with(ResponseTemplate::new(200).set_body_string("event-a\nevent-b\n"))
        .expect(1)
        .mount(&server)
        .await;

    let config = CollectorConfig::new(
        RequestTemplate::new(
            format!("{}/hosts/{{{{ host }}}}/events", server.uri()),
            RequestMethod::Get,
        )
        .with_params(vec![
            ("from".to_string(), "{{ earliest }}".to_string()),
            ("to".to_string(), "{{ latest }}".to_string()),
        ]),
    )
    .with_time_range(TimeRange::from_epoch(Some(100), Some(200)));

    let harness = Harness::new(&config);
    let item = Collectible::from_value(json!({"host": "web-1"}));
    let stream = harness.collect(&config, item).await.unwrap();

    assert_eq!(stream.page_num(), 1);
    let body = stream.read_all().await;
    assert_eq!(&body[..], b"event-a\nevent-b\n");
    assert_eq!(harness.job.error_count(), 0);
}

#[tokio::test]
async fn test_collect_error_status_reported_once_and_body_delivered() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/events"))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream exploded"))
        .expect(1)
        .mount(&server)
        .await;

    let config = config_for(format!("{}/events", server.uri()));
    let harness = Harness::new(&config);
    let stream = harness
        .collect(&config, Collectible::fake_discover())
        .await
        .unwrap();

    let body = stream.read_all().await;
    assert_eq!(&body[..], b"upstream exploded");

    let errors = harness.job.take_errors();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].severity, Severity::JobFatal);
    match &errors[0].error {
        Error::HttpStatus { status, target } => {
            assert_eq!(*status, 500);
            assert_eq!(target.host, "127.0.0.1");
            assert_eq!(target.port, server.address().port());
            assert_eq!(target.path, "/events");
            assert_eq!(target.method, Method::Get);
        }
        other => panic!("expected status error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_collect_url_override() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/override"))
        .respond_with(ResponseTemplate::new(200).set_body_string("overridden"))
        .expect(1)
        .mount(&server)
        .await;

    let config = config_for(format!("{}/default", server.uri()));
    let harness = Harness::new(&config);
    let item = Collectible::from_value(json!({
        "urlOverride": format!("{}/override", server.uri())
    }));

    let body = harness.collect(&config, item).await.unwrap().read_all().await;
    assert_eq!(&body[..], b"overridden");
}

#[tokio::test]
async fn test_collect_max_pages_hard_stop() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("next_token", "more")
                .set_body_string("page;"),
        )
        .expect(3)
        .mount(&server)
        .await;

    let config = config_for(server.uri())
        .with_pagination(PaginationConfig::response_header("next_token", 3));
    let harness = Harness::new(&config);
    let mut stream = harness
        .collect(&config, Collectible::fake_discover())
        .await
        .unwrap();

    let mut body = Vec::new();
    while let Some(chunk) = stream.next().await {
        body.extend_from_slice(&chunk);
    }
    assert_eq!(stream.page_num(), 3);
    stream.finish().await;

    assert_eq!(&body[..], b"page;page;page;");
    assert_eq!(harness.job.error_count(), 0);
}

#[tokio::test]
async fn test_collect_resumes_from_item_page() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/feed"))
        .and(query_param("page", "4"))
        .respond_with(ResponseTemplate::new(200).set_body_string("fourth"))
        .expect(1)
        .mount(&server)
        .await;

    let config = CollectorConfig::new(
        RequestTemplate::new(format!("{}/feed", server.uri()), RequestMethod::Get)
            .with_params(vec![("page".to_string(), "{{ __pageNum }}".to_string())]),
    );
    let harness = Harness::new(&config);
    let item = Collectible::from_value(json!({"__pageNum": 4}));
    let stream = harness.collect(&config, item).await.unwrap();

    assert_eq!(stream.page_num(), 4);
    assert_eq!(&stream.read_all().await[..], b"fourth");
}

#[tokio::test]
async fn test_collect_page_counter_lives_on_stream() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("only"))
        .mount(&server)
        .await;

    let config = config_for(server.uri());
    let harness = Harness::new(&config);
    let item = Collectible::fake_discover();
    let stream = harness.collect(&config, item.clone()).await.unwrap();

    assert_eq!(stream.page_num(), 1);
    assert_eq!(item.page_num, None);
    stream.finish().await;
}

#[tokio::test]
async fn test_collect_failed_later_page_reported() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/events"))
        .and(query_param("cursor", "p2"))
        .respond_with(ResponseTemplate::new(502))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/events"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("cursor", "p2")
                .set_body_string("first;"),
        )
        .with_priority(10)
        .expect(1)
        .mount(&server)
        .await;

    let config = config_for(format!("{}/events", server.uri()))
        .with_pagination(PaginationConfig::response_header("cursor", 0));
    let harness = Harness::new(&config);
    let body = harness
        .collect(&config, Collectible::fake_discover())
        .await
        .unwrap()
        .read_all()
        .await;

    assert_eq!(&body[..], b"first;");
    let errors = harness.job.take_errors();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].error.status(), Some(502));
    // a page failing after earlier pages were delivered still fails the job
    assert_eq!(errors[0].severity, Severity::JobFatal);
}

#[tokio::test]
async fn test_collect_transport_failure_reported_and_returned() {
    let config = config_for("http://127.0.0.1:1/unreachable".to_string());
    let harness = Harness::new(&config);

    let err = harness
        .collect(&config, Collectible::fake_discover())
        .await
        .unwrap_err();

    assert!(err.is_transport());
    assert_eq!(harness.job.error_count(), 1);
}

#[tokio::test]
async fn test_collect_missing_template_field_reported() {
    let config = config_for("https://api.example.com/{{ host }}".to_string());
    let harness = Harness::new(&config);

    let err = harness
        .collect(&config, Collectible::fake_discover())
        .await
        .unwrap_err();

    assert!(matches!(err, Error::UndefinedVariable { .. }));
    assert_eq!(harness.job.error_count(), 1);
}

#[tokio::test]
async fn test_collect_sends_basic_auth() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(header_exists("authorization"))
        .respond_with(ResponseTemplate::new(200).set_body_string("secret data"))
        .expect(1)
        .mount(&server)
        .await;

    let config = config_for(server.uri()).with_auth(AuthConfig::basic("user", "pass").unwrap());
    let harness = Harness::new(&config);
    let body = harness
        .collect(&config, Collectible::fake_discover())
        .await
        .unwrap()
        .read_all()
        .await;

    assert_eq!(&body[..], b"secret data");
}
