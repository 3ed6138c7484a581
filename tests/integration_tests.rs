//! Integration tests using mock HTTP server
//!
//! Tests the full end-to-end flow: settings → validation → login → discovery
//! → paginated collect → bytes written

use rest_collector::{
    load_definition, load_definition_from_str, CollectorConfig, Error, MemoryJob, RestCollector,
};
use serde_json::json;
use std::io::Write;
use std::sync::Arc;
use wiremock::matchers::{header, header_exists, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn collector(yaml: &str) -> RestCollector {
    let def = load_definition_from_str(yaml).unwrap();
    RestCollector::from_definition(&def).unwrap()
}

// ============================================================================
// Full Pipeline Tests
// ============================================================================

#[tokio::test]
async fn test_login_discover_filter_and_paginated_collect() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {"access_token": "xyz"}
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/hosts"))
        .and(header("authorization", "Bearer xyz"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "hosts": [
                {"host": "web-1", "env": "prod"},
                {"host": "web-2", "env": "dev"},
                {"host": "db-1"}
            ]
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    // web-1: two pages linked by a body cursor
    Mock::given(method("GET"))
        .and(path("/hosts/web-1/events"))
        .and(query_param("cursor", "c2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "events": [2], "meta": {"cursor": null}
        })))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/hosts/web-1/events"))
        .and(query_param("since", "1700000000"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "events": [1], "meta": {"cursor": "c2"}
        })))
        .with_priority(10)
        .expect(1)
        .mount(&mock_server)
        .await;

    // db-1 has no env, so the filter cannot exclude it
    Mock::given(method("GET"))
        .and(path("/hosts/db-1/events"))
        .and(header_exists("authorization"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "events": [3], "meta": {}
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let yaml = format!(
        r#"
authentication: loginSecret
username: admin
password: s3cret
login_url: "{uri}/login"
login_method: post
login_body: '{{"user": "{{{{ username }}}}", "pass": "{{{{ password }}}}"}}'
token_resp_attribute: data.access_token
auth_header_expr: "`Bearer ${{token}}`"
discovery:
  discover_type: http
  discover_url: "{uri}/hosts"
  discover_data_field: hosts
filter: "env == 'prod'"
collect_url: "{uri}/hosts/{{{{ host }}}}/events"
collect_request_params:
  - name: since
    value: "{{{{ earliest }}}}"
pagination:
  type: response_body
  attribute: meta.cursor
  max_pages: 0
earliest: 1700000000
"#,
        uri = mock_server.uri()
    );

    let collector = collector(&yaml);
    let job = Arc::new(MemoryJob::new("pipeline"));
    let mut out = Vec::new();
    let stats = collector.run(job.clone(), 2, &mut out).await.unwrap();

    assert_eq!(stats.items_discovered, 2);
    assert_eq!(stats.items_collected, 2);
    assert_eq!(stats.errors, 0);

    let text = String::from_utf8(out).unwrap();
    assert!(text.contains(r#""events":[1]"#));
    assert!(text.contains(r#""events":[2]"#));
    assert!(text.contains(r#""events":[3]"#));
}

#[tokio::test]
async fn test_invalid_pagination_fails_before_any_request() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let yaml = format!(
        "collect_url: {}/events\npagination:\n  type: response_header\n  max_pages: 2\n",
        mock_server.uri()
    );
    let def = load_definition_from_str(&yaml).unwrap();
    let err = RestCollector::from_definition(&def).unwrap_err();

    assert!(matches!(
        err,
        Error::MissingConfigField { ref field } if field == "pagination.attribute"
    ));
}

#[tokio::test]
async fn test_inline_list_discovery_defaults_source() {
    let collector = collector(
        r#"
collect_url: "https://api.example.com/items/{{ id }}"
discovery:
  discover_type: list
  discover_url: https://inventory.example.com/catalog
  item_list: [a, b]
"#,
    );

    let job = MemoryJob::new("list");
    collector.discover(&job).await.unwrap();

    let items: Vec<_> = job.items().iter().map(|i| i.to_value()).collect();
    assert_eq!(
        items,
        vec![
            json!({"id": "a", "source": "https://inventory.example.com/catalog"}),
            json!({"id": "b", "source": "https://inventory.example.com/catalog"}),
        ]
    );
}

#[tokio::test]
async fn test_link_header_pagination_stops_on_self_loop() {
    let mock_server = MockServer::start().await;
    let page2 = format!("{}/feed?page=2", mock_server.uri());

    Mock::given(method("GET"))
        .and(path("/feed"))
        .and(query_param("page", "2"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header(
                    "link",
                    format!(r#"<{page2}>; rel="next", <{page2}>; rel="self""#).as_str(),
                )
                .set_body_string("second\n"),
        )
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/feed"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("link", format!(r#"<{page2}>; rel="next""#).as_str())
                .set_body_string("first\n"),
        )
        .with_priority(10)
        .expect(1)
        .mount(&mock_server)
        .await;

    let collector = collector(&format!(
        r"
collect_url: {}/feed
pagination:
  type: response_header_link
  max_pages: 10
  cur_relation_attribute: self
",
        mock_server.uri()
    ));

    let job = Arc::new(MemoryJob::new("link"));
    let mut out = Vec::new();
    let stats = collector.run(job, 1, &mut out).await.unwrap();

    assert_eq!(stats.items_discovered, 1);
    assert_eq!(out, b"first\nsecond\n".to_vec());
}

#[tokio::test]
async fn test_collect_failure_reported_with_target() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/broken"))
        .respond_with(ResponseTemplate::new(500).set_body_string("partial"))
        .mount(&mock_server)
        .await;

    let collector = collector(&format!("collect_url: {}/broken\n", mock_server.uri()));
    let job = Arc::new(MemoryJob::new("broken"));
    let mut out = Vec::new();
    let stats = collector.run(job.clone(), 1, &mut out).await.unwrap();

    assert_eq!(out, b"partial".to_vec());
    assert_eq!(stats.errors, 1);

    let errors = job.take_errors();
    match &errors[0].error {
        Error::HttpStatus { status, target } => {
            assert_eq!(*status, 500);
            assert_eq!(target.path, "/broken");
            assert_eq!(target.port, mock_server.address().port());
            assert_eq!(target.method.to_string(), "GET");
        }
        other => panic!("expected status error, got {other:?}"),
    }
}

// ============================================================================
// Settings File Tests
// ============================================================================

#[tokio::test]
async fn test_settings_file_with_basic_auth() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/secure"))
        .and(header("authorization", "Basic dXNlcjpwYXNz"))
        .respond_with(ResponseTemplate::new(200).set_body_string("granted"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "authentication: basicSecret").unwrap();
    writeln!(file, "username: user").unwrap();
    writeln!(file, "password: pass").unwrap();
    writeln!(file, "collect_url: {}/secure", mock_server.uri()).unwrap();

    let def = load_definition(file.path()).unwrap();
    let config = CollectorConfig::from_definition(&def).unwrap();
    assert_eq!(config.auth.kind(), "basic");

    let collector = RestCollector::new(config).unwrap();
    let job = Arc::new(MemoryJob::new("basic"));
    let mut out = Vec::new();
    collector.run(job, 1, &mut out).await.unwrap();
    assert_eq!(out, b"granted".to_vec());
}
