//! Tests for pagination module

use super::*;
use reqwest::header::{HeaderMap, HeaderValue};
use serde_json::json;

fn headers(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
    let mut map = HeaderMap::new();
    for (name, value) in pairs {
        map.append(*name, HeaderValue::from_static(*value));
    }
    map
}

// ============================================================================
// NextPage Tests
// ============================================================================

#[test]
fn test_next_page_with_param() {
    let next = NextPage::with_param("page", "2");
    assert!(next.is_continue());
    assert!(!next.is_done());

    if let NextPage::Continue { query_params, url } = next {
        assert_eq!(query_params.get("page"), Some(&"2".to_string()));
        assert!(url.is_none());
    } else {
        panic!("Expected Continue");
    }
}

#[test]
fn test_next_page_from_token() {
    assert_eq!(
        NextPage::from_token("cursor", "https://api.example.com/items?page=2"),
        NextPage::with_url("https://api.example.com/items?page=2")
    );
    assert_eq!(
        NextPage::from_token("cursor", "/items?page=2"),
        NextPage::with_url("/items?page=2")
    );
    assert_eq!(
        NextPage::from_token("cursor", "abc123"),
        NextPage::with_param("cursor", "abc123")
    );
}

// ============================================================================
// PaginationState Tests
// ============================================================================

#[test]
fn test_pagination_state_limit() {
    let mut state = PaginationState::new(1, 3);
    assert!(!state.at_limit());
    state.next_page();
    state.next_page();
    assert_eq!(state.page, 3);
    assert!(state.at_limit());

    // Zero means unlimited
    let state = PaginationState::new(500, 0);
    assert!(!state.at_limit());
}

// ============================================================================
// PaginationConfig Tests
// ============================================================================

#[test]
fn test_pagination_config_accessors() {
    assert!(PaginationConfig::default().is_none());
    assert_eq!(PaginationConfig::None.max_pages(), 0);

    let config = PaginationConfig::response_body("meta.next", 5);
    assert_eq!(config.max_pages(), 5);
    assert_eq!(config.kind(), "response_body");
    assert!(config.paginator().needs_body());

    let config = PaginationConfig::link_header("next", Some("self".into()), 2);
    assert_eq!(config.kind(), "response_header_link");
    assert!(!config.paginator().needs_body());
}

// ============================================================================
// Response Header Tests
// ============================================================================

#[test]
fn test_response_header_paginator_url_token() {
    let paginator = ResponseHeaderPaginator::new("X-Next-Page");
    let mut state = PaginationState::new(1, 10);

    let next = paginator.process_response(
        &headers(&[("x-next-page", "https://api.example.com/items?page=2")]),
        None,
        &mut state,
    );
    assert_eq!(next, NextPage::with_url("https://api.example.com/items?page=2"));
    assert_eq!(state.page, 2);
}

#[test]
fn test_response_header_paginator_cursor_token() {
    let paginator = ResponseHeaderPaginator::new("x-cursor");
    let mut state = PaginationState::new(1, 10);

    let next = paginator.process_response(&headers(&[("x-cursor", "abc")]), None, &mut state);
    assert_eq!(next, NextPage::with_param("x-cursor", "abc"));
}

#[test]
fn test_response_header_paginator_missing_or_empty() {
    let paginator = ResponseHeaderPaginator::new("x-cursor");

    let mut state = PaginationState::new(1, 10);
    assert!(paginator
        .process_response(&HeaderMap::new(), None, &mut state)
        .is_done());
    assert!(state.done);

    let mut state = PaginationState::new(1, 10);
    assert!(paginator
        .process_response(&headers(&[("x-cursor", "")]), None, &mut state)
        .is_done());
}

#[test]
fn test_max_pages_is_hard_stop() {
    let paginator = ResponseHeaderPaginator::new("x-cursor");
    let mut state = PaginationState::new(1, 2);
    let always_more = headers(&[("x-cursor", "more")]);

    assert!(paginator
        .process_response(&always_more, None, &mut state)
        .is_continue());
    assert_eq!(state.page, 2);
    assert!(paginator
        .process_response(&always_more, None, &mut state)
        .is_done());
    assert!(state.done);
    assert_eq!(state.page, 2);
}

// ============================================================================
// Response Body Tests
// ============================================================================

#[test]
fn test_response_body_paginator_nested_cursor() {
    let paginator = ResponseBodyPaginator::new("meta.next_cursor");
    let mut state = PaginationState::new(1, 0);
    let body = json!({"items": [], "meta": {"next_cursor": "c2"}});

    let next = paginator.process_response(&HeaderMap::new(), Some(&body), &mut state);
    assert_eq!(next, NextPage::with_param("next_cursor", "c2"));
}

#[test]
fn test_response_body_paginator_numeric_and_url() {
    let paginator = ResponseBodyPaginator::new("next");
    let mut state = PaginationState::new(1, 0);

    let body = json!({"next": 3});
    assert_eq!(
        paginator.process_response(&HeaderMap::new(), Some(&body), &mut state),
        NextPage::with_param("next", "3")
    );

    let body = json!({"next": "https://api.example.com/p/4"});
    assert_eq!(
        paginator.process_response(&HeaderMap::new(), Some(&body), &mut state),
        NextPage::with_url("https://api.example.com/p/4")
    );
}

#[test]
fn test_response_body_paginator_stops() {
    let paginator = ResponseBodyPaginator::new("next");

    for body in [json!({"next": null}), json!({"next": ""}), json!({})] {
        let mut state = PaginationState::new(1, 0);
        assert!(paginator
            .process_response(&HeaderMap::new(), Some(&body), &mut state)
            .is_done());
    }

    let mut state = PaginationState::new(1, 0);
    assert!(paginator
        .process_response(&HeaderMap::new(), None, &mut state)
        .is_done());
}

// ============================================================================
// Link Header Tests
// ============================================================================

#[test]
fn test_link_header_paginator_continues() {
    let paginator = LinkHeaderPaginator::default();
    let mut state = PaginationState::new(1, 0);
    let h = headers(&[(
        "link",
        r#"<https://api.github.com/repos?page=2>; rel="next", <https://api.github.com/repos?page=5>; rel="last""#,
    )]);

    let next = paginator.process_response(&h, None, &mut state);
    assert_eq!(next, NextPage::with_url("https://api.github.com/repos?page=2"));
}

#[test]
fn test_link_header_paginator_stops_no_next() {
    let paginator = LinkHeaderPaginator::default();
    let mut state = PaginationState::new(1, 0);
    let h = headers(&[("link", r#"<https://api.example.com/?page=1>; rel="prev""#)]);

    assert!(paginator.process_response(&h, None, &mut state).is_done());
    assert!(paginator
        .process_response(&HeaderMap::new(), None, &mut PaginationState::new(1, 0))
        .is_done());
}

#[test]
fn test_link_header_paginator_loop_guard() {
    let paginator = LinkHeaderPaginator::new("next", Some("self".into()));
    let mut state = PaginationState::new(1, 0);
    let h = headers(&[(
        "link",
        r#"<https://api.example.com/?page=3>; rel="self", <https://api.example.com/?page=3>; rel="next""#,
    )]);

    assert!(paginator.process_response(&h, None, &mut state).is_done());
}

#[test]
fn test_link_header_paginator_custom_relations() {
    let paginator = LinkHeaderPaginator::new("next-archive", Some("current".into()));
    let mut state = PaginationState::new(1, 0);
    let h = headers(&[(
        "link",
        r#"<https://feed.example.com/2024>; rel="current", <https://feed.example.com/2023>; rel="prev-archive next-archive""#,
    )]);

    let next = paginator.process_response(&h, None, &mut state);
    assert_eq!(next, NextPage::with_url("https://feed.example.com/2023"));
}

#[test]
fn test_link_header_url_with_commas() {
    let paginator = LinkHeaderPaginator::default();
    let mut state = PaginationState::new(1, 0);
    let h = headers(&[(
        "link",
        r#"<https://api.example.com/items?ids=1,2&page=1>; rel="prev", <https://api.example.com/items?ids=1,2&page=2>; rel="next""#,
    )]);

    let next = paginator.process_response(&h, None, &mut state);
    assert_eq!(
        next,
        NextPage::with_url("https://api.example.com/items?ids=1,2&page=2")
    );
}

#[test]
fn test_no_paginator() {
    let mut state = PaginationState::new(1, 0);
    assert!(NoPaginator
        .process_response(&HeaderMap::new(), None, &mut state)
        .is_done());
    assert!(state.done);
}
