//! Tests for decoder module

use super::*;
use serde_json::json;

// ============================================================================
// Content Type Tests
// ============================================================================

#[test]
fn test_format_from_content_type() {
    assert_eq!(
        PayloadFormat::from_content_type("application/json; charset=utf-8"),
        Some(PayloadFormat::Json)
    );
    assert_eq!(
        PayloadFormat::from_content_type("application/vnd.api+json"),
        Some(PayloadFormat::Json)
    );
    assert_eq!(
        PayloadFormat::from_content_type("text/xml"),
        Some(PayloadFormat::Xml)
    );
    assert_eq!(PayloadFormat::from_content_type("text/plain"), None);
}

// ============================================================================
// JSON Decoder Tests
// ============================================================================

#[test]
fn test_json_decoder() {
    let value = JsonDecoder.decode(r#"{"items": [{"id": 1}]}"#).unwrap();
    assert_eq!(value, json!({"items": [{"id": 1}]}));
}

#[test]
fn test_json_decoder_invalid() {
    let err = JsonDecoder.decode("{not json").unwrap_err();
    assert!(err.to_string().contains("invalid JSON"));
}

// ============================================================================
// XML Decoder Tests
// ============================================================================

#[test]
fn test_xml_decoder_nested_and_repeated() {
    let xml = r#"<?xml version="1.0"?>
        <response>
            <items>
                <item><id>1</id><name>first</name></item>
                <item><id>2</id><name>second &amp; last</name></item>
            </items>
            <total>2</total>
        </response>"#;

    let value = XmlDecoder.decode(xml).unwrap();
    assert_eq!(
        value,
        json!({
            "response": {
                "items": {
                    "item": [
                        {"id": 1, "name": "first"},
                        {"id": 2, "name": "second & last"}
                    ]
                },
                "total": 2
            }
        })
    );
}

#[test]
fn test_xml_decoder_attributes_and_self_closing() {
    let xml = r#"<hosts><host name="a" port="80"/><host name="b"/><empty/></hosts>"#;
    let value = XmlDecoder.decode(xml).unwrap();
    assert_eq!(
        value,
        json!({
            "hosts": {
                "host": [{"name": "a", "port": "80"}, {"name": "b"}],
                "empty": null
            }
        })
    );
}

#[test]
fn test_xml_decoder_cdata_and_comments() {
    let xml = "<root><!-- note --><msg><![CDATA[<raw>]]></msg></root>";
    let value = XmlDecoder.decode(xml).unwrap();
    assert_eq!(value, json!({"root": {"msg": "<raw>"}}));
}

#[test]
fn test_xml_decoder_mismatched_tags() {
    let err = XmlDecoder.decode("<a><b></a></b>").unwrap_err();
    assert!(err.to_string().contains("expected </b>"));
}

// ============================================================================
// decode_payload Tests
// ============================================================================

#[test]
fn test_decode_payload_declared_type() {
    let value = decode_payload(r#"{"a": 1}"#, Some("application/json")).unwrap();
    assert_eq!(value, json!({"a": 1}));

    let value = decode_payload("<a>1</a>", Some("application/xml")).unwrap();
    assert_eq!(value, json!({"a": 1}));
}

#[test]
fn test_decode_payload_sniffs_json_then_xml() {
    let value = decode_payload(r#"[1, 2]"#, Some("text/plain")).unwrap();
    assert_eq!(value, json!([1, 2]));

    let value = decode_payload("<a><b>x</b></a>", None).unwrap();
    assert_eq!(value, json!({"a": {"b": "x"}}));
}

#[test]
fn test_decode_payload_unsupported() {
    let err = decode_payload("hello world", Some("text/plain")).unwrap_err();
    assert!(matches!(err, crate::error::Error::Parse { .. }));
    assert!(err.to_string().contains("text/plain"));
}

// ============================================================================
// Path Extraction Tests
// ============================================================================

#[test]
fn test_extract_simple_path() {
    let value = json!({
        "data": {"items": [{"id": 1}, {"id": 2}, {"id": 3}]}
    });

    assert_eq!(
        extract_path(&value, "data.items").unwrap(),
        Some(json!([{"id": 1}, {"id": 2}, {"id": 3}]))
    );
    assert_eq!(
        extract_path(&value, "data.items[0].id").unwrap(),
        Some(json!(1))
    );
    assert_eq!(
        extract_path(&value, "data.items[-1]").unwrap(),
        Some(json!({"id": 3}))
    );
    assert_eq!(
        extract_path(&value, "$.data.items[1].id").unwrap(),
        Some(json!(2))
    );
    assert_eq!(extract_path(&value, "data.missing").unwrap(), None);
    assert_eq!(extract_path(&value, "data.items[9]").unwrap(), None);
}

#[test]
fn test_extract_jsonpath_wildcard() {
    let value = json!({
        "groups": [
            {"hosts": [{"name": "a"}]},
            {"hosts": [{"name": "b"}]}
        ]
    });

    let found = extract_path(&value, "$.groups[*].hosts[*].name").unwrap();
    assert_eq!(found, Some(json!(["a", "b"])));
}
