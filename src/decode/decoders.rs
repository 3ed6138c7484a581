//! Decoder implementations
//!
//! JSON and XML decoders plus field-path extraction.

use super::types::{PayloadDecoder, PayloadFormat};
use crate::error::{Error, Result};
use serde_json::{Map, Value};
use tracing::debug;

// ============================================================================
// JSON Decoder
// ============================================================================

/// JSON decoder
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonDecoder;

impl PayloadDecoder for JsonDecoder {
    fn decode(&self, body: &str) -> Result<Value> {
        serde_json::from_str(body).map_err(|e| Error::parse(format!("invalid JSON: {e}")))
    }
}

// ============================================================================
// XML Decoder
// ============================================================================

/// XML decoder producing `{ root: { child: ..., ... } }`
///
/// Attributes become fields of their element, repeated child elements become
/// arrays and text-only elements become scalars.
#[derive(Debug, Clone, Copy, Default)]
pub struct XmlDecoder;

impl PayloadDecoder for XmlDecoder {
    fn decode(&self, body: &str) -> Result<Value> {
        let mut parser = XmlParser { src: body, pos: 0 };
        parser.skip_misc();
        let (name, value) = parser.element()?;
        parser.skip_misc();
        if parser.pos < parser.src.len() {
            return Err(Error::parse("invalid XML: content after root element"));
        }
        let mut root = Map::new();
        root.insert(name, value);
        Ok(Value::Object(root))
    }
}

/// Decode a payload by declared content type, sniffing JSON then XML otherwise
pub fn decode_payload(body: &str, content_type: Option<&str>) -> Result<Value> {
    match content_type.and_then(PayloadFormat::from_content_type) {
        Some(PayloadFormat::Json) => JsonDecoder.decode(body),
        Some(PayloadFormat::Xml) => XmlDecoder.decode(body),
        None => JsonDecoder
            .decode(body)
            .or_else(|json_err| {
                debug!(error = %json_err, "payload is not JSON, trying XML");
                XmlDecoder.decode(body)
            })
            .map_err(|_| {
                Error::parse(format!(
                    "unsupported content type: {}",
                    content_type.unwrap_or("<none>")
                ))
            }),
    }
}

struct XmlParser<'a> {
    src: &'a str,
    pos: usize,
}

impl XmlParser<'_> {
    fn rest(&self) -> &str {
        &self.src[self.pos..]
    }

    fn skip_whitespace(&mut self) {
        let trimmed = self.rest().trim_start();
        self.pos = self.src.len() - trimmed.len();
    }

    fn skip_past(&mut self, marker: &str) -> Result<()> {
        match self.rest().find(marker) {
            Some(i) => {
                self.pos += i + marker.len();
                Ok(())
            }
            None => Err(Error::parse(format!("invalid XML: missing '{marker}'"))),
        }
    }

    /// Skip declarations, comments and doctypes
    fn skip_misc(&mut self) {
        loop {
            self.skip_whitespace();
            let rest = self.rest();
            let marker = if rest.starts_with("<?") {
                "?>"
            } else if rest.starts_with("<!--") {
                "-->"
            } else if rest.starts_with("<!") {
                ">"
            } else {
                return;
            };
            if self.skip_past(marker).is_err() {
                self.pos = self.src.len();
                return;
            }
        }
    }

    fn name(&mut self) -> Result<String> {
        let rest = self.rest();
        let end = rest
            .find(|c: char| c.is_whitespace() || c == '>' || c == '/' || c == '=')
            .unwrap_or(rest.len());
        if end == 0 {
            return Err(Error::parse("invalid XML: expected a name"));
        }
        let name = rest[..end].to_string();
        self.pos += end;
        Ok(name)
    }

    fn element(&mut self) -> Result<(String, Value)> {
        if !self.rest().starts_with('<') {
            return Err(Error::parse("invalid XML: expected '<'"));
        }
        self.pos += 1;
        let name = self.name()?;
        let mut fields = Map::new();

        // Attributes
        loop {
            self.skip_whitespace();
            let rest = self.rest();
            if rest.starts_with("/>") {
                self.pos += 2;
                let value = if fields.is_empty() {
                    Value::Null
                } else {
                    Value::Object(fields)
                };
                return Ok((name, value));
            }
            if rest.starts_with('>') {
                self.pos += 1;
                break;
            }
            let attr = self.name()?;
            self.skip_whitespace();
            if !self.rest().starts_with('=') {
                return Err(Error::parse(format!(
                    "invalid XML: attribute '{attr}' has no value"
                )));
            }
            self.pos += 1;
            self.skip_whitespace();
            let quote = self
                .rest()
                .chars()
                .next()
                .filter(|c| *c == '"' || *c == '\'')
                .ok_or_else(|| Error::parse("invalid XML: unquoted attribute value"))?;
            self.pos += 1;
            let end = self
                .rest()
                .find(quote)
                .ok_or_else(|| Error::parse("invalid XML: unterminated attribute value"))?;
            let raw = &self.rest()[..end];
            fields.insert(attr, Value::String(unescape_entities(raw)));
            self.pos += end + 1;
        }

        // Content
        let mut text = String::new();
        let mut has_children = false;
        loop {
            let rest = self.rest();
            if rest.is_empty() {
                return Err(Error::parse(format!(
                    "invalid XML: missing closing tag for {name}"
                )));
            }
            if let Some(after) = rest.strip_prefix("</") {
                let end = after
                    .find('>')
                    .ok_or_else(|| Error::parse("invalid XML: unterminated closing tag"))?;
                let closing = after[..end].trim();
                if closing != name {
                    return Err(Error::parse(format!(
                        "invalid XML: expected </{name}>, found </{closing}>"
                    )));
                }
                self.pos += 2 + end + 1;
                break;
            }
            if rest.starts_with("<![CDATA[") {
                self.pos += "<![CDATA[".len();
                let end = self
                    .rest()
                    .find("]]>")
                    .ok_or_else(|| Error::parse("invalid XML: unterminated CDATA"))?;
                text.push_str(&self.rest()[..end]);
                self.pos += end + 3;
                continue;
            }
            if rest.starts_with("<!--") || rest.starts_with("<?") {
                self.skip_misc();
                continue;
            }
            if rest.starts_with('<') {
                let (child, value) = self.element()?;
                has_children = true;
                match fields.get_mut(&child) {
                    Some(Value::Array(items)) => items.push(value),
                    Some(existing) => {
                        let first = existing.take();
                        *existing = Value::Array(vec![first, value]);
                    }
                    None => {
                        fields.insert(child, value);
                    }
                }
                continue;
            }
            let end = rest.find('<').unwrap_or(rest.len());
            text.push_str(&unescape_entities(&rest[..end]));
            self.pos += end;
        }

        let text = text.trim();
        let value = if has_children || !fields.is_empty() {
            if !text.is_empty() {
                fields.insert("_text".to_string(), parse_text_value(text));
            }
            Value::Object(fields)
        } else if text.is_empty() {
            Value::Null
        } else {
            parse_text_value(text)
        };
        Ok((name, value))
    }
}

fn unescape_entities(s: &str) -> String {
    s.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

/// Parse text content into appropriate JSON value
fn parse_text_value(text: &str) -> Value {
    // Try integer
    if let Ok(n) = text.parse::<i64>() {
        return Value::Number(n.into());
    }

    // Try float
    if let Ok(n) = text.parse::<f64>() {
        if let Some(num) = serde_json::Number::from_f64(n) {
            return Value::Number(num);
        }
    }

    // Try boolean
    match text.to_lowercase().as_str() {
        "true" => return Value::Bool(true),
        "false" => return Value::Bool(false),
        _ => {}
    }

    Value::String(text.to_string())
}

// ============================================================================
// Path Extraction
// ============================================================================

/// Extract the portion of a payload addressed by a field path
///
/// Plain paths use dot notation with optional `[i]` indexes (negative indexes
/// count from the end). Paths containing `*` or starting with `$..` go
/// through JSONPath.
pub fn extract_path(value: &Value, path: &str) -> Result<Option<Value>> {
    if path.contains('*') || path.starts_with("$..") {
        return extract_with_jsonpath(value, path).map(Some);
    }
    Ok(extract_simple_path(value, path))
}

/// Extract a value using simple dot-notation path
fn extract_simple_path(value: &Value, path: &str) -> Option<Value> {
    let path = path.strip_prefix("$.").unwrap_or(path);
    let mut current = value;

    for part in path.split('.').filter(|p| !p.is_empty()) {
        // Handle array indexing like "data[0]" or "items[-1]"
        if let Some(bracket_pos) = part.find('[') {
            let name = &part[..bracket_pos];
            let index_str = part[bracket_pos + 1..].trim_end_matches(']');

            if !name.is_empty() {
                current = current.get(name)?;
            }

            let index = index_str.parse::<i64>().ok()?;
            let Value::Array(arr) = current else {
                return None;
            };
            #[allow(clippy::cast_possible_wrap)]
            let idx = if index < 0 {
                arr.len() as i64 + index
            } else {
                index
            };
            current = arr.get(usize::try_from(idx).ok()?)?;
        } else {
            current = current.get(part)?;
        }
    }

    Some(current.clone())
}

/// Extract values using jsonpath-rust
fn extract_with_jsonpath(value: &Value, path: &str) -> Result<Value> {
    use jsonpath_rust::JsonPath;

    let path = if path.starts_with('$') {
        path.to_string()
    } else {
        format!("$.{path}")
    };

    let jp = JsonPath::try_from(path.as_str()).map_err(|e| Error::JsonPath {
        message: format!("Invalid JSONPath: {e}"),
    })?;

    Ok(jp.find(value))
}
