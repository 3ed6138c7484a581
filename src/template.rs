//! Template interpolation for request templates
//!
//! Handles `{{ name }}` interpolation in urls, params, headers and bodies.
//! Names resolve against the work item's fields plus the run's time bounds,
//! with dotted access like `{{ meta.region }}`.

use crate::error::{Error, Result};
use crate::types::{JsonObject, JsonValue, TimeRange};
use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

/// Regex for matching template variables: {{ variable.path }}
static TEMPLATE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{\s*([a-zA-Z_][a-zA-Z0-9_]*(?:\.[a-zA-Z_][a-zA-Z0-9_]*)*)\s*\}\}")
        .expect("template regex is valid")
});

/// Named values available to a template
#[derive(Debug, Clone, Default)]
pub struct TemplateContext {
    values: JsonObject,
}

impl TemplateContext {
    /// Create a new empty context
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a context holding the given fields
    pub fn from_fields(fields: &JsonObject) -> Self {
        Self {
            values: fields.clone(),
        }
    }

    /// Set a single value
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<JsonValue>) -> &mut Self {
        self.values.insert(name.into(), value.into());
        self
    }

    /// Bind `earliest` and `latest` (epoch seconds) when set
    pub fn set_time_range(&mut self, range: &TimeRange) -> &mut Self {
        if let Some(earliest) = range.earliest_epoch() {
            self.insert("earliest", earliest);
        }
        if let Some(latest) = range.latest_epoch() {
            self.insert("latest", latest);
        }
        self
    }

    /// Get a value by path (e.g., "meta.region")
    pub fn get(&self, path: &str) -> Option<&Value> {
        let mut parts = path.split('.');
        let mut current = self.values.get(parts.next()?)?;
        for part in parts {
            match current {
                Value::Object(map) => {
                    current = map.get(part)?;
                }
                _ => return None,
            }
        }
        Some(current)
    }
}

/// Render a template string with the given context
pub fn render(template: &str, ctx: &TemplateContext) -> Result<String> {
    if !has_templates(template) {
        return Ok(template.to_string());
    }

    let mut missing = Vec::new();
    let rendered = TEMPLATE_REGEX.replace_all(template, |cap: &regex::Captures<'_>| {
        let var_path = &cap[1];
        match ctx.get(var_path) {
            Some(value) => value_to_string(value),
            None => {
                missing.push(var_path.to_string());
                String::new()
            }
        }
    });

    if missing.is_empty() {
        Ok(rendered.into_owned())
    } else {
        Err(Error::undefined_var(missing.join(", ")))
    }
}

/// Render every value of an ordered list of pairs
pub fn render_pairs(
    pairs: &[(String, String)],
    ctx: &TemplateContext,
) -> Result<Vec<(String, String)>> {
    pairs
        .iter()
        .map(|(name, value)| Ok((name.clone(), render(value, ctx)?)))
        .collect()
}

/// Check if a string contains template variables
pub fn has_templates(s: &str) -> bool {
    TEMPLATE_REGEX.is_match(s)
}

/// Convert a JSON value to a string for template substitution
fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        // For complex types, use JSON serialization
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}
