//! Discovery descriptor types

use crate::http::RequestTemplate;

/// Field path used by inline item lists
pub const ITEM_LIST_FIELD: &str = "items";

/// Where discovered items come from
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum DiscoveryKind {
    /// No discovery; a single placeholder item is emitted
    #[default]
    None,
    /// Items fetched with an HTTP request
    Http(RequestTemplate),
    /// Items read from a literal JSON or XML payload
    InlineJson(String),
    /// Items built from a list of identifiers
    InlineList(Vec<String>),
}

impl DiscoveryKind {
    /// Type name as used in settings files
    pub fn name(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Http(_) => "http",
            Self::InlineJson(_) => "json",
            Self::InlineList(_) => "list",
        }
    }
}

/// Discovery descriptor
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiscoveryConfig {
    /// Item source
    pub kind: DiscoveryKind,
    /// Path of the item list inside the payload; the whole payload when unset
    pub data_field: Option<String>,
    /// Default `source` for inline payloads
    pub source_url: Option<String>,
}

impl DiscoveryConfig {
    /// Discovery disabled
    pub fn none() -> Self {
        Self::default()
    }

    /// Discover over HTTP
    pub fn http(request: RequestTemplate, data_field: Option<String>) -> Self {
        Self {
            kind: DiscoveryKind::Http(request),
            data_field,
            source_url: None,
        }
    }

    /// Discover from a literal payload
    pub fn inline_json(payload: impl Into<String>, data_field: Option<String>) -> Self {
        Self {
            kind: DiscoveryKind::InlineJson(payload.into()),
            data_field,
            source_url: None,
        }
    }

    /// Discover from a list of identifiers, each becoming `{ "id": value }`
    pub fn inline_list(items: Vec<String>) -> Self {
        Self {
            kind: DiscoveryKind::InlineList(items),
            data_field: Some(ITEM_LIST_FIELD.to_string()),
            source_url: None,
        }
    }

    /// Set the default `source` for inline payloads
    #[must_use]
    pub fn with_source_url(mut self, url: Option<String>) -> Self {
        self.source_url = url;
        self
    }

    /// Whether discovery is disabled
    pub fn is_none(&self) -> bool {
        matches!(self.kind, DiscoveryKind::None)
    }

    /// Names a filter must resolve on every record
    ///
    /// `host`, `source` and the data field (or its first segment) are
    /// required; anything else may be absent and then does not exclude.
    pub fn is_strict_field(&self, name: &str) -> bool {
        if name == "host" || name == "source" {
            return true;
        }
        self.data_field.as_deref().is_some_and(|field| {
            let root = field.split(['.', '[']).next().unwrap_or(field);
            name == field || name == root
        })
    }
}
