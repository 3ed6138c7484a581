//! Settings parser
//!
//! Reads collector settings from YAML files or strings. JSON documents are
//! valid YAML, so both formats go through the same parser.

use crate::error::{Error, Result};
use crate::loader::types::CollectorDefinition;
use std::fs;
use std::path::Path;
use tracing::debug;

/// Load collector settings from a file path
pub fn load_definition(path: impl AsRef<Path>) -> Result<CollectorDefinition> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            Error::config(format!("Settings file '{}' not found", path.display()))
        } else {
            Error::config(format!(
                "Failed to read settings file '{}': {}",
                path.display(),
                e
            ))
        }
    })?;
    debug!(path = %path.display(), "loaded settings file");
    load_definition_from_str(&content)
}

/// Load collector settings from a YAML or JSON string
pub fn load_definition_from_str(text: &str) -> Result<CollectorDefinition> {
    if text.trim().is_empty() {
        return Err(Error::config("Settings document is empty"));
    }
    serde_yaml::from_str(text)
        .map_err(|e| Error::config(format!("Failed to parse collector settings: {e}")))
}
