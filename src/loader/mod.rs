//! Settings loader module
//!
//! Parse collector settings from YAML or JSON.
//!
//! # Overview
//!
//! The loader module provides:
//! - `CollectorDefinition` - Declarative collector settings
//! - `DiscoveryDefinition` / `PaginationDefinition` - Nested blocks
//! - File and string parsing

mod parser;
mod types;

pub use parser::{load_definition, load_definition_from_str};
pub use types::{CollectorDefinition, DiscoveryDefinition, PaginationDefinition, TimeBound};
