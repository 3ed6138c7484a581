//! Discovery module
//!
//! Enumerate the work items a collection job fetches.
//!
//! # Overview
//!
//! The discovery module provides:
//! - `DiscoveryConfig` / `DiscoveryKind` - Where items come from
//! - `discover` - One pass: fetch, decode, extract, filter, batch

mod engine;
mod types;

pub use engine::discover;
pub use types::{DiscoveryConfig, DiscoveryKind, ITEM_LIST_FIELD};
