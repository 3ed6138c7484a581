//! # REST Collector
//!
//! A configurable collector that pulls records from arbitrary HTTP APIs:
//! authenticate once, discover the work items to fetch, then collect each
//! item while following pagination.
//!
//! ## Features
//!
//! - **Authentication**: none, HTTP basic, or a login request whose token is
//!   cached and shared by every request
//! - **Discovery**: HTTP, inline JSON/XML or an inline item list, filtered by
//!   a small expression language and handed to the job in batches
//! - **Pagination**: response header, response body and `Link` header
//!   strategies with a hard page limit
//! - **Streaming collect**: body bytes are streamed while errors go to the job
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use rest_collector::{load_definition, MemoryJob, RestCollector, Result};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let definition = load_definition("collector.yaml")?;
//!     let collector = RestCollector::from_definition(&definition)?;
//!
//!     let job = Arc::new(MemoryJob::new("nightly"));
//!     let mut out = tokio::io::stdout();
//!     let stats = collector.run(job, 4, &mut out).await?;
//!     eprintln!("{stats}");
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! settings ─► loader ─► config (validated, immutable)
//!                           │
//!            ┌──────────────┴──────────────┐
//!            ▼                             ▼
//!        discovery ──► Job ──► items ──► collect ──► CollectStream
//!            │                             │
//!            └────────── auth (single-flight token) ──┘
//!                           │
//!                     HttpExecutor (reqwest, page walker)
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types for the collector
pub mod error;

/// Common types and type aliases
pub mod types;

/// Template interpolation
pub mod template;

/// Filter and token expressions
pub mod expr;

/// Payload decoders (JSON, XML) and path extraction
pub mod decode;

/// Pagination strategies
pub mod pagination;

/// HTTP executor with rate limiting and page walking
pub mod http;

/// Authentication strategies
pub mod auth;

/// Settings loader
pub mod loader;

/// Validated configuration
pub mod config;

/// Job contract
pub mod job;

/// Work item discovery
pub mod discovery;

/// Per-item collection
pub mod collect;

/// Collector facade and job driver
pub mod engine;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, Result};
pub use types::*;

// Re-export commonly used types
pub use config::CollectorConfig;
pub use engine::{RestCollector, RunStats};
pub use job::{Job, MemoryJob, Severity};
pub use loader::{load_definition, load_definition_from_str, CollectorDefinition};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
