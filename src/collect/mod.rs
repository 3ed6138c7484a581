//! Collect module
//!
//! Fetch one work item, following pagination, and stream its body.
//!
//! # Overview
//!
//! The collect module provides:
//! - `collect` - Render, authenticate and send the item's request
//! - `CollectStream` - Body bytes across pages, with errors reported to the job

mod executor;
mod stream;

pub use executor::collect;
pub use stream::CollectStream;

#[cfg(test)]
mod tests;
