//! Pagination module
//!
//! Supports: Response Header, Response Body, Link Header
//!
//! # Overview
//!
//! The pagination module provides a unified interface for handling different
//! API pagination patterns. Each strategy extracts the next page token from a
//! response and the shared [`PaginationState`] enforces the page limit.

mod strategies;
mod types;

pub use strategies::{
    LinkHeaderPaginator, NoPaginator, ResponseBodyPaginator, ResponseHeaderPaginator,
};
pub use types::{NextPage, PageCounter, PaginationConfig, PaginationState, Paginator};

#[cfg(test)]
mod tests;
