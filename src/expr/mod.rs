//! Expression module
//!
//! A compact JavaScript-like expression language used for discovery filters
//! and login token templates.
//!
//! # Supported syntax
//!
//! - Literals: numbers, `'single'`/`"double"` strings, `true`, `false`, `null`
//! - Template literals: `` `Bearer ${token}` ``
//! - Field access: `host`, `meta.region`, `tags[0]`, `s.length`
//! - Operators: `! - * / % + < <= > >= == != === !== && || ?:`
//! - String methods: `startsWith`, `endsWith`, `includes`, `indexOf`,
//!   `toLowerCase`, `toUpperCase`, `trim`; array `includes`, `indexOf`
//!
//! Assignment and free function calls are rejected at parse time.
//!
//! # Partial evaluation
//!
//! [`Expression::eval_partial`] takes a predicate naming the fields that must
//! resolve. Any other unresolved name is indeterminate: it propagates through
//! operators, `&&`/`||` still short-circuit on concrete operands, and an
//! indeterminate overall result counts as a match in [`Expression::matches`].

mod eval;
mod lexer;
mod parser;

use crate::error::Result;
use crate::types::JsonObject;
use eval::Mode;
use parser::Node;
use serde_json::Value;
use std::fmt;

pub use eval::{is_truthy, to_display};

/// A parsed expression
#[derive(Clone)]
pub struct Expression {
    source: String,
    root: Node,
}

impl Expression {
    /// Parse an expression
    pub fn parse(source: impl Into<String>) -> Result<Self> {
        let source = source.into();
        let root = parser::parse(&source)?;
        Ok(Self { source, root })
    }

    /// Expression that always evaluates to `true`
    pub fn always_true() -> Self {
        Self {
            source: "true".to_string(),
            root: Node::Literal(Value::Bool(true)),
        }
    }

    /// Original source text
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Evaluate against a context; unresolved names are null
    pub fn eval(&self, ctx: &JsonObject) -> Result<Value> {
        Ok(eval::evaluate(&self.root, ctx, Mode::Full)?.unwrap_or(Value::Null))
    }

    /// Evaluate in partial mode; `None` means the result is indeterminate
    pub fn eval_partial(
        &self,
        ctx: &JsonObject,
        strict: &dyn Fn(&str) -> bool,
    ) -> Result<Option<Value>> {
        eval::evaluate(&self.root, ctx, Mode::Partial(strict))
    }

    /// Filter check: truthy or indeterminate results pass
    pub fn matches(&self, record: &JsonObject, strict: &dyn Fn(&str) -> bool) -> Result<bool> {
        Ok(self
            .eval_partial(record, strict)?
            .map_or(true, |value| is_truthy(&value)))
    }
}

impl fmt::Debug for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Expression").field(&self.source).finish()
    }
}

impl PartialEq for Expression {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}
