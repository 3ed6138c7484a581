//! Tree-walking evaluator with full and partial modes

use super::parser::{number, BinaryOp, LogicalOp, Node, Segment, UnaryOp};
use crate::error::{Error, Result};
use crate::types::JsonObject;
use serde_json::Value;
use std::cmp::Ordering;

/// Evaluation mode
#[derive(Clone, Copy)]
pub(crate) enum Mode<'a> {
    /// Unresolved names evaluate to null
    Full,
    /// Unresolved names for which the predicate is false are indeterminate
    Partial(&'a dyn Fn(&str) -> bool),
}

/// Intermediate value: `None` is indeterminate
type Val = Option<Value>;

pub(crate) fn evaluate(node: &Node, ctx: &JsonObject, mode: Mode<'_>) -> Result<Val> {
    match node {
        Node::Literal(value) => Ok(Some(value.clone())),

        Node::Ident(name) => match ctx.get(name) {
            Some(value) => Ok(Some(value.clone())),
            None => match mode {
                Mode::Partial(strict) if !strict(name) => Ok(None),
                _ => Ok(Some(Value::Null)),
            },
        },

        Node::Template(segments) => {
            let mut out = String::new();
            for segment in segments {
                match segment {
                    Segment::Text(text) => out.push_str(text),
                    Segment::Expr(expr) => match evaluate(expr, ctx, mode)? {
                        Some(value) => out.push_str(&to_display(&value)),
                        None => return Ok(None),
                    },
                }
            }
            Ok(Some(Value::String(out)))
        }

        Node::Member(target, name) => {
            let Some(target) = evaluate(target, ctx, mode)? else {
                return Ok(None);
            };
            Ok(Some(member(&target, name)))
        }

        Node::Index(target, index) => {
            let (Some(target), Some(index)) =
                (evaluate(target, ctx, mode)?, evaluate(index, ctx, mode)?)
            else {
                return Ok(None);
            };
            Ok(Some(match (&target, &index) {
                (Value::Array(items), Value::Number(n)) => n
                    .as_u64()
                    .and_then(|i| items.get(i as usize))
                    .cloned()
                    .unwrap_or(Value::Null),
                _ => member(&target, &to_display(&index)),
            }))
        }

        Node::Call {
            target,
            method,
            args,
        } => {
            let Some(target) = evaluate(target, ctx, mode)? else {
                return Ok(None);
            };
            let mut values = Vec::with_capacity(args.len());
            for arg in args {
                match evaluate(arg, ctx, mode)? {
                    Some(value) => values.push(value),
                    None => return Ok(None),
                }
            }
            call(&target, method, &values).map(Some)
        }

        Node::Unary(op, operand) => {
            let Some(value) = evaluate(operand, ctx, mode)? else {
                return Ok(None);
            };
            Ok(Some(match op {
                UnaryOp::Not => Value::Bool(!is_truthy(&value)),
                UnaryOp::Neg => to_number(&value).map_or(Value::Null, |n| number(-n)),
            }))
        }

        Node::Binary(op, left, right) => {
            let (Some(left), Some(right)) =
                (evaluate(left, ctx, mode)?, evaluate(right, ctx, mode)?)
            else {
                return Ok(None);
            };
            Ok(Some(binary(*op, &left, &right)))
        }

        Node::Logical(op, left, right) => {
            let left = evaluate(left, ctx, mode)?;
            match (op, left) {
                (LogicalOp::And, Some(l)) if !is_truthy(&l) => Ok(Some(l)),
                (LogicalOp::Or, Some(l)) if is_truthy(&l) => Ok(Some(l)),
                (_, Some(_)) => evaluate(right, ctx, mode),
                (LogicalOp::And, None) => match evaluate(right, ctx, mode)? {
                    Some(r) if !is_truthy(&r) => Ok(Some(r)),
                    _ => Ok(None),
                },
                (LogicalOp::Or, None) => match evaluate(right, ctx, mode)? {
                    Some(r) if is_truthy(&r) => Ok(Some(r)),
                    _ => Ok(None),
                },
            }
        }

        Node::Conditional(condition, then, otherwise) => {
            match evaluate(condition, ctx, mode)? {
                Some(c) if is_truthy(&c) => evaluate(then, ctx, mode),
                Some(_) => evaluate(otherwise, ctx, mode),
                None => Ok(None),
            }
        }
    }
}

/// JavaScript-style truthiness
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// String form used by concatenation and templates
pub fn to_display(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "null".to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => value.to_string(),
    }
}

fn to_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn member(target: &Value, name: &str) -> Value {
    match (target, name) {
        (Value::String(s), "length") => Value::from(s.chars().count()),
        (Value::Array(items), "length") => Value::from(items.len()),
        (Value::Object(map), _) => map.get(name).cloned().unwrap_or(Value::Null),
        _ => Value::Null,
    }
}

fn call(target: &Value, method: &str, args: &[Value]) -> Result<Value> {
    let arg_str = |i: usize| args.get(i).map(to_display).unwrap_or_default();

    match (target, method) {
        (Value::String(s), "startsWith") => Ok(Value::Bool(s.starts_with(&arg_str(0)))),
        (Value::String(s), "endsWith") => Ok(Value::Bool(s.ends_with(&arg_str(0)))),
        (Value::String(s), "includes") => Ok(Value::Bool(s.contains(&arg_str(0)))),
        (Value::String(s), "indexOf") => Ok(s
            .find(&arg_str(0))
            .map_or(Value::from(-1), |i| Value::from(s[..i].chars().count()))),
        (Value::String(s), "toLowerCase") => Ok(Value::String(s.to_lowercase())),
        (Value::String(s), "toUpperCase") => Ok(Value::String(s.to_uppercase())),
        (Value::String(s), "trim") => Ok(Value::String(s.trim().to_string())),
        (Value::Array(items), "includes") => Ok(Value::Bool(
            args.first()
                .is_some_and(|needle| items.iter().any(|item| loose_eq(item, needle))),
        )),
        (Value::Array(items), "indexOf") => Ok(args
            .first()
            .and_then(|needle| items.iter().position(|item| loose_eq(item, needle)))
            .map_or(Value::from(-1), Value::from)),
        (_, _) => Err(Error::expression(format!(
            "{method} is not a function on {}",
            type_name(target)
        ))),
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn binary(op: BinaryOp, left: &Value, right: &Value) -> Value {
    match op {
        BinaryOp::Eq => Value::Bool(loose_eq(left, right)),
        BinaryOp::NotEq => Value::Bool(!loose_eq(left, right)),
        BinaryOp::StrictEq => Value::Bool(strict_eq(left, right)),
        BinaryOp::StrictNotEq => Value::Bool(!strict_eq(left, right)),
        BinaryOp::Lt => Value::Bool(compare(left, right) == Some(Ordering::Less)),
        BinaryOp::Le => Value::Bool(matches!(
            compare(left, right),
            Some(Ordering::Less | Ordering::Equal)
        )),
        BinaryOp::Gt => Value::Bool(compare(left, right) == Some(Ordering::Greater)),
        BinaryOp::Ge => Value::Bool(matches!(
            compare(left, right),
            Some(Ordering::Greater | Ordering::Equal)
        )),
        BinaryOp::Add => {
            if left.is_string() || right.is_string() {
                Value::String(format!("{}{}", to_display(left), to_display(right)))
            } else {
                arithmetic(left, right, |a, b| a + b)
            }
        }
        BinaryOp::Sub => arithmetic(left, right, |a, b| a - b),
        BinaryOp::Mul => arithmetic(left, right, |a, b| a * b),
        BinaryOp::Div => arithmetic(left, right, |a, b| a / b),
        BinaryOp::Rem => arithmetic(left, right, |a, b| a % b),
    }
}

fn arithmetic(left: &Value, right: &Value, f: impl Fn(f64, f64) -> f64) -> Value {
    match (to_number(left), to_number(right)) {
        (Some(a), Some(b)) => number(f(a, b)),
        _ => Value::Null,
    }
}

fn loose_eq(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Number(_), Value::Number(_) | Value::String(_))
        | (Value::String(_), Value::Number(_)) => {
            matches!((to_number(left), to_number(right)), (Some(a), Some(b)) if a == b)
        }
        _ => left == right,
    }
}

/// Same type and value; numbers compare by value regardless of representation
fn strict_eq(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => a.as_f64() == b.as_f64(),
        _ => left == right,
    }
}

fn compare(left: &Value, right: &Value) -> Option<Ordering> {
    match (left, right) {
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        _ => to_number(left)?.partial_cmp(&to_number(right)?),
    }
}
