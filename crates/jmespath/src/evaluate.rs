//! Tree-walking interpreter.

use crate::ast::{Ast, Comparator};
use crate::error::JmesError;
use crate::eval_ctx::EvalCtx;
use crate::value::{deep_equal, native_cmp, ExprRef, Map, Value};
use std::cmp::Ordering;
use std::sync::Arc;

/// Evaluates `node` against `value`.
///
/// Pure given the node, the value and the context's scope chain. Function
/// nodes dispatch through `ctx.runtime`, which may call back in here for
/// expression references.
pub fn evaluate(node: &Ast, value: &Value, ctx: &mut EvalCtx<'_>) -> Result<Value, JmesError> {
    ctx.enter()?;
    let result = visit(node, value, ctx);
    ctx.leave();
    result
}

fn visit(node: &Ast, value: &Value, ctx: &mut EvalCtx<'_>) -> Result<Value, JmesError> {
    match node {
        Ast::Field { name } => Ok(match value {
            Value::Object(map) => map.get(name).cloned().unwrap_or(Value::Null),
            Value::Null => Value::Null,
            _ => ctx.scope.resolve(name).cloned().unwrap_or(Value::Null),
        }),
        Ast::Subexpression { lhs, rhs } => {
            let left = evaluate(lhs, value, ctx)?;
            if left.is_null() {
                return Ok(Value::Null);
            }
            evaluate(rhs, &left, ctx)
        }
        Ast::IndexExpression { lhs, rhs } => {
            let left = evaluate(lhs, value, ctx)?;
            evaluate(rhs, &left, ctx)
        }
        Ast::Index { index } => Ok(match value {
            Value::Array(items) => {
                let len = items.len() as i64;
                let i = if *index < 0 { len + index } else { *index };
                if (0..len).contains(&i) {
                    items[i as usize].clone()
                } else {
                    Value::Null
                }
            }
            _ => Value::Null,
        }),
        Ast::Slice { start, stop, step } => {
            let step = step.unwrap_or(1);
            if step == 0 {
                return Err(JmesError::Runtime("Invalid slice, step cannot be 0".into()));
            }
            match value {
                Value::Array(items) => Ok(Value::Array(slice(items, *start, *stop, step))),
                _ => Ok(Value::Null),
            }
        }
        Ast::Projection { lhs, rhs } => {
            let base = evaluate(lhs, value, ctx)?;
            match base {
                Value::Array(items) => project(items.iter(), rhs, ctx),
                _ => Ok(Value::Null),
            }
        }
        Ast::ValueProjection { lhs, rhs } => {
            let base = evaluate(lhs, value, ctx)?;
            match base {
                Value::Object(map) => project(map.values(), rhs, ctx),
                _ => Ok(Value::Null),
            }
        }
        Ast::FilterProjection { lhs, rhs, condition } => {
            let base = evaluate(lhs, value, ctx)?;
            let Value::Array(items) = base else {
                return Ok(Value::Null);
            };
            let mut kept = Vec::new();
            for item in items {
                if !evaluate(condition, &item, ctx)?.is_false() {
                    kept.push(item);
                }
            }
            project(kept.iter(), rhs, ctx)
        }
        Ast::Comparator { op, lhs, rhs } => {
            let first = evaluate(lhs, value, ctx)?;
            let second = evaluate(rhs, value, ctx)?;
            Ok(Value::Bool(compare(*op, &first, &second)))
        }
        Ast::Flatten { node } => {
            let base = evaluate(node, value, ctx)?;
            let Value::Array(items) = base else {
                return Ok(Value::Null);
            };
            let mut merged = Vec::with_capacity(items.len());
            for item in items {
                match item {
                    Value::Array(inner) => merged.extend(inner),
                    other => merged.push(other),
                }
            }
            Ok(Value::Array(merged))
        }
        Ast::Identity | Ast::Current => Ok(value.clone()),
        Ast::MultiSelectList { elements } => {
            if value.is_null() {
                return Ok(Value::Null);
            }
            let mut collected = Vec::with_capacity(elements.len());
            for element in elements {
                collected.push(evaluate(element, value, ctx)?);
            }
            Ok(Value::Array(collected))
        }
        Ast::MultiSelectHash { pairs } => {
            if value.is_null() {
                return Ok(Value::Null);
            }
            let mut collected = Map::with_capacity(pairs.len());
            for pair in pairs {
                let v = evaluate(&pair.value, value, ctx)?;
                collected.insert(pair.key.clone(), v);
            }
            Ok(Value::Object(collected))
        }
        Ast::Or { lhs, rhs } => {
            let left = evaluate(lhs, value, ctx)?;
            if left.is_false() {
                evaluate(rhs, value, ctx)
            } else {
                Ok(left)
            }
        }
        Ast::And { lhs, rhs } => {
            let left = evaluate(lhs, value, ctx)?;
            if left.is_false() {
                Ok(left)
            } else {
                evaluate(rhs, value, ctx)
            }
        }
        Ast::Not { node } => Ok(Value::Bool(evaluate(node, value, ctx)?.is_false())),
        Ast::Literal { value: literal } => Ok(literal.clone()),
        Ast::Pipe { lhs, rhs } => {
            let left = evaluate(lhs, value, ctx)?;
            evaluate(rhs, &left, ctx)
        }
        Ast::Function { name, args } => {
            let mut resolved = Vec::with_capacity(args.len());
            for arg in args {
                resolved.push(evaluate(arg, value, ctx)?);
            }
            let runtime = Arc::clone(&ctx.runtime);
            runtime.call(name, resolved, ctx)
        }
        Ast::ExpressionReference { node } => {
            Ok(Value::Expref(ExprRef::new(Arc::clone(node), value.clone())))
        }
    }
}

/// Applies `rhs` to each element, dropping `Null` results.
fn project<'v>(
    items: impl Iterator<Item = &'v Value>,
    rhs: &Ast,
    ctx: &mut EvalCtx<'_>,
) -> Result<Value, JmesError> {
    let mut collected = Vec::new();
    for item in items {
        let current = evaluate(rhs, item, ctx)?;
        if !current.is_null() {
            collected.push(current);
        }
    }
    Ok(Value::Array(collected))
}

fn compare(op: Comparator, first: &Value, second: &Value) -> bool {
    match op {
        Comparator::Equal => deep_equal(first, second),
        Comparator::NotEqual => !deep_equal(first, second),
        Comparator::Less => native_cmp(first, second) == Some(Ordering::Less),
        Comparator::LessEqual => {
            matches!(native_cmp(first, second), Some(Ordering::Less | Ordering::Equal))
        }
        Comparator::Greater => native_cmp(first, second) == Some(Ordering::Greater),
        Comparator::GreaterEqual => {
            matches!(native_cmp(first, second), Some(Ordering::Greater | Ordering::Equal))
        }
    }
}

/// Resolves optional slice bounds against `len`. `step` must be non-zero.
///
/// Returns `(start, stop)`; when stepping backward `stop` may be `-1`.
pub fn slice_bounds(len: usize, start: Option<i64>, stop: Option<i64>, step: i64) -> (i64, i64) {
    let len = len as i64;
    let backward = step < 0;
    let cap = |bound: i64| -> i64 {
        if bound < 0 {
            let shifted = bound + len;
            if shifted < 0 {
                if backward { -1 } else { 0 }
            } else {
                shifted
            }
        } else if bound >= len {
            if backward { len - 1 } else { len }
        } else {
            bound
        }
    };
    let start = match start {
        Some(s) => cap(s),
        None if backward => len - 1,
        None => 0,
    };
    let stop = match stop {
        Some(s) => cap(s),
        None if backward => -1,
        None => len,
    };
    (start, stop)
}

fn slice(items: &[Value], start: Option<i64>, stop: Option<i64>, step: i64) -> Vec<Value> {
    let (start, stop) = slice_bounds(items.len(), start, stop, step);
    let mut result = Vec::new();
    let mut i = start;
    while (step > 0 && i < stop) || (step < 0 && i > stop) {
        result.push(items[i as usize].clone());
        // A step past the i64 range also walks past either end.
        i = match i.checked_add(step) {
            Some(next) => next,
            None => break,
        };
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slice_bounds_defaults() {
        assert_eq!(slice_bounds(5, None, None, 1), (0, 5));
        assert_eq!(slice_bounds(5, None, None, -1), (4, -1));
    }

    #[test]
    fn slice_bounds_clamp() {
        assert_eq!(slice_bounds(5, Some(-2), None, 1), (3, 5));
        assert_eq!(slice_bounds(5, Some(-10), Some(10), 1), (0, 5));
        assert_eq!(slice_bounds(5, Some(10), Some(-10), -1), (4, -1));
        assert_eq!(slice_bounds(0, None, None, -1), (-1, -1));
    }

    #[test]
    fn slice_walks_both_directions() {
        let items: Vec<Value> = (0..6i64).map(Value::from).collect();
        let got = slice(&items, Some(1), Some(4), 1);
        assert_eq!(got, vec![Value::from(1i64), Value::from(2i64), Value::from(3i64)]);
        let got = slice(&items, Some(5), Some(1), -2);
        assert_eq!(got, vec![Value::from(5i64), Value::from(3i64)]);
    }

    #[test]
    fn slice_with_extreme_steps_stops_at_the_ends() {
        let items: Vec<Value> = (0..3i64).map(Value::from).collect();
        assert_eq!(slice(&items, Some(1), None, i64::MAX), vec![Value::from(1i64)]);
        assert_eq!(slice(&items, None, None, i64::MIN), vec![Value::from(2i64)]);
        assert_eq!(slice(&items, Some(i64::MIN), Some(i64::MAX), i64::MAX), vec![Value::from(0i64)]);
    }
}
