//! Builtins taking expression references: `map`, `sort_by`, `max_by`,
//! `min_by` and `let`.

use super::{array_arg, expref_arg, object_arg};
use crate::error::JmesError;
use crate::eval_ctx::EvalCtx;
use crate::runtime::{ArgType, FunctionDefinition, ParamSpec};
use crate::value::{native_cmp, ExprRef, Value};
use std::cmp::Ordering;
use std::sync::Arc;

const ARRAY_BY_KEY: &[ParamSpec] = &[
    ParamSpec::of(&[ArgType::Array]),
    ParamSpec::of(&[ArgType::Expref]),
];

const EXPREF_ARRAY: &[ParamSpec] = &[
    ParamSpec::of(&[ArgType::Expref]),
    ParamSpec::of(&[ArgType::Array]),
];

const BINDINGS_BODY: &[ParamSpec] = &[
    ParamSpec::of(&[ArgType::Object]),
    ParamSpec::of(&[ArgType::Expref]),
];

const KEY_TYPES: &str = "number|string";

/// Evaluates the key expression for every element and checks that all keys
/// are numbers, or all are strings.
fn keys_for(
    function: &str,
    items: &[Value],
    key: &ExprRef,
    ctx: &mut EvalCtx<'_>,
) -> Result<Vec<Value>, JmesError> {
    let mut keys = Vec::with_capacity(items.len());
    let mut required: Option<&'static str> = None;
    for item in items {
        let k = ctx.eval_expref(key, item)?;
        let actual = k.type_name();
        match required {
            None if matches!(k, Value::Number(_) | Value::String(_)) => required = Some(actual),
            None => return Err(JmesError::type_error(function, 2, KEY_TYPES, actual)),
            Some(expected) if expected != actual => {
                return Err(JmesError::type_error(function, 2, expected, actual))
            }
            Some(_) => {}
        }
        keys.push(k);
    }
    Ok(keys)
}

fn map_eval(args: Vec<Value>, ctx: &mut EvalCtx<'_>) -> Result<Value, JmesError> {
    let key = expref_arg("map", 1, &args[0])?;
    let items = array_arg("map", 2, &args[1])?;
    let mut mapped = Vec::with_capacity(items.len());
    for item in items {
        mapped.push(ctx.eval_expref(key, item)?);
    }
    Ok(Value::Array(mapped))
}

fn sort_by_eval(args: Vec<Value>, ctx: &mut EvalCtx<'_>) -> Result<Value, JmesError> {
    let items = array_arg("sort_by", 1, &args[0])?;
    let key = expref_arg("sort_by", 2, &args[1])?;
    let keys = keys_for("sort_by", items, key, ctx)?;
    let mut decorated: Vec<(usize, &Value, &Value)> = items
        .iter()
        .zip(&keys)
        .enumerate()
        .map(|(i, (item, k))| (i, k, item))
        .collect();
    decorated.sort_by(|(ia, ka, _), (ib, kb, _)| {
        native_cmp(ka, kb).unwrap_or(Ordering::Equal).then(ia.cmp(ib))
    });
    Ok(Value::Array(decorated.into_iter().map(|(_, _, item)| item.clone()).collect()))
}

/// Scans for the element whose key orders `wanted` against the running
/// extreme. Only a strict improvement replaces it, so ties keep the first.
fn extreme_by(
    function: &str,
    args: &[Value],
    wanted: Ordering,
    ctx: &mut EvalCtx<'_>,
) -> Result<Value, JmesError> {
    let items = array_arg(function, 1, &args[0])?;
    let key = expref_arg(function, 2, &args[1])?;
    let keys = keys_for(function, items, key, ctx)?;
    let mut best: Option<(&Value, &Value)> = None;
    for (item, k) in items.iter().zip(&keys) {
        match best {
            Some((_, best_key)) if native_cmp(k, best_key) != Some(wanted) => {}
            _ => best = Some((item, k)),
        }
    }
    Ok(best.map(|(item, _)| item.clone()).unwrap_or(Value::Null))
}

fn max_by_eval(args: Vec<Value>, ctx: &mut EvalCtx<'_>) -> Result<Value, JmesError> {
    extreme_by("max_by", &args, Ordering::Greater, ctx)
}

fn min_by_eval(args: Vec<Value>, ctx: &mut EvalCtx<'_>) -> Result<Value, JmesError> {
    extreme_by("min_by", &args, Ordering::Less, ctx)
}

fn let_eval(args: Vec<Value>, ctx: &mut EvalCtx<'_>) -> Result<Value, JmesError> {
    let bindings = object_arg("let", 1, &args[0])?.clone();
    let body = expref_arg("let", 2, &args[1])?;
    ctx.scope.push(bindings);
    let result = ctx.eval_expref_in_context(body);
    ctx.scope.pop();
    result
}

pub fn functions() -> Vec<Arc<FunctionDefinition>> {
    vec![
        Arc::new(FunctionDefinition {
            name: "map",
            signature: EXPREF_ARRAY,
            eval_fn: map_eval,
        }),
        Arc::new(FunctionDefinition { name: "sort_by", signature: ARRAY_BY_KEY, eval_fn: sort_by_eval }),
        Arc::new(FunctionDefinition { name: "max_by", signature: ARRAY_BY_KEY, eval_fn: max_by_eval }),
        Arc::new(FunctionDefinition { name: "min_by", signature: ARRAY_BY_KEY, eval_fn: min_by_eval }),
        Arc::new(FunctionDefinition {
            name: "let",
            signature: BINDINGS_BODY,
            eval_fn: let_eval,
        }),
    ]
}
