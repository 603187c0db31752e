//! String builtins: `starts_with`, `ends_with`, `join`.

use super::{array_arg, string_arg};
use crate::error::JmesError;
use crate::eval_ctx::EvalCtx;
use crate::runtime::{ArgType, FunctionDefinition, ParamSpec};
use crate::value::Value;
use std::sync::Arc;

const TWO_STRINGS: &[ParamSpec] = &[
    ParamSpec::of(&[ArgType::String]),
    ParamSpec::of(&[ArgType::String]),
];
const GLUE_AND_PARTS: &[ParamSpec] = &[
    ParamSpec::of(&[ArgType::String]),
    ParamSpec::of(&[ArgType::ArrayString]),
];

fn starts_with_eval(args: Vec<Value>, _ctx: &mut EvalCtx<'_>) -> Result<Value, JmesError> {
    let subject = string_arg("starts_with", 1, &args[0])?;
    let prefix = string_arg("starts_with", 2, &args[1])?;
    Ok(Value::Bool(subject.starts_with(prefix)))
}

fn ends_with_eval(args: Vec<Value>, _ctx: &mut EvalCtx<'_>) -> Result<Value, JmesError> {
    let subject = string_arg("ends_with", 1, &args[0])?;
    let suffix = string_arg("ends_with", 2, &args[1])?;
    Ok(Value::Bool(subject.ends_with(suffix)))
}

fn join_eval(args: Vec<Value>, _ctx: &mut EvalCtx<'_>) -> Result<Value, JmesError> {
    let glue = string_arg("join", 1, &args[0])?;
    let parts = array_arg("join", 2, &args[1])?
        .iter()
        .map(|part| string_arg("join", 2, part))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Value::String(parts.join(glue)))
}

pub fn functions() -> Vec<Arc<FunctionDefinition>> {
    vec![
        Arc::new(FunctionDefinition {
            name: "starts_with",
            signature: TWO_STRINGS,
            eval_fn: starts_with_eval,
        }),
        Arc::new(FunctionDefinition {
            name: "ends_with",
            signature: TWO_STRINGS,
            eval_fn: ends_with_eval,
        }),
        Arc::new(FunctionDefinition {
            name: "join",
            signature: GLUE_AND_PARTS,
            eval_fn: join_eval,
        }),
    ]
}
