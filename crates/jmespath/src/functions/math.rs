//! Numeric builtins: `abs`, `ceil`, `floor`, `avg`, `sum`.

use super::{array_arg, number_arg};
use crate::error::JmesError;
use crate::eval_ctx::EvalCtx;
use crate::runtime::{ArgType, FunctionDefinition, ParamSpec};
use crate::value::Value;
use std::sync::Arc;

const NUMBER: &[ParamSpec] = &[ParamSpec::of(&[ArgType::Number])];
const ARRAY_NUMBER: &[ParamSpec] = &[ParamSpec::of(&[ArgType::ArrayNumber])];

fn abs_eval(args: Vec<Value>, _ctx: &mut EvalCtx<'_>) -> Result<Value, JmesError> {
    Ok(Value::from_f64(number_arg("abs", 1, &args[0])?.abs()))
}

fn ceil_eval(args: Vec<Value>, _ctx: &mut EvalCtx<'_>) -> Result<Value, JmesError> {
    Ok(Value::from_f64(number_arg("ceil", 1, &args[0])?.ceil()))
}

fn floor_eval(args: Vec<Value>, _ctx: &mut EvalCtx<'_>) -> Result<Value, JmesError> {
    Ok(Value::from_f64(number_arg("floor", 1, &args[0])?.floor()))
}

fn sum_of(function: &str, items: &[Value]) -> Result<f64, JmesError> {
    items
        .iter()
        .try_fold(0.0, |acc, item| Ok(acc + number_arg(function, 1, item)?))
}

fn sum_eval(args: Vec<Value>, _ctx: &mut EvalCtx<'_>) -> Result<Value, JmesError> {
    let items = array_arg("sum", 1, &args[0])?;
    Ok(Value::from_f64(sum_of("sum", items)?))
}

fn avg_eval(args: Vec<Value>, _ctx: &mut EvalCtx<'_>) -> Result<Value, JmesError> {
    let items = array_arg("avg", 1, &args[0])?;
    if items.is_empty() {
        return Ok(Value::Null);
    }
    Ok(Value::from_f64(sum_of("avg", items)? / items.len() as f64))
}

pub fn functions() -> Vec<Arc<FunctionDefinition>> {
    vec![
        Arc::new(FunctionDefinition { name: "abs", signature: NUMBER, eval_fn: abs_eval }),
        Arc::new(FunctionDefinition { name: "ceil", signature: NUMBER, eval_fn: ceil_eval }),
        Arc::new(FunctionDefinition { name: "floor", signature: NUMBER, eval_fn: floor_eval }),
        Arc::new(FunctionDefinition { name: "sum", signature: ARRAY_NUMBER, eval_fn: sum_eval }),
        Arc::new(FunctionDefinition { name: "avg", signature: ARRAY_NUMBER, eval_fn: avg_eval }),
    ]
}
