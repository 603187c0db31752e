//! Type conversion and inspection builtins.

use crate::error::JmesError;
use crate::eval_ctx::EvalCtx;
use crate::runtime::{ArgType, FunctionDefinition, ParamSpec};
use crate::value::Value;
use std::sync::Arc;

const ANY: &[ParamSpec] = &[ParamSpec::of(&[ArgType::Any])];
const ANY_VARIADIC: &[ParamSpec] = &[ParamSpec::variadic(&[ArgType::Any])];

fn first(args: Vec<Value>) -> Value {
    args.into_iter().next().unwrap_or_default()
}

fn to_array_eval(args: Vec<Value>, _ctx: &mut EvalCtx<'_>) -> Result<Value, JmesError> {
    Ok(match first(args) {
        array @ Value::Array(_) => array,
        other => Value::Array(vec![other]),
    })
}

fn to_string_eval(args: Vec<Value>, _ctx: &mut EvalCtx<'_>) -> Result<Value, JmesError> {
    Ok(match first(args) {
        string @ Value::String(_) => string,
        other => Value::String(other.to_json_string()),
    })
}

/// Parses a decimal number, ignoring surrounding whitespace. Infinities and
/// NaN are rejected.
fn parse_number(text: &str) -> Option<f64> {
    text.trim().parse::<f64>().ok().filter(|n| n.is_finite())
}

fn to_number_eval(args: Vec<Value>, _ctx: &mut EvalCtx<'_>) -> Result<Value, JmesError> {
    Ok(match first(args) {
        number @ Value::Number(_) => number,
        Value::String(s) => parse_number(&s).map_or(Value::Null, Value::from_f64),
        _ => Value::Null,
    })
}

fn not_null_eval(args: Vec<Value>, _ctx: &mut EvalCtx<'_>) -> Result<Value, JmesError> {
    Ok(args.into_iter().find(|v| !v.is_null()).unwrap_or(Value::Null))
}

fn type_eval(args: Vec<Value>, _ctx: &mut EvalCtx<'_>) -> Result<Value, JmesError> {
    Ok(Value::from(args[0].type_name()))
}

pub fn functions() -> Vec<Arc<FunctionDefinition>> {
    vec![
        Arc::new(FunctionDefinition { name: "to_array", signature: ANY, eval_fn: to_array_eval }),
        Arc::new(FunctionDefinition { name: "to_string", signature: ANY, eval_fn: to_string_eval }),
        Arc::new(FunctionDefinition { name: "to_number", signature: ANY, eval_fn: to_number_eval }),
        Arc::new(FunctionDefinition {
            name: "not_null",
            signature: ANY_VARIADIC,
            eval_fn: not_null_eval,
        }),
        Arc::new(FunctionDefinition { name: "type", signature: ANY, eval_fn: type_eval }),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{search_json, ErrorKind};
    use serde_json::json;

    #[test]
    fn parse_number_trims_and_rejects_non_finite() {
        assert_eq!(parse_number(" 12 "), Some(12.0));
        assert_eq!(parse_number("1.5e2"), Some(150.0));
        assert_eq!(parse_number("inf"), None);
        assert_eq!(parse_number("NaN"), None);
        assert_eq!(parse_number("12abc"), None);
        assert_eq!(parse_number(""), None);
    }

    #[test]
    fn to_number_conversions() {
        let data = json!({"n": 3, "s": "42", "f": "1.5", "bad": "x", "b": true});
        assert_eq!(search_json(&data, "to_number(n)").unwrap(), json!(3));
        assert_eq!(search_json(&data, "to_number(s)").unwrap(), json!(42));
        assert_eq!(search_json(&data, "to_number(f)").unwrap(), json!(1.5));
        assert_eq!(search_json(&data, "to_number(bad)").unwrap(), json!(null));
        assert_eq!(search_json(&data, "to_number(b)").unwrap(), json!(null));
    }

    #[test]
    fn to_string_encodes_non_strings() {
        let data = json!({"s": "x", "a": [1, "b"], "o": {"k": null}});
        assert_eq!(search_json(&data, "to_string(s)").unwrap(), json!("x"));
        assert_eq!(search_json(&data, "to_string(a)").unwrap(), json!("[1,\"b\"]"));
        assert_eq!(search_json(&data, "to_string(o)").unwrap(), json!("{\"k\":null}"));
    }

    #[test]
    fn to_array_wraps_scalars() {
        let data = json!({"a": [1], "n": 2});
        assert_eq!(search_json(&data, "to_array(a)").unwrap(), json!([1]));
        assert_eq!(search_json(&data, "to_array(n)").unwrap(), json!([2]));
        assert_eq!(search_json(&data, "to_array(missing)").unwrap(), json!([null]));
    }

    #[test]
    fn not_null_picks_first_present() {
        let data = json!({"b": null, "c": [], "d": 1});
        assert_eq!(search_json(&data, "not_null(a, b, c, d)").unwrap(), json!([]));
        assert_eq!(search_json(&data, "not_null(a, b)").unwrap(), json!(null));
        assert_eq!(
            search_json(&data, "not_null()").unwrap_err().kind(),
            ErrorKind::ArgumentError
        );
    }

    #[test]
    fn type_names() {
        let data = json!({"n": 1, "s": "", "a": [], "o": {}, "b": false});
        let got = search_json(&data, "[type(n), type(s), type(a), type(o), type(b), type(x), type(&n)]")
            .unwrap();
        assert_eq!(
            got,
            json!(["number", "string", "array", "object", "boolean", "null", "expref"])
        );
    }
}
