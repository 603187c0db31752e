//! Builtins over arrays, objects and strings as containers.

use super::{array_arg, object_arg};
use crate::error::JmesError;
use crate::eval_ctx::EvalCtx;
use crate::runtime::{ArgType, FunctionDefinition, ParamSpec};
use crate::value::{deep_equal, native_cmp, Map, Value};
use std::cmp::Ordering;
use std::sync::Arc;

const OBJECT: &[ParamSpec] = &[ParamSpec::of(&[ArgType::Object])];
const SORTABLE: &[ParamSpec] = &[ParamSpec::of(&[ArgType::ArrayNumber, ArgType::ArrayString])];
const SIZED: &[ParamSpec] = &[ParamSpec::of(&[ArgType::String, ArgType::Array, ArgType::Object])];
const OBJECTS: &[ParamSpec] = &[ParamSpec::variadic(&[ArgType::Object])];
const STRING_OR_ARRAY: &[ParamSpec] = &[ParamSpec::of(&[ArgType::String, ArgType::Array])];
const HAYSTACK_NEEDLE: &[ParamSpec] = &[
    ParamSpec::of(&[ArgType::String, ArgType::Array]),
    ParamSpec::of(&[ArgType::Any]),
];

fn length_eval(args: Vec<Value>, _ctx: &mut EvalCtx<'_>) -> Result<Value, JmesError> {
    match &args[0] {
        Value::String(s) => Ok(Value::from(s.chars().count())),
        Value::Array(items) => Ok(Value::from(items.len())),
        Value::Object(map) => Ok(Value::from(map.len())),
        other => Err(JmesError::type_error("length", 1, "string|array|object", other.type_name())),
    }
}

fn keys_eval(args: Vec<Value>, _ctx: &mut EvalCtx<'_>) -> Result<Value, JmesError> {
    let map = object_arg("keys", 1, &args[0])?;
    Ok(Value::Array(map.keys().map(|k| Value::String(k.clone())).collect()))
}

fn values_eval(args: Vec<Value>, _ctx: &mut EvalCtx<'_>) -> Result<Value, JmesError> {
    let map = object_arg("values", 1, &args[0])?;
    Ok(Value::Array(map.values().cloned().collect()))
}

fn merge_eval(args: Vec<Value>, _ctx: &mut EvalCtx<'_>) -> Result<Value, JmesError> {
    let mut merged = Map::new();
    for (i, arg) in args.into_iter().enumerate() {
        match arg {
            Value::Object(map) => merged.extend(map),
            other => return Err(JmesError::type_error("merge", i + 1, "object", other.type_name())),
        }
    }
    Ok(Value::Object(merged))
}

fn reverse_eval(args: Vec<Value>, _ctx: &mut EvalCtx<'_>) -> Result<Value, JmesError> {
    match args.into_iter().next() {
        Some(Value::String(s)) => Ok(Value::String(s.chars().rev().collect())),
        Some(Value::Array(mut items)) => {
            items.reverse();
            Ok(Value::Array(items))
        }
        other => {
            let actual = other.as_ref().map_or("null", Value::type_name);
            Err(JmesError::type_error("reverse", 1, "string|array", actual))
        }
    }
}

fn sort_eval(args: Vec<Value>, _ctx: &mut EvalCtx<'_>) -> Result<Value, JmesError> {
    let mut items = array_arg("sort", 1, &args[0])?.to_vec();
    // Elements are homogeneous after signature checking.
    items.sort_by(|a, b| native_cmp(a, b).unwrap_or(Ordering::Equal));
    Ok(Value::Array(items))
}

/// Picks the element that `wanted` orders first against every other one.
/// Ties keep the earliest element.
fn extreme(function: &str, args: &[Value], wanted: Ordering) -> Result<Value, JmesError> {
    let items = array_arg(function, 1, &args[0])?;
    let mut best: Option<&Value> = None;
    for item in items {
        match best {
            Some(current) if native_cmp(item, current) != Some(wanted) => {}
            _ => best = Some(item),
        }
    }
    Ok(best.cloned().unwrap_or(Value::Null))
}

fn max_eval(args: Vec<Value>, _ctx: &mut EvalCtx<'_>) -> Result<Value, JmesError> {
    extreme("max", &args, Ordering::Greater)
}

fn min_eval(args: Vec<Value>, _ctx: &mut EvalCtx<'_>) -> Result<Value, JmesError> {
    extreme("min", &args, Ordering::Less)
}

fn contains_eval(args: Vec<Value>, _ctx: &mut EvalCtx<'_>) -> Result<Value, JmesError> {
    let found = match (&args[0], &args[1]) {
        (Value::String(haystack), Value::String(needle)) => haystack.contains(needle.as_str()),
        (Value::String(_), _) => false,
        (Value::Array(items), needle) => items.iter().any(|item| deep_equal(item, needle)),
        (other, _) => {
            return Err(JmesError::type_error("contains", 1, "string|array", other.type_name()))
        }
    };
    Ok(Value::Bool(found))
}

pub fn functions() -> Vec<Arc<FunctionDefinition>> {
    vec![
        Arc::new(FunctionDefinition { name: "length", signature: SIZED, eval_fn: length_eval }),
        Arc::new(FunctionDefinition { name: "keys", signature: OBJECT, eval_fn: keys_eval }),
        Arc::new(FunctionDefinition { name: "values", signature: OBJECT, eval_fn: values_eval }),
        Arc::new(FunctionDefinition { name: "merge", signature: OBJECTS, eval_fn: merge_eval }),
        Arc::new(FunctionDefinition {
            name: "reverse",
            signature: STRING_OR_ARRAY,
            eval_fn: reverse_eval,
        }),
        Arc::new(FunctionDefinition { name: "sort", signature: SORTABLE, eval_fn: sort_eval }),
        Arc::new(FunctionDefinition { name: "max", signature: SORTABLE, eval_fn: max_eval }),
        Arc::new(FunctionDefinition { name: "min", signature: SORTABLE, eval_fn: min_eval }),
        Arc::new(FunctionDefinition {
            name: "contains",
            signature: HAYSTACK_NEEDLE,
            eval_fn: contains_eval,
        }),
    ]
}

#[cfg(test)]
mod tests {
    use crate::{search_json, ErrorKind};
    use serde_json::json;

    #[test]
    fn length_counts_chars_elements_and_keys() {
        let data = json!({"s": "héllo", "a": [1, 2], "o": {"x": 1}});
        assert_eq!(search_json(&data, "length(s)").unwrap(), json!(5));
        assert_eq!(search_json(&data, "length(a)").unwrap(), json!(2));
        assert_eq!(search_json(&data, "length(o)").unwrap(), json!(1));
        assert_eq!(search_json(&data, "length(@)").unwrap(), json!(3));
    }

    #[test]
    fn length_rejects_numbers() {
        let err = search_json(&json!(1), "length(@)").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TypeError);
    }

    #[test]
    fn keys_and_values_follow_insertion_order() {
        let data = json!({"b": 1, "a": 2});
        assert_eq!(search_json(&data, "keys(@)").unwrap(), json!(["b", "a"]));
        assert_eq!(search_json(&data, "values(@)").unwrap(), json!([1, 2]));
    }

    #[test]
    fn merge_is_right_biased() {
        let data = json!({"x": {"a": 1, "b": 2}, "y": {"b": 3}});
        assert_eq!(search_json(&data, "merge(x, y)").unwrap(), json!({"a": 1, "b": 3}));
        assert_eq!(search_json(&data, "merge(x)").unwrap(), json!({"a": 1, "b": 2}));
        assert_eq!(
            search_json(&data, "merge()").unwrap_err().kind(),
            ErrorKind::ArgumentError
        );
    }

    #[test]
    fn reverse_strings_and_arrays() {
        let data = json!({"s": "abc", "a": [1, 2, 3]});
        assert_eq!(search_json(&data, "reverse(s)").unwrap(), json!("cba"));
        assert_eq!(search_json(&data, "reverse(a)").unwrap(), json!([3, 2, 1]));
    }

    #[test]
    fn sort_numbers_and_strings() {
        let data = json!({"n": [3, 1.5, 2], "s": ["b", "c", "a"], "m": [1, "a"]});
        assert_eq!(search_json(&data, "sort(n)").unwrap(), json!([1.5, 2, 3]));
        assert_eq!(search_json(&data, "sort(s)").unwrap(), json!(["a", "b", "c"]));
        assert_eq!(search_json(&data, "sort(m)").unwrap_err().kind(), ErrorKind::TypeError);
    }

    #[test]
    fn max_and_min() {
        let data = json!({"n": [3, 7, 1], "s": ["b", "c", "a"], "e": []});
        assert_eq!(search_json(&data, "max(n)").unwrap(), json!(7));
        assert_eq!(search_json(&data, "min(n)").unwrap(), json!(1));
        assert_eq!(search_json(&data, "max(s)").unwrap(), json!("c"));
        assert_eq!(search_json(&data, "min(s)").unwrap(), json!("a"));
        assert_eq!(search_json(&data, "max(e)").unwrap(), json!(null));
    }

    #[test]
    fn contains_strings_and_arrays() {
        let data = json!({"s": "foobar", "a": [1, {"k": [2]}]});
        assert_eq!(search_json(&data, "contains(s, 'oba')").unwrap(), json!(true));
        assert_eq!(search_json(&data, "contains(s, `1`)").unwrap(), json!(false));
        assert_eq!(search_json(&data, "contains(a, `{\"k\": [2]}`)").unwrap(), json!(true));
        assert_eq!(search_json(&data, "contains(a, `1.0`)").unwrap(), json!(true));
        assert_eq!(search_json(&data, "contains(a, `3`)").unwrap(), json!(false));
    }
}
